#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Reinforcement Learning Plumbing
//!
//! The seams between an environment and whatever drives it.
//!
//! -   [`Env`] is the gym-style interface every environment implements.
//! -   [`Policy`] is the decision-maker that maps an observation vector to an
//!     action vector. The [`policy`] module ships a manual-driving
//!     [`HeuristicPolicy`], a seeded [`RandomPolicy`] and a [`LinearPolicy`]
//!     that evaluates exported weights.
//! -   [`Rollout`] steps an environment with a policy and keeps the running
//!     episode return, which environments never track themselves.

pub mod env;
pub mod policy;
pub mod rollout;

pub use env::Env;
pub use policy::{HeuristicPolicy, Keys, LinearPolicy, Policy, RandomPolicy};
pub use rollout::{EpisodeStats, Rollout};
