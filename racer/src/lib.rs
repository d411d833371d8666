#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Racer
//!
//! Headless runner for the checkpoint racing environment.
//!
//! ## Overview
//!
//! The environment itself lives in the [`track`] crate and expects an
//! external physics host to report contacts. This crate provides the pieces
//! needed to run it without one:
//!
//! -   [`world::ProxyWorld`] detects trigger and obstacle contacts from the
//!     vehicle's position alone and derives its velocity from displacement.
//! -   [`HeadlessTrack`] glues a [`track::EpisodeController`] and a proxy
//!     world into a single [`rl::Env`], so any [`rl::Policy`] can be rolled
//!     out against it with [`rl::Rollout`].
//!
//! The `racer` binary adds a command line, `tracing` output and hot-reloading
//! of the track configuration between episodes.
//!
//! ## The Crates
//!
//! -   **[`physics`]:** transforms, actions and the vehicle kinematics.
//! -   **[`layout`]:** JSON track layouts and the procedural ring track.
//! -   **[`rl`]:** the `Env`/`Policy` seams, stock policies and rollouts.
//! -   **[`track`]:** entities, obstacle placement, rewards, observations and
//!     the episode state machine.

pub mod headless;
pub mod world;

pub use headless::HeadlessTrack;
pub use world::ProxyWorld;
