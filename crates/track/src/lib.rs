#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Racing Environment
//!
//! The episode loop of a single-agent racing task: a vehicle drives a track
//! lined with checkpoints and randomly placed obstacles, and is scored on the
//! contacts it makes along the way.
//!
//! The crate does not simulate contacts. A physics host (or the headless
//! proxy in the `racer` binary) reports them as [`ContactEvent`]s, and the
//! [`EpisodeController`] turns them into rewards, flag updates and episode
//! boundaries.
//!
//! ## Key Components
//!
//! -   **Episode control:** [`EpisodeController`] owns the vehicle, the
//!     entities and the placement pass, and implements [`rl::Env`].
//! -   **Entities:** [`EntityRegistry`] stores checkpoints and obstacles under
//!     stable ids with their per-episode flags; [`NearestEntityTracker`] keeps
//!     the current targets.
//! -   **Placement:** [`ObstaclePlacer`] scatters the obstacles over a
//!     [`layout::SlotTable`] without reusing a slot index within a pass.
//! -   **Scoring:** [`RewardShaper`] maps events to a [`Verdict`] using the
//!     magnitudes of a [`RewardConfig`].
//! -   **Observation:** [`Observation`] is the flat 18-value vector handed to
//!     the policy.
//!
//! ## Usage
//!
//! ```rust
//! use layout::procedural::RingTrack;
//! use physics::Action;
//! use track::{ContactEvent, EpisodeController, TrackConfig};
//!
//! let layout = RingTrack::default().build();
//! let config = TrackConfig { seed: Some(7), ..TrackConfig::default() };
//! let mut env = EpisodeController::new(&layout, config).unwrap();
//! env.reset();
//!
//! env.push_event(ContactEvent::CheckpointHit(track::CheckpointId(0)));
//! let result = env.step(Action::new(1.0, 0.0, 0.0));
//! assert_eq!(result.reward, 1.0);
//! assert!(!result.terminated);
//! ```

pub mod config;
pub mod episode;
pub mod error;
pub mod nearest;
pub mod observation;
pub mod placement;
pub mod registry;
pub mod reward;

pub use config::{RewardConfig, TrackConfig, VehicleConfig};
pub use episode::{EpisodeController, EpisodeState, Scene, StepResult};
pub use error::TrackError;
pub use nearest::NearestEntityTracker;
pub use observation::Observation;
pub use placement::{ObstaclePlacer, Placement, SlotAllocator};
pub use registry::{Checkpoint, CheckpointId, EntityRegistry, Obstacle, ObstacleId};
pub use reward::{ContactEvent, RewardEvent, RewardShaper, TerminationCause, Verdict, Zone};
