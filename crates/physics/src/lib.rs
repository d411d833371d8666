#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Vehicle Physics
//!
//! The kinematic layer of the racing environment.
//!
//! This crate owns the spatial vocabulary shared by every other crate in the
//! workspace and the action interpreter that moves the vehicle. It deliberately
//! stays small: rigid-body dynamics, collision detection and trigger volumes
//! belong to the physics host that embeds the environment. What lives here is
//! the part of the vehicle's motion the environment controls itself.
//!
//! ## Key Components
//!
//! -   **Transforms:** [`Transform`] couples a position, a quaternion and a
//!     scale, and exposes the forward/up axes used by the observation and the
//!     grounded check. See the [`transform`] module.
//! -   **Kinematics:** [`VehicleKinematics`] turns an [`Action`] into a new
//!     signed speed, heading and position for a [`VehicleState`], enforcing
//!     the per-episode speed window and reporting [`Grounding::OffTrack`] when
//!     the body tilts away from the platform.
//!
//! ## Usage
//!
//! ```rust
//! use physics::{Action, Transform, VehicleKinematics, VehicleState, Vec3};
//!
//! let kinematics = VehicleKinematics::default();
//! let mut car = VehicleState::at_rest(Transform::IDENTITY, -0.5, 1.0);
//! kinematics.apply(&mut car, Action::new(1.0, 0.0, 0.0), Vec3::Y, 0.02);
//! assert!(car.speed > 0.0);
//! ```

pub mod kinematics;
pub mod transform;

pub use glam::{Quat, Vec3};
pub use kinematics::{Action, Grounding, KinematicsParams, VehicleKinematics, VehicleState};
pub use transform::Transform;
