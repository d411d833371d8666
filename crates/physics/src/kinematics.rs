//! # Vehicle Kinematics
//!
//! Converts a continuous `(drive, turn, brake)` action into an updated signed
//! speed, heading and position for the vehicle.
//!
//! The vehicle does not go through a force/velocity integrator. Instead an
//! internal scalar `speed` is accelerated, braked and clamped into the
//! per-episode `[min_speed, max_speed]` window, and the position is advanced by
//! one discrete Euler step of `forward * speed`. The velocity vector is owned by
//! whatever physics host moves the body; it is only read here to decide
//! whether the vehicle may turn.

use crate::transform::Transform;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One decision of the driving policy.
///
/// All components are nominally in `[-1, 1]`. `brake` only has an effect when
/// positive.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Action {
    /// `+1` full forward, `-1` full reverse
    pub drive: f32,
    /// Yaw input, scaled by the turn strength
    pub turn: f32,
    pub brake: f32,
}

impl Action {
    /// Number of continuous values in an action vector
    pub const SIZE: usize = 3;

    #[must_use]
    pub const fn new(drive: f32, turn: f32, brake: f32) -> Self {
        Self { drive, turn, brake }
    }

    /// Decode an action vector produced by a policy.
    ///
    /// Missing trailing entries read as `0.0`, non-finite entries are zeroed
    /// and every component is clamped into `[-1, 1]`.
    #[must_use]
    pub fn from_slice(values: &[f32]) -> Self {
        if values.len() < Self::SIZE {
            tracing::warn!(
                "action vector has {} values, expected {}; missing values read as 0",
                values.len(),
                Self::SIZE
            );
        }
        let mut raw = [0.0_f32; Self::SIZE];
        for (slot, value) in raw.iter_mut().zip(values) {
            *slot = *value;
        }
        bytemuck::cast::<[f32; Self::SIZE], Self>(raw).clamped()
    }

    /// Clamp every component into `[-1, 1]`, zeroing NaN and infinities.
    #[must_use]
    pub fn clamped(self) -> Self {
        let fix = |v: f32| {
            if v.is_finite() {
                v.clamp(-1.0, 1.0)
            } else {
                tracing::warn!("non-finite action component {v} replaced with 0");
                0.0
            }
        };
        Self::new(fix(self.drive), fix(self.turn), fix(self.brake))
    }

    #[must_use]
    pub fn to_array(self) -> [f32; Self::SIZE] {
        bytemuck::cast(self)
    }
}

/// Tunable constants of the vehicle controller
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsParams {
    /// Acceleration applied when driving forwards
    pub forward_acc: f32,
    /// Acceleration applied when driving backwards
    pub backward_acc: f32,
    /// Speed removed per unit of brake input, per step
    pub brake_acc: f32,
    /// Yaw rate in degrees per second at full turn input
    pub turn_strength: f32,
    /// Minimum `dot(up, platform_up)` still counted as grounded
    pub grounded_threshold: f32,
}

impl Default for KinematicsParams {
    fn default() -> Self {
        Self {
            forward_acc: 10.0,
            backward_acc: 5.0,
            brake_acc: 5.0,
            turn_strength: 100.0,
            // ~25.8 degrees of tilt
            grounded_threshold: 0.9,
        }
    }
}

/// Mutable per-episode state of the vehicle
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehicleState {
    pub transform: Transform,
    /// Velocity reported by the physics host
    pub velocity: Vec3,
    /// Signed internal speed, distinct from `velocity.length()`
    pub speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl VehicleState {
    #[must_use]
    pub fn at_rest(transform: Transform, min_speed: f32, max_speed: f32) -> Self {
        Self {
            transform,
            velocity: Vec3::ZERO,
            speed: 0.0,
            min_speed,
            max_speed,
        }
    }
}

/// Result of applying one action
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Grounding {
    OnTrack,
    /// The vehicle tilted past the grounded threshold and has been stopped
    OffTrack,
}

/// Action interpreter for a single vehicle
#[derive(Copy, Clone, Debug, Default)]
pub struct VehicleKinematics {
    pub params: KinematicsParams,
}

impl VehicleKinematics {
    #[must_use]
    pub const fn new(params: KinematicsParams) -> Self {
        Self { params }
    }

    /// Whether a body with the given `up` axis rests on a platform whose up
    /// axis is `platform_up`.
    #[must_use]
    pub fn is_grounded(&self, up: Vec3, platform_up: Vec3) -> bool {
        up.dot(platform_up) > self.params.grounded_threshold
    }

    /// Apply `action` for one step of length `dt` seconds.
    ///
    /// `speed` always ends inside `[min_speed, max_speed]`. When the vehicle is
    /// off the track its speed is forced to zero and nothing else moves; the
    /// caller decides what that means for the episode.
    pub fn apply(
        &self,
        vehicle: &mut VehicleState,
        action: Action,
        platform_up: Vec3,
        dt: f32,
    ) -> Grounding {
        let action = action.clamped();
        let p = &self.params;

        let acc = if action.drive > 0.0 {
            p.forward_acc
        } else if action.drive < 0.0 {
            p.backward_acc
        } else {
            0.0
        };

        // No turning on the spot
        let turn = if vehicle.velocity.length() == 0.0 {
            0.0
        } else {
            action.turn
        };

        if action.brake > 0.0 {
            vehicle.speed = (vehicle.speed - action.brake * p.brake_acc).max(0.0);
        }

        vehicle.speed += action.drive * acc * dt;
        // `clamp` would panic on an inverted window
        vehicle.speed = vehicle.speed.max(vehicle.min_speed).min(vehicle.max_speed);

        if !self.is_grounded(vehicle.transform.up(), platform_up) {
            vehicle.speed = 0.0;
            return Grounding::OffTrack;
        }

        if vehicle.speed != 0.0 {
            vehicle
                .transform
                .rotate_yaw_degrees(turn * p.turn_strength * dt);
        }

        vehicle.transform.position += vehicle.transform.forward() * vehicle.speed;
        Grounding::OnTrack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> VehicleState {
        VehicleState::at_rest(Transform::IDENTITY, -0.5, 1.0)
    }

    #[test]
    fn from_slice_pads_and_clamps() {
        let a = Action::from_slice(&[3.0]);
        assert_eq!(a, Action::new(1.0, 0.0, 0.0));
        let b = Action::from_slice(&[0.2, f32::NAN, -7.0, 9.0]);
        assert_eq!(b, Action::new(0.2, 0.0, -1.0));
    }

    #[test]
    fn action_array_order() {
        assert_eq!(Action::new(0.1, 0.2, 0.3).to_array(), [0.1, 0.2, 0.3]);
    }

    #[test]
    fn forward_drive_uses_forward_acc() {
        let k = VehicleKinematics::default();
        let mut v = vehicle();
        let g = k.apply(&mut v, Action::new(0.5, 0.0, 0.0), Vec3::Y, 0.02);
        assert_eq!(g, Grounding::OnTrack);
        assert!((v.speed - 0.1).abs() < 1e-6);
        assert!((v.transform.position.z - 0.1).abs() < 1e-6);
    }

    #[test]
    fn reverse_drive_uses_backward_acc() {
        let k = VehicleKinematics::default();
        let mut v = vehicle();
        k.apply(&mut v, Action::new(-1.0, 0.0, 0.0), Vec3::Y, 0.02);
        assert!((v.speed + 0.1).abs() < 1e-6);
    }

    #[test]
    fn brake_never_reverses() {
        let k = VehicleKinematics::default();
        let mut v = vehicle();
        v.speed = 0.3;
        k.apply(&mut v, Action::new(0.0, 0.0, 1.0), Vec3::Y, 0.02);
        assert_eq!(v.speed, 0.0);
    }

    #[test]
    fn no_turn_while_stationary() {
        let k = VehicleKinematics::default();
        let mut v = vehicle();
        v.speed = 0.5;
        k.apply(&mut v, Action::new(0.0, 1.0, 0.0), Vec3::Y, 0.02);
        assert!(v.transform.forward().abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn turns_while_moving() {
        let k = VehicleKinematics::default();
        let mut v = vehicle();
        v.speed = 0.5;
        v.velocity = Vec3::new(0.0, 0.0, 25.0);
        k.apply(&mut v, Action::new(0.0, 1.0, 0.0), Vec3::Y, 0.02);
        // 100 deg/s * 0.02 s
        let expected = Transform::from_yaw_degrees(Vec3::ZERO, 2.0).forward();
        assert!(v.transform.forward().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn grounded_threshold_is_strict() {
        let k = VehicleKinematics::default();
        assert!(!k.is_grounded(Vec3::new(0.0, 0.85, (1.0_f32 - 0.7225).sqrt()), Vec3::Y));
        assert!(k.is_grounded(Vec3::Y, Vec3::Y));
        assert!(!k.is_grounded(Vec3::new(0.0, 0.9, 0.435_889_9), Vec3::Y));
    }
}
