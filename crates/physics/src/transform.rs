//! Rigid transform utilities for track entities
//!
//! This module provides the position + quaternion + scale representation shared
//! by the vehicle, checkpoints, obstacles and slot tables. Axis conventions are
//! those of the track scene: `+Y` is up and `+Z` is forward.

use glam::{EulerRot, Quat, Vec3};

/// Position, orientation and scale of an entity in track space
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Build a transform from a position and a pure yaw in degrees.
    #[must_use]
    pub fn from_yaw_degrees(position: Vec3, yaw: f32) -> Self {
        Self::new(position, Quat::from_rotation_y(yaw.to_radians()))
    }

    /// Build a transform from Euler angles in degrees.
    ///
    /// Angles are applied roll (Z) first, then pitch (X), then yaw (Y), which
    /// matches the order the slot tables were authored in.
    #[must_use]
    pub fn from_euler_degrees(position: Vec3, euler: Vec3) -> Self {
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            euler.y.to_radians(),
            euler.x.to_radians(),
            euler.z.to_radians(),
        );
        Self::new(position, rotation)
    }

    #[must_use]
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Local `+Z` axis expressed in track space
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local `+Y` axis expressed in track space
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Rotate around the world vertical axis by `degrees`.
    ///
    /// Equivalent to adding `degrees` to the yaw Euler angle while keeping
    /// pitch and roll untouched.
    pub fn rotate_yaw_degrees(&mut self, degrees: f32) {
        self.rotation = (Quat::from_rotation_y(degrees.to_radians()) * self.rotation).normalize();
    }

    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        self.position.distance(other.position)
    }
}
