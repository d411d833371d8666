//! The 18-value observation vector
//!
//! Layout, in order: vehicle position (3), vehicle rotation quaternion
//! `x, y, z, w` (4), vehicle velocity (3), alignment of the vehicle's heading
//! with the nearest unvisited checkpoint (1), nearest unencountered obstacle
//! position (3) and rotation (4). Vectors are normalized; a zero vector stays
//! zero. A missing nearest entity contributes zeros.

use bytemuck::{Pod, Zeroable};
use physics::{Transform, VehicleState};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Observation {
    pub vehicle_position: [f32; 3],
    pub vehicle_rotation: [f32; 4],
    pub vehicle_velocity: [f32; 3],
    pub checkpoint_alignment: f32,
    pub obstacle_position: [f32; 3],
    pub obstacle_rotation: [f32; 4],
}

impl Observation {
    pub const SIZE: usize = 18;

    #[must_use]
    pub fn build(
        vehicle: &VehicleState,
        checkpoint: Option<&Transform>,
        obstacle: Option<&Transform>,
    ) -> Self {
        let t = &vehicle.transform;
        let mut obs = Self {
            vehicle_position: t.position.normalize_or_zero().to_array(),
            vehicle_rotation: t.rotation.normalize().to_array(),
            vehicle_velocity: vehicle.velocity.normalize_or_zero().to_array(),
            ..Self::default()
        };
        if let Some(checkpoint) = checkpoint {
            obs.checkpoint_alignment = t.forward().dot(checkpoint.forward());
        }
        if let Some(obstacle) = obstacle {
            obs.obstacle_position = obstacle.position.normalize_or_zero().to_array();
            obs.obstacle_rotation = obstacle.rotation.normalize().to_array();
        }
        obs
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        bytemuck::cast_slice(std::slice::from_ref(self))
    }

    #[must_use]
    pub fn to_array(self) -> [f32; Self::SIZE] {
        bytemuck::cast(self)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<f32> {
        self.as_slice().to_vec()
    }
}
