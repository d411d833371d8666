#![deny(clippy::all, clippy::pedantic)]

//! # Track Layout
//!
//! Static scene data for the racing environment, described in JSON.
//!
//! A [`TrackLayout`] lists everything the episode loop treats as fixed input:
//! the spawn pose, the platform the car drives on, the checkpoint gates, the
//! final zone, hostile markers, the drivable boundary and the [`SlotTable`] of
//! candidate obstacle placements. Nothing here changes during an episode.
//!
//! Layouts are either loaded with [`TrackLayout::from_str`] /
//! [`TrackLayout::from_path`] or generated by [`procedural::RingTrack`].

pub mod procedural;

use anyhow::{bail, Context, Result};
use physics::{Transform, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Spawn position used when a layout does not specify one
pub const DEFAULT_SPAWN_POSITION: [f32; 3] = [551.0, 2.27, 158.0];
/// Spawn heading, in degrees, used when a layout does not specify one
pub const DEFAULT_SPAWN_YAW: f32 = 314.0;

/// A position and Euler orientation in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: [f32; 3],
    #[serde(default = "zero_vec")]
    pub euler: [f32; 3],
}

impl Pose {
    #[must_use]
    pub fn to_transform(&self) -> Transform {
        Transform::from_euler_degrees(Vec3::from(self.position), Vec3::from(self.euler))
    }
}

/// A spherical trigger volume
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub position: [f32; 3],
    pub radius: f32,
}

impl Zone {
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        Vec3::from(self.position).distance(point) <= self.radius
    }
}

/// Region the vehicle must stay inside; leaving it hits the terrain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape")]
pub enum Boundary {
    /// Horizontal ring between two radii around `center`
    #[serde(rename = "annulus")]
    Annulus {
        center: [f32; 3],
        inner_radius: f32,
        outer_radius: f32,
    },
    /// Axis-aligned box, ignoring height
    #[serde(rename = "box")]
    Box { min: [f32; 3], max: [f32; 3] },
}

impl Boundary {
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        match *self {
            Boundary::Annulus {
                center,
                inner_radius,
                outer_radius,
            } => {
                let d = (point - Vec3::from(center)).with_y(0.0).length();
                d >= inner_radius && d <= outer_radius
            }
            Boundary::Box { min, max } => {
                point.x >= min[0] && point.x <= max[0] && point.z >= min[2] && point.z <= max[2]
            }
        }
    }
}

/// Which edge of the track an obstacle slot sits on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign applied to the handler offset along the obstacle's forward axis
    #[must_use]
    pub const fn handler_sign(self) -> f32 {
        match self {
            Side::Right => 1.0,
            Side::Left => -1.0,
        }
    }
}

/// Candidate obstacle transforms, one entry per slot index and side
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotTable {
    pub right: Vec<Pose>,
    pub left: Vec<Pose>,
}

impl SlotTable {
    /// Number of slot indices; each index exists on both sides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.right.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.right.is_empty()
    }

    #[must_use]
    pub fn get(&self, side: Side, index: usize) -> Option<Transform> {
        let poses = match side {
            Side::Right => &self.right,
            Side::Left => &self.left,
        };
        poses.get(index).map(Pose::to_transform)
    }

    /// Check that both sides describe the same number of slots.
    ///
    /// # Errors
    ///
    /// Returns an error if the two sides differ in length.
    pub fn validate(&self) -> Result<()> {
        if self.left.len() != self.right.len() {
            bail!(
                "slot table sides differ: {} right slots, {} left slots",
                self.right.len(),
                self.left.len()
            );
        }
        Ok(())
    }
}

/// Complete static description of a track
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    #[serde(default = "default_spawn")]
    pub spawn: Pose,
    #[serde(default = "up_vec")]
    pub platform_up: [f32; 3],
    pub checkpoints: Vec<Pose>,
    #[serde(default = "default_checkpoint_radius")]
    pub checkpoint_radius: f32,
    #[serde(default)]
    pub final_zone: Option<Zone>,
    #[serde(default)]
    pub hostile_markers: Vec<Zone>,
    #[serde(default)]
    pub boundary: Option<Boundary>,
    pub obstacle_count: usize,
    pub slots: SlotTable,
}

fn zero_vec() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

fn up_vec() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_spawn() -> Pose {
    Pose {
        position: DEFAULT_SPAWN_POSITION,
        euler: [0.0, DEFAULT_SPAWN_YAW, 0.0],
    }
}

fn default_checkpoint_radius() -> f32 {
    3.0
}

impl TrackLayout {
    /// Parse and validate a layout from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the layout is inconsistent.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self> {
        let layout: Self = serde_json::from_str(json).context("invalid track layout JSON")?;
        layout.validate()?;
        Ok(layout)
    }

    /// Read, parse and validate a layout file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a valid
    /// layout.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read track layout {}", path.display()))?;
        Self::from_str(&json).with_context(|| format!("in {}", path.display()))
    }

    /// Check the layout's internal consistency.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot table is malformed or cannot hold the
    /// requested number of obstacles.
    pub fn validate(&self) -> Result<()> {
        self.slots.validate()?;
        if self.obstacle_count > self.slots.len() {
            bail!(
                "{} obstacles do not fit in {} slots",
                self.obstacle_count,
                self.slots.len()
            );
        }
        if Vec3::from(self.platform_up).length_squared() == 0.0 {
            bail!("platform_up must be a non-zero vector");
        }
        Ok(())
    }

    #[must_use]
    pub fn spawn_transform(&self) -> Transform {
        self.spawn.to_transform()
    }

    #[must_use]
    pub fn platform_up(&self) -> Vec3 {
        Vec3::from(self.platform_up).normalize_or_zero()
    }

    #[must_use]
    pub fn checkpoint_transforms(&self) -> Vec<Transform> {
        self.checkpoints.iter().map(Pose::to_transform).collect()
    }
}
