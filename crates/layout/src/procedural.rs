//! Procedurally generated ring tracks
//!
//! A ring is a flat circular lane that starts and ends at the spawn pose. It
//! is used by the headless runner and by tests that need a full layout without
//! shipping scene data. Travel direction is the direction the spawn pose faces.

use crate::{Boundary, Pose, SlotTable, TrackLayout, Zone, DEFAULT_SPAWN_POSITION, DEFAULT_SPAWN_YAW};
use std::f32::consts::TAU;

/// Parameters of a generated ring track
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingTrack {
    pub radius: f32,
    /// Half of the drivable lane width
    pub half_width: f32,
    pub checkpoints: usize,
    pub slots: usize,
    pub obstacles: usize,
    /// Distance of obstacle slots from the lane centerline
    pub slot_offset: f32,
}

impl Default for RingTrack {
    fn default() -> Self {
        Self {
            radius: 60.0,
            half_width: 8.0,
            checkpoints: 12,
            slots: 57,
            obstacles: 10,
            slot_offset: 3.0,
        }
    }
}

impl RingTrack {
    /// Generate the layout.
    ///
    /// The ring passes through the default spawn pose. Checkpoints and slots
    /// are spread evenly along the lane; the final zone sits just before the
    /// lap closes and a hostile marker sits just behind the spawn.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build(&self) -> TrackLayout {
        let spawn = DEFAULT_SPAWN_POSITION;
        // Heading yaw y faces (sin y, 0, cos y); along the ring at angle t the
        // tangent is (-sin t, 0, cos t), so t = -y.
        let start = -DEFAULT_SPAWN_YAW.to_radians();
        let center = [
            spawn[0] - self.radius * start.cos(),
            spawn[1],
            spawn[2] - self.radius * start.sin(),
        ];

        let point = |angle: f32, radius: f32| -> [f32; 3] {
            [
                center[0] + radius * angle.cos(),
                center[1],
                center[2] + radius * angle.sin(),
            ]
        };
        let heading = |angle: f32| -> f32 { (-angle).to_degrees() };

        let sections = (self.checkpoints + 2) as f32;
        let checkpoints = (1..=self.checkpoints)
            .map(|k| {
                let angle = start + TAU * k as f32 / sections;
                Pose {
                    position: point(angle, self.radius),
                    euler: [0.0, heading(angle), 0.0],
                }
            })
            .collect();

        let final_angle = start + TAU * (self.checkpoints + 1) as f32 / sections;
        let final_zone = Zone {
            position: point(final_angle, self.radius),
            radius: self.half_width,
        };

        let hostile_angle = start - TAU / sections * 0.5;
        let hostile_markers = vec![Zone {
            position: point(hostile_angle, self.radius),
            radius: self.half_width * 0.5,
        }];

        // Right slots face along travel; left slots face against it so the
        // negated handler offset still lands ahead of the obstacle.
        let mut slots = SlotTable::default();
        for j in 0..self.slots {
            let angle = start + TAU * (j as f32 + 0.5) / (self.slots as f32 + 1.0);
            slots.right.push(Pose {
                position: point(angle, self.radius + self.slot_offset),
                euler: [0.0, heading(angle), 0.0],
            });
            slots.left.push(Pose {
                position: point(angle, self.radius - self.slot_offset),
                euler: [0.0, heading(angle) + 180.0, 0.0],
            });
        }

        TrackLayout {
            spawn: Pose {
                position: spawn,
                euler: [0.0, DEFAULT_SPAWN_YAW, 0.0],
            },
            platform_up: [0.0, 1.0, 0.0],
            checkpoints,
            checkpoint_radius: 3.0,
            final_zone: Some(final_zone),
            hostile_markers,
            boundary: Some(Boundary::Annulus {
                center,
                inner_radius: self.radius - self.half_width,
                outer_radius: self.radius + self.half_width,
            }),
            obstacle_count: self.obstacles,
            slots,
        }
    }
}
