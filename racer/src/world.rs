//! # Headless Contact Proxy
//!
//! Stands in for the physics host when no engine is attached. Every trigger
//! is treated as a sphere (or the layout's boundary shape) and tested against
//! the vehicle's position after each step; the resulting contacts are queued
//! on the controller for the following step, the same way an engine's
//! collision callbacks would be.
//!
//! Checkpoint and handler contacts are edge-triggered: entering fires once,
//! staying inside does not fire again until the vehicle has left. Dwelling in
//! any checkpoint or in the final zone is reported on every tick.

use layout::{Boundary, TrackLayout, Zone as Sphere};
use physics::Vec3;
use track::{CheckpointId, ContactEvent, EpisodeController, Zone};

/// Radius of an obstacle's dodge handler trigger
pub const HANDLER_RADIUS: f32 = 2.0;
/// Radius of an unscaled obstacle body
pub const OBSTACLE_RADIUS: f32 = 1.0;

pub struct ProxyWorld {
    checkpoints: Vec<Vec3>,
    checkpoint_radius: f32,
    final_zone: Option<Sphere>,
    hostile_markers: Vec<Sphere>,
    boundary: Option<Boundary>,
    pub handler_radius: f32,
    pub obstacle_radius: f32,
    in_checkpoint: Vec<bool>,
    in_handler: Vec<bool>,
    last_position: Option<Vec3>,
    episode: u64,
}

impl ProxyWorld {
    #[must_use]
    pub fn new(layout: &TrackLayout) -> Self {
        let checkpoints: Vec<Vec3> = layout
            .checkpoints
            .iter()
            .map(|c| Vec3::from(c.position))
            .collect();
        Self {
            in_checkpoint: vec![false; checkpoints.len()],
            in_handler: vec![false; layout.obstacle_count],
            checkpoints,
            checkpoint_radius: layout.checkpoint_radius,
            final_zone: layout.final_zone,
            hostile_markers: layout.hostile_markers.clone(),
            boundary: layout.boundary,
            handler_radius: HANDLER_RADIUS,
            obstacle_radius: OBSTACLE_RADIUS,
            last_position: None,
            episode: 0,
        }
    }

    /// Report the vehicle's velocity and queue the contacts of its current
    /// position on `env`. Call once after every step.
    pub fn sync(&mut self, env: &mut EpisodeController) {
        let position = env.vehicle().transform.position;

        if env.episode() != self.episode {
            // New episode: the vehicle teleported back to the spawn
            self.episode = env.episode();
            self.in_checkpoint.fill(false);
            self.in_handler.fill(false);
            self.last_position = None;
        }

        let dt = env.config().fixed_delta_time;
        let velocity = self
            .last_position
            .map_or(Vec3::ZERO, |last| (position - last) / dt);
        env.set_velocity(velocity);
        self.last_position = Some(position);

        for event in self.contacts(env, position) {
            env.push_event(event);
        }
    }

    /// Contacts at `position`, updating the edge-trigger state.
    pub fn contacts(&mut self, env: &EpisodeController, position: Vec3) -> Vec<ContactEvent> {
        let mut events = Vec::new();

        let mut dwelling = false;
        for (i, (center, inside)) in self
            .checkpoints
            .iter()
            .zip(self.in_checkpoint.iter_mut())
            .enumerate()
        {
            let now = center.distance(position) <= self.checkpoint_radius;
            if now && !*inside {
                events.push(ContactEvent::CheckpointHit(CheckpointId(i)));
            }
            *inside = now;
            dwelling |= now;
        }
        if dwelling {
            events.push(ContactEvent::ZoneDwell(Zone::Other));
        }
        if self.final_zone.is_some_and(|z| z.contains(position)) {
            events.push(ContactEvent::FINAL_ZONE_DWELL);
        }

        if self.hostile_markers.iter().any(|m| m.contains(position)) {
            events.push(ContactEvent::HostileMarker);
        }
        if self.boundary.is_some_and(|b| !b.contains(position)) {
            events.push(ContactEvent::TerrainBoundary);
        }

        for (obstacle, inside) in env.registry().obstacles().iter().zip(self.in_handler.iter_mut()) {
            if obstacle.slot.is_none() {
                continue;
            }
            let now = obstacle.handler.position.distance(position) <= self.handler_radius;
            if now && !*inside {
                events.push(ContactEvent::ObstacleHandlerEnter(obstacle.id));
            }
            *inside = now;

            let body = self.obstacle_radius * obstacle.transform.scale.max_element();
            if obstacle.transform.position.distance(position) <= body {
                events.push(ContactEvent::ObstacleCollision(obstacle.id));
            }
        }

        events
    }
}
