//! Nearest-entity lookup
//!
//! Linear scans over the registry. Only unvisited checkpoints and
//! unencountered obstacles are candidates; ties go to the lowest id.

use crate::registry::{CheckpointId, EntityRegistry, ObstacleId};
use physics::Vec3;

/// Index of the candidate closest to `position`, first one winning ties.
fn nearest<I>(candidates: I, position: Vec3) -> Option<usize>
where
    I: IntoIterator<Item = (usize, Vec3)>,
{
    let mut best: Option<(usize, f32)> = None;
    for (index, at) in candidates {
        let distance = at.distance(position);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Closest checkpoint that has not been visited this episode
#[must_use]
pub fn nearest_unvisited_checkpoint(registry: &EntityRegistry, position: Vec3) -> Option<CheckpointId> {
    let candidates = registry
        .checkpoints()
        .iter()
        .filter(|c| !c.visited)
        .map(|c| (c.id.0, c.transform.position));
    nearest(candidates, position).map(CheckpointId)
}

/// Closest obstacle that has not been dodged this episode
#[must_use]
pub fn nearest_unencountered_obstacle(registry: &EntityRegistry, position: Vec3) -> Option<ObstacleId> {
    let candidates = registry
        .obstacles()
        .iter()
        .filter(|o| !o.encountered)
        .map(|o| (o.id.0, o.transform.position));
    nearest(candidates, position).map(ObstacleId)
}

/// Caches the current nearest targets between refreshes.
///
/// Targets are only recomputed on reset and when the vehicle claims one, not
/// every step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NearestEntityTracker {
    checkpoint: Option<CheckpointId>,
    obstacle: Option<ObstacleId>,
}

impl NearestEntityTracker {
    #[must_use]
    pub fn checkpoint(&self) -> Option<CheckpointId> {
        self.checkpoint
    }

    #[must_use]
    pub fn obstacle(&self) -> Option<ObstacleId> {
        self.obstacle
    }

    pub fn refresh(&mut self, registry: &EntityRegistry, position: Vec3) {
        self.refresh_checkpoint(registry, position);
        self.refresh_obstacle(registry, position);
    }

    pub fn refresh_checkpoint(&mut self, registry: &EntityRegistry, position: Vec3) {
        self.checkpoint = nearest_unvisited_checkpoint(registry, position);
        if self.checkpoint.is_none() {
            tracing::debug!("every checkpoint has been visited");
        }
    }

    pub fn refresh_obstacle(&mut self, registry: &EntityRegistry, position: Vec3) {
        self.obstacle = nearest_unencountered_obstacle(registry, position);
    }
}
