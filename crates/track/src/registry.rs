//! Checkpoint and obstacle bookkeeping
//!
//! Entities get a stable integer id when the registry is built: their index.
//! Per-episode flags live next to the entity instead of in identity-keyed maps.

use layout::Side;
use physics::Transform;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckpointId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObstacleId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub transform: Transform,
    /// Set on first contact, cleared only by an episode reset
    pub visited: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub transform: Transform,
    /// Trigger zone whose entry counts as a successful dodge
    pub handler: Transform,
    /// Slot assigned by the latest placement pass
    pub slot: Option<(Side, usize)>,
    pub encountered: bool,
}

#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    checkpoints: Vec<Checkpoint>,
    obstacles: Vec<Obstacle>,
}

impl EntityRegistry {
    /// Register the track's checkpoints and `obstacle_count` unplaced
    /// obstacles.
    #[must_use]
    pub fn new(checkpoints: impl IntoIterator<Item = Transform>, obstacle_count: usize) -> Self {
        let checkpoints = checkpoints
            .into_iter()
            .enumerate()
            .map(|(i, transform)| Checkpoint {
                id: CheckpointId(i),
                transform,
                visited: false,
            })
            .collect();
        let obstacles = (0..obstacle_count)
            .map(|i| Obstacle {
                id: ObstacleId(i),
                transform: Transform::IDENTITY,
                handler: Transform::IDENTITY,
                slot: None,
                encountered: false,
            })
            .collect();
        Self {
            checkpoints,
            obstacles,
        }
    }

    #[must_use]
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    #[must_use]
    pub fn checkpoint(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.checkpoints.get(id.0)
    }

    #[must_use]
    pub fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.0)
    }

    /// Clear every visited and encountered flag.
    pub fn clear_flags(&mut self) {
        for checkpoint in &mut self.checkpoints {
            checkpoint.visited = false;
        }
        for obstacle in &mut self.obstacles {
            obstacle.encountered = false;
        }
    }

    /// Mark a checkpoint visited, returning its previous flag, or `None` for an
    /// unknown id.
    pub fn visit_checkpoint(&mut self, id: CheckpointId) -> Option<bool> {
        self.checkpoints
            .get_mut(id.0)
            .map(|c| std::mem::replace(&mut c.visited, true))
    }

    /// Mark an obstacle encountered, returning its previous flag, or `None`
    /// for an unknown id.
    pub fn encounter_obstacle(&mut self, id: ObstacleId) -> Option<bool> {
        self.obstacles
            .get_mut(id.0)
            .map(|o| std::mem::replace(&mut o.encountered, true))
    }
}
