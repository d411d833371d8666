//! # Reward Shaping
//!
//! Maps scored events to a reward delta and an optional termination. The
//! shaper is stateless: it never sees the running return, and the episode
//! controller is the one that updates flags and timers around it.

use crate::config::RewardConfig;
use crate::registry::{CheckpointId, ObstacleId};

/// Kind of trigger volume the vehicle is dwelling in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Zone {
    /// The end-of-track zone; dwelling there is rewarded
    Final,
    /// Any other trigger, checkpoints included
    Other,
}

/// Contact reported by the physics host since the previous step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContactEvent {
    CheckpointHit(CheckpointId),
    HostileMarker,
    TerrainBoundary,
    ObstacleHandlerEnter(ObstacleId),
    ObstacleCollision(ObstacleId),
    /// One tick spent inside a trigger volume
    ZoneDwell(Zone),
}

impl ContactEvent {
    /// Shorthand for dwelling in the final zone
    pub const FINAL_ZONE_DWELL: Self = ContactEvent::ZoneDwell(Zone::Final);
}

/// Event as scored by the [`RewardShaper`], after the controller resolved
/// the entity state it depends on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RewardEvent {
    CheckpointFirstVisit,
    CheckpointRevisit,
    HostileMarker,
    TerrainBoundary,
    ObstacleDodged,
    ObstacleCollision,
    FinalZoneDwell,
    DwellTimeout(Zone),
    OffTrack,
    StepLimit,
}

/// Why an episode ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminationCause {
    RevisitedCheckpoint,
    HostileMarker,
    TerrainBoundary,
    ObstacleCollision,
    OffTrack,
    DwellTimeout,
    StepLimit,
}

/// Reward delta plus termination decision for one event
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Verdict {
    pub reward: f32,
    pub termination: Option<TerminationCause>,
}

impl Verdict {
    pub const NONE: Self = Self {
        reward: 0.0,
        termination: None,
    };

    #[must_use]
    pub const fn reward(reward: f32) -> Self {
        Self {
            reward,
            termination: None,
        }
    }

    #[must_use]
    pub const fn terminal(reward: f32, cause: TerminationCause) -> Self {
        Self {
            reward,
            termination: Some(cause),
        }
    }

    /// Sum two verdicts; the first termination wins.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self {
            reward: self.reward + other.reward,
            termination: self.termination.or(other.termination),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.termination.is_some()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RewardShaper {
    pub rewards: RewardConfig,
}

impl RewardShaper {
    #[must_use]
    pub const fn new(rewards: RewardConfig) -> Self {
        Self { rewards }
    }

    #[must_use]
    pub fn evaluate(&self, event: RewardEvent) -> Verdict {
        let r = &self.rewards;
        match event {
            RewardEvent::CheckpointFirstVisit => Verdict::reward(r.checkpoint_first_visit),
            RewardEvent::CheckpointRevisit => {
                Verdict::terminal(r.checkpoint_revisit, TerminationCause::RevisitedCheckpoint)
            }
            RewardEvent::HostileMarker => {
                Verdict::terminal(r.hostile_marker, TerminationCause::HostileMarker)
            }
            RewardEvent::TerrainBoundary => {
                Verdict::terminal(r.terrain_boundary, TerminationCause::TerrainBoundary)
            }
            RewardEvent::ObstacleDodged => Verdict::reward(r.obstacle_dodged),
            RewardEvent::ObstacleCollision => {
                Verdict::terminal(r.obstacle_collision, TerminationCause::ObstacleCollision)
            }
            RewardEvent::FinalZoneDwell => Verdict::reward(r.final_zone_dwell),
            RewardEvent::DwellTimeout(Zone::Final) => {
                Verdict::terminal(r.final_zone_timeout, TerminationCause::DwellTimeout)
            }
            RewardEvent::DwellTimeout(Zone::Other) => {
                Verdict::terminal(r.dwell_timeout, TerminationCause::DwellTimeout)
            }
            RewardEvent::OffTrack => Verdict::terminal(r.off_track, TerminationCause::OffTrack),
            RewardEvent::StepLimit => Verdict::terminal(0.0, TerminationCause::StepLimit),
        }
    }
}
