//! # Episode Controller
//!
//! The per-step control loop of the racing environment.
//!
//! An [`EpisodeController`] owns the vehicle, the entity registry and the
//! obstacle placer, and walks a small state machine:
//!
//! ```text
//! Uninitialized --reset--> Active --terminating step--> Terminating --reset--> Active
//! ```
//!
//! A step applies the action through [`VehicleKinematics`], then scores the
//! contacts the physics host queued with [`EpisodeController::push_event`].
//! The first terminating rule short-circuits the rest of the step: queued
//! events after it are dropped, the terminal reward is reported and the next
//! episode starts immediately. State mutated before the terminating rule is
//! not rolled back.

use crate::config::TrackConfig;
use crate::error::TrackError;
use crate::nearest::NearestEntityTracker;
use crate::observation::Observation;
use crate::placement::ObstaclePlacer;
use crate::registry::EntityRegistry;
use crate::reward::{ContactEvent, RewardEvent, RewardShaper, TerminationCause, Verdict, Zone};
use layout::{SlotTable, TrackLayout};
use physics::{Action, Grounding, Transform, Vec3, VehicleKinematics, VehicleState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeState {
    /// Built but never reset
    Uninitialized,
    Active,
    /// A rule ended the episode; the next reset is pending
    Terminating,
}

/// Outcome of one step
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepResult {
    /// Reward delta earned by this step
    pub reward: f32,
    pub terminated: bool,
    pub cause: Option<TerminationCause>,
}

/// Static scene pieces the controller is built from
#[derive(Clone, Debug)]
pub struct Scene {
    pub spawn: Transform,
    pub platform_up: Vec3,
    pub checkpoints: Vec<Transform>,
    pub slots: SlotTable,
    pub obstacle_count: usize,
}

impl From<&TrackLayout> for Scene {
    fn from(layout: &TrackLayout) -> Self {
        Self {
            spawn: layout.spawn_transform(),
            platform_up: layout.platform_up(),
            checkpoints: layout.checkpoint_transforms(),
            slots: layout.slots.clone(),
            obstacle_count: layout.obstacle_count,
        }
    }
}

pub struct EpisodeController {
    config: TrackConfig,
    pending_config: Option<TrackConfig>,
    kinematics: VehicleKinematics,
    shaper: RewardShaper,
    registry: EntityRegistry,
    tracker: NearestEntityTracker,
    placer: ObstaclePlacer,
    vehicle: VehicleState,
    spawn: Transform,
    platform_up: Vec3,
    events: Vec<ContactEvent>,
    dwell_timer: f32,
    state: EpisodeState,
    rng: fastrand::Rng,
    episode: u64,
    step_count: u32,
}

impl EpisodeController {
    /// Build a controller for a track layout.
    ///
    /// The controller starts [`EpisodeState::Uninitialized`]; call
    /// [`reset`](Self::reset) before the first step, or let the first step do
    /// it.
    ///
    /// # Errors
    ///
    /// Returns a [`TrackError`] if the config is invalid or the slot table
    /// cannot hold the layout's obstacles.
    pub fn new(layout: &TrackLayout, config: TrackConfig) -> Result<Self, TrackError> {
        Self::from_scene(Scene::from(layout), config)
    }

    /// Build a controller from already resolved scene pieces.
    ///
    /// # Errors
    ///
    /// Same as [`EpisodeController::new`].
    pub fn from_scene(scene: Scene, config: TrackConfig) -> Result<Self, TrackError> {
        config.validate()?;
        let placer = ObstaclePlacer::new(
            scene.slots,
            scene.obstacle_count,
            config.obstacle_scale,
            config.handler_offset,
        )?;
        let rng = config.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Ok(Self {
            kinematics: VehicleKinematics::new(config.vehicle.kinematics),
            shaper: RewardShaper::new(config.rewards),
            registry: EntityRegistry::new(scene.checkpoints, scene.obstacle_count),
            tracker: NearestEntityTracker::default(),
            placer,
            vehicle: VehicleState::at_rest(scene.spawn, 0.0, 0.0),
            spawn: scene.spawn,
            platform_up: scene.platform_up,
            events: Vec::new(),
            dwell_timer: 0.0,
            state: EpisodeState::Uninitialized,
            rng,
            episode: 0,
            step_count: 0,
            config,
            pending_config: None,
        })
    }

    #[must_use]
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    #[must_use]
    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    /// Mutable vehicle access for the physics host, e.g. to write back the
    /// simulated transform.
    pub fn vehicle_mut(&mut self) -> &mut VehicleState {
        &mut self.vehicle
    }

    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn nearest(&self) -> &NearestEntityTracker {
        &self.tracker
    }

    #[must_use]
    pub fn placer(&self) -> &ObstaclePlacer {
        &self.placer
    }

    #[must_use]
    pub fn dwell_timer(&self) -> f32 {
        self.dwell_timer
    }

    /// Episodes started so far, counting the current one
    #[must_use]
    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Steps taken in the current episode
    #[must_use]
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    #[must_use]
    pub fn spawn(&self) -> Transform {
        self.spawn
    }

    /// Velocity of the vehicle as measured by the physics host
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.vehicle.velocity = velocity;
    }

    pub fn set_platform_up(&mut self, up: Vec3) {
        self.platform_up = up;
    }

    /// Queue a contact for the next step.
    pub fn push_event(&mut self, event: ContactEvent) {
        self.events.push(event);
    }

    /// Replace the configuration from the next episode on.
    ///
    /// # Errors
    ///
    /// Returns a [`TrackError`] if `config` is invalid; the current
    /// configuration stays in place.
    pub fn reconfigure(&mut self, config: TrackConfig) -> Result<(), TrackError> {
        config.validate()?;
        self.pending_config = Some(config);
        Ok(())
    }

    fn apply_pending_config(&mut self) {
        let Some(config) = self.pending_config.take() else {
            return;
        };
        self.kinematics = VehicleKinematics::new(config.vehicle.kinematics);
        self.shaper = RewardShaper::new(config.rewards);
        self.placer.scale = config.obstacle_scale;
        self.placer.handler_offset = config.handler_offset;
        if config.seed.is_some() && config.seed != self.config.seed {
            self.rng = config.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        }
        tracing::info!("applied new track configuration");
        self.config = config;
    }

    /// Start a new episode.
    ///
    /// Puts the vehicle back on the spawn pose at rest, clears every visited
    /// and encountered flag, draws this episode's speed window, scatters the
    /// obstacles and picks the initial nearest targets. Safe to call at any
    /// time; an episode in progress is simply abandoned.
    pub fn reset(&mut self) {
        self.apply_pending_config();

        let (min_speed, max_speed) = self.config.vehicle.draw_speed_window(&self.rng);
        self.vehicle = VehicleState::at_rest(self.spawn, min_speed, max_speed);
        self.dwell_timer = 0.0;
        self.step_count = 0;
        self.events.clear();

        self.registry.clear_flags();
        self.placer.remove_positions(&self.rng);
        self.placer.place(&mut self.registry, &self.rng);
        self.tracker.refresh(&self.registry, self.vehicle.transform.position);

        self.episode += 1;
        self.state = EpisodeState::Active;
        tracing::debug!(
            "episode {} started, speed window [{min_speed:.3}, {max_speed:.3}]",
            self.episode
        );
    }

    /// Observation of the current state.
    #[must_use]
    pub fn observe(&self) -> Observation {
        let checkpoint = self
            .tracker
            .checkpoint()
            .and_then(|id| self.registry.checkpoint(id))
            .map(|c| &c.transform);
        let obstacle = self
            .tracker
            .obstacle()
            .and_then(|id| self.registry.obstacle(id))
            .map(|o| &o.transform);
        Observation::build(&self.vehicle, checkpoint, obstacle)
    }

    /// Advance one tick with `action` and score the queued contacts.
    ///
    /// Stepping a controller that is not [`EpisodeState::Active`] starts a
    /// fresh episode first.
    pub fn step(&mut self, action: Action) -> StepResult {
        if self.state != EpisodeState::Active {
            self.reset();
        }
        self.step_count += 1;
        let dt = self.config.fixed_delta_time;

        let grounding = self
            .kinematics
            .apply(&mut self.vehicle, action, self.platform_up, dt);
        if grounding == Grounding::OffTrack {
            return self.conclude(self.shaper.evaluate(RewardEvent::OffTrack));
        }

        let mut verdict = Verdict::NONE;
        for event in std::mem::take(&mut self.events) {
            verdict = verdict.and(self.handle(event, dt));
            if verdict.is_terminal() {
                return self.conclude(verdict);
            }
        }

        let limit = self.config.max_episode_steps;
        if limit > 0 && self.step_count >= limit {
            verdict = verdict.and(self.shaper.evaluate(RewardEvent::StepLimit));
        }
        self.conclude(verdict)
    }

    /// Score one contact, updating flags, targets and the dwell timer.
    fn handle(&mut self, event: ContactEvent, dt: f32) -> Verdict {
        let position = self.vehicle.transform.position;
        match event {
            ContactEvent::CheckpointHit(id) => match self.registry.visit_checkpoint(id) {
                Some(true) => self.shaper.evaluate(RewardEvent::CheckpointRevisit),
                Some(false) => {
                    self.dwell_timer = 0.0;
                    self.tracker.refresh_checkpoint(&self.registry, position);
                    self.shaper.evaluate(RewardEvent::CheckpointFirstVisit)
                }
                None => {
                    tracing::warn!("contact with unknown checkpoint {}", id.0);
                    Verdict::NONE
                }
            },
            ContactEvent::HostileMarker => self.shaper.evaluate(RewardEvent::HostileMarker),
            ContactEvent::TerrainBoundary => self.shaper.evaluate(RewardEvent::TerrainBoundary),
            ContactEvent::ObstacleHandlerEnter(id) => {
                if self.registry.encounter_obstacle(id).is_none() {
                    tracing::warn!("contact with unknown obstacle handler {}", id.0);
                    return Verdict::NONE;
                }
                self.tracker.refresh_obstacle(&self.registry, position);
                self.shaper.evaluate(RewardEvent::ObstacleDodged)
            }
            ContactEvent::ObstacleCollision(_) => {
                self.shaper.evaluate(RewardEvent::ObstacleCollision)
            }
            ContactEvent::ZoneDwell(zone) => {
                self.dwell_timer += dt;
                let mut verdict = match zone {
                    Zone::Final => self.shaper.evaluate(RewardEvent::FinalZoneDwell),
                    Zone::Other => Verdict::NONE,
                };
                if self.dwell_timer > self.config.dwell_limit {
                    verdict = verdict.and(self.shaper.evaluate(RewardEvent::DwellTimeout(zone)));
                }
                verdict
            }
        }
    }

    fn conclude(&mut self, verdict: Verdict) -> StepResult {
        let Some(cause) = verdict.termination else {
            return StepResult {
                reward: verdict.reward,
                terminated: false,
                cause: None,
            };
        };
        self.state = EpisodeState::Terminating;
        tracing::info!(
            "episode {} ended after {} steps: {:?} (reward {:+.4})",
            self.episode,
            self.step_count,
            cause,
            verdict.reward
        );
        self.reset();
        StepResult {
            reward: verdict.reward,
            terminated: true,
            cause: Some(cause),
        }
    }
}

impl rl::Env for EpisodeController {
    fn step(&mut self, action: &[f32]) -> (Vec<f32>, f32, bool) {
        let result = EpisodeController::step(self, Action::from_slice(action));
        (self.observe().to_vec(), result.reward, result.terminated)
    }

    fn reset(&mut self) -> Vec<f32> {
        EpisodeController::reset(self);
        self.observe().to_vec()
    }

    fn obs_size(&self) -> usize {
        Observation::SIZE
    }

    fn action_size(&self) -> usize {
        Action::SIZE
    }
}
