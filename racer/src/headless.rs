//! Episode controller and contact proxy bundled into one [`rl::Env`]

use crate::world::ProxyWorld;
use anyhow::Result;
use layout::TrackLayout;
use physics::Action;
use rl::{Env, Rollout};
use std::collections::HashMap;
use track::{EpisodeController, StepResult, TerminationCause, TrackConfig, TrackError};

/// A racing environment that needs no physics engine.
///
/// Each step runs the controller, then lets the [`ProxyWorld`] measure the
/// vehicle's velocity and queue the contacts for the next step.
pub struct HeadlessTrack {
    controller: EpisodeController,
    world: ProxyWorld,
    last: StepResult,
    causes: HashMap<TerminationCause, usize>,
}

impl HeadlessTrack {
    /// # Errors
    ///
    /// Returns an error if the controller rejects the layout or config.
    pub fn new(layout: &TrackLayout, config: TrackConfig) -> Result<Self> {
        Ok(Self {
            controller: EpisodeController::new(layout, config)?,
            world: ProxyWorld::new(layout),
            last: StepResult::default(),
            causes: HashMap::new(),
        })
    }

    #[must_use]
    pub fn controller(&self) -> &EpisodeController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut EpisodeController {
        &mut self.controller
    }

    /// Swap in `config` for the next episode `rollout` runs.
    ///
    /// A terminal step has already started the following episode under the
    /// old config, so the rollout is told to reset first.
    ///
    /// # Errors
    ///
    /// Returns the controller's validation error; nothing changes then.
    pub fn reconfigure(
        &mut self,
        config: TrackConfig,
        rollout: &mut Rollout,
    ) -> Result<(), TrackError> {
        self.controller.reconfigure(config)?;
        rollout.restart();
        Ok(())
    }

    /// Result of the latest step
    #[must_use]
    pub fn last_step(&self) -> StepResult {
        self.last
    }

    /// How many episodes ended for each cause so far
    #[must_use]
    pub fn termination_counts(&self) -> &HashMap<TerminationCause, usize> {
        &self.causes
    }
}

impl Env for HeadlessTrack {
    fn step(&mut self, action: &[f32]) -> (Vec<f32>, f32, bool) {
        self.last = self.controller.step(Action::from_slice(action));
        if let Some(cause) = self.last.cause {
            *self.causes.entry(cause).or_default() += 1;
        }
        self.world.sync(&mut self.controller);
        (
            self.controller.observe().to_vec(),
            self.last.reward,
            self.last.terminated,
        )
    }

    fn reset(&mut self) -> Vec<f32> {
        self.controller.reset();
        self.world.sync(&mut self.controller);
        self.controller.observe().to_vec()
    }

    fn obs_size(&self) -> usize {
        self.controller.obs_size()
    }

    fn action_size(&self) -> usize {
        self.controller.action_size()
    }
}
