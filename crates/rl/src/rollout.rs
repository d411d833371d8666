//! Episode rollouts
//!
//! [`Rollout`] owns the running return of the current episode. Environments
//! only report per-step reward deltas.

use crate::{Env, Policy};

/// Summary of one finished (or cut-off) episode
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EpisodeStats {
    pub steps: usize,
    pub total_reward: f32,
    /// `true` if the environment ended the episode, `false` if the step
    /// budget ran out first
    pub done: bool,
}

/// Drives an environment with a policy, episode by episode.
///
/// When the environment ends an episode it has already reset itself, so the
/// observation returned by the terminating step seeds the next episode. An
/// episode cut off by `max_steps` is followed by an explicit reset.
#[derive(Debug, Default)]
pub struct Rollout {
    pub max_steps: usize,
    observation: Option<Vec<f32>>,
    episodes: usize,
}

impl Rollout {
    #[must_use]
    pub fn new(max_steps: usize) -> Self {
        Self {
            max_steps,
            observation: None,
            episodes: 0,
        }
    }

    /// Number of episodes run so far
    #[must_use]
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Forget the observation carried over from the last terminal step, so
    /// the next episode starts with an explicit `reset`.
    pub fn restart(&mut self) {
        self.observation = None;
    }

    pub fn run_episode<E, P>(&mut self, env: &mut E, policy: &mut P) -> EpisodeStats
    where
        E: Env + ?Sized,
        P: Policy + ?Sized,
    {
        let mut obs = match self.observation.take() {
            Some(obs) => obs,
            None => env.reset(),
        };
        let mut stats = EpisodeStats::default();

        while stats.steps < self.max_steps {
            let action = policy.act(&obs);
            let (next, reward, done) = env.step(&action);
            stats.steps += 1;
            stats.total_reward += reward;
            obs = next;
            if done {
                stats.done = true;
                self.observation = Some(obs);
                break;
            }
        }

        self.episodes += 1;
        tracing::debug!(
            "episode {} finished after {} steps, return {:.4}, done = {}",
            self.episodes,
            stats.steps,
            stats.total_reward,
            stats.done
        );
        stats
    }
}
