//! Action providers
//!
//! A [`Policy`] turns the latest observation into the next action vector. The
//! environment does not care whether that comes from a person at the keyboard,
//! a random baseline or a trained network.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decision-maker driving an [`Env`](crate::Env)
pub trait Policy {
    /// Choose the next action for `observation`.
    fn act(&mut self, observation: &[f32]) -> Vec<f32>;
}

/// Pressed state of the manual driving keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub space: bool,
}

/// Manual driving: maps the arrow keys and space bar onto the
/// `[drive, turn, brake]` action.
///
/// Up wins over Down and Left wins over Right when both are held.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicPolicy {
    pub keys: Keys,
}

impl HeuristicPolicy {
    const DRIVE: f32 = 0.5;
    const TURN: f32 = 0.5;
    const BRAKE: f32 = 1.0;

    #[must_use]
    pub const fn new(keys: Keys) -> Self {
        Self { keys }
    }

    #[must_use]
    pub fn action(&self) -> [f32; 3] {
        let k = self.keys;
        let drive = if k.up {
            Self::DRIVE
        } else if k.down {
            -Self::DRIVE
        } else {
            0.0
        };
        let turn = if k.left {
            -Self::TURN
        } else if k.right {
            Self::TURN
        } else {
            0.0
        };
        let brake = if k.space { Self::BRAKE } else { 0.0 };
        [drive, turn, brake]
    }
}

impl Policy for HeuristicPolicy {
    fn act(&mut self, _observation: &[f32]) -> Vec<f32> {
        self.action().to_vec()
    }
}

/// Uniform random actions in `[-1, 1]`
pub struct RandomPolicy {
    rng: fastrand::Rng,
    action_size: usize,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(action_size: usize, seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            action_size,
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &[f32]) -> Vec<f32> {
        (0..self.action_size)
            .map(|_| self.rng.f32() * 2.0 - 1.0)
            .collect()
    }
}

/// Single dense layer with a `tanh` head: `action = tanh(W * obs + b)`.
///
/// Weights are stored row-major, one row of `in_dim` values per output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearPolicy {
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
    pub in_dim: usize,
    pub out_dim: usize,
}

impl LinearPolicy {
    /// A policy that always outputs `tanh(bias)`.
    #[must_use]
    pub fn zeros(in_dim: usize, out_dim: usize) -> Self {
        Self {
            weights: vec![0.0; in_dim * out_dim],
            bias: vec![0.0; out_dim],
            in_dim,
            out_dim,
        }
    }

    /// Parse exported weights from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the weight and bias
    /// lengths disagree with the declared dimensions.
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: Self = serde_json::from_str(json).context("invalid policy weights JSON")?;
        if policy.weights.len() != policy.in_dim * policy.out_dim {
            bail!(
                "expected {} weights for a {}x{} layer, found {}",
                policy.in_dim * policy.out_dim,
                policy.out_dim,
                policy.in_dim,
                policy.weights.len()
            );
        }
        if policy.bias.len() != policy.out_dim {
            bail!("expected {} biases, found {}", policy.out_dim, policy.bias.len());
        }
        Ok(policy)
    }

    /// Read exported weights from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid export.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read policy {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Evaluate the layer. Missing observation entries read as zero.
    #[must_use]
    pub fn forward(&self, x: &[f32]) -> Vec<f32> {
        (0..self.out_dim)
            .map(|o| {
                let row = &self.weights[o * self.in_dim..(o + 1) * self.in_dim];
                let sum = row
                    .iter()
                    .zip(x)
                    .fold(self.bias[o], |acc, (w, v)| acc + w * v);
                sum.tanh()
            })
            .collect()
    }
}

impl Policy for LinearPolicy {
    fn act(&mut self, observation: &[f32]) -> Vec<f32> {
        if observation.len() != self.in_dim {
            tracing::warn!(
                "policy expects {} observations, got {}",
                self.in_dim,
                observation.len()
            );
        }
        self.forward(observation)
    }
}
