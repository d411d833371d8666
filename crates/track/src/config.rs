//! # Track Configuration
//!
//! Every tunable of the episode loop, loadable from JSON. Unset fields keep
//! their defaults, so `{}` is a complete configuration.

use crate::error::TrackError;
use physics::KinematicsParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Range `max_speed` is drawn from when no static value is configured
pub const MAX_SPEED_RANGE: (f32, f32) = (0.8, 1.4);
/// Range `min_speed` is drawn from when no static value is configured
pub const MIN_SPEED_RANGE: (f32, f32) = (-0.5, -0.01);

/// Vehicle tunables
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    #[serde(flatten)]
    pub kinematics: KinematicsParams,
    /// Fixed lower speed bound. `0.0` means "draw one every episode", so a
    /// genuine zero bound cannot be configured.
    pub min_static_speed: f32,
    /// Fixed upper speed bound, with the same `0.0` convention.
    pub max_static_speed: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            kinematics: KinematicsParams::default(),
            min_static_speed: 0.0,
            max_static_speed: 0.0,
        }
    }
}

impl VehicleConfig {
    /// Pick this episode's `(min_speed, max_speed)`.
    #[must_use]
    pub fn draw_speed_window(&self, rng: &fastrand::Rng) -> (f32, f32) {
        let draw = |(lo, hi): (f32, f32)| lo + (hi - lo) * rng.f32();
        let max = if self.max_static_speed == 0.0 {
            draw(MAX_SPEED_RANGE)
        } else {
            self.max_static_speed
        };
        let min = if self.min_static_speed == 0.0 {
            draw(MIN_SPEED_RANGE)
        } else {
            self.min_static_speed
        };
        (min, max)
    }

    fn validate(&self) -> Result<(), TrackError> {
        let k = &self.kinematics;
        if ![k.forward_acc, k.backward_acc, k.brake_acc, k.turn_strength]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(TrackError::InvalidConfig(
                "vehicle accelerations and turn_strength must be finite",
            ));
        }
        if !(-1.0..1.0).contains(&k.grounded_threshold) {
            return Err(TrackError::InvalidConfig("grounded_threshold must lie in [-1, 1)"));
        }

        // Worst case pairing of a static bound with the opposite drawn range
        let min = if self.min_static_speed == 0.0 {
            MIN_SPEED_RANGE.1
        } else {
            self.min_static_speed
        };
        let max = if self.max_static_speed == 0.0 {
            MAX_SPEED_RANGE.0
        } else {
            self.max_static_speed
        };
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(TrackError::InvalidSpeedWindow { min, max });
        }
        Ok(())
    }
}

/// Reward deltas for each scored event
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub checkpoint_first_visit: f32,
    pub checkpoint_revisit: f32,
    pub hostile_marker: f32,
    pub terrain_boundary: f32,
    pub obstacle_dodged: f32,
    pub obstacle_collision: f32,
    /// Per tick spent inside the final zone
    pub final_zone_dwell: f32,
    /// Dwell limit exceeded anywhere but the final zone
    pub dwell_timeout: f32,
    /// Dwell limit exceeded inside the final zone
    pub final_zone_timeout: f32,
    pub off_track: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            checkpoint_first_visit: 1.0,
            checkpoint_revisit: -0.4,
            hostile_marker: -1.0,
            terrain_boundary: -1.0,
            obstacle_dodged: 1.0,
            obstacle_collision: -1.0,
            final_zone_dwell: 0.0001,
            dwell_timeout: -0.7,
            final_zone_timeout: 0.0,
            off_track: -1.0,
        }
    }
}

/// Complete configuration of the episode loop
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub vehicle: VehicleConfig,
    pub rewards: RewardConfig,
    /// Seconds simulated by one step
    pub fixed_delta_time: f32,
    /// Seconds of trigger dwelling tolerated before the episode is ended
    pub dwell_limit: f32,
    /// Steps after which an episode is cut off; `0` disables the limit
    pub max_episode_steps: u32,
    pub obstacle_scale: f32,
    /// Distance of an obstacle's dodge handler from the obstacle
    pub handler_offset: f32,
    /// Seed for placement and speed draws; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            vehicle: VehicleConfig::default(),
            rewards: RewardConfig::default(),
            fixed_delta_time: 0.02,
            dwell_limit: 1.0,
            max_episode_steps: 0,
            obstacle_scale: 0.8153,
            handler_offset: 3.5,
            seed: None,
        }
    }
}

impl TrackConfig {
    /// Parse and validate a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Json`] for malformed JSON and the matching
    /// validation error for inconsistent values.
    pub fn from_json(json: &str) -> Result<Self, TrackError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Io`] if the file cannot be read, otherwise the
    /// errors of [`TrackConfig::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidSpeedWindow`] if a static speed bound can
    /// end up above the upper bound, or [`TrackError::InvalidConfig`] for a
    /// non-positive time step, a negative dwell limit, non-finite vehicle or
    /// handler tunables, or a grounded threshold no tilt can satisfy.
    pub fn validate(&self) -> Result<(), TrackError> {
        if !(self.fixed_delta_time.is_finite() && self.fixed_delta_time > 0.0) {
            return Err(TrackError::InvalidConfig("fixed_delta_time must be positive"));
        }
        if !(self.dwell_limit.is_finite() && self.dwell_limit >= 0.0) {
            return Err(TrackError::InvalidConfig("dwell_limit must not be negative"));
        }
        if !(self.obstacle_scale.is_finite() && self.obstacle_scale > 0.0) {
            return Err(TrackError::InvalidConfig("obstacle_scale must be positive"));
        }
        if !self.handler_offset.is_finite() {
            return Err(TrackError::InvalidConfig("handler_offset must be finite"));
        }
        self.vehicle.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = TrackConfig::from_json("{}").unwrap();
        assert_eq!(config, TrackConfig::default());
    }

    #[test]
    fn vehicle_fields_are_flat() {
        let config = TrackConfig::from_json(
            r#"{ "vehicle": { "forward_acc": 12.0, "max_static_speed": 2.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.vehicle.kinematics.forward_acc, 12.0);
        assert_eq!(config.vehicle.kinematics.backward_acc, 5.0);
        assert_eq!(config.vehicle.max_static_speed, 2.0);
    }

    #[test]
    fn drawn_window_stays_in_documented_ranges() {
        let rng = fastrand::Rng::with_seed(3);
        let vehicle = VehicleConfig::default();
        for _ in 0..1000 {
            let (min, max) = vehicle.draw_speed_window(&rng);
            assert!((MIN_SPEED_RANGE.0..=MIN_SPEED_RANGE.1).contains(&min));
            assert!((MAX_SPEED_RANGE.0..=MAX_SPEED_RANGE.1).contains(&max));
        }
    }

    #[test]
    fn static_bounds_override_draws() {
        let rng = fastrand::Rng::with_seed(3);
        let vehicle = VehicleConfig {
            min_static_speed: -0.25,
            max_static_speed: 0.9,
            ..VehicleConfig::default()
        };
        assert_eq!(vehicle.draw_speed_window(&rng), (-0.25, 0.9));
    }

    #[test]
    fn inverted_speed_window_is_rejected() {
        let err = TrackConfig::from_json(
            r#"{ "vehicle": { "min_static_speed": 0.5, "max_static_speed": 0.2 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TrackError::InvalidSpeedWindow { .. }));

        // A static minimum above every drawable maximum is just as broken
        let err = TrackConfig::from_json(r#"{ "vehicle": { "min_static_speed": 1.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, TrackError::InvalidSpeedWindow { .. }));
    }

    #[test]
    fn zero_time_step_is_rejected() {
        let err = TrackConfig::from_json(r#"{ "fixed_delta_time": 0.0 }"#).unwrap_err();
        assert!(matches!(err, TrackError::InvalidConfig(_)));
    }

    #[test]
    fn unreachable_grounded_threshold_is_rejected() {
        let err = TrackConfig::from_json(r#"{ "vehicle": { "grounded_threshold": 1.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, TrackError::InvalidConfig(_)));

        let ok = TrackConfig::from_json(r#"{ "vehicle": { "grounded_threshold": -1.0 } }"#);
        assert!(ok.is_ok());
    }

    #[test]
    fn non_finite_tunables_are_rejected() {
        let mut config = TrackConfig::default();
        config.vehicle.kinematics.forward_acc = f32::NAN;
        assert!(matches!(config.validate(), Err(TrackError::InvalidConfig(_))));

        let mut config = TrackConfig::default();
        config.vehicle.kinematics.turn_strength = f32::INFINITY;
        assert!(matches!(config.validate(), Err(TrackError::InvalidConfig(_))));

        let mut config = TrackConfig::default();
        config.vehicle.kinematics.grounded_threshold = f32::NAN;
        assert!(matches!(config.validate(), Err(TrackError::InvalidConfig(_))));

        let config = TrackConfig {
            handler_offset: f32::NEG_INFINITY,
            ..TrackConfig::default()
        };
        assert!(matches!(config.validate(), Err(TrackError::InvalidConfig(_))));
    }
}
