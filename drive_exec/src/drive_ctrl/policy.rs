//! # Speed policies
//!
//! A speed policy decides the target speed for the current cycle. Both
//! policies slow the vehicle down from `max_speed` when it is struggling to
//! hold the path, they differ in what they treat as struggling.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Params;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The policy used to compute the target speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedPolicy {
    /// Linear slowdown proportional to the magnitude of the shaped steering
    /// demand, reaching `full_steer_speed` at full lock.
    SteerMagnitude,

    /// Exponential slowdown driven by the magnitude of the cross track error,
    /// only active above `recovery_speed_threshold`.
    ///
    /// The penalty is not bounded above by one, so for large cross track
    /// errors (beyond 2) the target drops below `min_recovery_speed` and can
    /// become negative.
    ErrorMagnitude,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The result of evaluating a speed policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedTarget {
    /// Speed the throttle controller should aim for.
    pub target_speed: f64,

    /// Fraction of the slowdown range applied. Zero means `max_speed`.
    pub penalty: f64,

    /// The speed this policy treats as its floor.
    pub floor_speed: f64,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown speed policy \"{0}\", expected \"steer_magnitude\" or \"error_magnitude\"")]
pub struct ParsePolicyError(String);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SpeedPolicy {
    /// Compute the target speed.
    ///
    /// `steer` is the already shaped steering demand for this cycle.
    pub fn target_speed(
        &self,
        params: &Params,
        cte: f64,
        speed: f64,
        steer: f64
    ) -> SpeedTarget {
        match self {
            SpeedPolicy::SteerMagnitude => {
                let penalty = steer.abs();
                SpeedTarget {
                    target_speed: params.max_speed 
                        - (params.max_speed - params.full_steer_speed) * penalty,
                    penalty,
                    floor_speed: params.full_steer_speed
                }
            },
            SpeedPolicy::ErrorMagnitude => {
                let err_mag = cte.abs() / 2f64;

                // exp(e) / exp(1/e) folded into a single exponential
                let penalty = if speed > params.recovery_speed_threshold 
                    && err_mag > params.min_error_magnitude 
                {
                    (err_mag - 1f64 / err_mag).exp()
                }
                else {
                    0f64
                };

                SpeedTarget {
                    target_speed: params.max_speed 
                        - (params.max_speed - params.min_recovery_speed) * penalty,
                    penalty,
                    floor_speed: params.min_recovery_speed
                }
            }
        }
    }
}

impl Default for SpeedPolicy {
    fn default() -> Self {
        SpeedPolicy::SteerMagnitude
    }
}

impl FromStr for SpeedPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steer_magnitude" | "steer" => Ok(SpeedPolicy::SteerMagnitude),
            "error_magnitude" | "error" => Ok(SpeedPolicy::ErrorMagnitude),
            _ => Err(ParsePolicyError(s.to_string()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_steer_magnitude() {
        let params = Params::default();
        let policy = SpeedPolicy::SteerMagnitude;

        assert_eq!(policy.target_speed(&params, 0.3, 30.0, 0.0).target_speed, 50.0);
        assert_eq!(policy.target_speed(&params, 0.3, 30.0, 1.0).target_speed, 20.0);
        assert_eq!(policy.target_speed(&params, 0.3, 30.0, -1.0).target_speed, 20.0);
        assert_eq!(policy.target_speed(&params, 0.3, 30.0, 0.5).target_speed, 35.0);
        assert_eq!(policy.target_speed(&params, 0.3, 30.0, -0.5).penalty, 0.5);
    }

    #[test]
    fn test_error_magnitude_no_error() {
        let params = Params::default();
        let target = SpeedPolicy::ErrorMagnitude.target_speed(&params, 0.0, 40.0, 0.7);

        assert_eq!(target.penalty, 0.0);
        assert_eq!(target.target_speed, params.max_speed);
    }

    #[test]
    fn test_error_magnitude_below_speed_threshold() {
        let params = Params::default();
        let speed = params.recovery_speed_threshold;
        let target = SpeedPolicy::ErrorMagnitude.target_speed(&params, 1.5, speed, 0.0);

        assert_eq!(target.penalty, 0.0);
        assert_eq!(target.target_speed, params.max_speed);
    }

    #[test]
    fn test_error_magnitude_penalty() {
        let params = Params::default();

        // |cte| / 2 == 1 gives exp(1) / exp(1) == 1, i.e. the recovery speed
        let target = SpeedPolicy::ErrorMagnitude.target_speed(&params, -2.0, 40.0, 0.0);
        assert!((target.penalty - 1.0).abs() < 1e-12);
        assert!((target.target_speed - params.min_recovery_speed).abs() < 1e-9);

        // Small errors barely slow the vehicle down
        let target = SpeedPolicy::ErrorMagnitude.target_speed(&params, 0.4, 40.0, 0.0);
        let expected = (0.2f64).exp() / (5f64).exp();
        assert!((target.penalty - expected).abs() < 1e-12);
        assert!(target.target_speed < params.max_speed);
        assert!(target.target_speed > params.max_speed - 1.0);
    }

    #[test]
    fn test_error_magnitude_unbounded_penalty() {
        let params = Params::default();

        // Large errors push the target below the recovery speed and beyond
        // zero. This is left unclamped.
        let target = SpeedPolicy::ErrorMagnitude.target_speed(&params, 8.0, 40.0, 0.0);
        assert!(target.penalty > 1.0);
        assert!(target.target_speed < target.floor_speed);
        assert!(target.target_speed < 0.0);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("steer_magnitude".parse::<SpeedPolicy>().unwrap(), SpeedPolicy::SteerMagnitude);
        assert_eq!("error".parse::<SpeedPolicy>().unwrap(), SpeedPolicy::ErrorMagnitude);
        assert!("fastest".parse::<SpeedPolicy>().is_err());
    }
}
