//! Drive control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::{DriveCtrlError, PidGains, SpeedPolicy};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Params {

    // ---- CONTROLLERS ----

    /// Steering (cross track error) controller gains
    pub steer_gains: PidGains,

    /// Speed error controller gains
    pub speed_gains: PidGains,

    // ---- LIMITS ----

    /// Speed targeted when the vehicle is perfectly on the path
    pub max_speed: f64,

    /// Maximum physical steering angle.
    ///
    /// Units: degrees
    pub max_steer_angle_deg: f64,

    // ---- SPEED POLICIES ----

    /// The default speed policy, used by `State::proc`
    #[serde(default)]
    pub speed_policy: SpeedPolicy,

    /// Target speed at full steering lock under the steer magnitude policy
    pub full_steer_speed: f64,

    /// Target speed at unit penalty under the error magnitude policy
    pub min_recovery_speed: f64,

    /// The error magnitude policy only applies a penalty above this speed
    pub recovery_speed_threshold: f64,

    /// The error magnitude policy only applies a penalty above this error
    /// magnitude (half the absolute cross track error)
    pub min_error_magnitude: f64,

    // ---- SCALING ----

    /// The steering correction is divided by `speed / steer_norm_speed_divisor`
    pub steer_norm_speed_divisor: f64,

    /// Speeds below this value are replaced by it when normalising the
    /// steering correction
    pub min_norm_speed: f64,

    /// The throttle correction is divided by this before shaping
    pub throttle_scale: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            steer_gains: PidGains::new(1.5, 0.004, 10.0),
            speed_gains: PidGains::new(1.0, 0.004, 2.0),
            max_speed: 50.0,
            max_steer_angle_deg: 25.0,
            speed_policy: SpeedPolicy::SteerMagnitude,
            full_steer_speed: 20.0,
            min_recovery_speed: 10.0,
            recovery_speed_threshold: 15.0,
            min_error_magnitude: 1e-3,
            steer_norm_speed_divisor: 4.0,
            min_norm_speed: 1e-3,
            throttle_scale: 100.0
        }
    }
}

impl Params {
    /// Check the parameters are usable, returning the first problem found.
    pub fn validate(&self) -> Result<(), DriveCtrlError> {
        validate_gains("steer_gains", &self.steer_gains)?;
        validate_gains("speed_gains", &self.speed_gains)?;

        check("max_speed", self.max_speed, |v| v >= 0.0, "must be non-negative")?;
        check("max_steer_angle_deg", self.max_steer_angle_deg, |v| v > 0.0, "must be positive")?;

        let max_speed = self.max_speed;
        check(
            "full_steer_speed", 
            self.full_steer_speed, 
            |v| v >= 0.0 && v <= max_speed, 
            "must be between zero and max_speed"
        )?;
        check(
            "min_recovery_speed", 
            self.min_recovery_speed, 
            |v| v >= 0.0 && v <= max_speed, 
            "must be between zero and max_speed"
        )?;
        check(
            "recovery_speed_threshold", 
            self.recovery_speed_threshold, 
            |v| v >= 0.0, 
            "must be non-negative"
        )?;
        check("min_error_magnitude", self.min_error_magnitude, |v| v >= 0.0, "must be non-negative")?;

        check(
            "steer_norm_speed_divisor", 
            self.steer_norm_speed_divisor, 
            |v| v > 0.0, 
            "must be positive"
        )?;
        check("min_norm_speed", self.min_norm_speed, |v| v > 0.0, "must be positive")?;
        check("throttle_scale", self.throttle_scale, |v| v > 0.0, "must be positive")?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Check a set of controller gains.
pub(crate) fn validate_gains(name: &'static str, gains: &PidGains) -> Result<(), DriveCtrlError> {
    if !util::maths::all_finite(&[gains.k_p, gains.k_i, gains.k_d]) {
        return Err(DriveCtrlError::InvalidParam(name, format!("gains must be finite, got {:?}", gains)))
    }

    match gains.integral_limit {
        Some(l) if !(l.is_finite() && l > 0.0) => Err(DriveCtrlError::InvalidParam(
            name, format!("integral limit must be positive and finite, got {}", l)
        )),
        _ => Ok(())
    }
}

fn check<F>(name: &'static str, value: f64, pred: F, reason: &str) -> Result<(), DriveCtrlError>
where
    F: Fn(f64) -> bool
{
    if value.is_finite() && pred(value) {
        Ok(())
    }
    else {
        Err(DriveCtrlError::InvalidParam(name, format!("{}, got {}", reason, value)))
    }
}
