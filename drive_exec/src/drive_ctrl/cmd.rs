//! Cycle input and output data for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One telemetry sample from the vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Cross track error, the signed lateral distance between the vehicle and
    /// the reference path.
    pub cte: f64,

    /// Current speed of the vehicle. Non-negative.
    pub speed: f64,

    /// Current steering angle.
    ///
    /// Units: degrees
    pub steering_angle: f64,
}

/// The actuator demands produced by one control cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveCmd {
    /// Normalised steering demand in [-1, 1].
    pub steer: f64,

    /// Normalised throttle demand in [-1, 1]. Negative values brake.
    pub throttle: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Telemetry {
    pub fn new(cte: f64, speed: f64, steering_angle: f64) -> Self {
        Self { cte, speed, steering_angle }
    }

    /// True if every field of the sample is finite.
    pub fn is_finite(&self) -> bool {
        util::maths::all_finite(&[self.cte, self.speed, self.steering_angle])
    }
}
