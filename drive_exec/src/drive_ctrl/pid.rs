//! # PID controller
//!
//! A discrete PID controller operating on one error sample per cycle. There is
//! no notion of time here, the controller assumes samples arrive at a fixed
//! rate and folds the sample period into the gains.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains for a single PID controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Optional symmetric limit on the integral accumulation.
    ///
    /// `None` means the integral grows without bound, which is the default.
    /// Long periods of one-sided error will then wind up the integral term.
    #[serde(default)]
    pub integral_limit: Option<f64>,
}

/// A PID controller
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Limit on the integral accumulation
    integral_limit: Option<f64>,

    /// Previous error, `None` until the first sample after initialisation
    prev_error: Option<f64>,

    /// Difference between the last two error samples
    deriv_error: f64,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidGains {
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            integral_limit: None
        }
    }

    /// Set a limit on the integral accumulation.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = Some(limit);
        self
    }
}

impl PidController {

    /// Create a new controller with the given gains.
    pub fn new(gains: &PidGains) -> Self {
        Self {
            k_p: gains.k_p,
            k_i: gains.k_i,
            k_d: gains.k_d,
            integral_limit: gains.integral_limit,
            prev_error: None,
            deriv_error: 0f64,
            integral: 0f64
        }
    }

    /// Set new gains and clear all accumulated error state.
    pub fn init(&mut self, gains: &PidGains) {
        *self = Self::new(gains);
    }

    /// Update the controller with a new error sample.
    ///
    /// The first sample after initialisation has no predecessor, so its
    /// derivative term is the sample itself rather than a difference against
    /// an undefined previous error.
    pub fn update(&mut self, error: f64) {
        self.deriv_error = match self.prev_error {
            Some(e) => error - e,
            None => error
        };

        self.prev_error = Some(error);

        self.integral += error;
        if let Some(limit) = self.integral_limit {
            self.integral = util::maths::clamp(&self.integral, &-limit, &limit);
        }
    }

    /// Get the total correction for the current error state.
    ///
    /// The correction opposes the error, i.e. a positive error produces a
    /// negative correction.
    pub fn total_correction(&self) -> f64 {
        -(self.k_p * self.prop_error()
            + self.k_d * self.deriv_error
            + self.k_i * self.integral)
    }

    /// The last error sample, or zero if there has been none.
    pub fn prop_error(&self) -> f64 {
        self.prev_error.unwrap_or(0f64)
    }

    /// The accumulated error.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// The derivative error computed on the last update.
    pub fn deriv_error(&self) -> f64 {
        self.deriv_error
    }

    /// Whether the controller has seen a sample since initialisation.
    pub fn has_prev_sample(&self) -> bool {
        self.prev_error.is_some()
    }

    /// The gains this controller was initialised with.
    pub fn gains(&self) -> PidGains {
        PidGains {
            k_p: self.k_p,
            k_i: self.k_i,
            k_d: self.k_d,
            integral_limit: self.integral_limit
        }
    }
}
