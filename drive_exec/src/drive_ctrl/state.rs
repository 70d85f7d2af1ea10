//! Drive control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::*;
use super::params::validate_gains;
use util::{maths, module::State, params as util_params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state.
///
/// Owns the steering and speed controllers. Every call to `proc_cycle`
/// mutates both, so a single instance must only be driven from one place.
#[derive(Debug, Clone)]
pub struct DriveCtrl {
    params: Params,

    /// Cross track error controller, produces the steering demand
    steer_ctrl: PidController,

    /// Speed error controller, produces the throttle demand
    speed_ctrl: PidController
}

/// The status report containing various monitoring quantities and flags.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Steering correction before shaping (after speed normalisation)
    pub steer_correction: f64,

    /// Factor the steering controller output was divided by
    pub steer_norm_factor: f64,

    /// True if the speed was below `min_norm_speed` and replaced by it
    pub norm_speed_guard_applied: bool,

    /// Speed the throttle controller aimed for
    pub target_speed: f64,

    /// Penalty applied by the speed policy
    pub speed_penalty: f64,

    /// Difference between the target and current speeds
    pub speed_error: f64,

    /// Throttle correction before scaling and shaping
    pub throttle_correction: f64,

    /// True if the reported steering angle is beyond the physical maximum
    pub steer_angle_limit_exceeded: bool,

    /// True if the target speed fell below the policy's floor speed
    pub target_below_floor: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = Params;
    type InitError = DriveCtrlError;

    type InputData = Telemetry;
    type OutputData = DriveCmd;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module from a set of parameters.
    fn init(init_data: Self::InitData) -> Result<Self, Self::InitError> {
        Self::new(init_data)
    }

    /// Process one cycle using the speed policy set in the parameters.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> 
    {
        let policy = self.params.speed_policy;
        self.proc_cycle(input_data, policy)
    }
}

impl DriveCtrl {
    /// Create a new instance from the given parameters.
    ///
    /// The parameters are validated before anything else happens.
    pub fn new(params: Params) -> Result<Self, DriveCtrlError> {
        params.validate()?;

        debug!("DriveCtrl parameters: {:?}", params);

        Ok(Self {
            steer_ctrl: PidController::new(&params.steer_gains),
            speed_ctrl: PidController::new(&params.speed_gains),
            params
        })
    }

    /// Create a new instance from a parameter file relative to the params
    /// directory.
    pub fn from_params_file(params_path: &str) -> Result<Self, DriveCtrlError> {
        let params: Params = util_params::load(params_path)
            .map_err(DriveCtrlError::ParamLoadError)?;

        Self::new(params)
    }

    /// Reinitialise both controllers with new gains, clearing their state.
    pub fn reset_controllers(
        &mut self, 
        steer_gains: PidGains, 
        speed_gains: PidGains
    ) -> Result<(), DriveCtrlError> {
        validate_gains("steer_gains", &steer_gains)?;
        validate_gains("speed_gains", &speed_gains)?;

        self.steer_ctrl.init(&steer_gains);
        self.speed_ctrl.init(&speed_gains);
        self.params.steer_gains = steer_gains;
        self.params.speed_gains = speed_gains;

        debug!("DriveCtrl controllers reset");

        Ok(())
    }

    /// Run one control cycle.
    ///
    /// Processing involves:
    ///  1. Updating the steering controller with the cross track error
    ///  1. Normalising the steering correction by speed and shaping it
    ///  1. Computing the target speed using `policy`
    ///  1. Updating the speed controller with the speed error
    ///  1. Scaling and shaping the throttle correction
    ///
    /// If the telemetry or any intermediate value is not finite the cycle is
    /// rejected and both controllers are left as they were before the call.
    pub fn proc_cycle(
        &mut self, 
        telem: &Telemetry, 
        policy: SpeedPolicy
    ) -> Result<(DriveCmd, StatusReport), DriveCtrlError> {
        if !telem.is_finite() {
            return Err(DriveCtrlError::NonFiniteTelemetry(*telem))
        }

        let steer_ctrl = self.steer_ctrl.clone();
        let speed_ctrl = self.speed_ctrl.clone();

        let res = self.run_cycle(telem, policy);

        if let Err(ref e) = res {
            debug!("Cycle rejected, restoring controller state: {}", e);
            self.steer_ctrl = steer_ctrl;
            self.speed_ctrl = speed_ctrl;
        }

        res
    }

    /// Get the parameters this instance is using.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Get the steering controller.
    pub fn steer_ctrl(&self) -> &PidController {
        &self.steer_ctrl
    }

    /// Get the speed controller.
    pub fn speed_ctrl(&self) -> &PidController {
        &self.speed_ctrl
    }

    fn run_cycle(
        &mut self, 
        telem: &Telemetry, 
        policy: SpeedPolicy
    ) -> Result<(DriveCmd, StatusReport), DriveCtrlError> {
        let mut report = StatusReport::default();

        report.steer_angle_limit_exceeded = 
            telem.steering_angle.abs() > self.params.max_steer_angle_deg;
        if report.steer_angle_limit_exceeded {
            trace!(
                "Steering angle {} beyond the {} deg limit",
                telem.steering_angle, 
                self.params.max_steer_angle_deg
            );
        }

        // ---- STEERING ----

        self.steer_ctrl.update(telem.cte);

        // Steer more gently at higher speeds. The speed is floored so the
        // factor stays away from zero.
        let norm_speed = if telem.speed < self.params.min_norm_speed {
            report.norm_speed_guard_applied = true;
            self.params.min_norm_speed
        }
        else {
            telem.speed
        };
        report.steer_norm_factor = norm_speed / self.params.steer_norm_speed_divisor;
        report.steer_correction = self.steer_ctrl.total_correction() / report.steer_norm_factor;

        if !report.steer_correction.is_finite() {
            return Err(DriveCtrlError::NonFiniteCorrection("steering correction"))
        }

        let steer = shaper::shape(report.steer_correction);

        // ---- SPEED ----

        let target = policy.target_speed(&self.params, telem.cte, telem.speed, steer);
        report.target_speed = target.target_speed;
        report.speed_penalty = target.penalty;
        report.target_below_floor = target.target_speed < target.floor_speed;

        if !maths::all_finite(&[target.target_speed, target.penalty]) {
            return Err(DriveCtrlError::NonFiniteCorrection("target speed"))
        }
        if report.target_below_floor {
            trace!(
                "Target speed {} below the {:?} floor of {}",
                target.target_speed, 
                policy, 
                target.floor_speed
            );
        }

        report.speed_error = target.target_speed - telem.speed;
        self.speed_ctrl.update(report.speed_error);

        report.throttle_correction = -1f64 * self.speed_ctrl.total_correction();

        if !report.throttle_correction.is_finite() {
            return Err(DriveCtrlError::NonFiniteCorrection("throttle correction"))
        }

        let throttle = shaper::shape(report.throttle_correction / self.params.throttle_scale);

        trace!("DriveCtrl report: {:?}", report);

        Ok((DriveCmd { steer, throttle }, report))
    }
}
