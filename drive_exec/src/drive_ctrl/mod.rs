//! # Drive control module
//!
//! Drive control keeps the vehicle on the reference path and at a sensible
//! speed. It does this using a pair of PID controllers, one operating on the
//! cross track error and producing the steering demand, the other operating
//! on the speed error and producing the throttle demand.
//!
//! The two controllers are coupled. The steering correction is divided by a
//! speed dependent normalisation factor, so the vehicle steers more gently the
//! faster it goes. The target speed is then derived from the shaped steering
//! demand (or from the cross track error, depending on the selected
//! `SpeedPolicy`), so the vehicle slows down in tight turns. Both raw
//! corrections are squashed into the actuator range [-1, 1] by the `shaper`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod params;
mod pid;
mod policy;
pub mod shaper;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use params::*;
pub use pid::*;
pub use policy::*;
pub use state::*;

use util::params::LoadError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Invalid parameter `{0}`: {1}")]
    InvalidParam(&'static str, String),

    /// Telemetry contained a NaN or infinite value. The cycle is rejected and
    /// no command is produced.
    #[error("Received non-finite telemetry: {0:?}")]
    NonFiniteTelemetry(Telemetry),

    /// An intermediate quantity became non-finite. The cycle is rejected and
    /// controller state is restored to what it was before the cycle.
    #[error("Non-finite {0} computed during the control cycle")]
    NonFiniteCorrection(&'static str),
}
