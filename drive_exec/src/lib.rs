//! # Drive library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to
//! access items defined inside the drive executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive control module - converts tracking errors into steering and throttle commands
pub mod drive_ctrl;

/// Simulation client - exchanges telemetry and commands with the driving simulator
pub mod sim_client;
