//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "DRIVE_SW_ROOT";

/// Get the software root directory from the environment.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}

/// A short description of the host this executable is running on.
pub fn get_host_info() -> String {
    format!("{} ({}, {})", env::consts::OS, env::consts::ARCH, env::consts::FAMILY)
}
