//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info};
use colored::{ColoredString, Colorize};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level less than `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
/// 
/// # Notes
/// 
/// - `min_level` must be greater than `log::Level::Info`.
/// - `module_levels` caps the level of individual targets, for instance to
///   keep per-cycle control traces out of the terminal.
/// - Terminal output goes to stderr with coloured level tags, stdout is
///   reserved for the simulator reply channel. The session log file gets the
///   same lines without colour codes.
/// 
/// # Safety
/// 
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: self::LevelFilter, 
    module_levels: &[(&'static str, LevelFilter)],
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new().level(min_level);
    for &(module, level) in module_levels {
        dispatch = dispatch.level_for(module, level);
    }

    dispatch
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{}", 
                        format_line(record, level_to_str(record.level()), message)
                    ))
                })
                .chain(std::io::stderr())
        )
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{}", 
                        format_line(record, level_to_plain_str(record.level()), message)
                    ))
                })
                .chain(log_file)
        )
        .apply()
        .map_err(LoggerInitError::FernInitError)?;
    
    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    for (module, level) in module_levels {
        info!("    Log level for {}: {:?}", module, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build one log line.
///
/// Debug and trace lines include the target, the others don't.
fn format_line<L: std::fmt::Display>(
    record: &log::Record, 
    level: L, 
    message: &std::fmt::Arguments
) -> String {
    if record.level() > log::Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            session::get_elapsed_seconds(),
            level,
            record.target(),
            message
        )
    }
    else {
        format!(
            "[{:10.6} {}] {}",
            session::get_elapsed_seconds(),
            level,
            message
        )
    }
}

/// Get the coloured terminal representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

/// Get the plain log file representation of a log level
fn level_to_plain_str(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info  => "INF",
        log::Level::Warn  => "WRN",
        log::Level::Error => "ERR"
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_level_strings() {
        assert!(level_to_str(log::Level::Warn).to_string().contains("WRN"));
        assert_eq!(level_to_str(log::Level::Info).to_string(), "INF");
        assert_eq!(level_to_plain_str(log::Level::Error), "ERR");
        assert_eq!(level_to_plain_str(log::Level::Trace), "TRC");
    }

    #[test]
    fn test_format_line_target() {
        let line = format_line(
            &log::Record::builder()
                .level(log::Level::Debug)
                .target("drive_lib::drive_ctrl")
                .args(format_args!("cycle rejected"))
                .build(),
            "DBG",
            &format_args!("cycle rejected")
        );
        assert!(line.ends_with("DBG] drive_lib::drive_ctrl: cycle rejected"));

        let line = format_line(
            &log::Record::builder()
                .level(log::Level::Warn)
                .target("drive_lib::drive_ctrl")
                .args(format_args!("cycle rejected"))
                .build(),
            "WRN",
            &format_args!("cycle rejected")
        );
        assert!(line.ends_with("WRN] cycle rejected"));
    }
}
