//! Telemetry replay from CSV files

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fs::File;
use std::io::Read;
use std::path::Path;
use csv::{DeserializeRecordsIntoIter, ReaderBuilder, Trim};

use super::SimClientError;
use crate::drive_ctrl::Telemetry;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Replays telemetry samples from a CSV file with the header
/// `cte,speed,steering_angle`.
pub struct TelemReplay<R: Read> {
    records: DeserializeRecordsIntoIter<R, Telemetry>
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TelemReplay<File> {
    /// Open a replay file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SimClientError> {
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_path(path)
            .map_err(SimClientError::ReplayOpenError)?;

        Ok(Self {
            records: reader.into_deserialize()
        })
    }
}

impl<R: Read> TelemReplay<R> {
    /// Replay from any reader.
    pub fn from_reader(reader: R) -> Self {
        Self {
            records: ReaderBuilder::new()
                .trim(Trim::All)
                .from_reader(reader)
                .into_deserialize()
        }
    }
}

impl<R: Read> Iterator for TelemReplay<R> {
    type Item = Result<Telemetry, SimClientError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records
            .next()
            .map(|r| r.map_err(SimClientError::ReplayError))
    }
}
