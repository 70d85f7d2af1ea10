//! # Simulation Client
//!
//! The SimClient exchanges data with the driving simulator. The simulator
//! sends telemetry events containing the cross track error, speed and
//! steering angle of the vehicle, and expects a steering and throttle command
//! in return.
//!
//! Messages are socket.io style event frames, one per line:
//!
//! - `42["telemetry",{"cte":"0.76","speed":"0.0","steering_angle":"0"}]` in,
//! - `42["steer",{"steering_angle":-0.25,"throttle":0.3}]` out,
//! - `42["manual",{}]` out when the simulator sent a frame with no data.
//!
//! Telemetry can also be replayed from a CSV file with `TelemReplay`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod frame;
mod replay;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::io::{self, BufRead, Write};
use log::trace;

use crate::drive_ctrl::DriveCmd;

pub use frame::*;
pub use replay::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Line based client for the simulator message protocol.
///
/// Messages are handled strictly one at a time, each `recv` is expected to be
/// followed by at most one reply before the next `recv`.
pub struct SimClient<R, W> {
    reader: R,
    writer: W,
    line: String
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimClientError {
    #[error("Could not receive a message from the simulator: {0}")]
    RecvError(io::Error),

    #[error("Could not send a message to the simulator: {0}")]
    SendError(io::Error),

    #[error("Could not serialize the data: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the message payload: {0}")]
    DeserializeError(serde_json::Error),

    #[error("Malformed message payload: {0}")]
    MalformedMessage(String),

    #[error("Telemetry field `{0}` is not a number: {1:?}")]
    InvalidNumber(&'static str, String),

    #[error("Could not open the telemetry replay: {0}")]
    ReplayOpenError(csv::Error),

    #[error("Could not read a telemetry record from the replay: {0}")]
    ReplayError(csv::Error)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<R: BufRead, W: Write> SimClient<R, W> {
    /// Create a new client reading messages from `reader` and writing replies
    /// into `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new()
        }
    }

    /// Receive the next event message.
    ///
    /// Lines which are not event messages are skipped. Returns `Ok(None)` once
    /// the input is exhausted.
    pub fn recv(&mut self) -> Result<Option<SimMessage>, SimClientError> {
        loop {
            self.line.clear();

            let num_bytes = self.reader
                .read_line(&mut self.line)
                .map_err(SimClientError::RecvError)?;
            if num_bytes == 0 {
                return Ok(None)
            }

            match parse_message(self.line.trim_end())? {
                Some(m) => return Ok(Some(m)),
                None => trace!("Skipping non-event message: {:?}", self.line.trim_end())
            }
        }
    }

    /// Send a steering and throttle command.
    pub fn send_cmd(&mut self, cmd: &DriveCmd) -> Result<(), SimClientError> {
        let msg = encode_steer(cmd)?;
        self.send_line(&msg)
    }

    /// Tell the simulator to switch to manual driving.
    pub fn send_manual(&mut self) -> Result<(), SimClientError> {
        self.send_line(MANUAL_MSG)
    }

    /// Consume the client, returning the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn send_line(&mut self, msg: &str) -> Result<(), SimClientError> {
        writeln!(self.writer, "{}", msg).map_err(SimClientError::SendError)?;
        self.writer.flush().map_err(SimClientError::SendError)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive_ctrl::Telemetry;
    use std::io::Cursor;

    #[test]
    fn test_recv_and_reply() {
        let input = concat!(
            "0{\"sid\":\"abc\"}\n",
            "42[\"telemetry\",{\"cte\":\"0.7598\",\"speed\":\"0.0\",\"steering_angle\":\"0\"}]\n",
            "42[\"telemetry\",null]\n",
        );
        let mut client = SimClient::new(Cursor::new(input), Vec::new());

        match client.recv().unwrap() {
            Some(SimMessage::Telemetry(t)) => assert_eq!(t, Telemetry::new(0.7598, 0.0, 0.0)),
            other => panic!("Expected telemetry, got {:?}", other)
        }
        client.send_cmd(&DriveCmd { steer: -0.5, throttle: 0.25 }).unwrap();

        match client.recv().unwrap() {
            Some(SimMessage::NoData) => (),
            other => panic!("Expected no data, got {:?}", other)
        }
        client.send_manual().unwrap();

        assert!(client.recv().unwrap().is_none());

        let (_, out) = client.into_inner();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "42[\"steer\",{\"steering_angle\":-0.5,\"throttle\":0.25}]\n42[\"manual\",{}]\n"
        );
    }

    #[test]
    fn test_recv_malformed() {
        let mut client = SimClient::new(Cursor::new("42[\"telemetry\",{\"cte\":\"x\"]\n"), Vec::new());
        assert!(client.recv().is_err());
    }

    #[test]
    fn test_error_messages() {
        let e = SimClientError::RecvError(io::Error::new(io::ErrorKind::UnexpectedEof, "closed"));
        assert_eq!(e.to_string(), "Could not receive a message from the simulator: closed");
    }
}
