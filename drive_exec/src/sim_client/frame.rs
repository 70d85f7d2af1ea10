//! Simulator message framing

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SimClientError;
use crate::drive_ctrl::{DriveCmd, Telemetry};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Prefix of a socket.io event message
pub const EVENT_PREFIX: &str = "42";

/// Name of the telemetry event
pub const TELEMETRY_EVENT: &str = "telemetry";

/// Message asking the simulator to hand control back to the user
pub const MANUAL_MSG: &str = "42[\"manual\",{}]";

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A parsed event message from the simulator.
#[derive(Debug, Clone, PartialEq)]
pub enum SimMessage {
    /// A telemetry sample
    Telemetry(Telemetry),

    /// An event frame with no data, the simulator should be put into manual
    NoData,

    /// Some other event, identified by its name
    Other(String)
}

/// The simulator encodes numbers as strings, but plain numbers are accepted
/// too.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(f64),
    Str(String)
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawTelemetry {
    cte: NumOrStr,
    speed: NumOrStr,
    steering_angle: NumOrStr
}

#[derive(Serialize)]
struct SteerReply {
    steering_angle: f64,
    throttle: f64
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a message from the simulator.
///
/// Returns `Ok(None)` if the message is not an event message at all.
pub fn parse_message(msg: &str) -> Result<Option<SimMessage>, SimClientError> {
    if msg.len() <= EVENT_PREFIX.len() || !msg.starts_with(EVENT_PREFIX) {
        return Ok(None)
    }

    let payload = match extract_payload(msg) {
        Some(p) => p,
        None => return Ok(Some(SimMessage::NoData))
    };

    let value: Value = serde_json::from_str(payload)
        .map_err(SimClientError::DeserializeError)?;

    let (event, data) = match value.as_array().map(|a| a.as_slice()) {
        Some([Value::String(event)]) => (event.as_str(), None),
        Some([Value::String(event), data, ..]) => (event.as_str(), Some(data)),
        _ => return Err(SimClientError::MalformedMessage(payload.to_string()))
    };

    if event != TELEMETRY_EVENT {
        return Ok(Some(SimMessage::Other(event.to_string())))
    }

    let data = match data {
        Some(d) => d,
        None => return Err(SimClientError::MalformedMessage(payload.to_string()))
    };

    let raw = RawTelemetry::deserialize(data)
        .map_err(SimClientError::DeserializeError)?;

    Ok(Some(SimMessage::Telemetry(Telemetry {
        cte: to_f64("cte", raw.cte)?,
        speed: to_f64("speed", raw.speed)?,
        steering_angle: to_f64("steering_angle", raw.steering_angle)?
    })))
}

/// Encode a steering command reply.
pub fn encode_steer(cmd: &DriveCmd) -> Result<String, SimClientError> {
    let data = serde_json::to_string(&SteerReply {
        steering_angle: cmd.steer,
        throttle: cmd.throttle
    }).map_err(SimClientError::SerializationError)?;

    Ok(format!("{}[\"steer\",{}]", EVENT_PREFIX, data))
}

/// Get the JSON payload of an event message.
///
/// The payload runs from the first `[` to the last `]`. Messages containing
/// `null` carry no data.
fn extract_payload(msg: &str) -> Option<&str> {
    if msg.contains("null") {
        return None
    }

    match (msg.find('['), msg.rfind(']')) {
        (Some(b1), Some(b2)) if b1 < b2 => Some(&msg[b1..=b2]),
        _ => None
    }
}

fn to_f64(field: &'static str, value: NumOrStr) -> Result<f64, SimClientError> {
    match value {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| SimClientError::InvalidNumber(field, s.clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_telemetry() {
        let msg = r#"42["telemetry",{"cte":"-0.5","speed":"21.34","steering_angle":"-3.25","throttle":"0.3"}]"#;

        assert_eq!(
            parse_message(msg).unwrap(),
            Some(SimMessage::Telemetry(Telemetry::new(-0.5, 21.34, -3.25)))
        );
    }

    #[test]
    fn test_parse_numeric_telemetry() {
        let msg = r#"42["telemetry",{"cte":0.25,"speed":10,"steering_angle":" 2.5"}]"#;

        assert_eq!(
            parse_message(msg).unwrap(),
            Some(SimMessage::Telemetry(Telemetry::new(0.25, 10.0, 2.5)))
        );
    }

    #[test]
    fn test_parse_no_data() {
        assert_eq!(parse_message("42[\"telemetry\",null]").unwrap(), Some(SimMessage::NoData));
        assert_eq!(parse_message("42 no brackets").unwrap(), Some(SimMessage::NoData));
    }

    #[test]
    fn test_parse_non_event() {
        assert_eq!(parse_message("").unwrap(), None);
        assert_eq!(parse_message("42").unwrap(), None);
        assert_eq!(parse_message("2probe").unwrap(), None);
        assert_eq!(parse_message("0{\"sid\":\"1\"}").unwrap(), None);
    }

    #[test]
    fn test_parse_other_event() {
        assert_eq!(
            parse_message("42[\"reset\",{}]").unwrap(),
            Some(SimMessage::Other("reset".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_message("42[\"telemetry\",{\"cte\":\"abc\",\"speed\":\"1\",\"steering_angle\":\"0\"}]"),
            Err(SimClientError::InvalidNumber("cte", _))
        ));
        assert!(matches!(
            parse_message("42[\"telemetry\",{\"cte\":\"0.1\"}]"),
            Err(SimClientError::DeserializeError(_))
        ));
        assert!(matches!(
            parse_message("42[1, 2]"),
            Err(SimClientError::MalformedMessage(_))
        ));
        assert!(matches!(
            parse_message("42[\"telemetry\"]"),
            Err(SimClientError::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_encode() {
        assert_eq!(
            encode_steer(&DriveCmd { steer: -0.25, throttle: 1.0 }).unwrap(),
            r#"42["steer",{"steering_angle":-0.25,"throttle":1.0}]"#
        );
    }
}
