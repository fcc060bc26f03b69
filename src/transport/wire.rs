//! Message set and byte encoding.
//!
//! Wire format (one message per radio frame):
//! ```text
//! Commands:  ┌────────┐
//!            │ opcode │          single byte, 1..=6
//!            └────────┘
//! Reports:   ┌──────────────┬──────────────┬──────┐
//!            │ ASCII prefix │ decimal text │ 0x00 │
//!            └──────────────┴──────────────┴──────┘
//! ```
//!
//! | Message       | Bytes          |
//! |---------------|----------------|
//! | `AlarmOn`     | `0x01`         |
//! | `AlarmOff`    | `0x02`         |
//! | `AutoOpen`    | `0x03`         |
//! | `ReadSensor`  | `0x04`         |
//! | `GateUnlock`  | `0x05`         |
//! | `GateLock`    | `0x06`         |
//! | `Light(n)`    | `"li<n>\0"`    |
//! | `Temperature` | `"tem<n>\0"`   |
//! | `Fire(n)`     | `"fi<n>\0"`    |
//! | `Threshold`   | `"th<n>\0"`    |
//! | `Stop`        | `"stop\0"`     |
//! | `CameraOff`   | `"camoff\0"`   |
//!
//! The decoder accepts text with or without the trailing NUL, and also
//! accepts the `"temp<n>"` spelling of a temperature report.  Numbers are
//! plain decimal digits; only the signed fields (temperature, fire,
//! threshold) may start with `-`, and `+` is never accepted.

use core::fmt::{self, Write as _};
use core::str::FromStr;

use heapless::{String, Vec};

use crate::error::WireError;

/// Maximum payload carried by one radio frame.
pub const MAX_PAYLOAD: usize = 16;

/// Raw frame payload.
pub type Payload = Vec<u8, MAX_PAYLOAD>;

/// Everything a node can say to another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    // ── Commands (single-byte opcodes) ────────────────────
    AlarmOn,
    AlarmOff,
    AutoOpen,
    ReadSensor,
    GateUnlock,
    GateLock,

    // ── Reports and control text ──────────────────────────
    /// Current external light level (gate → central).
    Light(u16),
    /// Mean of the last temperature samples (door → central).
    Temperature(i16),
    /// Fire confirmed at this temperature (kitchen → central).
    Fire(i16),
    /// New fire warning threshold (central → kitchen).
    Threshold(i32),
    /// Automatic opening finished (gate/door → central).
    Stop,
    /// Turn the kitchen camera off (central → kitchen).
    CameraOff,
}

impl Message {
    /// Opcode for command messages, `None` for text messages.
    pub const fn opcode(self) -> Option<u8> {
        match self {
            Self::AlarmOn => Some(1),
            Self::AlarmOff => Some(2),
            Self::AutoOpen => Some(3),
            Self::ReadSensor => Some(4),
            Self::GateUnlock => Some(5),
            Self::GateLock => Some(6),
            _ => None,
        }
    }

    pub fn from_opcode(op: u8) -> Result<Self, WireError> {
        match op {
            1 => Ok(Self::AlarmOn),
            2 => Ok(Self::AlarmOff),
            3 => Ok(Self::AutoOpen),
            4 => Ok(Self::ReadSensor),
            5 => Ok(Self::GateUnlock),
            6 => Ok(Self::GateLock),
            other => Err(WireError::UnknownOpcode(other)),
        }
    }

    /// Encode into a frame payload.
    pub fn encode(&self) -> Result<Payload, WireError> {
        let mut out = Payload::new();
        if let Some(op) = self.opcode() {
            out.push(op).map_err(|_| WireError::TooLong)?;
            return Ok(out);
        }

        let mut text: String<MAX_PAYLOAD> = String::new();
        write!(text, "{self}").map_err(|_| WireError::TooLong)?;
        out.extend_from_slice(text.as_bytes())
            .map_err(|_| WireError::TooLong)?;
        out.push(0).map_err(|_| WireError::TooLong)?;
        Ok(out)
    }

    /// Decode a frame payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        match bytes {
            [] => Err(WireError::Empty),
            [op] => Self::from_opcode(*op),
            _ => Self::decode_text(bytes),
        }
    }

    fn decode_text(bytes: &[u8]) -> Result<Self, WireError> {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let text = core::str::from_utf8(&bytes[..end]).map_err(|_| WireError::UnknownTag)?;

        match text {
            "" => return Err(WireError::Empty),
            "stop" => return Ok(Self::Stop),
            "camoff" => return Ok(Self::CameraOff),
            _ => {}
        }

        if let Some(n) = text.strip_prefix("temp").or_else(|| text.strip_prefix("tem")) {
            return Ok(Self::Temperature(signed(n)?));
        }
        if let Some(n) = text.strip_prefix("li") {
            return Ok(Self::Light(unsigned(n)?));
        }
        if let Some(n) = text.strip_prefix("fi") {
            return Ok(Self::Fire(signed(n)?));
        }
        if let Some(n) = text.strip_prefix("th") {
            return Ok(Self::Threshold(signed(n)?));
        }
        Err(WireError::UnknownTag)
    }
}

fn is_decimal(digits: &str) -> bool {
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn unsigned<T: FromStr>(text: &str) -> Result<T, WireError> {
    if !is_decimal(text) {
        return Err(WireError::InvalidNumber);
    }
    text.parse().map_err(|_| WireError::InvalidNumber)
}

fn signed<T: FromStr>(text: &str) -> Result<T, WireError> {
    if !is_decimal(text.strip_prefix('-').unwrap_or(text)) {
        return Err(WireError::InvalidNumber);
    }
    text.parse().map_err(|_| WireError::InvalidNumber)
}

/// Text form of report messages; commands print their name.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light(n) => write!(f, "li{n}"),
            Self::Temperature(n) => write!(f, "tem{n}"),
            Self::Fire(n) => write!(f, "fi{n}"),
            Self::Threshold(n) => write!(f, "th{n}"),
            Self::Stop => f.write_str("stop"),
            Self::CameraOff => f.write_str("camoff"),
            Self::AlarmOn => f.write_str("ALARM_ON"),
            Self::AlarmOff => f.write_str("ALARM_OFF"),
            Self::AutoOpen => f.write_str("AUTO_OPEN"),
            Self::ReadSensor => f.write_str("READ_SENSOR"),
            Self::GateUnlock => f.write_str("GATE_UNLOCK"),
            Self::GateLock => f.write_str("GATE_LOCK"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_single_opcode_bytes() {
        assert_eq!(Message::AlarmOn.encode().unwrap().as_slice(), &[1]);
        assert_eq!(Message::AlarmOff.encode().unwrap().as_slice(), &[2]);
        assert_eq!(Message::AutoOpen.encode().unwrap().as_slice(), &[3]);
        assert_eq!(Message::ReadSensor.encode().unwrap().as_slice(), &[4]);
        assert_eq!(Message::GateUnlock.encode().unwrap().as_slice(), &[5]);
        assert_eq!(Message::GateLock.encode().unwrap().as_slice(), &[6]);
    }

    #[test]
    fn reports_are_nul_terminated_text() {
        assert_eq!(Message::Light(512).encode().unwrap().as_slice(), b"li512\0");
        assert_eq!(Message::Temperature(23).encode().unwrap().as_slice(), b"tem23\0");
        assert_eq!(Message::Fire(57).encode().unwrap().as_slice(), b"fi57\0");
        assert_eq!(Message::Threshold(45).encode().unwrap().as_slice(), b"th45\0");
        assert_eq!(Message::Stop.encode().unwrap().as_slice(), b"stop\0");
        assert_eq!(Message::CameraOff.encode().unwrap().as_slice(), b"camoff\0");
    }

    #[test]
    fn decoder_tolerates_missing_terminator() {
        assert_eq!(Message::decode(b"stop"), Ok(Message::Stop));
        assert_eq!(Message::decode(b"li7"), Ok(Message::Light(7)));
        assert_eq!(Message::decode(b"th-3\0"), Ok(Message::Threshold(-3)));
    }

    #[test]
    fn temp_spelling_is_accepted() {
        assert_eq!(Message::decode(b"temp19\0"), Ok(Message::Temperature(19)));
        assert_eq!(Message::decode(b"tem19\0"), Ok(Message::Temperature(19)));
    }

    #[test]
    fn extreme_threshold_fits_one_frame() {
        let bytes = Message::Threshold(i32::MIN).encode().unwrap();
        assert!(bytes.len() <= MAX_PAYLOAD);
        assert_eq!(Message::decode(&bytes), Ok(Message::Threshold(i32::MIN)));
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert_eq!(Message::decode(&[]), Err(WireError::Empty));
        assert_eq!(Message::decode(&[0]), Err(WireError::UnknownOpcode(0)));
        assert_eq!(Message::decode(&[9]), Err(WireError::UnknownOpcode(9)));
        assert_eq!(Message::decode(b"xyz\0"), Err(WireError::UnknownTag));
        assert_eq!(Message::decode(b"li\0"), Err(WireError::InvalidNumber));
        assert_eq!(Message::decode(b"thabc\0"), Err(WireError::InvalidNumber));
        assert_eq!(Message::decode(b"\0\0"), Err(WireError::Empty));
        assert_eq!(Message::decode(&[0xff, 0xfe]), Err(WireError::UnknownTag));
    }

    #[test]
    fn explicit_signs_are_rejected() {
        assert_eq!(Message::decode(b"li+5\0"), Err(WireError::InvalidNumber));
        assert_eq!(Message::decode(b"li-5\0"), Err(WireError::InvalidNumber));
        assert_eq!(Message::decode(b"th+3\0"), Err(WireError::InvalidNumber));
        assert_eq!(Message::decode(b"fi+40\0"), Err(WireError::InvalidNumber));
        assert_eq!(Message::decode(b"th--3\0"), Err(WireError::InvalidNumber));
        assert_eq!(Message::decode(b"tem-4\0"), Ok(Message::Temperature(-4)));
    }

    #[test]
    fn light_out_of_range_is_invalid() {
        assert_eq!(Message::decode(b"li70000\0"), Err(WireError::InvalidNumber));
    }
}
