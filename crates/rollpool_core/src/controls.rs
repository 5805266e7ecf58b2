//! Control messages sent by pool clients
//!
//! Every message is framed as a type byte, a 24-bit big-endian payload
//! length, then the payload. The only message the server understands is
//! `'C'` (controls), whose single payload byte holds the tread keys.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Tread keys held by a dozer driver
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DozerControls: u8 {
        const LEFT_FORWARD = 1;
        const LEFT_BACKWARD = 2;
        const RIGHT_FORWARD = 4;
        const RIGHT_BACKWARD = 8;
    }
}

impl DozerControls {
    /// Target speeds `(left, right)` in `[-1, 1]` for the held keys
    pub fn tread_targets(self) -> (f32, f32) {
        let axis = |forward, backward| {
            let mut target = 0.0;
            if self.contains(forward) {
                target += 1.0;
            }
            if self.contains(backward) {
                target -= 1.0;
            }
            target
        };
        (
            axis(Self::LEFT_FORWARD, Self::LEFT_BACKWARD),
            axis(Self::RIGHT_FORWARD, Self::RIGHT_BACKWARD),
        )
    }
}

/// Type byte of a controls message
pub const CONTROLS_MESSAGE: u8 = b'C';

/// Bytes of framing before every payload
pub const HEADER_LEN: usize = 4;

/// A message that can never be valid, so the sender should be dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// A controls message announced a payload other than one byte
    InvalidLength { length: usize },
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::InvalidLength { length } => {
                write!(f, "Controls message with invalid length {} (expected 1)", length)
            }
        }
    }
}

impl std::error::Error for ControlError {}

/// A complete message taken off the front of a receive buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Controls(DozerControls),
    /// A complete message of a type the server ignores
    Skipped { kind: u8, length: usize },
}

/// Take the next complete message off the front of `buffer`
///
/// Returns `Ok(None)` and leaves the buffer alone when it does not yet hold
/// a whole message.
pub fn next_message(buffer: &mut Vec<u8>) -> Result<Option<Message>, ControlError> {
    if buffer.len() < HEADER_LEN {
        return Ok(None);
    }
    let kind = buffer[0];
    let length = (usize::from(buffer[1]) << 16) | (usize::from(buffer[2]) << 8) | usize::from(buffer[3]);

    if kind == CONTROLS_MESSAGE && length != 1 {
        return Err(ControlError::InvalidLength { length });
    }
    if buffer.len() < HEADER_LEN + length {
        return Ok(None);
    }

    let message = if kind == CONTROLS_MESSAGE {
        Message::Controls(DozerControls::from_bits_truncate(buffer[HEADER_LEN]))
    } else {
        Message::Skipped { kind, length }
    };
    buffer.drain(..HEADER_LEN + length);
    Ok(Some(message))
}

/// Apply every complete message in `buffer`, returning the latest controls
///
/// Ignored message types are logged and dropped. Bytes of an incomplete
/// trailing message stay in the buffer for the next call.
pub fn drain_controls(buffer: &mut Vec<u8>) -> Result<Option<DozerControls>, ControlError> {
    let mut latest = None;
    while let Some(message) = next_message(buffer)? {
        match message {
            Message::Controls(controls) => latest = Some(controls),
            Message::Skipped { kind, length } => {
                log::debug!("Skipping message of type {:#04x} ({} bytes)", kind, length);
            }
        }
    }
    Ok(latest)
}

/// Frame a controls message for sending
pub fn encode_controls(controls: DozerControls) -> [u8; 5] {
    [CONTROLS_MESSAGE, 0, 0, 1, controls.bits()]
}
