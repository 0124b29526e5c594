//! Binary framing used on the Sway IPC socket.
//!
//! Every message, in both directions, starts with a fixed 14-byte header:
//!
//! | Offset | Size | Field                              |
//! |--------|------|------------------------------------|
//! | 0      | 6    | magic string `i3-ipc`              |
//! | 6      | 4    | payload length (little-endian u32) |
//! | 10     | 4    | message type (little-endian u32)   |
//!
//! The payload follows immediately, with no terminator.
//!
//! Decoding does not check the magic: Sway itself never does on read, and
//! the [`Transport`](super::transport::Transport) only needs the length to
//! keep the stream in sync.  [`has_valid_magic`] is available for callers
//! that want to be stricter.

/// Magic bytes at the start of every frame.
pub const MAGIC: [u8; 6] = *b"i3-ipc";

/// Size of the frame header in bytes.
pub const HEADER_LEN: usize = MAGIC.len() + 4 + 4;

/// Bit set in the message type of every event frame.
pub const EVENT_BIT: u32 = 0x8000_0000;

/// Message types this crate sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    /// Run a textual command such as `input * xkb_switch_layout 1`.
    RunCommand = 0,
    /// Subscribe to a JSON array of event classes.
    Subscribe = 2,
}

impl MessageType {
    /// Wire code of this message type.
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub payload_len: u32,
    pub msg_type: u32,
}

impl Header {
    /// `true` if the message type marks an asynchronous event rather than a
    /// reply to one of our requests.
    pub fn is_event(&self) -> bool {
        self.msg_type & EVENT_BIT != 0
    }
}

/// Build a complete frame: magic, payload length, message type, payload.
pub fn encode(msg_type: u32, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&MAGIC);
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&msg_type.to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Parse the length and type fields of a header.
pub fn decode_header(bytes: &[u8; HEADER_LEN]) -> Header {
    let m = MAGIC.len();
    let payload_len = u32::from_le_bytes([bytes[m], bytes[m + 1], bytes[m + 2], bytes[m + 3]]);
    let msg_type = u32::from_le_bytes([bytes[m + 4], bytes[m + 5], bytes[m + 6], bytes[m + 7]]);
    Header {
        payload_len,
        msg_type,
    }
}

/// Check the magic prefix of a header.
pub fn has_valid_magic(bytes: &[u8; HEADER_LEN]) -> bool {
    bytes[..MAGIC.len()] == MAGIC
}
