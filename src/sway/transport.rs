//! Framed reads and writes over the Sway IPC socket.
//!
//! The [`Transport`] owns the stream and only ever hands out complete
//! frames: a header is read in full, then exactly `payload_len` bytes.  A
//! short read surfaces as [`IpcError::PeerClosed`], never as a partially
//! filled buffer.

use super::codec::{self, Header, HEADER_LEN};
use super::{IpcError, Phase};
use log::warn;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// Environment variable holding the path of Sway's IPC socket.
pub const SOCKET_ENV: &str = "SWAYSOCK";

/// Capacity of `sockaddr_un::sun_path`.
#[cfg(any(target_os = "linux", target_os = "android"))]
const SUN_PATH_MAX: usize = 108;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SUN_PATH_MAX: usize = 104;

/// Upper bound on the payload length accepted from the compositor.
pub const MAX_PAYLOAD_LEN: u32 = 64 * 1024 * 1024;

/// One message read from the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: Header,
    pub payload: Vec<u8>,
}

/// Validate the value of [`SOCKET_ENV`] and turn it into a socket path.
pub fn endpoint_from(value: Option<OsString>) -> Result<PathBuf, IpcError> {
    let value = value.ok_or_else(|| IpcError::Config(format!("{} is not set", SOCKET_ENV)))?;
    let len = value.as_bytes().len();
    if len == 0 || len > SUN_PATH_MAX {
        return Err(IpcError::Config(format!(
            "invalid {} value ({} bytes)",
            SOCKET_ENV, len
        )));
    }
    Ok(PathBuf::from(value))
}

/// A framed connection to the compositor.
///
/// Generic over the stream so tests can substitute an in-memory pipe.
pub struct Transport<S = UnixStream> {
    stream: S,
}

impl Transport<UnixStream> {
    /// Connect to the socket named by `$SWAYSOCK`.
    pub fn connect() -> Result<Self, IpcError> {
        let path = endpoint_from(std::env::var_os(SOCKET_ENV))?;
        Self::connect_to(&path)
    }

    /// Connect to the socket at `path`.
    pub fn connect_to(path: &Path) -> Result<Self, IpcError> {
        let stream = UnixStream::connect(path).map_err(|e| IpcError::Io {
            phase: Phase::Connect,
            source: e,
        })?;
        Ok(Self::new(stream))
    }
}

impl<S: Read + Write> Transport<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    #[cfg(test)]
    pub(crate) fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Read one complete frame.
    pub fn read_frame(&mut self) -> Result<Frame, IpcError> {
        let mut header = [0u8; HEADER_LEN];
        self.stream
            .read_exact(&mut header)
            .map_err(|e| IpcError::io(Phase::Read, e))?;

        if !codec::has_valid_magic(&header) {
            warn!("frame with unexpected magic {:?}", &header[..codec::MAGIC.len()]);
        }

        let header = codec::decode_header(&header);
        if header.payload_len > MAX_PAYLOAD_LEN {
            return Err(IpcError::protocol(
                Phase::Read,
                format!("payload length {} exceeds limit", header.payload_len),
            ));
        }

        let mut payload = vec![0u8; header.payload_len as usize];
        self.stream
            .read_exact(&mut payload)
            .map_err(|e| IpcError::io(Phase::Read, e))?;

        Ok(Frame { header, payload })
    }

    /// Write one complete frame, looping over short writes.
    pub fn write_frame(&mut self, msg_type: u32, payload: &[u8]) -> Result<(), IpcError> {
        let frame = codec::encode(msg_type, payload);
        self.stream
            .write_all(&frame)
            .and_then(|_| self.stream.flush())
            .map_err(|e| IpcError::io(Phase::Write, e))
    }
}

/// Parse a JSON payload into `T`.
pub fn decode_json<T: DeserializeOwned>(payload: &[u8], phase: Phase) -> Result<T, IpcError> {
    serde_json::from_slice(payload)
        .map_err(|e| IpcError::protocol(phase, format!("invalid JSON payload: {}", e)))
}
