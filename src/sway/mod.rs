//! Sway-specific implementations.
//!
//! This module provides the concrete backend for the
//! [`Compositor`](crate::traits::Compositor) trait, powered by Sway's IPC
//! socket (`$SWAYSOCK`).
//!
//! Nothing outside this module should reference Sway's wire format directly.

pub mod codec;
pub mod ipc;
pub mod transport;

use std::fmt;

/// The stage of the IPC conversation in which an error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    Subscribe,
    Read,
    Decode,
    Write,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Connect => write!(f, "connect"),
            Phase::Subscribe => write!(f, "subscribe"),
            Phase::Read => write!(f, "read"),
            Phase::Decode => write!(f, "decode"),
            Phase::Write => write!(f, "write"),
        }
    }
}

/// Errors that can occur when talking to Sway.
///
/// None of them are recoverable: the daemon stops and leaves restarting to
/// whatever supervises the process.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// The socket endpoint is missing or unusable.
    #[error("config error: {0}")]
    Config(String),

    /// An OS-level socket error.
    #[error("IPC {phase} error: {source}")]
    Io {
        phase: Phase,
        #[source]
        source: std::io::Error,
    },

    /// The compositor closed the connection in the middle of a message.
    #[error("IPC {phase} error: connection closed by peer")]
    PeerClosed { phase: Phase },

    /// The compositor sent something we cannot make sense of.
    #[error("IPC {phase} error: {reason}")]
    Protocol { phase: Phase, reason: String },
}

impl IpcError {
    pub(crate) fn protocol(phase: Phase, reason: impl Into<String>) -> Self {
        IpcError::Protocol {
            phase,
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error, turning an unexpected EOF into [`PeerClosed`](IpcError::PeerClosed).
    pub(crate) fn io(phase: Phase, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::WriteZero => {
                IpcError::PeerClosed { phase }
            }
            _ => IpcError::Io { phase, source },
        }
    }

    /// Re-attribute an error to a higher-level phase, e.g. a read that
    /// happened while waiting for the subscription reply.
    pub(crate) fn during(self, phase: Phase) -> Self {
        match self {
            IpcError::Io { source, .. } => IpcError::Io { phase, source },
            IpcError::PeerClosed { .. } => IpcError::PeerClosed { phase },
            IpcError::Protocol { reason, .. } => IpcError::Protocol { phase, reason },
            other => other,
        }
    }

    /// The phase this error belongs to, if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            IpcError::Config(_) => None,
            IpcError::Io { phase, .. }
            | IpcError::PeerClosed { phase }
            | IpcError::Protocol { phase, .. } => Some(*phase),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn eof_becomes_peer_closed() {
        let e = IpcError::io(Phase::Read, io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(e, IpcError::PeerClosed { phase: Phase::Read }));
        assert_eq!(e.to_string(), "IPC read error: connection closed by peer");
    }

    #[test]
    fn messages_name_the_phase() {
        let e = IpcError::io(Phase::Connect, io::Error::from(io::ErrorKind::NotFound));
        assert!(e.to_string().starts_with("IPC connect error:"));
        assert_eq!(e.phase(), Some(Phase::Connect));

        let e = IpcError::protocol(Phase::Subscribe, "subscription refused");
        assert_eq!(e.to_string(), "IPC subscribe error: subscription refused");

        assert_eq!(IpcError::Config("SWAYSOCK is not set".into()).phase(), None);
    }

    #[test]
    fn during_rewrites_phase() {
        let e = IpcError::PeerClosed { phase: Phase::Read }.during(Phase::Subscribe);
        assert_eq!(e.phase(), Some(Phase::Subscribe));
        let e = IpcError::Config("x".into()).during(Phase::Subscribe);
        assert_eq!(e.phase(), None);
    }
}
