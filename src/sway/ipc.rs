//! [`Compositor`] implementation backed by Sway IPC.
//!
//! One long-lived connection carries everything: the subscription request
//! and its reply, the event stream, and the `RUN_COMMAND` messages that
//! switch the layout.  Command replies arrive interleaved with events; they
//! are logged and never reach the tracker.

use super::codec::MessageType;
use super::transport::{decode_json, Frame, Transport};
use super::{IpcError, Phase};
use crate::event::Event;
use crate::store::LayoutIndex;
use crate::traits::Compositor;
use log::{debug, info, warn};
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;

/// Event classes the daemon subscribes to.
const SUBSCRIPTION: &str = r#"["window","input"]"#;

/// Reply to a `SUBSCRIBE` message.
#[derive(Deserialize)]
struct SubscribeReply {
    success: bool,
}

/// One entry of the array replied to a `RUN_COMMAND` message.
#[derive(Deserialize)]
struct CommandReply {
    success: bool,
    error: Option<String>,
}

/// Text of the command that activates `layout` on every keyboard.
pub fn switch_layout_command(layout: LayoutIndex) -> String {
    format!("input * xkb_switch_layout {}", layout)
}

/// Sway-backed compositor connection.
pub struct SwayIpc<S = UnixStream> {
    transport: Transport<S>,
}

impl SwayIpc<UnixStream> {
    /// Connect to the socket named by `$SWAYSOCK`.
    pub fn connect() -> Result<Self, IpcError> {
        let transport = Transport::connect()?;
        info!("connected to sway");
        Ok(Self::new(transport))
    }
}

impl<S: Read + Write> SwayIpc<S> {
    pub fn new(transport: Transport<S>) -> Self {
        Self { transport }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &Transport<S> {
        &self.transport
    }

    /// Inspect a reply to one of our own requests.
    fn handle_reply(&self, frame: &Frame) -> Result<(), IpcError> {
        if frame.header.msg_type != MessageType::RunCommand.code() {
            debug!("ignoring reply of type {}", frame.header.msg_type);
            return Ok(());
        }
        let replies: Vec<CommandReply> = decode_json(&frame.payload, Phase::Decode)?;
        for reply in replies.iter().filter(|r| !r.success) {
            warn!(
                "layout switch rejected: {}",
                reply.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(())
    }
}

impl<S: Read + Write> Compositor for SwayIpc<S> {
    type Error = IpcError;

    fn subscribe(&mut self) -> Result<(), IpcError> {
        self.transport
            .write_frame(MessageType::Subscribe.code(), SUBSCRIPTION.as_bytes())
            .map_err(|e| e.during(Phase::Subscribe))?;
        let frame = self
            .transport
            .read_frame()
            .map_err(|e| e.during(Phase::Subscribe))?;
        let reply: SubscribeReply = decode_json(&frame.payload, Phase::Subscribe)?;
        if !reply.success {
            return Err(IpcError::protocol(
                Phase::Subscribe,
                "compositor refused the subscription",
            ));
        }
        info!("subscribed to {}", SUBSCRIPTION);
        Ok(())
    }

    fn next_event(&mut self) -> Result<Event, IpcError> {
        loop {
            let frame = self.transport.read_frame()?;
            if !frame.header.is_event() {
                self.handle_reply(&frame)?;
                continue;
            }
            let event = Event::parse(&frame.payload)
                .map_err(|e| IpcError::protocol(Phase::Decode, e.to_string()))?;
            debug!("event {:#x}: {:?}", frame.header.msg_type, event);
            return Ok(event);
        }
    }

    fn switch_layout(&mut self, layout: LayoutIndex) -> Result<(), IpcError> {
        info!("switching to layout {}", layout);
        self.transport.write_frame(
            MessageType::RunCommand.code(),
            switch_layout_command(layout).as_bytes(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Container;
    use crate::sway::codec::encode;
    use crate::sway::transport::tests::Trickle;

    const WINDOW_EVENT: u32 = 0x8000_0003;
    const INPUT_EVENT: u32 = 0x8000_0015;

    fn ipc(frames: &[(u32, &str)]) -> SwayIpc<Trickle> {
        let mut input = Vec::new();
        for (ty, payload) in frames {
            input.extend(encode(*ty, payload.as_bytes()));
        }
        SwayIpc::new(Transport::new(Trickle::new(input, 7)))
    }

    #[test]
    fn subscribe_sends_request_and_accepts_ack() {
        let mut c = ipc(&[(2, r#"{"success":true}"#)]);
        c.subscribe().unwrap();
        assert_eq!(
            c.transport().get_ref().output,
            encode(2, br#"["window","input"]"#)
        );
    }

    #[test]
    fn subscribe_refused() {
        let mut c = ipc(&[(2, r#"{"success":false}"#)]);
        assert!(matches!(
            c.subscribe(),
            Err(IpcError::Protocol { phase: Phase::Subscribe, .. })
        ));
    }

    #[test]
    fn subscribe_garbage_reply() {
        let mut c = ipc(&[(2, "nope")]);
        assert!(matches!(
            c.subscribe(),
            Err(IpcError::Protocol { phase: Phase::Subscribe, .. })
        ));
        let mut c = ipc(&[(2, r#"{"result":1}"#)]);
        assert!(c.subscribe().is_err());
    }

    #[test]
    fn subscribe_without_reply() {
        let mut c = ipc(&[]);
        assert!(matches!(
            c.subscribe(),
            Err(IpcError::PeerClosed { phase: Phase::Subscribe })
        ));
    }

    #[test]
    fn events_are_classified() {
        let mut c = ipc(&[
            (WINDOW_EVENT, r#"{"change":"focus","container":{"id":1,"app_id":"foot","name":"sh"}}"#),
            (INPUT_EVENT, r#"{"change":"xkb_layout","input":{"xkb_active_layout_index":1}}"#),
        ]);
        assert_eq!(
            c.next_event().unwrap(),
            Event::Focus(Container {
                id: 1,
                app_id: Some("foot".into()),
                title: Some("sh".into()),
            })
        );
        assert_eq!(c.next_event().unwrap(), Event::LayoutChanged(1));
        assert!(matches!(
            c.next_event(),
            Err(IpcError::PeerClosed { phase: Phase::Read })
        ));
    }

    #[test]
    fn command_replies_are_skipped() {
        let mut c = ipc(&[
            (0, r#"[{"success":true}]"#),
            (0, r#"[{"success":false,"error":"no such input"}]"#),
            (INPUT_EVENT, r#"{"change":"xkb_layout","input":{"xkb_active_layout_index":0}}"#),
        ]);
        assert_eq!(c.next_event().unwrap(), Event::LayoutChanged(0));
    }

    #[test]
    fn malformed_event_is_fatal() {
        let mut c = ipc(&[(WINDOW_EVENT, "{not json")]);
        assert!(matches!(
            c.next_event(),
            Err(IpcError::Protocol { phase: Phase::Decode, .. })
        ));
        let mut c = ipc(&[(WINDOW_EVENT, r#"{"change":"focus"}"#)]);
        assert!(matches!(
            c.next_event(),
            Err(IpcError::Protocol { phase: Phase::Decode, .. })
        ));
    }

    #[test]
    fn switch_layout_writes_command() {
        let mut c = ipc(&[]);
        c.switch_layout(2).unwrap();
        assert_eq!(
            c.transport().get_ref().output,
            encode(0, b"input * xkb_switch_layout 2")
        );
    }
}
