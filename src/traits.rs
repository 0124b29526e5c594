//! The trait that decouples the daemon loop from the compositor's wire
//! protocol.
//!
//! The [`Daemon`](crate::daemon::Daemon) only depends on this abstraction;
//! [`SwayIpc`](crate::sway::ipc::SwayIpc) is the concrete backend, and tests
//! drive the loop with a scripted double.

use crate::event::Event;
use crate::store::LayoutIndex;

/// A compositor connection that produces events and accepts layout switches.
///
/// # Contract
///
/// * [`subscribe`](Compositor::subscribe) is called exactly once, before
///   the first [`next_event`](Compositor::next_event).
/// * [`next_event`](Compositor::next_event) **blocks** until an event
///   arrives.  An error is final: the daemon does not call it again.
pub trait Compositor {
    /// The error type produced by this connection.
    type Error: std::error::Error + Send + 'static;

    /// Ask the compositor for window and input events.
    fn subscribe(&mut self) -> Result<(), Self::Error>;

    /// Wait for the next event.
    fn next_event(&mut self) -> Result<Event, Self::Error>;

    /// Make `layout` the active keyboard layout.
    fn switch_layout(&mut self, layout: LayoutIndex) -> Result<(), Self::Error>;
}
