//! **swaykbdd**: per-window keyboard layout switching for Sway.
//!
//! The daemon listens to Sway's window and input events.  Whenever focus
//! moves, it remembers the layout that was active in the window losing
//! focus and restores the one remembered for the window gaining it.
//! Applications with tabs (browsers, terminals with tabs, …) can be listed
//! so that each tab, told apart by its title, keeps its own layout.
//!
//! # Architecture
//!
//! * [`traits::Compositor`]: abstracts the compositor connection, so the
//!   loop in [`daemon`] is not coupled to any wire format.
//! * [`sway`]: the Sway IPC backend: binary framing, socket transport and
//!   the event subscription.
//! * [`tracker::FocusTracker`]: the state machine deciding when to save a
//!   layout and which one to restore, backed by [`store::LayoutStore`] and
//!   keyed by [`identity::WindowKey`].

pub mod config;
pub mod daemon;
pub mod event;
pub mod identity;
pub mod store;
pub mod sway;
pub mod tracker;
pub mod traits;
