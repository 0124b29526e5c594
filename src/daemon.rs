//! The event loop that ties the compositor connection to the tracker.
//!
//! [`Daemon`] subscribes once and then processes events strictly one at a
//! time: read, classify, update the [`FocusTracker`], and, if a layout
//! switch is due, send it before reading the next event.  The first error
//! ends the loop.

use crate::config::Config;
use crate::event::Event;
use crate::identity::TabApps;
use crate::store::LayoutIndex;
use crate::sway::ipc::SwayIpc;
use crate::sway::IpcError;
use crate::traits::Compositor;
use crate::tracker::FocusTracker;
use log::debug;
use std::time::Instant;

/// Everything the daemon remembers between events.
pub struct DaemonState {
    tracker: FocusTracker,
    tab_apps: TabApps,
}

impl DaemonState {
    pub fn new(config: &Config) -> Self {
        Self {
            tracker: FocusTracker::new(config.default_layout, config.switch_timeout()),
            tab_apps: config.tab_apps(),
        }
    }

    #[cfg(test)]
    pub(crate) fn tracker(&self) -> &FocusTracker {
        &self.tracker
    }

    /// Route one event to the tracker.  Returns the layout to switch to, if
    /// any.
    pub fn dispatch(&mut self, event: Event, now: Instant) -> Option<LayoutIndex> {
        match event {
            Event::Focus(c) => {
                let key = c.key(&self.tab_apps);
                self.tracker.on_focus_or_title(c.id, key, now)
            }
            Event::Title(c) => {
                let key = c.key(&self.tab_apps);
                self.tracker.on_title_change(c.id, key, now)
            }
            Event::Close(c) => {
                self.tracker.on_close(c.key(&self.tab_apps));
                None
            }
            Event::LayoutChanged(layout) => {
                self.tracker.on_layout_change(layout, now);
                None
            }
            Event::Ignored(change) => {
                debug!("ignoring {:?} event", change);
                None
            }
        }
    }
}

/// The blocking read/dispatch/write loop over a [`Compositor`].
pub struct Daemon<C: Compositor> {
    compositor: C,
    state: DaemonState,
}

impl<C: Compositor> Daemon<C> {
    pub fn new(compositor: C, config: &Config) -> Self {
        Self {
            compositor,
            state: DaemonState::new(config),
        }
    }

    #[cfg(test)]
    pub(crate) fn compositor(&self) -> &C {
        &self.compositor
    }

    /// Subscribe and process events until the connection fails.
    ///
    /// Only returns on error.
    pub fn run(&mut self) -> Result<(), C::Error> {
        self.compositor.subscribe()?;
        loop {
            let event = self.compositor.next_event()?;
            if let Some(layout) = self.state.dispatch(event, Instant::now()) {
                self.compositor.switch_layout(layout)?;
            }
        }
    }
}

/// Connect to Sway and run the daemon until the connection fails.
pub fn run(config: &Config) -> Result<(), IpcError> {
    let ipc = SwayIpc::connect()?;
    Daemon::new(ipc, config).run()
}
