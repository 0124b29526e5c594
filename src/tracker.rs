//! The focus/layout state machine.
//!
//! [`FocusTracker`] follows which window has focus and which layout is
//! active.  When focus moves away from a window, the layout that was active
//! in it is remembered in the [`LayoutStore`]; when focus arrives at a
//! window, its remembered layout (or the configured default) is requested.
//!
//! Layout changes are only trusted once they have "settled": a focus change
//! that follows a layout switch within the switch timeout is treated as part
//! of the same action and does not persist the new layout for the window
//! that is losing focus.
//!
//! All methods take the event time as an argument, so the tracker itself
//! never reads a clock.

use crate::identity::{WindowId, WindowKey};
use crate::store::{LayoutIndex, LayoutStore};
use log::debug;
use std::time::{Duration, Instant};

/// Mutable focus state, reset on every daemon start.
#[derive(Debug, Clone, Default)]
pub struct FocusState {
    /// Key of the last focused window/tab.
    pub last_key: Option<WindowKey>,
    /// Container id of the last focused window.
    pub last_window: Option<WindowId>,
    /// Layout most recently reported by the compositor.
    pub current_layout: Option<LayoutIndex>,
    /// When `current_layout` was reported.
    pub last_switch: Option<Instant>,
}

pub struct FocusTracker {
    default_layout: Option<LayoutIndex>,
    switch_timeout: Duration,
    state: FocusState,
    store: LayoutStore,
}

impl FocusTracker {
    /// `switch_timeout` of zero disables debouncing.
    pub fn new(default_layout: Option<LayoutIndex>, switch_timeout: Duration) -> Self {
        Self {
            default_layout,
            switch_timeout,
            state: FocusState::default(),
            store: LayoutStore::new(),
        }
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    /// `true` if the current layout was set long enough ago to be kept.
    fn layout_settled(&self, now: Instant) -> bool {
        if self.switch_timeout.is_zero() {
            return true;
        }
        match self.state.last_switch {
            Some(at) => now.saturating_duration_since(at) > self.switch_timeout,
            None => true,
        }
    }

    /// Window `window` (identified by `key`) gained focus.
    ///
    /// Returns the layout to switch to, or `None` if nothing needs to change.
    pub fn on_focus_or_title(
        &mut self,
        window: WindowId,
        key: WindowKey,
        now: Instant,
    ) -> Option<LayoutIndex> {
        if let (Some(last), Some(current)) = (self.state.last_key, self.state.current_layout) {
            if self.layout_settled(now) {
                debug!("remember layout {} for {}", current, last);
                self.store.put(last, current);
            } else {
                debug!("layout {} changed too recently, not saved for {}", current, last);
            }
        }

        let mut layout = self.store.get(key);
        if layout.is_none() {
            layout = self.default_layout;
        }
        if layout.is_some() && layout == self.state.current_layout {
            debug!("layout {:?} already active for {}", layout, key);
            layout = None;
        }

        self.state.last_key = Some(key);
        self.state.last_window = Some(window);

        layout
    }

    /// The title of `window` changed; `key` is its identity under the new
    /// title.  Ignored unless `window` is the focused one.
    pub fn on_title_change(
        &mut self,
        window: WindowId,
        key: WindowKey,
        now: Instant,
    ) -> Option<LayoutIndex> {
        if self.state.last_window != Some(window) {
            return None;
        }
        self.on_focus_or_title(window, key, now)
    }

    /// A window closed: forget its layout.
    pub fn on_close(&mut self, key: WindowKey) {
        self.store.remove(key);
        if self.state.last_key == Some(key) {
            self.state.last_key = None;
            self.state.last_window = None;
        }
    }

    /// The compositor reports `layout` as active.
    pub fn on_layout_change(&mut self, layout: LayoutIndex, now: Instant) {
        self.state.current_layout = Some(layout);
        self.state.last_switch = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: WindowId = 10;
    const B: WindowId = 20;
    const C: WindowId = 30;

    fn key(w: WindowId) -> WindowKey {
        WindowKey::from_window(w)
    }

    /// Fixed origin plus `ms` milliseconds.
    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn starts_empty() {
        let t = FocusTracker::new(None, Duration::ZERO);
        assert!(t.state().last_key.is_none());
        assert!(t.state().current_layout.is_none());
        assert!(t.store().is_empty());
    }

    #[test]
    fn remembers_and_suppresses_redundant_switch() {
        let t0 = Instant::now();
        let mut t = FocusTracker::new(None, Duration::ZERO);

        t.on_layout_change(3, at(t0, 0));
        assert_eq!(t.on_focus_or_title(A, key(A), at(t0, 1)), None);
        assert!(t.store().is_empty());

        t.on_layout_change(5, at(t0, 2));
        assert_eq!(t.on_focus_or_title(B, key(B), at(t0, 3)), None);
        assert_eq!(t.store().peek(key(A)), Some(5));

        // A's layout is the one already active.
        assert_eq!(t.on_focus_or_title(A, key(A), at(t0, 4)), None);
        assert_eq!(t.store().peek(key(B)), Some(5));
        assert_eq!(t.state().last_key, Some(key(A)));
    }

    #[test]
    fn restores_stored_layout() {
        let t0 = Instant::now();
        let mut t = FocusTracker::new(None, Duration::ZERO);

        t.on_layout_change(0, at(t0, 0));
        t.on_focus_or_title(A, key(A), at(t0, 1));
        t.on_layout_change(1, at(t0, 2));
        t.on_focus_or_title(B, key(B), at(t0, 3));
        t.on_layout_change(2, at(t0, 4));

        assert_eq!(t.on_focus_or_title(A, key(A), at(t0, 5)), Some(1));
        assert_eq!(t.store().peek(key(B)), Some(2));
    }

    #[test]
    fn default_layout_for_unknown_window() {
        let t0 = Instant::now();
        let mut t = FocusTracker::new(Some(0), Duration::ZERO);

        t.on_layout_change(1, at(t0, 0));
        assert_eq!(t.on_focus_or_title(A, key(A), at(t0, 1)), Some(0));

        t.on_layout_change(0, at(t0, 2));
        // Default equals the active layout: nothing to do.
        assert_eq!(t.on_focus_or_title(B, key(B), at(t0, 3)), None);
    }

    #[test]
    fn default_layout_before_any_layout_event() {
        let t0 = Instant::now();
        let mut t = FocusTracker::new(Some(0), Duration::ZERO);
        assert_eq!(t.on_focus_or_title(A, key(A), t0), Some(0));
    }

    #[test]
    fn recent_switch_is_not_persisted() {
        let t0 = Instant::now();
        let mut t = FocusTracker::new(None, Duration::from_millis(100));

        t.on_layout_change(2, at(t0, 0));
        t.on_focus_or_title(A, key(A), at(t0, 1));
        t.on_layout_change(7, at(t0, 2));

        t.on_focus_or_title(B, key(B), at(t0, 50));
        assert_eq!(t.store().peek(key(A)), None);

        t.on_focus_or_title(C, key(C), at(t0, 200));
        assert_eq!(t.store().peek(key(B)), Some(7));
    }

    #[test]
    fn timeout_boundary_is_exclusive() {
        let t0 = Instant::now();
        let mut t = FocusTracker::new(None, Duration::from_millis(100));

        t.on_focus_or_title(A, key(A), t0);
        t.on_layout_change(4, at(t0, 10));
        t.on_focus_or_title(B, key(B), at(t0, 110));
        assert_eq!(t.store().peek(key(A)), None);

        t.on_focus_or_title(C, key(C), at(t0, 111));
        assert_eq!(t.store().peek(key(B)), Some(4));
    }

    #[test]
    fn close_forgets_window() {
        let t0 = Instant::now();
        let mut t = FocusTracker::new(None, Duration::ZERO);

        t.on_layout_change(1, at(t0, 0));
        t.on_focus_or_title(A, key(A), at(t0, 1));
        t.on_focus_or_title(B, key(B), at(t0, 2));
        assert_eq!(t.store().peek(key(A)), Some(1));

        t.on_close(key(A));
        assert_eq!(t.store().peek(key(A)), None);
        t.on_close(key(A));
        assert_eq!(t.store().peek(key(A)), None);
    }

    #[test]
    fn closing_focused_window_drops_it() {
        let t0 = Instant::now();
        let mut t = FocusTracker::new(None, Duration::ZERO);

        t.on_layout_change(1, at(t0, 0));
        t.on_focus_or_title(A, key(A), at(t0, 1));
        t.on_close(key(A));
        assert_eq!(t.state().last_key, None);

        // Focus moves on; the closed window must not be resurrected.
        t.on_focus_or_title(B, key(B), at(t0, 2));
        assert_eq!(t.store().peek(key(A)), None);
        assert!(t.store().is_empty());
    }

    #[test]
    fn closing_background_window_keeps_focus() {
        let t0 = Instant::now();
        let mut t = FocusTracker::new(None, Duration::ZERO);
        t.on_focus_or_title(A, key(A), t0);
        t.on_close(key(B));
        assert_eq!(t.state().last_key, Some(key(A)));
    }

    #[test]
    fn title_change_of_focused_tab() {
        let t0 = Instant::now();
        let mut t = FocusTracker::new(None, Duration::ZERO);
        let inbox = WindowKey::from_tab(A, "Inbox");
        let news = WindowKey::from_tab(A, "News");

        t.on_layout_change(0, at(t0, 0));
        t.on_focus_or_title(A, inbox, at(t0, 1));
        t.on_layout_change(1, at(t0, 2));

        // Switch tab: Inbox keeps layout 1, News is unknown.
        assert_eq!(t.on_title_change(A, news, at(t0, 3)), None);
        assert_eq!(t.store().peek(inbox), Some(1));

        t.on_layout_change(0, at(t0, 4));
        // Back to Inbox.
        assert_eq!(t.on_title_change(A, inbox, at(t0, 5)), Some(1));
        assert_eq!(t.store().peek(news), Some(0));
    }

    #[test]
    fn title_change_of_background_window_is_ignored() {
        let t0 = Instant::now();
        let mut t = FocusTracker::new(Some(0), Duration::ZERO);

        t.on_layout_change(1, t0);
        t.on_focus_or_title(A, key(A), at(t0, 1));
        t.on_layout_change(1, at(t0, 2));

        assert_eq!(t.on_title_change(B, key(B), at(t0, 3)), None);
        assert_eq!(t.state().last_key, Some(key(A)));
        assert!(t.store().peek(key(A)).is_none());
    }
}
