//! Window identity resolution.
//!
//! A window is normally identified by its container id.  Applications listed
//! in [`TabApps`] host several logical tabs in one window; for those the
//! identity also depends on the window title, so each tab gets its own
//! layout memory.

use std::collections::HashSet;
use std::fmt;

/// Container id as reported by the compositor.
pub type WindowId = i64;

/// Key under which a window (or a tab of a window) stores its layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowKey(u64);

impl WindowKey {
    /// Key for a window without tab tracking.
    pub fn from_window(id: WindowId) -> Self {
        WindowKey(id as u64)
    }

    /// Key for a tab: the title hash offset by the window id, so identical
    /// titles in different windows do not collide.
    pub fn from_tab(id: WindowId, title: &str) -> Self {
        WindowKey(djb2(title).wrapping_add(id as u64))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// DJB2 string hash (`h = h * 33 + byte`, seeded with 5381).
pub fn djb2(s: &str) -> u64 {
    s.bytes()
        .fold(5381u64, |h, b| h.wrapping_mul(33).wrapping_add(u64::from(b)))
}

/// Application ids whose windows contain tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabApps(HashSet<String>);

impl TabApps {
    pub fn new<I, S>(apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TabApps(apps.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, app_id: &str) -> bool {
        self.0.contains(app_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Compute the layout key of a window.
///
/// Pure: the result only depends on the arguments.
pub fn resolve(
    window: WindowId,
    app_id: Option<&str>,
    title: Option<&str>,
    tab_apps: &TabApps,
) -> WindowKey {
    match app_id {
        Some(app) if tab_apps.contains(app) => WindowKey::from_tab(window, title.unwrap_or("")),
        _ => WindowKey::from_window(window),
    }
}
