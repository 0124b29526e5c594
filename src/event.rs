//! Events the daemon reacts to.
//!
//! Sway delivers window and input events as JSON objects with a `change`
//! field naming what happened.  [`Event::parse`] classifies such a payload
//! into one of a handful of variants, each carrying only the fields the
//! [`FocusTracker`](crate::tracker::FocusTracker) needs:
//!
//! ```json
//! {"change":"focus","container":{"id":12,"app_id":"foot","name":"~"}}
//! {"change":"xkb_layout","input":{"xkb_active_layout_index":1}}
//! ```
//!
//! Changes the daemon does not care about (`new`, `move`, `xkb_keymap`, …)
//! become [`Event::Ignored`].

use crate::identity::{resolve, TabApps, WindowId, WindowKey};
use crate::store::LayoutIndex;
use serde::Deserialize;

/// The window an event refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub id: WindowId,
    pub app_id: Option<String>,
    pub title: Option<String>,
}

impl Container {
    /// Layout key of this window under the given tab policy.
    pub fn key(&self, tab_apps: &TabApps) -> WindowKey {
        resolve(
            self.id,
            self.app_id.as_deref(),
            self.title.as_deref(),
            tab_apps,
        )
    }
}

/// A classified compositor event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A window received focus.
    Focus(Container),
    /// A window changed its title.
    Title(Container),
    /// A window was closed.
    Close(Container),
    /// The active keyboard layout changed.
    LayoutChanged(LayoutIndex),
    /// Anything else; carries the `change` value, if there was one.
    Ignored(Option<String>),
}

/// Errors from classifying an event payload.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} event without container")]
    MissingContainer(String),
    #[error("xkb_layout event without input")]
    MissingInput,
}

//  Minimal serde structs for the JSON we care about

/// Subset of a window or input event.
#[derive(Deserialize)]
struct EventJson {
    change: Option<String>,
    container: Option<ContainerJson>,
    input: Option<InputJson>,
}

/// Subset of the `container` node of a window event.
#[derive(Deserialize)]
struct ContainerJson {
    id: i64,
    app_id: Option<String>,
    name: Option<String>,
    window_properties: Option<WindowPropertiesJson>,
}

/// X11 properties; only present for XWayland windows.
#[derive(Deserialize)]
struct WindowPropertiesJson {
    class: Option<String>,
}

/// Subset of the `input` node of an input event.
#[derive(Deserialize)]
struct InputJson {
    xkb_active_layout_index: Option<i64>,
}

impl From<ContainerJson> for Container {
    fn from(c: ContainerJson) -> Self {
        // XWayland windows have no app_id; their X11 class plays that role.
        let app_id = c
            .app_id
            .or_else(|| c.window_properties.and_then(|p| p.class));
        Container {
            id: c.id,
            app_id,
            title: c.name,
        }
    }
}

impl Event {
    /// Classify an event payload.
    pub fn parse(payload: &[u8]) -> Result<Self, EventError> {
        let json: EventJson = serde_json::from_slice(payload)?;

        let Some(change) = json.change else {
            return Ok(Event::Ignored(None));
        };

        let container = |json_container: Option<ContainerJson>| {
            json_container
                .map(Container::from)
                .ok_or_else(|| EventError::MissingContainer(change.clone()))
        };

        let event = match change.as_str() {
            "focus" => Event::Focus(container(json.container)?),
            "title" => Event::Title(container(json.container)?),
            "close" => Event::Close(container(json.container)?),
            "xkb_layout" => {
                let input = json.input.ok_or(EventError::MissingInput)?;
                match input
                    .xkb_active_layout_index
                    .and_then(|i| LayoutIndex::try_from(i).ok())
                {
                    Some(index) => Event::LayoutChanged(index),
                    None => Event::Ignored(Some(change)),
                }
            }
            _ => Event::Ignored(Some(change)),
        };
        Ok(event)
    }
}
