#![forbid(unsafe_code)]

//! Caller options, merged configuration, and observer callbacks.
//!
//! [`DraggableOptions`] is the serializable shape callers hand to the factory.
//! Every field is optional. The factory validates it and merges it over the
//! documented defaults into an immutable [`Configuration`].
//!
//! ```json
//! {
//!   "initialPosition": { "x": "24px", "y": "24px" },
//!   "shouldSave": true,
//!   "mode": "container",
//!   "dragArea": "board",
//!   "snapMode": "auto",
//!   "edgeBuffer": 8
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::store::DEFAULT_STORAGE_KEY;

/// Style value used for an axis with no usable initial or stored value.
pub const ZERO_PX: &str = "0px";

/// Which bounding authority governs legal element positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragMode {
    /// Viewport-fixed positioning, bounded by the window.
    #[default]
    Screen,
    /// Document-absolute positioning, bounded by the scrollable document.
    Page,
    /// Absolute positioning inside a designated drag area.
    Container,
}

impl DragMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Page => "page",
            Self::Container => "container",
        }
    }
}

impl fmt::Display for DragMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw mode string that is not one of the recognized modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDragMode(pub String);

impl FromStr for DragMode {
    type Err = UnknownDragMode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "screen" => Ok(Self::Screen),
            "page" => Ok(Self::Page),
            "container" => Ok(Self::Container),
            other => Err(UnknownDragMode(other.to_owned())),
        }
    }
}

/// Post-drag edge snapping behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    #[default]
    None,
    /// Snap to whichever edge is nearest.
    Auto,
    Left,
    Right,
    Top,
    Bottom,
}

/// Axis lock applied during a drag.
///
/// `X` keeps movement horizontal (the vertical coordinate is frozen), `Y`
/// keeps it vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockAxis {
    X,
    Y,
}

/// Partially specified starting position as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialPositionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

/// Starting `left`/`top` style values, each with a unit suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialPosition {
    pub x: String,
    pub y: String,
}

impl Default for InitialPosition {
    fn default() -> Self {
        Self {
            x: ZERO_PX.to_owned(),
            y: ZERO_PX.to_owned(),
        }
    }
}

impl From<Option<&InitialPositionOptions>> for InitialPosition {
    fn from(options: Option<&InitialPositionOptions>) -> Self {
        let pick = |axis: Option<&String>| {
            axis.filter(|value| !value.is_empty())
                .cloned()
                .unwrap_or_else(|| ZERO_PX.to_owned())
        };
        Self {
            x: pick(options.and_then(|o| o.x.as_ref())),
            y: pick(options.and_then(|o| o.y.as_ref())),
        }
    }
}

/// Caller-supplied options; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DraggableOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_position: Option<InitialPositionOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_save: Option<bool>,
    /// Id of the element that bounds the drag in container mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drag_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_axis: Option<LockAxis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_buffer: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
    /// Kept raw so the factory can reject unknown values with a diagnostic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snap_mode: Option<SnapMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}

impl DraggableOptions {
    /// Parse options from camelCase JSON.
    pub fn from_json_str(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn with_mode(mut self, mode: DragMode) -> Self {
        self.mode = Some(mode.as_str().to_owned());
        self
    }

    #[must_use]
    pub fn with_drag_area(mut self, id: impl Into<String>) -> Self {
        self.drag_area = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_initial_position(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.initial_position = Some(InitialPositionOptions {
            x: Some(x.into()),
            y: Some(y.into()),
        });
        self
    }

    #[must_use]
    pub fn with_should_save(mut self, should_save: bool) -> Self {
        self.should_save = Some(should_save);
        self
    }

    #[must_use]
    pub fn with_lock_axis(mut self, axis: LockAxis) -> Self {
        self.lock_axis = Some(axis);
        self
    }

    #[must_use]
    pub fn with_edge_buffer(mut self, buffer: f64) -> Self {
        self.edge_buffer = Some(buffer);
        self
    }

    #[must_use]
    pub fn with_grid_size(mut self, grid: f64) -> Self {
        self.grid_size = Some(grid);
        self
    }

    #[must_use]
    pub fn with_snap_mode(mut self, snap_mode: SnapMode) -> Self {
        self.snap_mode = Some(snap_mode);
        self
    }

    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }
}

/// Immutable configuration of one controller, with defaults applied.
///
/// `E` is the host's element handle type; `drag_area` holds the resolved
/// container element.
#[derive(Debug, Clone)]
pub struct Configuration<E> {
    pub initial_position: InitialPosition,
    pub should_save: bool,
    pub drag_area: Option<E>,
    pub lock_axis: Option<LockAxis>,
    pub edge_buffer: f64,
    /// Only ever a positive, finite grid increment.
    pub grid_size: Option<f64>,
    pub mode: DragMode,
    pub snap_mode: SnapMode,
    pub storage_key: String,
}

impl<E> Configuration<E> {
    /// Merge validated options over the defaults.
    pub(crate) fn merge(options: &DraggableOptions, mode: DragMode, drag_area: Option<E>) -> Self {
        Self {
            initial_position: InitialPosition::from(options.initial_position.as_ref()),
            should_save: options.should_save.unwrap_or(false),
            drag_area,
            lock_axis: options.lock_axis,
            edge_buffer: options
                .edge_buffer
                .filter(|buffer| buffer.is_finite())
                .unwrap_or(0.0),
            grid_size: options
                .grid_size
                .filter(|grid| grid.is_finite() && *grid > 0.0),
            mode,
            snap_mode: options.snap_mode.unwrap_or_default(),
            storage_key: options
                .storage_key
                .clone()
                .filter(|key| !key.is_empty())
                .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_owned()),
        }
    }
}

type Callback<E> = Box<dyn FnMut(&E)>;

/// Observer callbacks invoked synchronously with the element handle.
pub struct DragCallbacks<E> {
    pub(crate) on_drag_start: Option<Callback<E>>,
    pub(crate) on_drag: Option<Callback<E>>,
    pub(crate) on_drag_end: Option<Callback<E>>,
}

impl<E> Default for DragCallbacks<E> {
    fn default() -> Self {
        Self {
            on_drag_start: None,
            on_drag: None,
            on_drag_end: None,
        }
    }
}

impl<E> fmt::Debug for DragCallbacks<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragCallbacks")
            .field("on_drag_start", &self.on_drag_start.is_some())
            .field("on_drag", &self.on_drag.is_some())
            .field("on_drag_end", &self.on_drag_end.is_some())
            .finish()
    }
}

impl<E> DragCallbacks<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_drag_start(mut self, callback: impl FnMut(&E) + 'static) -> Self {
        self.on_drag_start = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_drag(mut self, callback: impl FnMut(&E) + 'static) -> Self {
        self.on_drag = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_drag_end(mut self, callback: impl FnMut(&E) + 'static) -> Self {
        self.on_drag_end = Some(Box::new(callback));
        self
    }

    pub(crate) fn drag_start(&mut self, element: &E) {
        if let Some(callback) = self.on_drag_start.as_mut() {
            callback(element);
        }
    }

    pub(crate) fn drag(&mut self, element: &E) {
        if let Some(callback) = self.on_drag.as_mut() {
            callback(element);
        }
    }

    pub(crate) fn drag_end(&mut self, element: &E) {
        if let Some(callback) = self.on_drag_end.as_mut() {
            callback(element);
        }
    }
}
