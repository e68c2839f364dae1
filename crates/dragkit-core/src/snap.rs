#![forbid(unsafe_code)]

//! Post-drag edge snapping.

use crate::config::SnapMode;
use crate::geometry::{Position, Size};

/// One side of the bounding frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Distance from the element box to each frame edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDistances {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl EdgeDistances {
    #[must_use]
    pub fn measure(frame: Size, position: Position, element: Size) -> Self {
        Self {
            left: position.x,
            right: frame.width - (position.x + element.width),
            top: position.y,
            bottom: frame.height - (position.y + element.height),
        }
    }

    /// Edge with the smallest distance.
    ///
    /// Ties resolve in the order left, right, top, bottom.
    #[must_use]
    pub fn nearest(&self) -> Edge {
        let min = self.left.min(self.right).min(self.top).min(self.bottom);
        if min == self.left {
            Edge::Left
        } else if min == self.right {
            Edge::Right
        } else if min == self.top {
            Edge::Top
        } else {
            Edge::Bottom
        }
    }
}

/// Style coordinates to commit after snapping; `None` leaves an axis as is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnapTarget {
    pub edge: Option<Edge>,
    pub left: Option<f64>,
    pub top: Option<f64>,
}

impl SnapTarget {
    fn flush(edge: Edge, frame: Size, element: Size, buffer: f64) -> Self {
        match edge {
            Edge::Left => Self {
                edge: Some(edge),
                left: Some(buffer),
                top: None,
            },
            Edge::Right => Self {
                edge: Some(edge),
                left: Some(frame.width - element.width - buffer),
                top: None,
            },
            Edge::Top => Self {
                edge: Some(edge),
                left: None,
                top: Some(buffer),
            },
            Edge::Bottom => Self {
                edge: Some(edge),
                left: None,
                top: Some(frame.height - element.height - buffer),
            },
        }
    }
}

/// Resolve where `snap_mode` moves an element sitting at `position`.
///
/// The element ends flush against the chosen edge, inset by `buffer`.
#[must_use]
pub fn resolve_edge_snap(
    snap_mode: SnapMode,
    frame: Size,
    position: Position,
    element: Size,
    buffer: f64,
) -> SnapTarget {
    let edge = match snap_mode {
        SnapMode::None => return SnapTarget::default(),
        SnapMode::Auto => EdgeDistances::measure(frame, position, element).nearest(),
        SnapMode::Left => Edge::Left,
        SnapMode::Right => Edge::Right,
        SnapMode::Top => Edge::Top,
        SnapMode::Bottom => Edge::Bottom,
    };
    SnapTarget::flush(edge, frame, element, buffer)
}
