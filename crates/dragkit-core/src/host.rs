#![forbid(unsafe_code)]

//! Host contract: everything the controller needs from its presentation
//! environment.
//!
//! The controller never renders. It reads element geometry, writes
//! positioning and `left`/`top` style values, and asks the host to deliver
//! input through [`Subscription`]s. Delivery is host-driven: the host calls
//! the controller's `handle_*` methods in event order.
//!
//! All methods take `&self`. Hosts are expected to be cheap handles over
//! shared state (a browser document, or [`crate::HeadlessHost`]).

use std::fmt;

use crate::error::HostError;
use crate::geometry::{Position, Size};

/// CSS positioning scheme of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Positioning {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Positioning {
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Relative => "relative",
            Self::Absolute => "absolute",
            Self::Fixed => "fixed",
            Self::Sticky => "sticky",
        }
    }

    /// Parse a computed `position` value; unknown values read as `static`.
    #[must_use]
    pub fn from_css(raw: &str) -> Self {
        match raw.trim() {
            "relative" => Self::Relative,
            "absolute" => Self::Absolute,
            "fixed" => Self::Fixed,
            "sticky" => Self::Sticky,
            _ => Self::Static,
        }
    }
}

/// Input stream the controller asks the host to deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// Pointer pressed on the draggable element.
    ElementPointerDown,
    /// Pointer moved anywhere in the document.
    DocumentPointerMove,
    /// Pointer released anywhere in the document.
    DocumentPointerUp,
    /// Viewport resized.
    ViewportResize,
    /// The subscribed element (the drag area) resized.
    ContainerResize,
    /// The subscribed element's style attribute was written.
    StyleMutation,
}

/// Host-assigned handle for one live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One pointer sample in viewport (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub client_x: f64,
    pub client_y: f64,
    /// Platform pointer id, when the platform has one.
    pub pointer_id: Option<i32>,
}

impl PointerInput {
    #[must_use]
    pub const fn at(client_x: f64, client_y: f64) -> Self {
        Self {
            client_x,
            client_y,
            pointer_id: None,
        }
    }

    #[must_use]
    pub const fn with_pointer_id(mut self, pointer_id: i32) -> Self {
        self.pointer_id = Some(pointer_id);
        self
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.client_x, self.client_y)
    }
}

/// Presentation environment hosting draggable elements.
pub trait DragHost {
    /// Opaque element handle.
    type Element: Clone + fmt::Debug;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn element_id(&self, element: &Self::Element) -> String;

    /// False when running inside an embedded (framed) context.
    fn is_top_level_context(&self) -> bool;
    /// Remove the element from its presentation tree.
    fn detach(&self, element: &Self::Element);

    fn has_init_marker(&self, element: &Self::Element) -> bool;
    fn set_init_marker(&self, element: &Self::Element);

    /// Computed positioning scheme.
    fn positioning(&self, element: &Self::Element) -> Positioning;
    fn set_positioning(&self, element: &Self::Element, positioning: Positioning);

    /// Layout offset relative to the offset parent (`offsetLeft`/`offsetTop`).
    fn offset_position(&self, element: &Self::Element) -> Position;
    /// Layout size (`offsetWidth`/`offsetHeight`).
    fn offset_size(&self, element: &Self::Element) -> Size;
    /// Size of the rendered bounding box.
    fn bounding_size(&self, element: &Self::Element) -> Size;

    fn viewport_size(&self) -> Size;
    /// Full scrollable extent of the document.
    fn document_scroll_size(&self) -> Size;

    fn style_left(&self, element: &Self::Element) -> String;
    fn style_top(&self, element: &Self::Element) -> String;
    fn set_style_left(&self, element: &Self::Element, value: &str);
    fn set_style_top(&self, element: &Self::Element, value: &str);

    fn style_display(&self, element: &Self::Element) -> String;
    fn set_style_display(&self, element: &Self::Element, value: &str);

    /// Enable or suspend pointer-event delivery to every embedded frame.
    fn set_frames_pointer_events(&self, enabled: bool);

    /// Try to capture the pointer on `element`; false when unsupported.
    fn set_pointer_capture(&self, element: &Self::Element, pointer_id: Option<i32>) -> bool;
    fn release_pointer_capture(&self, element: &Self::Element, pointer_id: Option<i32>);

    fn subscribe(
        &self,
        element: &Self::Element,
        subscription: Subscription,
    ) -> Result<SubscriptionId, HostError>;
    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positioning_round_trips_through_css() {
        for positioning in [
            Positioning::Static,
            Positioning::Relative,
            Positioning::Absolute,
            Positioning::Fixed,
            Positioning::Sticky,
        ] {
            assert_eq!(Positioning::from_css(positioning.as_css()), positioning);
        }
        assert_eq!(Positioning::from_css(""), Positioning::Static);
    }
}
