#![forbid(unsafe_code)]

//! Bounds resolution per containment mode.
//!
//! Resolution is two explicit steps:
//!
//! 1. [`apply_positioning_mode`] switches the element (and in container mode
//!    the drag area) to the positioning scheme the bounds are expressed in.
//! 2. [`compute_bounds`] derives the legal range from the bounding frame and
//!    the element's layout size.
//!
//! | mode | element positioning | frame |
//! |---|---|---|
//! | screen | `fixed` | viewport |
//! | page | `absolute` | scrollable document |
//! | container | `absolute` (area forced out of `static`) | drag area box |

use crate::config::{Configuration, DragMode};
use crate::geometry::{Bounds, Size};
use crate::host::{DragHost, Positioning};

/// Positioning scheme the element needs for `mode`.
#[must_use]
pub const fn element_positioning(mode: DragMode) -> Positioning {
    match mode {
        DragMode::Screen => Positioning::Fixed,
        DragMode::Page | DragMode::Container => Positioning::Absolute,
    }
}

/// Step one: force the positioning schemes `config.mode` relies on.
pub fn apply_positioning_mode<H: DragHost>(
    host: &H,
    element: &H::Element,
    config: &Configuration<H::Element>,
) {
    if config.mode == DragMode::Container
        && let Some(area) = config.drag_area.as_ref()
        && host.positioning(area) == Positioning::Static
    {
        host.set_positioning(area, Positioning::Relative);
    }
    host.set_positioning(element, element_positioning(config.mode));
}

/// Size of the box bounding the element in `config.mode`.
///
/// Container mode without a drag area falls back to the viewport.
#[must_use]
pub fn bounding_frame<H: DragHost>(host: &H, config: &Configuration<H::Element>) -> Size {
    match (config.mode, config.drag_area.as_ref()) {
        (DragMode::Container, Some(area)) => host.bounding_size(area),
        (DragMode::Page, _) => host.document_scroll_size(),
        (DragMode::Screen, _) | (DragMode::Container, None) => host.viewport_size(),
    }
}

/// Step two: the legal range of the element's top-left corner.
#[must_use]
pub fn compute_bounds(frame: Size, element: Size) -> Bounds {
    Bounds::within(frame, element)
}

/// Live bounds without touching positioning.
#[must_use]
pub fn measure_bounds<H: DragHost>(
    host: &H,
    element: &H::Element,
    config: &Configuration<H::Element>,
) -> Bounds {
    compute_bounds(bounding_frame(host, config), host.offset_size(element))
}

/// Both steps: apply positioning, then compute.
pub fn recompute_bounds<H: DragHost>(
    host: &H,
    element: &H::Element,
    config: &Configuration<H::Element>,
) -> Bounds {
    apply_positioning_mode(host, element, config);
    measure_bounds(host, element, config)
}
