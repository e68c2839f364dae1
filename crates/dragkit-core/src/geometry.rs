#![forbid(unsafe_code)]

//! Pixel geometry primitives shared by the bounds resolver, the drag state
//! machine, and edge snapping.
//!
//! Coordinates are `f64` CSS pixels. Values that cross the host boundary as
//! style strings use the `"<n>px"` form produced by [`format_px`].

use std::fmt;

/// Absolute pixel offset of an element's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Origin `(0, 0)`.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Legal range for an element's top-left corner.
///
/// The range may be inverted (`min > max`) when the bounding frame is smaller
/// than the element. [`Bounds::clamp`] still produces a deterministic result
/// in that case.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounds for an element of `element` size moving inside `frame`.
    ///
    /// The minimum is always the frame origin.
    #[must_use]
    pub fn within(frame: Size, element: Size) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: frame.width - element.width,
            max_y: frame.height - element.height,
        }
    }

    /// Whether either axis has `min > max`.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Clamp `position` per axis to `[min - edge_buffer, max + edge_buffer]`.
    ///
    /// The lower limit is applied before the upper one, so an inverted range
    /// resolves to `max + edge_buffer`.
    #[must_use]
    pub fn clamp(&self, position: Position, edge_buffer: f64) -> Position {
        Position {
            x: clamp_axis(position.x, self.min_x - edge_buffer, self.max_x + edge_buffer),
            y: clamp_axis(position.y, self.min_y - edge_buffer, self.max_y + edge_buffer),
        }
    }
}

fn clamp_axis(value: f64, low: f64, high: f64) -> f64 {
    let mut value = value;
    if value < low {
        value = low;
    }
    if value > high {
        value = high;
    }
    value
}

/// Round `value` to the nearest multiple of `grid`, ties toward `+inf`.
#[must_use]
pub fn round_to_grid(value: f64, grid: f64) -> f64 {
    ((value / grid) + 0.5).floor() * grid
}

/// Grid-snap `value` while staying inside `[low, high]`.
///
/// When the nearest multiple lies outside the range, the neighbouring
/// multiple on the inside is used instead. A range that contains no multiple
/// leaves `value` untouched.
#[must_use]
pub fn snap_within(value: f64, grid: f64, low: f64, high: f64) -> f64 {
    let nearest = round_to_grid(value, grid);
    if low > high || (nearest >= low && nearest <= high) {
        return nearest;
    }
    let inside = if nearest > high {
        nearest - grid
    } else {
        nearest + grid
    };
    if inside >= low && inside <= high {
        inside
    } else {
        value
    }
}

/// Format a pixel value as a CSS length (`800` -> `"800px"`).
#[must_use]
pub fn format_px(value: f64) -> String {
    // Normalize -0 so it never leaks into style strings.
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}px")
}

/// Parse a CSS pixel length (`"12.5px"`, `"12"`) into a number.
///
/// Returns `None` for any other unit or malformed input.
#[must_use]
pub fn parse_px(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    if number.is_empty() {
        return None;
    }
    number.parse::<f64>().ok().filter(|value| value.is_finite())
}
