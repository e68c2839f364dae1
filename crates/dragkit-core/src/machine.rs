#![forbid(unsafe_code)]

//! Drag lifecycle state and per-move position computation.
//!
//! ```text
//!            pointer-down
//!   Idle ─────────────────▶ Dragging ──┐ pointer-move
//!    ▲                          │  ◀───┘
//!    └──────────────────────────┘
//!       pointer-up / destroy
//! ```
//!
//! [`DragSession`] exists only while dragging. It owns the pointer offset
//! captured at grab time and the session-scoped move/up subscriptions, so
//! ending a session is the single place those are released.

use crate::config::LockAxis;
use crate::geometry::{Bounds, Position, snap_within};
use crate::host::SubscriptionId;
use crate::snap::Edge;

/// Coarse lifecycle state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
}

/// Transient state between pointer-down and pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Pointer offset from the element's top-left corner at grab time.
    pub pointer_offset: Position,
    pub pointer_id: Option<i32>,
    pub pointer_captured: bool,
    pub(crate) move_subscription: Option<SubscriptionId>,
    pub(crate) up_subscription: Option<SubscriptionId>,
}

impl DragSession {
    pub(crate) fn new(pointer_offset: Position, pointer_id: Option<i32>) -> Self {
        Self {
            pointer_offset,
            pointer_id,
            pointer_captured: false,
            move_subscription: None,
            up_subscription: None,
        }
    }

    /// Session subscriptions still registered with the host.
    pub(crate) fn take_subscriptions(&mut self) -> impl Iterator<Item = SubscriptionId> + use<> {
        [self.move_subscription.take(), self.up_subscription.take()]
            .into_iter()
            .flatten()
    }
}

/// Inputs of one pointer-move computation besides the pointer itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveConstraints {
    pub bounds: Bounds,
    pub edge_buffer: f64,
    pub grid_size: Option<f64>,
    pub lock_axis: Option<LockAxis>,
}

/// Position to commit for a pointer at `pointer`.
///
/// `current` is the element's present offset; the locked axis keeps its
/// current coordinate and is never grid-snapped. Clamping happens before grid
/// snapping, and grid snapping never leaves the clamp range when a multiple
/// exists inside it.
#[must_use]
pub fn compute_drag_position(
    pointer: Position,
    pointer_offset: Position,
    current: Position,
    constraints: &MoveConstraints,
) -> Position {
    let mut candidate = Position::new(pointer.x - pointer_offset.x, pointer.y - pointer_offset.y);
    match constraints.lock_axis {
        Some(LockAxis::X) => candidate.y = current.y,
        Some(LockAxis::Y) => candidate.x = current.x,
        None => {}
    }

    let bounds = constraints.bounds;
    let buffer = constraints.edge_buffer;
    let clamped = bounds.clamp(candidate, buffer);
    let Some(grid) = constraints.grid_size else {
        return clamped;
    };
    let mut snapped = clamped;
    if constraints.lock_axis != Some(LockAxis::Y) {
        snapped.x = snap_within(clamped.x, grid, bounds.min_x - buffer, bounds.max_x + buffer);
    }
    if constraints.lock_axis != Some(LockAxis::X) {
        snapped.y = snap_within(clamped.y, grid, bounds.min_y - buffer, bounds.max_y + buffer);
    }
    snapped
}

/// Why an input was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragIgnoredReason {
    /// Pointer-down while a session is already active.
    AlreadyDragging,
    /// Move or up without an active session.
    NotDragging,
    /// The controller was destroyed.
    Destroyed,
    /// The host refused a session subscription; the session was rolled back.
    SubscriptionFailed,
}

/// Result of feeding one input to a controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Started {
        pointer_offset: Position,
        pointer_captured: bool,
    },
    Moved {
        position: Position,
    },
    Ended {
        position: Position,
        snapped_to: Option<Edge>,
    },
    Ignored(DragIgnoredReason),
}

impl DragOutcome {
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn constraints() -> MoveConstraints {
        MoveConstraints {
            bounds: Bounds::within(Size::new(1000.0, 800.0), Size::new(200.0, 100.0)),
            edge_buffer: 0.0,
            grid_size: None,
            lock_axis: None,
        }
    }

    #[test]
    fn candidate_clamps_to_viewport_bounds() {
        let position = compute_drag_position(
            Position::new(900.0, 750.0),
            Position::new(10.0, 10.0),
            Position::ORIGIN,
            &constraints(),
        );
        assert_eq!(position, Position::new(800.0, 700.0));
    }

    #[test]
    fn grid_applies_after_clamping() {
        let mut constraints = constraints();
        constraints.grid_size = Some(10.0);
        constraints.bounds.max_x = 900.0;
        let position = compute_drag_position(
            Position::new(813.0, 707.0),
            Position::new(10.0, 10.0),
            Position::ORIGIN,
            &constraints,
        );
        assert_eq!(position, Position::new(800.0, 700.0));
    }

    #[test]
    fn lock_x_freezes_vertical_coordinate() {
        let mut constraints = constraints();
        constraints.lock_axis = Some(LockAxis::X);
        let position = compute_drag_position(
            Position::new(300.0, 500.0),
            Position::ORIGIN,
            Position::new(40.0, 60.0),
            &constraints,
        );
        assert_eq!(position, Position::new(300.0, 60.0));
    }

    #[test]
    fn lock_y_freezes_horizontal_coordinate() {
        let mut constraints = constraints();
        constraints.lock_axis = Some(LockAxis::Y);
        let position = compute_drag_position(
            Position::new(300.0, 500.0),
            Position::ORIGIN,
            Position::new(40.0, 60.0),
            &constraints,
        );
        assert_eq!(position, Position::new(40.0, 500.0));
    }

    #[test]
    fn grid_skips_locked_axis() {
        let mut constraints = constraints();
        constraints.grid_size = Some(10.0);
        constraints.lock_axis = Some(LockAxis::X);
        let position = compute_drag_position(
            Position::new(300.0, 600.0),
            Position::new(10.0, 10.0),
            Position::new(100.0, 255.0),
            &constraints,
        );
        assert_eq!(position, Position::new(290.0, 255.0));

        constraints.lock_axis = Some(LockAxis::Y);
        let position = compute_drag_position(
            Position::new(300.0, 603.0),
            Position::ORIGIN,
            Position::new(103.0, 255.0),
            &constraints,
        );
        assert_eq!(position, Position::new(103.0, 600.0));
    }

    #[test]
    fn edge_buffer_permits_overshoot() {
        let mut constraints = constraints();
        constraints.edge_buffer = 15.0;
        let position = compute_drag_position(
            Position::new(-100.0, 900.0),
            Position::ORIGIN,
            Position::ORIGIN,
            &constraints,
        );
        assert_eq!(position, Position::new(-15.0, 715.0));
    }

    #[test]
    fn session_subscriptions_are_taken_once() {
        let mut session = DragSession::new(Position::ORIGIN, None);
        session.move_subscription = Some(SubscriptionId(3));
        session.up_subscription = Some(SubscriptionId(4));
        let taken: Vec<_> = session.take_subscriptions().collect();
        assert_eq!(taken, vec![SubscriptionId(3), SubscriptionId(4)]);
        assert_eq!(session.take_subscriptions().count(), 0);
    }
}
