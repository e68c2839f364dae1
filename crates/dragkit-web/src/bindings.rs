#![forbid(unsafe_code)]

//! DOM wiring table.
//!
//! Maps each controller [`Subscription`] onto the browser primitive that
//! delivers it, and each [`DragOutcome`] onto how its event is treated. Kept
//! target-independent so the tables are tested natively; `DomHost` consumes
//! them on `wasm32`.

use std::cell::RefCell;

use dragkit_core::{CreateError, DragOutcome, Subscription};

/// `data-*` key of the one-time initialization marker
/// (`data-draggable-initialized`).
pub const INIT_MARKER_KEY: &str = "draggableInitialized";

/// Value written to the init marker.
pub const INIT_MARKER_VALUE: &str = "true";

/// Attribute the style observer is filtered to.
pub const STYLE_ATTRIBUTE: &str = "style";

/// Tag name of embedded frames whose pointer events are suspended while
/// dragging.
pub const FRAME_TAG: &str = "iframe";

/// Prefix for ids generated for drag-area elements passed without one.
pub const GENERATED_AREA_ID_PREFIX: &str = "dragkit-area-";

/// Object an event listener is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    Element,
    Document,
    Window,
}

/// Browser primitive backing one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// `addEventListener(event, ...)` on `target`.
    Event {
        target: ListenerTarget,
        event: &'static str,
    },
    /// `ResizeObserver` on the subscribed element.
    ResizeObserver,
    /// `MutationObserver` on the subscribed element's [`STYLE_ATTRIBUTE`].
    StyleObserver,
}

/// Binding used for `subscription`.
#[must_use]
pub const fn binding_for(subscription: Subscription) -> Binding {
    match subscription {
        Subscription::ElementPointerDown => Binding::Event {
            target: ListenerTarget::Element,
            event: "pointerdown",
        },
        Subscription::DocumentPointerMove => Binding::Event {
            target: ListenerTarget::Document,
            event: "pointermove",
        },
        Subscription::DocumentPointerUp => Binding::Event {
            target: ListenerTarget::Document,
            event: "pointerup",
        },
        Subscription::ViewportResize => Binding::Event {
            target: ListenerTarget::Window,
            event: "resize",
        },
        Subscription::ContainerResize => Binding::ResizeObserver,
        Subscription::StyleMutation => Binding::StyleObserver,
    }
}

/// Default-action handling for a delivered pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventDisposition {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

/// How the browser event behind `subscription` is treated once the
/// controller produced `outcome`.
///
/// A pointer-down that starts a session suppresses text selection and
/// keeps ancestors from seeing the press; an applied move suppresses
/// scrolling and selection. Ignored input is left alone.
#[must_use]
pub const fn event_disposition(
    subscription: Subscription,
    outcome: &DragOutcome,
) -> EventDisposition {
    match (subscription, outcome) {
        (Subscription::ElementPointerDown, DragOutcome::Started { .. }) => EventDisposition {
            prevent_default: true,
            stop_propagation: true,
        },
        (Subscription::DocumentPointerMove, DragOutcome::Moved { .. }) => EventDisposition {
            prevent_default: true,
            stop_propagation: false,
        },
        _ => EventDisposition {
            prevent_default: false,
            stop_propagation: false,
        },
    }
}

/// Inline `pointer-events` value for embedded frames.
///
/// The empty string removes the inline override.
#[must_use]
pub const fn frame_pointer_events(enabled: bool) -> &'static str {
    if enabled { "" } else { "none" }
}

/// Id assigned to the `seq`-th id-less drag area.
#[must_use]
pub fn generated_area_id(seq: u64) -> String {
    format!("{GENERATED_AREA_ID_PREFIX}{seq}")
}

/// Browser console method a factory rejection is reported with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Warn,
    Error,
}

impl ConsoleLevel {
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Read through `cell`, or `None` while it is mutably borrowed (a JS
/// callback re-entering its own controller).
pub fn read_unless_busy<C, T>(cell: &RefCell<C>, f: impl FnOnce(&C) -> T) -> Option<T> {
    cell.try_borrow().ok().map(|value| f(&value))
}

/// Console severity for a factory rejection.
#[must_use]
pub const fn rejection_level(err: &CreateError) -> ConsoleLevel {
    match err {
        CreateError::EmbeddedContextDisabled | CreateError::AlreadyInitialized { .. } => {
            ConsoleLevel::Warn
        }
        CreateError::NotFound { .. }
        | CreateError::InvalidMode { .. }
        | CreateError::ModeAreaMismatch
        | CreateError::DragAreaNotFound { .. }
        | CreateError::HostRejected(_) => ConsoleLevel::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragkit_core::{DragIgnoredReason, Position};
    use pretty_assertions::assert_eq;

    #[test]
    fn pointer_streams_follow_the_pointer_anywhere() {
        assert_eq!(
            binding_for(Subscription::ElementPointerDown),
            Binding::Event {
                target: ListenerTarget::Element,
                event: "pointerdown",
            }
        );
        for (subscription, event) in [
            (Subscription::DocumentPointerMove, "pointermove"),
            (Subscription::DocumentPointerUp, "pointerup"),
        ] {
            assert_eq!(
                binding_for(subscription),
                Binding::Event {
                    target: ListenerTarget::Document,
                    event,
                }
            );
        }
    }

    #[test]
    fn resize_and_style_use_observers() {
        assert_eq!(
            binding_for(Subscription::ViewportResize),
            Binding::Event {
                target: ListenerTarget::Window,
                event: "resize",
            }
        );
        assert_eq!(
            binding_for(Subscription::ContainerResize),
            Binding::ResizeObserver
        );
        assert_eq!(
            binding_for(Subscription::StyleMutation),
            Binding::StyleObserver
        );
    }

    #[test]
    fn started_and_moved_events_suppress_browser_defaults() {
        let started = DragOutcome::Started {
            pointer_offset: Position::new(4.0, 6.0),
            pointer_captured: true,
        };
        assert_eq!(
            event_disposition(Subscription::ElementPointerDown, &started),
            EventDisposition {
                prevent_default: true,
                stop_propagation: true,
            }
        );
        let moved = DragOutcome::Moved {
            position: Position::new(10.0, 20.0),
        };
        assert_eq!(
            event_disposition(Subscription::DocumentPointerMove, &moved),
            EventDisposition {
                prevent_default: true,
                stop_propagation: false,
            }
        );
    }

    #[test]
    fn ignored_and_ending_events_keep_browser_defaults() {
        let ignored = [
            (
                Subscription::ElementPointerDown,
                DragOutcome::Ignored(DragIgnoredReason::AlreadyDragging),
            ),
            (
                Subscription::DocumentPointerMove,
                DragOutcome::Ignored(DragIgnoredReason::NotDragging),
            ),
            (
                Subscription::DocumentPointerUp,
                DragOutcome::Ended {
                    position: Position::ORIGIN,
                    snapped_to: None,
                },
            ),
        ];
        for (subscription, outcome) in ignored {
            assert_eq!(
                event_disposition(subscription, &outcome),
                EventDisposition::default()
            );
        }
    }

    #[test]
    fn frames_are_restored_by_clearing_the_override() {
        assert_eq!(frame_pointer_events(false), "none");
        assert_eq!(frame_pointer_events(true), "");
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_eq!(generated_area_id(0), "dragkit-area-0");
        assert_ne!(generated_area_id(1), generated_area_id(2));
    }

    #[test]
    fn reads_report_nothing_while_busy() {
        let cell = RefCell::new(7_u8);
        assert_eq!(read_unless_busy(&cell, |value| *value == 7), Some(true));
        let guard = cell.borrow_mut();
        assert_eq!(read_unless_busy(&cell, |value| *value == 7), None);
        drop(guard);
        assert_eq!(read_unless_busy(&cell, |value| *value), Some(7));
    }

    #[test]
    fn benign_rejections_are_warnings() {
        assert_eq!(
            rejection_level(&CreateError::EmbeddedContextDisabled),
            ConsoleLevel::Warn
        );
        assert_eq!(
            rejection_level(&CreateError::AlreadyInitialized { id: "a".into() }),
            ConsoleLevel::Warn
        );
        assert_eq!(
            rejection_level(&CreateError::ModeAreaMismatch),
            ConsoleLevel::Error
        );
        assert_eq!(ConsoleLevel::Error.method(), "error");
    }
}
