#![forbid(unsafe_code)]

//! Controller factory: validation, one-time marking, and wiring.

use crate::config::{Configuration, DragCallbacks, DragMode, DraggableOptions};
use crate::controller::Draggable;
use crate::error::CreateError;
use crate::host::DragHost;
use crate::store::KeyValueStore;

/// Make the element `element_id` draggable.
///
/// Returns `None` on every rejection; the reason is logged. Use
/// [`try_create_draggable`] to get it as a value.
pub fn create_draggable<H, S>(
    host: H,
    store: S,
    element_id: &str,
    options: &DraggableOptions,
    callbacks: DragCallbacks<H::Element>,
) -> Option<Draggable<H, S>>
where
    H: DragHost,
    S: KeyValueStore,
{
    try_create_draggable(host, store, element_id, options, callbacks).ok()
}

/// Make the element `element_id` draggable, reporting why it was refused.
///
/// Checks run in order and the first failure wins:
/// 1. the element resolves ([`CreateError::NotFound`]),
/// 2. `mode` is recognized ([`CreateError::InvalidMode`]),
/// 3. container mode and drag area come together
///    ([`CreateError::ModeAreaMismatch`]), and the area resolves
///    ([`CreateError::DragAreaNotFound`]),
/// 4. the host is a top-level context; otherwise the element is detached
///    ([`CreateError::EmbeddedContextDisabled`]),
/// 5. the element is not already draggable
///    ([`CreateError::AlreadyInitialized`]).
///
/// Nothing on the element changes unless every check passes and every host
/// subscription is accepted; only then is the element marked, revealed, and
/// positioned.
pub fn try_create_draggable<H, S>(
    host: H,
    store: S,
    element_id: &str,
    options: &DraggableOptions,
    callbacks: DragCallbacks<H::Element>,
) -> Result<Draggable<H, S>, CreateError>
where
    H: DragHost,
    S: KeyValueStore,
{
    let result = build(host, store, element_id, options, callbacks);
    if let Err(err) = &result {
        log_rejection(element_id, err);
    }
    result
}

fn build<H, S>(
    host: H,
    store: S,
    element_id: &str,
    options: &DraggableOptions,
    callbacks: DragCallbacks<H::Element>,
) -> Result<Draggable<H, S>, CreateError>
where
    H: DragHost,
    S: KeyValueStore,
{
    let element = host
        .element_by_id(element_id)
        .ok_or_else(|| CreateError::NotFound {
            id: element_id.to_owned(),
        })?;

    let mode = match options.mode.as_deref() {
        None => DragMode::default(),
        Some(raw) => raw.parse::<DragMode>().map_err(|err| CreateError::InvalidMode {
            mode: err.0,
        })?,
    };

    let drag_area = match (mode, options.drag_area.as_deref()) {
        (DragMode::Container, Some(area_id)) => Some(host.element_by_id(area_id).ok_or_else(
            || CreateError::DragAreaNotFound {
                id: area_id.to_owned(),
            },
        )?),
        (DragMode::Container, None) | (_, Some(_)) => return Err(CreateError::ModeAreaMismatch),
        (_, None) => None,
    };

    if !host.is_top_level_context() {
        host.detach(&element);
        return Err(CreateError::EmbeddedContextDisabled);
    }

    if host.has_init_marker(&element) {
        return Err(CreateError::AlreadyInitialized {
            id: element_id.to_owned(),
        });
    }

    let config = Configuration::merge(options, mode, drag_area);
    let mut draggable = Draggable::new(host, store, element, config, callbacks);
    draggable.init()?;
    Ok(draggable)
}

fn log_rejection(element_id: &str, err: &CreateError) {
    match err {
        CreateError::EmbeddedContextDisabled | CreateError::AlreadyInitialized { .. } => {
            tracing::warn!(element_id, error = %err, "draggable not created");
        }
        CreateError::NotFound { .. }
        | CreateError::InvalidMode { .. }
        | CreateError::ModeAreaMismatch
        | CreateError::DragAreaNotFound { .. }
        | CreateError::HostRejected(_) => {
            tracing::error!(element_id, error = %err, "draggable not created");
        }
    }
}
