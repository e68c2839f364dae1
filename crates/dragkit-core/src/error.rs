#![forbid(unsafe_code)]

//! Error types for controller creation, host operations, and persistence.

use thiserror::Error;

/// Reason the factory refused to wire a controller.
///
/// Every variant is non-fatal to the host; [`crate::create_draggable`] logs
/// it and returns `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error("element with id {id} not found")]
    NotFound { id: String },
    #[error("invalid mode {mode:?}; valid options are \"screen\", \"page\", or \"container\"")]
    InvalidMode { mode: String },
    #[error("container mode requires a drag area, and a drag area requires container mode")]
    ModeAreaMismatch,
    #[error("drag area with id {id} not found")]
    DragAreaNotFound { id: String },
    #[error("dragging is disabled inside embedded contexts")]
    EmbeddedContextDisabled,
    #[error("element with id {id} is already draggable")]
    AlreadyInitialized { id: String },
    #[error("host rejected controller wiring: {0}")]
    HostRejected(#[from] HostError),
}

/// Failure reported by a [`crate::DragHost`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("subscription {0} is not registered")]
    UnknownSubscription(u64),
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
    #[error("host call failed: {0}")]
    Js(String),
}

/// Failure reading or writing the durable position map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to encode position map: {0}")]
    Encode(String),
}

/// Failure parsing [`crate::DraggableOptions`].
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to parse draggable options JSON: {0}")]
    Json(#[from] serde_json::Error),
}
