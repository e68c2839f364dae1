#![forbid(unsafe_code)]

//! `dragkit-core` makes one on-screen element draggable.
//!
//! The controller attaches pointer-drag behavior to an element, keeps it
//! inside a bounding region (viewport, scrollable document, or a container
//! element), optionally snaps it to a grid or to the nearest edge, and
//! persists its last position across reloads.
//!
//! Design goals:
//! - **Host-driven**: the environment implements [`DragHost`] and pushes
//!   pointer, resize, and style-mutation input into the controller.
//! - **No rendering**: the controller only writes positioning and
//!   `left`/`top` style values on the element it owns.
//! - **Never crash the host**: creation failures are logged and surface as
//!   `None`; teardown failures are logged and swallowed.
//!
//! [`HeadlessHost`] is a deterministic in-memory host for tests and
//! simulations; `dragkit-web` provides the browser host.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use dragkit_core::{
//!     DragCallbacks, DraggableOptions, HeadlessHost, MemoryStore, PointerInput, Size,
//!     create_draggable,
//! };
//!
//! let host = HeadlessHost::new(Size::new(1000.0, 800.0));
//! let panel = host.add_element("panel", Size::new(200.0, 100.0));
//! let store = Rc::new(MemoryStore::new());
//!
//! let mut draggable = create_draggable(
//!     host.clone(),
//!     store,
//!     "panel",
//!     &DraggableOptions::default(),
//!     DragCallbacks::new(),
//! )
//! .expect("panel is draggable");
//!
//! draggable.handle_pointer_down(PointerInput::at(10.0, 10.0));
//! draggable.handle_pointer_move(PointerInput::at(900.0, 750.0));
//! draggable.handle_pointer_up(PointerInput::at(900.0, 750.0));
//! assert_eq!(host.position(panel).x, 800.0);
//! ```

pub mod bounds;
pub mod config;
pub mod controller;
pub mod error;
pub mod factory;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod machine;
pub mod snap;
pub mod store;
pub mod visibility;

pub use bounds::{apply_positioning_mode, compute_bounds, recompute_bounds};
pub use config::{
    Configuration, DragCallbacks, DragMode, DraggableOptions, InitialPosition,
    InitialPositionOptions, LockAxis, SnapMode,
};
pub use controller::Draggable;
pub use error::{CreateError, HostError, OptionsError, StoreError};
pub use factory::{create_draggable, try_create_draggable};
pub use geometry::{Bounds, Position, Size};
pub use headless::{HeadlessHost, HeadlessNode};
pub use host::{DragHost, PointerInput, Positioning, Subscription, SubscriptionId};
pub use machine::{DragIgnoredReason, DragOutcome, DragPhase, DragSession};
pub use snap::{Edge, EdgeDistances};
pub use store::{DEFAULT_STORAGE_KEY, KeyValueStore, MemoryStore, PositionStore, StoredPosition};
pub use visibility::VisibilityGuard;
