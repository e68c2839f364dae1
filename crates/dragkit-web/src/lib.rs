#![forbid(unsafe_code)]

//! Browser binding for `dragkit-core`.
//!
//! - [`bindings`]: which DOM primitive delivers each controller subscription.
//! - `DomHost`: the `DragHost` implementation over `web-sys`.
//! - `LocalStorage`: `window.localStorage` as the position store.
//! - `createDraggable` / `WebDraggable`: the JS-facing API.
//!
//! Everything except [`bindings`] compiles only on `wasm32`.
//!
//! ```js
//! import init, { createDraggable } from "dragkit_web";
//!
//! await init();
//! const handle = createDraggable("toolbar", {
//!   mode: "container",
//!   dragArea: document.getElementById("workspace"),
//!   snapMode: "auto",
//!   shouldSave: true,
//!   onDragEnd: (el) => console.log("dropped", el.style.left, el.style.top),
//! });
//! ```

pub mod bindings;

#[cfg(target_arch = "wasm32")]
mod dom_host;
#[cfg(target_arch = "wasm32")]
mod local_storage;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom_host::{DomHost, WebController};
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;
#[cfg(target_arch = "wasm32")]
pub use wasm::{WebDraggable, create_draggable};
