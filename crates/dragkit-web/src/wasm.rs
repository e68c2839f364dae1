#![forbid(unsafe_code)]

//! `wasm-bindgen` exports: `createDraggable` and the `WebDraggable` handle.
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use dragkit_core::{DragCallbacks, DragPhase, DraggableOptions, try_create_draggable};
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::bindings::{ConsoleLevel, generated_area_id, read_unless_busy, rejection_level};
use crate::dom_host::{DomHost, WebController};
use crate::local_storage::LocalStorage;

static NEXT_AREA_ID: AtomicU64 = AtomicU64::new(0);

fn console(level: ConsoleLevel, msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(method) = Reflect::get(&console, &level.method().into()) else {
        return;
    };
    let Ok(method) = method.dyn_into::<Function>() else {
        return;
    };
    let _ = method.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console(ConsoleLevel::Error, &msg);
        }));
    });
}

fn get_js(obj: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

/// Id of a drag-area element, assigning a generated one when it has none.
fn area_id(area: &HtmlElement) -> String {
    let id = area.id();
    if !id.is_empty() {
        return id;
    }
    let id = generated_area_id(NEXT_AREA_ID.fetch_add(1, Ordering::Relaxed));
    area.set_id(&id);
    id
}

/// Convert a JS options object into [`DraggableOptions`].
///
/// `dragArea` may be an element or an element id. Function-valued fields
/// (the callbacks) are skipped.
fn read_options(raw: &JsValue) -> Result<DraggableOptions, String> {
    if raw.is_undefined() || raw.is_null() {
        return Ok(DraggableOptions::default());
    }
    let source = raw
        .dyn_ref::<Object>()
        .ok_or_else(|| "draggable options must be an object".to_owned())?;
    let plain = Object::assign(&Object::new(), source);
    if let Some(area) = get_js(&plain, "dragArea")
        && let Some(area) = area.dyn_ref::<HtmlElement>()
    {
        Reflect::set(
            &plain,
            &JsValue::from_str("dragArea"),
            &JsValue::from_str(&area_id(area)),
        )
        .map_err(|err| format!("{err:?}"))?;
    }
    let json = js_sys::JSON::stringify(&plain).map_err(|err| format!("{err:?}"))?;
    DraggableOptions::from_json_str(&String::from(json)).map_err(|err| err.to_string())
}

fn js_callback(name: &'static str, callback: Function) -> impl FnMut(&HtmlElement) + 'static {
    move |element: &HtmlElement| {
        if let Err(err) = callback.call1(&JsValue::NULL, element) {
            console(ConsoleLevel::Error, &format!("{name} threw: {err:?}"));
        }
    }
}

fn read_callbacks(raw: &JsValue) -> DragCallbacks<HtmlElement> {
    let function = |key: &str| get_js(raw, key).and_then(|value| value.dyn_into::<Function>().ok());
    let mut callbacks = DragCallbacks::new();
    if let Some(callback) = function("onDragStart") {
        callbacks = callbacks.on_drag_start(js_callback("onDragStart", callback));
    }
    if let Some(callback) = function("onDrag") {
        callbacks = callbacks.on_drag(js_callback("onDrag", callback));
    }
    if let Some(callback) = function("onDragEnd") {
        callbacks = callbacks.on_drag_end(js_callback("onDragEnd", callback));
    }
    callbacks
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

/// Make the element `elementId` draggable.
///
/// Returns `undefined` when the element cannot be made draggable; the
/// reason is written to the console.
#[wasm_bindgen(js_name = createDraggable)]
pub fn create_draggable(element_id: &str, options: JsValue) -> Option<WebDraggable> {
    install_panic_hook();
    let host = match DomHost::new() {
        Ok(host) => host,
        Err(err) => {
            console(ConsoleLevel::Error, &err.to_string());
            return None;
        }
    };
    let parsed = match read_options(&options) {
        Ok(parsed) => parsed,
        Err(err) => {
            console(ConsoleLevel::Error, &err);
            return None;
        }
    };
    let callbacks = read_callbacks(&options);
    match try_create_draggable(host.clone(), LocalStorage, element_id, &parsed, callbacks) {
        Ok(draggable) => {
            let element = draggable.element().clone();
            let controller = Rc::new(RefCell::new(draggable));
            host.bind(Rc::clone(&controller));
            Some(WebDraggable {
                controller,
                host,
                element,
            })
        }
        Err(err) => {
            console(rejection_level(&err), &err.to_string());
            None
        }
    }
}

/// JS handle to one draggable element.
///
/// Dropping the handle does not stop dragging; call `destroy()` for that.
#[wasm_bindgen]
pub struct WebDraggable {
    controller: Rc<RefCell<WebController>>,
    host: DomHost,
    element: HtmlElement,
}

impl WebDraggable {
    fn with_controller<T>(&self, f: impl FnOnce(&mut WebController) -> T) -> Option<T> {
        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            Some(f(&mut controller))
        } else {
            console(
                ConsoleLevel::Warn,
                "draggable is busy inside its own callback; call ignored",
            );
            None
        }
    }

    fn read<T>(&self, f: impl FnOnce(&WebController) -> T) -> Option<T> {
        read_unless_busy(&self.controller, f)
    }
}

#[wasm_bindgen]
impl WebDraggable {
    #[wasm_bindgen(getter)]
    pub fn element(&self) -> HtmlElement {
        self.element.clone()
    }

    #[wasm_bindgen(getter, js_name = minX)]
    pub fn min_x(&self) -> Option<f64> {
        self.read(WebController::min_x)
    }

    #[wasm_bindgen(getter, js_name = minY)]
    pub fn min_y(&self) -> Option<f64> {
        self.read(WebController::min_y)
    }

    #[wasm_bindgen(getter, js_name = maxX)]
    pub fn max_x(&self) -> Option<f64> {
        self.read(WebController::max_x)
    }

    #[wasm_bindgen(getter, js_name = maxY)]
    pub fn max_y(&self) -> Option<f64> {
        self.read(WebController::max_y)
    }

    /// `undefined` while the controller is busy inside its own callback.
    #[wasm_bindgen(getter, js_name = isDragging)]
    pub fn is_dragging(&self) -> Option<bool> {
        self.read(|controller| controller.phase() == DragPhase::Dragging)
    }

    #[wasm_bindgen(js_name = updateBounds)]
    pub fn update_bounds(&self) {
        self.with_controller(WebController::update_bounds);
    }

    /// Persist the current position. Rejects when storage is unavailable.
    #[wasm_bindgen(js_name = savePosition)]
    pub fn save_position(&self) -> Result<(), JsValue> {
        match self.read(WebController::save_position) {
            Some(result) => result.map_err(|err| JsValue::from_str(&err.to_string())),
            None => Err(JsValue::from_str("draggable is busy")),
        }
    }

    #[wasm_bindgen(js_name = restorePosition)]
    pub fn restore_position(&self) {
        self.with_controller(WebController::restore_position);
    }

    /// Release every listener and observer. Safe to call more than once.
    pub fn destroy(&self) {
        if self.with_controller(WebController::destroy).is_some() {
            self.host.unbind();
        }
    }
}
