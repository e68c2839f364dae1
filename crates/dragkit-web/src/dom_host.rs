#![forbid(unsafe_code)]

//! [`DragHost`] over the browser DOM.
//!
//! Subscriptions become event listeners or observers whose closures live in
//! the host's registry until unsubscribed. Delivered input is routed to the
//! controller bound with [`DomHost::bind`]; input arriving while the
//! controller is already borrowed (a JS callback re-entering it) is dropped.
//!
//! A bound controller stays alive as long as its listeners do, whether or
//! not JS keeps a handle to it. [`DomHost::unbind`] releases it.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use dragkit_core::{
    DragHost, Draggable, HostError, PointerInput, Position, Positioning, Size, Subscription,
    SubscriptionId,
};
use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Event, EventTarget, HtmlElement, MutationObserver, MutationObserverInit,
    PointerEvent, ResizeObserver, Window,
};

use crate::bindings::{
    Binding, FRAME_TAG, INIT_MARKER_KEY, INIT_MARKER_VALUE, ListenerTarget, STYLE_ATTRIBUTE,
    binding_for, event_disposition, frame_pointer_events,
};
use crate::local_storage::LocalStorage;

/// Controller type driven by a [`DomHost`].
pub type WebController = Draggable<DomHost, LocalStorage>;

enum Registration {
    Listener {
        target: EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(Event)>,
    },
    Resize {
        observer: ResizeObserver,
        _closure: Closure<dyn FnMut(Array, ResizeObserver)>,
    },
    Style {
        observer: MutationObserver,
        _closure: Closure<dyn FnMut(Array, MutationObserver)>,
    },
}

impl Registration {
    fn release(self) -> Result<(), HostError> {
        match self {
            Self::Listener {
                target,
                event,
                closure,
            } => target
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
                .map_err(js_error),
            Self::Resize { observer, .. } => {
                observer.disconnect();
                Ok(())
            }
            Self::Style { observer, .. } => {
                observer.disconnect();
                Ok(())
            }
        }
    }
}

struct DomState {
    window: Window,
    document: Document,
    registry: RefCell<BTreeMap<SubscriptionId, Registration>>,
    next_id: Cell<u64>,
    controller: RefCell<Option<Rc<RefCell<WebController>>>>,
}

/// Browser [`DragHost`]; clones share one registry.
#[derive(Clone)]
pub struct DomHost {
    state: Rc<DomState>,
}

impl fmt::Debug for DomHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomHost")
            .field("subscriptions", &self.state.registry.borrow().len())
            .finish_non_exhaustive()
    }
}

impl DomHost {
    /// Host over the current window's document.
    pub fn new() -> Result<Self, HostError> {
        let window = web_sys::window().ok_or(HostError::Unsupported("no global window"))?;
        let document = window
            .document()
            .ok_or(HostError::Unsupported("window has no document"))?;
        Ok(Self {
            state: Rc::new(DomState {
                window,
                document,
                registry: RefCell::new(BTreeMap::new()),
                next_id: Cell::new(1),
                controller: RefCell::new(None),
            }),
        })
    }

    /// Route delivered input to `controller`.
    pub fn bind(&self, controller: Rc<RefCell<WebController>>) {
        *self.state.controller.borrow_mut() = Some(controller);
    }

    /// Stop routing input and drop the host's reference to the controller.
    pub fn unbind(&self) {
        self.state.controller.borrow_mut().take();
    }

    fn register(&self, registration: Registration) -> SubscriptionId {
        let id = SubscriptionId(self.state.next_id.get());
        self.state.next_id.set(id.0.saturating_add(1));
        self.state.registry.borrow_mut().insert(id, registration);
        id
    }

    fn listener_target(&self, target: ListenerTarget, element: &HtmlElement) -> EventTarget {
        match target {
            ListenerTarget::Element => element.clone().into(),
            ListenerTarget::Document => self.state.document.clone().into(),
            ListenerTarget::Window => self.state.window.clone().into(),
        }
    }

    fn style_value(element: &HtmlElement, property: &str) -> String {
        element
            .style()
            .get_property_value(property)
            .unwrap_or_default()
    }

    fn set_style_value(element: &HtmlElement, property: &str, value: &str) {
        if let Err(err) = element.style().set_property(property, value) {
            tracing::debug!(property, error = ?err, "style write rejected");
        }
    }
}

fn js_error(value: JsValue) -> HostError {
    HostError::Js(format!("{value:?}"))
}

/// Deliver one input of kind `subscription` to the bound controller.
fn dispatch(state: &Weak<DomState>, subscription: Subscription, event: Option<&Event>) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let Some(controller) = state.controller.borrow().clone() else {
        return;
    };
    let Ok(mut controller) = controller.try_borrow_mut() else {
        tracing::debug!(?subscription, "controller busy; input dropped");
        return;
    };
    let pointer = event
        .and_then(|event| event.dyn_ref::<PointerEvent>())
        .map(|event| {
            PointerInput::at(f64::from(event.client_x()), f64::from(event.client_y()))
                .with_pointer_id(event.pointer_id())
        });
    let outcome = match (subscription, pointer) {
        (Subscription::ElementPointerDown, Some(input)) => controller.handle_pointer_down(input),
        (Subscription::DocumentPointerMove, Some(input)) => controller.handle_pointer_move(input),
        (Subscription::DocumentPointerUp, Some(input)) => controller.handle_pointer_up(input),
        (Subscription::ViewportResize | Subscription::ContainerResize, _) => {
            controller.handle_resize();
            return;
        }
        (Subscription::StyleMutation, _) => {
            controller.handle_style_mutation();
            return;
        }
        (
            Subscription::ElementPointerDown
            | Subscription::DocumentPointerMove
            | Subscription::DocumentPointerUp,
            None,
        ) => return,
    };
    drop(controller);
    let disposition = event_disposition(subscription, &outcome);
    if let Some(event) = event {
        if disposition.prevent_default {
            event.prevent_default();
        }
        if disposition.stop_propagation {
            event.stop_propagation();
        }
    }
}

impl DragHost for DomHost {
    type Element = HtmlElement;

    fn element_by_id(&self, id: &str) -> Option<HtmlElement> {
        self.state
            .document
            .get_element_by_id(id)?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn element_id(&self, element: &HtmlElement) -> String {
        element.id()
    }

    fn is_top_level_context(&self) -> bool {
        // Cross-origin parents still expose `top` as a WindowProxy.
        matches!(self.state.window.top(), Ok(Some(top)) if top == self.state.window)
    }

    fn detach(&self, element: &HtmlElement) {
        element.remove();
    }

    fn has_init_marker(&self, element: &HtmlElement) -> bool {
        element.dataset().get(INIT_MARKER_KEY).is_some()
    }

    fn set_init_marker(&self, element: &HtmlElement) {
        if let Err(err) = element.dataset().set(INIT_MARKER_KEY, INIT_MARKER_VALUE) {
            tracing::warn!(element_id = %element.id(), error = ?err, "failed to mark element");
        }
    }

    fn positioning(&self, element: &HtmlElement) -> Positioning {
        self.state
            .window
            .get_computed_style(element)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value("position").ok())
            .map_or(Positioning::Static, |raw| Positioning::from_css(&raw))
    }

    fn set_positioning(&self, element: &HtmlElement, positioning: Positioning) {
        Self::set_style_value(element, "position", positioning.as_css());
    }

    fn offset_position(&self, element: &HtmlElement) -> Position {
        Position::new(
            f64::from(element.offset_left()),
            f64::from(element.offset_top()),
        )
    }

    fn offset_size(&self, element: &HtmlElement) -> Size {
        Size::new(
            f64::from(element.offset_width()),
            f64::from(element.offset_height()),
        )
    }

    fn bounding_size(&self, element: &HtmlElement) -> Size {
        let rect = element.get_bounding_client_rect();
        Size::new(rect.width(), rect.height())
    }

    fn viewport_size(&self) -> Size {
        let read = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0)
        };
        Size::new(
            read(self.state.window.inner_width()),
            read(self.state.window.inner_height()),
        )
    }

    fn document_scroll_size(&self) -> Size {
        self.state
            .document
            .document_element()
            .map_or_else(Size::default, |root| {
                Size::new(
                    f64::from(root.scroll_width()),
                    f64::from(root.scroll_height()),
                )
            })
    }

    fn style_left(&self, element: &HtmlElement) -> String {
        Self::style_value(element, "left")
    }

    fn style_top(&self, element: &HtmlElement) -> String {
        Self::style_value(element, "top")
    }

    fn set_style_left(&self, element: &HtmlElement, value: &str) {
        Self::set_style_value(element, "left", value);
    }

    fn set_style_top(&self, element: &HtmlElement, value: &str) {
        Self::set_style_value(element, "top", value);
    }

    fn style_display(&self, element: &HtmlElement) -> String {
        Self::style_value(element, "display")
    }

    fn set_style_display(&self, element: &HtmlElement, value: &str) {
        Self::set_style_value(element, "display", value);
    }

    fn set_frames_pointer_events(&self, enabled: bool) {
        let frames = self.state.document.get_elements_by_tag_name(FRAME_TAG);
        let value = frame_pointer_events(enabled);
        for index in 0..frames.length() {
            if let Some(frame) = frames
                .item(index)
                .and_then(|frame| frame.dyn_into::<HtmlElement>().ok())
            {
                Self::set_style_value(&frame, "pointer-events", value);
            }
        }
    }

    fn set_pointer_capture(&self, element: &HtmlElement, pointer_id: Option<i32>) -> bool {
        pointer_id.is_some_and(|id| element.set_pointer_capture(id).is_ok())
    }

    fn release_pointer_capture(&self, element: &HtmlElement, pointer_id: Option<i32>) {
        if let Some(id) = pointer_id
            && let Err(err) = element.release_pointer_capture(id)
        {
            tracing::debug!(pointer_id = id, error = ?err, "pointer capture already released");
        }
    }

    fn subscribe(
        &self,
        element: &HtmlElement,
        subscription: Subscription,
    ) -> Result<SubscriptionId, HostError> {
        let state = Rc::downgrade(&self.state);
        let registration = match binding_for(subscription) {
            Binding::Event { target, event } => {
                let target = self.listener_target(target, element);
                let closure = Closure::wrap(Box::new(move |event: Event| {
                    dispatch(&state, subscription, Some(&event));
                }) as Box<dyn FnMut(Event)>);
                target
                    .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
                    .map_err(js_error)?;
                Registration::Listener {
                    target,
                    event,
                    closure,
                }
            }
            Binding::ResizeObserver => {
                let closure = Closure::wrap(Box::new(move |_: Array, _: ResizeObserver| {
                    dispatch(&state, subscription, None);
                })
                    as Box<dyn FnMut(Array, ResizeObserver)>);
                let observer =
                    ResizeObserver::new(closure.as_ref().unchecked_ref()).map_err(js_error)?;
                observer.observe(element);
                Registration::Resize {
                    observer,
                    _closure: closure,
                }
            }
            Binding::StyleObserver => {
                let closure = Closure::wrap(Box::new(move |_: Array, _: MutationObserver| {
                    dispatch(&state, subscription, None);
                })
                    as Box<dyn FnMut(Array, MutationObserver)>);
                let observer =
                    MutationObserver::new(closure.as_ref().unchecked_ref()).map_err(js_error)?;
                let init = MutationObserverInit::new();
                init.set_attributes(true);
                init.set_attribute_filter(&Array::of1(&JsValue::from_str(STYLE_ATTRIBUTE)));
                observer
                    .observe_with_options(element, &init)
                    .map_err(js_error)?;
                Registration::Style {
                    observer,
                    _closure: closure,
                }
            }
        };
        Ok(self.register(registration))
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), HostError> {
        let registration = self.state.registry.borrow_mut().remove(&id);
        registration
            .ok_or(HostError::UnknownSubscription(id.0))?
            .release()
    }
}
