#![forbid(unsafe_code)]

//! Deterministic in-memory host.
//!
//! [`HeadlessHost`] models just enough of a document for the controller:
//! elements with ids, inline `left`/`top`/`display` styles, positioning,
//! layout sizes, a viewport, embedded frames, and subscription bookkeeping.
//! Nothing is delivered automatically; callers drive the controller's
//! `handle_*` methods and inspect the host afterwards.
//!
//! The host is a cheap clonable handle: every clone observes the same
//! document, so tests can keep one clone while a controller owns another.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::HostError;
use crate::geometry::{Position, Size, parse_px};
use crate::host::{DragHost, Positioning, Subscription, SubscriptionId};

/// Element handle of a [`HeadlessHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadlessNode(usize);

#[derive(Debug, Clone)]
struct NodeState {
    id: String,
    attached: bool,
    size: Size,
    bounding: Option<Size>,
    left: String,
    top: String,
    display: String,
    positioning: Positioning,
    init_marker: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveSubscription {
    node: HeadlessNode,
    kind: Subscription,
}

#[derive(Debug)]
struct HeadlessDocument {
    nodes: Vec<NodeState>,
    viewport: Size,
    document: Option<Size>,
    top_level: bool,
    frames_pointer_events: bool,
    capture_supported: bool,
    capture: Option<(HeadlessNode, Option<i32>)>,
    subscriptions: BTreeMap<SubscriptionId, ActiveSubscription>,
    next_subscription: u64,
    refuse_subscription: Option<Subscription>,
    refuse_unsubscribe: bool,
}

/// Shared-state, deterministic [`DragHost`].
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    doc: Rc<RefCell<HeadlessDocument>>,
}

impl HeadlessHost {
    /// Empty top-level document with the given viewport.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            doc: Rc::new(RefCell::new(HeadlessDocument {
                nodes: Vec::new(),
                viewport,
                document: None,
                top_level: true,
                frames_pointer_events: true,
                capture_supported: true,
                capture: None,
                subscriptions: BTreeMap::new(),
                next_subscription: 1,
                refuse_subscription: None,
                refuse_unsubscribe: false,
            })),
        }
    }

    /// Attach a statically positioned element at `(0, 0)`.
    pub fn add_element(&self, id: impl Into<String>, size: Size) -> HeadlessNode {
        let mut doc = self.doc.borrow_mut();
        doc.nodes.push(NodeState {
            id: id.into(),
            attached: true,
            size,
            bounding: None,
            left: String::new(),
            top: String::new(),
            display: String::new(),
            positioning: Positioning::Static,
            init_marker: false,
        });
        HeadlessNode(doc.nodes.len() - 1)
    }

    pub fn set_viewport_size(&self, size: Size) {
        self.doc.borrow_mut().viewport = size;
    }

    /// Scrollable document extent; defaults to the viewport size.
    pub fn set_document_size(&self, size: Size) {
        self.doc.borrow_mut().document = Some(size);
    }

    /// Simulate running inside (false) or outside (true) a frame.
    pub fn set_top_level(&self, top_level: bool) {
        self.doc.borrow_mut().top_level = top_level;
    }

    pub fn set_element_size(&self, node: HeadlessNode, size: Size) {
        self.with_node(node, |state| state.size = size);
    }

    /// Override the rendered bounding box (defaults to the layout size).
    pub fn set_bounding_size(&self, node: HeadlessNode, size: Size) {
        self.with_node(node, |state| state.bounding = Some(size));
    }

    pub fn set_pointer_capture_supported(&self, supported: bool) {
        self.doc.borrow_mut().capture_supported = supported;
    }

    /// Make every subsequent subscription of `kind` fail.
    pub fn refuse_subscription(&self, kind: Option<Subscription>) {
        self.doc.borrow_mut().refuse_subscription = kind;
    }

    /// Make every subsequent unsubscribe fail (the subscription stays live).
    pub fn refuse_unsubscribe(&self, refuse: bool) {
        self.doc.borrow_mut().refuse_unsubscribe = refuse;
    }

    /// Write `left`/`top` styles the way external code would.
    pub fn write_style_position(&self, node: HeadlessNode, left: &str, top: &str) {
        self.with_node(node, |state| {
            state.left = left.to_owned();
            state.top = top.to_owned();
        });
    }

    /// Hide the element the way a re-rendering framework would.
    pub fn hide_externally(&self, node: HeadlessNode) {
        self.with_node(node, |state| state.display = "none".to_owned());
    }

    /// Numeric `left`/`top` style values (non-pixel values read as `0`).
    #[must_use]
    pub fn position(&self, node: HeadlessNode) -> Position {
        self.offset_position(&node)
    }

    #[must_use]
    pub fn is_attached(&self, node: HeadlessNode) -> bool {
        self.read_node(node, |state| state.attached)
    }

    #[must_use]
    pub fn frames_pointer_events_enabled(&self) -> bool {
        self.doc.borrow().frames_pointer_events
    }

    /// Element currently holding pointer capture.
    #[must_use]
    pub fn captured_node(&self) -> Option<HeadlessNode> {
        self.doc.borrow().capture.map(|(node, _)| node)
    }

    /// Live subscriptions in registration order.
    #[must_use]
    pub fn active_subscriptions(&self) -> Vec<(HeadlessNode, Subscription)> {
        self.doc
            .borrow()
            .subscriptions
            .values()
            .map(|active| (active.node, active.kind))
            .collect()
    }

    #[must_use]
    pub fn has_subscription(&self, kind: Subscription) -> bool {
        self.doc
            .borrow()
            .subscriptions
            .values()
            .any(|active| active.kind == kind)
    }

    fn with_node(&self, node: HeadlessNode, update: impl FnOnce(&mut NodeState)) {
        if let Some(state) = self.doc.borrow_mut().nodes.get_mut(node.0) {
            update(state);
        }
    }

    fn read_node<T: Default>(&self, node: HeadlessNode, read: impl FnOnce(&NodeState) -> T) -> T {
        self.doc
            .borrow()
            .nodes
            .get(node.0)
            .map(read)
            .unwrap_or_default()
    }
}

impl DragHost for HeadlessHost {
    type Element = HeadlessNode;

    fn element_by_id(&self, id: &str) -> Option<HeadlessNode> {
        self.doc
            .borrow()
            .nodes
            .iter()
            .position(|state| state.attached && state.id == id)
            .map(HeadlessNode)
    }

    fn element_id(&self, element: &HeadlessNode) -> String {
        self.read_node(*element, |state| state.id.clone())
    }

    fn is_top_level_context(&self) -> bool {
        self.doc.borrow().top_level
    }

    fn detach(&self, element: &HeadlessNode) {
        self.with_node(*element, |state| state.attached = false);
    }

    fn has_init_marker(&self, element: &HeadlessNode) -> bool {
        self.read_node(*element, |state| state.init_marker)
    }

    fn set_init_marker(&self, element: &HeadlessNode) {
        self.with_node(*element, |state| state.init_marker = true);
    }

    fn positioning(&self, element: &HeadlessNode) -> Positioning {
        self.read_node(*element, |state| state.positioning)
    }

    fn set_positioning(&self, element: &HeadlessNode, positioning: Positioning) {
        self.with_node(*element, |state| state.positioning = positioning);
    }

    fn offset_position(&self, element: &HeadlessNode) -> Position {
        self.read_node(*element, |state| Position {
            x: parse_px(&state.left).unwrap_or(0.0),
            y: parse_px(&state.top).unwrap_or(0.0),
        })
    }

    fn offset_size(&self, element: &HeadlessNode) -> Size {
        self.read_node(*element, |state| state.size)
    }

    fn bounding_size(&self, element: &HeadlessNode) -> Size {
        self.read_node(*element, |state| state.bounding.unwrap_or(state.size))
    }

    fn viewport_size(&self) -> Size {
        self.doc.borrow().viewport
    }

    fn document_scroll_size(&self) -> Size {
        let doc = self.doc.borrow();
        doc.document.unwrap_or(doc.viewport)
    }

    fn style_left(&self, element: &HeadlessNode) -> String {
        self.read_node(*element, |state| state.left.clone())
    }

    fn style_top(&self, element: &HeadlessNode) -> String {
        self.read_node(*element, |state| state.top.clone())
    }

    fn set_style_left(&self, element: &HeadlessNode, value: &str) {
        self.with_node(*element, |state| state.left = value.to_owned());
    }

    fn set_style_top(&self, element: &HeadlessNode, value: &str) {
        self.with_node(*element, |state| state.top = value.to_owned());
    }

    fn style_display(&self, element: &HeadlessNode) -> String {
        self.read_node(*element, |state| state.display.clone())
    }

    fn set_style_display(&self, element: &HeadlessNode, value: &str) {
        self.with_node(*element, |state| state.display = value.to_owned());
    }

    fn set_frames_pointer_events(&self, enabled: bool) {
        self.doc.borrow_mut().frames_pointer_events = enabled;
    }

    fn set_pointer_capture(&self, element: &HeadlessNode, pointer_id: Option<i32>) -> bool {
        let mut doc = self.doc.borrow_mut();
        if !doc.capture_supported {
            return false;
        }
        doc.capture = Some((*element, pointer_id));
        true
    }

    fn release_pointer_capture(&self, element: &HeadlessNode, _pointer_id: Option<i32>) {
        let mut doc = self.doc.borrow_mut();
        if doc.capture.is_some_and(|(node, _)| node == *element) {
            doc.capture = None;
        }
    }

    fn subscribe(
        &self,
        element: &HeadlessNode,
        subscription: Subscription,
    ) -> Result<SubscriptionId, HostError> {
        let mut doc = self.doc.borrow_mut();
        if doc.refuse_subscription == Some(subscription) {
            return Err(HostError::Unsupported("subscription refused by headless host"));
        }
        let id = SubscriptionId(doc.next_subscription);
        doc.next_subscription = doc.next_subscription.saturating_add(1);
        doc.subscriptions.insert(
            id,
            ActiveSubscription {
                node: *element,
                kind: subscription,
            },
        );
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), HostError> {
        let mut doc = self.doc.borrow_mut();
        if doc.refuse_unsubscribe {
            return Err(HostError::Js("listener removal failed".to_owned()));
        }
        doc.subscriptions
            .remove(&id)
            .map(|_| ())
            .ok_or(HostError::UnknownSubscription(id.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_document() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        let node = host.add_element("box", Size::new(10.0, 10.0));
        let other = host.clone();
        other.set_style_left(&node, "42px");
        assert_eq!(host.position(node), Position::new(42.0, 0.0));
    }

    #[test]
    fn detached_elements_are_not_found() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        let node = host.add_element("box", Size::new(10.0, 10.0));
        assert_eq!(host.element_by_id("box"), Some(node));
        host.detach(&node);
        assert_eq!(host.element_by_id("box"), None);
        assert!(!host.is_attached(node));
    }

    #[test]
    fn unsubscribe_unknown_id_is_an_error() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        let node = host.add_element("box", Size::new(10.0, 10.0));
        let id = host.subscribe(&node, Subscription::ViewportResize).unwrap();
        assert!(host.unsubscribe(id).is_ok());
        assert_eq!(
            host.unsubscribe(id),
            Err(HostError::UnknownSubscription(id.0))
        );
    }

    #[test]
    fn document_extent_defaults_to_viewport() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        assert_eq!(host.document_scroll_size(), Size::new(800.0, 600.0));
        host.set_document_size(Size::new(800.0, 2400.0));
        assert_eq!(host.document_scroll_size(), Size::new(800.0, 2400.0));
    }
}
