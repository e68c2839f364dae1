#![forbid(unsafe_code)]

//! The draggable-element controller.
//!
//! A [`Draggable`] is built by [`crate::create_draggable`] and then driven by
//! its host: the host calls [`Draggable::handle_pointer_down`],
//! [`Draggable::handle_pointer_move`], [`Draggable::handle_pointer_up`],
//! [`Draggable::handle_resize`], and [`Draggable::handle_style_mutation`] for
//! the subscriptions the controller registered.
//!
//! Subscriptions fall in three groups, all released by [`Draggable::destroy`]:
//! - controller lifetime: element pointer-down, viewport resize, and (in
//!   container mode) drag-area resize;
//! - session lifetime: document pointer-move/up, owned by [`DragSession`];
//! - the [`VisibilityGuard`] style watch.

use std::fmt;

use crate::bounds::{bounding_frame, measure_bounds, recompute_bounds};
use crate::config::{Configuration, DragCallbacks, DragMode};
use crate::error::{HostError, StoreError};
use crate::geometry::{Bounds, Position, format_px};
use crate::host::{DragHost, PointerInput, Subscription, SubscriptionId};
use crate::machine::{
    DragIgnoredReason, DragOutcome, DragPhase, DragSession, MoveConstraints, compute_drag_position,
};
use crate::snap::{Edge, resolve_edge_snap};
use crate::store::{KeyValueStore, PositionStore, StoredPosition};
use crate::visibility::{REVEALED_DISPLAY, VisibilityGuard};

/// Drag controller for one element.
pub struct Draggable<H: DragHost, S: KeyValueStore> {
    host: H,
    store: PositionStore<S>,
    element: H::Element,
    element_id: String,
    config: Configuration<H::Element>,
    callbacks: DragCallbacks<H::Element>,
    bounds: Bounds,
    session: Option<DragSession>,
    listeners: Vec<SubscriptionId>,
    visibility: VisibilityGuard,
    destroyed: bool,
}

impl<H: DragHost, S: KeyValueStore> fmt::Debug for Draggable<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draggable")
            .field("element_id", &self.element_id)
            .field("mode", &self.config.mode)
            .field("bounds", &self.bounds)
            .field("phase", &self.phase())
            .field("listeners", &self.listeners.len())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<H: DragHost, S: KeyValueStore> Draggable<H, S> {
    pub(crate) fn new(
        host: H,
        store: S,
        element: H::Element,
        config: Configuration<H::Element>,
        callbacks: DragCallbacks<H::Element>,
    ) -> Self {
        let element_id = host.element_id(&element);
        let bounds = measure_bounds(&host, &element, &config);
        let store = PositionStore::new(store, config.storage_key.clone());
        Self {
            host,
            store,
            element,
            element_id,
            config,
            callbacks,
            bounds,
            session: None,
            listeners: Vec::new(),
            visibility: VisibilityGuard::default(),
            destroyed: false,
        }
    }

    /// Register controller-lifetime subscriptions and start the visibility
    /// guard, then mark and reveal the element, restore the start position,
    /// and compute bounds.
    ///
    /// On failure every subscription made so far is released and the element
    /// is left as it was.
    pub(crate) fn init(&mut self) -> Result<(), HostError> {
        if let Err(err) = self.register_listeners() {
            self.destroy();
            return Err(err);
        }
        match VisibilityGuard::watch(&self.host, &self.element) {
            Ok(guard) => self.visibility = guard,
            Err(err) => {
                self.destroy();
                return Err(err);
            }
        }
        self.host.set_init_marker(&self.element);
        self.host.set_style_display(&self.element, REVEALED_DISPLAY);
        self.restore_position();
        self.update_bounds();
        tracing::debug!(
            element_id = %self.element_id,
            mode = %self.config.mode,
            max_x = self.bounds.max_x,
            max_y = self.bounds.max_y,
            "draggable initialized"
        );
        Ok(())
    }

    fn register_listeners(&mut self) -> Result<(), HostError> {
        let element = self.element.clone();
        self.listen(&element, Subscription::ElementPointerDown)?;
        self.listen(&element, Subscription::ViewportResize)?;
        if self.config.mode == DragMode::Container
            && let Some(area) = self.config.drag_area.clone()
        {
            self.listen(&area, Subscription::ContainerResize)?;
        }
        Ok(())
    }

    fn listen(&mut self, target: &H::Element, kind: Subscription) -> Result<(), HostError> {
        let id = self.host.subscribe(target, kind)?;
        self.listeners.push(id);
        Ok(())
    }

    /// The controlled element.
    #[must_use]
    pub fn element(&self) -> &H::Element {
        &self.element
    }

    #[must_use]
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    #[must_use]
    pub fn config(&self) -> &Configuration<H::Element> {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn store(&self) -> &PositionStore<S> {
        &self.store
    }

    /// Most recently computed bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.bounds.min_x
    }

    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.bounds.min_y
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.bounds.max_x
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.bounds.max_y
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        if self.session.is_some() {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }

    /// Active drag session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Current offset position of the element.
    #[must_use]
    pub fn position(&self) -> Position {
        self.host.offset_position(&self.element)
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Re-apply positioning and recompute bounds for the current mode.
    pub fn update_bounds(&mut self) {
        self.bounds = recompute_bounds(&self.host, &self.element, &self.config);
    }

    /// Persist the element's current `left`/`top` styles when persistence is
    /// enabled; a no-op otherwise.
    pub fn save_position(&self) -> Result<(), StoreError> {
        if !self.config.should_save {
            return Ok(());
        }
        let position = StoredPosition::new(
            self.host.style_left(&self.element),
            self.host.style_top(&self.element),
        );
        self.store.save(&self.element_id, position)
    }

    /// Apply the restored (or initial) position to the element.
    pub fn restore_position(&mut self) {
        let restored = self.store.restore(
            &self.element_id,
            self.config.should_save,
            &self.config.initial_position,
        );
        self.host.set_style_left(&self.element, &restored.x);
        self.host.set_style_top(&self.element, &restored.y);
    }

    /// Pointer pressed on the element: enter `Dragging`.
    pub fn handle_pointer_down(&mut self, input: PointerInput) -> DragOutcome {
        if self.destroyed {
            return DragOutcome::Ignored(DragIgnoredReason::Destroyed);
        }
        if self.session.is_some() {
            return DragOutcome::Ignored(DragIgnoredReason::AlreadyDragging);
        }

        let current = self.host.offset_position(&self.element);
        let pointer_offset = Position::new(input.client_x - current.x, input.client_y - current.y);
        let mut session = DragSession::new(pointer_offset, input.pointer_id);

        self.host.set_frames_pointer_events(false);
        session.pointer_captured = self
            .host
            .set_pointer_capture(&self.element, input.pointer_id);
        if let Err(err) = self.open_session(&mut session) {
            tracing::error!(
                element_id = %self.element_id,
                error = %err,
                "failed to register drag session listeners"
            );
            self.host.set_frames_pointer_events(true);
            if let Err(err) = self.release_session(&mut session) {
                tracing::warn!(element_id = %self.element_id, error = %err, "drag session rollback failed");
            }
            return DragOutcome::Ignored(DragIgnoredReason::SubscriptionFailed);
        }

        let pointer_captured = session.pointer_captured;
        self.session = Some(session);
        tracing::debug!(
            element_id = %self.element_id,
            offset_x = pointer_offset.x,
            offset_y = pointer_offset.y,
            pointer_captured,
            "drag start"
        );
        self.callbacks.drag_start(&self.element);
        DragOutcome::Started {
            pointer_offset,
            pointer_captured,
        }
    }

    fn open_session(&self, session: &mut DragSession) -> Result<(), HostError> {
        session.move_subscription = Some(
            self.host
                .subscribe(&self.element, Subscription::DocumentPointerMove)?,
        );
        session.up_subscription = Some(
            self.host
                .subscribe(&self.element, Subscription::DocumentPointerUp)?,
        );
        Ok(())
    }

    /// Unregister session listeners and release pointer capture.
    ///
    /// Every resource is released even if an earlier one fails; the first
    /// failure is returned.
    fn release_session(&self, session: &mut DragSession) -> Result<(), HostError> {
        let mut result = Ok(());
        for id in session.take_subscriptions() {
            if let Err(err) = self.host.unsubscribe(id)
                && result.is_ok()
            {
                result = Err(err);
            }
        }
        if session.pointer_captured {
            self.host
                .release_pointer_capture(&self.element, session.pointer_id);
            session.pointer_captured = false;
        }
        result
    }

    /// Pointer moved while dragging: clamp, grid-snap, and commit.
    pub fn handle_pointer_move(&mut self, input: PointerInput) -> DragOutcome {
        if self.destroyed {
            return DragOutcome::Ignored(DragIgnoredReason::Destroyed);
        }
        let Some(pointer_offset) = self.session.as_ref().map(|s| s.pointer_offset) else {
            return DragOutcome::Ignored(DragIgnoredReason::NotDragging);
        };

        // The drag area may resize or scroll on its own, so container mode
        // re-resolves fully; other modes only re-measure the live frame.
        self.bounds = match self.config.mode {
            DragMode::Container => recompute_bounds(&self.host, &self.element, &self.config),
            DragMode::Screen | DragMode::Page => {
                measure_bounds(&self.host, &self.element, &self.config)
            }
        };

        let constraints = MoveConstraints {
            bounds: self.bounds,
            edge_buffer: self.config.edge_buffer,
            grid_size: self.config.grid_size,
            lock_axis: self.config.lock_axis,
        };
        let current = self.host.offset_position(&self.element);
        let position = compute_drag_position(input.position(), pointer_offset, current, &constraints);
        self.host.set_style_left(&self.element, &format_px(position.x));
        self.host.set_style_top(&self.element, &format_px(position.y));
        tracing::trace!(element_id = %self.element_id, x = position.x, y = position.y, "drag move");
        self.callbacks.drag(&self.element);
        DragOutcome::Moved { position }
    }

    /// Pointer released anywhere: snap, persist, and return to `Idle`.
    pub fn handle_pointer_up(&mut self, _input: PointerInput) -> DragOutcome {
        if self.destroyed {
            return DragOutcome::Ignored(DragIgnoredReason::Destroyed);
        }
        let Some(mut session) = self.session.take() else {
            return DragOutcome::Ignored(DragIgnoredReason::NotDragging);
        };

        let snapped_to = self.snap_to_edge();
        self.host.set_frames_pointer_events(true);
        if let Err(err) = self.save_position() {
            tracing::warn!(element_id = %self.element_id, error = %err, "failed to persist position");
        }
        if let Err(err) = self.release_session(&mut session) {
            tracing::warn!(element_id = %self.element_id, error = %err, "failed to release drag session");
        }

        let position = self.host.offset_position(&self.element);
        tracing::debug!(
            element_id = %self.element_id,
            x = position.x,
            y = position.y,
            snapped_to = ?snapped_to,
            "drag end"
        );
        self.callbacks.drag_end(&self.element);
        DragOutcome::Ended {
            position,
            snapped_to,
        }
    }

    fn snap_to_edge(&self) -> Option<Edge> {
        let frame = bounding_frame(&self.host, &self.config);
        let target = resolve_edge_snap(
            self.config.snap_mode,
            frame,
            self.host.offset_position(&self.element),
            self.host.bounding_size(&self.element),
            self.config.edge_buffer,
        );
        if let Some(left) = target.left {
            self.host.set_style_left(&self.element, &format_px(left));
        }
        if let Some(top) = target.top {
            self.host.set_style_top(&self.element, &format_px(top));
        }
        target.edge
    }

    /// Viewport or drag area resized.
    pub fn handle_resize(&mut self) {
        if !self.destroyed {
            self.update_bounds();
        }
    }

    /// The element's style attribute was written. Returns true when the
    /// element had been hidden and was revealed again.
    pub fn handle_style_mutation(&self) -> bool {
        let revealed = self.visibility.on_style_mutation(&self.host, &self.element);
        if revealed {
            tracing::debug!(element_id = %self.element_id, "restored hidden draggable element");
        }
        revealed
    }

    /// Release every subscription, whether or not a drag is active.
    ///
    /// Failures are logged and teardown continues. Calling it again is a
    /// no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        if let Some(mut session) = self.session.take() {
            self.host.set_frames_pointer_events(true);
            if let Err(err) = self.release_session(&mut session) {
                tracing::warn!(element_id = %self.element_id, error = %err, "error in destroy");
            }
        }
        for id in std::mem::take(&mut self.listeners) {
            if let Err(err) = self.host.unsubscribe(id) {
                tracing::warn!(element_id = %self.element_id, error = %err, "error in destroy");
            }
        }
        if let Err(err) = self.visibility.stop(&self.host) {
            tracing::warn!(element_id = %self.element_id, error = %err, "error in destroy");
        }
        tracing::debug!(element_id = %self.element_id, "draggable destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DraggableOptions;
    use crate::geometry::Size;
    use crate::headless::{HeadlessHost, HeadlessNode};
    use crate::store::MemoryStore;

    type Controller = Draggable<HeadlessHost, MemoryStore>;

    fn controller(options: &DraggableOptions) -> (HeadlessHost, HeadlessNode, Controller) {
        let host = HeadlessHost::new(Size::new(1000.0, 800.0));
        let node = host.add_element("panel", Size::new(200.0, 100.0));
        let config = Configuration::merge(options, DragMode::Screen, None);
        let draggable = Draggable::new(
            host.clone(),
            MemoryStore::new(),
            node,
            config,
            DragCallbacks::new(),
        );
        (host, node, draggable)
    }

    #[test]
    fn refused_listener_leaves_element_unmarked() {
        let (host, node, mut draggable) = controller(&DraggableOptions::default());
        host.refuse_subscription(Some(Subscription::ViewportResize));
        assert!(matches!(draggable.init(), Err(HostError::Unsupported(_))));
        assert!(draggable.is_destroyed());
        assert!(host.active_subscriptions().is_empty());
        assert!(!host.has_init_marker(&node));
        assert_eq!(host.style_display(&node), "");
        assert_eq!(host.style_left(&node), "");
    }

    #[test]
    fn init_marks_reveals_and_measures() {
        let options = DraggableOptions::default().with_initial_position("5px", "6px");
        let (host, node, mut draggable) = controller(&options);
        assert!(draggable.init().is_ok());
        assert!(host.has_init_marker(&node));
        assert_eq!(host.style_display(&node), REVEALED_DISPLAY);
        assert_eq!(draggable.position(), Position::new(5.0, 6.0));
        assert_eq!((draggable.max_x(), draggable.max_y()), (800.0, 700.0));
        assert_eq!(host.active_subscriptions().len(), 3);
    }

    #[test]
    fn destroy_is_idempotent_and_silences_handlers() {
        let (host, node, mut draggable) = controller(&DraggableOptions::default());
        assert!(draggable.init().is_ok());
        draggable.destroy();
        draggable.destroy();
        assert!(host.active_subscriptions().is_empty());

        host.hide_externally(node);
        assert!(!draggable.handle_style_mutation());
        host.set_viewport_size(Size::new(400.0, 400.0));
        draggable.handle_resize();
        assert_eq!(draggable.max_x(), 800.0);
    }

    #[test]
    fn save_without_persistence_writes_nothing() {
        let (_, _, mut draggable) = controller(&DraggableOptions::default());
        assert!(draggable.init().is_ok());
        assert!(draggable.save_position().is_ok());
        assert!(draggable.store().backend().is_empty());
    }
}
