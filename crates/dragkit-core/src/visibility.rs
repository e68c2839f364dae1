#![forbid(unsafe_code)]

//! Keeps a revealed element visible.
//!
//! Reactive frameworks may re-render and reset inline style on an element the
//! controller already revealed. The guard watches style writes and undoes
//! any that leave the element at `display: none`.

use crate::error::HostError;
use crate::host::{DragHost, Subscription, SubscriptionId};

/// `display` value the guard restores.
pub const REVEALED_DISPLAY: &str = "block";

const HIDDEN_DISPLAY: &str = "none";

/// Style-mutation watch on one element.
#[derive(Debug, Default)]
pub struct VisibilityGuard {
    subscription: Option<SubscriptionId>,
}

impl VisibilityGuard {
    /// Start watching `element`.
    pub fn watch<H: DragHost>(host: &H, element: &H::Element) -> Result<Self, HostError> {
        let subscription = host.subscribe(element, Subscription::StyleMutation)?;
        Ok(Self {
            subscription: Some(subscription),
        })
    }

    #[must_use]
    pub const fn is_watching(&self) -> bool {
        self.subscription.is_some()
    }

    /// React to a style write. Returns true when the element was revealed
    /// again.
    pub fn on_style_mutation<H: DragHost>(&self, host: &H, element: &H::Element) -> bool {
        if !self.is_watching() || host.style_display(element).trim() != HIDDEN_DISPLAY {
            return false;
        }
        host.set_style_display(element, REVEALED_DISPLAY);
        true
    }

    /// Stop watching. The watch counts as stopped even if the host fails to
    /// remove it.
    pub fn stop<H: DragHost>(&mut self, host: &H) -> Result<(), HostError> {
        match self.subscription.take() {
            Some(id) => host.unsubscribe(id),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::headless::HeadlessHost;

    #[test]
    fn hidden_element_is_revealed_while_watching() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        let node = host.add_element("box", Size::new(10.0, 10.0));
        let mut guard = VisibilityGuard::watch(&host, &node).unwrap();
        assert!(host.has_subscription(Subscription::StyleMutation));

        host.hide_externally(node);
        assert!(guard.on_style_mutation(&host, &node));
        assert_eq!(host.style_display(&node), REVEALED_DISPLAY);

        guard.stop(&host).unwrap();
        assert!(!host.has_subscription(Subscription::StyleMutation));
        host.hide_externally(node);
        assert!(!guard.on_style_mutation(&host, &node));
        assert_eq!(host.style_display(&node), "none");
    }

    #[test]
    fn other_style_writes_are_left_alone() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        let node = host.add_element("box", Size::new(10.0, 10.0));
        let guard = VisibilityGuard::watch(&host, &node).unwrap();
        host.set_style_display(&node, "flex");
        assert!(!guard.on_style_mutation(&host, &node));
        assert_eq!(host.style_display(&node), "flex");
    }
}
