use core::fmt;

use spots::Controller;

/// How an anchored component is found again after reconciliation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnchorKey {
    /// The component's model identifier.
    Identifier(String),
    /// Position, for components without an identifier.
    Index(usize),
}

/// A scroll anchor that can be used to preserve visual position across reconciliation.
///
/// Typical use cases:
/// - components inserted above the viewport (e.g. a banner arriving with a new payload)
/// - components above the viewport growing or shrinking after an items-only update
#[derive(Clone, PartialEq)]
pub struct ScrollAnchor {
    pub key: AnchorKey,
    /// The distance from the anchor component's top edge to the viewport's content offset.
    pub offset_in_viewport: f64,
}

impl fmt::Debug for ScrollAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollAnchor")
            .field("key", &self.key)
            .field("offset_in_viewport", &self.offset_in_viewport)
            .finish()
    }
}

/// Captures an anchor for the first visible component.
///
/// Returns `None` if the controller has no components.
pub fn capture_first_visible_anchor(controller: &Controller) -> Option<ScrollAnchor> {
    let scroll = controller.scroll_view();
    let visible = scroll.visible_range();
    if visible.is_empty() {
        return None;
    }
    let index = visible.start;
    let start = scroll.component_start(index)?;
    let key = match controller.component(index)?.model().identifier.clone() {
        Some(identifier) => AnchorKey::Identifier(identifier),
        None => AnchorKey::Index(index),
    };
    Some(ScrollAnchor {
        key,
        offset_in_viewport: (scroll.content_offset() - start).max(0.0),
    })
}

/// Applies a previously captured anchor by moving the viewport.
///
/// Returns `true` when the anchored component still exists.
pub fn apply_anchor(controller: &mut Controller, anchor: &ScrollAnchor) -> bool {
    let index = match &anchor.key {
        AnchorKey::Identifier(identifier) => controller
            .components()
            .iter()
            .position(|c| c.model().identifier.as_deref() == Some(identifier.as_str())),
        AnchorKey::Index(index) => (*index < controller.components().len()).then_some(*index),
    };
    let Some(index) = index else {
        return false;
    };
    let Some(start) = controller.scroll_view().component_start(index) else {
        return false;
    };
    controller.scroll_to(start + anchor.offset_in_viewport);
    true
}
