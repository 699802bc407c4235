use crate::{Completion, ComponentModel, Item};

/// Callbacks fired by a [`crate::Controller`]. Every method defaults to a no-op.
///
/// Methods take `&self`; delegates that need to record state use interior mutability.
pub trait ComponentDelegate {
    fn item_selected(&self, _component: &ComponentModel, _item: &Item) {}

    /// Fired after a reconciliation has been fully applied.
    fn components_did_change(&self, _components: &[ComponentModel]) {}

    /// Fired when the viewport arrives at the top. Call `completion` once any resulting work is
    /// done; the edge is not reported again until then.
    fn did_reach_beginning(&self, completion: Completion) {
        completion();
    }

    /// Fired when the viewport arrives at the bottom. Call `completion` once any resulting work
    /// is done; the edge is not reported again until then.
    fn did_reach_end(&self, completion: Completion) {
        completion();
    }
}
