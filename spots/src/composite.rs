use crate::Component;

/// Item kind marking an item whose `children` render as nested components.
pub const COMPOSITE_KIND: &str = "composite";

/// A nested component attached to one item of its parent.
///
/// The wrapper exclusively owns the nested component. The nested component only records its
/// parent's [`crate::ComponentId`]; it never reaches back into the parent.
#[derive(Debug)]
pub struct CompositeComponent {
    pub item_index: usize,
    pub(crate) component: Component,
}

impl CompositeComponent {
    pub(crate) fn new(item_index: usize, component: Component) -> Self {
        Self {
            item_index,
            component,
        }
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn component_mut(&mut self) -> &mut Component {
        &mut self.component
    }
}
