use std::cell::Cell;
use std::rc::Rc;

use crate::payload::{DEFAULT_PAYLOAD_KEY, models_from_json};
use crate::{
    Component, ComponentDelegate, ComponentFrame, ComponentModel, Configuration, Result,
    ScrollEdge, ScrollView, Size,
};

/// Owns the components of one screen, their shared configuration and the stacked viewport.
///
/// Reconciliation against new models lives in the `manager` methods
/// ([`Controller::reload_if_needed`] and friends).
pub struct Controller {
    pub(crate) components: Vec<Component>,
    pub(crate) config: Rc<Configuration>,
    pub(crate) scroll: ScrollView,
    pub(crate) delegate: Option<Rc<dyn ComponentDelegate>>,
    edge_busy: Rc<Cell<bool>>,
}

impl Controller {
    pub fn new(models: Vec<ComponentModel>, config: Rc<Configuration>, bounds: Size) -> Self {
        let scroll =
            ScrollView::new(bounds).with_stretch_last_component(config.stretch_last_component);
        let mut controller = Self {
            components: Vec::new(),
            config,
            scroll,
            delegate: None,
            edge_busy: Rc::new(Cell::new(false)),
        };
        controller.components = models
            .into_iter()
            .filter(|model| !controller.should_drop(model))
            .enumerate()
            .map(|(index, model)| controller.make_component(model, index))
            .collect();
        sdebug!(
            components = controller.components.len(),
            width = bounds.width,
            height = bounds.height,
            "Controller::new"
        );
        controller.layout_views();
        controller
    }

    /// Builds a controller from a `{"components": [...]}` payload.
    pub fn from_json(json: &str, config: Rc<Configuration>, bounds: Size) -> Result<Self> {
        let models = models_from_json(json, DEFAULT_PAYLOAD_KEY, &config.default_component_kind)?;
        Ok(Self::new(models, config, bounds))
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn component_mut(&mut self, index: usize) -> Option<&mut Component> {
        self.components.get_mut(index)
    }

    /// Finds a component by its model identifier.
    pub fn component_with_identifier(&self, identifier: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.model().identifier.as_deref() == Some(identifier))
    }

    pub fn models(&self) -> Vec<ComponentModel> {
        self.components.iter().map(|c| c.model().clone()).collect()
    }

    pub fn config(&self) -> &Rc<Configuration> {
        &self.config
    }

    pub fn scroll_view(&self) -> &ScrollView {
        &self.scroll
    }

    pub fn set_delegate(&mut self, delegate: Option<Rc<dyn ComponentDelegate>>) {
        self.delegate = delegate;
    }

    /// Resizes the viewport and lays every component out again at the new width.
    pub fn set_bounds(&mut self, bounds: Size) {
        let width_changed = bounds.width != self.scroll.bounds().width;
        self.scroll.set_bounds(bounds);
        if width_changed {
            for component in &mut self.components {
                component.setup(Size::new(bounds.width, bounds.height));
            }
        }
        self.layout_views();
    }

    /// Syncs component heights into the viewport and applies the resulting frames.
    pub fn layout_views(&mut self) -> Vec<ComponentFrame> {
        let heights: Vec<f64> = self
            .components
            .iter()
            .map(|c| c.computed_height())
            .collect();
        self.scroll.set_component_heights(&heights);
        let frames = self.scroll.layout_views();
        for (component, frame) in self.components.iter_mut().zip(&frames) {
            if let Some(surface) = component.surface_mut() {
                surface.ui_mut().apply_frame(*frame);
            }
        }
        frames
    }

    /// Moves the viewport and reports edge arrivals to the delegate.
    pub fn scroll_to(&mut self, offset: f64) -> Vec<ComponentFrame> {
        let edge = self.scroll.set_content_offset(offset);
        if let (Some(edge), Some(delegate)) = (edge, self.delegate.clone()) {
            if !self.edge_busy.replace(true) {
                sdebug!(edge = ?edge, offset, "Controller: reached edge");
                let busy = self.edge_busy.clone();
                let completion = Box::new(move || busy.set(false));
                match edge {
                    ScrollEdge::Beginning => delegate.did_reach_beginning(completion),
                    ScrollEdge::End => delegate.did_reach_end(completion),
                }
            }
        }
        self.layout_views()
    }

    /// Reports a selection to the delegate.
    pub fn select_item(&self, component_index: usize, item_index: usize) {
        let Some(component) = self.components.get(component_index) else {
            swarn!(component_index, "Controller::select_item: no such component");
            return;
        };
        let Some(item) = component.item(item_index) else {
            swarn!(component_index, item_index, "Controller::select_item: no such item");
            return;
        };
        if let Some(delegate) = &self.delegate {
            delegate.item_selected(component.model(), item);
        }
    }

    /// Forwards a finished asynchronous surface pass to the component and relays out.
    pub fn surface_did_finish(&mut self, component_index: usize) {
        if let Some(component) = self.components.get_mut(component_index) {
            component.surface_did_finish();
        }
        self.layout_views();
    }

    pub(crate) fn make_component(&self, mut model: ComponentModel, index: usize) -> Component {
        model.index = index;
        let mut component = Component::new(model, self.config.clone());
        component.setup(self.scroll.bounds());
        component
    }
}

impl core::fmt::Debug for Controller {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("components", &self.components)
            .field("scroll", &self.scroll)
            .field("has_delegate", &self.delegate.is_some())
            .finish()
    }
}
