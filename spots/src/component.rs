use std::collections::VecDeque;
use std::rc::Rc;

use crate::composite::{COMPOSITE_KIND, CompositeComponent};
use crate::mutation::{Operation, OperationPhase};
use crate::{
    ComponentId, ComponentKind, ComponentModel, Configuration, Item, Layout, Size, Surface,
    UserInterface,
};

/// Receives the component's model after every completed mutation.
pub type CacheHook = Box<dyn FnMut(&ComponentModel)>;

/// Fills in the parts of a model a live component relies on: a layout and item indexes.
pub(crate) fn normalized(mut model: ComponentModel) -> ComponentModel {
    if model.layout.is_none() {
        model.layout = Some(Layout::default_for(&model.kind));
    }
    model.refresh_indexes();
    model
}

/// A live component: one [`ComponentModel`], its rendering [`Surface`] and the composite
/// components nested inside its items.
///
/// Structural mutations are queued and applied one at a time so the surface's index space never
/// diverges from `model.items` (see the `mutation` methods).
pub struct Component {
    id: ComponentId,
    pub(crate) model: ComponentModel,
    pub(crate) surface: Option<Surface>,
    pub(crate) config: Rc<Configuration>,
    materialize: bool,
    pub(crate) composites: Vec<CompositeComponent>,
    parent: Option<ComponentId>,
    size: Size,
    computed_height: f64,
    detached: bool,
    cache_hook: Option<CacheHook>,

    pub(crate) queue: VecDeque<Operation>,
    pub(crate) current: Option<Operation>,
    pub(crate) phase: OperationPhase,
    pub(crate) awaiting_surface: bool,
    pub(crate) draining: bool,
}

impl Component {
    /// Creates a component, materializing its surface through the configured surface factory.
    pub fn new(model: ComponentModel, config: Rc<Configuration>) -> Self {
        let mut component = Self::bare(model, config);
        component.materialize = true;
        component.surface = component.config.make_surface(&component.model);
        sdebug!(
            kind = %component.model.kind,
            items = component.model.items.len(),
            has_surface = component.surface.is_some(),
            "Component::new"
        );
        component
    }

    /// A component that never materializes surfaces, for itself or its composites.
    fn bare(model: ComponentModel, config: Rc<Configuration>) -> Self {
        Self {
            id: ComponentId::next(),
            model: normalized(model),
            surface: None,
            config,
            materialize: false,
            composites: Vec::new(),
            parent: None,
            size: Size::ZERO,
            computed_height: 0.0,
            detached: false,
            cache_hook: None,
            queue: VecDeque::new(),
            current: None,
            phase: OperationPhase::Idle,
            awaiting_surface: false,
            draining: false,
        }
    }

    /// Creates a component rendering into `ui`.
    pub fn with_surface(
        model: ComponentModel,
        config: Rc<Configuration>,
        ui: Box<dyn UserInterface>,
    ) -> Self {
        let mut component = Self::bare(model, config);
        component.materialize = true;
        component.surface = Some(Surface::for_kind(&component.model.kind, ui));
        component
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn model(&self) -> &ComponentModel {
        &self.model
    }

    pub fn items(&self) -> &[Item] {
        &self.model.items
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.model.items.get(index)
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.model.kind
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut Surface> {
        self.surface.as_mut()
    }

    pub fn config(&self) -> &Rc<Configuration> {
        &self.config
    }

    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    pub fn composites(&self) -> &[CompositeComponent] {
        &self.composites
    }

    pub fn composites_mut(&mut self) -> &mut [CompositeComponent] {
        &mut self.composites
    }

    /// Composite components attached to the item at `item_index`, in child order.
    pub fn composites_for(&self, item_index: usize) -> impl Iterator<Item = &CompositeComponent> {
        self.composites
            .iter()
            .filter(move |c| c.item_index == item_index)
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Height of the component's content after the last layout pass.
    pub fn computed_height(&self) -> f64 {
        self.computed_height
    }

    /// Whether the component's surface was removed from the view hierarchy.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn set_cache_hook(&mut self, hook: impl FnMut(&ComponentModel) + 'static) {
        self.cache_hook = Some(Box::new(hook));
    }

    /// Sizes the component to `size`, prepares every item and reloads the surface.
    pub fn setup(&mut self, size: Size) {
        self.size = size;
        self.prepare_items();
        if let Some(surface) = self.surface.as_mut() {
            surface.ui_mut().reload_data();
        }
        self.update_height();
        sdebug!(
            width = size.width,
            height = self.computed_height,
            items = self.model.items.len(),
            "Component::setup"
        );
    }

    /// Removes the surface (and every nested surface) from the view hierarchy.
    pub(crate) fn detach(&mut self) {
        self.surface = None;
        self.composites.clear();
        self.detached = true;
    }

    pub(crate) fn set_parent(&mut self, parent: ComponentId) {
        self.parent = Some(parent);
    }

    pub(crate) fn prepare_items(&mut self) {
        self.composites.clear();
        let layout = self.model.layout_or_default();
        for index in 0..self.model.items.len() {
            self.prepare_item_with(index, &layout);
        }
        self.equalize_carousel_heights();
        self.config.registry.purge();
    }

    pub(crate) fn prepare_item(&mut self, index: usize) {
        let layout = self.model.layout_or_default();
        self.prepare_item_with(index, &layout);
    }

    /// Assigns width from the layout, measures height through the registry and (for composite
    /// items) rebuilds the nested components.
    fn prepare_item_with(&mut self, index: usize, layout: &Layout) {
        let container_width = self.size.width;
        let Some(item) = self.model.items.get_mut(index) else {
            return;
        };
        item.index = index;
        if let Some(width) = layout.span_width(container_width) {
            item.size.width = width;
        } else if item.size.width <= 0.0 {
            item.size.width = (container_width - layout.inset.horizontal()).max(0.0);
        }

        if item.kind == COMPOSITE_KIND {
            self.prepare_composite(index);
            return;
        }
        self.composites.retain(|c| c.item_index != index);

        let config = &self.config;
        let item = &mut self.model.items[index];
        let kind = item.kind.clone();
        let measured = config.registry.with_cached_view(&kind, |view| {
            view.configure(item);
            if item.size.height <= 0.0 {
                item.size.height = view.compute_size(item).height;
            }
        });
        if measured.is_none() {
            strace!(kind = %kind, "Component: no view registered for kind");
        }
        if item.size.height <= 0.0 {
            item.size.height = config.default_view_size.height;
        }
    }

    fn prepare_composite(&mut self, index: usize) {
        self.composites.retain(|c| c.item_index != index);
        let (children, width) = {
            let item = &self.model.items[index];
            (item.child_models(), item.size.width)
        };
        let mut height = 0.0;
        for model in children {
            let child = self.make_child(model, width);
            height += child.computed_height();
            self.composites.push(CompositeComponent::new(index, child));
        }
        self.composites.sort_by_key(|c| c.item_index);
        self.model.items[index].size.height = height;
    }

    pub(crate) fn make_child(&self, model: ComponentModel, width: f64) -> Component {
        let mut child = if self.materialize {
            Component::new(model, self.config.clone())
        } else {
            Component::bare(model, self.config.clone())
        };
        child.set_parent(self.id);
        child.setup(Size::new(width, 0.0));
        child
    }

    /// Returns `model` with its items measured the way this component would measure them.
    ///
    /// Nothing is materialized; this component is left untouched.
    pub fn measured(&self, model: ComponentModel) -> ComponentModel {
        let mut temp = Component::bare(model, self.config.clone());
        temp.size = self.size;
        temp.prepare_items();
        temp.model
    }

    pub(crate) fn equalize_carousel_heights(&mut self) {
        if self.model.kind != ComponentKind::Carousel {
            return;
        }
        let tallest = self
            .model
            .items
            .iter()
            .map(|item| item.size.height)
            .fold(0.0, f64::max);
        for item in &mut self.model.items {
            item.size.height = tallest;
        }
    }

    /// Recomputes composite item heights from their nested components.
    pub(crate) fn refresh_composite_heights(&mut self) {
        for item in &mut self.model.items {
            if item.kind != COMPOSITE_KIND {
                continue;
            }
            let index = item.index;
            item.size.height = self
                .composites
                .iter()
                .filter(|c| c.item_index == index)
                .map(|c| c.component.computed_height())
                .sum();
        }
    }

    pub(crate) fn update_height(&mut self) {
        let layout = self.model.layout_or_default();
        self.computed_height = if layout.dynamic_height {
            self.content_height(&layout)
        } else {
            self.size.height
        };
        strace!(height = self.computed_height, "Component::update_height");
    }

    /// Flow-layout content height for the component's kind.
    fn content_height(&self, layout: &Layout) -> f64 {
        let items = &self.model.items;
        let header = self.model.header.as_ref().map_or(0.0, |h| h.size.height);
        let footer = self.model.footer.as_ref().map_or(0.0, |f| f.size.height);
        if items.is_empty() {
            return header + footer;
        }

        let rows: Vec<f64> = match &self.model.kind {
            ComponentKind::Carousel | ComponentKind::Row => {
                let tallest = items.iter().map(|i| i.size.height).fold(0.0, f64::max);
                let per_row = layout.items_per_row.max(1).min(items.len());
                vec![tallest; per_row]
            }
            ComponentKind::Grid if layout.span > 0.0 => {
                let span = layout.span.ceil().max(1.0) as usize;
                items
                    .chunks(span)
                    .map(|row| row.iter().map(|i| i.size.height).fold(0.0, f64::max))
                    .collect()
            }
            ComponentKind::Grid => {
                let available = (self.size.width - layout.inset.horizontal()).max(0.0);
                let mut rows = Vec::new();
                let mut x = 0.0;
                let mut row_height: f64 = 0.0;
                for item in items {
                    if x > 0.0 && x + item.size.width > available {
                        rows.push(row_height);
                        x = 0.0;
                        row_height = 0.0;
                    }
                    x += item.size.width + layout.item_spacing;
                    row_height = row_height.max(item.size.height);
                }
                rows.push(row_height);
                rows
            }
            ComponentKind::List | ComponentKind::Custom(_) => {
                items.iter().map(|i| i.size.height).collect()
            }
        };

        let spacing = layout.line_spacing * rows.len().saturating_sub(1) as f64;
        rows.iter().sum::<f64>() + spacing + layout.inset.vertical() + header + footer
    }

    pub(crate) fn write_cache(&mut self) {
        if let Some(hook) = self.cache_hook.as_mut() {
            hook(&self.model);
        }
    }
}

impl core::fmt::Debug for Component {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("kind", &self.model.kind)
            .field("identifier", &self.model.identifier)
            .field("items", &self.model.items.len())
            .field("surface", &self.surface)
            .field("composites", &self.composites.len())
            .field("parent", &self.parent)
            .field("computed_height", &self.computed_height)
            .field("phase", &self.phase)
            .field("queued", &self.queue.len())
            .finish()
    }
}
