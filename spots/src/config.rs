use std::rc::Rc;

use crate::{ComponentKind, ComponentModel, Registry, Size, Surface, UserInterface};

/// Creates the live surface for a newly constructed component.
pub type SurfaceFactory = Rc<dyn Fn(&ComponentModel) -> Box<dyn UserInterface>>;

/// Shared configuration handed to every component of a controller.
///
/// Build it once with the `with_*` methods and share it as `Rc<Configuration>`.
pub struct Configuration {
    pub registry: Registry,
    /// Kind used for payload entries that do not name one.
    pub default_component_kind: ComponentKind,
    /// Size used when neither an item nor its view reports a height.
    pub default_view_size: Size,
    /// Stretch the last component to fill the remaining viewport.
    pub stretch_last_component: bool,
    /// Drop components without items during reconciliation, unless their layout asks to be
    /// shown when empty.
    pub remove_empty_components: bool,
    pub surface_factory: Option<SurfaceFactory>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            registry: Registry::new(),
            default_component_kind: ComponentKind::Grid,
            default_view_size: Size::new(0.0, 44.0),
            stretch_last_component: false,
            remove_empty_components: false,
            surface_factory: None,
        }
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_default_component_kind(mut self, kind: ComponentKind) -> Self {
        self.default_component_kind = kind;
        self
    }

    pub fn with_default_view_size(mut self, size: Size) -> Self {
        self.default_view_size = size;
        self
    }

    pub fn with_stretch_last_component(mut self, stretch: bool) -> Self {
        self.stretch_last_component = stretch;
        self
    }

    pub fn with_remove_empty_components(mut self, remove: bool) -> Self {
        self.remove_empty_components = remove;
        self
    }

    pub fn with_surface_factory(
        mut self,
        factory: impl Fn(&ComponentModel) -> Box<dyn UserInterface> + 'static,
    ) -> Self {
        self.surface_factory = Some(Rc::new(factory));
        self
    }

    pub(crate) fn make_surface(&self, model: &ComponentModel) -> Option<Surface> {
        let factory = self.surface_factory.as_ref()?;
        Some(Surface::for_kind(&model.kind, factory(model)))
    }

    pub fn into_shared(self) -> Rc<Self> {
        Rc::new(self)
    }
}

impl core::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Configuration")
            .field("registry", &self.registry)
            .field("default_component_kind", &self.default_component_kind)
            .field("default_view_size", &self.default_view_size)
            .field("stretch_last_component", &self.stretch_last_component)
            .field("remove_empty_components", &self.remove_empty_components)
            .field("surface_factory", &self.surface_factory.as_ref().map(|_| ".."))
            .finish()
    }
}
