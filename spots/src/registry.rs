use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ItemView;

pub type ViewFactory = Rc<dyn Fn() -> Box<dyn ItemView>>;

const DEFAULT_REUSE_IDENTIFIER: &str = "default";

/// Maps item kinds to view factories.
///
/// Template views used for measuring are cached per reuse identifier and shared by every
/// component holding the same configuration. Kinds without a registered factory resolve to the
/// default factory.
#[derive(Default)]
pub struct Registry {
    factories: HashMap<String, ViewFactory>,
    default: Option<ViewFactory>,
    cache: RefCell<HashMap<String, Box<dyn ItemView>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(
        mut self,
        kind: impl Into<String>,
        factory: impl Fn() -> Box<dyn ItemView> + 'static,
    ) -> Self {
        self.register(kind, factory);
        self
    }

    pub fn with_default_view(mut self, factory: impl Fn() -> Box<dyn ItemView> + 'static) -> Self {
        self.default = Some(Rc::new(factory));
        self
    }

    pub fn register(
        &mut self,
        kind: impl Into<String>,
        factory: impl Fn() -> Box<dyn ItemView> + 'static,
    ) {
        self.factories.insert(kind.into(), Rc::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// The reuse identifier `kind` resolves to, or `None` when nothing can render it.
    pub fn reuse_identifier<'a>(&self, kind: &'a str) -> Option<&'a str> {
        if self.factories.contains_key(kind) {
            Some(kind)
        } else if self.default.is_some() {
            Some(DEFAULT_REUSE_IDENTIFIER)
        } else {
            None
        }
    }

    /// Creates a fresh view for `kind`.
    pub fn make(&self, kind: &str) -> Option<Box<dyn ItemView>> {
        let factory = self.factories.get(kind).or(self.default.as_ref())?;
        Some(factory())
    }

    /// Runs `f` with the cached template view for `kind`, creating it on first use.
    ///
    /// Returns `None` when no factory resolves for `kind`.
    pub fn with_cached_view<R>(&self, kind: &str, f: impl FnOnce(&mut dyn ItemView) -> R) -> Option<R> {
        let reuse_identifier = self.reuse_identifier(kind)?;
        let cached = self.cache.borrow_mut().remove(reuse_identifier);
        let mut view = match cached {
            Some(mut view) => {
                view.prepare_for_reuse();
                view
            }
            None => self.make(kind)?,
        };
        let result = f(view.as_mut());
        self.cache
            .borrow_mut()
            .insert(reuse_identifier.to_owned(), view);
        Some(result)
    }

    pub fn cached_views(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn purge(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut kinds: Vec<&String> = self.factories.keys().collect();
        kinds.sort();
        f.debug_struct("Registry")
            .field("kinds", &kinds)
            .field("has_default", &self.default.is_some())
            .field("cached_views", &self.cached_views())
            .finish()
    }
}
