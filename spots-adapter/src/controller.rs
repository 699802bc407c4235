use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spots::{
    Animation, ComponentModel, Configuration, Controller, DEFAULT_PAYLOAD_KEY, Size,
    models_from_value,
};

use crate::{BlobStore, Result, ScrollAnchor, StateCache, apply_anchor, capture_first_visible_anchor};

/// A [`spots::Controller`] whose screen state survives restarts.
///
/// Cached models are loaded on construction (falling back to the given models when nothing
/// usable is stored) and the target models are written back once each reconciliation completes.
pub struct CachedController<S: BlobStore + 'static> {
    controller: Controller,
    cache: Rc<RefCell<StateCache<S>>>,
    pending_anchor: Option<(ScrollAnchor, Rc<Cell<bool>>)>,
}

impl<S: BlobStore + 'static> CachedController<S> {
    pub fn new(
        mut cache: StateCache<S>,
        fallback: Vec<ComponentModel>,
        config: Rc<Configuration>,
        bounds: Size,
    ) -> Self {
        let models = match cache.load_models() {
            Ok(Some(models)) => {
                adebug!(key = cache.key(), components = models.len(), "CachedController: restored");
                models
            }
            Ok(None) => fallback,
            Err(_err) => {
                awarn!(key = cache.key(), error = %_err, "CachedController: unreadable cache");
                fallback
            }
        };
        Self {
            controller: Controller::new(models, config, bounds),
            cache: Rc::new(RefCell::new(cache)),
            pending_anchor: None,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    /// Runs `f` with the underlying cache.
    pub fn with_cache<R>(&self, f: impl FnOnce(&mut StateCache<S>) -> R) -> R {
        f(&mut self.cache.borrow_mut())
    }

    /// Reconciles against `models`, caching them once every component update has finished.
    pub fn reload_if_needed(
        &mut self,
        models: Vec<ComponentModel>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        let save = self.saver(models.clone());
        self.controller.reload_if_needed(models, animation, move || {
            save();
            completion();
        });
    }

    /// Like [`CachedController::reload_if_needed`], keeping the first visible component at the
    /// same place in the viewport.
    ///
    /// The anchor is applied once the reconciliation completion has fired: right away for
    /// synchronous surfaces, otherwise from [`CachedController::surface_did_finish`].
    pub fn reload_if_needed_anchored(
        &mut self,
        models: Vec<ComponentModel>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) -> Option<ScrollAnchor> {
        let anchor = capture_first_visible_anchor(&self.controller);
        let settled = Rc::new(Cell::new(false));
        let flag = settled.clone();
        self.reload_if_needed(models, animation, move || {
            flag.set(true);
            completion();
        });
        if let Some(anchor) = &anchor {
            self.pending_anchor = Some((anchor.clone(), settled));
            self.apply_pending_anchor();
        }
        anchor
    }

    /// Forwards a finished asynchronous surface pass, then applies a pending anchor whose
    /// reconciliation has completed.
    pub fn surface_did_finish(&mut self, component_index: usize) {
        self.controller.surface_did_finish(component_index);
        self.apply_pending_anchor();
    }

    /// Whether an anchor is waiting for its reconciliation to complete.
    pub fn has_pending_anchor(&self) -> bool {
        self.pending_anchor.is_some()
    }

    fn apply_pending_anchor(&mut self) {
        let settled = self
            .pending_anchor
            .as_ref()
            .is_some_and(|(_, settled)| settled.get());
        if !settled {
            return;
        }
        if let Some((anchor, _)) = self.pending_anchor.take() {
            if !apply_anchor(&mut self.controller, &anchor) {
                adebug!(anchor = ?anchor, "CachedController: anchor no longer present");
            }
        }
    }

    /// Parses a `{"components": [...]}` payload and reconciles against it.
    pub fn reload_if_needed_json(
        &mut self,
        json: &str,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) -> spots::Result<()> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let default_kind = self.controller.config().default_component_kind.clone();
        let models = models_from_value(&value, DEFAULT_PAYLOAD_KEY, Some(&default_kind))?;
        self.reload_if_needed(models, animation, completion);
        Ok(())
    }

    /// Rebuilds every component from `models` and caches them.
    pub fn reload(&mut self, models: Vec<ComponentModel>, completion: impl FnOnce() + 'static) {
        let save = self.saver(models.clone());
        self.controller.reload(models, move || {
            save();
            completion();
        });
    }

    /// Writes the live models to the cache now.
    pub fn save(&self) -> Result<()> {
        self.cache
            .borrow_mut()
            .save_models(&self.controller.models())
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.borrow_mut().clear()
    }

    fn saver(&self, models: Vec<ComponentModel>) -> impl FnOnce() + 'static {
        let cache = self.cache.clone();
        move || {
            if let Err(_err) = cache.borrow_mut().save_models(&models) {
                awarn!(error = %_err, "CachedController: failed to write cache");
            }
        }
    }
}

impl<S: BlobStore + 'static> core::fmt::Debug for CachedController<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CachedController")
            .field("controller", &self.controller)
            .field("key", &self.cache.borrow().key())
            .finish()
    }
}
