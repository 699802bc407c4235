//! Whole-screen reconciliation: diffing a new list of component models against the live
//! components of a [`Controller`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::component::normalized;
use crate::payload::{DEFAULT_PAYLOAD_KEY, models_from_json};
use crate::{
    Animation, Completion, ComponentModel, ComponentModelDiff, Controller, Item, Result,
};

/// Classifies every position of `new` against `old`.
///
/// Positions past the end of `old` are [`ComponentModelDiff::New`]; positions past the end of
/// `new` are [`ComponentModelDiff::Removed`].
pub fn generate_changes(new: &[ComponentModel], old: &[ComponentModel]) -> Vec<ComponentModelDiff> {
    let len = new.len().max(old.len());
    (0..len)
        .map(|index| match (new.get(index), old.get(index)) {
            (Some(new), Some(old)) => new.diff(old),
            (Some(_), None) => ComponentModelDiff::New,
            (None, Some(_)) => ComponentModelDiff::Removed,
            (None, None) => ComponentModelDiff::None,
        })
        .collect()
}

/// Returns a callback that runs `done` on its `count`-th call.
fn countdown(count: usize, done: Option<Completion>) -> Rc<dyn Fn()> {
    let remaining = Cell::new(count);
    let done = RefCell::new(done);
    Rc::new(move || {
        let left = remaining.get().saturating_sub(1);
        remaining.set(left);
        if left == 0 {
            let done = done.borrow_mut().take();
            if let Some(done) = done {
                done();
            }
        }
    })
}

impl Controller {
    /// Reconciles the live components against `models`.
    ///
    /// Components whose kind, identifier, layout, header, footer or meta changed are replaced;
    /// new positions are appended; removed positions are pruned after the pass; item-only
    /// changes are diffed in place. `completion` fires once every per-component update has
    /// finished, after the delegate's `components_did_change`.
    pub fn reload_if_needed(
        &mut self,
        models: Vec<ComponentModel>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        let models: Vec<ComponentModel> = models
            .into_iter()
            .filter(|model| !self.should_drop(model))
            .enumerate()
            .map(|(index, mut model)| {
                model.index = index;
                normalized(model)
            })
            .collect();

        let delegate = self.delegate.clone();
        let snapshot = models.clone();
        let mut done: Option<Completion> = Some(Box::new(move || {
            if let Some(delegate) = delegate {
                delegate.components_did_change(&snapshot);
            }
            completion();
        }));

        if models.is_empty() {
            sdebug!("Controller::reload_if_needed: removing every component");
            for component in &mut self.components {
                component.detach();
            }
            self.components.clear();
            self.layout_views();
            if let Some(done) = done.take() {
                done();
            }
            return;
        }

        let old: Vec<ComponentModel> = self.models();
        let unchanged =
            old.len() == models.len() && old.iter().zip(&models).all(|(o, n)| n.strict_eq(o));
        if unchanged {
            strace!("Controller::reload_if_needed: unchanged");
            self.layout_views();
            if let Some(done) = done.take() {
                done();
            }
            return;
        }

        let changes = generate_changes(&models, &old);
        let items_changes = changes
            .iter()
            .filter(|change| **change == ComponentModelDiff::Items)
            .count();
        // One count per item-level update plus one for the synchronous pass below.
        let finish = countdown(items_changes + 1, done.take());

        for (index, change) in changes.iter().enumerate() {
            sdebug!(index, change = ?change, "Controller::reload_if_needed");
            match change {
                change if change.requires_replacement() => {
                    self.replace_component(index, models[index].clone());
                }
                ComponentModelDiff::New => {
                    let component = self.make_component(models[index].clone(), index);
                    self.components.push(component);
                }
                ComponentModelDiff::Removed => {
                    self.components[index].detach();
                }
                ComponentModelDiff::Items => {
                    let finish = finish.clone();
                    self.components[index].reload_if_needed_with_model(
                        models[index].clone(),
                        animation,
                        move || finish(),
                    );
                }
                _ => {}
            }
        }

        self.prune_detached();
        self.layout_views();
        finish();
    }

    /// Rebuilds every component from `models`, keeping the viewport's content offset.
    pub fn reload(&mut self, models: Vec<ComponentModel>, completion: impl FnOnce() + 'static) {
        let offset = self.scroll.content_offset();
        for component in &mut self.components {
            component.detach();
        }
        self.components = models
            .into_iter()
            .filter(|model| !self.should_drop(model))
            .enumerate()
            .map(|(index, model)| self.make_component(model, index))
            .collect();
        sdebug!(components = self.components.len(), "Controller::reload");
        self.layout_views();
        self.scroll.set_content_offset(offset);
        self.layout_views();

        if let Some(delegate) = &self.delegate {
            delegate.components_did_change(&self.models());
        }
        completion();
    }

    /// Parses a `{"components": [...]}` payload and rebuilds every component from it.
    pub fn reload_json(&mut self, json: &str, completion: impl FnOnce() + 'static) -> Result<()> {
        let models =
            models_from_json(json, DEFAULT_PAYLOAD_KEY, &self.config.default_component_kind)?;
        self.reload(models, completion);
        Ok(())
    }

    /// Parses a payload and reconciles against it.
    pub fn reload_if_needed_json(
        &mut self,
        json: &str,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) -> Result<()> {
        let models =
            models_from_json(json, DEFAULT_PAYLOAD_KEY, &self.config.default_component_kind)?;
        self.reload_if_needed(models, animation, completion);
        Ok(())
    }

    /// Mutates a copy of one component's model with `f`, then applies the difference.
    pub fn update_component(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut ComponentModel),
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        if !self.check_component(index, "update_component") {
            completion();
            return;
        }
        let mut model = self.components[index].model().clone();
        f(&mut model);
        model.index = index;
        let model = normalized(model);

        match model.diff(self.components[index].model()) {
            change if change.requires_replacement() => {
                self.replace_component(index, model);
                self.layout_views();
                completion();
            }
            ComponentModelDiff::Items => {
                self.components[index].reload_if_needed_with_model(model, animation, completion);
                self.layout_views();
            }
            _ => completion(),
        }
    }

    /// Replaces one component's items, reloading only when they changed.
    pub fn update_if_needed(
        &mut self,
        index: usize,
        items: Vec<Item>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        if !self.check_component(index, "update_if_needed") {
            completion();
            return;
        }
        self.components[index].reload_if_needed(items, animation, completion);
        self.layout_views();
    }

    pub fn append(
        &mut self,
        component_index: usize,
        items: Vec<Item>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        if !self.check_component(component_index, "append") {
            completion();
            return;
        }
        self.components[component_index].append_items(items, animation, completion);
        self.layout_views();
    }

    pub fn prepend(
        &mut self,
        component_index: usize,
        items: Vec<Item>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        if !self.check_component(component_index, "prepend") {
            completion();
            return;
        }
        self.components[component_index].prepend_items(items, animation, completion);
        self.layout_views();
    }

    pub fn insert(
        &mut self,
        component_index: usize,
        item: Item,
        index: usize,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        if !self.check_component(component_index, "insert") {
            completion();
            return;
        }
        self.components[component_index].insert(item, index, animation, completion);
        self.layout_views();
    }

    pub fn update(
        &mut self,
        component_index: usize,
        item: Item,
        index: usize,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        if !self.check_component(component_index, "update") {
            completion();
            return;
        }
        self.components[component_index].update(item, index, animation, completion);
        self.layout_views();
    }

    pub fn delete(
        &mut self,
        component_index: usize,
        indexes: Vec<usize>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        if !self.check_component(component_index, "delete") {
            completion();
            return;
        }
        self.components[component_index].delete_indexes(indexes, animation, completion);
        self.layout_views();
    }

    fn replace_component(&mut self, index: usize, model: ComponentModel) {
        let component = self.make_component(model, index);
        let mut old = std::mem::replace(&mut self.components[index], component);
        old.detach();
    }

    fn prune_detached(&mut self) {
        self.components.retain(|c| !c.is_detached());
        for (index, component) in self.components.iter_mut().enumerate() {
            component.model.index = index;
        }
    }

    pub(crate) fn should_drop(&self, model: &ComponentModel) -> bool {
        self.config.remove_empty_components
            && model.items.is_empty()
            && !model.layout.as_ref().is_some_and(|l| l.show_empty_component)
    }

    fn check_component(&self, index: usize, _op: &'static str) -> bool {
        let count = self.components.len();
        if index < count {
            return true;
        }
        swarn!(op = _op, index, count, "Controller: component index out of range");
        debug_assert!(
            index < count,
            "Controller::{_op}: component index out of range (i={index}, count={count})"
        );
        false
    }
}
