//! Queued structural mutations of a [`Component`].
//!
//! Every public mutation becomes an [`Operation`]: a short list of steps followed by a height
//! recomputation and exactly one completion call. Operations run strictly in submission order;
//! a step whose surface update is [`SurfaceUpdate::Pending`] parks the queue until the host
//! calls [`Component::surface_did_finish`].

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::composite::{COMPOSITE_KIND, CompositeComponent};
use crate::component::normalized;
use crate::moves::calculate_move_for_deleted_indexes;
use crate::{
    Animation, Changes, Component, ComponentModel, ComponentModelDiff, Item, Surface,
    SurfaceUpdate,
};

/// Called exactly once when a mutation has been applied and the height recomputed.
pub type Completion = Box<dyn FnOnce()>;

type Step = Box<dyn FnOnce(&mut Component) -> SurfaceUpdate>;

/// Where the in-flight mutation of a component currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperationPhase {
    #[default]
    Idle,
    MutatingModel,
    ApplyingToSurface,
    RecomputingHeight,
    CompletionFired,
}

pub(crate) struct Operation {
    name: &'static str,
    steps: VecDeque<Step>,
    completion: Option<Completion>,
}

impl Operation {
    fn new(name: &'static str, completion: impl FnOnce() + 'static) -> Self {
        Self {
            name,
            steps: VecDeque::new(),
            completion: Some(Box::new(completion)),
        }
    }

    fn step(mut self, step: impl FnOnce(&mut Component) -> SurfaceUpdate + 'static) -> Self {
        self.steps.push_back(Box::new(step));
        self
    }
}

/// Content offsets of nested surfaces, keyed by (item index, child position).
type CompositeOffsets = Vec<(usize, usize, f64)>;

impl Component {
    pub fn phase(&self) -> OperationPhase {
        self.phase
    }

    /// Whether no mutation is in flight or queued.
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }

    /// Number of mutations waiting behind the in-flight one.
    pub fn queued_operations(&self) -> usize {
        self.queue.len()
    }

    /// Whether the in-flight mutation waits for [`Component::surface_did_finish`].
    pub fn is_awaiting_surface(&self) -> bool {
        self.awaiting_surface
    }

    /// Resumes the queue after the surface finished a pending update.
    pub fn surface_did_finish(&mut self) {
        if !self.awaiting_surface {
            swarn!("Component::surface_did_finish called with no pending surface update");
            return;
        }
        self.awaiting_surface = false;
        self.drain();
    }

    pub fn append(&mut self, item: Item, animation: Animation, completion: impl FnOnce() + 'static) {
        self.append_items(vec![item], animation, completion);
    }

    /// Appends `items`. An empty component gets a full data reload instead of an insert.
    pub fn append_items(
        &mut self,
        items: Vec<Item>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        self.enqueue(
            Operation::new("append", completion)
                .step(move |c| c.apply_append(items, animation)),
        );
    }

    /// Inserts `items` at the head, keeping their order.
    pub fn prepend_items(
        &mut self,
        items: Vec<Item>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        self.enqueue(
            Operation::new("prepend", completion)
                .step(move |c| c.apply_prepend(items, animation)),
        );
    }

    pub fn insert(
        &mut self,
        item: Item,
        index: usize,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        self.enqueue(
            Operation::new("insert", completion)
                .step(move |c| c.apply_insert(item, index, animation)),
        );
    }

    /// Replaces the item at `index`.
    ///
    /// - Composite items re-diff their nested components without touching this surface.
    /// - A kind or height change reloads the index (or resizes the live row in place on tables).
    /// - Anything else reconfigures the materialized view directly.
    pub fn update(
        &mut self,
        item: Item,
        index: usize,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        self.enqueue(
            Operation::new("update", completion).step(move |c| {
                c.phase = OperationPhase::MutatingModel;
                if !c.check_index(index, c.model.items.len(), "update") {
                    return SurfaceUpdate::Finished;
                }
                let old = std::mem::replace(&mut c.model.items[index], item);
                c.model.items[index].index = index;
                c.apply_update(index, old, animation)
            }),
        );
    }

    /// Deletes the first item shallow-equal to `item`.
    pub fn delete(&mut self, item: Item, animation: Animation, completion: impl FnOnce() + 'static) {
        self.delete_items(vec![item], animation, completion);
    }

    pub fn delete_items(
        &mut self,
        items: Vec<Item>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        self.enqueue(Operation::new("delete", completion).step(move |c| {
            let indexes: Vec<usize> = items
                .iter()
                .filter_map(|item| {
                    let found = c.model.items.iter().position(|i| i == item);
                    if found.is_none() {
                        swarn!(title = %item.title, "Component::delete: item not found");
                    }
                    found
                })
                .collect();
            c.apply_delete(indexes, animation)
        }));
    }

    pub fn delete_index(
        &mut self,
        index: usize,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        self.delete_indexes(vec![index], animation, completion);
    }

    pub fn delete_indexes(
        &mut self,
        indexes: Vec<usize>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        self.enqueue(
            Operation::new("delete", completion)
                .step(move |c| c.apply_delete(indexes, animation)),
        );
    }

    /// Reconfigures `indexes`, or rebuilds the whole data source when `indexes` is `None`.
    pub fn reload(
        &mut self,
        indexes: Option<Vec<usize>>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        self.enqueue(
            Operation::new("reload", completion)
                .step(move |c| c.apply_reload(indexes, animation)),
        );
    }

    /// Replaces the items, reloading only what changed.
    ///
    /// Shallow-equal items only refresh the cache. With an unchanged count, the changed indexes
    /// are reloaded and unchanged items keep their measured sizes; otherwise the whole data
    /// source is reloaded.
    pub fn reload_if_needed(
        &mut self,
        items: Vec<Item>,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        self.enqueue(
            Operation::new("reload_if_needed", completion)
                .step(move |c| c.apply_reload_if_needed(items, animation)),
        );
    }

    /// Applies a precomputed [`Changes`] value.
    ///
    /// `update_data_source` installs the new items. Deletions, insertions and reloads run as one
    /// surface batch; updates then run one after another, followed by nested composite re-diffs.
    pub fn reload_if_needed_with_changes(
        &mut self,
        changes: Changes,
        update_data_source: impl FnOnce(&mut ComponentModel) + 'static,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        self.enqueue(Operation::new("reload_if_needed_with_changes", completion).step(
            move |c| c.apply_changes(changes, Box::new(update_data_source), animation),
        ));
    }

    /// Reconciles the items of `model` against the items current when the operation runs.
    ///
    /// The model is measured and diffed inside the queued operation, so mutations queued ahead
    /// of it are part of the edit script. Its interaction, size and cache amount are adopted as
    /// well. A changed count with composite children is followed by a full data reload.
    pub fn reload_if_needed_with_model(
        &mut self,
        model: ComponentModel,
        animation: Animation,
        completion: impl FnOnce() + 'static,
    ) {
        self.enqueue(
            Operation::new("reload_if_needed_with_model", completion)
                .step(move |c| c.apply_model(model, animation)),
        );
    }

    /// Computes the edit script from the current items to `items`.
    pub fn changes_to(&self, items: &[Item]) -> Changes {
        Changes::between(items, &self.model.items)
    }

    fn enqueue(&mut self, op: Operation) {
        strace!(
            op = op.name,
            queued = self.queue.len(),
            in_flight = self.current.is_some(),
            "Component: enqueue"
        );
        self.queue.push_back(op);
        self.drain();
    }

    fn drain(&mut self) {
        if self.draining {
            return;
        }
        self.draining = true;
        loop {
            if self.awaiting_surface {
                strace!("Component: waiting for surface");
                break;
            }
            if self.current.is_none() {
                let Some(op) = self.queue.pop_front() else {
                    self.phase = OperationPhase::Idle;
                    break;
                };
                strace!(op = op.name, "Component: start");
                self.current = Some(op);
            }

            let step = self.current.as_mut().and_then(|op| op.steps.pop_front());
            match step {
                Some(step) => {
                    if step(self) == SurfaceUpdate::Pending {
                        self.awaiting_surface = true;
                    }
                }
                None => self.complete_current(),
            }
        }
        self.draining = false;
    }

    fn push_step(&mut self, step: impl FnOnce(&mut Component) -> SurfaceUpdate + 'static) {
        if let Some(op) = self.current.as_mut() {
            op.steps.push_back(Box::new(step));
        }
    }

    fn complete_current(&mut self) {
        self.phase = OperationPhase::RecomputingHeight;
        self.model.refresh_indexes();
        self.refresh_composite_heights();
        self.update_height();
        self.write_cache();

        let op = self.current.take();
        self.phase = OperationPhase::CompletionFired;
        if let Some(op) = op {
            strace!(op = op.name, height = self.computed_height(), "Component: complete");
            if let Some(completion) = op.completion {
                completion();
            }
        }
        self.phase = OperationPhase::Idle;
    }

    fn check_index(&self, index: usize, count: usize, _op: &'static str) -> bool {
        if index < count {
            return true;
        }
        swarn!(op = _op, index, count, "Component: index out of range");
        debug_assert!(
            index < count,
            "Component::{_op}: index out of range (i={index}, count={count})"
        );
        false
    }

    /// Runs `f` against the surface, or skips it when the surface is gone.
    fn on_surface(
        &mut self,
        _op: &'static str,
        f: impl FnOnce(&mut Surface) -> SurfaceUpdate,
    ) -> SurfaceUpdate {
        self.phase = OperationPhase::ApplyingToSurface;
        match self.surface.as_mut() {
            Some(surface) => f(surface),
            None => {
                swarn!(op = _op, "Component: no surface, skipping surface update");
                SurfaceUpdate::Finished
            }
        }
    }

    fn finish_prepare(&mut self) {
        self.model.refresh_indexes();
        self.equalize_carousel_heights();
        self.config.registry.purge();
    }

    fn apply_append(&mut self, items: Vec<Item>, animation: Animation) -> SurfaceUpdate {
        self.phase = OperationPhase::MutatingModel;
        if items.is_empty() {
            return SurfaceUpdate::Finished;
        }
        let start = self.model.items.len();
        self.model.items.extend(items);
        let end = self.model.items.len();
        for index in start..end {
            self.prepare_item(index);
        }
        self.finish_prepare();

        if start == 0 {
            return self.on_surface("append", |surface| {
                surface.ui_mut().reload_data();
                SurfaceUpdate::Finished
            });
        }
        let indexes: Vec<usize> = (start..end).collect();
        self.on_surface("append", |surface| {
            surface.ui_mut().insert(&indexes, animation)
        })
    }

    fn apply_prepend(&mut self, items: Vec<Item>, animation: Animation) -> SurfaceUpdate {
        self.phase = OperationPhase::MutatingModel;
        let count = items.len();
        if count == 0 {
            return SurfaceUpdate::Finished;
        }
        self.model.items.splice(0..0, items);
        self.shift_composites(0, count);
        self.model.refresh_indexes();
        for index in 0..count {
            self.prepare_item(index);
        }
        self.finish_prepare();

        let indexes: Vec<usize> = (0..count).rev().collect();
        self.on_surface("prepend", |surface| {
            surface.ui_mut().insert(&indexes, animation)
        })
    }

    fn apply_insert(&mut self, item: Item, index: usize, animation: Animation) -> SurfaceUpdate {
        self.phase = OperationPhase::MutatingModel;
        if !self.check_index(index, self.model.items.len() + 1, "insert") {
            return SurfaceUpdate::Finished;
        }
        self.model.items.insert(index, item);
        self.shift_composites(index, 1);
        self.model.refresh_indexes();
        self.prepare_item(index);
        self.finish_prepare();

        self.on_surface("insert", |surface| {
            surface.ui_mut().insert(&[index], animation)
        })
    }

    /// Applies the item now stored at `index`, which replaced `old`.
    fn apply_update(&mut self, index: usize, old: Item, animation: Animation) -> SurfaceUpdate {
        if self.model.items[index].kind == COMPOSITE_KIND && old.kind == COMPOSITE_KIND {
            let item = &mut self.model.items[index];
            if item.size.width <= 0.0 {
                item.size.width = old.size.width;
            }
            self.reconcile_composites(index);
            return SurfaceUpdate::Finished;
        }

        self.prepare_item(index);
        self.finish_prepare();

        let item = &mut self.model.items[index];
        let kind_changed = item.kind != old.kind;
        let height_changed = item.size.height != old.size.height;
        self.phase = OperationPhase::ApplyingToSurface;
        let Some(surface) = self.surface.as_mut() else {
            swarn!(index, "Component::update: no surface, skipping surface update");
            return SurfaceUpdate::Finished;
        };

        if kind_changed {
            return surface.ui_mut().reload(&[index], animation);
        }
        if height_changed {
            let in_place = surface.resizes_in_place() && animation != Animation::None;
            let ui = surface.ui_mut();
            if in_place && ui.view_at(index).is_some() {
                ui.begin_updates();
                if let Some(view) = ui.view_at(index) {
                    view.configure(item);
                }
                return ui.end_updates();
            }
            return ui.reload(&[index], animation);
        }
        if let Some(view) = surface.ui_mut().view_at(index) {
            view.configure(item);
        }
        SurfaceUpdate::Finished
    }

    fn apply_delete(&mut self, indexes: Vec<usize>, animation: Animation) -> SurfaceUpdate {
        self.phase = OperationPhase::MutatingModel;
        let count = self.model.items.len();
        let deleted: BTreeSet<usize> = indexes
            .into_iter()
            .filter(|&index| self.check_index(index, count, "delete"))
            .collect();
        if deleted.is_empty() {
            return SurfaceUpdate::Finished;
        }

        self.detach_composites(&deleted);
        let ordered: Vec<usize> = deleted.iter().copied().collect();
        let moved = calculate_move_for_deleted_indexes(&ordered, count);
        self.remap_composites(&moved);
        for &index in ordered.iter().rev() {
            self.model.items.remove(index);
        }
        self.model.refresh_indexes();

        self.on_surface("delete", |surface| {
            surface.ui_mut().delete(&ordered, animation)
        })
    }

    fn apply_reload(&mut self, indexes: Option<Vec<usize>>, animation: Animation) -> SurfaceUpdate {
        self.phase = OperationPhase::MutatingModel;
        match indexes {
            Some(indexes) => {
                let count = self.model.items.len();
                let indexes: Vec<usize> = indexes
                    .into_iter()
                    .filter(|&index| self.check_index(index, count, "reload"))
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                for &index in &indexes {
                    self.prepare_item(index);
                }
                self.finish_prepare();
                self.on_surface("reload", |surface| {
                    surface.ui_mut().reload(&indexes, animation)
                })
            }
            None => {
                self.prepare_items();
                self.on_surface("reload", |surface| surface.reload_all(animation))
            }
        }
    }

    fn apply_reload_if_needed(&mut self, items: Vec<Item>, animation: Animation) -> SurfaceUpdate {
        self.phase = OperationPhase::MutatingModel;
        if self.model.items == items {
            strace!("Component::reload_if_needed: unchanged");
            return SurfaceUpdate::Finished;
        }

        let old = std::mem::replace(&mut self.model.items, items);
        self.model.refresh_indexes();
        if old.len() != self.model.items.len() {
            return self.apply_reload(None, animation);
        }

        let mut changed = Vec::new();
        for (index, previous) in old.iter().enumerate() {
            if self.model.items[index] == *previous {
                self.model.items[index].size = previous.size;
            } else {
                changed.push(index);
            }
        }
        self.apply_reload(Some(changed), animation)
    }

    fn apply_changes(
        &mut self,
        changes: Changes,
        update_data_source: Box<dyn FnOnce(&mut ComponentModel)>,
        animation: Animation,
    ) -> SurfaceUpdate {
        self.phase = OperationPhase::MutatingModel;
        let old_items = self.model.items.clone();
        let offsets = self.snapshot_composite_offsets();

        update_data_source(&mut self.model);
        self.model.refresh_indexes();

        self.detach_composites(&changes.deletions);
        self.remap_composites(&changes.moved);
        for &index in changes.insertions.iter().chain(&changes.reloads) {
            self.prepare_item(index);
        }
        self.finish_prepare();

        for &index in &changes.updates {
            if index >= self.model.items.len() {
                continue;
            }
            let Some(old) = old_items.get(index).cloned() else {
                continue;
            };
            self.push_step(move |c| c.apply_update(index, old, animation));
        }
        for &index in &changes.child_updates {
            self.push_step(move |c| {
                c.reconcile_composites(index);
                SurfaceUpdate::Finished
            });
        }
        if !offsets.is_empty() {
            let deletions = changes.deletions.clone();
            let moved = changes.moved.clone();
            self.push_step(move |c| {
                c.restore_composite_offsets(offsets, &deletions, &moved);
                SurfaceUpdate::Finished
            });
        }

        if !changes.has_structural_changes() {
            return SurfaceUpdate::Finished;
        }
        sdebug!(
            insertions = changes.insertions.len(),
            deletions = changes.deletions.len(),
            reloads = changes.reloads.len(),
            updates = changes.updates.len(),
            child_updates = changes.child_updates.len(),
            "Component: applying changes"
        );

        if old_items.is_empty() {
            return self.on_surface("reload_if_needed_with_changes", |surface| {
                surface.ui_mut().reload_data();
                SurfaceUpdate::Finished
            });
        }

        let deletions: Vec<usize> = changes.deletions.iter().copied().collect();
        let insertions: Vec<usize> = changes.insertions.iter().copied().collect();
        let reloads: Vec<usize> = changes.reloads.iter().copied().collect();
        self.on_surface("reload_if_needed_with_changes", |surface| {
            let ui = surface.ui_mut();
            ui.begin_updates();
            if !deletions.is_empty() {
                ui.delete(&deletions, animation);
            }
            if !insertions.is_empty() {
                ui.insert(&insertions, animation);
            }
            if !reloads.is_empty() {
                ui.reload(&reloads, animation);
            }
            ui.end_updates()
        })
    }

    fn apply_model(&mut self, model: ComponentModel, animation: Animation) -> SurfaceUpdate {
        let measured = self.measured(model);
        let changes = self.changes_to(&measured.items);
        let old_count = self.model.items.len();
        let new_count = measured.items.len();
        let has_children = measured.items.iter().any(|item| !item.children.is_empty());
        sdebug!(old_count, new_count, has_children, "Component: reconciling model");

        let ComponentModel {
            items,
            interaction,
            size,
            amount_of_items_to_cache,
            ..
        } = measured;
        let update_data_source = move |model: &mut ComponentModel| {
            model.items = items;
            model.interaction = interaction;
            model.size = size;
            model.amount_of_items_to_cache = amount_of_items_to_cache;
        };

        let result = self.apply_changes(changes, Box::new(update_data_source), animation);
        if new_count != old_count && has_children {
            self.push_step(move |c| c.apply_reload(None, animation));
        }
        result
    }

    /// Re-diffs the nested components of the composite item at `index` against its children.
    fn reconcile_composites(&mut self, index: usize) {
        let Some(item) = self.model.items.get(index) else {
            return;
        };
        if item.kind != COMPOSITE_KIND {
            self.composites.retain(|c| c.item_index != index);
            return;
        }
        let width = item.size.width;
        let children: Vec<ComponentModel> =
            item.child_models().into_iter().map(normalized).collect();
        let positions: Vec<usize> = self
            .composites
            .iter()
            .enumerate()
            .filter(|(_, c)| c.item_index == index)
            .map(|(position, _)| position)
            .collect();

        for (child_index, model) in children.iter().enumerate() {
            let Some(&position) = positions.get(child_index) else {
                let child = self.make_child(model.clone(), width);
                self.composites.push(CompositeComponent::new(index, child));
                continue;
            };

            let component = &mut self.composites[position].component;
            match component.measured(model.clone()).diff(&component.model) {
                ComponentModelDiff::None => {}
                ComponentModelDiff::Items => {
                    component.reload_if_needed_with_model(
                        model.clone(),
                        Animation::Automatic,
                        || {},
                    );
                }
                _ => {
                    strace!(item = index, child = child_index, "Component: rebuilding composite");
                    let child = self.make_child(model.clone(), width);
                    self.composites[position].component = child;
                }
            }
        }

        for &position in positions.iter().skip(children.len()).rev() {
            self.composites.remove(position);
        }
        self.composites.sort_by_key(|c| c.item_index);
    }

    fn shift_composites(&mut self, from: usize, by: usize) {
        for composite in &mut self.composites {
            if composite.item_index >= from {
                composite.item_index += by;
            }
        }
    }

    fn detach_composites(&mut self, deleted: &BTreeSet<usize>) {
        if deleted.is_empty() {
            return;
        }
        self.composites
            .retain(|c| !deleted.contains(&c.item_index));
    }

    fn remap_composites(&mut self, moved: &BTreeMap<usize, usize>) {
        for composite in &mut self.composites {
            if let Some(&to) = moved.get(&composite.item_index) {
                composite.item_index = to;
            }
        }
        self.composites.sort_by_key(|c| c.item_index);
    }

    fn snapshot_composite_offsets(&self) -> CompositeOffsets {
        let mut offsets = Vec::new();
        let mut last: Option<(usize, usize)> = None;
        for composite in &self.composites {
            let position = match last {
                Some((item, position)) if item == composite.item_index => position + 1,
                _ => 0,
            };
            last = Some((composite.item_index, position));
            if let Some(surface) = composite.component.surface() {
                offsets.push((composite.item_index, position, surface.ui().content_offset()));
            }
        }
        offsets
    }

    fn restore_composite_offsets(
        &mut self,
        offsets: CompositeOffsets,
        deletions: &BTreeSet<usize>,
        moved: &BTreeMap<usize, usize>,
    ) {
        for (old_index, position, offset) in offsets {
            if deletions.contains(&old_index) {
                continue;
            }
            let index = moved.get(&old_index).copied().unwrap_or(old_index);
            let target = self
                .composites
                .iter_mut()
                .filter(|c| c.item_index == index)
                .nth(position);
            if let Some(surface) = target.and_then(|c| c.component.surface_mut()) {
                surface.ui_mut().set_content_offset(offset);
            }
        }
    }
}
