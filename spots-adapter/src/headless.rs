use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use spots::{
    Animation, ComponentFrame, ComponentModel, Item, ItemView, Size, SurfaceUpdate, UserInterface,
};

/// One call received by a [`HeadlessSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEvent {
    Insert(Vec<usize>),
    Delete(Vec<usize>),
    Reload(Vec<usize>),
    ReloadSection,
    ReloadData,
    BeginUpdates,
    EndUpdates,
    Configure { index: usize, title: String },
}

/// Shared, cloneable record of surface events, tagged with the surface name.
#[derive(Clone, Debug, Default)]
pub struct SurfaceLog {
    events: Rc<RefCell<Vec<(String, SurfaceEvent)>>>,
}

impl SurfaceLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, surface: &str, event: SurfaceEvent) {
        self.events.borrow_mut().push((surface.to_owned(), event));
    }

    /// Events recorded by the surface named `surface`, in order.
    pub fn events_for(&self, surface: &str) -> Vec<SurfaceEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|(name, _)| name == surface)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Drains every recorded event.
    pub fn take(&self) -> Vec<(String, SurfaceEvent)> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// An item view that remembers the last item it was configured with.
#[derive(Clone, Debug, Default)]
pub struct HeadlessView {
    pub last: Option<Item>,
    /// Height reported for items without a size.
    pub default_height: f64,
}

impl ItemView for HeadlessView {
    fn configure(&mut self, item: &mut Item) {
        self.last = Some(item.clone());
    }

    fn compute_size(&self, item: &Item) -> Size {
        let height = if item.size.height > 0.0 {
            item.size.height
        } else {
            self.default_height
        };
        Size::new(item.size.width, height)
    }

    fn prepare_for_reuse(&mut self) {
        self.last = None;
    }
}

/// A materialized row/cell of a [`HeadlessSurface`].
struct LiveView {
    index: usize,
    surface: String,
    log: SurfaceLog,
    view: HeadlessView,
}

impl ItemView for LiveView {
    fn configure(&mut self, item: &mut Item) {
        self.log.push(
            &self.surface,
            SurfaceEvent::Configure {
                index: self.index,
                title: item.title.clone(),
            },
        );
        self.view.configure(item);
    }

    fn compute_size(&self, item: &Item) -> Size {
        self.view.compute_size(item)
    }
}

/// A [`UserInterface`] without any rendering, for hosts that drive layout themselves and for
/// tests.
///
/// With [`HeadlessSurface::deferred`] set, every update reports [`SurfaceUpdate::Pending`] and
/// the host must call `surface_did_finish` on the owning component.
pub struct HeadlessSurface {
    name: String,
    log: SurfaceLog,
    deferred: Rc<Cell<bool>>,
    views: BTreeMap<usize, LiveView>,
    content_offset: f64,
    frame: Option<ComponentFrame>,
}

impl HeadlessSurface {
    pub fn new(name: impl Into<String>, log: SurfaceLog) -> Self {
        Self {
            name: name.into(),
            log,
            deferred: Rc::new(Cell::new(false)),
            views: BTreeMap::new(),
            content_offset: 0.0,
            frame: None,
        }
    }

    /// Shares a switch that makes updates complete asynchronously while set.
    pub fn with_deferred(mut self, deferred: Rc<Cell<bool>>) -> Self {
        self.deferred = deferred;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn deferred(&self) -> bool {
        self.deferred.get()
    }

    pub fn frame(&self) -> Option<ComponentFrame> {
        self.frame
    }

    /// The materialized view at `index`, if one was requested since the last data reload.
    pub fn view(&self, index: usize) -> Option<&HeadlessView> {
        self.views.get(&index).map(|live| &live.view)
    }

    fn record(&self, event: SurfaceEvent) {
        self.log.push(&self.name, event);
    }

    fn result(&self) -> SurfaceUpdate {
        if self.deferred.get() {
            SurfaceUpdate::Pending
        } else {
            SurfaceUpdate::Finished
        }
    }
}

impl UserInterface for HeadlessSurface {
    fn insert(&mut self, indexes: &[usize], _animation: Animation) -> SurfaceUpdate {
        self.record(SurfaceEvent::Insert(indexes.to_vec()));
        self.result()
    }

    fn delete(&mut self, indexes: &[usize], _animation: Animation) -> SurfaceUpdate {
        for index in indexes {
            self.views.remove(index);
        }
        self.record(SurfaceEvent::Delete(indexes.to_vec()));
        self.result()
    }

    fn reload(&mut self, indexes: &[usize], _animation: Animation) -> SurfaceUpdate {
        self.record(SurfaceEvent::Reload(indexes.to_vec()));
        self.result()
    }

    fn reload_section(&mut self, _animation: Animation) -> SurfaceUpdate {
        self.record(SurfaceEvent::ReloadSection);
        self.result()
    }

    fn reload_data(&mut self) {
        self.views.clear();
        self.record(SurfaceEvent::ReloadData);
    }

    fn begin_updates(&mut self) {
        self.record(SurfaceEvent::BeginUpdates);
    }

    fn end_updates(&mut self) -> SurfaceUpdate {
        self.record(SurfaceEvent::EndUpdates);
        self.result()
    }

    fn view_at(&mut self, index: usize) -> Option<&mut dyn ItemView> {
        let name = self.name.clone();
        let log = self.log.clone();
        let view = self.views.entry(index).or_insert_with(|| LiveView {
            index,
            surface: name,
            log,
            view: HeadlessView::default(),
        });
        Some(view as &mut dyn ItemView)
    }

    fn content_offset(&self) -> f64 {
        self.content_offset
    }

    fn set_content_offset(&mut self, offset: f64) {
        self.content_offset = offset;
    }

    fn apply_frame(&mut self, frame: ComponentFrame) {
        self.frame = Some(frame);
    }
}

/// A surface factory for [`spots::Configuration::with_surface_factory`].
///
/// Surfaces are named after the model identifier, falling back to the kind.
pub fn headless_surface_factory(
    log: SurfaceLog,
    deferred: Rc<Cell<bool>>,
) -> impl Fn(&ComponentModel) -> Box<dyn UserInterface> + 'static {
    move |model: &ComponentModel| -> Box<dyn UserInterface> {
        let name = model
            .identifier
            .clone()
            .unwrap_or_else(|| model.kind.to_string());
        Box::new(HeadlessSurface::new(name, log.clone()).with_deferred(deferred.clone()))
    }
}
