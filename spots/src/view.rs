use crate::{Animation, ComponentKind, Item, Size};

/// A view that renders one [`Item`].
pub trait ItemView {
    /// Updates the view from `item`. The view may write a measured size back into `item.size`.
    fn configure(&mut self, item: &mut Item);

    fn compute_size(&self, item: &Item) -> Size;

    /// Called before a cached template view is handed out again.
    fn prepare_for_reuse(&mut self) {}
}

/// Whether a surface finished applying an update synchronously.
///
/// When a surface returns [`SurfaceUpdate::Pending`], the host must call
/// [`crate::Component::surface_did_finish`] once its layout pass completes; the owning component
/// does not start its next queued mutation until then.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceUpdate {
    Finished,
    Pending,
}

/// Frame assigned to a component's surface by [`crate::ScrollView::layout_views`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ComponentFrame {
    pub index: usize,
    pub origin_y: f64,
    pub height: f64,
    /// Content offset inside the component's own scrollable surface.
    pub content_offset_y: f64,
}

/// A live, scrollable list surface (a table or collection view in a native toolkit).
///
/// Calls made between `begin_updates` and `end_updates` are part of one batch; their return
/// values are ignored and the batch's completion is reported by `end_updates`.
pub trait UserInterface {
    fn insert(&mut self, indexes: &[usize], animation: Animation) -> SurfaceUpdate;
    fn delete(&mut self, indexes: &[usize], animation: Animation) -> SurfaceUpdate;
    fn reload(&mut self, indexes: &[usize], animation: Animation) -> SurfaceUpdate;
    /// Animated reload of the whole section.
    fn reload_section(&mut self, animation: Animation) -> SurfaceUpdate;
    /// Tears down and recreates the data source without animation.
    fn reload_data(&mut self);
    fn begin_updates(&mut self);
    fn end_updates(&mut self) -> SurfaceUpdate;
    /// The materialized view at `index`, if any.
    fn view_at(&mut self, index: usize) -> Option<&mut dyn ItemView>;

    fn content_offset(&self) -> f64 {
        0.0
    }

    fn set_content_offset(&mut self, _offset: f64) {}

    fn apply_frame(&mut self, _frame: ComponentFrame) {}
}

/// The rendering surface of a component.
pub enum Surface {
    /// Row-based surface. Existing rows can be resized inside a batch update.
    Table(Box<dyn UserInterface>),
    /// Cell-based surface. Resizing requires reloading the cell.
    Grid(Box<dyn UserInterface>),
}

impl Surface {
    pub fn for_kind(kind: &ComponentKind, ui: Box<dyn UserInterface>) -> Self {
        match kind {
            ComponentKind::List => Self::Table(ui),
            _ => Self::Grid(ui),
        }
    }

    pub fn ui(&self) -> &dyn UserInterface {
        match self {
            Self::Table(ui) | Self::Grid(ui) => &**ui,
        }
    }

    pub fn ui_mut(&mut self) -> &mut dyn UserInterface {
        match self {
            Self::Table(ui) | Self::Grid(ui) => &mut **ui,
        }
    }

    pub fn resizes_in_place(&self) -> bool {
        match self {
            Self::Table(_) => true,
            Self::Grid(_) => false,
        }
    }

    /// Reloads every item; animated reloads go through a section reload on tables.
    pub fn reload_all(&mut self, animation: Animation) -> SurfaceUpdate {
        match self {
            Self::Table(ui) if animation != Animation::None => ui.reload_section(animation),
            Self::Table(ui) | Self::Grid(ui) => {
                ui.reload_data();
                SurfaceUpdate::Finished
            }
        }
    }
}

impl core::fmt::Debug for Surface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Table(_) => f.write_str("Table(..)"),
            Self::Grid(_) => f.write_str("Grid(..)"),
        }
    }
}
