use serde::{Deserialize, Serialize};

use crate::ComponentKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inset {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Inset {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    #[default]
    Default,
    Sticky,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageIndicatorPlacement {
    Below,
    Overlay,
}

/// Layout parameters for a component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Layout {
    pub inset: Inset,
    /// Minimum spacing between items on the same row.
    pub item_spacing: f64,
    /// Minimum spacing between successive rows.
    pub line_spacing: f64,
    /// Rows used by horizontal components; `1` keeps every item on one row.
    pub items_per_row: usize,
    /// Items per row for grid-like components. `0` means items keep their own width.
    pub span: f64,
    /// Evens out spacing when a carousel has fewer items than its span.
    pub dynamic_span: bool,
    /// Use the computed content height instead of the surface's frame height.
    pub dynamic_height: bool,
    #[serde(rename = "page-indicator", skip_serializing_if = "Option::is_none")]
    pub page_indicator_placement: Option<PageIndicatorPlacement>,
    pub header_mode: HeaderMode,
    pub infinite_scrolling: bool,
    /// Keep the component on screen even when it has no items.
    pub show_empty_component: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            inset: Inset::default(),
            item_spacing: 0.0,
            line_spacing: 0.0,
            items_per_row: 1,
            span: 0.0,
            dynamic_span: false,
            dynamic_height: true,
            page_indicator_placement: None,
            header_mode: HeaderMode::Default,
            infinite_scrolling: false,
            show_empty_component: false,
        }
    }
}

impl Layout {
    pub fn new(span: f64) -> Self {
        Self {
            span,
            ..Self::default()
        }
    }

    /// The layout a component of `kind` gets when its model does not carry one.
    pub fn default_for(kind: &ComponentKind) -> Self {
        match kind {
            ComponentKind::List => Self::new(1.0),
            ComponentKind::Carousel | ComponentKind::Row => Self {
                dynamic_span: true,
                ..Self::default()
            },
            ComponentKind::Grid | ComponentKind::Custom(_) => Self::default(),
        }
    }

    pub fn with_inset(mut self, inset: Inset) -> Self {
        self.inset = inset;
        self
    }

    pub fn with_item_spacing(mut self, item_spacing: f64) -> Self {
        self.item_spacing = item_spacing;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: f64) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    pub fn with_span(mut self, span: f64) -> Self {
        self.span = span;
        self
    }

    pub fn with_items_per_row(mut self, items_per_row: usize) -> Self {
        self.items_per_row = items_per_row;
        self
    }

    pub fn with_show_empty_component(mut self, show: bool) -> Self {
        self.show_empty_component = show;
        self
    }

    /// Width of one span slot inside `container_width`.
    ///
    /// Returns `None` when the layout has no span.
    pub fn span_width(&self, container_width: f64) -> Option<f64> {
        if self.span <= 0.0 {
            return None;
        }
        let width = (container_width - self.inset.horizontal()) / self.span - self.item_spacing;
        Some(width.max(0.0))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Paginate {
    #[default]
    Disabled,
    Page,
    Item,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Horizontal,
    #[default]
    Vertical,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseClick {
    #[default]
    Single,
    Double,
}

/// Interaction rules for a component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interaction {
    pub paginate: Paginate,
    #[serde(rename = "scroll-direction")]
    pub scroll_direction: ScrollDirection,
    #[serde(rename = "mouseClick")]
    pub mouse_click: MouseClick,
}
