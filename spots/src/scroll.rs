use std::cmp;
use std::ops::Range;

use crate::fenwick::Fenwick;
use crate::{ComponentFrame, Inset, Size};

/// Direction of the last content-offset change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollMotion {
    Forward,
    Backward,
}

/// An edge of the stacked content that the viewport just arrived at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollEdge {
    Beginning,
    End,
}

/// Stacks components vertically inside one viewport.
///
/// Component heights are kept in a Fenwick tree, so offset → component lookups and
/// per-component updates stay `O(log n)`.
#[derive(Clone, Debug, Default)]
pub struct ScrollView {
    bounds: Size,
    inset: Inset,
    content_offset: f64,
    motion: Option<ScrollMotion>,
    heights: Vec<f64>,
    sums: Fenwick,
    stretch_last_component: bool,
    at_beginning: bool,
    at_end: bool,
}

impl ScrollView {
    pub fn new(bounds: Size) -> Self {
        Self {
            bounds,
            at_beginning: true,
            ..Self::default()
        }
    }

    pub fn with_inset(mut self, inset: Inset) -> Self {
        self.inset = inset;
        self
    }

    pub fn with_stretch_last_component(mut self, stretch: bool) -> Self {
        self.stretch_last_component = stretch;
        self
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Size) {
        self.bounds = bounds;
        self.content_offset = self.clamp_offset(self.content_offset);
    }

    pub fn inset(&self) -> Inset {
        self.inset
    }

    pub fn content_offset(&self) -> f64 {
        self.content_offset
    }

    pub fn motion(&self) -> Option<ScrollMotion> {
        self.motion
    }

    pub fn component_count(&self) -> usize {
        self.heights.len()
    }

    /// Replaces every component height. Unchanged heights keep the existing tree.
    pub fn set_component_heights(&mut self, heights: &[f64]) {
        if self.heights == heights {
            return;
        }
        strace!(count = heights.len(), "ScrollView::set_component_heights");
        self.heights = heights.to_vec();
        self.sums = Fenwick::from_sizes(&self.heights);
        self.content_offset = self.clamp_offset(self.content_offset);
    }

    pub fn set_component_height(&mut self, index: usize, height: f64) {
        let Some(current) = self.heights.get_mut(index) else {
            return;
        };
        let height = height.max(0.0);
        let delta = height - *current;
        if delta == 0.0 {
            return;
        }
        *current = height;
        self.sums.add(index, delta);
    }

    pub fn component_height(&self, index: usize) -> Option<f64> {
        self.heights.get(index).copied()
    }

    /// Offset of the component's top edge in the stacked content.
    pub fn component_start(&self, index: usize) -> Option<f64> {
        if index >= self.heights.len() {
            return None;
        }
        Some(self.inset.top + self.sums.prefix_sum(index))
    }

    pub fn content_height(&self) -> f64 {
        self.sums
            .total()
            .max(self.bounds.height - self.inset.vertical())
    }

    pub fn max_offset(&self) -> f64 {
        (self.content_height() + self.inset.vertical() - self.bounds.height).max(0.0)
    }

    pub fn clamp_offset(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_offset())
    }

    /// Index of the component covering `offset`, clamped to the last component.
    pub fn component_at_offset(&self, offset: f64) -> Option<usize> {
        let count = self.heights.len();
        if count == 0 {
            return None;
        }
        let target = (offset - self.inset.top).max(0.0);
        Some(cmp::min(self.sums.lower_bound(target), count - 1))
    }

    /// Components intersecting the viewport.
    pub fn visible_range(&self) -> Range<usize> {
        let Some(start) = self.component_at_offset(self.content_offset) else {
            return 0..0;
        };
        if self.bounds.height <= 0.0 {
            return start..start;
        }
        let mut end = start;
        let bottom = self.content_offset + self.bounds.height;
        while end < self.heights.len() {
            let Some(top) = self.component_start(end) else {
                break;
            };
            if top >= bottom {
                break;
            }
            end += 1;
        }
        start..end.max(start + 1).min(self.heights.len())
    }

    /// Moves the viewport, returning the edge it newly arrived at, if any.
    pub fn set_content_offset(&mut self, offset: f64) -> Option<ScrollEdge> {
        let offset = self.clamp_offset(offset);
        if offset != self.content_offset {
            self.motion = Some(if offset > self.content_offset {
                ScrollMotion::Forward
            } else {
                ScrollMotion::Backward
            });
            self.content_offset = offset;
        }

        let at_beginning = self.content_offset <= 0.0;
        let at_end = !self.heights.is_empty() && self.content_offset >= self.max_offset();
        let newly_at_beginning = at_beginning && !self.at_beginning;
        let newly_at_end = at_end && !self.at_end;
        self.at_beginning = at_beginning;
        self.at_end = at_end;

        match self.motion {
            Some(ScrollMotion::Forward) if newly_at_end => Some(ScrollEdge::End),
            Some(ScrollMotion::Backward) if newly_at_beginning => Some(ScrollEdge::Beginning),
            _ => None,
        }
    }

    /// Frames for every stacked component at the current content offset.
    ///
    /// A component scrolled past the top is pinned to the viewport's top edge and scrolls its
    /// own content instead; its frame never exceeds the remaining viewport or content.
    pub fn layout_views(&self) -> Vec<ComponentFrame> {
        let offset = self.content_offset;
        let bottom = offset + self.bounds.height;
        let last = self.heights.len().saturating_sub(1);
        let mut y = self.inset.top;

        self.heights
            .iter()
            .enumerate()
            .map(|(index, &height)| {
                let (origin_y, content_offset_y) = if offset < y {
                    (y, 0.0)
                } else {
                    (offset, offset - y)
                };
                let remaining_bounds = (bottom - origin_y).max(0.0);
                let remaining_content = (height - content_offset_y).max(0.0);
                let mut frame_height = remaining_bounds.min(remaining_content).ceil();
                if self.stretch_last_component && index == last {
                    frame_height = frame_height.max(remaining_bounds.ceil());
                }
                y += height;
                ComponentFrame {
                    index,
                    origin_y,
                    height: frame_height,
                    content_offset_y,
                }
            })
            .collect()
    }
}
