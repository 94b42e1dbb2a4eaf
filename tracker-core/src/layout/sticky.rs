//! Keeps sticky markers inside the visible part of a scrolling day column.
//!
//! Markers that naturally sit before the bias boundary (local midday by
//! default) are only ever pulled down to the top edge; later markers are only
//! ever pushed up to the bottom edge. Markers already inside the window never
//! move. Everything here is recomputed from scratch on each scroll or resize.

use serde::Serialize;

use crate::layout::day::{DayLayout, LayoutPosition};

/// The visible part of a day column, in grid pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub scroll_offset: f64,
    pub container_height: f64,
}

impl Viewport {
    pub fn new(scroll_offset: f64, container_height: f64) -> Self {
        Viewport {
            scroll_offset,
            container_height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StickyEdge {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StackOrder {
    Normal,
    /// Drawn above unclamped events so it stays clickable
    Elevated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyPlacement {
    pub event_id: String,
    pub display_top: f64,
    pub height: f64,
    /// Edge the marker was clamped to, if any
    pub clamped: Option<StickyEdge>,
    pub stack: StackOrder,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickyPositioner {
    margin: f64,
    /// Natural tops below this pixel offset are top-biased
    boundary_top: f64,
}

impl StickyPositioner {
    pub fn new(margin: f64, boundary_top: f64) -> Self {
        StickyPositioner {
            margin,
            boundary_top,
        }
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn boundary_top(&self) -> f64 {
        self.boundary_top
    }

    /// Display top for a marker, and the edge it was clamped to.
    pub fn display_top(
        &self,
        natural_top: f64,
        height: f64,
        viewport: &Viewport,
    ) -> (f64, Option<StickyEdge>) {
        let min_top = viewport.scroll_offset + self.margin;
        let max_top = viewport.scroll_offset + viewport.container_height - height - self.margin;

        if natural_top < self.boundary_top {
            if natural_top < min_top {
                return (min_top, Some(StickyEdge::Top));
            }
        } else if natural_top > max_top {
            return (max_top, Some(StickyEdge::Bottom));
        }

        (natural_top, None)
    }

    pub fn place(&self, position: &LayoutPosition, viewport: &Viewport) -> StickyPlacement {
        let (display_top, clamped) = self.display_top(position.top, position.height, viewport);
        StickyPlacement {
            event_id: position.event_id.clone(),
            display_top,
            height: position.height,
            clamped,
            stack: if clamped.is_some() {
                StackOrder::Elevated
            } else {
                StackOrder::Normal
            },
        }
    }

    /// Same margin, different bias boundary.
    pub fn with_boundary_top(&self, boundary_top: f64) -> Self {
        StickyPositioner {
            boundary_top,
            ..*self
        }
    }

    /// Placements for every sticky position of `layout`; others are left alone.
    ///
    /// The boundary is taken from the layout, which knows where the local
    /// bias hour falls on days with a DST transition.
    pub fn place_day(&self, layout: &DayLayout, viewport: &Viewport) -> Vec<StickyPlacement> {
        let positioner = self.with_boundary_top(layout.bias_top);
        layout
            .positions
            .iter()
            .filter(|p| p.sticky)
            .map(|p| positioner.place(p, viewport))
            .collect()
    }
}
