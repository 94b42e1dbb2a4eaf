//! Day grid geometry.

pub mod day;
pub mod sticky;

pub use day::{DayLayout, LayoutConfig, LayoutPosition, layout_day, layout_week};
pub use sticky::{StickyPlacement, StickyPositioner, Viewport};
