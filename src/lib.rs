//! Force-directed bubble charts: weighted items become non-overlapping circles that settle
//! inside a viewport, with settled layouts cached per chart and press gestures mapped back to
//! the caller's items.

pub mod cache;
pub mod chart;
pub mod config;
pub mod interaction;
pub mod items;
pub mod model;
pub mod physics;
pub mod render;

mod util;

pub use chart::{BubbleChart, ChartStats, LayoutPhase, TickToken};
pub use config::{ChartConfig, ChartStyle, ChartVariant};
pub use interaction::PressEvent;
pub use model::{Bubble, Category, Item, Viewport};
pub use render::{BubbleFrame, LabelFitter, PaintedBubble, Snapshot};
