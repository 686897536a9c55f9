//! Common types and utilities shared across the substance heatmap crates.

pub mod error;
pub mod layer;
pub mod style;
pub mod text;
pub mod time;

pub use error::{HeatmapError, HeatmapResult};
pub use layer::{LayerKey, LayerMode};
pub use style::{Color, ColorStop, HeatGradient, HeatLayerOptions};
pub use text::{join_key, normalize_text, JoinKey};
pub use time::{parse_sample_date, quarter_label, quarter_marks, quarter_start, QuarterStart};
