//! Interactive heatmap engine.
//!
//! Converts the current selection into overlay layer mutations:
//!
//! ```text
//! Selection ─► filter ─► aggregate (×1 or ×k) ─► reconcile ─► HeatSurface
//! ```
//!
//! - [`Selection`]: substance subset, active quarter and the all-time flag
//! - [`filter_observations`]: projects the observation set onto a selection
//! - [`Aggregate`]: per-coordinate counts and normalized heat points
//! - [`ColorAssigner`]: stable palette colors and per-substance gradients
//! - [`Reconciler`]: diffs required layers against live ones
//! - [`Explorer`]: the owned context running one full cycle per interaction

pub mod aggregate;
pub mod color;
pub mod explorer;
pub mod filter;
pub mod reconcile;
pub mod scene;
pub mod selection;

pub use aggregate::{Aggregate, HeatPoint};
pub use color::{combined_gradient, substance_gradient, ColorAssigner, DEFAULT_PALETTE};
pub use explorer::{Explorer, SubstanceEntry};
pub use filter::filter_observations;
pub use reconcile::{HeatSurface, LayerOp, LiveLayers, ReconcileReport, Reconciler, ViewStats};
pub use scene::{SceneLayer, SceneSurface};
pub use selection::Selection;
