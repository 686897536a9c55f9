//! The owned interaction context.
//!
//! [`Explorer`] holds the loaded dataset, the selection, the color
//! assignment and the live layers. Every entry point mutates the selection
//! and then runs exactly one filter → aggregate → reconcile cycle.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use heatmap_common::{quarter_label, quarter_marks, HeatLayerOptions, HeatmapResult, QuarterStart};
use ingestion::{Dataset, PipelineReport};

use crate::color::ColorAssigner;
use crate::filter::filter_observations;
use crate::reconcile::{HeatSurface, LiveLayers, ReconcileReport, Reconciler, ViewStats};
use crate::selection::Selection;

/// A ranked substance as offered to a selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstanceEntry {
    pub name: String,
    /// Palette color, `#rrggbb`
    pub color: String,
    /// Observations across the whole dataset
    pub observations: usize,
    pub selected: bool,
}

/// Context running the interaction cycle against a surface.
pub struct Explorer<S: HeatSurface> {
    dataset: Dataset,
    selection: Selection,
    colors: ColorAssigner,
    reconciler: Reconciler<S::Handle>,
    surface: S,
    stats: ViewStats,
}

impl<S: HeatSurface> Explorer<S> {
    /// Build the context and paint the initial view.
    pub fn new(dataset: Dataset, surface: S, options: HeatLayerOptions) -> HeatmapResult<Self> {
        options.validate()?;
        let colors = ColorAssigner::with_default_palette(dataset.ranking())?;
        let selection = Selection::initial(dataset.quarters().len());

        let mut explorer = Self {
            dataset,
            selection,
            colors,
            reconciler: Reconciler::new(options),
            surface,
            stats: ViewStats::default(),
        };
        let report = explorer.refresh();

        info!(
            substances = explorer.dataset.ranking().len(),
            quarters = explorer.dataset.quarters().len(),
            samples = report.stats.samples,
            locations = report.stats.locations,
            "Explorer initialized"
        );
        Ok(explorer)
    }

    pub fn toggle_substance(&mut self, substance: &str) -> ReconcileReport {
        self.selection.toggle(substance);
        self.refresh()
    }

    /// Select every substance in the ranking.
    pub fn select_all(&mut self) -> ReconcileReport {
        self.selection.select_all(self.dataset.ranking());
        self.refresh()
    }

    pub fn clear_selection(&mut self) -> ReconcileReport {
        self.selection.clear();
        self.refresh()
    }

    pub fn set_quarter_index(&mut self, index: usize) -> ReconcileReport {
        self.selection
            .set_quarter_index(index, self.dataset.quarters().len());
        self.refresh()
    }

    pub fn set_show_all_time(&mut self, enabled: bool) -> ReconcileReport {
        self.selection.set_show_all_time(enabled);
        self.refresh()
    }

    /// Run one cycle against the current selection.
    pub fn refresh(&mut self) -> ReconcileReport {
        let filtered = filter_observations(
            self.dataset.observations(),
            &self.selection,
            self.dataset.quarters(),
        );
        let report = self.reconciler.reconcile(
            &mut self.surface,
            &filtered,
            &self.selection,
            &self.colors,
        );
        self.stats = report.stats;
        report
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn stats(&self) -> ViewStats {
        self.stats
    }

    pub fn ranking(&self) -> &[String] {
        self.dataset.ranking()
    }

    pub fn quarters(&self) -> &[QuarterStart] {
        self.dataset.quarters()
    }

    pub fn quarter_marks(&self) -> BTreeMap<usize, String> {
        quarter_marks(self.dataset.quarters())
    }

    pub fn report(&self) -> &PipelineReport {
        self.dataset.report()
    }

    pub fn colors(&self) -> &ColorAssigner {
        &self.colors
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn live(&self) -> &LiveLayers<S::Handle> {
        self.reconciler.live()
    }

    /// Ranked substances with their colors and selection flags.
    pub fn substances(&self) -> Vec<SubstanceEntry> {
        self.dataset
            .ranking()
            .iter()
            .map(|name| SubstanceEntry {
                name: name.clone(),
                color: self.colors.color_for(name).to_hex(),
                observations: self
                    .dataset
                    .substance_counts()
                    .get(name)
                    .copied()
                    .unwrap_or(0),
                selected: self.selection.substances.contains(name),
            })
            .collect()
    }

    /// `"Quarter: <label> | Substance: <names>"` for the current selection.
    pub fn caption(&self) -> String {
        let quarter = if self.selection.show_all_time {
            None
        } else {
            self.dataset.quarters().get(self.selection.quarter_index)
        };
        let quarter = quarter
            .map(quarter_label)
            .unwrap_or_else(|| "All samples".to_string());

        let substances = if self.selection.is_combined() {
            "All".to_string()
        } else {
            self.selection
                .substances
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!("Quarter: {} | Substance: {}", quarter, substances)
    }
}
