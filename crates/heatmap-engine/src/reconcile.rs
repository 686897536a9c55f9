//! Layer reconciliation.
//!
//! The live overlay set is a tagged state: nothing, one combined layer, or
//! one layer per selected substance. [`Reconciler::reconcile`] is the only
//! way to move between those states, so the two kinds never coexist.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use heatmap_common::{HeatGradient, HeatLayerOptions, LayerKey, LayerMode};
use ingestion::Observation;

use crate::aggregate::{Aggregate, HeatPoint};
use crate::color::{combined_gradient, ColorAssigner};
use crate::selection::Selection;

/// Rendering surface that owns the painted heat layers.
pub trait HeatSurface {
    /// Opaque handle to a live layer.
    type Handle;

    fn create_layer(
        &mut self,
        key: &LayerKey,
        points: &[HeatPoint],
        gradient: &HeatGradient,
        options: &HeatLayerOptions,
    ) -> Self::Handle;

    /// Replace the point list of a live layer without tearing it down.
    fn update_layer(&mut self, handle: &mut Self::Handle, points: &[HeatPoint]);

    fn remove_layer(&mut self, handle: Self::Handle);
}

/// Currently live layers.
#[derive(Debug)]
pub enum LiveLayers<H> {
    Empty,
    Combined(H),
    PerSubstance(BTreeMap<String, H>),
}

impl<H> Default for LiveLayers<H> {
    fn default() -> Self {
        LiveLayers::Empty
    }
}

impl<H> LiveLayers<H> {
    pub fn mode(&self) -> Option<LayerMode> {
        match self {
            LiveLayers::Empty => None,
            LiveLayers::Combined(_) => Some(LayerMode::Combined),
            LiveLayers::PerSubstance(_) => Some(LayerMode::PerSubstance),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LiveLayers::Empty => 0,
            LiveLayers::Combined(_) => 1,
            LiveLayers::PerSubstance(layers) => layers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<LayerKey> {
        match self {
            LiveLayers::Empty => Vec::new(),
            LiveLayers::Combined(_) => vec![LayerKey::Combined],
            LiveLayers::PerSubstance(layers) => {
                layers.keys().map(LayerKey::substance).collect()
            }
        }
    }
}

/// One mutation applied to the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "layer", rename_all = "snake_case")]
pub enum LayerOp {
    Created(LayerKey),
    Updated(LayerKey),
    Removed(LayerKey),
}

/// Display statistics for the current view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewStats {
    /// Filtered observation count
    pub samples: usize,
    /// Distinct coordinates across the whole filtered set
    pub locations: usize,
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub mode: LayerMode,
    pub ops: Vec<LayerOp>,
    pub stats: ViewStats,
}

impl ReconcileReport {
    pub fn created(&self) -> usize {
        self.count(|op| matches!(op, LayerOp::Created(_)))
    }

    pub fn updated(&self) -> usize {
        self.count(|op| matches!(op, LayerOp::Updated(_)))
    }

    pub fn removed(&self) -> usize {
        self.count(|op| matches!(op, LayerOp::Removed(_)))
    }

    fn count(&self, pred: impl Fn(&LayerOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

/// Owns the live layer set and keeps it in line with the selection.
#[derive(Debug)]
pub struct Reconciler<H> {
    live: LiveLayers<H>,
    options: HeatLayerOptions,
}

impl<H> Reconciler<H> {
    pub fn new(options: HeatLayerOptions) -> Self {
        Self {
            live: LiveLayers::Empty,
            options,
        }
    }

    pub fn live(&self) -> &LiveLayers<H> {
        &self.live
    }

    pub fn options(&self) -> &HeatLayerOptions {
        &self.options
    }

    /// Bring the live layers in line with `selection`.
    ///
    /// `filtered` must already be filtered by `selection`. Removals are
    /// issued before creations; layers that stay are updated in place.
    pub fn reconcile<S>(
        &mut self,
        surface: &mut S,
        filtered: &[&Observation],
        selection: &Selection,
        colors: &ColorAssigner,
    ) -> ReconcileReport
    where
        S: HeatSurface<Handle = H>,
    {
        let union = Aggregate::from_observations(filtered.iter().copied());
        let stats = ViewStats {
            samples: filtered.len(),
            locations: union.locations(),
        };

        let mut ops = Vec::new();
        let previous = std::mem::take(&mut self.live);

        self.live = if selection.is_combined() {
            let points = union.points();
            let handle = match previous {
                LiveLayers::Combined(mut handle) => {
                    surface.update_layer(&mut handle, &points);
                    ops.push(LayerOp::Updated(LayerKey::Combined));
                    handle
                }
                other => {
                    remove_all(surface, other, &mut ops);
                    let handle = surface.create_layer(
                        &LayerKey::Combined,
                        &points,
                        &combined_gradient(),
                        &self.options,
                    );
                    ops.push(LayerOp::Created(LayerKey::Combined));
                    handle
                }
            };
            LiveLayers::Combined(handle)
        } else {
            let mut layers = match previous {
                LiveLayers::PerSubstance(layers) => layers,
                other => {
                    remove_all(surface, other, &mut ops);
                    BTreeMap::new()
                }
            };

            let stale: Vec<String> = layers
                .keys()
                .filter(|name| !selection.substances.contains(*name))
                .cloned()
                .collect();
            for name in stale {
                if let Some(handle) = layers.remove(&name) {
                    surface.remove_layer(handle);
                    ops.push(LayerOp::Removed(LayerKey::Substance(name)));
                }
            }

            let mut by_substance: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
            for &obs in filtered {
                by_substance.entry(obs.substance.as_str()).or_default().push(obs);
            }

            for name in &selection.substances {
                let points = Aggregate::from_observations(
                    by_substance.get(name.as_str()).into_iter().flatten().copied(),
                )
                .points();

                match layers.get_mut(name) {
                    Some(handle) => {
                        surface.update_layer(handle, &points);
                        ops.push(LayerOp::Updated(LayerKey::substance(name.as_str())));
                    }
                    None => {
                        let key = LayerKey::substance(name.as_str());
                        let handle = surface.create_layer(
                            &key,
                            &points,
                            &colors.gradient_for(name),
                            &self.options,
                        );
                        layers.insert(name.clone(), handle);
                        ops.push(LayerOp::Created(key));
                    }
                }
            }
            LiveLayers::PerSubstance(layers)
        };

        let report = ReconcileReport {
            mode: if selection.is_combined() {
                LayerMode::Combined
            } else {
                LayerMode::PerSubstance
            },
            ops,
            stats,
        };

        debug!(
            mode = ?report.mode,
            created = report.created(),
            updated = report.updated(),
            removed = report.removed(),
            samples = stats.samples,
            locations = stats.locations,
            "Reconciled heat layers"
        );

        report
    }
}

fn remove_all<S: HeatSurface>(surface: &mut S, live: LiveLayers<S::Handle>, ops: &mut Vec<LayerOp>) {
    match live {
        LiveLayers::Empty => {}
        LiveLayers::Combined(handle) => {
            surface.remove_layer(handle);
            ops.push(LayerOp::Removed(LayerKey::Combined));
        }
        LiveLayers::PerSubstance(layers) => {
            for (name, handle) in layers {
                surface.remove_layer(handle);
                ops.push(LayerOp::Removed(LayerKey::Substance(name)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Surface that only records calls.
    #[derive(Default)]
    struct Recorder {
        next: u32,
        live: Vec<u32>,
        updates: usize,
    }

    impl HeatSurface for Recorder {
        type Handle = u32;

        fn create_layer(
            &mut self,
            _key: &LayerKey,
            _points: &[HeatPoint],
            _gradient: &HeatGradient,
            _options: &HeatLayerOptions,
        ) -> u32 {
            self.next += 1;
            self.live.push(self.next);
            self.next
        }

        fn update_layer(&mut self, _handle: &mut u32, _points: &[HeatPoint]) {
            self.updates += 1;
        }

        fn remove_layer(&mut self, handle: u32) {
            self.live.retain(|h| *h != handle);
        }
    }

    fn observations() -> Vec<Observation> {
        let quarter = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        [("fentanyl", 1.0), ("xylazine", 1.0), ("fentanyl", 2.0)]
            .iter()
            .map(|&(substance, lat)| Observation {
                latitude: lat,
                longitude: 0.0,
                substance: substance.to_string(),
                quarter_start: quarter,
            })
            .collect()
    }

    fn colors() -> ColorAssigner {
        ColorAssigner::with_default_palette(&["fentanyl".to_string(), "xylazine".to_string()])
            .unwrap()
    }

    fn run(
        reconciler: &mut Reconciler<u32>,
        surface: &mut Recorder,
        data: &[Observation],
        selection: &Selection,
    ) -> ReconcileReport {
        let filtered: Vec<&Observation> = data
            .iter()
            .filter(|o| selection.is_combined() || selection.substances.contains(&o.substance))
            .collect();
        reconciler.reconcile(surface, &filtered, selection, &colors())
    }

    #[test]
    fn test_combined_created_then_updated_in_place() {
        let data = observations();
        let mut surface = Recorder::default();
        let mut reconciler = Reconciler::new(HeatLayerOptions::default());
        let selection = Selection::default();

        let first = run(&mut reconciler, &mut surface, &data, &selection);
        assert_eq!(first.ops, vec![LayerOp::Created(LayerKey::Combined)]);
        assert_eq!(first.stats, ViewStats { samples: 3, locations: 2 });

        let second = run(&mut reconciler, &mut surface, &data, &selection);
        assert_eq!(second.ops, vec![LayerOp::Updated(LayerKey::Combined)]);
        assert_eq!(surface.live.len(), 1);
        assert_eq!(surface.updates, 1);
    }

    #[test]
    fn test_switch_to_per_substance_removes_combined_first() {
        let data = observations();
        let mut surface = Recorder::default();
        let mut reconciler = Reconciler::new(HeatLayerOptions::default());
        let mut selection = Selection::default();
        run(&mut reconciler, &mut surface, &data, &selection);

        selection.toggle("xylazine");
        selection.toggle("fentanyl");
        let report = run(&mut reconciler, &mut surface, &data, &selection);

        assert_eq!(report.ops[0], LayerOp::Removed(LayerKey::Combined));
        assert_eq!(report.created(), 2);
        assert_eq!(report.mode, LayerMode::PerSubstance);
        assert_eq!(reconciler.live().mode(), Some(LayerMode::PerSubstance));
        assert_eq!(surface.live.len(), 2);
    }

    #[test]
    fn test_locations_not_double_counted() {
        let quarter = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let data: Vec<Observation> = ["fentanyl", "xylazine"]
            .iter()
            .map(|s| Observation {
                latitude: 5.0,
                longitude: 5.0,
                substance: s.to_string(),
                quarter_start: quarter,
            })
            .collect();
        let mut surface = Recorder::default();
        let mut reconciler = Reconciler::new(HeatLayerOptions::default());
        let mut selection = Selection::default();
        selection.select_all(["fentanyl", "xylazine"]);

        let report = run(&mut reconciler, &mut surface, &data, &selection);
        assert_eq!(report.stats, ViewStats { samples: 2, locations: 1 });
    }

    #[test]
    fn test_deselected_layers_removed_and_kept_updated() {
        let data = observations();
        let mut surface = Recorder::default();
        let mut reconciler = Reconciler::new(HeatLayerOptions::default());
        let mut selection = Selection::default();
        selection.select_all(["fentanyl", "xylazine"]);
        run(&mut reconciler, &mut surface, &data, &selection);

        selection.toggle("xylazine");
        let report = run(&mut reconciler, &mut surface, &data, &selection);

        assert_eq!(
            report.ops,
            vec![
                LayerOp::Removed(LayerKey::substance("xylazine")),
                LayerOp::Updated(LayerKey::substance("fentanyl")),
            ]
        );
        assert_eq!(reconciler.live().keys(), vec![LayerKey::substance("fentanyl")]);
    }

    #[test]
    fn test_back_to_combined_removes_every_substance_layer() {
        let data = observations();
        let mut surface = Recorder::default();
        let mut reconciler = Reconciler::new(HeatLayerOptions::default());
        let mut selection = Selection::default();
        selection.select_all(["fentanyl", "xylazine"]);
        run(&mut reconciler, &mut surface, &data, &selection);

        selection.clear();
        let report = run(&mut reconciler, &mut surface, &data, &selection);

        assert_eq!(report.removed(), 2);
        assert_eq!(report.ops.last(), Some(&LayerOp::Created(LayerKey::Combined)));
        assert_eq!(surface.live.len(), 1);
    }

    #[test]
    fn test_report_serialization() {
        let report = ReconcileReport {
            mode: LayerMode::Combined,
            ops: vec![LayerOp::Created(LayerKey::Combined)],
            stats: ViewStats { samples: 1, locations: 1 },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "combined");
        assert_eq!(json["ops"][0]["op"], "created");
        assert_eq!(json["stats"]["samples"], 1);
    }
}
