//! In-memory heat surface.
//!
//! Keeps every live layer as plain data so it can be serialized and painted
//! by a browser client.

use serde::Serialize;
use std::collections::BTreeMap;

use heatmap_common::{HeatGradient, HeatLayerOptions, LayerKey};

use crate::aggregate::HeatPoint;
use crate::reconcile::HeatSurface;

/// A painted layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLayer {
    pub id: u64,
    pub key: LayerKey,
    pub gradient: HeatGradient,
    pub options: HeatLayerOptions,
    pub points: Vec<HeatPoint>,
    /// Number of in-place point replacements since creation
    pub revision: u64,
}

/// Surface storing layers by handle id.
#[derive(Debug, Default)]
pub struct SceneSurface {
    next_id: u64,
    layers: BTreeMap<u64, SceneLayer>,
}

impl SceneSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live layers in creation order.
    pub fn layers(&self) -> impl Iterator<Item = &SceneLayer> {
        self.layers.values()
    }

    pub fn layer(&self, id: u64) -> Option<&SceneLayer> {
        self.layers.get(&id)
    }

    pub fn find(&self, key: &LayerKey) -> Option<&SceneLayer> {
        self.layers.values().find(|layer| &layer.key == key)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl HeatSurface for SceneSurface {
    type Handle = u64;

    fn create_layer(
        &mut self,
        key: &LayerKey,
        points: &[HeatPoint],
        gradient: &HeatGradient,
        options: &HeatLayerOptions,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.layers.insert(
            id,
            SceneLayer {
                id,
                key: key.clone(),
                gradient: gradient.clone(),
                options: options.clone(),
                points: points.to_vec(),
                revision: 0,
            },
        );
        id
    }

    fn update_layer(&mut self, handle: &mut u64, points: &[HeatPoint]) {
        if let Some(layer) = self.layers.get_mut(handle) {
            layer.points = points.to_vec();
            layer.revision += 1;
        }
    }

    fn remove_layer(&mut self, handle: u64) {
        self.layers.remove(&handle);
    }
}
