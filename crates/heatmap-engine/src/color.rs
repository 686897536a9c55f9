//! Color assignment for substance layers.
//!
//! A substance's color depends only on its position in the sorted substance
//! ranking, never on what else is selected or in which order.

use std::collections::HashMap;

use heatmap_common::{Color, ColorStop, HeatGradient, HeatmapError, HeatmapResult};

/// Categorical palette cycled over the substance ranking.
pub const DEFAULT_PALETTE: &[&str] = &[
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4",
    "#f032e6", "#bfef45", "#469990", "#9a6324", "#800000", "#000075",
];

/// Ramp used by the combined layer, dark to white.
const COMBINED_RAMP: &[(f32, Color)] = &[
    (0.00, Color::new(0, 0, 4, 0)),
    (0.15, Color::rgb(27, 12, 65)),
    (0.35, Color::rgb(120, 28, 109)),
    (0.55, Color::rgb(187, 55, 84)),
    (0.75, Color::rgb(237, 105, 37)),
    (0.90, Color::rgb(252, 255, 164)),
    (1.00, Color::WHITE),
];

/// Deterministic substance → palette color mapping.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    palette: Vec<Color>,
    index: HashMap<String, i64>,
}

impl ColorAssigner {
    /// Build an assigner over the (alphabetically sorted) ranking.
    pub fn new(ranking: &[String], palette: &[&str]) -> HeatmapResult<Self> {
        let palette = palette
            .iter()
            .map(|hex| Color::from_hex(hex))
            .collect::<HeatmapResult<Vec<_>>>()?;
        if palette.is_empty() {
            return Err(HeatmapError::InvalidConfig(
                "palette must not be empty".to_string(),
            ));
        }
        let index = ranking
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i as i64))
            .collect();
        Ok(Self { palette, index })
    }

    pub fn with_default_palette(ranking: &[String]) -> HeatmapResult<Self> {
        Self::new(ranking, DEFAULT_PALETTE)
    }

    /// Palette color for `substance`.
    ///
    /// Substances outside the ranking use index -1, which wraps to the last
    /// palette entry.
    pub fn color_for(&self, substance: &str) -> Color {
        let idx = self.index.get(substance).copied().unwrap_or(-1);
        let n = self.palette.len() as i64;
        self.palette[idx.rem_euclid(n) as usize]
    }

    pub fn gradient_for(&self, substance: &str) -> HeatGradient {
        substance_gradient(self.color_for(substance))
    }
}

/// Gradient for one substance: transparent, then the color at 35% opacity,
/// then solid, then white at full intensity.
pub fn substance_gradient(color: Color) -> HeatGradient {
    HeatGradient {
        stops: vec![
            ColorStop::new(0.0, color.with_opacity(0.0)),
            ColorStop::new(0.20, color.with_opacity(0.35)),
            ColorStop::new(0.55, color),
            ColorStop::new(1.0, Color::WHITE),
        ],
    }
}

/// Gradient for the combined layer, independent of any substance color.
pub fn combined_gradient() -> HeatGradient {
    HeatGradient {
        stops: COMBINED_RAMP
            .iter()
            .map(|&(position, color)| ColorStop::new(position, color))
            .collect(),
    }
}
