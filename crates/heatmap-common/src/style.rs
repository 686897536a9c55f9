//! Color and heat-layer style types.
//!
//! The heat-rendering primitive consumes a point list plus a
//! [`HeatLayerOptions`] and a [`HeatGradient`] that maps a normalized
//! intensity in `[0, 1]` to a color.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{HeatmapError, HeatmapResult};

/// Color value in RGBA format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Same hue with alpha scaled to `opacity` (0-1).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> HeatmapResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let channel = |i: usize| {
            digits
                .get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| HeatmapError::InvalidColor(hex.to_string()))
        };

        match digits.len() {
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(HeatmapError::InvalidColor(hex.to_string())),
        }
    }

    /// `#rrggbb`, dropping alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS `rgba(...)` form, as consumed by browser heat layers.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({},{},{},{:.2})",
            self.r,
            self.g,
            self.b,
            self.a as f32 / 255.0
        )
    }
}

/// Linear color interpolation.
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| ((a as f32 * t_inv) + (b as f32 * t)).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// A color stop in a heat gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Intensity position in `[0, 1]`
    pub position: f32,
    pub color: Color,
}

impl ColorStop {
    pub fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// Mapping from intensity position to color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatGradient {
    /// Stops in ascending position order
    pub stops: Vec<ColorStop>,
}

impl HeatGradient {
    /// Build a gradient, sorting the stops by position.
    pub fn new(mut stops: Vec<ColorStop>) -> HeatmapResult<Self> {
        if stops.len() < 2 {
            return Err(HeatmapError::InvalidConfig(
                "Gradient must have at least 2 color stops".to_string(),
            ));
        }
        if stops
            .iter()
            .any(|s| !s.position.is_finite() || !(0.0..=1.0).contains(&s.position))
        {
            return Err(HeatmapError::InvalidConfig(
                "Gradient stop positions must lie in [0, 1]".to_string(),
            ));
        }
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(Self { stops })
    }

    /// Color at an intensity, interpolating between neighbouring stops.
    pub fn color_at(&self, intensity: f32) -> Color {
        let Some(first) = self.stops.first() else {
            return Color::transparent();
        };
        if intensity <= first.position {
            return first.color;
        }

        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if intensity <= hi.position {
                let span = hi.position - lo.position;
                let t = if span > 0.0 {
                    (intensity - lo.position) / span
                } else {
                    1.0
                };
                return interpolate_color(lo.color, hi.color, t);
            }
        }

        self.stops.last().map(|s| s.color).unwrap_or(first.color)
    }

    /// Position → CSS color map, keyed by two-decimal position strings.
    pub fn to_css_map(&self) -> BTreeMap<String, String> {
        self.stops
            .iter()
            .map(|s| (format!("{:.2}", s.position), s.color.to_css()))
            .collect()
    }
}

/// Configuration handed to the heat-rendering primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatLayerOptions {
    /// Point radius in pixels
    #[serde(default = "default_radius")]
    pub radius: u32,

    /// Blur radius in pixels
    #[serde(default = "default_blur")]
    pub blur: u32,

    /// Zoom level at which points reach full intensity
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,

    /// Minimum opacity of the painted surface
    #[serde(default = "default_min_opacity")]
    pub min_opacity: f32,
}

fn default_radius() -> u32 {
    25
}

fn default_blur() -> u32 {
    15
}

fn default_max_zoom() -> u8 {
    12
}

fn default_min_opacity() -> f32 {
    0.05
}

impl Default for HeatLayerOptions {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            blur: default_blur(),
            max_zoom: default_max_zoom(),
            min_opacity: default_min_opacity(),
        }
    }
}

impl HeatLayerOptions {
    pub fn validate(&self) -> HeatmapResult<()> {
        if self.radius == 0 {
            return Err(HeatmapError::InvalidConfig("radius must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.min_opacity) {
            return Err(HeatmapError::InvalidConfig(
                "min_opacity must lie in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}
