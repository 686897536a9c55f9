//! Overlay layer identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a live overlay layer.
///
/// Either the single aggregate layer or one layer per substance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "substance", rename_all = "snake_case")]
pub enum LayerKey {
    Combined,
    Substance(String),
}

impl LayerKey {
    pub fn substance(name: impl Into<String>) -> Self {
        LayerKey::Substance(name.into())
    }

    /// Substance name of a per-substance key.
    pub fn substance_name(&self) -> Option<&str> {
        match self {
            LayerKey::Combined => None,
            LayerKey::Substance(name) => Some(name),
        }
    }

    pub fn mode(&self) -> LayerMode {
        match self {
            LayerKey::Combined => LayerMode::Combined,
            LayerKey::Substance(_) => LayerMode::PerSubstance,
        }
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKey::Combined => write!(f, "__combined__"),
            LayerKey::Substance(name) => write!(f, "{}", name),
        }
    }
}

/// Which kind of overlay set is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerMode {
    /// One aggregate layer over every selected (or all) substances
    Combined,
    /// One independently colored layer per selected substance
    PerSubstance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mode() {
        assert_eq!(LayerKey::Combined.mode(), LayerMode::Combined);
        assert_eq!(LayerKey::substance("xylazine").mode(), LayerMode::PerSubstance);
        assert_eq!(LayerKey::substance("xylazine").substance_name(), Some("xylazine"));
        assert_eq!(LayerKey::Combined.substance_name(), None);
    }

    #[test]
    fn test_key_serialization() {
        let json = serde_json::to_string(&LayerKey::substance("fentanyl")).unwrap();
        assert_eq!(json, r#"{"kind":"substance","substance":"fentanyl"}"#);
        let json = serde_json::to_string(&LayerKey::Combined).unwrap();
        assert_eq!(json, r#"{"kind":"combined"}"#);
    }
}
