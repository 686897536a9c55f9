//! Selection state.
//!
//! Pure data: the substance subset, the active quarter index and the
//! all-time flag. An empty substance set means "every substance, combined".

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use heatmap_common::normalize_text;

/// Current user selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Selected normalized substance names (empty = all substances)
    pub substances: BTreeSet<String>,
    /// Index into the quarter axis
    pub quarter_index: usize,
    /// Ignore the quarter and show every sample
    pub show_all_time: bool,
}

impl Selection {
    /// Selection shown right after load: every substance, every sample, the
    /// slider parked on the most recent quarter.
    pub fn initial(axis_len: usize) -> Self {
        Self {
            substances: BTreeSet::new(),
            quarter_index: axis_len.saturating_sub(1),
            show_all_time: true,
        }
    }

    /// Add the substance if absent, remove it otherwise.
    ///
    /// Returns whether the substance is selected afterwards. Names are
    /// normalized first; names that normalize to nothing are ignored.
    pub fn toggle(&mut self, substance: &str) -> bool {
        let name = normalize_text(Some(substance));
        if name.is_empty() {
            return false;
        }
        if self.substances.remove(&name) {
            false
        } else {
            self.substances.insert(name);
            true
        }
    }

    /// Replace the substance set with `substances`.
    pub fn select_all<I, S>(&mut self, substances: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.substances = substances
            .into_iter()
            .map(|s| normalize_text(Some(s.as_ref())))
            .filter(|s| !s.is_empty())
            .collect();
    }

    pub fn clear(&mut self) {
        self.substances.clear();
    }

    /// Set the quarter index, clamped into `[0, axis_len - 1]`.
    pub fn set_quarter_index(&mut self, index: usize, axis_len: usize) {
        self.quarter_index = index.min(axis_len.saturating_sub(1));
    }

    pub fn set_show_all_time(&mut self, enabled: bool) {
        self.show_all_time = enabled;
    }

    /// Re-apply the clamp after the axis length is known.
    pub fn clamp(&mut self, axis_len: usize) {
        self.set_quarter_index(self.quarter_index, axis_len);
    }

    pub fn is_combined(&self) -> bool {
        self.substances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_selection() {
        let s = Selection::initial(12);
        assert!(s.substances.is_empty());
        assert_eq!(s.quarter_index, 11);
        assert!(s.show_all_time);
        assert_eq!(Selection::initial(0).quarter_index, 0);
    }

    #[test]
    fn test_toggle_normalizes() {
        let mut s = Selection::default();
        assert!(s.toggle("Fentanyl "));
        assert!(s.substances.contains("fentanyl"));
        assert!(!s.toggle("FENTANYL"));
        assert!(s.is_combined());
    }

    #[test]
    fn test_toggle_ignores_blank() {
        let mut s = Selection::default();
        assert!(!s.toggle("   "));
        assert!(s.substances.is_empty());
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut s = Selection::default();
        s.select_all(["xylazine", "fentanyl", "Fentanyl"]);
        assert_eq!(s.substances.len(), 2);
        s.clear();
        assert!(s.is_combined());
    }

    #[test]
    fn test_quarter_index_clamped() {
        let mut s = Selection::default();
        s.set_quarter_index(99, 4);
        assert_eq!(s.quarter_index, 3);
        s.set_quarter_index(2, 4);
        assert_eq!(s.quarter_index, 2);
        s.clamp(1);
        assert_eq!(s.quarter_index, 0);
    }
}
