//! Filter engine: projects the observation set onto a selection.

use heatmap_common::QuarterStart;
use ingestion::Observation;

use crate::selection::Selection;

/// Observations matching `selection`, in source order.
///
/// A non-empty substance set keeps only its members; unless
/// `show_all_time` is set, only observations in the selected quarter are
/// kept. A quarter index outside `axis` matches nothing.
pub fn filter_observations<'a>(
    observations: &'a [Observation],
    selection: &Selection,
    axis: &[QuarterStart],
) -> Vec<&'a Observation> {
    let quarter = if selection.show_all_time {
        None
    } else {
        match axis.get(selection.quarter_index) {
            Some(q) => Some(*q),
            None => return Vec::new(),
        }
    };

    observations
        .iter()
        .filter(|obs| selection.is_combined() || selection.substances.contains(&obs.substance))
        .filter(|obs| quarter.map_or(true, |q| obs.quarter_start == q))
        .collect()
}
