//! Synthetic record generators.
//!
//! [`generate_records`] builds predictable datasets from fixed patterns so
//! that larger-scale tests can assert exact counts. The `proptest`
//! strategies draw arbitrary rows from the same places, dates and substances.

use proptest::collection::SizeRange;
use proptest::prelude::*;

use crate::fixtures::places::{self, Place};
use crate::{city_row, record_row, Row};

/// Substances drawn by the generators.
pub const SUBSTANCES: &[&str] = &[
    "Fentanyl",
    "Xylazine",
    "Medetomidine",
    "Heroin",
    "Caffeine",
    "Lidocaine",
    "4-ANPP",
    "Nitazene",
];

/// Places drawn by the generators (all present in [`gazetteer_rows`]).
pub const PLACES: &[Place] = &[
    places::SPRINGFIELD_IL,
    places::ST_LOUIS_MO,
    places::ESPANOLA_NM,
    places::PHILADELPHIA_PA,
];

/// Sample dates drawn by the generators, spanning five quarters.
pub const DATES: &[&str] = &[
    "2023-01-15",
    "2023-04-02",
    "2023-08-30",
    "2023-11-11",
    "2024-02-29",
];

/// Gazetteer rows for every place in [`PLACES`].
pub fn gazetteer_rows() -> Vec<Row> {
    PLACES
        .iter()
        .map(|(city, state, population, lat, lng)| city_row(city, state, population, lat, lng))
        .collect()
}

/// Generate `count` record rows, each with one to three substances.
///
/// Row `i` is at `PLACES[i % 4]`, dated `DATES[(i / 4) % 5]`, and lists
/// `1 + i % 3` substances starting at `SUBSTANCES[i % 8]` with a stride of 3.
pub fn generate_records(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            let (city, state, ..) = PLACES[i % PLACES.len()];
            let date = DATES[(i / PLACES.len()) % DATES.len()];
            let labels: Vec<String> = (0..1 + i % 3)
                .map(|k| format!("'{}'", SUBSTANCES[(i + 3 * k) % SUBSTANCES.len()]))
                .collect();
            record_row(date, city, state, &format!("[{}]", labels.join(", ")))
        })
        .collect()
}

/// Strategy for one matchable, dated record row with one to three distinct
/// substances.
pub fn record_row_strategy() -> impl Strategy<Value = Row> {
    (
        prop::sample::select(PLACES),
        prop::sample::select(DATES),
        prop::sample::subsequence(SUBSTANCES, 1..=3),
    )
        .prop_map(|((city, state, ..), date, labels)| {
            let quoted: Vec<String> = labels.iter().map(|s| format!("'{}'", s)).collect();
            record_row(date, city, state, &format!("[{}]", quoted.join(", ")))
        })
}

/// Strategy for a records table of `size` rows.
pub fn record_rows_strategy(size: impl Into<SizeRange>) -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(record_row_strategy(), size)
}
