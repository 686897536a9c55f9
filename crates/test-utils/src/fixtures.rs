//! Common test fixtures for substance heatmap tests.
//!
//! This module provides small, hand-checked datasets that represent common
//! scenarios: a clean join, county-suffixed and accented place names,
//! duplicate gazetteer entries and malformed cells.

/// Well-known gazetteer coordinates.
pub mod places {
    /// (city, state_name, population, lat, lng)
    pub type Place = (&'static str, &'static str, &'static str, &'static str, &'static str);

    pub const SPRINGFIELD_IL: Place = ("Springfield", "Illinois", "114394", "39.7990", "-89.6440");
    pub const SPRINGFIELD_IL_VILLAGE: Place = ("Springfield", "Illinois", "100", "41.0000", "-88.0000");
    pub const ST_LOUIS_MO: Place = ("St. Louis", "Missouri", "2024074", "38.6359", "-90.2451");
    pub const ESPANOLA_NM: Place = ("Española", "New Mexico", "10224", "36.0044", "-106.0686");
    pub const PHILADELPHIA_PA: Place = ("Philadelphia", "Pennsylvania", "5696588", "40.0077", "-75.1339");
}

/// Gazetteer CSV covering [`places`].
pub const GAZETTEER_CSV: &str = "\
city,state_name,population,lat,lng
Springfield,Illinois,114394,39.7990,-89.6440
Springfield,Illinois,100,41.0000,-88.0000
St. Louis,Missouri,2024074,38.6359,-90.2451
Española,New Mexico,10224,36.0044,-106.0686
Philadelphia,Pennsylvania,5696588,40.0077,-75.1339
Broken,Nowhere,1,not-a-lat,0
";

/// First records CSV: clean rows plus one unmatched and one undated row.
pub const RECORDS_OLD_CSV: &str = "\
sample_date,substances,city,state,notes
2023-02-01,['fentanyl'],Springfield,Illinois,
2023-02-15,\"['Fentanyl', 'Xylazine']\",St. Louis County,Missouri,county suffix
2023-05-03,\"['xylazine']\",Espanola,New Mexico,unaccented
2023-05-20,['fentanyl'],Atlantis,Ocean,unmatched
not-a-date,['fentanyl'],Springfield,Illinois,undated
";

/// Second records CSV: malformed substance cells and an excluded quarter.
pub const RECORDS_NEW_CSV: &str = "\
sample_date,substances,city,state
2024-01-10,\"fentanyl, medetomidine\",Philadelphia,Pennsylvania
2024-01-11,[],Philadelphia,Pennsylvania
2024-02-02,\"['Medetomidine', 'heroin'\",Philadelphia,Pennsylvania
2026-11-01,['fentanyl'],Philadelphia,Pennsylvania
";

/// Records CSV missing the `sample_date` column.
pub const RECORDS_WITHOUT_DATE_CSV: &str = "\
date,substances,city,state
2023-02-01,['fentanyl'],Springfield,Illinois
";
