//! Publish gate: at-most-once aggregate creation per (track, orbit set,
//! area of interest).
//!
//! This is a check-then-act gate, not a transaction. Under two racing
//! evaluator runs at-most-one publication is best effort; callers that
//! need a hard guarantee serialize evaluation per triple externally.

use aoiwatch_catalog::client::{BULK_PAGE_SIZE, CatalogClient, CatalogError};
use aoiwatch_catalog::filter::SearchFilter;
use aoiwatch_core::bucket::orbit_set_key;
use aoiwatch_core::record::RecordKind;

/// Whether an aggregate artifact already exists for this bucket.
///
/// Queries the catalog for aggregates of the given kind with matching
/// track and area-of-interest tag, then compares orbit sets and label
/// prefix locally. A hit makes the whole pipeline idempotent under
/// re-evaluation: the caller skips the builder entirely.
pub fn already_published<C: CatalogClient>(
    catalog: &C,
    aggregate_kind: RecordKind,
    prefix: &str,
    track: i64,
    orbit_key: &str,
    aoi_id: &str,
) -> Result<bool, CatalogError> {
    let mut filter = SearchFilter::for_kind(aggregate_kind);
    filter.track = Some(track);
    filter.aoi_tag = Some(aoi_id.to_string());
    let existing = catalog.search(&filter, BULK_PAGE_SIZE)?;

    Ok(existing.iter().any(|record| {
        let same_orbits = record
            .orbits()
            .map(|orbits| orbit_set_key(&orbits) == orbit_key)
            .unwrap_or(false);
        same_orbits && record.id.starts_with(prefix)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aoiwatch_catalog::memory::MemoryCatalog;
    use aoiwatch_core::record::Record;
    use serde_json::json;

    fn aggregate(id: &str, track: i64, orbits: &[i64], aoi: &str) -> Record {
        let mut record = Record::new(id, RecordKind::CompletedAggregate);
        record.tags = vec![aoi.to_string()];
        record.metadata = Some(json!({"track_number": track, "orbit": orbits}));
        record
    }

    #[test]
    fn gate_opens_when_no_aggregate_exists() {
        let catalog = MemoryCatalog::default();
        let published = already_published(
            &catalog,
            RecordKind::CompletedAggregate,
            "S1-GUNW-AOI_TRACK",
            42,
            "000100_000101",
            "aoi_1",
        )
        .expect("gate query must succeed");
        assert!(!published);
    }

    #[test]
    fn gate_closes_on_matching_track_orbits_and_aoi() {
        let catalog = MemoryCatalog::from_records(vec![aggregate(
            "S1-GUNW-AOI_TRACK-aoi_1-T042-x-v2.0",
            42,
            &[101, 100],
            "aoi_1",
        )]);
        let published = already_published(
            &catalog,
            RecordKind::CompletedAggregate,
            "S1-GUNW-AOI_TRACK",
            42,
            "000100_000101",
            "aoi_1",
        )
        .expect("gate query must succeed");
        assert!(published);
    }

    #[test]
    fn gate_ignores_other_orbit_sets_and_aois() {
        let catalog = MemoryCatalog::from_records(vec![
            aggregate("S1-GUNW-AOI_TRACK-aoi_1-T042-a-v2.0", 42, &[200], "aoi_1"),
            aggregate("S1-GUNW-AOI_TRACK-aoi_2-T042-b-v2.0", 42, &[100, 101], "aoi_2"),
        ]);
        let published = already_published(
            &catalog,
            RecordKind::CompletedAggregate,
            "S1-GUNW-AOI_TRACK",
            42,
            "000100_000101",
            "aoi_1",
        )
        .expect("gate query must succeed");
        assert!(!published);
    }
}
