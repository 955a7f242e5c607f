//! Bucketing: group records by track, version, and orbit-set key.
//!
//! Records missing a grouping field are skipped with a reason rather
//! than aborting the whole grouping pass; the caller decides whether a
//! skip is acceptable (bulk bucketing) or fatal (run subject).

use std::collections::{BTreeMap, BTreeSet};

use crate::error::FieldError;
use crate::record::Record;

/// Result of a grouping pass: the groups plus the records that could
/// not be placed.
#[derive(Debug, Default)]
pub struct Grouped<K: Ord> {
    pub groups: BTreeMap<K, Vec<Record>>,
    pub skipped: Vec<FieldError>,
}

/// Canonical string key for an orbit-number set.
///
/// Sorted, deduplicated, zero-padded to six digits, underscore-joined.
/// Set-equal inputs produce identical keys regardless of ordering.
pub fn orbit_set_key(orbits: &[i64]) -> String {
    let unique: BTreeSet<i64> = orbits.iter().copied().collect();
    unique
        .into_iter()
        .map(|orbit| format!("{orbit:06}"))
        .collect::<Vec<_>>()
        .join("_")
}

/// Group records by track number.
pub fn by_track(records: &[Record]) -> Grouped<i64> {
    let mut grouped = Grouped::default();
    for record in records {
        match record.track() {
            Ok(track) => grouped.groups.entry(track).or_default().push(record.clone()),
            Err(error) => grouped.skipped.push(error),
        }
    }
    grouped
}

/// Group records by track, then by normalized major version.
pub fn by_track_and_version(records: &[Record]) -> (BTreeMap<i64, BTreeMap<String, Vec<Record>>>, Vec<FieldError>) {
    let mut groups: BTreeMap<i64, BTreeMap<String, Vec<Record>>> = BTreeMap::new();
    let mut skipped = Vec::new();
    for record in records {
        let track = match record.track() {
            Ok(track) => track,
            Err(error) => {
                skipped.push(error);
                continue;
            }
        };
        let version = match record.major_version() {
            Ok(version) => version,
            Err(error) => {
                skipped.push(error);
                continue;
            }
        };
        groups
            .entry(track)
            .or_default()
            .entry(version)
            .or_default()
            .push(record.clone());
    }
    (groups, skipped)
}

/// Group records by orbit-set key.
pub fn by_orbit_key(records: &[Record]) -> Grouped<String> {
    let mut grouped = Grouped::default();
    for record in records {
        match record.orbits() {
            Ok(orbits) => grouped
                .groups
                .entry(orbit_set_key(&orbits))
                .or_default()
                .push(record.clone()),
            Err(error) => grouped.skipped.push(error),
        }
    }
    grouped
}

/// Union of track keys across several groupings.
pub fn all_tracks<'a>(groupings: impl IntoIterator<Item = &'a BTreeMap<i64, BTreeMap<String, Vec<Record>>>>) -> Vec<i64> {
    let mut tracks: BTreeSet<i64> = BTreeSet::new();
    for grouping in groupings {
        tracks.extend(grouping.keys().copied());
    }
    tracks.into_iter().collect()
}
