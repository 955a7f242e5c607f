//! Per-AOI evaluation sweep.
//!
//! Resolves the area of interest, pulls every candidate record that
//! intersects it spatially and temporally, and evaluates every
//! (track, version, orbit set) bucket — all of them, no short-circuit on
//! the first complete bucket. Products and merged products run as two
//! passes; tag transitions apply only during the non-merged pass.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;

use aoiwatch_catalog::client::{BULK_PAGE_SIZE, CatalogClient, DEFAULT_PAGE_SIZE, IngestClient};
use aoiwatch_catalog::filter::{SearchFilter, TimeWindow};
use aoiwatch_core::bucket::{all_tracks, by_orbit_key, by_track, by_track_and_version};
use aoiwatch_core::dedup::dedup_by_recency;
use aoiwatch_core::hashkey::{HashKey, HashScheme, content_hash};
use aoiwatch_core::record::{Record, RecordKind, parse_time};

use crate::artifact::{build_artifact, publish_artifact};
use crate::error::SweepError;
use crate::evaluate::{Verdict, evaluate_bucket};
use crate::publish::already_published;
use crate::tags::{TagSummary, converge_tags};

/// Default label prefix for aggregates over plain products.
pub const AOI_TRACK_PREFIX: &str = "S1-GUNW-AOI_TRACK";

/// Default label prefix for aggregates over merged products.
pub const MERGED_AOI_TRACK_PREFIX: &str = "S1-GUNW-MERGED-AOI_TRACK";

/// Sweep parameters, typically loaded from the run context document.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub aoi_id: String,
    /// Restrict to one track; `None` sweeps every track found.
    pub track: Option<i64>,
    /// Restrict to one normalized version; `None` sweeps every version.
    pub version: Option<String>,
    /// Content hash of a single subject product. When set, finding no
    /// complete bucket is fatal rather than informational.
    pub subject_hash: Option<String>,
    pub scheme: HashScheme,
    pub artifact_root: PathBuf,
    pub product_prefix: String,
    pub merged_prefix: String,
    pub remove_after_ingest: bool,
}

impl SweepConfig {
    pub fn new(aoi_id: impl Into<String>) -> Self {
        Self {
            aoi_id: aoi_id.into(),
            track: None,
            version: None,
            subject_hash: None,
            scheme: HashScheme::PairDigest,
            artifact_root: PathBuf::from("."),
            product_prefix: AOI_TRACK_PREFIX.to_string(),
            merged_prefix: MERGED_AOI_TRACK_PREFIX.to_string(),
            remove_after_ingest: false,
        }
    }
}

/// One evaluated (orbit set) bucket within a track × version pass.
#[derive(Debug, Clone, Serialize)]
pub struct BucketReport {
    pub orbit_key: String,
    pub version: String,
    pub merged: bool,
    pub complete: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    pub already_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagSummary>,
}

/// All buckets evaluated for one track.
#[derive(Debug, Clone, Serialize)]
pub struct TrackReport {
    pub track: i64,
    pub expected_combinations: usize,
    pub buckets: Vec<BucketReport>,
}

/// Outcome of one sweep run.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub aoi_id: String,
    pub tracks: Vec<TrackReport>,
    /// Records skipped during bucketing, with reasons.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    /// Labels of aggregates published by this run.
    pub published: Vec<String>,
}

/// Run one evaluation sweep over an area of interest.
pub fn run_sweep<C: CatalogClient, I: IngestClient>(
    catalog: &mut C,
    ingest: &mut I,
    config: &SweepConfig,
) -> Result<SweepReport, SweepError> {
    let aoi = resolve_aoi(catalog, &config.aoi_id)?;
    let base = base_filter(&aoi, config.track);

    let combinations = fetch(catalog, &base, RecordKind::AcquisitionCombination)?;
    let products = fetch(catalog, &base, RecordKind::Product)?;
    let merged = fetch(catalog, &base, RecordKind::MergedProduct)?;
    let greylist = greylist_hashes(catalog, &base, config.scheme)?;

    if config.subject_hash.is_some() && combinations.is_empty() {
        return Err(SweepError::NoMatchingAcquisitions(config.aoi_id.clone()));
    }

    let mut skipped = Vec::new();
    let combination_groups = by_track(&combinations);
    skipped.extend(combination_groups.skipped.iter().map(|e| e.to_string()));
    let (product_groups, product_skips) = by_track_and_version(&products);
    skipped.extend(product_skips.iter().map(|e| e.to_string()));
    let (merged_groups, merged_skips) = by_track_and_version(&merged);
    skipped.extend(merged_skips.iter().map(|e| e.to_string()));

    let mut report = SweepReport {
        aoi_id: config.aoi_id.clone(),
        tracks: Vec::new(),
        skipped,
        published: Vec::new(),
    };

    for track in all_tracks([&product_groups, &merged_groups]) {
        if let Some(wanted) = config.track
            && track != wanted
        {
            continue;
        }

        let expected = combination_groups
            .groups
            .get(&track)
            .cloned()
            .unwrap_or_default();
        let expected_by_orbit = by_orbit_key(&expected);
        report
            .skipped
            .extend(expected_by_orbit.skipped.iter().map(|e| e.to_string()));

        let mut track_report = TrackReport {
            track,
            expected_combinations: expected.len(),
            buckets: Vec::new(),
        };

        let product_versions = product_groups.get(&track);
        let merged_versions = merged_groups.get(&track);
        let mut versions: BTreeSet<&String> = BTreeSet::new();
        versions.extend(product_versions.into_iter().flat_map(BTreeMap::keys));
        versions.extend(merged_versions.into_iter().flat_map(BTreeMap::keys));

        for version in versions {
            if let Some(wanted) = &config.version
                && version != wanted
            {
                continue;
            }

            if let Some(observed) = product_versions.and_then(|v| v.get(version)) {
                run_pass(
                    catalog,
                    ingest,
                    config,
                    &config.aoi_id,
                    track,
                    version,
                    &expected_by_orbit.groups,
                    observed,
                    &greylist,
                    false,
                    &mut track_report,
                    &mut report.published,
                )?;
            }
            if let Some(observed) = merged_versions.and_then(|v| v.get(version)) {
                run_pass(
                    catalog,
                    ingest,
                    config,
                    &config.aoi_id,
                    track,
                    version,
                    &expected_by_orbit.groups,
                    observed,
                    &greylist,
                    true,
                    &mut track_report,
                    &mut report.published,
                )?;
            }
        }

        report.tracks.push(track_report);
    }

    if let Some(subject) = &config.subject_hash {
        let any_complete = report
            .tracks
            .iter()
            .flat_map(|t| t.buckets.iter())
            .any(|b| b.complete);
        if !any_complete {
            return Err(SweepError::IncompleteSet(subject.clone()));
        }
    }

    Ok(report)
}

/// Evaluate one track × version pass over every expected orbit bucket.
#[allow(clippy::too_many_arguments)]
fn run_pass<C: CatalogClient, I: IngestClient>(
    catalog: &mut C,
    ingest: &mut I,
    config: &SweepConfig,
    aoi_id: &str,
    track: i64,
    version: &str,
    expected_by_orbit: &BTreeMap<String, Vec<Record>>,
    observed: &[Record],
    greylist: &BTreeSet<HashKey>,
    merged: bool,
    track_report: &mut TrackReport,
    published: &mut Vec<String>,
) -> Result<(), SweepError> {
    let observed_by_orbit = by_orbit_key(observed);
    let (aggregate_kind, prefix) = if merged {
        (
            RecordKind::MergedCompletedAggregate,
            config.merged_prefix.as_str(),
        )
    } else {
        (RecordKind::CompletedAggregate, config.product_prefix.as_str())
    };

    for (orbit_key, expected) in expected_by_orbit {
        let observed_bucket = observed_by_orbit
            .groups
            .get(orbit_key)
            .map(|records| dedup_by_recency(records, config.scheme))
            .unwrap_or_default();
        let verdict = evaluate_bucket(expected, &observed_bucket, greylist, config.scheme);

        let tags = if merged {
            None
        } else {
            Some(converge_tags(catalog, expected, &verdict, config.scheme)?)
        };

        let mut bucket = BucketReport {
            orbit_key: orbit_key.clone(),
            version: version.to_string(),
            merged,
            complete: verdict.is_complete(),
            missing: Vec::new(),
            published: None,
            already_published: false,
            tags,
        };

        match &verdict {
            Verdict::Incomplete { missing } => {
                bucket.missing = missing.iter().map(|h| h.0.clone()).collect();
            }
            Verdict::Complete { matches } => {
                if already_published(catalog, aggregate_kind, prefix, track, orbit_key, aoi_id)? {
                    bucket.already_published = true;
                } else {
                    let payload = build_artifact(
                        matches,
                        aoi_id,
                        version,
                        prefix,
                        track,
                        orbit_key,
                        config.scheme,
                    )?;
                    publish_artifact(
                        ingest,
                        &config.artifact_root,
                        &payload,
                        config.remove_after_ingest,
                    )?;
                    published.push(payload.dataset.label.clone());
                    bucket.published = Some(payload.dataset.label);
                }
            }
        }

        track_report.buckets.push(bucket);
    }
    Ok(())
}

fn resolve_aoi<C: CatalogClient>(catalog: &C, aoi_id: &str) -> Result<Record, SweepError> {
    let filter = SearchFilter::for_id(RecordKind::AreaOfInterest, aoi_id);
    let mut hits = catalog.search(&filter, DEFAULT_PAGE_SIZE)?;
    match hits.len() {
        0 => Err(SweepError::NotFoundAreaOfInterest(aoi_id.to_string())),
        1 => Ok(hits.remove(0)),
        _ => Err(SweepError::AmbiguousAreaOfInterest(aoi_id.to_string())),
    }
}

/// Spatial + temporal + optional track filter derived from the AOI.
fn base_filter(aoi: &Record, track: Option<i64>) -> SearchFilter {
    let mut filter = SearchFilter::default();
    filter.intersects = aoi.location.clone();
    let start = aoi.starttime.as_deref().and_then(parse_time);
    let end = aoi.endtime.as_deref().and_then(parse_time);
    if let (Some(starttime), Some(endtime)) = (start, end) {
        filter.overlaps = Some(TimeWindow {
            starttime,
            endtime,
        });
    }
    filter.track = track;
    filter
}

fn fetch<C: CatalogClient>(
    catalog: &C,
    base: &SearchFilter,
    kind: RecordKind,
) -> Result<Vec<Record>, SweepError> {
    let mut filter = base.clone();
    filter.kind = Some(kind);
    Ok(catalog.search(&filter, BULK_PAGE_SIZE)?)
}

fn greylist_hashes<C: CatalogClient>(
    catalog: &C,
    base: &SearchFilter,
    scheme: HashScheme,
) -> Result<BTreeSet<HashKey>, SweepError> {
    let records = fetch(catalog, base, RecordKind::Greylist)?;
    Ok(records
        .iter()
        .filter_map(|record| content_hash(record, scheme))
        .collect())
}
