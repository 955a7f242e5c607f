//! Aggregate artifact construction and hand-off.
//!
//! For one complete bucket this builds the deterministic label, the
//! temporal envelope, the winding-normalized union footprint, and the
//! provenance metadata payload, writes the artifact directory, and hands
//! it to the ingest collaborator. Artifacts are immutable once created;
//! re-evaluation never updates one in place.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use aoiwatch_catalog::client::IngestClient;
use aoiwatch_core::error::{FieldError, GeometryError};
use aoiwatch_core::geometry::{Footprint, normalize_footprint, union_footprints};
use aoiwatch_core::hashkey::{HashScheme, content_hash, scene_pair};
use aoiwatch_core::record::Record;

use crate::error::ArtifactError;

/// Timestamp rendering used in dataset descriptors: truncated to the day.
const DAY_FORMAT: &str = "%Y-%m-%dT00:00:00.000Z";

/// The dataset descriptor half of an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub version: String,
    pub starttime: String,
    pub endtime: String,
    pub location: Footprint,
}

/// A fully built aggregate artifact, ready to write and hand off.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactPayload {
    pub dataset: Dataset,
    pub met: Value,
}

/// Min/max acquisition times across a record set.
///
/// Every record contributes its secondary and reference times, each
/// resolved through the historical fallback chain. Fails when no record
/// yields a candidate.
pub fn temporal_envelope(records: &[Record]) -> Result<(DateTime<Utc>, DateTime<Utc>), FieldError> {
    let mut times = Vec::with_capacity(records.len() * 2);
    for record in records {
        times.push(record.secondary_time()?);
        times.push(record.reference_time()?);
    }
    let min = times.iter().min().copied();
    let max = times.iter().max().copied();
    match (min, max) {
        (Some(min), Some(max)) => Ok((min, max)),
        _ => Err(FieldError::MissingTemporalData("empty record set".to_string())),
    }
}

/// Date-pair segment of the label.
///
/// `YYYYMMDD_YYYYMMDD` from the day-truncated envelope; when both ends
/// land on the same day the orbit-set key substitutes for the pair.
pub fn date_pair(start: DateTime<Utc>, end: DateTime<Utc>, orbit_key: &str) -> String {
    let start_day = start.format(DAY_FORMAT).to_string();
    let end_day = end.format(DAY_FORMAT).to_string();
    if start_day == end_day {
        return orbit_key.to_string();
    }
    format!(
        "{}_{}",
        start.format("%Y%m%d"),
        end.format("%Y%m%d")
    )
}

/// Deterministic aggregate label.
pub fn build_label(
    prefix: &str,
    aoi_id: &str,
    track: i64,
    date_pair: &str,
    version: &str,
) -> String {
    format!("{prefix}-{aoi_id}-T{track:03}-{date_pair}-{version}")
}

/// Build the artifact for one complete bucket.
pub fn build_artifact(
    matches: &[Record],
    aoi_id: &str,
    version: &str,
    prefix: &str,
    track: i64,
    orbit_key: &str,
    scheme: HashScheme,
) -> Result<ArtifactPayload, ArtifactError> {
    let (start, end) = temporal_envelope(matches)?;
    let pair = date_pair(start, end, orbit_key);
    let label = build_label(prefix, aoi_id, track, &pair, version);

    let footprints: Vec<Footprint> = matches
        .iter()
        .map(|record| {
            record
                .location
                .clone()
                .ok_or_else(|| GeometryError::MissingFootprint(record.id.clone()))
        })
        .collect::<Result<_, _>>()?;
    let union = union_footprints(&footprints)?;
    let (location, _nonconforming) = normalize_footprint(&union);

    let dataset = Dataset {
        label: label.clone(),
        version: version.to_string(),
        starttime: start.format(DAY_FORMAT).to_string(),
        endtime: end.format(DAY_FORMAT).to_string(),
        location,
    };
    let met = build_met(matches, aoi_id, track, &pair, scheme);
    Ok(ArtifactPayload { dataset, met })
}

/// Provenance metadata payload for the aggregate.
fn build_met(matches: &[Record], aoi_id: &str, track: i64, pair: &str, scheme: HashScheme) -> Value {
    let orbits: BTreeSet<i64> = matches
        .iter()
        .filter_map(|record| record.orbits().ok())
        .flatten()
        .collect();
    let ids: Vec<&str> = matches.iter().map(|r| r.id.as_str()).collect();
    let urls: Vec<Value> = matches
        .iter()
        .map(|r| r.last_url().map(Value::from).unwrap_or(Value::Null))
        .collect();
    let hashes: Vec<Value> = matches
        .iter()
        .map(|r| {
            content_hash(r, scheme)
                .map(|h| Value::from(h.0))
                .unwrap_or(Value::Null)
        })
        .collect();
    let products: Vec<Value> = matches.iter().map(|r| product_provenance(r)).collect();

    json!({
        "track_number": track,
        "aoi": aoi_id,
        "date_pair": pair,
        "orbit": orbits.into_iter().collect::<Vec<_>>(),
        "product_ids": ids,
        "product_urls": urls,
        "products": products,
        "full_id_hash": hashes,
        "hash_scheme": scheme.name(),
    })
}

/// Per-record provenance entry: scene lists as stored at both levels,
/// orbit files from the nested input metadata, last url.
fn product_provenance(record: &Record) -> Value {
    let scenes = scene_pair(record);
    let input = record.input_metadata();
    let input_field = |name: &str| -> Value {
        input
            .and_then(|m| m.get(name))
            .cloned()
            .unwrap_or(Value::Null)
    };
    json!({
        "id": record.id,
        "url": record.last_url(),
        "reference_scenes": scenes.as_ref().map(|p| p.reference.clone()),
        "secondary_scenes": scenes.as_ref().map(|p| p.secondary.clone()),
        "input_reference_scenes": input_field("master_scenes"),
        "input_secondary_scenes": input_field("slave_scenes"),
        "reference_orbit_file": input_field("master_orbit_file"),
        "secondary_orbit_file": input_field("slave_orbit_file"),
    })
}

/// Write the artifact directory and hand it to the ingest collaborator.
///
/// The directory holds the two descriptors, `{label}.dataset.json` and
/// `{label}.met.json`. On successful ingest the directory is removed
/// when `remove_after_ingest` is set; on failure it is left in place for
/// manual resubmission and the error propagates. No automatic retry.
pub fn publish_artifact<I: IngestClient>(
    ingest: &mut I,
    root: &Path,
    payload: &ArtifactPayload,
    remove_after_ingest: bool,
) -> Result<PathBuf, ArtifactError> {
    let label = &payload.dataset.label;
    let dir = root.join(label);
    let io_err = |message: String| ArtifactError::Io {
        label: label.clone(),
        message,
    };
    fs::create_dir_all(&dir).map_err(|e| io_err(e.to_string()))?;

    let dataset_path = dir.join(format!("{label}.dataset.json"));
    let met_path = dir.join(format!("{label}.met.json"));
    let dataset = serde_json::to_string_pretty(&payload.dataset).map_err(|e| {
        ArtifactError::Serialize {
            label: label.clone(),
            message: e.to_string(),
        }
    })?;
    let met =
        serde_json::to_string_pretty(&payload.met).map_err(|e| ArtifactError::Serialize {
            label: label.clone(),
            message: e.to_string(),
        })?;
    fs::write(&dataset_path, dataset).map_err(|e| io_err(e.to_string()))?;
    fs::write(&met_path, met).map_err(|e| io_err(e.to_string()))?;

    ingest.ingest(label, &dir)?;

    if remove_after_ingest {
        fs::remove_dir_all(&dir).map_err(|e| io_err(e.to_string()))?;
    }
    Ok(dir)
}
