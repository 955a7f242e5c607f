//! Deterministic in-memory catalog.
//!
//! Canonical implementation of the client traits for tests and for CLI
//! runs hydrated from JSONL. Records are held in a BTreeMap so search
//! results come back in stable id order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use aoiwatch_core::geometry::{bboxes_overlap, bounding_box};
use aoiwatch_core::hashkey::{HashScheme, content_hash};
use aoiwatch_core::record::{Record, RecordKind, normalized_version, parse_time};

use crate::client::{CatalogClient, CatalogError, IngestClient, Page};
use crate::filter::SearchFilter;

/// In-memory catalog keyed by record id.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    records: BTreeMap<String, Record>,
}

impl MemoryCatalog {
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut index = BTreeMap::new();
        for record in records {
            index.insert(record.id.clone(), record);
        }
        Self { records: index }
    }

    /// Insert or replace a record by id.
    pub fn upsert(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.id.clone(), record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    fn matches(&self, record: &Record, filter: &SearchFilter) -> bool {
        if let Some(kind) = filter.kind
            && record.kind != kind
        {
            return false;
        }
        if let Some(id) = &filter.id
            && &record.id != id
        {
            return false;
        }
        if let Some(track) = filter.track
            && record.track().ok() != Some(track)
        {
            return false;
        }
        if let Some(version) = &filter.version {
            let normalized = record.version.as_deref().and_then(normalized_version);
            if normalized.as_deref() != Some(version.as_str()) {
                return false;
            }
        }
        if let Some(tag) = &filter.aoi_tag
            && !record.tags.iter().any(|t| t == tag)
        {
            return false;
        }
        if let Some(hashes) = &filter.hashes {
            let Some(hash) = content_hash(record, HashScheme::PairDigest) else {
                return false;
            };
            if !hashes.iter().any(|h| h == &hash.0) {
                return false;
            }
        }
        if let Some(orbit) = filter.orbit {
            match record.orbits() {
                Ok(orbits) if orbits.contains(&orbit) => {}
                _ => return false,
            }
        }
        if let Some((reference, secondary)) = filter.orbit_roles
            && !matches_orbit_roles(record, reference, secondary)
        {
            return false;
        }
        if let Some(window) = &filter.overlaps {
            let start = record.starttime.as_deref().and_then(parse_time);
            let end = record.endtime.as_deref().and_then(parse_time);
            match (start, end) {
                (Some(start), Some(end)) if window.overlaps(start, end) => {}
                _ => return false,
            }
        }
        if let Some(shape) = &filter.intersects {
            let (Some(filter_bbox), Some(record_bbox)) = (
                bounding_box(shape),
                record.location.as_ref().and_then(bounding_box),
            ) else {
                return false;
            };
            if !bboxes_overlap(&filter_bbox, &record_bbox) {
                return false;
            }
        }
        true
    }
}

/// Role-named orbit equality for combination-kind records, with a
/// fallback to plain orbit-set containment for older documents.
fn matches_orbit_roles(record: &Record, reference: i64, secondary: i64) -> bool {
    let role = |names: &[&str]| -> Option<i64> {
        names
            .iter()
            .filter_map(|name| record.metadata_field(name))
            .find_map(Value::as_i64)
    };
    let named_reference = role(&["reference_orbit", "master_orbit"]);
    let named_secondary = role(&["secondary_orbit", "slave_orbit"]);
    if let (Some(r), Some(s)) = (named_reference, named_secondary) {
        return r == reference && s == secondary;
    }
    match record.orbits() {
        Ok(orbits) => orbits.contains(&reference) && orbits.contains(&secondary),
        Err(_) => false,
    }
}

impl CatalogClient for MemoryCatalog {
    fn search_page(
        &self,
        filter: &SearchFilter,
        from: usize,
        size: usize,
    ) -> Result<Page, CatalogError> {
        let matched: Vec<&Record> = self
            .records
            .values()
            .filter(|record| self.matches(record, filter))
            .collect();
        let total = matched.len();
        let records = matched
            .into_iter()
            .skip(from)
            .take(size)
            .cloned()
            .collect();
        Ok(Page { records, total })
    }

    fn current_tags(&self, _kind: RecordKind, id: &str) -> Result<Vec<String>, CatalogError> {
        self.records
            .get(id)
            .map(|record| record.tags.clone())
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    fn set_tags(
        &mut self,
        _kind: RecordKind,
        id: &str,
        tags: Vec<String>,
    ) -> Result<(), CatalogError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        record.tags = tags;
        Ok(())
    }
}

/// Ingest stub that records what was handed to it.
///
/// With `fail_next` set it refuses the next hand-off, for exercising the
/// leave-directory-in-place path.
#[derive(Debug, Default)]
pub struct RecordingIngest {
    pub published: Vec<(String, PathBuf)>,
    pub fail_next: bool,
}

impl IngestClient for RecordingIngest {
    fn ingest(&mut self, label: &str, artifact_dir: &Path) -> Result<(), CatalogError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(CatalogError::PublishFailed {
                label: label.to_string(),
                message: "ingest refused".to_string(),
            });
        }
        self.published
            .push((label.to_string(), artifact_dir.to_path_buf()));
        Ok(())
    }
}
