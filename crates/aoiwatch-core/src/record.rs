//! Record type: one catalog entry and its dynamic field resolution.
//!
//! Records arrive from an external catalog whose documents accumulated
//! several generations of field naming. Track, orbit, scene-list, and
//! timestamp lookups are therefore expressed as ordered probe chains:
//! a fixed priority list of (field name, scope) pairs tried in sequence,
//! top-level before nested metadata, first hit wins.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::FieldError;
use crate::geometry::Footprint;

/// Kinds of catalog entry the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    /// Expected input combination (the enumerator's acquisition list).
    AcquisitionCombination,
    /// An interferogram product.
    Product,
    /// A merged interferogram product.
    MergedProduct,
    /// Aggregate artifact for a complete product set.
    CompletedAggregate,
    /// Aggregate artifact for a complete merged-product set.
    MergedCompletedAggregate,
    /// Audit-trail entry.
    AuditTrail,
    /// A combination explicitly excluded from completeness requirements.
    Greylist,
    /// Area-of-interest scoping record.
    AreaOfInterest,
}

impl RecordKind {
    /// The aggregate kind published for a complete set of this kind.
    ///
    /// Only `Product` and `MergedProduct` have one.
    pub fn aggregate_kind(&self) -> Option<RecordKind> {
        match self {
            RecordKind::Product => Some(RecordKind::CompletedAggregate),
            RecordKind::MergedProduct => Some(RecordKind::MergedCompletedAggregate),
            _ => None,
        }
    }
}

/// One catalog entry.
///
/// Typed fields cover what every generation of document agrees on; the
/// rest rides in `metadata` (nested document) and `extra` (unrecognized
/// top-level fields), which the probe chains consult.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub kind: RecordKind,

    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starttime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endtime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Footprint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Where a probe looks for its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeScope {
    TopLevel,
    Metadata,
}

/// One (field name, scope) lookup strategy.
#[derive(Debug, Clone, Copy)]
pub struct FieldProbe {
    pub name: &'static str,
    pub scope: ProbeScope,
}

const TRACK_FIELDS: [&str; 4] = ["track_number", "track", "trackNumber", "track_Number"];
const ORBIT_FIELDS: [&str; 3] = ["orbit", "orbitNumber", "orbit_number"];

fn probe_chain(names: &'static [&'static str]) -> impl Iterator<Item = FieldProbe> {
    let top = names.iter().map(|name| FieldProbe {
        name,
        scope: ProbeScope::TopLevel,
    });
    let nested = names.iter().map(|name| FieldProbe {
        name,
        scope: ProbeScope::Metadata,
    });
    top.chain(nested)
}

impl Record {
    pub fn new(id: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            id: id.into(),
            kind,
            created_at: Utc::now(),
            starttime: None,
            endtime: None,
            version: None,
            location: None,
            urls: Vec::new(),
            tags: Vec::new(),
            metadata: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Resolve one probe against this record.
    pub fn probe(&self, probe: FieldProbe) -> Option<&Value> {
        match probe.scope {
            ProbeScope::TopLevel => self.extra.get(probe.name),
            ProbeScope::Metadata => self.metadata.as_ref()?.get(probe.name),
        }
    }

    /// First non-null hit across a probe chain.
    fn probe_first(&self, names: &'static [&'static str]) -> Option<&Value> {
        probe_chain(names)
            .filter_map(|p| self.probe(p))
            .find(|v| !v.is_null())
    }

    /// The metadata sub-document, if any.
    pub fn metadata_object(&self) -> Option<&serde_json::Map<String, Value>> {
        self.metadata.as_ref().and_then(Value::as_object)
    }

    /// A single field out of the metadata sub-document.
    pub fn metadata_field(&self, name: &str) -> Option<&Value> {
        self.metadata_object()?.get(name)
    }

    /// The nested `context.input_metadata` sub-document, if any.
    pub fn input_metadata(&self) -> Option<&Value> {
        self.metadata_field("context")?.get("input_metadata")
    }

    /// Track number, via the historical field-name chain.
    pub fn track(&self) -> Result<i64, FieldError> {
        self.probe_first(&TRACK_FIELDS)
            .and_then(as_i64)
            .ok_or_else(|| FieldError::MissingTrack(self.id.clone()))
    }

    /// Orbit number set, via the historical field-name chain.
    ///
    /// A bare number is treated as a singleton set.
    pub fn orbits(&self) -> Result<Vec<i64>, FieldError> {
        let value = self
            .probe_first(&ORBIT_FIELDS)
            .ok_or_else(|| FieldError::MissingOrbit(self.id.clone()))?;
        let orbits: Vec<i64> = match value {
            Value::Array(items) => items.iter().filter_map(as_i64).collect(),
            other => as_i64(other).into_iter().collect(),
        };
        if orbits.is_empty() {
            return Err(FieldError::MissingOrbit(self.id.clone()));
        }
        Ok(orbits)
    }

    /// Reference-side acquisition time, with fallback chain:
    /// `metadata.reference_date` → `metadata.sensing_stop` → `endtime`.
    pub fn reference_time(&self) -> Result<DateTime<Utc>, FieldError> {
        self.time_with_fallback(&["reference_date", "sensing_stop"], self.endtime.as_deref())
    }

    /// Secondary-side acquisition time, with fallback chain:
    /// `metadata.secondary_date` → `metadata.sensing_start` → `starttime`.
    pub fn secondary_time(&self) -> Result<DateTime<Utc>, FieldError> {
        self.time_with_fallback(&["secondary_date", "sensing_start"], self.starttime.as_deref())
    }

    fn time_with_fallback(
        &self,
        metadata_fields: &[&str],
        generic: Option<&str>,
    ) -> Result<DateTime<Utc>, FieldError> {
        let raw = metadata_fields
            .iter()
            .filter_map(|name| self.metadata_field(name))
            .filter_map(Value::as_str)
            .find(|s| !s.is_empty())
            .or(generic)
            .ok_or_else(|| FieldError::MissingTemporalData(self.id.clone()))?;
        parse_time(raw).ok_or_else(|| FieldError::BadTimestamp {
            id: self.id.clone(),
            value: raw.to_string(),
        })
    }

    /// Major.minor version, normalized: `v2.0.1` → `v2.0`.
    pub fn major_version(&self) -> Result<String, FieldError> {
        self.version
            .as_deref()
            .and_then(normalized_version)
            .ok_or_else(|| FieldError::MissingVersion(self.id.clone()))
    }

    /// Precomputed content hash carried in metadata, if present.
    pub fn precomputed_hash(&self) -> Option<&str> {
        self.metadata_field("full_id_hash")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Last entry of the record's url list, if any.
    pub fn last_url(&self) -> Option<&str> {
        self.urls.last().map(String::as_str)
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse the timestamp formats observed in catalog documents.
///
/// RFC 3339 first, then the naive `%Y-%m-%dT%H:%M:%S%.f` form (assumed UTC).
pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(t.and_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|t| t.and_utc())
}

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

/// Reduce a version string to its major.minor form, dropping subversions.
///
/// `v2.0.1` → `v2.0`, `2.0` → `2.0`. Returns `None` for strings that do
/// not look like versions at all.
pub fn normalized_version(raw: &str) -> Option<String> {
    let re = VERSION_RE.get_or_init(|| {
        Regex::new(r"^(v?)(\d+)\.(\d+)").expect("version pattern must compile")
    });
    let caps = re.captures(raw)?;
    Some(format!("{}{}.{}", &caps[1], &caps[2], &caps[3]))
}
