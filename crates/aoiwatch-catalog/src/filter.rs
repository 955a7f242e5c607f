//! Search filters: the conjunction the engine needs from the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aoiwatch_core::geometry::Footprint;
use aoiwatch_core::record::RecordKind;

/// A `[starttime, endtime]` envelope for temporal-overlap filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub starttime: DateTime<Utc>,
    pub endtime: DateTime<Utc>,
}

impl TimeWindow {
    /// Whether `[start, end]` overlaps this window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start <= self.endtime && end >= self.starttime
    }
}

/// Conjunction of search terms. Every populated field must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Record kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,

    /// Exact record id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Spatial intersection against this footprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intersects: Option<Footprint>,

    /// Temporal overlap against this envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlaps: Option<TimeWindow>,

    /// Track number term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<i64>,

    /// Normalized major version term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Area-of-interest membership tag term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aoi_tag: Option<String>,

    /// Content hash term(s): a record matches if its hash is any of these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashes: Option<Vec<String>>,

    /// Single orbit-number equality term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit: Option<i64>,

    /// Orbit equality for combination-kind records, one term per role
    /// (reference orbit, secondary orbit).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_roles: Option<(i64, i64)>,
}

impl SearchFilter {
    /// Filter matching every record of one kind.
    pub fn for_kind(kind: RecordKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Filter matching one record by id.
    pub fn for_id(kind: RecordKind, id: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            id: Some(id.into()),
            ..Self::default()
        }
    }
}
