//! Run context document.
//!
//! Historical context files are loosely typed: numeric fields arrive as
//! numbers or as numeric strings depending on which upstream job wrote
//! them. Required fields fail the load; optional fields parse leniently
//! and fall back to `None`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use aoiwatch_core::record::RecordKind;

#[derive(Debug, Clone, Deserialize)]
pub struct RunContext {
    /// Kind of the record that triggered this run. Invalid or missing
    /// values fail the load.
    pub product_type: RecordKind,

    pub aoi_id: String,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub track_number: Option<i64>,

    #[serde(default)]
    pub version: Option<String>,

    /// Content hash of the direct run subject. When present, the sweep
    /// treats an incomplete outcome as fatal.
    #[serde(default)]
    pub content_hash: Option<String>,

    #[serde(default)]
    pub record_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub reference_orbit: Option<i64>,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub secondary_orbit: Option<i64>,
}

pub fn load(path: &Path) -> Result<RunContext, String> {
    let bytes = fs::read(path)
        .map_err(|err| format!("failed to read context file {}: {err}", path.display()))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| format!("failed to parse context json {}: {err}", path.display()))
}

/// Accept an integer, a numeric string, or nothing.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
