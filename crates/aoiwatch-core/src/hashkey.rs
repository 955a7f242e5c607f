//! Content identity: HashKey derivation from paired scene-id lists.
//!
//! Two records describing the same interferometric pair must produce the
//! same key regardless of scene ordering, singleton wrapping, or storage
//! duplication. Two digest schemes coexist in historical data; both are
//! kept behind one interface, with `PairDigest` canonical for new data.

use md5::{Digest, Md5};
use serde_json::Value;
use std::fmt;

use crate::error::HashError;
use crate::record::Record;

/// Content-identity digest for one record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashKey(pub String);

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Digest scheme used to derive a HashKey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    /// Canonical: one MD5 over the JSON 2-array of space-joined sorted
    /// scene lists.
    PairDigest,
    /// Legacy: per-half MD5 digests joined with `_`. Kept for reading
    /// fixtures hashed by older producers.
    SplitDigest,
}

impl HashScheme {
    /// Stable name persisted into aggregate-artifact metadata.
    pub fn name(&self) -> &'static str {
        match self {
            HashScheme::PairDigest => "pair-digest",
            HashScheme::SplitDigest => "split-digest",
        }
    }
}

/// The two halves of an interferometric pair, sorted and unwrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenePair {
    pub reference: Vec<String>,
    pub secondary: Vec<String>,
}

const REFERENCE_FIELDS: [&str; 2] = ["master_scenes", "reference_scenes"];
const SECONDARY_FIELDS: [&str; 2] = ["slave_scenes", "secondary_scenes"];

/// Extract the reference/secondary scene lists from a record.
///
/// Tries the top-level metadata fields first, then the nested
/// `context.input_metadata` equivalents. Returns `None` when neither
/// location holds non-empty lists of acquisition-like identifiers.
pub fn scene_pair(record: &Record) -> Option<ScenePair> {
    let reference = scene_list(record, &REFERENCE_FIELDS)?;
    let secondary = scene_list(record, &SECONDARY_FIELDS)?;
    Some(ScenePair {
        reference,
        secondary,
    })
}

fn scene_list(record: &Record, names: &[&str]) -> Option<Vec<String>> {
    for name in names {
        if let Some(list) = acquisition_list(record.metadata_field(name)) {
            return Some(list);
        }
    }
    let input = record.input_metadata()?;
    for name in names {
        if let Some(list) = acquisition_list(input.get(*name)) {
            return Some(list);
        }
    }
    None
}

/// Unwrap and validate one candidate scene list.
///
/// Each element may itself be wrapped in a 1-element list; unwrap to the
/// bare id. The list qualifies only if every id is acquisition-like.
fn acquisition_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    if items.is_empty() {
        return None;
    }
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let id = match item {
            Value::String(s) => s.as_str(),
            Value::Array(inner) => inner.first()?.as_str()?,
            _ => return None,
        };
        if !is_acquisition_id(id) {
            return None;
        }
        ids.push(id.to_string());
    }
    ids.sort();
    Some(ids)
}

fn is_acquisition_id(id: &str) -> bool {
    id.starts_with("acquisition")
}

/// Derive a HashKey for a record's scene pair.
///
/// Returns `None` when the record cannot be hashed (no usable scene
/// lists); callers bucketing a large pool log and exclude such records.
pub fn derive_hash(record: &Record, scheme: HashScheme) -> Option<HashKey> {
    let pair = scene_pair(record)?;
    let reference = pair.reference.join(" ");
    let secondary = pair.secondary.join(" ");
    let digest = match scheme {
        HashScheme::PairDigest => {
            let payload = serde_json::to_string(&[reference.as_str(), secondary.as_str()])
                .unwrap_or_else(|_| format!("[{reference:?},{secondary:?}]"));
            format!("{:x}", Md5::digest(payload.as_bytes()))
        }
        HashScheme::SplitDigest => format!(
            "{:x}_{:x}",
            Md5::digest(reference.as_bytes()),
            Md5::digest(secondary.as_bytes())
        ),
    };
    Some(HashKey(digest))
}

/// Derive a HashKey for the direct subject of a run.
///
/// Unlike [`derive_hash`], a record that cannot be hashed is an error here.
pub fn require_hash(record: &Record, scheme: HashScheme) -> Result<HashKey, HashError> {
    derive_hash(record, scheme).ok_or_else(|| HashError::MissingSceneData(record.id.clone()))
}

/// Content hash of a record, preferring a precomputed `full_id_hash`.
pub fn content_hash(record: &Record, scheme: HashScheme) -> Option<HashKey> {
    if let Some(precomputed) = record.precomputed_hash() {
        return Some(HashKey(precomputed.to_string()));
    }
    derive_hash(record, scheme)
}
