//! Status-tag state machine for acquisition-combination records.
//!
//! Each combination record is in exactly one completion state:
//! untagged, generated, or missing. Area-of-interest membership tags are
//! orthogonal, additive, and never touched here. The state lives in the
//! engine as an enum; the free-form tag strings exist only at the
//! catalog boundary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use aoiwatch_catalog::client::{CatalogClient, CatalogError};
use aoiwatch_core::hashkey::{HashKey, HashScheme, content_hash};
use aoiwatch_core::record::Record;

use crate::evaluate::Verdict;

/// Tag string for a combination whose product has been observed.
pub const GENERATED_TAG: &str = "generated";

/// Tag string for a combination whose product is missing.
pub const MISSING_TAG: &str = "missing";

/// Completion state of one combination record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Untagged,
    Generated,
    Missing,
}

impl CompletionStatus {
    /// Read the state out of a boundary tag set.
    ///
    /// `missing` shadows `generated` if both are somehow present, so a
    /// converging re-run repairs the record rather than ignoring it.
    pub fn from_tags(tags: &[String]) -> Self {
        if tags.iter().any(|t| t == MISSING_TAG) {
            CompletionStatus::Missing
        } else if tags.iter().any(|t| t == GENERATED_TAG) {
            CompletionStatus::Generated
        } else {
            CompletionStatus::Untagged
        }
    }

    /// The tag this state contributes at the boundary, if any.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            CompletionStatus::Untagged => None,
            CompletionStatus::Generated => Some(GENERATED_TAG),
            CompletionStatus::Missing => Some(MISSING_TAG),
        }
    }
}

/// What a tag-convergence pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    /// Records whose tag set was rewritten (one catalog call each).
    pub updated: usize,
    /// Records already in their target state (no call issued).
    pub unchanged: usize,
}

/// Converge the status tags of a bucket's combination records onto a
/// verdict.
///
/// Records whose hash is in the verdict's missing set move to `Missing`;
/// all other hashable records move to `Generated`. Each transition is a
/// single batched `set_tags` call per record, skipped entirely when the
/// record already carries the target state. Unhashable records are left
/// alone. Failures mid-loop leave earlier updates applied; a re-run
/// converges.
pub fn converge_tags<C: CatalogClient>(
    catalog: &mut C,
    expected: &[Record],
    verdict: &Verdict,
    scheme: HashScheme,
) -> Result<TagSummary, CatalogError> {
    let missing: BTreeSet<&HashKey> = match verdict {
        Verdict::Complete { .. } => BTreeSet::new(),
        Verdict::Incomplete { missing } => missing.iter().collect(),
    };

    let mut summary = TagSummary::default();
    for record in expected {
        let Some(hash) = content_hash(record, scheme) else {
            continue;
        };
        let target = if missing.contains(&hash) {
            CompletionStatus::Missing
        } else {
            CompletionStatus::Generated
        };

        let current = catalog.current_tags(record.kind, &record.id)?;
        if CompletionStatus::from_tags(&current) == target {
            summary.unchanged += 1;
            continue;
        }

        let mut tags: Vec<String> = current
            .into_iter()
            .filter(|t| t != GENERATED_TAG && t != MISSING_TAG)
            .collect();
        if let Some(tag) = target.tag() {
            tags.push(tag.to_string());
        }
        catalog.set_tags(record.kind, &record.id, tags)?;
        summary.updated += 1;
    }
    Ok(summary)
}
