//! Completeness evaluation: expected vs. observed hash sets per bucket.

use std::collections::{BTreeMap, BTreeSet};

use aoiwatch_core::hashkey::{HashKey, HashScheme, content_hash};
use aoiwatch_core::record::Record;

/// Outcome of evaluating one (track, orbit set) bucket.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// Every expected hash has an observed product. Carries the observed
    /// records matched to the expected hashes, in hash order.
    Complete { matches: Vec<Record> },
    /// One or more expected hashes have no observed product.
    Incomplete { missing: Vec<HashKey> },
}

impl Verdict {
    pub fn is_complete(&self) -> bool {
        matches!(self, Verdict::Complete { .. })
    }
}

/// Compare an expected bucket against the deduplicated observed view.
///
/// Greylisted hashes are removed from `expected` before the comparison,
/// so a greylisted combination can never block completeness. Expected
/// records that cannot be hashed are excluded (logged upstream by the
/// bucketing pass). The bucket is complete iff every surviving expected
/// hash appears in `observed`; otherwise the verdict carries exactly
/// `expected − observed` as the missing set.
pub fn evaluate_bucket(
    expected: &[Record],
    observed: &BTreeMap<HashKey, Record>,
    greylist: &BTreeSet<HashKey>,
    scheme: HashScheme,
) -> Verdict {
    let mut expected_hashes: BTreeMap<HashKey, &Record> = BTreeMap::new();
    for record in expected {
        if let Some(hash) = content_hash(record, scheme)
            && !greylist.contains(&hash)
        {
            expected_hashes.insert(hash, record);
        }
    }

    let missing: Vec<HashKey> = expected_hashes
        .keys()
        .filter(|hash| !observed.contains_key(hash))
        .cloned()
        .collect();

    if missing.is_empty() {
        let matches = expected_hashes
            .keys()
            .filter_map(|hash| observed.get(hash).cloned())
            .collect();
        Verdict::Complete { matches }
    } else {
        Verdict::Incomplete { missing }
    }
}
