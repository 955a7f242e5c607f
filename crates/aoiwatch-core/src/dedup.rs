//! Recency dedup: collapse records sharing a HashKey to the newest one.

use std::collections::BTreeMap;

use crate::hashkey::{HashKey, HashScheme, content_hash};
use crate::record::Record;

/// Collapse a population of records to one record per HashKey.
///
/// The most recent `created_at` wins. On an exact timestamp tie the
/// record later in input order is retained, so repeated application over
/// the same input is stable. Records that cannot be hashed are excluded.
pub fn dedup_by_recency(records: &[Record], scheme: HashScheme) -> BTreeMap<HashKey, Record> {
    let mut deduped: BTreeMap<HashKey, Record> = BTreeMap::new();
    for record in records {
        let Some(key) = content_hash(record, scheme) else {
            continue;
        };
        match deduped.get(&key) {
            Some(existing) if record.created_at < existing.created_at => {}
            _ => {
                deduped.insert(key, record.clone());
            }
        }
    }
    deduped
}
