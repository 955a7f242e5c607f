use std::fs;
use std::path::PathBuf;

use serde_json::json;

use aoiwatch_core::hashkey::{HashScheme, derive_hash};
use aoiwatch_core::record::Record;

pub fn run(record: String, json_output: bool) {
    let record_path = PathBuf::from(record);
    let bytes = fs::read(&record_path).unwrap_or_else(|err| {
        eprintln!(
            "error: failed to read record file {}: {err}",
            record_path.display()
        );
        std::process::exit(2);
    });
    let record: Record = serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        eprintln!(
            "error: failed to parse record json {}: {err}",
            record_path.display()
        );
        std::process::exit(2);
    });

    let precomputed = record.precomputed_hash();
    let pair = derive_hash(&record, HashScheme::PairDigest);
    let split = derive_hash(&record, HashScheme::SplitDigest);
    if precomputed.is_none() && pair.is_none() {
        eprintln!("error: record {} carries no scene data to hash", record.id);
        std::process::exit(2);
    }

    if json_output {
        let payload = json!({
            "id": record.id,
            "precomputed": precomputed,
            "pair_digest": pair.as_ref().map(|h| h.0.as_str()),
            "split_digest": split.as_ref().map(|h| h.0.as_str()),
        });
        let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|err| {
            eprintln!("error: failed to render hash json: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
        return;
    }

    println!("aoiwatch hash");
    println!("  Record: {}", record.id);
    if let Some(hash) = precomputed {
        println!("  Precomputed: {hash}");
    }
    if let Some(hash) = pair {
        println!("  Pair digest: {}", hash.0);
    }
    if let Some(hash) = split {
        println!("  Split digest: {}", hash.0);
    }
}
