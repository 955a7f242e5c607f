use std::path::{Path, PathBuf};

use aoiwatch_catalog::jsonl::read_records_from_path;
use aoiwatch_catalog::memory::{MemoryCatalog, RecordingIngest};
use aoiwatch_core::record::normalized_version;
use aoiwatch_engine::sweep::{SweepConfig, SweepReport, run_sweep};

use crate::cli::SchemeArg;
use crate::context;

pub fn run(
    context_path: String,
    records_path: String,
    artifacts: String,
    scheme: SchemeArg,
    json_output: bool,
) {
    let ctx = context::load(Path::new(&context_path)).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(2);
    });
    let records = read_records_from_path(&records_path).unwrap_or_else(|err| {
        eprintln!("error: failed to load records {records_path}: {err}");
        std::process::exit(2);
    });

    let mut catalog = MemoryCatalog::from_records(records);
    // Artifact directories stay on disk for the downstream ingest job.
    let mut ingest = RecordingIngest::default();

    let mut config = SweepConfig::new(&ctx.aoi_id);
    config.track = ctx.track_number;
    config.version = ctx.version.as_deref().and_then(normalized_version);
    config.subject_hash = ctx.content_hash.clone();
    config.scheme = scheme.into();
    config.artifact_root = PathBuf::from(&artifacts);

    let report = run_sweep(&mut catalog, &mut ingest, &config).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(2);
    });

    if json_output {
        let rendered = serde_json::to_string_pretty(&report).unwrap_or_else(|err| {
            eprintln!("error: failed to render sweep report: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
        return;
    }

    print_report(&report);
}

fn print_report(report: &SweepReport) {
    println!("aoiwatch evaluate");
    println!("  AOI: {}", report.aoi_id);
    for track in &report.tracks {
        println!(
            "  Track {:03}: {} expected combination(s)",
            track.track, track.expected_combinations
        );
        for bucket in &track.buckets {
            let pass = if bucket.merged { "merged" } else { "gunw" };
            let outcome = if let Some(label) = &bucket.published {
                format!("published {label}")
            } else if bucket.already_published {
                "already published".to_string()
            } else if bucket.complete {
                "complete".to_string()
            } else {
                format!("incomplete, {} missing", bucket.missing.len())
            };
            println!(
                "    [{pass}] {} {}: {outcome}",
                bucket.version, bucket.orbit_key
            );
            if let Some(tags) = &bucket.tags {
                println!(
                    "      tags: {} updated, {} unchanged",
                    tags.updated, tags.unchanged
                );
            }
        }
    }
    if !report.skipped.is_empty() {
        println!("  Skipped {} record(s):", report.skipped.len());
        for reason in &report.skipped {
            println!("    {reason}");
        }
    }
    println!("  Published: {}", report.published.len());
}
