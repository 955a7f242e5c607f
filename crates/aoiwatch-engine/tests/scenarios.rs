//! End-to-end sweep scenarios over the in-memory catalog.

use chrono::{TimeZone, Utc};
use serde_json::json;

use aoiwatch_catalog::client::CatalogClient;
use aoiwatch_catalog::memory::{MemoryCatalog, RecordingIngest};
use aoiwatch_core::geometry::Footprint;
use aoiwatch_core::record::{Record, RecordKind};
use aoiwatch_engine::sweep::{SweepConfig, run_sweep};
use aoiwatch_engine::tags::{CompletionStatus, GENERATED_TAG, MISSING_TAG};
use aoiwatch_engine::SweepError;

fn unit_square() -> Footprint {
    Footprint::Polygon(vec![vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
        [0.0, 0.0],
    ]])
}

fn aoi(id: &str) -> Record {
    let mut record = Record::new(id, RecordKind::AreaOfInterest);
    record.starttime = Some("2023-01-01T00:00:00Z".to_string());
    record.endtime = Some("2023-12-31T00:00:00Z".to_string());
    record.location = Some(unit_square());
    record
}

fn in_window(record: &mut Record) {
    record.starttime = Some("2023-03-01T00:00:00Z".to_string());
    record.endtime = Some("2023-03-15T00:00:00Z".to_string());
    record.location = Some(unit_square());
}

fn combination(id: &str, pair: &str, track: i64, orbits: &[i64]) -> Record {
    let mut record = Record::new(id, RecordKind::AcquisitionCombination);
    in_window(&mut record);
    record.metadata = Some(json!({
        "track_number": track,
        "orbit": orbits,
        "master_scenes": [format!("acquisition-{pair}-ref")],
        "slave_scenes": [format!("acquisition-{pair}-sec")],
    }));
    record
}

fn product(id: &str, pair: &str, track: i64, orbits: &[i64], created_day: u32) -> Record {
    let mut record = Record::new(id, RecordKind::Product);
    in_window(&mut record);
    record.created_at = Utc.with_ymd_and_hms(2023, 4, created_day, 0, 0, 0).unwrap();
    record.version = Some("v2.0.1".to_string());
    record.urls = vec![format!("http://catalog/{id}")];
    record.metadata = Some(json!({
        "track_number": track,
        "orbit": orbits,
        "secondary_date": "2023-03-01T06:00:00Z",
        "reference_date": "2023-03-13T06:00:00Z",
        "master_scenes": [format!("acquisition-{pair}-ref")],
        "slave_scenes": [format!("acquisition-{pair}-sec")],
    }));
    record
}

fn aggregate_for(label: &str, track: i64, orbits: &[i64], aoi_id: &str) -> Record {
    let mut record = Record::new(label, RecordKind::CompletedAggregate);
    record.tags = vec![aoi_id.to_string()];
    record.metadata = Some(json!({"track_number": track, "orbit": orbits}));
    record
}

fn config(root: &std::path::Path) -> SweepConfig {
    let mut config = SweepConfig::new("aoi_1");
    config.artifact_root = root.to_path_buf();
    config.remove_after_ingest = true;
    config
}

fn scenario_catalog(with_h3_product: bool) -> MemoryCatalog {
    let mut catalog = MemoryCatalog::default();
    catalog.upsert(aoi("aoi_1"));
    catalog.upsert(combination("acq-1", "h1", 42, &[100, 101]));
    catalog.upsert(combination("acq-2", "h2", 42, &[100, 101]));
    catalog.upsert(combination("acq-3", "h3", 42, &[100, 101]));
    // Duplicate h1 products differing only in created_at.
    catalog.upsert(product("p1-old", "h1", 42, &[100, 101], 1));
    catalog.upsert(product("p1-new", "h1", 42, &[100, 101], 9));
    catalog.upsert(product("p2", "h2", 42, &[100, 101], 2));
    if with_h3_product {
        catalog.upsert(product("p3", "h3", 42, &[100, 101], 3));
    }
    catalog
}

#[test]
fn scenario_a_complete_bucket_publishes_one_artifact() {
    let root = tempfile::tempdir().expect("tempdir must create");
    let mut catalog = scenario_catalog(true);
    let mut ingest = RecordingIngest::default();

    let report = run_sweep(&mut catalog, &mut ingest, &config(root.path()))
        .expect("sweep must succeed");

    assert_eq!(report.published.len(), 1);
    assert_eq!(ingest.published.len(), 1);
    assert_eq!(
        report.published[0],
        "S1-GUNW-AOI_TRACK-aoi_1-T042-20230301_20230313-v2.0"
    );

    let track = &report.tracks[0];
    assert_eq!(track.track, 42);
    assert_eq!(track.expected_combinations, 3);
    assert_eq!(track.buckets.len(), 1);
    assert!(track.buckets[0].complete);
    assert_eq!(track.buckets[0].orbit_key, "000100_000101");
}

#[test]
fn scenario_b_missing_product_tags_the_gap() {
    let root = tempfile::tempdir().expect("tempdir must create");
    let mut catalog = scenario_catalog(false);
    let mut ingest = RecordingIngest::default();

    let report = run_sweep(&mut catalog, &mut ingest, &config(root.path()))
        .expect("sweep must succeed");

    assert!(report.published.is_empty());
    assert!(ingest.published.is_empty());
    let bucket = &report.tracks[0].buckets[0];
    assert!(!bucket.complete);
    assert_eq!(bucket.missing.len(), 1);

    let missing_tags = catalog
        .current_tags(RecordKind::AcquisitionCombination, "acq-3")
        .expect("tags must read");
    assert_eq!(
        CompletionStatus::from_tags(&missing_tags),
        CompletionStatus::Missing
    );

    for id in ["acq-1", "acq-2"] {
        let tags = catalog
            .current_tags(RecordKind::AcquisitionCombination, id)
            .expect("tags must read");
        assert_eq!(CompletionStatus::from_tags(&tags), CompletionStatus::Generated);
        assert!(!tags.iter().any(|t| t == MISSING_TAG));
        assert!(tags.iter().any(|t| t == GENERATED_TAG));
    }
}

#[test]
fn scenario_c_rerun_after_publication_is_a_no_op() {
    let root = tempfile::tempdir().expect("tempdir must create");
    let mut catalog = scenario_catalog(true);
    let mut ingest = RecordingIngest::default();
    let cfg = config(root.path());

    let first = run_sweep(&mut catalog, &mut ingest, &cfg).expect("first sweep must succeed");
    assert_eq!(ingest.published.len(), 1);

    // Simulate the ingest collaborator landing the aggregate in the catalog.
    catalog.upsert(aggregate_for(&first.published[0], 42, &[100, 101], "aoi_1"));

    let second = run_sweep(&mut catalog, &mut ingest, &cfg).expect("second sweep must succeed");
    assert!(second.published.is_empty());
    assert_eq!(ingest.published.len(), 1, "builder must not run again");
    assert!(second.tracks[0].buckets[0].already_published);
}

#[test]
fn second_pass_tag_convergence_issues_no_writes() {
    let root = tempfile::tempdir().expect("tempdir must create");
    let mut catalog = scenario_catalog(false);
    let mut ingest = RecordingIngest::default();
    let cfg = config(root.path());

    run_sweep(&mut catalog, &mut ingest, &cfg).expect("first sweep must succeed");
    let second = run_sweep(&mut catalog, &mut ingest, &cfg).expect("second sweep must succeed");

    let tags = second.tracks[0].buckets[0]
        .tags
        .expect("gunw pass must report tags");
    assert_eq!(tags.updated, 0);
    assert_eq!(tags.unchanged, 3);
}

#[test]
fn every_complete_bucket_publishes_in_one_run() {
    let root = tempfile::tempdir().expect("tempdir must create");
    let mut catalog = MemoryCatalog::default();
    catalog.upsert(aoi("aoi_1"));
    catalog.upsert(combination("acq-a", "a", 42, &[100, 101]));
    catalog.upsert(combination("acq-b", "b", 42, &[200, 201]));
    catalog.upsert(product("pa", "a", 42, &[100, 101], 1));
    catalog.upsert(product("pb", "b", 42, &[200, 201], 2));
    let mut ingest = RecordingIngest::default();

    let report = run_sweep(&mut catalog, &mut ingest, &config(root.path()))
        .expect("sweep must succeed");

    // No first-complete short-circuit: both orbit buckets publish.
    assert_eq!(report.published.len(), 2);
    assert_eq!(report.tracks[0].buckets.len(), 2);
    assert!(report.tracks[0].buckets.iter().all(|b| b.complete));
}

#[test]
fn greylisted_combination_never_blocks_completeness() {
    let root = tempfile::tempdir().expect("tempdir must create");
    let mut catalog = scenario_catalog(false);
    let mut greylisted = combination("grey-h3", "h3", 42, &[100, 101]);
    greylisted.kind = RecordKind::Greylist;
    catalog.upsert(greylisted);
    let mut ingest = RecordingIngest::default();

    let report = run_sweep(&mut catalog, &mut ingest, &config(root.path()))
        .expect("sweep must succeed");

    assert!(report.tracks[0].buckets[0].complete);
    assert_eq!(report.published.len(), 1);
}

#[test]
fn unknown_aoi_is_fatal() {
    let root = tempfile::tempdir().expect("tempdir must create");
    let mut catalog = MemoryCatalog::default();
    let mut ingest = RecordingIngest::default();

    let err = run_sweep(&mut catalog, &mut ingest, &config(root.path()))
        .expect_err("missing aoi must error");
    assert!(matches!(err, SweepError::NotFoundAreaOfInterest(id) if id == "aoi_1"));
}

#[test]
fn subject_run_with_no_complete_bucket_is_fatal() {
    let root = tempfile::tempdir().expect("tempdir must create");
    let mut catalog = scenario_catalog(false);
    let mut ingest = RecordingIngest::default();
    let mut cfg = config(root.path());
    cfg.subject_hash = Some("h3-subject".to_string());

    let err = run_sweep(&mut catalog, &mut ingest, &cfg)
        .expect_err("incomplete subject run must error");
    assert!(matches!(err, SweepError::IncompleteSet(hash) if hash == "h3-subject"));
}

#[test]
fn subject_run_without_combinations_is_fatal() {
    let root = tempfile::tempdir().expect("tempdir must create");
    let mut catalog = MemoryCatalog::default();
    catalog.upsert(aoi("aoi_1"));
    let mut ingest = RecordingIngest::default();
    let mut cfg = config(root.path());
    cfg.subject_hash = Some("h1".to_string());

    let err = run_sweep(&mut catalog, &mut ingest, &cfg)
        .expect_err("subject run without combinations must error");
    assert!(matches!(err, SweepError::NoMatchingAcquisitions(id) if id == "aoi_1"));
}

#[test]
fn track_restriction_limits_the_sweep() {
    let root = tempfile::tempdir().expect("tempdir must create");
    let mut catalog = MemoryCatalog::default();
    catalog.upsert(aoi("aoi_1"));
    catalog.upsert(combination("acq-a", "a", 42, &[100]));
    catalog.upsert(combination("acq-b", "b", 7, &[200]));
    catalog.upsert(product("pa", "a", 42, &[100], 1));
    catalog.upsert(product("pb", "b", 7, &[200], 2));
    let mut ingest = RecordingIngest::default();

    let mut cfg = config(root.path());
    cfg.track = Some(7);
    let report = run_sweep(&mut catalog, &mut ingest, &cfg).expect("sweep must succeed");

    assert_eq!(report.tracks.len(), 1);
    assert_eq!(report.tracks[0].track, 7);
    assert_eq!(report.published.len(), 1);
}
