//! # aoiwatch-engine
//!
//! The reconciliation engine: decides when a complete product set
//! exists for an (area of interest, track, orbit set) combination and
//! publishes at most one aggregate artifact per such set.
//!
//! Pipeline per evaluation run:
//! 1. bucket catalog records by track, version, and orbit set
//! 2. compare expected (acquisition combinations) against observed
//!    (deduplicated products) per bucket, greylist excluded
//! 3. converge status tags on the underlying combination records
//! 4. for complete buckets, pass the publish gate and build the
//!    aggregate artifact (label, temporal envelope, union footprint,
//!    provenance metadata), then hand it to the ingest collaborator

pub mod artifact;
pub mod error;
pub mod evaluate;
pub mod publish;
pub mod sweep;
pub mod tags;

pub use artifact::{ArtifactPayload, Dataset, build_artifact, publish_artifact};
pub use error::{ArtifactError, SweepError};
pub use evaluate::{Verdict, evaluate_bucket};
pub use publish::already_published;
pub use sweep::{BucketReport, SweepConfig, SweepReport, TrackReport, run_sweep};
pub use tags::{CompletionStatus, GENERATED_TAG, MISSING_TAG, TagSummary, converge_tags};
