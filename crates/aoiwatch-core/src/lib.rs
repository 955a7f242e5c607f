//! # aoiwatch-core
//!
//! Data model and identity layer for aoiwatch.
//!
//! This crate provides:
//! - `Record` and `RecordKind` (the catalog entry model)
//! - content-hash derivation from paired scene-id lists (`hashkey`)
//! - recency dedup over hash populations (`dedup`)
//! - track/orbit-set bucketing for set comparison (`bucket`)
//! - footprint winding normalization and union (`geometry`)
//!
//! It intentionally holds no persistent state and talks to no services.
//! The catalog boundary lives in `aoiwatch-catalog`; the reconciliation
//! engine that consumes these types lives in `aoiwatch-engine`.

pub mod bucket;
pub mod dedup;
pub mod error;
pub mod geometry;
pub mod hashkey;
pub mod record;

pub use bucket::{
    Grouped, all_tracks, by_orbit_key, by_track, by_track_and_version, orbit_set_key,
};
pub use dedup::dedup_by_recency;
pub use error::{FieldError, GeometryError, HashError};
pub use geometry::{Footprint, Ring, fix_footprint, normalize_footprint, signed_area};
pub use hashkey::{HashKey, HashScheme, content_hash, derive_hash, require_hash};
pub use record::{Record, RecordKind, normalized_version, parse_time};
