//! # aoiwatch-catalog
//!
//! The external-collaborator boundary for aoiwatch.
//!
//! The engine owns no persistent storage: every record and aggregate
//! artifact lives in an external catalog reached through the traits
//! defined here. This crate provides:
//! - `CatalogClient` (paginated search, read-modify-write tag updates)
//! - `IngestClient` (hand-off of a prepared artifact directory)
//! - `SearchFilter` (the conjunction of filters the engine needs)
//! - `MemoryCatalog` (deterministic in-memory implementation, used by
//!   tests and by JSONL-backed CLI runs)
//! - record JSONL IO

pub mod client;
pub mod filter;
pub mod jsonl;
pub mod memory;

pub use client::{
    BULK_PAGE_SIZE, CatalogClient, CatalogError, DEFAULT_PAGE_SIZE, IngestClient, Page,
};
pub use filter::{SearchFilter, TimeWindow};
pub use jsonl::{JsonlError, read_records, read_records_from_path, write_records_to_path};
pub use memory::{MemoryCatalog, RecordingIngest};
