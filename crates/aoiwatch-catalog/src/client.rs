//! Catalog and ingest client traits.
//!
//! Implementations are expected to be blocking calls with a uniform
//! client-side timeout on every page request, the first included.

use std::path::Path;

use aoiwatch_core::record::{Record, RecordKind};

use crate::filter::SearchFilter;

/// Default page size for general queries.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page size for bulk bucketing queries.
pub const BULK_PAGE_SIZE: usize = 1000;

/// One page of search results plus the server-reported total.
#[derive(Debug, Clone)]
pub struct Page {
    pub records: Vec<Record>,
    pub total: usize,
}

/// Errors from catalog and ingest calls.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Non-2xx response or transport failure.
    #[error("catalog request failed: {0}")]
    RequestFailed(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("publish failed for {label}: {message}")]
    PublishFailed { label: String, message: String },
}

/// The search/query and tag-update surface of the external catalog.
pub trait CatalogClient {
    /// Fetch one page of results at `from` with the given page size.
    fn search_page(
        &self,
        filter: &SearchFilter,
        from: usize,
        size: usize,
    ) -> Result<Page, CatalogError>;

    /// Current tag set of a record.
    fn current_tags(&self, kind: RecordKind, id: &str) -> Result<Vec<String>, CatalogError>;

    /// Replace a record's tag set.
    ///
    /// The catalog offers no per-tag partial update, so callers compute
    /// the full new set (read-modify-write) and submit it whole.
    fn set_tags(
        &mut self,
        kind: RecordKind,
        id: &str,
        tags: Vec<String>,
    ) -> Result<(), CatalogError>;

    /// Fetch every result for a filter, following pagination.
    ///
    /// Issues follow-up requests at increasing `from` offsets until the
    /// cumulative count reaches the server-reported total. An empty
    /// follow-up page ends the loop early rather than spinning.
    fn search(&self, filter: &SearchFilter, size: usize) -> Result<Vec<Record>, CatalogError> {
        let first = self.search_page(filter, 0, size)?;
        let total = first.total;
        let mut records = first.records;
        let mut from = size;
        while records.len() < total && from < total {
            let page = self.search_page(filter, from, size)?;
            if page.records.is_empty() {
                break;
            }
            records.extend(page.records);
            from += size;
        }
        Ok(records)
    }
}

/// The job-submission surface that turns a prepared artifact directory
/// into a published record.
pub trait IngestClient {
    /// Publish the artifact directory prepared for `label`.
    fn ingest(&mut self, label: &str, artifact_dir: &Path) -> Result<(), CatalogError>;
}
