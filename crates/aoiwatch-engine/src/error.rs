//! Engine error taxonomy.

use aoiwatch_catalog::client::CatalogError;
use aoiwatch_core::error::{FieldError, GeometryError, HashError};

/// Errors raised while building or publishing an aggregate artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// No candidate time resolved for any constituent record.
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("artifact directory error for {label}: {message}")]
    Io { label: String, message: String },

    #[error("serialization error for {label}: {message}")]
    Serialize { label: String, message: String },

    /// Ingest hand-off refused or failed; the prepared directory is left
    /// in place for manual resubmission.
    #[error(transparent)]
    Ingest(#[from] CatalogError),
}

/// Errors raised by an evaluation run.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("found no area of interest: {0}")]
    NotFoundAreaOfInterest(String),

    #[error("more than one area of interest matches: {0}")]
    AmbiguousAreaOfInterest(String),

    #[error("no acquisition combinations match subject: {0}")]
    NoMatchingAcquisitions(String),

    /// Evaluation ran but found no complete bucket. Fatal only for a
    /// single-product run; an area-wide sweep reports it instead.
    #[error("no complete bucket found for subject: {0}")]
    IncompleteSet(String),

    /// The direct subject of the run could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The direct subject of the run was missing a required field.
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
