//! Error types for record field resolution, hashing, and geometry.

/// Errors raised while resolving dynamic record fields.
///
/// These are recoverable (skip + warn) when bucketing a large candidate
/// pool, and fatal when the record is the direct subject of a run.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("unable to find track for: {0}")]
    MissingTrack(String),

    #[error("unable to find orbit for: {0}")]
    MissingOrbit(String),

    #[error("unable to resolve start/end times for: {0}")]
    MissingTemporalData(String),

    #[error("unparseable timestamp {value:?} on record {id}")]
    BadTimestamp { id: String, value: String },

    #[error("record {0} carries no version")]
    MissingVersion(String),
}

/// Errors raised while deriving a content hash.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Neither the top-level scene lists nor the nested input-metadata
    /// fallback held non-empty lists of acquisition-like identifiers.
    #[error("unable to find reference/secondary scenes for: {0}")]
    MissingSceneData(String),
}

/// Errors raised while normalizing or unioning footprints.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("no footprints to union")]
    EmptyUnion,

    #[error("record {0} has no footprint")]
    MissingFootprint(String),
}
