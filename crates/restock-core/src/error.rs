use std::path::PathBuf;

use thiserror::Error;

/// Failure of one forecast run, tagged with the stage that produced it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot reach data store {target}: {reason}")]
    Connection { target: String, reason: String },

    #[error("query against {relation} failed: {reason}")]
    Query { relation: String, reason: String },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl PipelineError {
    /// Operator-facing stage tag.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connect",
            Self::Query { .. } => "query",
            Self::Transform(_) => "transform",
            Self::Publish(_) => "publish",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("usage record for {code:?} has an unparsable date {value:?}")]
    UnparsableDate { code: String, value: String },

    #[error("no complete year between {start_year} and {current_year} to average over")]
    EmptyAverageWindow { start_year: i32, current_year: i32 },

    #[error("forecast for {code:?} does not fit in a whole-number column")]
    QuantityOverflow { code: String },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to serialize model table: {reason}")]
    Serialize { reason: String },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("upload to {destination} rejected with status {status}")]
    Upload { destination: String, status: u16 },

    #[error("upload to {destination} failed: {reason}")]
    Http { destination: String, reason: String },
}
