use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating matcher configuration.
///
/// Matching itself never fails; an undeterminable value is reported as a
/// `not_found` result instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid dictionary: {0}")]
    InvalidDictionary(String),

    #[error("invalid field vocabulary: {0}")]
    InvalidVocabulary(String),
}

pub type Result<T> = std::result::Result<T, Error>;
