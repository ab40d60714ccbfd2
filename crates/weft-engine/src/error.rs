use thiserror::Error;

use crate::model::ModelPath;

/// Caller errors against the model.
///
/// Malformed native content never produces one of these; it degrades to a
/// partial model instead.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no node at {0}")]
    PathNotFound(ModelPath),

    #[error("node at {path} is not a {expected}")]
    WrongNodeKind {
        path: ModelPath,
        expected: &'static str,
    },

    #[error("invalid model path '{0}'")]
    InvalidPath(String),

    #[error("metadata serialization failed: {0}")]
    Metadata(#[from] serde_json::Error),
}
