use thiserror::Error;

use crate::core::FilterPath;

/// Local, non-fatal failures of the filter tree model.
///
/// These never reach the end user; the editor session logs them and keeps its
/// current tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterTreeError {
    #[error("no filter at path `{path}`")]
    PathNotFound { path: FilterPath },

    #[error("invalid mutation: {reason}")]
    InvalidMutation { reason: String },

    #[error("invalid filter path `{raw}`")]
    InvalidPath { raw: String },
}

impl FilterTreeError {
    pub(crate) fn path_not_found(path: &FilterPath) -> Self {
        Self::PathNotFound { path: path.clone() }
    }

    pub(crate) fn invalid_mutation(reason: impl Into<String>) -> Self {
        Self::InvalidMutation { reason: reason.into() }
    }
}

pub type Result<T, E = FilterTreeError> = std::result::Result<T, E>;
