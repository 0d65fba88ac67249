//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when user input breaks a [`JobRecord`] invariant.
//! - [`StorageCorrupt`] thrown when the data file has malformed rows.
//! - [`StorageUnavailable`] thrown when the data file cannot be read or
//!   written.
//! - [`IndexOutOfRange`] thrown when a job position does not exist.
//! - [`JobNotFound`] thrown when no job matches a project name.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`StorageCorrupt`]: EngineError::StorageCorrupt
//!  [`StorageUnavailable`]: EngineError::StorageUnavailable
//!  [`IndexOutOfRange`]: EngineError::IndexOutOfRange
//!  [`JobNotFound`]: EngineError::JobNotFound
//!  [`JobRecord`]: super::JobRecord
use std::{io, path::PathBuf};

use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Corrupt data file at line {line}: {reason}")]
    StorageCorrupt { line: u64, reason: String },
    #[error("Cannot access \"{}\": {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Job #{index} does not exist ({len} jobs stored)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("\"{0}\" job not found!")]
    JobNotFound(String),
}

impl EngineError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(line: u64, reason: impl Into<String>) -> Self {
        Self::StorageCorrupt {
            line,
            reason: reason.into(),
        }
    }

    /// Returns `true` for failures of the data file itself, the ones the
    /// front end cannot recover from.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::StorageCorrupt { .. } | Self::StorageUnavailable { .. }
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (
                Self::StorageCorrupt { line: la, reason: ra },
                Self::StorageCorrupt { line: lb, reason: rb },
            ) => la == lb && ra == rb,
            (
                Self::StorageUnavailable { path: pa, source: sa },
                Self::StorageUnavailable { path: pb, source: sb },
            ) => pa == pb && sa.kind() == sb.kind(),
            (
                Self::IndexOutOfRange { index: ia, len: la },
                Self::IndexOutOfRange { index: ib, len: lb },
            ) => ia == ib && la == lb,
            (Self::JobNotFound(a), Self::JobNotFound(b)) => a == b,
            _ => false,
        }
    }
}
