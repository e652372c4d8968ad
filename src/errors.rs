//! Store error types
//!
//! Every fallible operation of the object store, tree encoder, commit builder and
//! reference store reports one of these variants. The command layer wraps them in
//! `anyhow` with extra context before they reach the user.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// filesystem access failed
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// no object file exists for the id
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// stored bytes failed header, length or digest validation
    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: ObjectId, reason: String },

    /// a payload could not be decoded as its declared kind
    #[error("malformed {kind} payload: {reason}")]
    Malformed { kind: &'static str, reason: String },

    /// the object kind is not one this crate knows how to decode
    #[error("unknown object type: {0}")]
    UnknownObjectType(String),

    /// a typed read found a different kind than requested
    #[error("object {oid} is a {found}, expected a {expected}")]
    UnexpectedObjectType {
        oid: ObjectId,
        expected: String,
        found: String,
    },

    /// two tree entries share a name
    #[error("duplicate tree entry: {0}")]
    DuplicateEntry(String),

    #[error("invalid tree entry name: {0:?}")]
    InvalidEntryName(String),

    #[error("invalid object kind: {0:?}")]
    InvalidObjectKind(String),

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("invalid branch name: {0:?}")]
    InvalidBranchName(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// a ref file exists but its content is not understood
    #[error("invalid ref {name}: {reason}")]
    InvalidRef { name: String, reason: String },

    /// the branch (or HEAD) has no ref file
    #[error("ref not found: {0}")]
    RefNotFound(String),
}

impl StoreError {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(oid: &ObjectId, reason: impl Into<String>) -> Self {
        StoreError::CorruptObject {
            oid: oid.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        StoreError::Malformed {
            kind,
            reason: reason.into(),
        }
    }

    /// check if this error indicates the object or ref doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ObjectNotFound(_) | StoreError::RefNotFound(_)
        )
    }

    /// check if this error indicates damaged stored data
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            StoreError::CorruptObject { .. } | StoreError::Malformed { .. }
        )
    }
}

/// result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
