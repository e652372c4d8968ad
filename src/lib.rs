//! Content-addressable object store and reference layer in the git on-disk format
//!
//! - `areas`: repository layout, object database, references and the repository facade
//! - `artifacts`: object types and their encodings, branch names, history traversal
//! - `commands`: the plumbing commands behind the `bitstore` binary
//! - `errors`: the store error type

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

pub use areas::layout::Layout;
pub use areas::repository::Repository;
pub use errors::{Result, StoreError};
