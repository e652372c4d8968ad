//! Command implementations behind the `bitstore` binary
//!
//! - `plumbing`: Low-level commands for direct object and ref manipulation
//! - `porcelain`: Repository setup and history/branch listing
//!
//! Every command is a thin layer over [`Repository`](crate::areas::repository::Repository)
//! that writes its output to the given writer.

pub mod plumbing;
pub mod porcelain;
