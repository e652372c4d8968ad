//! Core repository components
//!
//! - `layout`: Directory names, default branch and repository initialization
//! - `database`: Object database for storing blobs, trees, and commits
//! - `refs`: Reference management (branches, HEAD)
//! - `repository`: High-level repository operations and coordination

pub mod database;
pub mod layout;
pub mod refs;
pub mod repository;
