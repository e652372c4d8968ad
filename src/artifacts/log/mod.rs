//! Commit history traversal for log
//!
//! - `rev_list`: on-demand ancestry walk starting from a single commit
//!
//! No commit graph is held in memory; parents are resolved through the object
//! store as the walk reaches them.

pub mod rev_list;
