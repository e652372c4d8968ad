//! Plumbing commands (low-level Git operations)
//!
//! ## Commands
//!
//! - `hash-object`: Compute object ID and optionally store in database
//! - `cat-file`: Print an object's content, kind or size
//! - `mktree`: Build a tree from an ls-tree style listing
//! - `commit-tree`: Create a commit from a tree and parents
//! - `update-ref`: Point a branch at a commit
//! - `rev-parse`: Resolve a revision to an object ID

pub mod cat_file;
pub mod commit_tree;
pub mod hash_object;
pub mod mktree;
pub mod rev_parse;
pub mod update_ref;
