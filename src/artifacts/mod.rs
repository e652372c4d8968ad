//! Git data structures and algorithms
//!
//! - `branch`: Branch names and symbolic ref parsing
//! - `log`: Commit history traversal
//! - `objects`: Git object types (blob, tree, commit) and their encodings

pub mod branch;
pub mod log;
pub mod objects;
