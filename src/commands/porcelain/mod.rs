//! Porcelain commands (user-facing Git operations)
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository
//! - `branch`: List branches
//! - `log`: Show commit history

pub mod branch;
pub mod init;
pub mod log;
