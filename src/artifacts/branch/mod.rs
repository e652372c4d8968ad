//! Branch and symbolic ref names

pub mod branch_name;

pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

/// Matches the content of a symbolic ref file such as HEAD
pub const SYMREF_REGEX: &str = r"^ref: (.+)$";
