use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Result, StoreError};

/// Type and permission bits of a tree entry
///
/// Modes outside the known set are carried through untouched as `Other`.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum EntryMode {
    Regular,
    Executable,
    Symlink,
    Directory,
    Submodule,
    Other(u32),
}

impl EntryMode {
    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::Regular => 0o100644,
            EntryMode::Executable => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Directory => 0o40000,
            EntryMode::Submodule => 0o160000,
            EntryMode::Other(mode) => *mode,
        }
    }

    /// Unpadded octal text, as written inside tree objects (`40000`, not `040000`)
    pub fn to_octal_string(&self) -> String {
        format!("{:o}", self.as_u32())
    }

    pub fn from_octal_str(value: &str) -> Result<Self> {
        if value.is_empty() || !value.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return Err(StoreError::malformed(
                "tree",
                format!("invalid entry mode {value:?}"),
            ));
        }

        u32::from_str_radix(value, 8)
            .map(EntryMode::from)
            .map_err(|err| StoreError::malformed("tree", err.to_string()))
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    /// The kind of object an entry with this mode points at
    pub fn object_type(&self) -> ObjectType {
        match self {
            EntryMode::Directory => ObjectType::Tree,
            EntryMode::Submodule => ObjectType::Commit,
            _ => ObjectType::Blob,
        }
    }
}

impl From<u32> for EntryMode {
    fn from(mode: u32) -> Self {
        match mode {
            0o100644 => EntryMode::Regular,
            0o100755 => EntryMode::Executable,
            0o120000 => EntryMode::Symlink,
            0o40000 => EntryMode::Directory,
            0o160000 => EntryMode::Submodule,
            other => EntryMode::Other(other),
        }
    }
}

impl From<EntryMode> for u32 {
    fn from(mode: EntryMode) -> Self {
        mode.as_u32()
    }
}
