//! Git tree object
//!
//! Trees represent directory snapshots. They contain entries for files (blobs),
//! subdirectories (other trees) and submodule links (commits), along with their names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! ## Canonical order
//!
//! Entries are always written sorted by the raw bytes of their name, with directory names
//! compared as if they ended in `/`. This is git's collation, so two writers holding the same
//! directory contents produce the same tree id regardless of the order they list entries in.

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Result, StoreError};
use bytes::Bytes;
use derive_new::new;
use std::collections::HashSet;
use std::io::{BufRead, Write};

/// One named entry of a tree
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    #[new(into)]
    pub name: String,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }

    fn sort_key(&self) -> Vec<u8> {
        let mut key = self.name.as_bytes().to_vec();
        if self.is_tree() {
            key.push(b'/');
        }
        key
    }

    fn validate_name(&self) -> Result<()> {
        let name = self.name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
            return Err(StoreError::InvalidEntryName(self.name.clone()));
        }
        Ok(())
    }
}

/// Git tree object representing a directory listing
///
/// A tree built through [`Tree::build`] holds its entries in canonical order.
/// A tree read back from the store keeps the order found on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a canonical tree from entries given in any order
    ///
    /// Entries are ordered by the bytes of their name, with a directory compared as if its
    /// name ended in `/` (git's collation). Among non-directory entries this is plain byte
    /// order, so `foo.txt` sorts before a `foo` directory but after a `foo` file.
    ///
    /// Fails with `InvalidEntryName` for names that are not a single path segment and with
    /// `DuplicateEntry` when two entries share a name.
    pub fn build(entries: impl IntoIterator<Item = TreeEntry>) -> Result<Self> {
        let mut entries = entries.into_iter().collect::<Vec<_>>();

        let mut names = HashSet::with_capacity(entries.len());
        for entry in &entries {
            entry.validate_name()?;
            if !names.insert(entry.name.as_str()) {
                return Err(StoreError::DuplicateEntry(entry.name.clone()));
            }
        }

        entries.sort_by_cached_key(TreeEntry::sort_key);

        Ok(Tree { entries })
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> impl Iterator<Item = TreeEntry> {
        self.entries.into_iter()
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        let mut content = Vec::new();

        for entry in &self.entries {
            write!(content, "{} {}\0", entry.mode.to_octal_string(), entry.name)
                .and_then(|_| entry.oid.write_raw_to(&mut content))
                .map_err(|err| StoreError::malformed("tree", err.to_string()))?;
        }

        Ok(Bytes::from(content))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut entries = Vec::new();

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            // Read "mode " (space-delimited)
            let n = reader
                .read_until(b' ', &mut mode_bytes)
                .map_err(|err| StoreError::malformed("tree", err.to_string()))?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(StoreError::malformed("tree", "unexpected EOF in mode"));
            }

            let mode_str = std::str::from_utf8(&mode_bytes)
                .map_err(|_| StoreError::malformed("tree", "mode is not utf-8"))?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            // Read "name\0"
            name_bytes.clear();
            reader
                .read_until(b'\0', &mut name_bytes)
                .map_err(|err| StoreError::malformed("tree", err.to_string()))?;
            if name_bytes.pop() != Some(b'\0') {
                return Err(StoreError::malformed("tree", "unexpected EOF in name"));
            }
            let name = String::from_utf8(name_bytes.clone())
                .map_err(|_| StoreError::malformed("tree", "entry name is not utf-8"))?;

            let oid = ObjectId::read_raw_from(&mut reader)
                .map_err(|err| StoreError::malformed("tree", err.to_string()))?;

            entries.push(TreeEntry::new(mode, name, oid));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "{:06o} {} {}\t{}",
                    entry.mode.as_u32(),
                    entry.mode.object_type(),
                    entry.oid,
                    entry.name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
