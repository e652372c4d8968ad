//! Git references (branches and HEAD)
//!
//! References are human-readable names pointing to commits. They can be:
//! - Direct: containing a commit id (`refs/heads/<branch>`)
//! - Symbolic: pointing to another reference (`HEAD` -> `refs/heads/master`)
//!
//! ## File Format
//!
//! - Branch files hold a 40-character id followed by a newline
//! - HEAD holds `ref: refs/heads/<branch>`
//!
//! Branch updates are last-writer-wins. Each update is staged in a temp file and renamed
//! over the ref, so readers see either the old id or the new one, never a partial file.
//! Nothing here performs compare-and-swap: callers racing on the same branch may clobber
//! each other's update.

use crate::areas::layout::{Layout, create_dir_all, write_temp_file};
use crate::artifacts::branch::SYMREF_REGEX;
use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Result, StoreError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;
use walkdir::WalkDir;

static SYMREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SYMREF_REGEX).expect("symref pattern is a valid regex"));

/// Maximum symbolic indirections followed before giving up on a cycle
const MAX_SYMREF_DEPTH: usize = 5;

/// Content of a ref file
#[derive(Debug, Clone, PartialEq, Eq)]
enum SymRefOrOid {
    /// Symbolic reference pointing to another ref
    SymRef { sym_ref_name: SymRefName },
    /// Direct object ID
    Oid(ObjectId),
}

impl SymRefOrOid {
    /// Read a ref file; `Ok(None)` when it doesn't exist
    fn read_symref_or_oid(name: &str, path: &Path) -> Result<Option<SymRefOrOid>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::io(path, err)),
        };
        let content = content.trim();

        if let Some(symref_match) = SYMREF.captures(content) {
            return Ok(Some(SymRefOrOid::SymRef {
                sym_ref_name: SymRefName::new(symref_match[1].trim().to_string()),
            }));
        }

        ObjectId::try_parse(content.to_string())
            .map(|oid| Some(SymRefOrOid::Oid(oid)))
            .map_err(|_| StoreError::InvalidRef {
                name: name.to_string(),
                reason: format!("unrecognized content {content:?}"),
            })
    }
}

/// References manager
///
/// Handles reading and writing branch refs and HEAD below the git directory.
#[derive(Debug)]
pub struct Refs {
    /// Path to the git directory (typically `.git`)
    path: Box<Path>,
    layout: Layout,
}

impl Refs {
    pub fn new(path: Box<Path>, layout: Layout) -> Self {
        Refs { path, layout }
    }

    /// Point a branch at a commit, creating or overwriting `refs/heads/<name>`
    pub fn set_branch(&self, name: &BranchName, oid: &ObjectId) -> Result<()> {
        let branch_path = self.branch_path(name);
        self.update_ref_file(&branch_path, &format!("{oid}\n"))?;
        debug!(branch = %name, oid = %oid, "updated branch");

        Ok(())
    }

    /// Read the commit a branch points at
    pub fn resolve_branch(&self, name: &BranchName) -> Result<ObjectId> {
        let ref_path = self.branch_path(name);

        self.read_symref(name.as_ref(), &ref_path, 0)?
            .ok_or_else(|| StoreError::RefNotFound(name.to_string()))
    }

    /// Name of the branch HEAD points at
    pub fn read_head(&self) -> Result<BranchName> {
        let head_name = self.layout.head_file();

        match SymRefOrOid::read_symref_or_oid(head_name, &self.head_path())? {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => {
                BranchName::try_parse_sym_ref_name(&sym_ref_name, &self.layout.heads_prefix())
            }
            Some(SymRefOrOid::Oid(oid)) => Err(StoreError::InvalidRef {
                name: head_name.to_string(),
                reason: format!("detached at {oid}"),
            }),
            None => Err(StoreError::RefNotFound(head_name.to_string())),
        }
    }

    /// Follow HEAD to a commit; `Ok(None)` while the current branch has no commits
    pub fn resolve_head(&self) -> Result<Option<ObjectId>> {
        let head_path = self.head_path();
        if !head_path.exists() {
            return Err(StoreError::RefNotFound(self.layout.head_file().to_string()));
        }

        self.read_symref(self.layout.head_file(), &head_path, 0)
    }

    /// All branch names under `refs/heads`, sorted
    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        let heads_path = self.heads_path();
        if !heads_path.exists() {
            return Ok(Vec::new());
        }

        let mut branches = Vec::new();
        for entry in WalkDir::new(&heads_path) {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(heads_path.as_path()).to_path_buf();
                StoreError::io(&path, err.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = entry
                .path()
                .strip_prefix(&heads_path)
                .unwrap_or(entry.path())
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            // skip stray files that can't be branch names (e.g. editor leftovers)
            if let Ok(branch) = BranchName::try_parse(relative_path) {
                branches.push(branch);
            }
        }

        branches.sort();
        Ok(branches)
    }

    /// Follow symbolic references until reaching a direct id
    fn read_symref(&self, name: &str, path: &Path, depth: usize) -> Result<Option<ObjectId>> {
        if depth > MAX_SYMREF_DEPTH {
            return Err(StoreError::InvalidRef {
                name: name.to_string(),
                reason: "too many levels of symbolic refs".to_string(),
            });
        }

        match SymRefOrOid::read_symref_or_oid(name, path)? {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => {
                let target = self.path.join(sym_ref_name.as_ref_path());
                self.read_symref(sym_ref_name.as_ref_path(), &target, depth + 1)
            }
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            None => Ok(None),
        }
    }

    fn update_ref_file(&self, path: &Path, raw_ref: &str) -> Result<()> {
        // create all the parent directories if they don't exist
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        // staged in the git dir so branch listings never pick up the temp file
        let temp_ref_path = write_temp_file(&self.path, "tmp-ref", raw_ref.as_bytes())?;
        if let Err(err) = std::fs::rename(&temp_ref_path, path) {
            let _ = std::fs::remove_file(&temp_ref_path);
            return Err(StoreError::io(path, err));
        }

        Ok(())
    }

    pub fn branch_path(&self, name: &BranchName) -> PathBuf {
        self.heads_path().join(name.as_ref())
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(self.layout.head_file())
    }

    pub fn heads_path(&self) -> PathBuf {
        self.path.join(self.layout.heads_prefix())
    }
}
