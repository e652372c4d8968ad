//! Repository layout
//!
//! Directory and file names of the on-disk format, plus the default branch HEAD points at
//! when a repository is created. Every component receives these through a `Layout` value
//! instead of hard-coding them, so tests and tools can use alternate layouts.
//!
//! ```text
//! <root>/.git/objects/<2 hex>/<38 hex>
//! <root>/.git/refs/heads/<branch>
//! <root>/.git/HEAD
//! ```

use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::{Result, StoreError};
use fake::rand;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default branch HEAD points at in a fresh repository
pub const DEFAULT_BRANCH: &str = "master";

/// Environment variable overriding the default branch
pub const DEFAULT_BRANCH_ENV: &str = "BIT_DEFAULT_BRANCH";

/// Permission bits for every directory the store creates
pub const DIR_MODE: u32 = 0o755;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    git_dir: String,
    objects_dir: String,
    refs_dir: String,
    heads_dir: String,
    head_file: String,
    default_branch: BranchName,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            git_dir: ".git".to_string(),
            objects_dir: "objects".to_string(),
            refs_dir: "refs".to_string(),
            heads_dir: "heads".to_string(),
            head_file: "HEAD".to_string(),
            default_branch: BranchName::default(),
        }
    }
}

impl Layout {
    /// The default layout, with the default branch taken from `BIT_DEFAULT_BRANCH` when set
    pub fn from_env() -> Result<Self> {
        match std::env::var(DEFAULT_BRANCH_ENV) {
            Ok(branch) if !branch.trim().is_empty() => {
                Self::default().with_default_branch(branch.trim())
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn with_default_branch(mut self, branch: &str) -> Result<Self> {
        self.default_branch = BranchName::try_parse(branch.to_string())?;
        Ok(self)
    }

    pub fn with_git_dir(mut self, git_dir: impl Into<String>) -> Self {
        self.git_dir = git_dir.into();
        self
    }

    pub fn default_branch(&self) -> &BranchName {
        &self.default_branch
    }

    pub fn git_path(&self, root: &Path) -> PathBuf {
        root.join(&self.git_dir)
    }

    pub fn objects_path(&self, root: &Path) -> PathBuf {
        self.git_path(root).join(&self.objects_dir)
    }

    pub fn refs_path(&self, root: &Path) -> PathBuf {
        self.git_path(root).join(&self.refs_dir)
    }

    pub fn heads_path(&self, root: &Path) -> PathBuf {
        self.refs_path(root).join(&self.heads_dir)
    }

    pub fn head_path(&self, root: &Path) -> PathBuf {
        self.git_path(root).join(&self.head_file)
    }

    /// Name of the HEAD file inside the git directory
    pub fn head_file(&self) -> &str {
        &self.head_file
    }

    /// `refs/heads/`, the prefix of every branch ref path
    pub fn heads_prefix(&self) -> String {
        format!("{}/{}/", self.refs_dir, self.heads_dir)
    }

    /// Content of a symbolic ref pointing at `branch`
    pub fn symref_to(&self, branch: &BranchName) -> String {
        format!("ref: {}{}", self.heads_prefix(), branch)
    }

    /// Create the directory skeleton and the initial HEAD under `root`
    ///
    /// Existing directories are fine and an existing HEAD is never overwritten,
    /// so running this on an initialized repository changes nothing. HEAD is staged in a
    /// temp file and hard-linked into place, so it is either absent or complete. An empty
    /// HEAD left by an interrupted older writer is replaced.
    pub fn initialize(&self, root: &Path) -> Result<()> {
        create_dir_all(&self.objects_path(root))?;
        create_dir_all(&self.heads_path(root))?;

        let head_path = self.head_path(root);
        let symref = self.symref_to(&self.default_branch);
        let temp_head_path = write_temp_file(&self.git_path(root), "tmp-head", symref.as_bytes())?;

        match std::fs::hard_link(&temp_head_path, &head_path) {
            Ok(()) => {
                let _ = std::fs::remove_file(&temp_head_path);
                info!(branch = %self.default_branch, "created HEAD");
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists && is_empty_file(&head_path) => {
                if let Err(err) = std::fs::rename(&temp_head_path, &head_path) {
                    let _ = std::fs::remove_file(&temp_head_path);
                    return Err(StoreError::io(&head_path, err));
                }
                info!(branch = %self.default_branch, "replaced empty HEAD");
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                let _ = std::fs::remove_file(&temp_head_path);
                debug!(path = %head_path.display(), "HEAD already exists, leaving it untouched");
            }
            Err(err) => {
                let _ = std::fs::remove_file(&temp_head_path);
                return Err(StoreError::io(&head_path, err));
            }
        }

        Ok(())
    }
}

fn is_empty_file(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|metadata| metadata.is_file() && metadata.len() == 0)
}

/// Write `content` to a fresh, synced file in `dir` and return its path
///
/// The name is `<prefix>-<random>`, opened with `create_new` so concurrent writers never
/// share a file. Callers publish it with a rename or link and remove it on failure.
pub(crate) fn write_temp_file(dir: &Path, prefix: &str, content: &[u8]) -> Result<PathBuf> {
    let (temp_path, mut file) = loop {
        let temp_path = dir.join(format!("{prefix}-{}", rand::random::<u32>()));
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(file) => break (temp_path, file),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(StoreError::io(&temp_path, err)),
        }
    };

    let written = file.write_all(content).and_then(|_| file.sync_all());
    drop(file);

    if let Err(err) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(StoreError::io(&temp_path, err));
    }

    Ok(temp_path)
}

/// Recursively create a directory with mode 0755
pub(crate) fn create_dir_all(path: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }

    builder
        .create(path)
        .map_err(|err| StoreError::io(path, err))
}
