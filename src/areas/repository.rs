//! Repository facade
//!
//! Ties the object database and the reference store to a root directory and a [`Layout`].

use crate::areas::database::Database;
use crate::areas::layout::Layout;
use crate::areas::refs::Refs;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, Signature};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::errors::Result;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub struct Repository {
    path: Box<Path>,
    layout: Layout,
    database: Database,
    refs: Refs,
}

impl Repository {
    /// Open the repository rooted at `root`
    ///
    /// Nothing is read or created on disk until an operation needs it; call
    /// [`Repository::init`] to create the directory skeleton.
    pub fn open(root: impl AsRef<Path>, layout: Layout) -> Self {
        let path = root.as_ref().to_path_buf();

        let database = Database::new(layout.objects_path(&path).into_boxed_path());
        let refs = Refs::new(layout.git_path(&path).into_boxed_path(), layout.clone());

        Repository {
            path: path.into_boxed_path(),
            layout,
            database,
            refs,
        }
    }

    /// Create the directory skeleton and HEAD, leaving an existing repository untouched
    pub fn init(&self) -> Result<()> {
        self.layout.initialize(&self.path)?;
        info!(path = %self.path.display(), "initialized repository");

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn write_blob(&self, content: impl Into<bytes::Bytes>) -> Result<ObjectId> {
        self.database.store(&Blob::new(content))
    }

    /// Store a tree built from entries in any order
    ///
    /// Duplicate or invalid names are rejected before anything is written.
    pub fn build_tree(&self, entries: impl IntoIterator<Item = TreeEntry>) -> Result<ObjectId> {
        let tree = Tree::build(entries)?;
        self.database.store(&tree)
    }

    /// Store a commit; the tree and parents are not checked for existence
    pub fn build_commit(
        &self,
        tree: ObjectId,
        parents: Vec<ObjectId>,
        author: Signature,
        committer: Signature,
        message: impl Into<String>,
    ) -> Result<ObjectId> {
        let commit = Commit::new(tree, parents, author, committer, message.into());
        self.database.store(&commit)
    }

    pub fn set_branch(&self, name: &str, oid: &ObjectId) -> Result<()> {
        let branch = BranchName::try_parse(name.to_string())?;
        self.refs.set_branch(&branch, oid)
    }

    pub fn resolve_branch(&self, name: &str) -> Result<ObjectId> {
        let branch = BranchName::try_parse(name.to_string())?;
        self.refs.resolve_branch(&branch)
    }

    pub fn read_head(&self) -> Result<BranchName> {
        self.refs.read_head()
    }

    /// Walk the history reachable from `start`
    pub fn rev_list(&self, start: ObjectId, first_parent: bool) -> RevList<'_> {
        RevList::new(&self.database, start).first_parent(first_parent)
    }
}
