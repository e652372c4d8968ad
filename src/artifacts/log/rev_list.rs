use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::collections::{HashSet, VecDeque};
use tracing::trace;

/// Lazy walk over the ancestry of a commit
///
/// Each step loads a single commit from the store and queues its parents, so only the
/// history actually visited is ever read. Parents are explored breadth-first in stored
/// order and every commit is yielded once, even when merges make several paths lead to it.
///
/// A commit that can't be loaded is yielded as an error and its ancestry is not followed;
/// the walk continues with whatever else is queued.
#[derive(Debug)]
pub struct RevList<'d> {
    database: &'d Database,
    queue: VecDeque<ObjectId>,
    seen: HashSet<ObjectId>,
    first_parent: bool,
}

impl<'d> RevList<'d> {
    pub fn new(database: &'d Database, start: ObjectId) -> Self {
        let mut seen = HashSet::new();
        seen.insert(start.clone());

        RevList {
            database,
            queue: VecDeque::from([start]),
            seen,
            first_parent: false,
        }
    }

    /// Follow only the first parent of each commit
    pub fn first_parent(mut self, first_parent: bool) -> Self {
        self.first_parent = first_parent;
        self
    }

    fn enqueue_parents(&mut self, commit: &Commit) {
        let parents = if self.first_parent {
            &commit.parents()[..commit.parents().len().min(1)]
        } else {
            commit.parents()
        };

        for parent in parents {
            if self.seen.insert(parent.clone()) {
                self.queue.push_back(parent.clone());
            }
        }
    }
}

impl Iterator for RevList<'_> {
    type Item = Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let commit_oid = self.queue.pop_front()?;

        match self.database.parse_object_as_commit(&commit_oid) {
            Ok(commit) => {
                trace!(oid = %commit_oid, parents = commit.parents().len(), "visited commit");
                self.enqueue_parents(&commit);
                Some(Ok((commit_oid, commit)))
            }
            Err(err) => Some(Err(err)),
        }
    }
}
