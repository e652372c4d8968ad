use crate::areas::repository::Repository;

impl Repository {
    /// Point a branch at a revision, creating the branch if needed
    ///
    /// Accepts both `main` and `refs/heads/main`. The previous target is overwritten
    /// without any check.
    pub fn update_ref(&self, branch: &str, revision: &str) -> anyhow::Result<()> {
        let heads_prefix = self.layout().heads_prefix();
        let branch = branch.strip_prefix(&heads_prefix).unwrap_or(branch);
        let oid = self.resolve_revision(revision)?;

        self.set_branch(branch, &oid)?;

        Ok(())
    }
}
