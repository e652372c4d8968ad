use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

/// Shortest abbreviated id accepted as a revision
const MIN_PREFIX_LENGTH: usize = 4;

impl Repository {
    pub fn rev_parse(&self, revision: &str, writer: &mut impl Write) -> anyhow::Result<()> {
        let oid = self.resolve_revision(revision)?;
        writeln!(writer, "{oid}")?;

        Ok(())
    }

    /// Resolve `HEAD`, a branch name, a full id or a unique abbreviated id
    ///
    /// Branch names win over ids, so a branch called `cafe` shadows objects
    /// whose id starts with `cafe`.
    pub fn resolve_revision(&self, revision: &str) -> anyhow::Result<ObjectId> {
        if revision == self.layout().head_file() {
            let head = self.refs().resolve_head()?;
            return head.ok_or_else(|| anyhow::anyhow!("HEAD does not point to a commit yet"));
        }

        let branch_name = revision
            .strip_prefix(&self.layout().heads_prefix())
            .unwrap_or(revision);
        if let Ok(branch) = BranchName::try_parse(branch_name.to_string())
            && self.refs().branch_path(&branch).is_file()
        {
            return Ok(self.refs().resolve_branch(&branch)?);
        }

        if revision.len() == OBJECT_ID_LENGTH
            && let Ok(oid) = ObjectId::try_parse(revision.to_string())
        {
            return Ok(oid);
        }

        if revision.len() >= MIN_PREFIX_LENGTH && revision.chars().all(|c| c.is_ascii_hexdigit()) {
            let mut candidates = self.database().find_objects_by_prefix(revision)?;
            match candidates.len() {
                0 => {}
                1 => return Ok(candidates.remove(0)),
                _ => {
                    let candidates = candidates
                        .iter()
                        .map(|oid| oid.to_short_oid())
                        .collect::<Vec<_>>()
                        .join(", ");
                    anyhow::bail!("short object ID {revision} is ambiguous: {candidates}");
                }
            }
        }

        anyhow::bail!("unknown revision '{revision}'")
    }
}
