use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub oneline: bool,
    pub first_parent: bool,
}

impl Repository {
    /// Show the history reachable from `revision` (HEAD when absent)
    pub fn log(
        &self,
        revision: Option<&str>,
        opts: &LogOptions,
        writer: &mut impl Write,
    ) -> anyhow::Result<()> {
        let start = match revision {
            Some(revision) => self.resolve_revision(revision)?,
            None => self.refs().resolve_head()?.ok_or_else(|| {
                let branch = self
                    .read_head()
                    .map(|branch| branch.to_string())
                    .unwrap_or_else(|_| self.layout().head_file().to_string());
                anyhow::anyhow!("your current branch '{branch}' does not have any commits yet")
            })?,
        };

        for (index, item) in self.rev_list(start, opts.first_parent).enumerate() {
            let (commit_oid, commit) = item?;

            if opts.oneline {
                self.show_commit_oneline(&commit_oid, &commit, writer)?;
            } else {
                if index > 0 {
                    writeln!(writer)?;
                }
                self.show_commit_medium(&commit_oid, &commit, writer)?;
            }
        }

        Ok(())
    }

    fn show_commit_medium(
        &self,
        commit_oid: &ObjectId,
        commit: &Commit,
        writer: &mut impl Write,
    ) -> anyhow::Result<()> {
        writeln!(writer, "{}", format!("commit {commit_oid}").yellow())?;
        if commit.is_merge() {
            let parents = commit
                .parents()
                .iter()
                .map(ObjectId::to_short_oid)
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "Merge: {parents}")?;
        }
        writeln!(writer, "Author: {}", commit.author().display_name())?;
        writeln!(writer, "Date:   {}", commit.author().readable_timestamp())?;
        writeln!(writer)?;
        for message_line in commit.message().lines() {
            writeln!(writer, "    {message_line}")?;
        }

        Ok(())
    }

    fn show_commit_oneline(
        &self,
        commit_oid: &ObjectId,
        commit: &Commit,
        writer: &mut impl Write,
    ) -> anyhow::Result<()> {
        writeln!(
            writer,
            "{} {}",
            commit_oid.to_short_oid().yellow(),
            commit.short_message()
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::layout::Layout;
    use crate::artifacts::objects::commit::Signature;
    use assert_fs::TempDir;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    fn signature() -> Signature {
        let timestamp = DateTime::parse_from_rfc3339("2023-01-01T12:00:00+00:00").unwrap();
        Signature::new("Ada".to_string(), "ada@example.com".to_string(), timestamp).unwrap()
    }

    fn log_output(repository: &Repository, opts: &LogOptions) -> String {
        colored::control::set_override(false);
        let mut output = Vec::new();
        repository.log(None, opts, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn medium_format_lists_newest_first() {
        let dir = TempDir::new().unwrap();
        let repository = Repository::open(dir.path(), Layout::default());
        repository.init().unwrap();
        let tree = repository.build_tree([]).unwrap();
        let c1 = repository
            .build_commit(tree.clone(), vec![], signature(), signature(), "first")
            .unwrap();
        let c2 = repository
            .build_commit(tree, vec![c1.clone()], signature(), signature(), "second\n\nbody")
            .unwrap();
        repository.set_branch("master", &c2).unwrap();

        let expected = format!(
            "commit {c2}\nAuthor: Ada <ada@example.com>\nDate:   Sun Jan 1 12:00:00 2023 +0000\n\n    second\n    \n    body\n\
             \n\
             commit {c1}\nAuthor: Ada <ada@example.com>\nDate:   Sun Jan 1 12:00:00 2023 +0000\n\n    first\n"
        );
        assert_eq!(log_output(&repository, &LogOptions::default()), expected);
    }

    #[test]
    fn oneline_shows_merges_once() {
        let dir = TempDir::new().unwrap();
        let repository = Repository::open(dir.path(), Layout::default());
        repository.init().unwrap();
        let tree = repository.build_tree([]).unwrap();
        let base = repository
            .build_commit(tree.clone(), vec![], signature(), signature(), "base")
            .unwrap();
        let side = repository
            .build_commit(tree.clone(), vec![base.clone()], signature(), signature(), "side")
            .unwrap();
        let merge = repository
            .build_commit(tree, vec![base.clone(), side.clone()], signature(), signature(), "merge")
            .unwrap();
        repository.set_branch("master", &merge).unwrap();

        let opts = LogOptions {
            oneline: true,
            first_parent: false,
        };
        assert_eq!(
            log_output(&repository, &opts),
            format!(
                "{} merge\n{} base\n{} side\n",
                merge.to_short_oid(),
                base.to_short_oid(),
                side.to_short_oid()
            )
        );
    }

    #[test]
    fn unborn_branch_is_an_error() {
        let dir = TempDir::new().unwrap();
        let repository = Repository::open(dir.path(), Layout::default());
        repository.init().unwrap();

        let mut output = Vec::new();
        let err = repository
            .log(None, &LogOptions::default(), &mut output)
            .unwrap_err();
        assert!(err.to_string().contains("'master' does not have any commits yet"));
    }
}
