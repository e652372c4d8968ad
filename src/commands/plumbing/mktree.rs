use crate::areas::repository::Repository;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntry;
use anyhow::Context;
use std::io::{BufRead, Write};

impl Repository {
    /// Build a tree from `<mode> <kind> <id>\t<name>` lines, as printed by `cat-file -p`
    ///
    /// Input order doesn't matter; the stored tree is always in canonical order.
    pub fn mktree(&self, input: impl BufRead, writer: &mut impl Write) -> anyhow::Result<()> {
        let mut entries = Vec::new();

        for (line_number, line) in input.lines().enumerate() {
            let line = line.context("could not read tree listing")?;
            if line.trim().is_empty() {
                continue;
            }

            let entry = parse_listing_line(&line)
                .with_context(|| format!("invalid tree entry on line {}", line_number + 1))?;
            entries.push(entry);
        }

        let tree_id = self.build_tree(entries)?;
        writeln!(writer, "{tree_id}")?;

        Ok(())
    }
}

fn parse_listing_line(line: &str) -> anyhow::Result<TreeEntry> {
    let (meta, name) = line
        .split_once('\t')
        .ok_or_else(|| anyhow::anyhow!("missing tab before the entry name"))?;

    let fields = meta.split_whitespace().collect::<Vec<_>>();
    let [mode, kind, oid] = fields.as_slice() else {
        anyhow::bail!("expected '<mode> <kind> <id>', got {meta:?}");
    };

    let mode = EntryMode::from_octal_str(mode)?;
    if mode.object_type().as_str() != *kind {
        anyhow::bail!("mode {mode:?} does not match object kind {kind}");
    }
    let oid = ObjectId::try_parse(oid.to_string())?;

    Ok(TreeEntry::new(mode, name, oid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::layout::Layout;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn listing_order_does_not_change_the_tree() {
        let dir = TempDir::new().unwrap();
        let repository = Repository::open(dir.path(), Layout::default());
        repository.init().unwrap();
        let a = repository.write_blob("a").unwrap();
        let b = repository.write_blob("b").unwrap();

        let forward = format!("100644 blob {a}\ta.txt\n100644 blob {b}\tb.txt\n");
        let backward = format!("100644 blob {b}\tb.txt\n100644 blob {a}\ta.txt\n");

        let mut first = Vec::new();
        let mut second = Vec::new();
        repository.mktree(forward.as_bytes(), &mut first).unwrap();
        repository.mktree(backward.as_bytes(), &mut second).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn padded_modes_from_cat_file_are_accepted() {
        let tree = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
        let entry = parse_listing_line(&format!("040000 tree {tree}\tsrc")).unwrap();

        assert_eq!(entry.mode, EntryMode::Directory);
        assert_eq!(entry.name, "src");
    }

    #[test]
    fn malformed_lines_are_rejected() {
        let oid = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";

        assert!(parse_listing_line(&format!("100644 blob {oid} no-tab")).is_err());
        assert!(parse_listing_line(&format!("100644 tree {oid}\tmismatch")).is_err());
        assert!(parse_listing_line("100644 blob nothex\tname").is_err());
    }
}
