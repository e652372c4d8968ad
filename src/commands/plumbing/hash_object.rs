use crate::areas::repository::Repository;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Print the id `file` would have as an object of `kind`, storing it when `write` is set
    pub fn hash_object(
        &self,
        file: &Path,
        kind: &str,
        write: bool,
        writer: &mut impl Write,
    ) -> anyhow::Result<()> {
        let payload =
            std::fs::read(file).with_context(|| format!("could not read {}", file.display()))?;

        let object_id = if write {
            self.database().store_raw(kind, &payload)?
        } else {
            self.database().hash(kind, &payload)?
        };

        writeln!(writer, "{object_id}")?;

        Ok(())
    }
}
