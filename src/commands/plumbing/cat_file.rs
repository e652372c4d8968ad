use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use std::io::Write;

/// What `cat-file` prints about an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatFileMode {
    /// pretty-print the content
    Pretty,
    /// the object kind
    Type,
    /// the payload size in bytes
    Size,
}

impl Repository {
    pub fn cat_file(
        &self,
        revision: &str,
        mode: CatFileMode,
        writer: &mut impl Write,
    ) -> anyhow::Result<()> {
        let object_id = self.resolve_revision(revision)?;

        match mode {
            CatFileMode::Type => {
                let object = self.database().load(&object_id)?;
                writeln!(writer, "{}", object.kind())?;
            }
            CatFileMode::Size => {
                let object = self.database().load(&object_id)?;
                writeln!(writer, "{}", object.payload().len())?;
            }
            CatFileMode::Pretty => match self.database().parse_object(&object_id)? {
                // blob content is written untouched, it may not be text
                ObjectBox::Blob(blob) => writer.write_all(blob.content())?,
                object => writeln!(writer, "{}", object.display())?,
            },
        }

        Ok(())
    }
}
