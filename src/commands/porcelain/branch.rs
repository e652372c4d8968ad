use crate::areas::repository::Repository;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// List branches, marking the one HEAD points at with `*`
    pub fn branch(&self, writer: &mut impl Write) -> anyhow::Result<()> {
        // a detached or missing HEAD simply marks nothing
        let current = self.read_head().ok();

        for branch in self.refs().list_branches()? {
            if current.as_ref() == Some(&branch) {
                writeln!(writer, "* {}", branch.to_string().green())?;
            } else {
                writeln!(writer, "  {branch}")?;
            }
        }

        Ok(())
    }
}
