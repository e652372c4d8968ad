use crate::areas::repository::Repository;
use anyhow::Context;
use std::io::Write;

impl Repository {
    pub fn init_command(&self, writer: &mut impl Write) -> anyhow::Result<()> {
        self.init().with_context(|| {
            format!("failed to initialize repository at {}", self.path().display())
        })?;

        let git_path = self.layout().git_path(self.path());
        let git_path = git_path.canonicalize().unwrap_or(git_path);

        writeln!(
            writer,
            "Initialized empty Git repository in {}",
            git_path.display()
        )?;

        Ok(())
    }
}
