use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Signature;
use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use std::io::Write;

/// Which identity a signature is loaded for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureRole {
    Author,
    Committer,
}

impl SignatureRole {
    fn env_prefix(&self) -> &'static str {
        match self {
            SignatureRole::Author => "GIT_AUTHOR",
            SignatureRole::Committer => "GIT_COMMITTER",
        }
    }
}

/// Load a signature from `GIT_<ROLE>_NAME`, `GIT_<ROLE>_EMAIL` and `GIT_<ROLE>_DATE`
///
/// The date is optional and defaults to now. It may be git's raw `<seconds> <+hhmm>`,
/// RFC 2822 or `%Y-%m-%d %H:%M:%S %z`.
pub fn load_signature_from_env(role: SignatureRole) -> anyhow::Result<Signature> {
    let prefix = role.env_prefix();
    let name = std::env::var(format!("{prefix}_NAME"))
        .with_context(|| format!("{prefix}_NAME not set"))?;
    let email = std::env::var(format!("{prefix}_EMAIL"))
        .with_context(|| format!("{prefix}_EMAIL not set"))?;

    let signature = match std::env::var(format!("{prefix}_DATE")) {
        Ok(date) => Signature::new(name, email, parse_date(&date)?)?,
        Err(_) => Signature::now(name, email)?,
    };

    Ok(signature)
}

fn parse_date(date: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    Signature::parse_raw_date(date)
        .ok()
        .or_else(|| DateTime::parse_from_rfc2822(date).ok())
        .or_else(|| DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z").ok())
        .ok_or_else(|| anyhow::anyhow!("invalid date format {date:?}"))
}

impl Repository {
    /// Create a commit object and print its id
    ///
    /// The committer falls back to the author when `GIT_COMMITTER_NAME` is not set.
    pub fn commit_tree(
        &self,
        tree: &str,
        parents: &[String],
        message: &str,
        writer: &mut impl Write,
    ) -> anyhow::Result<()> {
        let tree_oid = self.resolve_revision(tree)?;
        let parents = parents
            .iter()
            .map(|parent| self.resolve_revision(parent))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let author = load_signature_from_env(SignatureRole::Author)?;
        let committer = match std::env::var("GIT_COMMITTER_NAME") {
            Ok(_) => load_signature_from_env(SignatureRole::Committer)?,
            Err(_) => author.clone(),
        };

        let commit_id = self.build_commit(tree_oid, parents, author, committer, message)?;
        writeln!(writer, "{commit_id}")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("1700000000 +0200")]
    #[case("Wed, 15 Nov 2023 00:13:20 +0200")]
    #[case("2023-11-15 00:13:20 +0200")]
    fn dates_in_every_supported_format(#[case] date: &str) {
        let parsed = parse_date(date).unwrap();

        assert_eq!(parsed.timestamp(), 1_700_000_000);
        assert_eq!(parsed.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn garbage_dates_are_rejected() {
        assert!(parse_date("yesterday").is_err());
    }
}
