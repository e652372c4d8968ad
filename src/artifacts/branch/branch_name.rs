use crate::areas::layout::DEFAULT_BRANCH;
use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::{Result, StoreError};
use derive_new::new;
use regex::Regex;
use std::sync::LazyLock;

static INVALID_BRANCH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(INVALID_BRANCH_NAME_REGEX).expect("branch name pattern is a valid regex")
});

/// Full path of a ref relative to the git directory, e.g. `refs/heads/main`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, new)]
pub struct SymRefName(String);

impl SymRefName {
    pub fn as_ref_path(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> Result<Self> {
        if name.is_empty() || INVALID_BRANCH_NAME.is_match(&name) {
            return Err(StoreError::InvalidBranchName(name));
        }

        Ok(Self(name))
    }

    /// Extract the branch from a symbolic ref under the given heads prefix
    ///
    /// `refs/heads/feature/x` with prefix `refs/heads/` yields `feature/x`.
    pub fn try_parse_sym_ref_name(sym_ref_name: &SymRefName, heads_prefix: &str) -> Result<Self> {
        let name = sym_ref_name
            .as_ref_path()
            .strip_prefix(heads_prefix)
            .ok_or_else(|| StoreError::InvalidRef {
                name: sym_ref_name.as_ref_path().to_string(),
                reason: format!("symbolic ref must start with '{heads_prefix}'"),
            })?;

        Self::try_parse(name.to_string())
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for BranchName {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_parse(s.to_string())
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn test_is_valid_branch_name_with_valid_branch_name(
            branch_name in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(branch_name).is_ok());
        }

        #[test]
        fn test_is_valid_branch_name_with_slashes(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            let branch_name = format!("{}/{}", prefix, suffix);
            assert!(BranchName::try_parse(branch_name).is_ok());
        }

        #[test]
        fn test_is_invalid_branch_name_starting_with_dot(
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            let branch_name = format!(".{}", suffix);
            assert!(BranchName::try_parse(branch_name).is_err());
        }

        #[test]
        fn test_is_invalid_branch_name_ending_with_lock(
            prefix in "[a-zA-Z0-9_-]+"
        ) {
            let branch_name = format!("{}.lock", prefix);
            assert!(BranchName::try_parse(branch_name).is_err());
        }

        #[test]
        fn test_is_invalid_branch_name_with_consecutive_dots(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            let branch_name = format!("{}..{}", prefix, suffix);
            assert!(BranchName::try_parse(branch_name).is_err());
        }

        #[test]
        fn test_is_invalid_branch_name_with_special_chars(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+",
            special_char in r"[\*:\?\[\\^~ ]"
        ) {
            let branch_name = format!("{}{}{}", prefix, special_char, suffix);
            assert!(BranchName::try_parse(branch_name).is_err());
        }
    }

    #[test]
    fn test_is_invalid_branch_name_empty() {
        assert!(matches!(
            BranchName::try_parse("".to_string()),
            Err(StoreError::InvalidBranchName(_))
        ));
    }

    #[test]
    fn test_is_invalid_branch_name_with_slash_edges() {
        assert!(BranchName::try_parse("/main".to_string()).is_err());
        assert!(BranchName::try_parse("main/".to_string()).is_err());
        assert!(BranchName::try_parse("a/.b".to_string()).is_err());
        assert!(BranchName::try_parse("a@{b}".to_string()).is_err());
    }

    #[test]
    fn sym_ref_name_strips_the_heads_prefix() {
        let sym_ref = SymRefName::new("refs/heads/feature/x".to_string());
        let branch = BranchName::try_parse_sym_ref_name(&sym_ref, "refs/heads/").unwrap();
        assert_eq!(branch.as_ref(), "feature/x");
    }

    #[test]
    fn sym_ref_outside_heads_is_rejected() {
        let sym_ref = SymRefName::new("refs/tags/v1".to_string());
        assert!(matches!(
            BranchName::try_parse_sym_ref_name(&sym_ref, "refs/heads/"),
            Err(StoreError::InvalidRef { .. })
        ));
    }
}
