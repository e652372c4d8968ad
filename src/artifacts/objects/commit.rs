//! Git commit object
//!
//! Commits represent snapshots of the repository at specific points in time.
//! They contain:
//! - A tree object ID (directory snapshot)
//! - Parent commit ID(s) (for history)
//! - Author and committer signatures
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Result, StoreError};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::io::BufRead;

/// Author or committer identity with a timestamp
///
/// Serialized as `Name <email> <unix-seconds> <+hhmm>`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Signature {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Signature {
    /// Create a signature at a specific time
    ///
    /// Name and email may not contain angle brackets or newlines, since those delimit the
    /// fields in the serialized form.
    pub fn new(name: String, email: String, timestamp: DateTime<FixedOffset>) -> Result<Self> {
        let forbidden = ['<', '>', '\n', '\0'];
        if name.contains(forbidden) || email.contains(forbidden) {
            return Err(StoreError::InvalidSignature(format!("{name} <{email}>")));
        }

        Ok(Signature {
            name: name.trim().to_string(),
            email,
            timestamp,
        })
    }

    /// Create a signature stamped with the current local time
    pub fn now(name: String, email: String) -> Result<Self> {
        Self::new(name, email, chrono::Local::now().fixed_offset())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// The serialized form used in commit headers
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Format timestamp in human-readable form
    ///
    /// String like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    /// Parse git's internal date format: `<unix-seconds> <+hhmm|-hhmm>`
    pub fn parse_raw_date(value: &str) -> Result<DateTime<FixedOffset>> {
        let invalid = || StoreError::InvalidSignature(format!("invalid date {value:?}"));

        let (seconds, offset) = value.trim().split_once(' ').ok_or_else(invalid)?;
        let seconds = seconds.parse::<i64>().map_err(|_| invalid())?;
        let offset = parse_offset(offset).ok_or_else(invalid)?;

        DateTime::from_timestamp(seconds, 0)
            .map(|utc| utc.with_timezone(&offset))
            .ok_or_else(invalid)
    }
}

fn parse_offset(value: &str) -> Option<FixedOffset> {
    if value.len() != 5 || !value.is_ascii() || !value[1..].bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let sign = match &value[..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours = value[1..3].parse::<i32>().ok()?;
    let minutes = value[3..5].parse::<i32>().ok()?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl TryFrom<&str> for Signature {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self> {
        // Format: "name <email> timestamp timezone"
        let email_start = value
            .find('<')
            .ok_or_else(|| StoreError::InvalidSignature(format!("missing '<' in {value:?}")))?;
        let email_end = value
            .rfind('>')
            .filter(|end| *end > email_start)
            .ok_or_else(|| StoreError::InvalidSignature(format!("missing '>' in {value:?}")))?;

        let name = value[..email_start].trim().to_string();
        let email = value[email_start + 1..email_end].to_string();
        let timestamp = Self::parse_raw_date(&value[email_end + 1..])?;

        Self::new(name, email, timestamp)
    }
}

/// Git commit object
///
/// Parents are ordered: the first one is the mainline, a root commit has none,
/// and a merge has two or more.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    tree_oid: ObjectId,
    parents: Vec<ObjectId>,
    author: Signature,
    committer: Signature,
    message: String,
}

impl Commit {
    pub fn new(
        tree_oid: ObjectId,
        parents: Vec<ObjectId>,
        author: Signature,
        committer: Signature,
        message: String,
    ) -> Self {
        Commit {
            tree_oid,
            parents,
            author,
            committer,
            message,
        }
    }

    /// Get the first line of the commit message
    ///
    /// Useful for short-form display (e.g., `log --oneline`)
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// The mainline parent
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author(&self) -> &Signature {
        &self.author
    }

    pub fn committer(&self) -> &Signature {
        &self.committer
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Result<Bytes> {
        Ok(Bytes::from(format!("{}\n", self.display())))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|_| StoreError::malformed("commit", "payload is not utf-8"))?;

        let (headers, message) = content
            .split_once("\n\n")
            .ok_or_else(|| StoreError::malformed("commit", "missing blank line before message"))?;

        let mut tree_oid = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for line in headers.lines() {
            // continuation of a multi-line header such as gpgsig
            if line.starts_with(' ') {
                continue;
            }

            let (key, value) = line.split_once(' ').ok_or_else(|| {
                StoreError::malformed("commit", format!("invalid header line {line:?}"))
            })?;

            match key {
                "tree" => tree_oid = Some(parse_header_oid(value)?),
                "parent" => parents.push(parse_header_oid(value)?),
                "author" => author = Some(Signature::try_from(value)?),
                "committer" => committer = Some(Signature::try_from(value)?),
                _ => {}
            }
        }

        let tree_oid =
            tree_oid.ok_or_else(|| StoreError::malformed("commit", "missing tree line"))?;
        let author = author.ok_or_else(|| StoreError::malformed("commit", "missing author line"))?;
        let committer =
            committer.ok_or_else(|| StoreError::malformed("commit", "missing committer line"))?;
        let message = message.strip_suffix('\n').unwrap_or(message).to_string();

        Ok(Self::new(tree_oid, parents, author, committer, message))
    }
}

fn parse_header_oid(value: &str) -> Result<ObjectId> {
    ObjectId::try_parse(value.to_string())
        .map_err(|err| StoreError::malformed("commit", err.to_string()))
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![];

        lines.push(format!("tree {}", self.tree_oid));
        for parent in &self.parents {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }
}
