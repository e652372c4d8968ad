use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Result, StoreError};
use bytes::Bytes;
use derive_new::new;
use sha1::{Digest, Sha1};
use std::io::BufRead;

/// Encodes an object's payload (the bytes after the `<type> <size>\0` header)
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Decodes an object's payload; the header has already been consumed by the store
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    fn object_id(&self) -> Result<ObjectId> {
        let payload = self.serialize()?;
        hash_canonical(&canonical_form(self.object_type().as_str(), &payload))
    }
}

/// An object as stored: an opaque kind tag and its payload
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct RawObject {
    kind: String,
    payload: Bytes,
}

impl RawObject {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn into_parts(self) -> (String, Bytes) {
        (self.kind, self.payload)
    }

    pub fn object_type(&self) -> Result<ObjectType> {
        ObjectType::try_from(self.kind.as_str())
    }
}

pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}

impl ObjectBox {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(blob) => blob.object_type(),
            ObjectBox::Tree(tree) => tree.object_type(),
            ObjectBox::Commit(commit) => commit.object_type(),
        }
    }

    pub fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Tree(tree) => tree.display(),
            ObjectBox::Commit(commit) => commit.display(),
        }
    }
}

/// Check that a kind can appear in a canonical header
///
/// The store treats kinds as opaque, so anything without a space or NUL is accepted.
pub fn validate_kind(kind: &str) -> Result<()> {
    if kind.is_empty() || kind.bytes().any(|b| b == b' ' || b == b'\0') {
        return Err(StoreError::InvalidObjectKind(kind.to_string()));
    }
    Ok(())
}

/// Build `<kind> <len>\0<payload>`
pub fn canonical_form(kind: &str, payload: &[u8]) -> Bytes {
    let header = format!("{} {}\0", kind, payload.len());

    let mut canonical = Vec::with_capacity(header.len() + payload.len());
    canonical.extend_from_slice(header.as_bytes());
    canonical.extend_from_slice(payload);

    Bytes::from(canonical)
}

pub fn hash_canonical(canonical: &[u8]) -> Result<ObjectId> {
    let mut hasher = Sha1::new();
    hasher.update(canonical);

    ObjectId::from_raw(&hasher.finalize())
}

/// Split a canonical representation back into kind and payload
///
/// The declared length must match the payload exactly and be written without padding.
/// The error string is wrapped into a corruption error by the caller, who knows the id.
pub fn parse_canonical(canonical: &Bytes) -> std::result::Result<RawObject, String> {
    let nul = canonical
        .iter()
        .position(|&b| b == b'\0')
        .ok_or("missing header terminator")?;

    let header = std::str::from_utf8(&canonical[..nul]).map_err(|_| "header is not utf-8")?;
    let (kind, size) = header
        .split_once(' ')
        .ok_or_else(|| format!("malformed header {header:?}"))?;

    if kind.is_empty() {
        return Err("empty object kind".to_string());
    }

    let declared = size
        .parse::<usize>()
        .ok()
        .filter(|declared| declared.to_string() == size)
        .ok_or_else(|| format!("malformed object size {size:?}"))?;

    let payload = canonical.slice(nul + 1..);
    if payload.len() != declared {
        return Err(format!(
            "declared size {} does not match payload size {}",
            declared,
            payload.len()
        ));
    }

    Ok(RawObject::new(kind.to_string(), payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn canonical_form_prefixes_kind_and_decimal_length() {
        let canonical = canonical_form("blob", b"Hello\n");
        assert_eq!(&canonical[..], b"blob 6\0Hello\n");
    }

    #[test]
    fn well_known_ids_match_git() {
        let empty_blob = hash_canonical(&canonical_form("blob", b"")).unwrap();
        assert_eq!(empty_blob.as_ref(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");

        let empty_tree = hash_canonical(&canonical_form("tree", b"")).unwrap();
        assert_eq!(empty_tree.as_ref(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");

        let hello = hash_canonical(&canonical_form("blob", b"hello\n")).unwrap();
        assert_eq!(hello.as_ref(), "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn length_prefix_prevents_concatenation_ambiguity() {
        let ab = hash_canonical(&canonical_form("blob", b"ab")).unwrap();
        let a = hash_canonical(&canonical_form("blob", b"a")).unwrap();
        let a_then_b = hash_canonical(&[&canonical_form("blob", b"a")[..], b"b"].concat()).unwrap();

        assert_ne!(ab, a);
        assert_ne!(ab, a_then_b);
    }

    #[test]
    fn kind_participates_in_the_id() {
        let blob = hash_canonical(&canonical_form("blob", b"x")).unwrap();
        let tree = hash_canonical(&canonical_form("tree", b"x")).unwrap();
        assert_ne!(blob, tree);
    }

    #[test]
    fn parse_canonical_recovers_kind_and_payload() {
        let raw = parse_canonical(&canonical_form("note", b"a\0b")).unwrap();
        assert_eq!(raw.kind(), "note");
        assert_eq!(&raw.payload()[..], b"a\0b");
    }

    #[rstest]
    #[case(&b"blob 6Hello\n"[..])]
    #[case(&b"blob 7\0Hello\n"[..])]
    #[case(&b"blob 5\0Hello\n"[..])]
    #[case(&b"blob 06\0Hello\n"[..])]
    #[case(&b"blob\0Hello\n"[..])]
    #[case(&b" 6\0Hello\n"[..])]
    fn parse_canonical_rejects_malformed_headers(#[case] bytes: &[u8]) {
        assert!(parse_canonical(&Bytes::copy_from_slice(bytes)).is_err());
    }

    #[rstest]
    #[case("")]
    #[case("bl ob")]
    #[case("blob\0")]
    fn invalid_kinds_are_rejected(#[case] kind: &str) {
        assert!(matches!(
            validate_kind(kind),
            Err(StoreError::InvalidObjectKind(_))
        ));
    }
}
