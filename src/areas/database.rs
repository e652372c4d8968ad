use crate::areas::layout::{create_dir_all, write_temp_file};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{
    Object, ObjectBox, RawObject, Unpackable, canonical_form, hash_canonical, parse_canonical,
    validate_kind,
};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Result, StoreError};
use bytes::Bytes;
use std::io::{Cursor, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Content-addressed object database
///
/// Objects live at `<objects>/<2 hex>/<38 hex>` as zlib-compressed canonical
/// representations. Writes go through a temporary file and a rename, so readers
/// never observe a partially written object and racing writers of the same
/// object are harmless.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    /// Compute the id an object would have, without writing it
    pub fn hash(&self, kind: &str, payload: &[u8]) -> Result<ObjectId> {
        validate_kind(kind)?;
        hash_canonical(&canonical_form(kind, payload))
    }

    /// Persist a typed object and return its id
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let payload = object.serialize()?;
        self.store_raw(object.object_type().as_str(), &payload)
    }

    /// Persist an arbitrary `(kind, payload)` pair and return its id
    ///
    /// The kind is opaque here; meaning is validated by the tree and commit builders.
    /// Storing an object that already exists is a no-op.
    pub fn store_raw(&self, kind: &str, payload: &[u8]) -> Result<ObjectId> {
        validate_kind(kind)?;

        let canonical = canonical_form(kind, payload);
        let object_id = hash_canonical(&canonical)?;
        let object_path = self.object_path(&object_id);

        // write the object to disk unless it already exists
        if object_path.exists() {
            trace!(oid = %object_id, kind, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path.parent().ok_or_else(|| {
            StoreError::io(
                &object_path,
                std::io::Error::new(ErrorKind::InvalidInput, "object path has no parent"),
            )
        })?;
        create_dir_all(object_dir)?;

        self.write_object(object_dir, &object_path, canonical)?;
        debug!(oid = %object_id, kind, size = payload.len(), "stored object");

        Ok(object_id)
    }

    /// Read an object back as its opaque kind and payload
    ///
    /// The decompressed bytes are validated against the declared size and
    /// re-hashed against `object_id`.
    pub fn load(&self, object_id: &ObjectId) -> Result<RawObject> {
        let canonical = self.read_object(object_id)?;

        let raw_object =
            parse_canonical(&canonical).map_err(|reason| StoreError::corrupt(object_id, reason))?;

        let actual_id = hash_canonical(&canonical)?;
        if &actual_id != object_id {
            return Err(StoreError::corrupt(
                object_id,
                format!("content hashes to {actual_id}"),
            ));
        }

        trace!(oid = %object_id, kind = raw_object.kind(), "loaded object");
        Ok(raw_object)
    }

    /// Read and decode an object of any known kind
    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let (object_type, payload) = self.parse_object_as_bytes(object_id)?;

        let object = match object_type {
            ObjectType::Blob => Blob::deserialize(Cursor::new(payload)).map(|blob| {
                ObjectBox::Blob(Box::new(blob))
            }),
            ObjectType::Tree => {
                Tree::deserialize(Cursor::new(payload)).map(|tree| ObjectBox::Tree(Box::new(tree)))
            }
            ObjectType::Commit => Commit::deserialize(Cursor::new(payload))
                .map(|commit| ObjectBox::Commit(Box::new(commit))),
        };

        object.map_err(|err| Self::as_corruption(object_id, err))
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> Result<Blob> {
        self.parse_object_as(object_id, ObjectType::Blob)
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> Result<Tree> {
        self.parse_object_as(object_id, ObjectType::Tree)
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Commit> {
        self.parse_object_as(object_id, ObjectType::Commit)
    }

    /// Get the type of an object without decoding its payload
    pub fn get_object_type(&self, object_id: &ObjectId) -> Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    fn parse_object_as<T: Unpackable>(
        &self,
        object_id: &ObjectId,
        expected: ObjectType,
    ) -> Result<T> {
        let (object_type, payload) = self.parse_object_as_bytes(object_id)?;

        if object_type != expected {
            return Err(StoreError::UnexpectedObjectType {
                oid: object_id.clone(),
                expected: expected.to_string(),
                found: object_type.to_string(),
            });
        }

        T::deserialize(Cursor::new(payload)).map_err(|err| Self::as_corruption(object_id, err))
    }

    fn parse_object_as_bytes(&self, object_id: &ObjectId) -> Result<(ObjectType, Bytes)> {
        let raw_object = self.load(object_id)?;
        let object_type = raw_object.object_type()?;
        let (_, payload) = raw_object.into_parts();

        Ok((object_type, payload))
    }

    fn as_corruption(object_id: &ObjectId, err: StoreError) -> StoreError {
        match err {
            StoreError::Malformed { .. } => StoreError::corrupt(object_id, err.to_string()),
            err => err,
        }
    }

    fn read_object(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.object_path(object_id);

        let object_content = std::fs::read(&object_path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StoreError::ObjectNotFound(object_id.clone()),
            _ => StoreError::io(&object_path, err),
        })?;

        Self::decompress(&object_content)
            .map_err(|err| StoreError::corrupt(object_id, format!("cannot decompress: {err}")))
    }

    fn write_object(&self, object_dir: &Path, object_path: &Path, content: Bytes) -> Result<()> {
        let content =
            Self::compress(&content).map_err(|err| StoreError::io(object_path, err))?;

        let temp_object_path = write_temp_file(object_dir, "tmp-obj", &content)?;

        // rename the temp file to the object file to make it atomic
        if let Err(err) = std::fs::rename(&temp_object_path, object_path) {
            let _ = std::fs::remove_file(&temp_object_path);
            return Err(StoreError::io(object_path, err));
        }

        Ok(())
    }

    fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::best());
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }

    /// Find all objects whose id starts with the given prefix.
    ///
    /// Used to resolve abbreviated ids to their full form. More than one match
    /// means the prefix is ambiguous.
    ///
    /// # Performance
    ///
    /// - For prefixes of 2+ characters, only searches the specific directory
    /// - For prefixes of 0-1 characters, must search all directories (slower)
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        if !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Vec::new());
        }

        let dir_names = if prefix.len() >= 2 {
            vec![prefix[..2].to_string()]
        } else {
            (0..=255u8).map(|i| format!("{i:02x}")).collect()
        };

        let mut matches = Vec::new();
        for dir_name in dir_names {
            let dir_path = self.path.join(&dir_name);
            if !dir_path.is_dir() {
                continue;
            }

            let entries = std::fs::read_dir(&dir_path).map_err(|err| StoreError::io(&dir_path, err))?;
            for entry in entries {
                let entry = entry.map_err(|err| StoreError::io(&dir_path, err))?;
                let full_oid = format!("{}{}", dir_name, entry.file_name().to_string_lossy());

                // temp files and strays fail to parse and are skipped
                if full_oid.starts_with(&prefix)
                    && let Ok(oid) = ObjectId::try_parse(full_oid)
                {
                    matches.push(oid);
                }
            }
        }

        matches.sort();
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::entry_mode::EntryMode;
    use crate::artifacts::objects::tree::TreeEntry;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct TestDatabase {
        _dir: TempDir,
        database: Database,
    }

    #[fixture]
    fn db() -> TestDatabase {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        TestDatabase { _dir: dir, database }
    }

    fn count_objects(database: &Database) -> usize {
        walkdir::WalkDir::new(database.objects_path())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .count()
    }

    #[rstest]
    fn writing_twice_yields_one_object(db: TestDatabase) {
        let first = db.database.store_raw("blob", b"Hello\n").unwrap();
        let second = db.database.store_raw("blob", b"Hello\n").unwrap();

        assert_eq!(first, second);
        assert_eq!(count_objects(&db.database), 1);
        assert!(db.database.contains(&first));
    }

    #[rstest]
    #[case("blob", &b"Hello\n"[..])]
    #[case("blob", &b""[..])]
    #[case("commit", &b"not really a commit"[..])]
    #[case("custom-kind", &b"\x00\x01\x02"[..])]
    fn load_returns_what_was_stored(db: TestDatabase, #[case] kind: &str, #[case] payload: &[u8]) {
        let oid = db.database.store_raw(kind, payload).unwrap();
        let raw = db.database.load(&oid).unwrap();

        assert_eq!(raw.kind(), kind);
        assert_eq!(&raw.payload()[..], payload);
    }

    #[rstest]
    fn object_lands_at_fan_out_path(db: TestDatabase) {
        let oid = db.database.store_raw("blob", b"hello\n").unwrap();

        assert_eq!(oid.as_ref(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(
            db.database
                .objects_path()
                .join("ce")
                .join("013625030ba8dba906f756967f9e9ca394464a")
                .is_file()
        );
    }

    #[rstest]
    fn stored_bytes_are_zlib_of_canonical_form(db: TestDatabase) {
        let oid = db.database.store_raw("blob", b"hello\n").unwrap();
        let compressed = std::fs::read(db.database.object_path(&oid)).unwrap();

        let inflated = Database::decompress(&compressed).unwrap();
        assert_eq!(&inflated[..], b"blob 6\0hello\n");
    }

    #[rstest]
    fn hash_does_not_write(db: TestDatabase) {
        let oid = db.database.hash("blob", b"hello\n").unwrap();

        assert_eq!(oid.as_ref(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(!db.database.contains(&oid));
    }

    #[rstest]
    fn missing_object_is_not_found(db: TestDatabase) {
        let oid = db.database.hash("blob", b"never stored").unwrap();
        let err = db.database.load(&oid).unwrap_err();

        assert!(matches!(err, StoreError::ObjectNotFound(_)));
        assert!(err.is_not_found());
    }

    fn overwrite_with(database: &Database, oid: &ObjectId, canonical: &[u8]) {
        let compressed = Database::compress(canonical).unwrap();
        std::fs::write(database.object_path(oid), compressed).unwrap();
    }

    #[rstest]
    fn length_mismatch_is_corruption(db: TestDatabase) {
        let oid = db.database.store_raw("blob", b"Hello\n").unwrap();
        overwrite_with(&db.database, &oid, b"blob 9\0Hello\n");

        let err = db.database.load(&oid).unwrap_err();
        assert!(err.is_corruption(), "{err}");
        assert!(err.to_string().contains("declared size 9"));
    }

    #[rstest]
    fn digest_mismatch_is_corruption(db: TestDatabase) {
        let oid = db.database.store_raw("blob", b"Hello\n").unwrap();
        overwrite_with(&db.database, &oid, b"blob 6\0Jello\n");

        let err = db.database.load(&oid).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[rstest]
    fn garbage_is_corruption(db: TestDatabase) {
        let oid = db.database.store_raw("blob", b"Hello\n").unwrap();
        std::fs::write(db.database.object_path(&oid), b"definitely not zlib").unwrap();

        assert!(db.database.load(&oid).unwrap_err().is_corruption());
    }

    #[rstest]
    fn typed_read_checks_the_kind(db: TestDatabase) {
        let blob_oid = db.database.store(&Blob::new("content")).unwrap();

        assert_eq!(
            &db.database.parse_object_as_blob(&blob_oid).unwrap().content()[..],
            b"content"
        );
        assert!(matches!(
            db.database.parse_object_as_tree(&blob_oid),
            Err(StoreError::UnexpectedObjectType { .. })
        ));
    }

    #[rstest]
    fn unknown_kind_is_reported_on_typed_read(db: TestDatabase) {
        let oid = db.database.store_raw("tag", b"object ...").unwrap();

        assert_eq!(db.database.load(&oid).unwrap().kind(), "tag");
        assert!(matches!(
            db.database.parse_object(&oid),
            Err(StoreError::UnknownObjectType(kind)) if kind == "tag"
        ));
    }

    #[rstest]
    fn malformed_tree_payload_is_corruption(db: TestDatabase) {
        let oid = db.database.store_raw("tree", b"100644 truncated").unwrap();

        assert!(db.database.parse_object_as_tree(&oid).unwrap_err().is_corruption());
    }

    #[rstest]
    fn parse_object_decodes_trees(db: TestDatabase) {
        let blob_oid = db.database.store(&Blob::new("x")).unwrap();
        let tree = Tree::build([TreeEntry::new(EntryMode::Regular, "x.txt", blob_oid)]).unwrap();
        let tree_oid = db.database.store(&tree).unwrap();

        match db.database.parse_object(&tree_oid).unwrap() {
            ObjectBox::Tree(parsed) => assert_eq!(*parsed, tree),
            _ => panic!("expected a tree"),
        }
        assert_eq!(db.database.get_object_type(&tree_oid).unwrap(), ObjectType::Tree);
    }

    #[rstest]
    fn prefix_lookup_finds_matching_objects(db: TestDatabase) {
        let oid = db.database.store_raw("blob", b"hello\n").unwrap();

        assert_eq!(db.database.find_objects_by_prefix("ce0136").unwrap(), vec![oid.clone()]);
        assert_eq!(db.database.find_objects_by_prefix("c").unwrap(), vec![oid]);
        assert!(db.database.find_objects_by_prefix("ffff").unwrap().is_empty());
        assert!(db.database.find_objects_by_prefix("xyz").unwrap().is_empty());
    }

    #[rstest]
    fn no_temp_files_are_left_behind(db: TestDatabase) {
        for i in 0..10 {
            db.database.store_raw("blob", format!("{i}").as_bytes()).unwrap();
        }

        let leftovers = walkdir::WalkDir::new(db.database.objects_path())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("tmp-obj-"))
            .count();
        assert_eq!(leftovers, 0);
        assert_eq!(count_objects(&db.database), 10);
    }
}
