//! Metadata record for one encrypted blob, and the storage contract it's
//! kept behind.
//!
//! Each blob on disk carries only its encname; everything a restore
//! needs to make sense of it again — original path, key, IV, digests —
//! lives in a metadata record instead, so the ciphertext store itself
//! never reveals anything about its contents.

use crate::chunk::KEY_LEN;
use crate::nonce::IV_LEN;

/// One tracked file's metadata.
///
/// `key`/`iv` are stored hex-encoded, matching the boundary encoding
/// used everywhere else a key crosses into text (see `DESIGN.md`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub modified: i64,
    pub size: u64,
    pub perms: u32,
    pub owner: u32,

    pub encname: String,
    pub format: u8,
    pub key_hex: String,
    pub iv_hex: String,

    pub plain_sha1: String,
    pub plain_sha256: String,
    pub cipher_sha1: String,
    pub cipher_sha256: String,
}

impl Record {
    /// Decode [`Record::key_hex`] back into raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hex is malformed or the wrong
    /// length for a key.
    pub fn key_bytes(&self) -> Result<[u8; KEY_LEN], HexFieldError> {
        decode_fixed(&self.key_hex)
    }

    /// Decode [`Record::iv_hex`] back into raw IV bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hex is malformed or the wrong
    /// length for an IV.
    pub fn iv_bytes(&self) -> Result<[u8; IV_LEN], HexFieldError> {
        decode_fixed(&self.iv_hex)
    }
}

#[derive(Debug)]
pub enum HexFieldError {
    Malformed(hex::FromHexError),
    WrongLength { expected: usize, got: usize },
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], HexFieldError> {
    let bytes = hex::decode(s).map_err(HexFieldError::Malformed)?;
    if bytes.len() != N {
        return Err(HexFieldError::WrongLength {
            expected: N,
            got: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Storage contract for [`Record`]s, independent of the backing
/// technology (SQL database, embedded KV store, in-memory for tests).
pub trait MetadataStore {
    type Error;

    /// Insert a new record. `record.id` is ignored; the store assigns
    /// the final id.
    fn insert(&mut self, record: Record) -> Result<i64, Self::Error>;

    /// Replace the record with the matching `id` in full.
    fn update(&mut self, record: Record) -> Result<(), Self::Error>;

    fn delete(&mut self, id: i64) -> Result<(), Self::Error>;

    fn get_by_encname(&self, encname: &str) -> Result<Option<Record>, Self::Error>;

    fn get_by_name(&self, name: &str) -> Result<Option<Record>, Self::Error>;

    fn get_by_id(&self, id: i64) -> Result<Option<Record>, Self::Error>;

    /// All records, ordered by `name`, case-insensitively, ascending.
    fn get_all(&self) -> Result<Vec<Record>, Self::Error>;

    /// All records whose `name` starts with `prefix`, ordered by
    /// `name` ascending.
    fn get_by_name_prefix(&self, prefix: &str) -> Result<Vec<Record>, Self::Error>;
}

/// Reference [`MetadataStore`] implementation backed by a `Vec`, used
/// to exercise the trait's contract in tests.
#[derive(Default)]
pub struct InMemoryStore {
    records: Vec<Record>,
    next_id: i64,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

impl MetadataStore for InMemoryStore {
    type Error = std::convert::Infallible;

    fn insert(&mut self, mut record: Record) -> Result<i64, Self::Error> {
        let id = self.next_id;
        self.next_id += 1;
        record.id = id;
        self.records.push(record);
        Ok(id)
    }

    fn update(&mut self, record: Record) -> Result<(), Self::Error> {
        if let Some(slot) = self.records.iter_mut().find(|r| r.id == record.id) {
            *slot = record;
        }
        Ok(())
    }

    fn delete(&mut self, id: i64) -> Result<(), Self::Error> {
        self.records.retain(|r| r.id != id);
        Ok(())
    }

    fn get_by_encname(&self, encname: &str) -> Result<Option<Record>, Self::Error> {
        Ok(self.records.iter().find(|r| r.encname == encname).cloned())
    }

    fn get_by_name(&self, name: &str) -> Result<Option<Record>, Self::Error> {
        Ok(self.records.iter().find(|r| r.name == name).cloned())
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Record>, Self::Error> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn get_all(&self) -> Result<Vec<Record>, Self::Error> {
        let mut out = self.records.clone();
        out.sort_by_key(|r| r.name.to_lowercase());
        Ok(out)
    }

    fn get_by_name_prefix(&self, prefix: &str) -> Result<Vec<Record>, Self::Error> {
        let mut out: Vec<Record> = self
            .records
            .iter()
            .filter(|r| r.name.starts_with(prefix))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> Record {
        Record {
            id: 0,
            name: name.to_string(),
            modified: 0,
            size: 0,
            perms: 0o644,
            owner: 1000,
            encname: crate::encname::generate(),
            format: 1,
            key_hex: hex::encode([0x11; KEY_LEN]),
            iv_hex: hex::encode([0x22; IV_LEN]),
            plain_sha1: String::new(),
            plain_sha256: String::new(),
            cipher_sha1: String::new(),
            cipher_sha256: String::new(),
        }
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut store = InMemoryStore::new();
        let a = store.insert(record("a")).unwrap();
        let b = store.insert(record("b")).unwrap();
        assert!(b > a);
    }

    #[test]
    fn get_by_name_and_encname_round_trip() {
        let mut store = InMemoryStore::new();
        let r = record("report.pdf");
        let encname = r.encname.clone();
        store.insert(r).unwrap();

        assert_eq!(
            store.get_by_name("report.pdf").unwrap().unwrap().encname,
            encname
        );
        assert_eq!(
            store.get_by_encname(&encname).unwrap().unwrap().name,
            "report.pdf"
        );
    }

    #[test]
    fn update_replaces_record_in_place() {
        let mut store = InMemoryStore::new();
        let id = store.insert(record("old.txt")).unwrap();

        let mut updated = store.get_by_id(id).unwrap().unwrap();
        updated.name = "new.txt".to_string();
        store.update(updated).unwrap();

        assert!(store.get_by_name("old.txt").unwrap().is_none());
        assert_eq!(store.get_by_name("new.txt").unwrap().unwrap().id, id);
    }

    #[test]
    fn delete_removes_record() {
        let mut store = InMemoryStore::new();
        let id = store.insert(record("gone.txt")).unwrap();
        store.delete(id).unwrap();
        assert!(store.get_by_id(id).unwrap().is_none());
    }

    #[test]
    fn get_all_orders_by_name_case_insensitively() {
        let mut store = InMemoryStore::new();
        for name in ["banana", "Apple", "cherry"] {
            store.insert(record(name)).unwrap();
        }
        let names: Vec<_> = store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn get_by_name_prefix_filters_and_orders() {
        let mut store = InMemoryStore::new();
        for name in ["backup-b", "backup-a", "other"] {
            store.insert(record(name)).unwrap();
        }
        let names: Vec<_> = store
            .get_by_name_prefix("backup-")
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["backup-a", "backup-b"]);
    }

    #[test]
    fn key_bytes_and_iv_bytes_decode_stored_hex() {
        let r = record("x");
        assert_eq!(r.key_bytes().unwrap(), [0x11; KEY_LEN]);
        assert_eq!(r.iv_bytes().unwrap(), [0x22; IV_LEN]);
    }

    #[test]
    fn key_bytes_rejects_wrong_length() {
        let mut r = record("x");
        r.key_hex = hex::encode([0x11; 16]);
        assert!(matches!(
            r.key_bytes(),
            Err(HexFieldError::WrongLength {
                expected: KEY_LEN,
                got: 16
            })
        ));
    }
}
