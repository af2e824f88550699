use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::{vault, Persistence};
use crate::{Error, Result};

/// One key/value/encrypt triple held by the store.
///
/// `value` is the plain textual rendering of the original typed value for
/// unencrypted records, or the Base64 blob produced by [`vault::encrypt`]
/// for encrypted ones. `encrypt` records which decoding path the typed
/// getters must use.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Record {
    pub key: String,
    pub value: String,
    pub encrypt: bool,
}

/// An in-memory preference store backed by a single JSON file.
///
/// Records live in insertion order with at most one record per key (sets are
/// upserts). Mutations happen in memory only; [`PrefStore::save`] flushes the
/// full store to disk.
///
/// The store is not safe for concurrent mutation; a host sharing one
/// instance across threads must provide its own mutual exclusion.
pub struct PrefStore {
    records: Vec<Record>,
    passphrase: String,
    persistence: Persistence,
}

impl PrefStore {
    /// Opens a store at `path`, loading existing records if the file exists.
    ///
    /// A missing file yields an empty store; a file that exists but cannot
    /// be parsed fails with [`Error::Load`]. `passphrase` is the secret used
    /// to encrypt and decrypt values stored with `encrypt = true`.
    pub fn open<P: AsRef<Path>>(path: P, passphrase: &str) -> Result<Self> {
        let persistence = Persistence::new(path);
        let records = persistence.load()?;
        log::debug!(
            "opened preference store at {:?} with {} records",
            persistence.path(),
            records.len()
        );
        Ok(Self {
            records,
            passphrase: passphrase.to_string(),
            persistence,
        })
    }

    fn find(&self, key: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.key == key)
    }

    /// Returns the stored string for `key`, decrypting if needed.
    ///
    /// Missing keys return `default`. Plaintext getters never fail; an
    /// encrypted record propagates any decryption error.
    pub fn get_string(&self, key: &str, default: &str) -> Result<String> {
        match self.find(key) {
            Some(r) if r.encrypt => vault::decrypt(&r.value, &self.passphrase),
            Some(r) => Ok(r.value.clone()),
            None => Ok(default.to_string()),
        }
    }

    /// Returns the integer stored under `key`, or `default` if the key is
    /// missing or a plaintext value does not parse.
    ///
    /// An encrypted value that decrypts but does not parse as an integer is
    /// an [`Error::ValueParse`]: the ciphertext proves the caller stored
    /// *something* under this key, so silently handing back the default
    /// would mask a type mismatch.
    pub fn get_int(&self, key: &str, default: i32) -> Result<i32> {
        let Some(record) = self.find(key) else {
            return Ok(default);
        };
        if record.encrypt {
            let plain = vault::decrypt(&record.value, &self.passphrase)?;
            plain.parse().map_err(|_| Error::ValueParse {
                key: key.to_string(),
                expected: "integer",
            })
        } else {
            Ok(record.value.parse().unwrap_or(default))
        }
    }

    /// Returns the float stored under `key`, or `default` if the key is
    /// missing or a plaintext value does not parse.
    ///
    /// Same encrypted-value policy as [`PrefStore::get_int`].
    pub fn get_float(&self, key: &str, default: f32) -> Result<f32> {
        let Some(record) = self.find(key) else {
            return Ok(default);
        };
        if record.encrypt {
            let plain = vault::decrypt(&record.value, &self.passphrase)?;
            plain.parse().map_err(|_| Error::ValueParse {
                key: key.to_string(),
                expected: "float",
            })
        } else {
            Ok(record.value.parse().unwrap_or(default))
        }
    }

    /// Sets the value for `key`, encrypting it first if `encrypt` is true.
    ///
    /// Upsert: an existing record is overwritten in place (value and flag),
    /// otherwise a new record is appended.
    pub fn set_string(&mut self, key: &str, value: &str, encrypt: bool) {
        let stored = if encrypt {
            vault::encrypt(value, &self.passphrase).cipher_text
        } else {
            value.to_string()
        };
        match self.records.iter_mut().find(|r| r.key == key) {
            Some(record) => {
                record.value = stored;
                record.encrypt = encrypt;
            }
            None => self.records.push(Record {
                key: key.to_string(),
                value: stored,
                encrypt,
            }),
        }
    }

    /// Sets an integer value for `key`.
    pub fn set_int(&mut self, key: &str, value: i32, encrypt: bool) {
        self.set_string(key, &value.to_string(), encrypt);
    }

    /// Sets a float value for `key`.
    ///
    /// Rendering uses Rust's `Display`, which always writes `.` as the
    /// decimal separator regardless of host locale.
    pub fn set_float(&mut self, key: &str, value: f32, encrypt: bool) {
        self.set_string(key, &value.to_string(), encrypt);
    }

    /// Returns true if a record with `key` exists.
    pub fn has_key(&self, key: &str) -> bool {
        self.records.iter().any(|r| r.key == key)
    }

    /// Removes every record matching `key`.
    pub fn delete_key(&mut self, key: &str) {
        self.records.retain(|r| r.key != key);
    }

    /// Removes all records from the store. In-memory only; call
    /// [`PrefStore::save`] or use [`PrefStore::clear_and_persist`] to
    /// reflect the clearing on disk.
    pub fn delete_all(&mut self) {
        self.records.clear();
    }

    /// Writes the full store to disk, overwriting the preference file.
    pub fn save(&self) -> Result<()> {
        self.persistence.save(&self.records)
    }

    /// Clears the store and immediately persists the empty state, so the
    /// on-disk file cannot drift from the cleared in-memory state.
    pub fn clear_and_persist(&mut self) -> Result<()> {
        self.delete_all();
        self.save()
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the stored records in order (shared references only).
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Returns the raw stored string for `key` without decrypting.
    ///
    /// For an encrypted record this is the Base64 ciphertext blob.
    pub fn raw_value(&self, key: &str) -> Option<&str> {
        self.find(key).map(|r| r.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_store(dir: &tempfile::TempDir) -> PrefStore {
        PrefStore::open(dir.path().join("prefs.json"), "test-passphrase").unwrap()
    }

    #[test]
    fn test_string_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_string("name", "alice", false);
        assert_eq!(store.get_string("name", "").unwrap(), "alice");
    }

    #[test]
    fn test_int_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_int("level", 5, false);
        assert_eq!(store.get_int("level", -1).unwrap(), 5);
        store.set_int("neg", -42, false);
        assert_eq!(store.get_int("neg", 0).unwrap(), -42);
    }

    #[test]
    fn test_float_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_float("volume", 0.75, false);
        assert!((store.get_float("volume", 0.0).unwrap() - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_encrypted_roundtrip_all_types() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_string("token", "abc123", true);
        store.set_int("score", 99, true);
        store.set_float("ratio", 1.5, true);
        assert_eq!(store.get_string("token", "").unwrap(), "abc123");
        assert_eq!(store.get_int("score", 0).unwrap(), 99);
        assert!((store.get_float("ratio", 0.0).unwrap() - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_encrypted_value_is_ciphertext_at_rest() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_string("token", "abc123", true);
        let raw = store.raw_value("token").unwrap();
        assert_ne!(raw, "abc123");
        assert_eq!(store.get_string("token", "").unwrap(), "abc123");
    }

    #[test]
    fn test_missing_key_returns_default() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        assert_eq!(store.get_string("missing", "fallback").unwrap(), "fallback");
        assert_eq!(store.get_int("missing", 7).unwrap(), 7);
        assert!((store.get_float("missing", 3.14).unwrap() - 3.14).abs() < f32::EPSILON);
    }

    #[test]
    fn test_plaintext_parse_failure_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_string("notanumber", "hello", false);
        assert_eq!(store.get_int("notanumber", 13).unwrap(), 13);
        assert!((store.get_float("notanumber", 2.5).unwrap() - 2.5).abs() < f32::EPSILON);
    }

    // Diverges from the plaintext fallback on purpose: an encrypted value
    // that decrypts fine but is not numeric raises a typed error instead of
    // quietly returning the default.
    #[test]
    fn test_encrypted_parse_failure_is_typed_error() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_string("secret", "not a number", true);
        let res = store.get_int("secret", 0);
        assert!(matches!(
            res,
            Err(crate::Error::ValueParse { ref key, expected: "integer" }) if key == "secret"
        ));
        let res = store.get_float("secret", 0.0);
        assert!(matches!(res, Err(crate::Error::ValueParse { .. })));
    }

    #[test]
    fn test_upsert_keeps_one_record_per_key() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_int("k", 1, false);
        store.set_int("k", 2, false);
        store.set_string("k", "three", false);
        assert!(store.has_key("k"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_string("k", "").unwrap(), "three");
    }

    #[test]
    fn test_upsert_updates_encrypt_flag() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_string("k", "plain", false);
        store.set_string("k", "hidden", true);
        assert_eq!(store.len(), 1);
        assert_ne!(store.raw_value("k").unwrap(), "hidden");
        assert_eq!(store.get_string("k", "").unwrap(), "hidden");

        store.set_string("k", "plain again", false);
        assert_eq!(store.raw_value("k").unwrap(), "plain again");
    }

    #[test]
    fn test_delete_key() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_int("k", 1, false);
        store.delete_key("k");
        assert!(!store.has_key("k"));
        assert_eq!(store.get_int("k", -1).unwrap(), -1);
    }

    #[test]
    fn test_delete_all() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_int("a", 1, false);
        store.set_string("b", "two", true);
        store.delete_all();
        assert!(store.is_empty());
        assert!(!store.has_key("a"));
        assert!(!store.has_key("b"));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store.set_int("first", 1, false);
        store.set_int("second", 2, false);
        store.set_int("first", 3, false);
        let keys: Vec<&str> = store.records().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["first", "second"]);
    }
}
