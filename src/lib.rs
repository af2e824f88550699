//! Prefstore is a small local key-value preference store persisted as a
//! single JSON file, with optional per-value encryption.
//!
//! Values are kept in memory as string records and flushed to disk on an
//! explicit [`PrefStore::save`]. A value stored with `encrypt = true` is run
//! through a password-based AES-256-CBC scheme before it ever touches the
//! record list, so the file at rest only contains ciphertext for those keys.
//!
//! ## Core Components
//! - [`engine::store`]: the in-memory record store with typed accessors.
//! - [`engine::persistence`]: atomic single-file load/save.
//! - [`engine::vault`]: password-based value encryption.
//!
//! ```no_run
//! use prefstore::PrefStore;
//!
//! # fn main() -> prefstore::Result<()> {
//! let mut prefs = PrefStore::open("prefs.json", "hunter2")?;
//! prefs.set_int("level", 5, false);
//! prefs.set_string("token", "abc123", true);
//! prefs.save()?;
//! assert_eq!(prefs.get_int("level", 0)?, 5);
//! # Ok(())
//! # }
//! ```

pub mod engine;

use thiserror::Error;

pub use engine::store::{PrefStore, Record};

/// Errors returned by the preference store.
#[derive(Error, Debug)]
pub enum Error {
    /// An encrypted value is not a valid Base64 blob, or is too short to
    /// contain the salt and IV.
    #[error("malformed encrypted value: {0}")]
    Format(String),
    /// Decryption failed: wrong passphrase, or the ciphertext was corrupted.
    #[error("decryption failed (wrong passphrase or corrupted data)")]
    Decryption,
    /// Decryption succeeded but the recovered bytes are not valid UTF-8.
    #[error("decrypted value is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    /// The preference file exists but could not be parsed.
    #[error("preference file is not valid: {0}")]
    Load(#[source] serde_json::Error),
    /// Error while serializing the store for saving.
    #[error("serialization error: {0}")]
    Serialization(serde_json::Error),
    /// An I/O error occurred while reading or writing the preference file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A decrypted value did not parse as the requested numeric type.
    #[error("value for key {key:?} is not a valid {expected}")]
    ValueParse {
        /// The key whose value failed to parse.
        key: String,
        /// Human-readable name of the requested type.
        expected: &'static str,
    },
}

/// A specialized Result type for preference store operations.
pub type Result<T> = std::result::Result<T, Error>;
