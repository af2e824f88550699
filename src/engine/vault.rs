use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Sha1;

use crate::{Error, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Length of the key-derivation salt in bytes.
pub const SALT_LEN: usize = 16;

/// Length of the CBC initialization vector in bytes.
pub const IV_LEN: usize = 16;

/// Length of the derived AES-256 key in bytes.
const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA1 iteration count.
const PBKDF2_ROUNDS: u32 = 100_000;

/// Output of [`encrypt`].
///
/// Only `cipher_text` is needed to decrypt: the salt and IV are embedded in
/// the blob and the key is re-derived from the passphrase. The Base64 `key`
/// and `iv` fields are exposed for diagnostics.
#[derive(Debug)]
pub struct Sealed {
    /// Base64 of `salt(16) || iv(16) || ciphertext`, the storable blob.
    pub cipher_text: String,
    /// Base64 of the derived 32-byte key.
    pub key: String,
    /// Base64 of the 16-byte IV.
    pub iv: String,
}

/// Derives a 32-byte AES key from a passphrase and salt.
fn derive_key(passphrase: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha1>(passphrase.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    key
}

/// Encrypts a plaintext string with a passphrase.
///
/// Generates a fresh random salt and IV per call, derives the key with
/// PBKDF2-HMAC-SHA1 (100,000 rounds), and encrypts with AES-256-CBC and
/// PKCS7 padding. The returned blob is `Base64(salt || iv || ciphertext)`.
pub fn encrypt(plaintext: &str, passphrase: &str) -> Sealed {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(passphrase, &salt);
    let ciphertext = Aes256CbcEnc::new(&key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut combined = Vec::with_capacity(SALT_LEN + IV_LEN + ciphertext.len());
    combined.extend_from_slice(&salt);
    combined.extend_from_slice(&iv);
    combined.extend_from_slice(&ciphertext);

    Sealed {
        cipher_text: BASE64.encode(&combined),
        key: BASE64.encode(key),
        iv: BASE64.encode(iv),
    }
}

/// Decrypts a blob produced by [`encrypt`] using the same passphrase.
///
/// Fails with [`Error::Format`] if the blob is not valid Base64 or is too
/// short to contain the salt and IV, with [`Error::Decryption`] on a wrong
/// passphrase or corrupted ciphertext, and with [`Error::Encoding`] if the
/// recovered bytes are not valid UTF-8.
pub fn decrypt(blob: &str, passphrase: &str) -> Result<String> {
    let combined = BASE64
        .decode(blob)
        .map_err(|e| Error::Format(e.to_string()))?;
    if combined.len() < SALT_LEN + IV_LEN {
        return Err(Error::Format(format!(
            "blob too short: {} bytes, need at least {}",
            combined.len(),
            SALT_LEN + IV_LEN
        )));
    }

    let (salt, rest) = combined.split_at(SALT_LEN);
    let (iv, ciphertext) = rest.split_at(IV_LEN);

    let key = derive_key(passphrase, salt);
    let plaintext = Aes256CbcDec::new_from_slices(&key, iv)
        .map_err(|e| Error::Format(e.to_string()))?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| Error::Decryption)?;

    Ok(String::from_utf8(plaintext)?)
}
