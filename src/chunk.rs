//! Single-chunk sealing and opening.
//!
//! Wraps the extended-nonce XChaCha20-Poly1305 AEAD. No associated data
//! is bound to a chunk: the chunk index is authenticated only through the
//! nonce (see the module-level note in [`crate::nonce`] and the
//! compatibility rationale in `DESIGN.md`).

use chacha20poly1305::aead::Aead;
use chacha20poly1305::{KeyInit, XChaCha20Poly1305, XNonce};
use secrecy::{ExposeSecret, SecretBox};

use crate::error::{Error, Result};

pub const KEY_LEN: usize = 32;
pub const TAG_LEN: usize = 16;

/// A 256-bit file key, zeroized on drop.
pub struct FileKey(SecretBox<[u8; KEY_LEN]>);

impl FileKey {
    #[must_use]
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(SecretBox::new(Box::new(bytes)))
    }

    #[must_use]
    pub fn expose(&self) -> &[u8; KEY_LEN] {
        self.0.expose_secret()
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(self.expose().into())
    }
}

/// Seal `plaintext` under `key`/`nonce`. `|ciphertext| = |plaintext| + 16`.
///
/// # Errors
///
/// This cannot practically fail (no associated data, no plaintext length
/// limit we could hit in this codec's chunk sizes), but the underlying
/// AEAD crate returns a `Result`, so we surface it as
/// [`Error::InvariantViolation`] rather than panicking.
pub fn seal(key: &FileKey, nonce: &XNonce, plaintext: &[u8]) -> Result<Vec<u8>> {
    key.cipher()
        .encrypt(nonce, plaintext)
        .map_err(|_| Error::InvariantViolation("chunk seal failed"))
}

/// Open `ciphertext` under `key`/`nonce`.
///
/// # Errors
///
/// Returns [`Error::AuthenticationFailed`] if the tag does not verify
/// (wrong key, wrong nonce, or corrupted/tampered ciphertext).
pub fn open(key: &FileKey, nonce: &XNonce, ciphertext: &[u8]) -> Result<Vec<u8>> {
    key.cipher()
        .decrypt(nonce, ciphertext)
        .map_err(|_| Error::AuthenticationFailed)
}
