//! Per-chunk nonce derivation.
//!
//! A single random 24-byte IV is generated per file. Each chunk's nonce
//! reuses the IV's high 16 bytes verbatim and derives its low 8 bytes by
//! adding the chunk index to the IV's own low 8 bytes (read as a
//! little-endian counter). This gives every `(file, chunk)` pair a
//! distinct nonce without needing to persist anything beyond the IV.

use chacha20poly1305::XNonce;

pub const IV_LEN: usize = 24;
pub const NONCE_LEN: usize = 24;

/// Derive the 24-byte nonce for `chunk_index` given a file's IV.
///
/// Wrapping addition is used deliberately: a file would need `2^64`
/// chunks (far beyond any realistic input) before the counter wraps and
/// nonce reuse becomes possible.
#[must_use]
pub fn derive(iv: &[u8; IV_LEN], chunk_index: u64) -> XNonce {
    let mut nonce = [0u8; NONCE_LEN];
    nonce[..16].copy_from_slice(&iv[..16]);

    let counter_base = u64::from_le_bytes(iv[16..24].try_into().unwrap());
    let counter = counter_base.wrapping_add(chunk_index);
    nonce[16..].copy_from_slice(&counter.to_le_bytes());

    XNonce::from(nonce)
}
