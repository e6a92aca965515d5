//! Opaque on-disk names for encrypted blobs.
//!
//! Real file names and paths are confidential metadata, so ciphertext
//! blobs are stored under a random name that carries no information
//! about their contents. 25 bytes of CSPRNG output, base-32 encoded,
//! gives a fixed 40-character name with negligible collision odds even
//! across very large backup sets.

use data_encoding::BASE32;
use rand::RngCore;

const RAW_LEN: usize = 25;
pub const ENCNAME_LEN: usize = 40;

/// Generate a fresh 40-character encname.
#[must_use]
pub fn generate() -> String {
    let mut raw = [0u8; RAW_LEN];
    rand::rng().fill_bytes(&mut raw);
    BASE32.encode(&raw)
}
