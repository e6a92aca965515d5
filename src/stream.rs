//! Streaming chunked encrypt/decrypt driver.
//!
//! Transforms a read-only input stream into a write-only output stream,
//! one [`CHUNK_SIZE`]-aligned chunk at a time, while mixing four digests
//! (SHA-1 and SHA-256 of both the input and the output) along the way.
//! See the module docs in `DESIGN.md` for the on-disk layout.

use std::io::{Read, Write};

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::chunk::{self, FileKey, TAG_LEN};
use crate::error::{Error, Result};
use crate::nonce::{self, IV_LEN};

/// Plaintext chunk size. Changing this breaks compatibility with
/// existing ciphertext files; it is a compile-time constant for that
/// reason, not a runtime-configurable parameter.
pub const CHUNK_SIZE: usize = 262_144;
/// Magic byte + version + IV.
pub const HEADER_LEN: usize = 26;

const MAGIC: u8 = b'b';
const VERSION: u8 = 0x01;
const SCRATCH_SIZE: usize = 64 * 1024;

/// The four hex-encoded digests produced by a single `encrypt`/`decrypt`
/// pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digests {
    pub in_sha1: String,
    pub in_sha256: String,
    pub out_sha1: String,
    pub out_sha256: String,
}

struct DigestPair {
    sha1: Sha1,
    sha256: Sha256,
}

impl DigestPair {
    fn new() -> Self {
        Self {
            sha1: Sha1::new(),
            sha256: Sha256::new(),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        self.sha1.update(bytes);
        self.sha256.update(bytes);
    }

    fn finish_hex(self) -> (String, String) {
        (
            hex::encode(self.sha1.finalize()),
            hex::encode(self.sha256.finalize()),
        )
    }
}

enum Mode {
    Encrypt,
    Decrypt,
}

/// Encrypt `reader`'s bytes under `key`/`iv`, writing the framed
/// ciphertext (header + chunks) to `writer`.
///
/// # Errors
///
/// Returns [`Error::IoRead`]/[`Error::IoWrite`] on stream failure, or
/// [`Error::ShortWrite`] if `writer` does not accept a full write in one
/// call.
pub fn encrypt(
    key: &FileKey,
    iv: [u8; IV_LEN],
    reader: &mut dyn Read,
    writer: &mut dyn Write,
) -> Result<Digests> {
    run(key, Some(iv), Mode::Encrypt, reader, writer)
}

/// Decrypt the framed ciphertext read from `reader` under `key`, writing
/// plaintext to `writer`. The IV is read from the 26-byte header.
///
/// # Errors
///
/// Returns [`Error::ShortHeader`]/[`Error::InvalidHeader`] if the header
/// is missing or malformed, [`Error::AuthenticationFailed`] if any chunk
/// fails to authenticate, or the I/O variants above.
pub fn decrypt(key: &FileKey, reader: &mut dyn Read, writer: &mut dyn Write) -> Result<Digests> {
    run(key, None, Mode::Decrypt, reader, writer)
}

fn run(
    key: &FileKey,
    iv: Option<[u8; IV_LEN]>,
    mode: Mode,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
) -> Result<Digests> {
    let mut in_digest = DigestPair::new();
    let mut out_digest = DigestPair::new();

    let (iv, in_chunk_size) = match mode {
        Mode::Encrypt => {
            let iv = iv.expect("encrypt always supplies an iv");
            let mut header = [0u8; HEADER_LEN];
            header[0] = MAGIC;
            header[1] = VERSION;
            header[2..].copy_from_slice(&iv);
            write_checked(writer, &header)?;
            out_digest.update(&header);
            (iv, CHUNK_SIZE)
        }
        Mode::Decrypt => {
            let mut header = [0u8; HEADER_LEN];
            read_header(reader, &mut header)?;
            if header[0] != MAGIC || header[1] != VERSION {
                return Err(Error::InvalidHeader);
            }
            in_digest.update(&header);
            let iv: [u8; IV_LEN] = header[2..].try_into().unwrap();
            (iv, CHUNK_SIZE + TAG_LEN)
        }
    };

    let mut accumulator = vec![0u8; in_chunk_size];
    let mut filled = 0usize;
    let mut chunk_index = 0u64;
    let mut scratch = [0u8; SCRATCH_SIZE];

    loop {
        let n = reader.read(&mut scratch).map_err(Error::IoRead)?;
        if n == 0 {
            break;
        }

        if filled + n < in_chunk_size {
            accumulator[filled..filled + n].copy_from_slice(&scratch[..n]);
            in_digest.update(&scratch[..n]);
            filled += n;
        } else {
            let head = in_chunk_size - filled;
            accumulator[filled..].copy_from_slice(&scratch[..head]);
            in_digest.update(&scratch[..head]);

            chunk_index = process_chunk(
                key,
                &iv,
                &mode,
                chunk_index,
                &accumulator,
                writer,
                &mut out_digest,
            )?;
            filled = 0;

            let tail = n - head;
            if tail > 0 {
                accumulator[..tail].copy_from_slice(&scratch[head..n]);
                in_digest.update(&scratch[head..n]);
                filled = tail;
            }
        }
    }

    if filled > 0 {
        process_chunk(
            key,
            &iv,
            &mode,
            chunk_index,
            &accumulator[..filled],
            writer,
            &mut out_digest,
        )?;
    }

    let (in_sha1, in_sha256) = in_digest.finish_hex();
    let (out_sha1, out_sha256) = out_digest.finish_hex();
    Ok(Digests {
        in_sha1,
        in_sha256,
        out_sha1,
        out_sha256,
    })
}

#[allow(clippy::too_many_arguments)]
fn process_chunk(
    key: &FileKey,
    iv: &[u8; IV_LEN],
    mode: &Mode,
    chunk_index: u64,
    plain_or_cipher: &[u8],
    writer: &mut dyn Write,
    out_digest: &mut DigestPair,
) -> Result<u64> {
    let nonce = nonce::derive(iv, chunk_index);
    let out_bytes = match mode {
        Mode::Encrypt => chunk::seal(key, &nonce, plain_or_cipher)?,
        Mode::Decrypt => chunk::open(key, &nonce, plain_or_cipher)?,
    };
    write_checked(writer, &out_bytes)?;
    out_digest.update(&out_bytes);
    Ok(chunk_index + 1)
}

/// Read exactly `HEADER_LEN` bytes, mapping end-of-stream to
/// [`Error::ShortHeader`].
fn read_header(reader: &mut dyn Read, buf: &mut [u8; HEADER_LEN]) -> Result<()> {
    let mut got = 0;
    while got < buf.len() {
        let n = reader.read(&mut buf[got..]).map_err(Error::IoRead)?;
        if n == 0 {
            return Err(Error::ShortHeader);
        }
        got += n;
    }
    Ok(())
}

/// Write `bytes` in a single call, failing with [`Error::ShortWrite`] if
/// the writer accepts fewer bytes than offered.
fn write_checked(writer: &mut dyn Write, bytes: &[u8]) -> Result<()> {
    let n = writer.write(bytes).map_err(Error::IoWrite)?;
    if n != bytes.len() {
        return Err(Error::ShortWrite);
    }
    Ok(())
}
