//! Seekable decrypting reader.
//!
//! Wraps a random-access ciphertext source (anything `Read + Seek`) and
//! exposes a `Read + Seek` view over the plaintext, decrypting at most
//! one chunk per call and caching it so repeated small reads within a
//! chunk don't re-decrypt.

use std::io::{self, Read, Seek, SeekFrom};

use crate::chunk::{self, FileKey, TAG_LEN};
use crate::error::{Error, Result};
use crate::nonce::{self, IV_LEN};
use crate::stream::{CHUNK_SIZE, HEADER_LEN};

const MAGIC: u8 = b'b';
const VERSION: u8 = 0x01;

/// No chunk is currently cached.
const NO_CHUNK: u64 = u64::MAX;
/// No seek is pending.
const NO_SEEK: i64 = -1;

/// A seekable, chunk-caching decrypting view over ciphertext produced by
/// [`crate::stream::encrypt`].
pub struct DecryptingReader<R> {
    key: FileKey,
    iv: [u8; IV_LEN],
    backing: R,

    cursor: u64,
    cached_chunk_index: u64,
    plain_cache: Vec<u8>,
    pending_seek: i64,
    eof: bool,
}

impl<R: Read + Seek> DecryptingReader<R> {
    /// Read and validate the 26-byte header from `backing`, adopting its
    /// IV, without decrypting anything eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShortHeader`]/[`Error::InvalidHeader`] if the
    /// header is missing or malformed.
    pub fn new(key: FileKey, mut backing: R) -> Result<Self> {
        let mut header = [0u8; HEADER_LEN];
        read_exact_or_short(&mut backing, &mut header)?;
        if header[0] != MAGIC || header[1] != VERSION {
            return Err(Error::InvalidHeader);
        }
        let iv: [u8; IV_LEN] = header[2..].try_into().unwrap();

        Ok(Self {
            key,
            iv,
            backing,
            cursor: 0,
            cached_chunk_index: NO_CHUNK,
            plain_cache: Vec::new(),
            pending_seek: NO_SEEK,
            eof: false,
        })
    }

    fn ciphertext_chunk_len(&self) -> usize {
        CHUNK_SIZE + TAG_LEN
    }

    fn load_chunk(&mut self, chunk_index: u64) -> Result<()> {
        let chunk_offset = HEADER_LEN as u64 + chunk_index * self.ciphertext_chunk_len() as u64;
        self.backing
            .seek(SeekFrom::Start(chunk_offset))
            .map_err(Error::IoRead)?;

        let mut cipher_buf = vec![0u8; self.ciphertext_chunk_len()];
        let n = read_up_to(&mut self.backing, &mut cipher_buf)?;

        // EOF probe: force one more read so a chunk that exactly fills
        // the buffer still surfaces end-of-stream now rather than on the
        // caller's next read.
        let mut probe = [0u8; 1];
        if self.backing.read(&mut probe).map_err(Error::IoRead)? == 0 {
            self.eof = true;
        }

        // No ciphertext at all at this position: past the last real
        // chunk. Cache an empty chunk rather than feeding an
        // undersized slice to the AEAD, which would report a spurious
        // authentication failure instead of a clean empty read.
        if n == 0 {
            self.plain_cache.clear();
            self.cached_chunk_index = chunk_index;
            return Ok(());
        }

        let nonce = nonce::derive(&self.iv, chunk_index);
        self.plain_cache = chunk::open(&self.key, &nonce, &cipher_buf[..n])?;
        self.cached_chunk_index = chunk_index;
        Ok(())
    }
}

impl<R: Read + Seek> Read for DecryptingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending_seek != NO_SEEK {
            let target = self.pending_seek as u64;
            let target_chunk = target / CHUNK_SIZE as u64;
            if target_chunk != self.cached_chunk_index {
                self.cached_chunk_index = NO_CHUNK;
            }
            self.cursor = target;
            self.pending_seek = NO_SEEK;
        }

        if self.cached_chunk_index == NO_CHUNK {
            // Once the backing stream is known exhausted, every chunk
            // from here on reads as empty; skip the redundant seek.
            if self.eof {
                return Ok(0);
            }
            let chunk_index = self.cursor / CHUNK_SIZE as u64;
            self.load_chunk(chunk_index).map_err(io::Error::other)?;
        }

        let offset_in_chunk = (self.cursor % CHUNK_SIZE as u64) as usize;
        let available = self.plain_cache.len().saturating_sub(offset_in_chunk);

        if available == 0 {
            self.cached_chunk_index = NO_CHUNK;
            return Ok(0);
        }

        let n = if buf.len() >= available {
            buf[..available].copy_from_slice(&self.plain_cache[offset_in_chunk..]);
            self.cursor += available as u64;
            self.cached_chunk_index = NO_CHUNK;
            available
        } else {
            buf.copy_from_slice(&self.plain_cache[offset_in_chunk..offset_in_chunk + buf.len()]);
            self.cursor += buf.len() as u64;
            buf.len()
        };

        Ok(n)
    }
}

impl<R: Read + Seek> Seek for DecryptingReader<R> {
    /// Only [`SeekFrom::Start`] is supported; any other whence, or a
    /// negative [`SeekFrom::Start`] offset cast, fails with
    /// [`Error::InvalidSeek`].
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let SeekFrom::Start(offset) = pos else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                Error::InvalidSeek,
            ));
        };
        self.pending_seek = i64::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, Error::InvalidSeek))?;
        self.eof = false;
        Ok(offset)
    }
}

fn read_exact_or_short(reader: &mut impl Read, buf: &mut [u8]) -> Result<()> {
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

/// Read up to `buf.len()` bytes, looping on short reads until either the
/// buffer fills or the source reports end-of-stream. A short chunk read
/// this way is the legitimate final (tail) chunk, not corruption.
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut got = 0;
    while got < buf.len() {
        let n = reader.read(&mut buf[got..]).map_err(Error::IoRead)?;
        if n == 0 {
            break;
        }
        got += n;
    }
    Ok(got)
}
