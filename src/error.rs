use std::fmt;
use std::io;

/// Failure modes of the chunked codec and the seekable reader.
///
/// `AuthenticationFailed` is the only security-relevant variant: it must
/// halt the operation immediately, and callers must never see the
/// partially-decrypted chunk that triggered it.
#[derive(Debug)]
pub enum Error {
    IoRead(io::Error),
    IoWrite(io::Error),
    ShortHeader,
    InvalidHeader,
    AuthenticationFailed,
    ShortWrite,
    InvalidSeek,
    InvariantViolation(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoRead(e) => write!(f, "could not read from input: {e}"),
            Self::IoWrite(e) => write!(f, "could not write to output: {e}"),
            Self::ShortHeader => write!(f, "fewer than 26 header bytes available"),
            Self::InvalidHeader => write!(f, "unrecognized magic byte or format version"),
            Self::AuthenticationFailed => write!(
                f,
                "\
could not decrypt chunk.
You are likely using the wrong key, or the data is corrupted."
            ),
            Self::ShortWrite => write!(f, "output stream accepted fewer bytes than offered"),
            Self::InvalidSeek => write!(f, "seek offset is negative or whence is unsupported"),
            Self::InvariantViolation(what) => write!(f, "internal invariant violated: {what}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
