pub mod chunk;
pub mod encname;
pub mod error;
pub mod metadata;
pub mod nonce;
pub mod reader;
pub mod stream;

pub use chunk::FileKey;
pub use error::{Error, Result};
pub use reader::DecryptingReader;
