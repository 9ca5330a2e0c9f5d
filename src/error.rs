use std::io;

use thiserror::Error;

use crate::device::OpenMode;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unable to open device: {0}")]
    DeviceOpen(String),

    #[error("Short device write: expected to write {expected} bytes, wrote {found}")]
    ShortWrite { expected: usize, found: usize },

    #[error("Unable to allocate {0} bytes for block buffer")]
    Allocation(usize),

    // Block format errors
    #[error("Invalid BGZF block header")]
    InvalidBlockHeader,

    #[error("Invalid BGZF block size: {0} bytes")]
    InvalidBlockSize(usize),

    #[error("Truncated block header: expected {expected} bytes, got {found}")]
    TruncatedBlockHeader { expected: usize, found: usize },

    #[error("Truncated block data: expected {expected} bytes, got {found}")]
    TruncatedBlockData { expected: usize, found: usize },

    #[error("BGZF block too large: {size} bytes exceeds maximum {max}")]
    BgzfBlockTooLarge { size: usize, max: usize },

    // Codec errors
    #[error("Deflate failed: {0}")]
    Deflate(#[from] flate2::CompressError),

    #[error("Inflate failed: {0}")]
    Inflate(#[from] flate2::DecompressError),

    #[error("Block inflate failed: {0}")]
    BlockInflate(#[from] libdeflater::DecompressionError),

    #[error("Inflate did not reach end of stream")]
    InflateIncomplete,

    #[error("Input reduction failed: block cannot be compressed under {max} bytes")]
    InputReductionFailed { max: usize },

    // Checksum errors
    #[error("CRC32 mismatch: expected 0x{expected:08x}, got 0x{found:08x}")]
    Crc32Mismatch { expected: u32, found: u32 },

    #[error("Size mismatch: expected {expected} bytes, got {found}")]
    SizeMismatch { expected: u32, found: u32 },

    // Stream usage errors
    #[error("Stream is not open")]
    NotOpen,

    #[error("Stream is open {found}, operation requires {expected}")]
    WrongMode { expected: OpenMode, found: OpenMode },

    #[error("Device does not support random access")]
    NotRandomAccess,

    #[error("Virtual offset points to byte {offset} of a {length} byte block")]
    OffsetBeyondBlock { offset: usize, length: usize },

    // Configuration errors
    #[error("Invalid block size: {size} (must be between 1 and {max})")]
    InvalidConfigBlockSize { size: usize, max: usize },

    #[error("Invalid virtual offset: {0}")]
    InvalidVirtualOffset(String),
}

impl Error {
    /// Whether this error means the input bytes are not well-formed BGZF.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidBlockHeader
                | Self::InvalidBlockSize(_)
                | Self::TruncatedBlockHeader { .. }
                | Self::TruncatedBlockData { .. }
                | Self::Inflate(_)
                | Self::BlockInflate(_)
                | Self::InflateIncomplete
                | Self::Crc32Mismatch { .. }
                | Self::SizeMismatch { .. }
                | Self::OffsetBeyondBlock { .. }
        )
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            e if e.is_format_error() => io::Error::new(io::ErrorKind::InvalidData, e),
            e => io::Error::other(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
