//! Seekable BGZF (Blocked GZIP Format) streams.
//!
//! BGZF splits a byte stream into independently compressed gzip members of
//! at most 64 KiB each, so any position can be reached through a
//! [`VirtualOffset`] without decompressing from the start.
//!
//! ```
//! use bgzfstream::{BgzfStream, MemoryDevice, StreamConfig};
//!
//! let mut writer = BgzfStream::writer(MemoryDevice::default(), StreamConfig::default())?;
//! writer.write(b"@read1\nACGT\n+\nIIII\n")?;
//! let offset = writer.tell();
//! writer.write(b"@read2\nTTGA\n+\nIIII\n")?;
//! let bgzf = writer.close()?.unwrap().into_inner();
//!
//! let mut reader = BgzfStream::reader(MemoryDevice::new(bgzf))?;
//! reader.seek(offset)?;
//! let mut record = [0u8; 7];
//! reader.read(&mut record)?;
//! assert_eq!(&record, b"@read2\n");
//! # Ok::<(), bgzfstream::Error>(())
//! ```

pub mod bgzf;
pub mod device;
pub mod error;
pub mod stream;

pub use bgzf::{
    is_bgzf, validate_bgzf, verify_bgzf, BgzfValidation, GziIndexBuilder, VirtualOffset,
};
pub use device::{open_device, Device, FileDevice, MemoryDevice, OpenMode, StdioDevice};
pub use error::{Error, Result};
pub use stream::BgzfStream;

use bgzf::BGZF_MAX_BLOCK_SIZE;

/// Configuration for a [`BgzfStream`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Uncompressed bytes buffered per block when writing (default: 65536)
    pub block_size: usize,
    /// Compress written blocks; `false` stores them at level 0
    pub write_compressed: bool,
    /// Record a GZI block index while writing
    pub build_index: bool,
}

impl StreamConfig {
    /// Check that the block size is usable.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || self.block_size > BGZF_MAX_BLOCK_SIZE {
            return Err(Error::InvalidConfigBlockSize {
                size: self.block_size,
                max: BGZF_MAX_BLOCK_SIZE,
            });
        }
        Ok(())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            block_size: bgzf::BGZF_DEFAULT_BLOCK_SIZE,
            write_compressed: true,
            build_index: false,
        }
    }
}
