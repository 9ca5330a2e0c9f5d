//! The BGZF block engine.
//!
//! [`BgzfStream`] buffers one uncompressed block at a time on top of a
//! [`Device`]. Writing fills the block and emits a compressed block each
//! time it is full; reading pulls, validates and inflates one block at a
//! time. Positions are exchanged as [`VirtualOffset`]s.

use std::io;

use log::{debug, error, warn};

use crate::bgzf::codec::{self, MIN_BGZF_BLOCK_SIZE};
use crate::bgzf::{
    GziIndexBuilder, VirtualOffset, BGZF_EOF, BGZF_HEADER_SIZE, BGZF_MAX_BLOCK_SIZE,
    MAX_BGZF_BLOCK_SIZE,
};
use crate::device::{Device, OpenMode};
use crate::error::{Error, Result};
use crate::StreamConfig;

/// A sequential, seekable BGZF stream over an exclusively owned device.
///
/// A stream is either read-only or write-only for the lifetime of one
/// `open`/`close` session. Writers must be closed (or dropped) to emit the
/// pending block and the EOF marker.
pub struct BgzfStream<D: Device> {
    config: StreamConfig,
    /// Uncompressed working block. The writer uses `config.block_size` bytes
    /// of it; the reader inflates into all of it.
    uncompressed: Vec<u8>,
    /// One wire block
    compressed: Vec<u8>,
    /// Device address of the current block's first byte
    block_address: u64,
    /// Bytes consumed (reader) or buffered (writer) in the current block
    block_offset: usize,
    /// Decompressed length of the loaded block, 0 when none is loaded
    block_length: usize,
    device: Option<D>,
    index: Option<GziIndexBuilder>,
}

fn allocate(size: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(size).map_err(|_| Error::Allocation(size))?;
    buffer.resize(size, 0);
    Ok(buffer)
}

/// The open device, provided it is in `expected` mode.
fn checked_device<D: Device>(device: &mut Option<D>, expected: OpenMode) -> Result<&mut D> {
    let device = device.as_mut().filter(|d| d.is_open()).ok_or(Error::NotOpen)?;
    if device.mode() != expected {
        return Err(Error::WrongMode { expected, found: device.mode() });
    }
    Ok(device)
}

impl<D: Device> BgzfStream<D> {
    /// Create a closed stream with its working buffers allocated.
    pub fn new(config: StreamConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            uncompressed: allocate(BGZF_MAX_BLOCK_SIZE)?,
            compressed: allocate(MAX_BGZF_BLOCK_SIZE)?,
            block_address: 0,
            block_offset: 0,
            block_length: 0,
            device: None,
            index: None,
        })
    }

    /// Open `device` for reading with the default configuration.
    pub fn reader(device: D) -> Result<Self> {
        let mut stream = Self::new(StreamConfig::default())?;
        stream.open(device, OpenMode::ReadOnly)?;
        Ok(stream)
    }

    /// Open `device` for writing.
    pub fn writer(device: D, config: StreamConfig) -> Result<Self> {
        let mut stream = Self::new(config)?;
        stream.open(device, OpenMode::WriteOnly)?;
        Ok(stream)
    }

    /// Take ownership of `device` and open it, closing any current session first.
    pub fn open(&mut self, mut device: D, mode: OpenMode) -> Result<()> {
        self.close()?;

        if let Err(e) = device.open(mode) {
            let message = match device.error_string() {
                "" => e.to_string(),
                s => s.to_string(),
            };
            error!("unable to open device: {}", message);
            return Err(Error::DeviceOpen(message));
        }

        self.block_address = device.tell()?;
        self.block_offset = 0;
        self.block_length = 0;
        self.index = (self.config.build_index && mode == OpenMode::WriteOnly)
            .then(GziIndexBuilder::new);
        self.device = Some(device);
        Ok(())
    }

    /// Finish the session and hand the device back.
    ///
    /// In write mode the pending block is flushed and the EOF marker block
    /// appended before the device is closed. Returns `Ok(None)` if no device
    /// was attached.
    pub fn close(&mut self) -> Result<Option<D>> {
        if self.device.is_none() {
            return Ok(None);
        }

        let finished =
            if self.mode() == OpenMode::WriteOnly { self.finish() } else { Ok(()) };

        let Some(mut device) = self.device.take() else {
            return Ok(None);
        };
        let closed = device.close();

        self.block_address = 0;
        self.block_offset = 0;
        self.block_length = 0;

        finished?;
        closed?;
        Ok(Some(device))
    }

    /// Whether a device is attached and open
    pub fn is_open(&self) -> bool {
        self.device.as_ref().is_some_and(|d| d.is_open())
    }

    /// Mode of the open session, [`OpenMode::NotOpen`] when closed
    pub fn mode(&self) -> OpenMode {
        match &self.device {
            Some(device) if device.is_open() => device.mode(),
            _ => OpenMode::NotOpen,
        }
    }

    /// Get the stream configuration
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Toggle DEFLATE compression for blocks written from now on.
    pub fn set_write_compressed(&mut self, compressed: bool) {
        self.config.write_compressed = compressed;
    }

    /// Block index recorded so far, if `build_index` is enabled.
    pub fn index(&self) -> Option<&GziIndexBuilder> {
        self.index.as_ref()
    }

    /// Take the recorded index, leaving none behind.
    pub fn take_index(&mut self) -> Option<GziIndexBuilder> {
        self.index.take()
    }

    /// Get a reference to the attached device
    pub fn get_ref(&self) -> Option<&D> {
        self.device.as_ref()
    }

    /// Virtual offset of the current logical position; zero when closed.
    ///
    /// While writing, the offset assumes the pending block is emitted whole.
    /// Incompressible data can force a block to be split on flush, which
    /// moves the tail into the next block and leaves offsets taken inside
    /// that tail pointing past the end of the first block. Offsets are
    /// stable for any data when `block_size` is at most
    /// [`BGZF_STABLE_BLOCK_SIZE`](crate::bgzf::BGZF_STABLE_BLOCK_SIZE).
    pub fn tell(&self) -> VirtualOffset {
        if !self.is_open() {
            return VirtualOffset::default();
        }
        VirtualOffset::new(self.block_address, (self.block_offset & 0xFFFF) as u16)
    }

    /// Jump to a virtual offset previously returned by [`BgzfStream::tell`].
    ///
    /// The target block is loaded lazily by the next read.
    pub fn seek(&mut self, offset: VirtualOffset) -> Result<()> {
        let device = self.device.as_mut().filter(|d| d.is_open()).ok_or(Error::NotOpen)?;
        if !device.is_random_access() {
            return Err(Error::NotRandomAccess);
        }
        if device.mode() != OpenMode::ReadOnly {
            return Err(Error::WrongMode { expected: OpenMode::ReadOnly, found: device.mode() });
        }

        let (block_address, block_offset) = offset.unpack();
        if let Err(e) = device.seek(block_address) {
            error!("unable to seek to {}: {}", block_address, e);
            return Err(e.into());
        }
        debug!("seek to {}", offset);

        self.block_length = 0;
        self.block_address = block_address;
        self.block_offset = block_offset as usize;
        Ok(())
    }

    /// Buffer `data`, emitting compressed blocks whenever the block fills.
    ///
    /// Returns `data.len()` on success.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        checked_device(&mut self.device, OpenMode::WriteOnly)?;

        let capacity = self.config.block_size;
        let mut written = 0;
        while written < data.len() {
            let copy_length = (capacity - self.block_offset).min(data.len() - written);
            self.uncompressed[self.block_offset..self.block_offset + copy_length]
                .copy_from_slice(&data[written..written + copy_length]);

            self.block_offset += copy_length;
            written += copy_length;

            if self.block_offset == capacity {
                self.flush_block()?;
            }
        }

        Ok(written)
    }

    /// Compress and emit everything buffered so far, then flush the device.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_block()?;
        let device = checked_device(&mut self.device, OpenMode::WriteOnly)?;
        device.flush()?;
        Ok(())
    }

    /// Emit blocks until the pending buffer is empty. One call may emit
    /// several blocks when compression had to shorten its input.
    fn flush_block(&mut self) -> Result<()> {
        let device = checked_device(&mut self.device, OpenMode::WriteOnly)?;

        while self.block_offset > 0 {
            let block = codec::compress_block(
                &self.uncompressed[..self.block_offset],
                &mut self.compressed,
                self.config.write_compressed,
            )?;
            if block.bytes_consumed == 0 {
                return Err(Error::InputReductionFailed { max: MAX_BGZF_BLOCK_SIZE });
            }

            let written = device.write(&self.compressed[..block.block_size])?;
            if written != block.block_size {
                error!(
                    "expected to write {} bytes during flushing, but wrote {}",
                    block.block_size, written
                );
                return Err(Error::ShortWrite { expected: block.block_size, found: written });
            }
            debug!(
                "wrote block at {}: {} -> {} bytes",
                self.block_address, block.bytes_consumed, block.block_size
            );

            if let Some(index) = &mut self.index {
                index.add_block(block.block_size as u64, block.bytes_consumed as u64);
            }

            self.block_address += block.block_size as u64;
            self.uncompressed.copy_within(block.bytes_consumed..self.block_offset, 0);
            self.block_offset -= block.bytes_consumed;
        }

        Ok(())
    }

    /// Flush the pending block and append the EOF marker.
    fn finish(&mut self) -> Result<()> {
        self.flush_block()?;

        let device = checked_device(&mut self.device, OpenMode::WriteOnly)?;
        let written = device.write(&BGZF_EOF)?;
        if written != BGZF_EOF.len() {
            return Err(Error::ShortWrite { expected: BGZF_EOF.len(), found: written });
        }
        self.block_address += BGZF_EOF.len() as u64;
        Ok(())
    }

    /// Read up to `data.len()` decompressed bytes.
    ///
    /// Returns fewer bytes only at the end of the stream, and 0 once the
    /// stream is exhausted.
    pub fn read(&mut self, data: &mut [u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        checked_device(&mut self.device, OpenMode::ReadOnly)?;

        let mut read = 0;
        while read < data.len() {
            if self.block_offset >= self.block_length {
                if !self.read_block()? {
                    break;
                }
                if self.block_offset > self.block_length {
                    return Err(Error::OffsetBeyondBlock {
                        offset: self.block_offset,
                        length: self.block_length,
                    });
                }
                continue;
            }

            let copy_length = (self.block_length - self.block_offset).min(data.len() - read);
            data[read..read + copy_length].copy_from_slice(
                &self.uncompressed[self.block_offset..self.block_offset + copy_length],
            );

            self.block_offset += copy_length;
            read += copy_length;
        }

        if self.block_offset == self.block_length {
            let device = checked_device(&mut self.device, OpenMode::ReadOnly)?;
            self.block_address = device.tell()?;
            self.block_offset = 0;
            self.block_length = 0;
        }

        Ok(read)
    }

    /// Load the next block from the device.
    ///
    /// Returns `false` at a clean end of data. The in-block offset is reset
    /// only when a block was already loaded, so an offset set by
    /// [`BgzfStream::seek`] survives the first load.
    fn read_block(&mut self) -> Result<bool> {
        let device = checked_device(&mut self.device, OpenMode::ReadOnly)?;
        let block_address = device.tell()?;

        let mut header = [0u8; BGZF_HEADER_SIZE];
        let header_read = device.read(&mut header)?;
        if header_read == 0 {
            self.block_length = 0;
            return Ok(false);
        }
        if header_read != BGZF_HEADER_SIZE {
            error!("read block failed - could not read block header at {}", block_address);
            return Err(Error::TruncatedBlockHeader {
                expected: BGZF_HEADER_SIZE,
                found: header_read,
            });
        }
        if !codec::check_block_header(&header) {
            error!("read block failed - invalid block header at {}", block_address);
            return Err(Error::InvalidBlockHeader);
        }

        let block_size = codec::block_size_from_header(&header);
        if block_size < MIN_BGZF_BLOCK_SIZE {
            return Err(Error::InvalidBlockSize(block_size));
        }
        self.compressed[..BGZF_HEADER_SIZE].copy_from_slice(&header);

        let remaining = block_size - BGZF_HEADER_SIZE;
        let data_read = device.read(&mut self.compressed[BGZF_HEADER_SIZE..block_size])?;
        if data_read != remaining {
            error!("read block failed - could not read data from block at {}", block_address);
            return Err(Error::TruncatedBlockData { expected: remaining, found: data_read });
        }

        let length = codec::decompress_block(&self.compressed[..block_size], &mut self.uncompressed)
            .map_err(|e| {
                error!(
                    "read block failed - could not decompress block at {}: {}",
                    block_address, e
                );
                e
            })?;
        debug!("loaded block at {}: {} -> {} bytes", block_address, block_size, length);

        if self.block_length != 0 {
            self.block_offset = 0;
        }
        self.block_address = block_address;
        self.block_length = length;
        Ok(true)
    }
}

impl<D: Device> Drop for BgzfStream<D> {
    fn drop(&mut self) {
        if self.device.is_some() {
            if let Err(e) = self.close() {
                warn!("failed to finish BGZF stream on drop: {}", e);
            }
        }
    }
}

impl<D: Device> io::Read for BgzfStream<D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        BgzfStream::read(self, buf).map_err(Into::into)
    }
}

impl<D: Device> io::Write for BgzfStream<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BgzfStream::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        BgzfStream::flush(self).map_err(Into::into)
    }
}
