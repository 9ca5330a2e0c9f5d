//! GZI block index for BGZF random access.
//!
//! The GZI format stores offset pairs that map between compressed and
//! uncompressed positions in a BGZF file, one pair per block boundary.
//! The first block's `(0, 0)` pair is implicit and not stored.
//!
//! Format:
//! - Number of entries: u64 (little-endian)
//! - For each entry:
//!   - Compressed offset: u64 (little-endian)
//!   - Uncompressed offset: u64 (little-endian)

use std::io::{self, Read, Write};

use super::constants::BGZF_MAX_BLOCK_SIZE;
use super::virtual_offset::VirtualOffset;

/// An entry in the GZI index mapping compressed to uncompressed offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GziEntry {
    /// Byte offset in the compressed BGZF file (start of block)
    pub compressed_offset: u64,
    /// Byte offset in the uncompressed data stream
    pub uncompressed_offset: u64,
}

/// Builder for GZI index files.
///
/// The stream writer feeds it one call per emitted block.
#[derive(Clone, Debug, Default)]
pub struct GziIndexBuilder {
    entries: Vec<GziEntry>,
    current_compressed_offset: u64,
    current_uncompressed_offset: u64,
}

impl GziIndexBuilder {
    /// Create a new empty index builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a block that was just written and the boundary after it.
    pub fn add_block(&mut self, compressed_size: u64, uncompressed_size: u64) {
        self.current_compressed_offset += compressed_size;
        self.current_uncompressed_offset += uncompressed_size;

        self.entries.push(GziEntry {
            compressed_offset: self.current_compressed_offset,
            uncompressed_offset: self.current_uncompressed_offset,
        });
    }

    /// Get the current compressed offset
    pub fn compressed_offset(&self) -> u64 {
        self.current_compressed_offset
    }

    /// Get the current uncompressed offset
    pub fn uncompressed_offset(&self) -> u64 {
        self.current_uncompressed_offset
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get all entries
    pub fn entries(&self) -> &[GziEntry] {
        &self.entries
    }

    /// Translate a position in the uncompressed data to a virtual offset.
    ///
    /// Returns `None` if the position is not reachable through a 16-bit
    /// in-block offset from any recorded boundary.
    pub fn virtual_offset(&self, uncompressed_offset: u64) -> Option<VirtualOffset> {
        let idx = self.entries.partition_point(|e| e.uncompressed_offset <= uncompressed_offset);
        let (compressed, uncompressed) = match idx {
            0 => (0, 0),
            i => (self.entries[i - 1].compressed_offset, self.entries[i - 1].uncompressed_offset),
        };

        let within = uncompressed_offset - uncompressed;
        if within >= BGZF_MAX_BLOCK_SIZE as u64 {
            return None;
        }
        Some(VirtualOffset::new(compressed, within as u16))
    }

    /// Write the GZI index to a writer.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&(self.entries.len() as u64).to_le_bytes())?;

        for entry in &self.entries {
            writer.write_all(&entry.compressed_offset.to_le_bytes())?;
            writer.write_all(&entry.uncompressed_offset.to_le_bytes())?;
        }

        Ok(())
    }

    /// Load a GZI index previously written with [`GziIndexBuilder::write`].
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut word = [0u8; 8];
        reader.read_exact(&mut word)?;
        let count = u64::from_le_bytes(word);

        let mut builder = Self::new();
        for _ in 0..count {
            reader.read_exact(&mut word)?;
            let compressed_offset = u64::from_le_bytes(word);
            reader.read_exact(&mut word)?;
            let uncompressed_offset = u64::from_le_bytes(word);
            builder.entries.push(GziEntry { compressed_offset, uncompressed_offset });
        }

        if let Some(last) = builder.entries.last() {
            builder.current_compressed_offset = last.compressed_offset;
            builder.current_uncompressed_offset = last.uncompressed_offset;
        }
        Ok(builder)
    }

    /// Reset the builder for reuse
    pub fn reset(&mut self) {
        self.entries.clear();
        self.current_compressed_offset = 0;
        self.current_uncompressed_offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzi_builder_basic() {
        let mut builder = GziIndexBuilder::new();

        builder.add_block(100, 1000);
        builder.add_block(150, 2000);
        builder.add_block(120, 1500);

        assert_eq!(builder.len(), 3);
        assert_eq!(builder.compressed_offset(), 370);
        assert_eq!(builder.uncompressed_offset(), 4500);

        let entries = builder.entries();
        assert_eq!(entries[0], GziEntry { compressed_offset: 100, uncompressed_offset: 1000 });
        assert_eq!(entries[1], GziEntry { compressed_offset: 250, uncompressed_offset: 3000 });
        assert_eq!(entries[2], GziEntry { compressed_offset: 370, uncompressed_offset: 4500 });
    }

    #[test]
    fn test_gzi_write_layout() {
        let mut builder = GziIndexBuilder::new();
        builder.add_block(100, 1000);
        builder.add_block(200, 2000);

        let mut output = Vec::new();
        builder.write(&mut output).unwrap();

        // 8 bytes (count) + 2 * 16 bytes (entries)
        assert_eq!(output.len(), 40);
        assert_eq!(u64::from_le_bytes(output[0..8].try_into().unwrap()), 2);
        assert_eq!(u64::from_le_bytes(output[8..16].try_into().unwrap()), 100);
        assert_eq!(u64::from_le_bytes(output[16..24].try_into().unwrap()), 1000);
        assert_eq!(u64::from_le_bytes(output[24..32].try_into().unwrap()), 300);
        assert_eq!(u64::from_le_bytes(output[32..40].try_into().unwrap()), 3000);

        let loaded = GziIndexBuilder::read(output.as_slice()).unwrap();
        assert_eq!(loaded.entries(), builder.entries());
        assert_eq!(loaded.compressed_offset(), 300);
    }

    #[test]
    fn test_virtual_offset_lookup() {
        let mut builder = GziIndexBuilder::new();
        builder.add_block(100, 1000);
        builder.add_block(150, 2000);

        assert_eq!(builder.virtual_offset(0), Some(VirtualOffset::new(0, 0)));
        assert_eq!(builder.virtual_offset(999), Some(VirtualOffset::new(0, 999)));
        assert_eq!(builder.virtual_offset(1000), Some(VirtualOffset::new(100, 0)));
        assert_eq!(builder.virtual_offset(2500), Some(VirtualOffset::new(100, 1500)));
        assert_eq!(builder.virtual_offset(3000), Some(VirtualOffset::new(250, 0)));
        assert_eq!(builder.virtual_offset(3000 + 70000), None);
    }
}
