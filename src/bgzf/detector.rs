//! BGZF format detection and validation.
//!
//! Provides quick detection (first block only), structural validation
//! (all block headers) and full verification (inflate every block and check
//! its CRC32) over any readable [`Device`].

use libdeflater::Decompressor;

use super::codec::{block_size_from_header, check_block_header, MIN_BGZF_BLOCK_SIZE};
use super::constants::*;
use crate::device::{Device, OpenMode};
use crate::error::{Error, Result};

/// Result of BGZF validation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BgzfValidation {
    /// Whether the input is valid BGZF
    pub is_valid_bgzf: bool,
    /// Number of blocks walked, including the EOF marker
    pub block_count: u64,
    /// Total uncompressed size across all blocks
    pub total_uncompressed_size: u64,
    /// Whether the last block is the standard EOF marker
    pub has_eof_marker: bool,
}

fn require_reader<D: Device + ?Sized>(device: &D) -> Result<()> {
    if !device.is_open() {
        return Err(Error::NotOpen);
    }
    if device.mode() != OpenMode::ReadOnly {
        return Err(Error::WrongMode { expected: OpenMode::ReadOnly, found: device.mode() });
    }
    Ok(())
}

/// Quick check - only validates the header at the device's current position.
pub fn is_bgzf<D: Device + ?Sized>(device: &mut D) -> Result<bool> {
    require_reader(device)?;

    let mut header = [0u8; BGZF_HEADER_SIZE];
    let n = device.read(&mut header)?;
    Ok(n == BGZF_HEADER_SIZE && check_block_header(&header))
}

/// Walk every block from the device's current position to its end.
///
/// With `verify` set each block is also inflated and its CRC32 and ISIZE
/// checked; a mismatch is reported as an error rather than as invalid.
fn scan_blocks<D: Device + ?Sized>(device: &mut D, verify: bool) -> Result<BgzfValidation> {
    require_reader(device)?;

    let mut result = BgzfValidation::default();
    let mut block = vec![0u8; MAX_BGZF_BLOCK_SIZE];
    let mut inflated = vec![0u8; BGZF_MAX_BLOCK_SIZE];
    let mut decompressor = Decompressor::new();

    loop {
        let n = device.read(&mut block[..BGZF_HEADER_SIZE])?;
        if n == 0 {
            break;
        }
        if n != BGZF_HEADER_SIZE || !check_block_header(&block) {
            return Ok(BgzfValidation { is_valid_bgzf: false, ..result });
        }

        let block_size = block_size_from_header(&block);
        if block_size < MIN_BGZF_BLOCK_SIZE {
            return Ok(BgzfValidation { is_valid_bgzf: false, ..result });
        }

        let remaining = block_size - BGZF_HEADER_SIZE;
        let n = device.read(&mut block[BGZF_HEADER_SIZE..block_size])?;
        if n != remaining {
            return Ok(BgzfValidation { is_valid_bgzf: false, ..result });
        }

        let footer = &block[block_size - BGZF_FOOTER_SIZE..block_size];
        let expected_crc = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]);
        let isize = u32::from_le_bytes([footer[4], footer[5], footer[6], footer[7]]);

        if verify {
            let payload = &block[BGZF_HEADER_SIZE..block_size - BGZF_FOOTER_SIZE];
            let length = decompressor.deflate_decompress(payload, &mut inflated)?;
            if length as u32 != isize {
                return Err(Error::SizeMismatch { expected: isize, found: length as u32 });
            }
            let crc = crc32fast::hash(&inflated[..length]);
            if crc != expected_crc {
                return Err(Error::Crc32Mismatch { expected: expected_crc, found: crc });
            }
        }

        result.block_count += 1;
        result.total_uncompressed_size += isize as u64;
        result.has_eof_marker = block[..block_size] == BGZF_EOF;
    }

    result.is_valid_bgzf = result.block_count > 0;
    Ok(result)
}

/// Structural validation of every block header and length.
pub fn validate_bgzf<D: Device + ?Sized>(device: &mut D) -> Result<BgzfValidation> {
    scan_blocks(device, false)
}

/// Inflate every block and check its CRC32 and uncompressed size.
pub fn verify_bgzf<D: Device + ?Sized>(device: &mut D) -> Result<BgzfValidation> {
    scan_blocks(device, true)
}
