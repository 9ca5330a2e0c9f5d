//! Single-block BGZF compression and decompression.
//!
//! A block is a complete gzip member: the fixed 18-byte header carrying the
//! `BC` extra subfield, a raw DEFLATE payload, and an 8-byte trailer holding
//! the CRC32 and length of the uncompressed bytes.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use log::debug;

use super::constants::*;
use crate::error::{Error, Result};

/// Smallest well-formed block: header, an empty payload byte pair, footer
pub const MIN_BGZF_BLOCK_SIZE: usize = BGZF_HEADER_SIZE + 2 + BGZF_FOOTER_SIZE;

/// Outcome of compressing one block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressedBlock {
    /// Total bytes of the wire block written to the output buffer
    pub block_size: usize,
    /// Leading input bytes that went into the block
    pub bytes_consumed: usize,
}

/// Write the fixed BGZF header with a zeroed BSIZE into `buffer[..18]`.
fn write_header(buffer: &mut [u8]) {
    let header = [
        GZIP_ID1,
        GZIP_ID2,
        CM_DEFLATE,
        FLG_FEXTRA,
        0x00,
        0x00,
        0x00,
        0x00, // mtime
        0x00, // extra flags
        OS_UNKNOWN,
        BGZF_XLEN as u8,
        (BGZF_XLEN >> 8) as u8,
        BGZF_ID1,
        BGZF_ID2,
        BGZF_LEN as u8,
        (BGZF_LEN >> 8) as u8,
        0x00, // BSIZE low byte
        0x00, // BSIZE high byte
    ];
    buffer[..BGZF_HEADER_SIZE].copy_from_slice(&header);
}

/// Check that a header matches the fixed BGZF layout exactly.
///
/// Only BSIZE (bytes 16-17) is free to vary.
pub fn check_block_header(header: &[u8]) -> bool {
    header.len() >= BGZF_HEADER_SIZE
        && header[0] == GZIP_ID1
        && header[1] == GZIP_ID2
        && header[2] == CM_DEFLATE
        && header[3] & FLG_FEXTRA != 0
        && u16::from_le_bytes([header[10], header[11]]) == BGZF_XLEN
        && header[12] == BGZF_ID1
        && header[13] == BGZF_ID2
        && u16::from_le_bytes([header[14], header[15]]) == BGZF_LEN
}

/// Total wire size declared by a header (BSIZE + 1).
pub fn block_size_from_header(header: &[u8]) -> usize {
    u16::from_le_bytes([header[16], header[17]]) as usize + 1
}

/// Compress as much of `input` as fits in one BGZF block.
///
/// DEFLATE runs to completion over the whole input. When the payload does
/// not fit under [`MAX_BGZF_BLOCK_SIZE`], the input is shortened by
/// [`BGZF_RETRY_STEP`] bytes and compression restarts from scratch. The
/// caller must carry `input[bytes_consumed..]` into its next block.
///
/// `output` must hold at least [`MAX_BGZF_BLOCK_SIZE`] bytes.
pub fn compress_block(
    input: &[u8],
    output: &mut [u8],
    compressed: bool,
) -> Result<CompressedBlock> {
    if output.len() < MAX_BGZF_BLOCK_SIZE {
        return Err(Error::InvalidBlockSize(output.len()));
    }

    write_header(output);
    let level = if compressed { Compression::default() } else { Compression::none() };
    let payload_end = MAX_BGZF_BLOCK_SIZE - BGZF_FOOTER_SIZE;

    let mut input_len = input.len();
    let payload_len = loop {
        let mut deflater = Compress::new(level, false);
        let status = deflater.compress(
            &input[..input_len],
            &mut output[BGZF_HEADER_SIZE..payload_end],
            FlushCompress::Finish,
        )?;

        match status {
            Status::StreamEnd => break deflater.total_out() as usize,
            Status::Ok | Status::BufError => {
                if input_len < BGZF_RETRY_STEP {
                    return Err(Error::InputReductionFailed { max: MAX_BGZF_BLOCK_SIZE });
                }
                input_len -= BGZF_RETRY_STEP;
                debug!("block did not fit, retrying with {} input bytes", input_len);
            }
        }
    };

    let block_size = BGZF_HEADER_SIZE + payload_len + BGZF_FOOTER_SIZE;
    if block_size > MAX_BGZF_BLOCK_SIZE {
        return Err(Error::BgzfBlockTooLarge { size: block_size, max: MAX_BGZF_BLOCK_SIZE });
    }

    // BSIZE is block_size - 1
    output[16..18].copy_from_slice(&((block_size - 1) as u16).to_le_bytes());

    let crc = crc32fast::hash(&input[..input_len]);
    output[block_size - 8..block_size - 4].copy_from_slice(&crc.to_le_bytes());
    output[block_size - 4..block_size].copy_from_slice(&(input_len as u32).to_le_bytes());

    Ok(CompressedBlock { block_size, bytes_consumed: input_len })
}

/// Decompress one wire block into `output`, returning the decompressed length.
///
/// `block` must start with the header; bytes past the declared block size
/// are ignored. The trailer's CRC32 and ISIZE are checked against the
/// inflated bytes.
pub fn decompress_block(block: &[u8], output: &mut [u8]) -> Result<usize> {
    if !check_block_header(block) {
        return Err(Error::InvalidBlockHeader);
    }

    let block_size = block_size_from_header(block);
    if block_size < MIN_BGZF_BLOCK_SIZE {
        return Err(Error::InvalidBlockSize(block_size));
    }
    if block.len() < block_size {
        return Err(Error::TruncatedBlockData { expected: block_size, found: block.len() });
    }

    let payload = &block[BGZF_HEADER_SIZE..block_size - BGZF_FOOTER_SIZE];
    let mut inflater = Decompress::new(false);
    let status = inflater.decompress(payload, output, FlushDecompress::Finish)?;
    if status != Status::StreamEnd {
        return Err(Error::InflateIncomplete);
    }
    let length = inflater.total_out() as usize;

    let footer = &block[block_size - BGZF_FOOTER_SIZE..block_size];
    let expected_crc = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]);
    let expected_size = u32::from_le_bytes([footer[4], footer[5], footer[6], footer[7]]);

    if expected_size != length as u32 {
        return Err(Error::SizeMismatch { expected: expected_size, found: length as u32 });
    }
    let crc = crc32fast::hash(&output[..length]);
    if crc != expected_crc {
        return Err(Error::Crc32Mismatch { expected: expected_crc, found: crc });
    }

    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_bytes(size: usize, seed: u64) -> Vec<u8> {
        let mut state = seed;
        (0..size)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state & 0xFF) as u8
            })
            .collect()
    }

    #[test]
    fn test_header_layout() {
        let mut output = vec![0u8; MAX_BGZF_BLOCK_SIZE];
        let block = compress_block(b"ACGT", &mut output, true).unwrap();

        assert_eq!(&output[..4], &[0x1f, 0x8b, 0x08, 0x04]);
        assert_eq!(&output[4..8], &[0, 0, 0, 0]); // mtime
        assert_eq!(output[8], 0);
        assert_eq!(output[9], 0xff);
        assert_eq!(&output[10..16], &[0x06, 0x00, b'B', b'C', 0x02, 0x00]);
        assert_eq!(block_size_from_header(&output), block.block_size);
        assert_eq!(block.bytes_consumed, 4);

        let isize = &output[block.block_size - 4..block.block_size];
        assert_eq!(isize, &4u32.to_le_bytes());
    }

    #[test]
    fn test_compress_decompress_block() {
        let input = b"The quick brown fox jumps over the lazy dog".repeat(100);
        let mut wire = vec![0u8; MAX_BGZF_BLOCK_SIZE];
        let block = compress_block(&input, &mut wire, true).unwrap();
        assert!(block.block_size < input.len());

        let mut output = vec![0u8; BGZF_MAX_BLOCK_SIZE];
        let length = decompress_block(&wire[..block.block_size], &mut output).unwrap();
        assert_eq!(&output[..length], &input[..]);
    }

    #[test]
    fn test_uncompressed_mode_stores_bytes() {
        let input = b"ACGTACGTACGTACGTACGTACGTACGTACGT".repeat(64);
        let mut wire = vec![0u8; MAX_BGZF_BLOCK_SIZE];
        let block = compress_block(&input, &mut wire, false).unwrap();

        // Stored blocks never shrink the data
        assert!(block.block_size > input.len());

        let mut output = vec![0u8; BGZF_MAX_BLOCK_SIZE];
        let length = decompress_block(&wire[..block.block_size], &mut output).unwrap();
        assert_eq!(&output[..length], &input[..]);
    }

    #[test]
    fn test_empty_block() {
        let mut wire = vec![0u8; MAX_BGZF_BLOCK_SIZE];
        let block = compress_block(&[], &mut wire, true).unwrap();
        assert_eq!(block.bytes_consumed, 0);

        let mut output = vec![0u8; BGZF_MAX_BLOCK_SIZE];
        assert_eq!(decompress_block(&wire[..block.block_size], &mut output).unwrap(), 0);
        assert_eq!(decompress_block(&BGZF_EOF, &mut output).unwrap(), 0);
    }

    #[test]
    fn test_incompressible_input_shrinks_by_retry_step() {
        let input = random_bytes(BGZF_MAX_BLOCK_SIZE, 42);
        let mut wire = vec![0u8; MAX_BGZF_BLOCK_SIZE];
        let block = compress_block(&input, &mut wire, true).unwrap();

        assert!(block.bytes_consumed < input.len());
        assert_eq!((input.len() - block.bytes_consumed) % BGZF_RETRY_STEP, 0);
        assert!(block.block_size <= MAX_BGZF_BLOCK_SIZE);

        let mut output = vec![0u8; BGZF_MAX_BLOCK_SIZE];
        let length = decompress_block(&wire[..block.block_size], &mut output).unwrap();
        assert_eq!(&output[..length], &input[..block.bytes_consumed]);
    }

    #[test]
    fn test_corrupt_header_bytes_rejected() {
        let mut wire = vec![0u8; MAX_BGZF_BLOCK_SIZE];
        let block = compress_block(b"hello", &mut wire, true).unwrap();
        let good = wire[..block.block_size].to_vec();

        for index in [0usize, 1, 2, 3, 10, 11, 12, 13, 14, 15] {
            let mut bad = good.clone();
            bad[index] ^= 0xff;
            let mut output = vec![0u8; BGZF_MAX_BLOCK_SIZE];
            let result = decompress_block(&bad, &mut output);
            assert!(
                matches!(result, Err(Error::InvalidBlockHeader)),
                "byte {} corruption not detected",
                index
            );
        }
    }

    #[test]
    fn test_corrupt_crc_rejected() {
        let mut wire = vec![0u8; MAX_BGZF_BLOCK_SIZE];
        let block = compress_block(b"hello world", &mut wire, true).unwrap();
        wire[block.block_size - 8] ^= 0x01;

        let mut output = vec![0u8; BGZF_MAX_BLOCK_SIZE];
        let result = decompress_block(&wire[..block.block_size], &mut output);
        assert!(matches!(result, Err(Error::Crc32Mismatch { .. })));
    }

    #[test]
    fn test_truncated_block_rejected() {
        let mut wire = vec![0u8; MAX_BGZF_BLOCK_SIZE];
        let block = compress_block(b"hello world", &mut wire, true).unwrap();

        let mut output = vec![0u8; BGZF_MAX_BLOCK_SIZE];
        let result = decompress_block(&wire[..block.block_size - 1], &mut output);
        assert!(matches!(result, Err(Error::TruncatedBlockData { .. })));
    }

    #[test]
    fn test_output_buffer_too_small() {
        let mut wire = vec![0u8; 1024];
        assert!(matches!(compress_block(b"x", &mut wire, true), Err(Error::InvalidBlockSize(_))));
    }
}
