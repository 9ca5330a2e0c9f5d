/// Maximum uncompressed block size for BGZF
pub const BGZF_MAX_BLOCK_SIZE: usize = 65536; // 64KB

/// Default uncompressed block size used by the stream writer
pub const BGZF_DEFAULT_BLOCK_SIZE: usize = 65536;

/// Largest block size whose input always fits one BGZF block, even when
/// the data does not compress (htslib's `BGZF_BLOCK_SIZE`)
pub const BGZF_STABLE_BLOCK_SIZE: usize = 0xff00;

/// BGZF header size (gzip header with extra field)
pub const BGZF_HEADER_SIZE: usize = 18;

/// BGZF footer size (CRC32 + ISIZE)
pub const BGZF_FOOTER_SIZE: usize = 8;

/// Maximum total BGZF block size
pub const MAX_BGZF_BLOCK_SIZE: usize = 65536;

/// Bytes dropped from the input each time a block fails to fit
pub const BGZF_RETRY_STEP: usize = 1024;

// Fixed header fields
pub const GZIP_ID1: u8 = 0x1f;
pub const GZIP_ID2: u8 = 0x8b;
pub const CM_DEFLATE: u8 = 0x08;
pub const FLG_FEXTRA: u8 = 0x04;
pub const OS_UNKNOWN: u8 = 0xff;
pub const BGZF_XLEN: u16 = 6;
pub const BGZF_ID1: u8 = b'B';
pub const BGZF_ID2: u8 = b'C';
pub const BGZF_LEN: u16 = 2;

/// BGZF EOF block (28 bytes)
pub const BGZF_EOF: [u8; 28] = [
    0x1f, 0x8b, 0x08, 0x04, // gzip magic, method, flags (FEXTRA)
    0x00, 0x00, 0x00, 0x00, // mtime
    0x00, 0xff, // xfl, os
    0x06, 0x00, // xlen = 6
    0x42, 0x43, // subfield ID "BC"
    0x02, 0x00, // subfield length = 2
    0x1b, 0x00, // BSIZE = 27 (28 - 1)
    0x03, 0x00, // empty deflate block
    0x00, 0x00, 0x00, 0x00, // CRC32 = 0
    0x00, 0x00, 0x00, 0x00, // ISIZE = 0
];
