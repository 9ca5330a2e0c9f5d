pub mod codec;
pub mod constants;
pub mod detector;
pub mod index;
pub mod virtual_offset;

pub use codec::{check_block_header, compress_block, decompress_block, CompressedBlock};
pub use constants::*;
pub use detector::{is_bgzf, validate_bgzf, verify_bgzf, BgzfValidation};
pub use index::{GziEntry, GziIndexBuilder};
pub use virtual_offset::VirtualOffset;
