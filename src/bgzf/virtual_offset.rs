//! BGZF virtual offsets.
//!
//! A virtual offset packs the compressed address of a block's first byte
//! into the high 48 bits and the offset into that block's decompressed
//! content into the low 16 bits.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Mask for the 48-bit compressed block address
pub const MAX_BLOCK_ADDRESS: u64 = (1 << 48) - 1;

/// A 64-bit BGZF virtual file offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualOffset(u64);

impl VirtualOffset {
    /// Pack a block address and in-block offset.
    ///
    /// Address bits above 48 are discarded.
    pub const fn new(block_address: u64, block_offset: u16) -> Self {
        Self(((block_address & MAX_BLOCK_ADDRESS) << 16) | block_offset as u64)
    }

    /// Compressed address of the block start
    pub const fn block_address(&self) -> u64 {
        (self.0 >> 16) & MAX_BLOCK_ADDRESS
    }

    /// Offset within the block's decompressed content
    pub const fn block_offset(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Split into `(block_address, block_offset)`
    pub const fn unpack(&self) -> (u64, u16) {
        (self.block_address(), self.block_offset())
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VirtualOffset {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<VirtualOffset> for u64 {
    fn from(offset: VirtualOffset) -> Self {
        offset.0
    }
}

impl fmt::Display for VirtualOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_address(), self.block_offset())
    }
}

/// Parses either a raw 64-bit value (`"4210818610"`) or an
/// `address:offset` pair (`"64251:1234"`).
impl FromStr for VirtualOffset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidVirtualOffset(s.to_string());

        match s.split_once(':') {
            Some((address, offset)) => {
                let address: u64 = address.trim().parse().map_err(|_| invalid())?;
                let offset: u16 = offset.trim().parse().map_err(|_| invalid())?;
                if address > MAX_BLOCK_ADDRESS {
                    return Err(invalid());
                }
                Ok(Self::new(address, offset))
            }
            None => s.trim().parse::<u64>().map(Self).map_err(|_| invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let cases = [
            (0u64, 0u16),
            (0, 1),
            (1, 0),
            (65536, 65535),
            (12345678, 42),
            (MAX_BLOCK_ADDRESS, u16::MAX),
        ];

        for (address, offset) in cases {
            let voffset = VirtualOffset::new(address, offset);
            assert_eq!(voffset.unpack(), (address, offset));
        }
    }

    #[test]
    fn test_raw_layout() {
        let voffset = VirtualOffset::new(0x1234, 0x5678);
        assert_eq!(voffset.get(), 0x1234_5678);
        assert_eq!(VirtualOffset::from(0x1234_5678u64), voffset);
    }

    #[test]
    fn test_address_is_truncated_to_48_bits() {
        let voffset = VirtualOffset::new(1 << 48, 7);
        assert_eq!(voffset.block_address(), 0);
        assert_eq!(voffset.block_offset(), 7);
    }

    #[test]
    fn test_ordering_follows_address_then_offset() {
        assert!(VirtualOffset::new(1, 65535) < VirtualOffset::new(2, 0));
        assert!(VirtualOffset::new(2, 0) < VirtualOffset::new(2, 1));
    }

    #[test]
    fn test_parse() {
        assert_eq!("64251:1234".parse::<VirtualOffset>().unwrap(), VirtualOffset::new(64251, 1234));
        assert_eq!("65536".parse::<VirtualOffset>().unwrap(), VirtualOffset::new(1, 0));
        assert_eq!(VirtualOffset::new(9, 3).to_string(), "9:3");

        assert!("1:70000".parse::<VirtualOffset>().is_err());
        assert!("abc".parse::<VirtualOffset>().is_err());
        assert!("281474976710656:0".parse::<VirtualOffset>().is_err());
    }
}
