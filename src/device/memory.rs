use std::io;

use super::{not_open, wrong_mode, Device, OpenMode};

/// An in-memory byte buffer with random access.
///
/// Opening write-only truncates the buffer; opening read-only rewinds it.
#[derive(Debug, Default)]
pub struct MemoryDevice {
    data: Vec<u8>,
    position: usize,
    mode: OpenMode,
    error: String,
}

impl MemoryDevice {
    /// Wrap existing bytes, e.g. a BGZF file to read.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, ..Default::default() }
    }

    /// Bytes currently held
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the device, returning its bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    fn fail<T>(&mut self, err: io::Error) -> io::Result<T> {
        self.error = err.to_string();
        Err(err)
    }
}

impl Device for MemoryDevice {
    fn open(&mut self, mode: OpenMode) -> io::Result<()> {
        match mode {
            OpenMode::ReadOnly => {}
            OpenMode::WriteOnly => self.data.clear(),
            OpenMode::NotOpen => {
                return self.fail(io::Error::new(io::ErrorKind::InvalidInput, "no open mode"))
            }
        }
        self.position = 0;
        self.mode = mode;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.mode = OpenMode::NotOpen;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.mode != OpenMode::NotOpen
    }

    fn mode(&self) -> OpenMode {
        self.mode
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.mode {
            OpenMode::ReadOnly => {}
            OpenMode::WriteOnly => return self.fail(wrong_mode(self.mode)),
            OpenMode::NotOpen => return self.fail(not_open()),
        }
        let start = self.position.min(self.data.len());
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.position = start + n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.mode {
            OpenMode::WriteOnly => {}
            OpenMode::ReadOnly => return self.fail(wrong_mode(self.mode)),
            OpenMode::NotOpen => return self.fail(not_open()),
        }
        let end = self.position + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.position..end].copy_from_slice(buf);
        self.position = end;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.is_open() {
            return self.fail(not_open());
        }
        Ok(())
    }

    fn tell(&mut self) -> io::Result<u64> {
        if !self.is_open() {
            return self.fail(not_open());
        }
        Ok(self.position as u64)
    }

    fn seek(&mut self, address: u64) -> io::Result<()> {
        if !self.is_open() {
            return self.fail(not_open());
        }
        match usize::try_from(address) {
            Ok(position) => {
                self.position = position;
                Ok(())
            }
            Err(_) => {
                self.fail(io::Error::new(io::ErrorKind::InvalidInput, "address out of range"))
            }
        }
    }

    fn is_random_access(&self) -> bool {
        true
    }

    fn error_string(&self) -> &str {
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_and_seek() {
        let mut device = MemoryDevice::new(b"0123456789".to_vec());
        device.open(OpenMode::ReadOnly).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(device.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"0123");

        device.seek(8).unwrap();
        assert_eq!(device.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"89");
        assert_eq!(device.tell().unwrap(), 10);

        device.seek(100).unwrap();
        assert_eq!(device.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_write_truncates_on_open() {
        let mut device = MemoryDevice::new(b"old contents".to_vec());
        device.open(OpenMode::WriteOnly).unwrap();
        device.write(b"new").unwrap();
        device.close().unwrap();

        assert_eq!(device.into_inner(), b"new");
    }

    #[test]
    fn test_mode_enforced() {
        let mut device = MemoryDevice::default();
        let mut buf = [0u8; 1];
        assert!(device.read(&mut buf).is_err());
        assert_eq!(device.error_string(), "device is not open");

        device.open(OpenMode::ReadOnly).unwrap();
        assert!(device.write(b"x").is_err());
        assert_eq!(device.error_string(), "device is read-only");
    }
}
