//! Byte devices the BGZF stream reads compressed blocks from and writes them to.
//!
//! The stream only relies on the [`Device`] trait; the concrete devices here
//! cover files, standard input/output and in-memory buffers.

pub mod file;
pub mod memory;
pub mod stdio;

pub use file::FileDevice;
pub use memory::MemoryDevice;
pub use stdio::StdioDevice;

use std::fmt;
use std::io;
use std::path::Path;

/// Direction a device (and the stream on top of it) is opened in.
///
/// BGZF streams are never read and written in the same session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OpenMode {
    #[default]
    NotOpen,
    ReadOnly,
    WriteOnly,
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotOpen => "not open",
            Self::ReadOnly => "read-only",
            Self::WriteOnly => "write-only",
        };
        f.write_str(name)
    }
}

/// Raw byte transport consumed by [`crate::BgzfStream`].
pub trait Device {
    /// Open the device in the given mode.
    fn open(&mut self, mode: OpenMode) -> io::Result<()>;

    /// Release the device. Closing a closed device is a no-op.
    fn close(&mut self) -> io::Result<()>;

    fn is_open(&self) -> bool;

    fn mode(&self) -> OpenMode;

    /// Read up to `buf.len()` bytes.
    ///
    /// Returns fewer bytes only when the end of the data is reached.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write `buf`, returning the number of bytes accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Push buffered writes through to the underlying sink.
    fn flush(&mut self) -> io::Result<()>;

    /// Current byte address in the underlying data
    fn tell(&mut self) -> io::Result<u64>;

    /// Move to an absolute byte address
    fn seek(&mut self, address: u64) -> io::Result<()>;

    fn is_random_access(&self) -> bool;

    /// Description of the most recent failure, empty if none
    fn error_string(&self) -> &str;
}

impl<D: Device + ?Sized> Device for Box<D> {
    fn open(&mut self, mode: OpenMode) -> io::Result<()> {
        (**self).open(mode)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn mode(&self) -> OpenMode {
        (**self).mode()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn tell(&mut self) -> io::Result<u64> {
        (**self).tell()
    }

    fn seek(&mut self, address: u64) -> io::Result<()> {
        (**self).seek(address)
    }

    fn is_random_access(&self) -> bool {
        (**self).is_random_access()
    }

    fn error_string(&self) -> &str {
        (**self).error_string()
    }
}

/// Whether a path names standard input/output rather than a file
pub fn is_stdio_path(path: &Path) -> bool {
    matches!(path.to_str(), Some("-") | Some("stdin") | Some("stdout"))
}

/// Pick a device for a path: `-`, `stdin` and `stdout` map to the process's
/// standard streams, anything else to a file.
pub fn open_device(path: &Path) -> Box<dyn Device> {
    if is_stdio_path(path) {
        Box::new(StdioDevice::new())
    } else {
        Box::new(FileDevice::new(path))
    }
}

/// Fill `buf` from `reader`, stopping early only at end of data.
pub(crate) fn read_fully<R: io::Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

pub(crate) fn not_open() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "device is not open")
}

pub(crate) fn wrong_mode(mode: OpenMode) -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, format!("device is {}", mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn test_stdio_paths() {
        assert!(is_stdio_path(Path::new("-")));
        assert!(is_stdio_path(Path::new("stdin")));
        assert!(is_stdio_path(Path::new("stdout")));
        assert!(!is_stdio_path(&PathBuf::from("reads.bam")));
    }

    #[test]
    fn test_open_device_selects_by_name() {
        assert!(!open_device(Path::new("-")).is_random_access());
        assert!(open_device(Path::new("data.gz")).is_random_access());
    }

    #[test]
    fn test_read_fully_stops_at_end() {
        let mut reader = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 8];
        assert_eq!(read_fully(&mut reader, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(read_fully(&mut reader, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_open_mode_display() {
        assert_eq!(OpenMode::ReadOnly.to_string(), "read-only");
        assert_eq!(OpenMode::WriteOnly.to_string(), "write-only");
    }
}
