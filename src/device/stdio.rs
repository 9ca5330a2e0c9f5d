use std::io::{self, Read, Write};

use super::{not_open, read_fully, wrong_mode, Device, OpenMode};

enum Handle {
    Stdin(io::Stdin),
    Stdout(io::Stdout),
}

/// Standard input (read-only) or standard output (write-only).
///
/// Not seekable; `tell` reports the number of bytes transferred since open.
pub struct StdioDevice {
    handle: Option<Handle>,
    mode: OpenMode,
    position: u64,
    error: String,
}

impl StdioDevice {
    /// Create a closed device
    pub fn new() -> Self {
        Self { handle: None, mode: OpenMode::NotOpen, position: 0, error: String::new() }
    }

    fn record<T>(&mut self, result: io::Result<T>) -> io::Result<T> {
        if let Err(e) = &result {
            self.error = e.to_string();
        }
        result
    }
}

impl Default for StdioDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for StdioDevice {
    fn open(&mut self, mode: OpenMode) -> io::Result<()> {
        let handle = match mode {
            OpenMode::ReadOnly => Handle::Stdin(io::stdin()),
            OpenMode::WriteOnly => Handle::Stdout(io::stdout()),
            OpenMode::NotOpen => {
                return self.record(Err(io::Error::new(io::ErrorKind::InvalidInput, "no open mode")))
            }
        };
        self.handle = Some(handle);
        self.mode = mode;
        self.position = 0;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.mode = OpenMode::NotOpen;
        let result = match self.handle.take() {
            Some(Handle::Stdout(stdout)) => stdout.lock().flush(),
            _ => Ok(()),
        };
        self.record(result)
    }

    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn mode(&self) -> OpenMode {
        self.mode
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = match &self.handle {
            Some(Handle::Stdin(stdin)) => read_fully(&mut stdin.lock(), buf),
            Some(Handle::Stdout(_)) => Err(wrong_mode(self.mode)),
            None => Err(not_open()),
        };
        let n = self.record(result)?;
        self.position += n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = match &self.handle {
            Some(Handle::Stdout(stdout)) => stdout.lock().write_all(buf).map(|_| buf.len()),
            Some(Handle::Stdin(_)) => Err(wrong_mode(self.mode)),
            None => Err(not_open()),
        };
        let n = self.record(result)?;
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = match &self.handle {
            Some(Handle::Stdout(stdout)) => stdout.lock().flush(),
            Some(Handle::Stdin(_)) => Ok(()),
            None => Err(not_open()),
        };
        self.record(result)
    }

    fn tell(&mut self) -> io::Result<u64> {
        if self.handle.is_none() {
            return self.record(Err(not_open()));
        }
        Ok(self.position)
    }

    fn seek(&mut self, _address: u64) -> io::Result<()> {
        let err = io::Error::new(io::ErrorKind::Unsupported, "standard streams are not seekable");
        self.record(Err(err))
    }

    fn is_random_access(&self) -> bool {
        false
    }

    fn error_string(&self) -> &str {
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_random_access() {
        let mut device = StdioDevice::new();
        assert!(!device.is_random_access());
        assert!(device.seek(0).is_err());
        assert!(device.error_string().contains("not seekable"));
    }

    #[test]
    fn test_tell_requires_open() {
        let mut device = StdioDevice::new();
        assert!(device.tell().is_err());
    }
}
