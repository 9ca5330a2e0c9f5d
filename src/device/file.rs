use std::fs::File;
use std::io::{self, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{not_open, read_fully, wrong_mode, Device, OpenMode};

enum Handle {
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
}

/// A file on disk, opened read-only or write-only (truncating).
pub struct FileDevice {
    path: PathBuf,
    handle: Option<Handle>,
    mode: OpenMode,
    error: String,
}

impl FileDevice {
    /// Create a closed device for `path`; nothing is touched until `open`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            handle: None,
            mode: OpenMode::NotOpen,
            error: String::new(),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record<T>(&mut self, result: io::Result<T>) -> io::Result<T> {
        if let Err(e) = &result {
            self.error = format!("{}: {}", self.path.display(), e);
        }
        result
    }
}

impl Device for FileDevice {
    fn open(&mut self, mode: OpenMode) -> io::Result<()> {
        let handle = match mode {
            OpenMode::ReadOnly => File::open(&self.path).map(|f| Handle::Reader(BufReader::new(f))),
            OpenMode::WriteOnly => {
                File::create(&self.path).map(|f| Handle::Writer(BufWriter::new(f)))
            }
            OpenMode::NotOpen => Err(io::Error::new(io::ErrorKind::InvalidInput, "no open mode")),
        };
        let handle = self.record(handle)?;
        self.handle = Some(handle);
        self.mode = mode;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.mode = OpenMode::NotOpen;
        let result = match self.handle.take() {
            Some(Handle::Writer(mut writer)) => writer.flush(),
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
        let result = match &mut self.handle {
            Some(Handle::Reader(reader)) => read_fully(reader, buf),
            Some(Handle::Writer(_)) => Err(wrong_mode(self.mode)),
            None => Err(not_open()),
        };
        self.record(result)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = match &mut self.handle {
            Some(Handle::Writer(writer)) => writer.write_all(buf).map(|_| buf.len()),
            Some(Handle::Reader(_)) => Err(wrong_mode(self.mode)),
            None => Err(not_open()),
        };
        self.record(result)
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = match &mut self.handle {
            Some(Handle::Writer(writer)) => writer.flush(),
            Some(Handle::Reader(_)) => Ok(()),
            None => Err(not_open()),
        };
        self.record(result)
    }

    fn tell(&mut self) -> io::Result<u64> {
        let result = match &mut self.handle {
            Some(Handle::Reader(reader)) => reader.stream_position(),
            Some(Handle::Writer(writer)) => writer.stream_position(),
            None => Err(not_open()),
        };
        self.record(result)
    }

    fn seek(&mut self, address: u64) -> io::Result<()> {
        let result = match &mut self.handle {
            Some(Handle::Reader(reader)) => reader.seek(SeekFrom::Start(address)).map(|_| ()),
            Some(Handle::Writer(writer)) => writer.seek(SeekFrom::Start(address)).map(|_| ()),
            None => Err(not_open()),
        };
        self.record(result)
    }

    fn is_random_access(&self) -> bool {
        true
    }

    fn error_string(&self) -> &str {
        &self.error
    }
}
