//! File writer implementation

use crate::core::{Record, Result, Writer};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends formatted records to a file through a buffered handle.
///
/// Buffered bytes reach the file on [`flush`](Writer::flush),
/// [`Logger::flush`](crate::Logger::flush) or drop.
pub struct FileWriter {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl FileWriter {
    /// Open `path` for appending, creating it and its parent directories
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Writer for FileWriter {
    fn write(&self, bytes: &[u8], _record: &Record) -> Result<()> {
        self.writer.lock().write_all(bytes)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileWriter {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.writer.get_mut().flush();
    }
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CallSite, Level};
    use tempfile::tempdir;

    #[test]
    fn test_file_writer_appends() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("app.log");
        let record = Record::new(Level::Info, "x", CallSite::default());

        {
            let writer = FileWriter::new(&path).expect("Failed to create writer");
            assert_eq!(writer.path(), path.as_path());
            writer.write(b"first\n", &record).unwrap();
            writer.flush().unwrap();
            writer.write(b"second\n", &record).unwrap();
        }

        let writer = FileWriter::new(&path).unwrap();
        writer.write(b"third\n", &record).unwrap();
        drop(writer);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\nthird\n");
    }
}
