//! Size-bounded log file with numbered backups.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default size at which the log rolls over (20 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 20 * 1024 * 1024;

/// Default number of rolled-over files kept next to the live log.
pub const DEFAULT_KEEP: u32 = 1;

/// Append-only file that rolls over to `<path>.1`, `<path>.2`, ... when full.
///
/// A write that would push the file past `max_bytes` first moves the current
/// file aside. The newest backup is always `<path>.1`; backups beyond `keep`
/// are discarded. With `keep == 0` the file is truncated instead. A
/// `max_bytes` of 0 disables rotation.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    keep: u32,
}

impl RotatingFile {
    /// Opens (or creates) the log at `path`, appending to existing content.
    pub fn open(path: impl AsRef<Path>, max_bytes: u64, keep: u32) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            file,
            written,
            max_bytes,
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes in the live file.
    pub fn len(&self) -> u64 {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Path of the `n`th backup (1 = newest).
    pub fn backup_path(&self, n: u32) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.keep > 0 {
            let oldest = self.backup_path(self.keep);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for n in (1..self.keep).rev() {
                let from = self.backup_path(n);
                if from.exists() {
                    fs::rename(&from, self.backup_path(n + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        debug!(path = %self.path.display(), bytes = self.written, "Rotated log file");
        self.written = 0;
        Ok(())
    }

    /// Writes `record` whole to a single file, rotating beforehand if needed.
    pub fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        if self.max_bytes > 0
            && self.written > 0
            && self.written + record.len() as u64 > self.max_bytes
        {
            self.rotate()?;
        }
        self.file.write_all(record)?;
        self.written += record.len() as u64;
        Ok(())
    }
}

impl Write for RotatingFile {
    /// Consumes the whole buffer as one record.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_record(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
