//! Read-only access to a disk image file or block device.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// An opened, read-only, seekable byte source.
///
/// All reads are positioned (absolute offset), so no seek cursor is shared
/// between calls: concurrent detection passes against the same source are
/// safe as long as each performs its own `read_at`. The underlying handle is
/// released when the owning value is dropped, on every exit path.
#[derive(Debug)]
pub struct ByteSource {
    file: File,
    path: PathBuf,
    len: u64,
}

impl ByteSource {
    /// Opens `path` read-only.
    ///
    /// # Errors
    /// Returns an `io::Error` if the file does not exist or is not readable.
    pub fn open(path: &Path) -> io::Result<ByteSource> {
        let file = File::options().read(true).open(path)?;
        let len = file.metadata()?.len();

        Ok(ByteSource {
            file,
            path: path.to_path_buf(),
            len,
        })
    }

    /// Returns the path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the total length of the source in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fills `buf` from the absolute byte offset `offset`.
    ///
    /// # Errors
    /// Returns an `io::Error` if the range cannot be read in full.
    pub fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_exact_at(buf, offset)
        }
        #[cfg(windows)]
        {
            use std::os::windows::fs::FileExt;
            let mut pos = 0;
            while pos < buf.len() {
                let n = self.file.seek_read(&mut buf[pos..], offset + pos as u64)?;
                if n == 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "failed to fill whole buffer",
                    ));
                }
                pos += n;
            }
            Ok(())
        }
    }

    /// Reads `len` bytes at the absolute byte offset `offset`.
    ///
    /// # Errors
    /// Returns an `io::Error` if the range cannot be read in full.
    pub fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0; len];
        self.read_exact_at(&mut buf, offset).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("failed to read {} bytes at offset {}: {}", len, offset, err),
            )
        })?;
        Ok(buf)
    }

    /// Reads one sector of `sector_size` bytes.
    pub fn read_sector(&self, sector: u64, sector_size: usize) -> io::Result<Vec<u8>> {
        self.read_at(sector * sector_size as u64, sector_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn positioned_reads_do_not_share_a_cursor() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&[0xAA; 16]).unwrap();
        tmp.write_all(&[0xBB; 16]).unwrap();
        tmp.flush().unwrap();

        let src = ByteSource::open(tmp.path()).unwrap();
        assert_eq!(src.len(), 32);

        // Interleaved reads at arbitrary offsets must be independent.
        assert_eq!(src.read_at(16, 4).unwrap(), vec![0xBB; 4]);
        assert_eq!(src.read_at(0, 4).unwrap(), vec![0xAA; 4]);
        assert_eq!(src.read_at(12, 8).unwrap(), [[0xAA; 4], [0xBB; 4]].concat());
    }

    #[test]
    fn short_read_is_an_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&[0u8; 8]).unwrap();
        tmp.flush().unwrap();

        let src = ByteSource::open(tmp.path()).unwrap();
        assert!(src.read_at(4, 8).is_err());
    }
}
