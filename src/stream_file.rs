//! File-backed byte source for lazily streamed audio
//!
//! `StreamedFile` presents a file on disk as a sequential source with
//! explicit positioning. The decoder pulls bytes on demand, so large music
//! files never have to be resident in memory.
//!
//! Failures are reported through degenerate values only: a reader whose
//! file could not be opened returns 0 bytes from every read and reports
//! end-of-file.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Byte source capability consumed by the decoding side of the audio system.
///
/// Positions are absolute byte offsets from the start of the source.
pub trait ByteSource {
    /// Copy up to `buf.len()` bytes from the cursor into `buf`, returning the
    /// number of bytes copied. Short only at end-of-file.
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize;

    /// Move the cursor to an absolute offset. Offsets past the end are
    /// accepted; the next read returns 0.
    fn seek_to(&mut self, offset: u64);

    /// Current cursor offset.
    fn pos(&self) -> u64;

    /// Whether the last read ran into the end of the source.
    fn eof(&self) -> bool;

    /// Total size of the source in bytes.
    fn length(&self) -> u64;

    /// Rewind and read the whole source into memory.
    fn read_to_end_vec(&mut self) -> Vec<u8> {
        self.seek_to(0);
        let mut data = vec![0u8; self.length() as usize];
        let read = self.read_bytes(&mut data);
        data.truncate(read);
        data
    }
}

/// A byte source reading from a file on disk.
///
/// Holds at most one open file at a time. Not safe for concurrent use;
/// wrap it in a lock when the decoder lives on another thread.
#[derive(Debug, Default)]
pub struct StreamedFile {
    file: Option<File>,
    path: PathBuf,
    cursor: u64,
    eof: bool,
}

impl StreamedFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `path` for reading, closing any previously open file first.
    ///
    /// An unreadable path leaves the reader closed; the failure is only
    /// logged.
    pub fn open(&mut self, path: impl AsRef<Path>) {
        if self.file.is_some() {
            self.close();
        }

        self.path = path.as_ref().to_path_buf();
        self.cursor = 0;
        self.eof = false;

        match File::open(&self.path) {
            Ok(file) => {
                tracing::debug!("Opened stream: {}", self.path.display());
                self.file = Some(file);
            }
            Err(e) => {
                tracing::warn!("Failed to open {}: {}", self.path.display(), e);
            }
        }
    }

    /// Release the OS file handle. Safe to call on a closed reader.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            tracing::debug!("Closed stream: {}", self.path.display());
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Path given to the most recent `open`.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for StreamedFile {
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let Some(file) = self.file.as_mut() else {
            self.eof = true;
            return 0;
        };

        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("Read failed on {}: {}", self.path.display(), e);
                    self.eof = true;
                    break;
                }
            }
        }

        self.cursor += filled as u64;
        filled
    }

    fn seek_to(&mut self, offset: u64) {
        let Some(file) = self.file.as_mut() else {
            return;
        };

        if let Err(e) = file.seek(SeekFrom::Start(offset)) {
            tracing::warn!("Seek to {} failed on {}: {}", offset, self.path.display(), e);
            return;
        }
        self.cursor = offset;
        self.eof = false;
    }

    fn pos(&self) -> u64 {
        self.cursor
    }

    fn eof(&self) -> bool {
        self.file.is_none() || self.eof
    }

    fn length(&self) -> u64 {
        // From the filesystem, so it is valid before any read
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}

impl Read for StreamedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let file = self.file.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "stream is not open")
        })?;

        let n = file.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.eof = true;
        }
        self.cursor += n as u64;
        Ok(n)
    }
}

impl Seek for StreamedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let file = self.file.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "stream is not open")
        })?;

        let offset = file.seek(pos)?;
        self.cursor = offset;
        self.eof = false;
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static FIXTURE_ID: AtomicUsize = AtomicUsize::new(0);

    fn fixture(contents: &[u8]) -> PathBuf {
        let id = FIXTURE_ID.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "sfx_panel_stream_{}_{}.bin",
            std::process::id(),
            id
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_length_matches_file_size_regardless_of_position() {
        let path = fixture(&[7u8; 1234]);
        let mut file = StreamedFile::new();
        file.open(&path);

        assert_eq!(file.length(), 1234);
        let mut buf = [0u8; 100];
        file.read_bytes(&mut buf);
        assert_eq!(file.length(), 1234);
        file.seek_to(5000);
        assert_eq!(file.length(), 1234);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_exact_read_advances_cursor() {
        let path = fixture(b"0123456789");
        let mut file = StreamedFile::new();
        file.open(&path);

        let mut buf = [0u8; 4];
        assert_eq!(file.read_bytes(&mut buf), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(file.pos(), 4);
        assert!(!file.eof());

        assert_eq!(file.read_bytes(&mut buf), 4);
        assert_eq!(&buf, b"4567");
        assert_eq!(file.pos(), 8);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_short_read_sets_eof() {
        let path = fixture(b"0123456789");
        let mut file = StreamedFile::new();
        file.open(&path);

        let mut buf = [0u8; 16];
        assert_eq!(file.read_bytes(&mut buf), 10);
        assert!(file.eof());
        assert_eq!(file.pos(), 10);

        assert_eq!(file.read_bytes(&mut buf), 0);
        assert!(file.eof());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_seek_zero_rewinds() {
        let path = fixture(b"abcdef");
        let mut file = StreamedFile::new();
        file.open(&path);

        let mut buf = [0u8; 32];
        file.read_bytes(&mut buf);
        assert!(file.eof());

        file.seek_to(0);
        assert_eq!(file.pos(), 0);

        let mut buf = [0u8; 3];
        assert_eq!(file.read_bytes(&mut buf), 3);
        assert_eq!(&buf, b"abc");
        assert!(!file.eof());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_seek_past_end_reads_nothing() {
        let path = fixture(b"abcdef");
        let mut file = StreamedFile::new();
        file.open(&path);

        file.seek_to(100);
        assert_eq!(file.pos(), 100);

        let mut buf = [0u8; 4];
        assert_eq!(file.read_bytes(&mut buf), 0);
        assert!(file.eof());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_reopen_switches_path() {
        let first = fixture(b"first file");
        let second = fixture(b"second");
        let mut file = StreamedFile::new();

        file.open(&first);
        let mut buf = [0u8; 5];
        file.read_bytes(&mut buf);

        file.open(&second);
        assert_eq!(file.path(), second.as_path());
        assert_eq!(file.pos(), 0);
        assert_eq!(file.length(), 6);

        let mut buf = [0u8; 6];
        assert_eq!(file.read_bytes(&mut buf), 6);
        assert_eq!(&buf, b"second");

        fs::remove_file(first).unwrap();
        fs::remove_file(second).unwrap();
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let mut file = StreamedFile::new();
        file.open(std::env::temp_dir().join("sfx_panel_does_not_exist.ogg"));

        assert!(!file.is_open());
        assert!(file.eof());
        assert_eq!(file.length(), 0);

        let mut buf = [0u8; 8];
        assert_eq!(file.read_bytes(&mut buf), 0);
    }

    #[test]
    fn test_close_is_idempotent() {
        let path = fixture(b"xyz");
        let mut file = StreamedFile::new();
        file.open(&path);
        assert!(file.is_open());

        file.close();
        file.close();
        assert!(!file.is_open());
        assert!(file.eof());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_read_to_end_vec_rewinds() {
        let path = fixture(b"full contents");
        let mut file = StreamedFile::new();
        file.open(&path);

        let mut buf = [0u8; 4];
        file.read_bytes(&mut buf);

        assert_eq!(file.read_to_end_vec(), b"full contents".to_vec());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_io_traits_track_cursor() {
        let path = fixture(b"0123456789");
        let mut file = StreamedFile::new();
        file.open(&path);

        let end = Seek::seek(&mut file, SeekFrom::End(-2)).unwrap();
        assert_eq!(end, 8);
        assert_eq!(file.pos(), 8);

        let mut out = Vec::new();
        file.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"89".to_vec());
        assert_eq!(file.pos(), 10);
        assert!(file.eof());

        fs::remove_file(path).unwrap();
    }
}
