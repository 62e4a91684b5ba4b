//! LineSource — lazy, forward-only sequence of [`RawLine`]s over a file
//! system stream.
//!
//! Concrete file systems (WebHDFS, local disk) live in `logship-feeds` and
//! implement [`FileSystem`] and [`LineReader`]. The stream cannot be rewound;
//! reading the same path again means opening it again.

use std::future::Future;

use crate::error::SourceError;
use crate::types::RawLine;

/// A file system that can open a path as a line stream.
pub trait FileSystem: Send {
    type Reader: LineReader;

    /// Open `path` for reading. Fails with [`SourceError::Unavailable`].
    fn open(&mut self, path: &str) -> impl Future<Output = Result<Self::Reader, SourceError>> + Send;
}

/// A raw line stream as delivered by a [`FileSystem`].
pub trait LineReader: Send {
    /// Next physical line without its terminator, or `None` at end of stream.
    /// Faults after opening are [`SourceError::Read`].
    fn read_line(&mut self) -> impl Future<Output = Result<Option<String>, SourceError>> + Send;

    /// Release the underlying connection or handle.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Numbers lines and hides blank ones from downstream stages.
#[derive(Debug)]
pub struct LineSource<R> {
    reader: R,
    ordinal: u64,
    skipped: u64,
    finished: bool,
}

impl<R: LineReader> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            ordinal: 0,
            skipped: 0,
            finished: false,
        }
    }

    /// Open `path` on `fs` and wrap the resulting stream.
    pub async fn open<F>(fs: &mut F, path: &str) -> Result<Self, SourceError>
    where
        F: FileSystem<Reader = R>,
    {
        fs.open(path).await.map(Self::new)
    }

    /// Next non-blank line, or `None` once the stream is exhausted.
    pub async fn next(&mut self) -> Result<Option<RawLine>, SourceError> {
        if self.finished {
            return Ok(None);
        }
        loop {
            let Some(text) = self.reader.read_line().await? else {
                self.finished = true;
                return Ok(None);
            };
            self.ordinal += 1;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                self.skipped += 1;
                tracing::trace!(ordinal = self.ordinal, "skipping blank line");
                continue;
            }
            return Ok(Some(RawLine::new(self.ordinal, trimmed)));
        }
    }

    /// Number of physical lines read so far, blank ones included.
    pub fn lines_read(&self) -> u64 {
        self.ordinal
    }

    /// Number of blank lines skipped so far.
    pub fn blank_lines(&self) -> u64 {
        self.skipped
    }

    pub async fn close(&mut self) {
        self.reader.close().await;
    }
}
