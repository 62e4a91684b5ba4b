//! Local file system source, for dry runs against a copy of the log.

use std::path::PathBuf;

use logship_core::source::{FileSystem, LineReader};
use logship_core::SourceError;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::info;

/// Opens paths on the local disk, optionally relative to a root directory.
#[derive(Debug, Clone, Default)]
pub struct LocalFs {
    root: Option<PathBuf>,
}

impl LocalFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path.trim_start_matches('/')),
            None => PathBuf::from(path),
        }
    }
}

impl FileSystem for LocalFs {
    type Reader = LocalReader;

    async fn open(&mut self, path: &str) -> Result<LocalReader, SourceError> {
        let resolved = self.resolve(path);
        let file = File::open(&resolved)
            .await
            .map_err(|err| SourceError::Unavailable {
                path: resolved.display().to_string(),
                message: err.to_string(),
            })?;
        info!(path = %resolved.display(), "streaming local file");
        Ok(LocalReader {
            path: resolved.display().to_string(),
            lines: Some(BufReader::new(file).lines()),
        })
    }
}

/// Line stream over a local file.
#[derive(Debug)]
pub struct LocalReader {
    path: String,
    lines: Option<Lines<BufReader<File>>>,
}

impl LineReader for LocalReader {
    async fn read_line(&mut self) -> Result<Option<String>, SourceError> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };
        lines.next_line().await.map_err(|err| SourceError::Read {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }

    async fn close(&mut self) {
        self.lines = None;
    }
}
