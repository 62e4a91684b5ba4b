//! In-memory implementations of the pipeline seams.
//!
//! Both fakes keep their observable state behind an `Arc`, so a test keeps
//! a [`Probe`] after handing the fake itself to a `Pipeline`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use logship_core::sink::DocumentStore;
use logship_core::source::{FileSystem, LineReader};
use logship_core::{Ack, Document, IndexError, SourceError};

// ---------------------------------------------------------------------------
// MemoryFs
// ---------------------------------------------------------------------------

/// What a fake saw, shared with the test.
#[derive(Debug, Default)]
pub struct Events {
    pub opened: Vec<String>,
    pub source_closed: bool,
    pub connected: bool,
    pub sink_closed: bool,
    /// One entry per `index` call, retries included.
    pub attempts: Vec<Attempt>,
}

#[derive(Debug, Clone)]
pub struct Attempt {
    pub url: String,
    pub id: Option<String>,
}

pub type Probe = Arc<Mutex<Events>>;

pub fn probe() -> Probe {
    Arc::new(Mutex::new(Events::default()))
}

/// A file system holding one file.
pub struct MemoryFs {
    lines: Vec<String>,
    /// Fail `read_line` once this many lines were served.
    fail_after: Option<usize>,
    unavailable: bool,
    probe: Probe,
}

impl MemoryFs {
    pub fn new(lines: &[&str], probe: &Probe) -> Self {
        Self {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            fail_after: None,
            unavailable: false,
            probe: probe.clone(),
        }
    }

    pub fn failing_after(mut self, lines: usize) -> Self {
        self.fail_after = Some(lines);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

impl FileSystem for MemoryFs {
    type Reader = MemoryReader;

    async fn open(&mut self, path: &str) -> Result<MemoryReader, SourceError> {
        if self.unavailable {
            return Err(SourceError::Unavailable {
                path: path.to_string(),
                message: "connection refused".to_string(),
            });
        }
        self.probe.lock().unwrap().opened.push(path.to_string());
        Ok(MemoryReader {
            path: path.to_string(),
            lines: self.lines.iter().cloned().collect(),
            served: 0,
            fail_after: self.fail_after,
            probe: self.probe.clone(),
        })
    }
}

pub struct MemoryReader {
    path: String,
    lines: VecDeque<String>,
    served: usize,
    fail_after: Option<usize>,
    probe: Probe,
}

impl LineReader for MemoryReader {
    async fn read_line(&mut self) -> Result<Option<String>, SourceError> {
        if self.fail_after == Some(self.served) {
            return Err(SourceError::Read {
                path: self.path.clone(),
                message: "connection reset by peer".to_string(),
            });
        }
        self.served += 1;
        Ok(self.lines.pop_front())
    }

    async fn close(&mut self) {
        self.probe.lock().unwrap().source_closed = true;
    }
}

// ---------------------------------------------------------------------------
// ScriptedStore
// ---------------------------------------------------------------------------

/// A document store that answers from a script, then accepts everything.
pub struct ScriptedStore {
    connect_error: Option<IndexError>,
    script: VecDeque<Result<Ack, IndexError>>,
    next_id: u64,
    probe: Probe,
}

impl ScriptedStore {
    pub fn new(probe: &Probe) -> Self {
        Self {
            connect_error: None,
            script: VecDeque::new(),
            next_id: 0,
            probe: probe.clone(),
        }
    }

    /// Answer the next `index` call with `answer`.
    pub fn then(mut self, answer: Result<Ack, IndexError>) -> Self {
        self.script.push_back(answer);
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.connect_error = Some(IndexError::SinkUnavailable {
            endpoint: "http://opensearch-node1:9200".to_string(),
            message: "connection refused".to_string(),
        });
        self
    }
}

impl DocumentStore for ScriptedStore {
    async fn connect(&mut self) -> Result<(), IndexError> {
        if let Some(err) = self.connect_error.clone() {
            return Err(err);
        }
        self.probe.lock().unwrap().connected = true;
        Ok(())
    }

    async fn index(&mut self, document: &Document, id: Option<&str>) -> Result<Ack, IndexError> {
        self.probe.lock().unwrap().attempts.push(Attempt {
            url: document.url.clone(),
            id: id.map(str::to_string),
        });
        match self.script.pop_front() {
            Some(answer) => answer,
            None => {
                self.next_id += 1;
                Ok(Ack::Id(format!("doc-{}", self.next_id)))
            }
        }
    }

    async fn close(&mut self) {
        self.probe.lock().unwrap().sink_closed = true;
    }
}

pub fn transient() -> IndexError {
    IndexError::Transient {
        message: "503 Service Unavailable".to_string(),
    }
}

pub fn rejected() -> IndexError {
    IndexError::RejectedByStore {
        status: Some(400),
        reason: "mapper_parsing_exception: failed to parse field [size]".to_string(),
    }
}
