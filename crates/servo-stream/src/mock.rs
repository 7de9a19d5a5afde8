use crate::traits::{AngleSource, ReadChunk, StatePublisher};
use crate::{JointState, Result, SourceError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted in-process angle source for tests and demos.
///
/// Reads consume the script in order; an exhausted script reports
/// would-block forever. Counters are shared handles so callers can keep
/// observing after the source moves into a loop.
pub struct MockAngleSource {
    script: VecDeque<Result<ReadChunk>>,
    fail_open: bool,
    open: bool,
    reads: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl MockAngleSource {
    pub fn new(script: Vec<Result<ReadChunk>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fail_open: false,
            open: false,
            reads: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose `open` always fails.
    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::new(Vec::new())
        }
    }

    /// Shared count of `read_chunk` calls.
    pub fn read_counter(&self) -> Arc<AtomicUsize> {
        self.reads.clone()
    }

    /// Shared count of `close` calls.
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        self.closes.clone()
    }
}

impl AngleSource for MockAngleSource {
    fn open(&mut self) -> Result<()> {
        if self.fail_open {
            return Err(SourceError::Open {
                path: PathBuf::from("/dev/mock"),
                message: "scripted open failure".to_string(),
            });
        }
        self.open = true;
        Ok(())
    }

    fn read_chunk(&mut self) -> Result<ReadChunk> {
        if !self.open {
            return Err(SourceError::NotOpen);
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.script
            .pop_front()
            .unwrap_or(Ok(ReadChunk::WouldBlock))
    }

    fn close(&mut self) {
        self.open = false;
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Records every published state behind a shared handle.
#[derive(Default)]
pub struct MockPublisher {
    published: Arc<Mutex<Vec<(String, JointState)>>>,
    fail: bool,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose `publish` always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Clone the record handle before moving the publisher into a loop.
    pub fn records(&self) -> Arc<Mutex<Vec<(String, JointState)>>> {
        self.published.clone()
    }
}

#[async_trait]
impl StatePublisher for MockPublisher {
    async fn publish(&mut self, topic: &str, state: &JointState) -> Result<()> {
        if self.fail {
            return Err(SourceError::Publish("scripted publish failure".to_string()));
        }
        self.published
            .lock()
            .map_err(|_| SourceError::Publish("record lock poisoned".to_string()))?
            .push((topic.to_string(), *state));
        Ok(())
    }
}
