use crate::{JointState, Result};
use async_trait::async_trait;

/// Outcome of one bounded, non-blocking read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadChunk {
    /// Bytes were available (possibly zero).
    Data(Vec<u8>),
    /// Nothing to read right now. Not an error.
    WouldBlock,
}

/// A byte stream of newline-separated angle records.
pub trait AngleSource: Send {
    /// Acquire the underlying stream. Called once during loop setup; a
    /// closed source is only reusable via a fresh call.
    fn open(&mut self) -> Result<()>;

    /// Bounded, non-blocking read.
    fn read_chunk(&mut self) -> Result<ReadChunk>;

    /// Release the underlying stream. Idempotent.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// Host capability for delivering joint states. Delivery semantics beyond
/// the returned future are the host transport's business.
#[async_trait]
pub trait StatePublisher: Send {
    async fn publish(&mut self, topic: &str, state: &JointState) -> Result<()>;
}
