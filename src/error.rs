use thiserror::Error;

/// Contract violations reported by the randomized queue and its iterators.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// `enqueue` was handed the absent value.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// `dequeue` or `sample` on a queue with no items.
    #[error("randomized queue is empty")]
    Empty,
    /// The iterator has no items left to return.
    #[error("iterator has no more items")]
    Exhausted,
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, QueueError>;

/// Failures of the command line clients built on the queue.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to read or write items: {0}")]
    Io(#[from] std::io::Error),
    #[error("asked for {requested} items but only {available} were given")]
    NotEnoughItems { requested: usize, available: usize },
    #[error(transparent)]
    Queue(#[from] QueueError),
}
