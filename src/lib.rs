//! A randomized queue: items come back out in uniformly random order, and
//! every iterator walks its own independent random permutation.

pub mod error;
pub mod permutation;
pub mod queue;
pub mod uniformity;

pub use error::{ClientError, QueueError};
pub use queue::RandomizedQueue;
