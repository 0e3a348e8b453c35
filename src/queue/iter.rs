use crate::error::{QueueError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::iter::FusedIterator;

/// Walks a privately owned, shuffled copy of a queue's items.
///
/// The permutation is fixed when the iterator is built, so advancing it never
/// touches the queue or any other iterator.
#[derive(Debug, Clone)]
pub struct Shuffled<I> {
    order: std::vec::IntoIter<I>,
}

/// Borrowing iterator returned by [`RandomizedQueue::iter`](super::RandomizedQueue::iter).
pub type RandomIter<'a, T> = Shuffled<&'a T>;

/// Owning iterator, from consuming the queue or from a snapshot.
pub type IntoIter<T> = Shuffled<T>;

impl<I> Shuffled<I> {
    pub(crate) fn new<R: Rng + ?Sized>(mut order: Vec<I>, rng: &mut R) -> Self {
        order.shuffle(rng);
        Shuffled {
            order: order.into_iter(),
        }
    }

    pub fn has_next(&self) -> bool {
        !self.order.as_slice().is_empty()
    }

    /// Like [`Iterator::next`], but reports exhaustion as an error.
    pub fn try_next(&mut self) -> Result<I> {
        self.order.next().ok_or(QueueError::Exhausted)
    }

    /// Randomized queue iterators never remove items; this always fails.
    pub fn remove(&mut self) -> Result<()> {
        Err(QueueError::Unsupported(
            "remove is not supported by randomized queue iterators",
        ))
    }
}

impl<I> Iterator for Shuffled<I> {
    type Item = I;

    fn next(&mut self) -> Option<I> {
        self.order.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<I> ExactSizeIterator for Shuffled<I> {}

impl<I> FusedIterator for Shuffled<I> {}
