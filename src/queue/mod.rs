mod iter;

pub use iter::{IntoIter, RandomIter, Shuffled};

use crate::error::{QueueError, Result};
use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::cell::Cell;
use std::fmt;

/// Slot count allocated on the first enqueue, and the floor below which the
/// buffer never shrinks.
pub const INITIAL_CAPACITY: usize = 8;

// Odd constant spreading consecutive iterator ids across the seed space
const ITERATOR_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// A queue that hands items back in uniformly random order.
///
/// Items live in the first `len()` slots of a contiguous buffer. Removal swaps
/// the chosen slot with the last live one and moves the item out, so the
/// buffer never keeps a removed item alive. The buffer doubles when full and
/// halves once it is at most a quarter full.
pub struct RandomizedQueue<T> {
    slots: Box<[Option<T>]>,
    size: usize,
    seed: u64,
    rng: Pcg64Mcg,
    iterators: Cell<u64>,
}

impl<T> RandomizedQueue<T> {
    /// Creates an empty queue seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Creates an empty queue whose dequeue, sample and iteration orders are
    /// fully determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        debug!("Creating randomized queue with seed {}", seed);
        RandomizedQueue {
            slots: Vec::new().into_boxed_slice(),
            size: 0,
            seed,
            rng: Pcg64Mcg::seed_from_u64(seed),
            iterators: Cell::new(0),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn len(&self) -> usize {
        self.size
    }

    /// Number of allocated slots, live or empty.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Adds an item. Passing `None` is rejected with
    /// [`QueueError::InvalidArgument`] and leaves the queue untouched.
    ///
    /// When `T` is itself an `Option<U>`, a bare `None` is ambiguous and does
    /// not compile, while `None::<U>` is stored as `Some(None)`. Wrap the item
    /// explicitly (`Some(None)` stores it, `None::<Option<U>>` is rejected).
    ///
    /// ```
    /// use randqueue::{QueueError, RandomizedQueue};
    ///
    /// let mut queue: RandomizedQueue<&str> = RandomizedQueue::with_seed(7);
    /// queue.enqueue("a").unwrap();
    /// assert_eq!(
    ///     queue.enqueue(None),
    ///     Err(QueueError::InvalidArgument("item must not be null"))
    /// );
    /// assert_eq!(queue.len(), 1);
    /// ```
    pub fn enqueue<I: Into<Option<T>>>(&mut self, item: I) -> Result<()> {
        let item = item
            .into()
            .ok_or(QueueError::InvalidArgument("item must not be null"))?;
        self.push(item);
        Ok(())
    }

    /// Removes and returns an item chosen uniformly among the live ones.
    pub fn dequeue(&mut self) -> Result<T> {
        if self.is_empty() {
            return Err(QueueError::Empty);
        }

        let last = self.size - 1;
        let index = self.rng.gen_range(0..self.size);
        self.slots.swap(index, last);
        let item = self.slots[last]
            .take()
            .expect("live slot must hold an item");
        self.size = last;

        let capacity = self.capacity();
        if self.size <= capacity / 4 && capacity > INITIAL_CAPACITY {
            self.resize(capacity / 2);
        }

        Ok(item)
    }

    /// Returns an item chosen uniformly among the live ones without removing
    /// it. Consecutive calls draw with replacement.
    pub fn sample(&mut self) -> Result<&T> {
        if self.is_empty() {
            return Err(QueueError::Empty);
        }

        let index = self.rng.gen_range(0..self.size);
        Ok(self.slots[index]
            .as_ref()
            .expect("live slot must hold an item"))
    }

    /// Iterates over the current items in a fresh random order. Each call
    /// shuffles independently of every other iterator and of the queue's own
    /// generator.
    pub fn iter(&self) -> RandomIter<'_, T> {
        let mut rng = self.iterator_rng();
        Shuffled::new(self.live().collect(), &mut rng)
    }

    /// Like [`iter`](Self::iter), but clones the items so the iterator
    /// outlives any later change to the queue.
    pub fn snapshot_iter(&self) -> IntoIter<T>
    where
        T: Clone,
    {
        let mut rng = self.iterator_rng();
        Shuffled::new(self.live().cloned().collect(), &mut rng)
    }

    fn push(&mut self, item: T) {
        if self.size == self.capacity() {
            self.resize((self.capacity() * 2).max(INITIAL_CAPACITY));
        }
        self.slots[self.size] = Some(item);
        self.size += 1;
    }

    fn live(&self) -> impl Iterator<Item = &T> {
        self.slots[..self.size].iter().flatten()
    }

    fn iterator_rng(&self) -> Pcg64Mcg {
        let id = self.iterators.get().wrapping_add(1);
        self.iterators.set(id);
        Pcg64Mcg::seed_from_u64(self.seed ^ id.wrapping_mul(ITERATOR_SEED_STRIDE))
    }

    fn resize(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.size);
        trace!(
            "Resizing randomized queue from {} to {} slots ({} live)",
            self.capacity(),
            capacity,
            self.size
        );

        let mut slots: Vec<Option<T>> = Vec::with_capacity(capacity);
        slots.extend(self.slots[..self.size].iter_mut().map(Option::take));
        slots.resize_with(capacity, || None);
        self.slots = slots.into_boxed_slice();
    }
}

impl<T> Default for RandomizedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for RandomizedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomizedQueue")
            .field("len", &self.size)
            .field("capacity", &self.capacity())
            .field("seed", &self.seed)
            .field("items", &self.live().collect::<Vec<_>>())
            .finish()
    }
}

impl<T> Extend<T> for RandomizedQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T> FromIterator<T> for RandomizedQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

impl<T> IntoIterator for RandomizedQueue<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> Self::IntoIter {
        let items: Vec<T> = self.slots[..self.size]
            .iter_mut()
            .filter_map(Option::take)
            .collect();
        Shuffled::new(items, &mut self.rng)
    }
}

impl<'a, T> IntoIterator for &'a RandomizedQueue<T> {
    type Item = &'a T;
    type IntoIter = RandomIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
