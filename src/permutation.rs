use crate::error::ClientError;
use crate::queue::RandomizedQueue;
use log::info;
use std::io::{BufRead, Write};

/// Reads whitespace separated items from `input` and writes `k` of them,
/// chosen uniformly at random, to `output`, one per line.
///
/// Returns the number of items read.
pub fn run<R: BufRead, W: Write>(
    k: usize,
    seed: u64,
    input: R,
    output: &mut W,
) -> Result<usize, ClientError> {
    let mut queue = RandomizedQueue::with_seed(seed);
    for line in input.lines() {
        let line = line?;
        queue.extend(line.split_whitespace().map(str::to_owned));
    }

    let available = queue.len();
    if k > available {
        return Err(ClientError::NotEnoughItems {
            requested: k,
            available,
        });
    }
    info!("Picking {} of {} items", k, available);

    for _ in 0..k {
        writeln!(output, "{}", queue.dequeue()?)?;
    }
    output.flush()?;

    Ok(available)
}
