use crate::error::QueueError;
use crate::queue::RandomizedQueue;
use hashbrown::HashMap;
use log::{debug, info};
use rayon::prelude::*;
use std::fmt;

/// One distinct item of a uniformity run.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    pub item: String,
    /// How many times the item was listed, and so enqueued.
    pub copies: usize,
    /// How many samples returned it.
    pub count: usize,
}

/// How often each item came out of `sample` during a uniformity run.
#[derive(Debug, Clone, PartialEq)]
pub struct Frequencies {
    pub trials: usize,
    pub tallies: Vec<Tally>,
}

impl Frequencies {
    fn enqueued(&self) -> usize {
        self.tallies.iter().map(|tally| tally.copies).sum()
    }

    /// Observed share of `item`, between 0 and 1.
    pub fn share(&self, item: &str) -> Option<f64> {
        if self.trials == 0 {
            return None;
        }
        self.tallies
            .iter()
            .find(|tally| tally.item == item)
            .map(|tally| tally.count as f64 / self.trials as f64)
    }

    /// Share a uniform sampler would give `item`: its copies over all
    /// enqueued items.
    pub fn expected_share(&self, item: &str) -> Option<f64> {
        let enqueued = self.enqueued();
        self.tallies
            .iter()
            .find(|tally| tally.item == item)
            .map(|tally| tally.copies as f64 / enqueued as f64)
    }

    /// Largest gap between an observed share and the expected share.
    pub fn max_deviation(&self) -> f64 {
        let enqueued = self.enqueued();
        if self.trials == 0 || enqueued == 0 {
            return 0.0;
        }
        self.tallies
            .iter()
            .map(|tally| {
                let observed = tally.count as f64 / self.trials as f64;
                let expected = tally.copies as f64 / enqueued as f64;
                (observed - expected).abs()
            })
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for Frequencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tally in &self.tallies {
            let share = if self.trials == 0 {
                0.0
            } else {
                tally.count as f64 * 100.0 / self.trials as f64
            };
            writeln!(f, "{}: {} ({:.2}%)", tally.item, tally.count, share)?;
        }
        write!(f, "max deviation: {:.4}", self.max_deviation())
    }
}

/// Draws `trials` samples from a queue holding `items` and counts them.
///
/// Trials are split across the rayon pool. Every worker owns its queue,
/// seeded from `seed` and its index, so the outcome only depends on `seed`
/// and the pool size.
pub fn run(items: &[String], trials: usize, seed: u64) -> Result<Frequencies, QueueError> {
    let workers = rayon::current_num_threads().max(1);
    info!(
        "Sampling {} times from {} items on {} workers",
        trials,
        items.len(),
        workers
    );

    let partials: Vec<HashMap<&str, usize>> = (0..workers)
        .into_par_iter()
        .map(|worker| {
            let share = trials / workers + usize::from(worker < trials % workers);
            let mut queue = RandomizedQueue::with_seed(seed.wrapping_add(worker as u64));
            queue.extend(items.iter().map(String::as_str));

            let mut counts = HashMap::<&str, usize>::new();
            for _ in 0..share {
                *counts.entry(*queue.sample()?).or_insert(0) += 1;
            }
            debug!("Worker {} drew {} samples", worker, share);
            Ok::<_, QueueError>(counts)
        })
        .collect::<Result<_, QueueError>>()?;

    let mut totals = HashMap::<&str, usize>::new();
    for partial in partials {
        for (item, count) in partial {
            *totals.entry(item).or_insert(0) += count;
        }
    }

    let mut tallies: Vec<Tally> = Vec::new();
    let mut positions = HashMap::<&str, usize>::new();
    for item in items {
        match positions.get(item.as_str()) {
            Some(&position) => tallies[position].copies += 1,
            None => {
                positions.insert(item.as_str(), tallies.len());
                tallies.push(Tally {
                    item: item.clone(),
                    copies: 1,
                    count: totals.get(item.as_str()).copied().unwrap_or(0),
                });
            }
        }
    }

    Ok(Frequencies { trials, tallies })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters() -> Vec<String> {
        ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn counts_add_up_to_trials() {
        let frequencies = run(&letters(), 1_001, 3).unwrap();
        let total: usize = frequencies.tallies.iter().map(|t| t.count).sum();
        assert_eq!(total, 1_001);
        assert_eq!(frequencies.tallies.len(), 4);
    }

    #[test]
    fn shares_are_near_a_quarter() {
        let frequencies = run(&letters(), 10_000, 2024).unwrap();
        for item in letters() {
            let share = frequencies.share(&item).unwrap();
            assert!((share - 0.25).abs() < 0.04, "{} drawn {:.4} of the time", item, share);
        }
        assert!(frequencies.max_deviation() < 0.04);
    }

    #[test]
    fn empty_items_fail_like_an_empty_queue() {
        assert_eq!(run(&[], 10, 1), Err(QueueError::Empty));
    }

    #[test]
    fn zero_trials_report_nothing_drawn() {
        let frequencies = run(&letters(), 0, 1).unwrap();
        assert!(frequencies.tallies.iter().all(|t| t.count == 0));
        assert_eq!(frequencies.share("A"), None);
        assert_eq!(frequencies.max_deviation(), 0.0);
    }

    #[test]
    fn duplicate_items_are_reported_once() {
        let items = vec!["x".to_string(), "x".to_string(), "y".to_string()];
        let frequencies = run(&items, 300, 8).unwrap();
        assert_eq!(frequencies.tallies.len(), 2);
        assert_eq!(frequencies.tallies[0].item, "x");
        assert_eq!(frequencies.tallies[0].copies, 2);
        assert_eq!(frequencies.tallies[1].copies, 1);
    }

    #[test]
    fn duplicate_items_weight_the_expected_share() {
        let items = vec!["x".to_string(), "x".to_string(), "y".to_string()];
        let frequencies = run(&items, 30_000, 8).unwrap();
        assert_eq!(frequencies.expected_share("x"), Some(2.0 / 3.0));
        assert_eq!(frequencies.expected_share("y"), Some(1.0 / 3.0));
        assert_eq!(frequencies.expected_share("z"), None);
        assert!(
            frequencies.max_deviation() < 0.02,
            "uniform sampling reported {:.4} off",
            frequencies.max_deviation()
        );
    }

    #[test]
    fn deviation_compares_against_copies() {
        let frequencies = Frequencies {
            trials: 3,
            tallies: vec![
                Tally { item: "x".to_string(), copies: 2, count: 2 },
                Tally { item: "y".to_string(), copies: 1, count: 1 },
            ],
        };
        assert!(frequencies.max_deviation() < 1e-12);
        assert!(frequencies.to_string().ends_with("max deviation: 0.0000"));
    }
}
