//! Bounded history of health samples

use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Duration;

use super::sample::HealthSample;
use crate::error::HistoryError;

/// Ring buffer of samples ordered by timestamp
///
/// Single writer (the monitoring cycle), any number of readers. The lock is
/// only held to move `Arc`s in and out, and samples are immutable, so
/// readers always see whole samples.
#[derive(Debug)]
pub struct HistoryStore {
    samples: RwLock<VecDeque<Arc<HealthSample>>>,
    capacity: usize,
    max_age: Option<Duration>,
}

impl HistoryStore {
    /// Creates a store retaining at most `capacity` samples
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            max_age: None,
        }
    }

    /// Also drops samples older than `max_age` relative to the newest one
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Appends a sample, evicting the oldest ones beyond capacity or age
    pub fn append(&self, sample: impl Into<Arc<HealthSample>>) -> Result<(), HistoryError> {
        let sample = sample.into();
        let mut samples = self.samples.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(newest) = samples.back()
            && sample.timestamp < newest.timestamp
        {
            return Err(HistoryError::OutOfOrder {
                newest: newest.timestamp,
                attempted: sample.timestamp,
            });
        }

        if let Some(max_age) = self.max_age {
            let cutoff = sample.timestamp - max_age;
            while samples.front().is_some_and(|oldest| oldest.timestamp < cutoff) {
                samples.pop_front();
            }
        }

        while samples.len() >= self.capacity {
            samples.pop_front();
        }
        samples.push_back(sample);
        Ok(())
    }

    /// The `n` most recent samples, oldest first
    pub fn window(&self, n: usize) -> Vec<Arc<HealthSample>> {
        let samples = self.samples.read().unwrap_or_else(PoisonError::into_inner);
        let skip = samples.len().saturating_sub(n);
        samples.iter().skip(skip).cloned().collect()
    }

    pub fn latest(&self) -> Option<Arc<HealthSample>> {
        self.samples
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.samples
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
