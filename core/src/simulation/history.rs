use std::collections::VecDeque;

use serde::Serialize;

pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistorySample {
    pub second: u64,
    pub queue_length: usize,
}

/// Queue length trend, one sample per call that crosses a whole simulated second.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySampler {
    samples: VecDeque<HistorySample>,
    capacity: usize,
    last_clock: f64,
}

impl HistorySampler {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
            last_clock: 0.0,
        }
    }

    /// Returns whether a sample was taken.
    pub fn observe(&mut self, clock: f64, queue_length: usize) -> bool {
        let crossed = clock.floor() > self.last_clock.floor();
        self.last_clock = clock;
        if !crossed {
            return false;
        }

        self.samples.push_back(HistorySample {
            second: clock.floor() as u64,
            queue_length,
        });
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        true
    }

    pub fn samples(&self) -> impl ExactSizeIterator<Item = &HistorySample> + '_ {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.last_clock = 0.0;
    }
}
