use serde::Serialize;

use super::{Customer, HistorySample, ServerStatus, StatsSummary};
use crate::config::SimulationConfig;

/// Owned copy of everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub clock: f64,
    pub status: ServerStatus,
    pub queue: Vec<Customer>,
    pub server: Option<Customer>,
    pub next_arrival: f64,
    pub next_departure: Option<f64>,
    pub customers_created: u64,
    pub stats: StatsSummary,
    pub history: Vec<HistorySample>,
    pub config: SimulationConfig,
}

impl Snapshot {
    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    pub fn in_system(&self) -> usize {
        self.queue.len() + usize::from(self.server.is_some())
    }

    pub fn whole_seconds(&self) -> u64 {
        self.clock.floor() as u64
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
