mod config;
mod driver;
mod error;
mod simulation;
pub mod theory;
mod variate;

pub use config::{
    ConfigUpdate, EventPolicy, PRACTICAL_RATE_RANGE, SPEED_PRESETS, SimulationConfig,
    validate_speed,
};
pub use driver::{Driver, MAX_FRAME_SECONDS, RunState};
pub use error::{Result, SimulationError};
pub use simulation::{
    AdvanceOutcome, Customer, DEFAULT_HISTORY_CAPACITY, HistorySample, HistorySampler,
    ServerStatus, Simulation, Snapshot, StatsAccumulator, StatsSummary,
};
pub use theory::{Projection, SteadyState};
pub use variate::{RateKind, SECONDS_PER_MINUTE, exponential_from_unit, sample_exponential};
