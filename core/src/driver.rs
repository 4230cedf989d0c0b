use log::debug;
use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::config::{ConfigUpdate, SimulationConfig};
use crate::error::{Result, SimulationError};
use crate::simulation::{AdvanceOutcome, Simulation, Snapshot};

/// Longest wall-clock gap a single frame may account for.
pub const MAX_FRAME_SECONDS: f64 = 0.25;
const MILLIS_PER_SECOND: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Paused,
}

/// Turns animation-frame timestamps into simulated time for a [`Simulation`].
#[derive(Debug)]
pub struct Driver<R = StdRng> {
    simulation: Simulation<R>,
    run_state: RunState,
    last_frame_ms: Option<f64>,
    max_frame_seconds: Option<f64>,
}

impl Driver<StdRng> {
    pub fn from_config(config: SimulationConfig) -> Result<Self> {
        Ok(Self::new(Simulation::new(config)?))
    }
}

impl<R: Rng> Driver<R> {
    pub fn new(simulation: Simulation<R>) -> Self {
        Self {
            simulation,
            run_state: RunState::Paused,
            last_frame_ms: None,
            max_frame_seconds: Some(MAX_FRAME_SECONDS),
        }
    }

    /// `None` lets a frame cover any wall-clock gap.
    pub fn with_max_frame_seconds(mut self, limit: Option<f64>) -> Result<Self> {
        if let Some(seconds) = limit {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(SimulationError::InvalidFrameLimit(seconds));
            }
        }
        self.max_frame_seconds = limit;
        Ok(self)
    }

    pub fn simulation(&self) -> &Simulation<R> {
        &self.simulation
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn speed(&self) -> f64 {
        self.simulation.config().speed_multiplier
    }

    pub fn start(&mut self) {
        if self.run_state == RunState::Paused {
            self.run_state = RunState::Running;
            self.last_frame_ms = None;
        }
    }

    pub fn pause(&mut self) {
        self.run_state = RunState::Paused;
        self.last_frame_ms = None;
    }

    pub fn toggle(&mut self) -> RunState {
        match self.run_state {
            RunState::Running => self.pause(),
            RunState::Paused => self.start(),
        }
        self.run_state
    }

    /// Advances by the wall time elapsed since the previous frame. The first
    /// frame after a start or resume only records the timestamp.
    pub fn tick(&mut self, timestamp_ms: f64) -> Result<Snapshot> {
        if !timestamp_ms.is_finite() {
            return Err(SimulationError::DegenerateAdvance(timestamp_ms));
        }
        if self.run_state == RunState::Running {
            let elapsed = self
                .last_frame_ms
                .map(|last| ((timestamp_ms - last) / MILLIS_PER_SECOND).max(0.0))
                .unwrap_or(0.0);
            self.last_frame_ms = Some(timestamp_ms);
            if elapsed > 0.0 {
                self.advance_wall(elapsed)?;
            }
        }
        Ok(self.simulation.snapshot())
    }

    /// Advances by an explicit amount of wall time regardless of the run state.
    pub fn step(&mut self, wall_seconds: f64) -> Result<AdvanceOutcome> {
        if !wall_seconds.is_finite() || wall_seconds < 0.0 {
            return Err(SimulationError::DegenerateAdvance(wall_seconds));
        }
        self.simulation.advance(wall_seconds * self.speed())
    }

    fn advance_wall(&mut self, wall_seconds: f64) -> Result<AdvanceOutcome> {
        let clamped = match self.max_frame_seconds {
            Some(limit) => wall_seconds.min(limit),
            None => wall_seconds,
        };
        self.simulation.advance(clamped * self.speed())
    }

    pub fn reconfigure(&mut self, update: ConfigUpdate) -> Result<()> {
        self.simulation.reconfigure(update)
    }

    /// Starts over with the current rates and leaves the driver paused.
    pub fn reset(&mut self) -> Result<()> {
        self.simulation.restart()?;
        self.pause();
        debug!("driver reset and paused");
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.simulation.snapshot()
    }
}
