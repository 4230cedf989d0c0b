use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::simulation::DEFAULT_HISTORY_CAPACITY;
use crate::variate::{RateKind, validate_rate};

/// Slider range offered to users; values outside it are still accepted.
pub const PRACTICAL_RATE_RANGE: RangeInclusive<f64> = 1.0..=15.0;
pub const SPEED_PRESETS: [f64; 3] = [1.0, 5.0, 20.0];

/// How many events a single `advance` call may fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPolicy {
    /// At most one arrival and one departure per call, stamped with the tick
    /// instant. Large deltas under-fire arrivals.
    #[default]
    SinglePerTick,
    /// Every event due within the delta fires at its scheduled instant.
    CatchUp,
}

impl EventPolicy {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "single" | "single_per_tick" | "single-per-tick" => Some(Self::SinglePerTick),
            "catch-up" | "catch_up" | "catchup" => Some(Self::CatchUp),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SinglePerTick => "single-per-tick",
            Self::CatchUp => "catch-up",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub arrival_rate_per_min: f64,
    pub service_rate_per_min: f64,
    pub speed_multiplier: f64,
    pub event_policy: EventPolicy,
    pub history_capacity: usize,
}

impl SimulationConfig {
    pub fn new(arrival_rate_per_min: f64, service_rate_per_min: f64) -> Result<Self> {
        let config = Self {
            arrival_rate_per_min,
            service_rate_per_min,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_event_policy(mut self, policy: EventPolicy) -> Self {
        self.event_policy = policy;
        self
    }

    pub fn with_speed(mut self, multiplier: f64) -> Result<Self> {
        self.speed_multiplier = validate_speed(multiplier)?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        validate_rate(RateKind::Arrival, self.arrival_rate_per_min)?;
        validate_rate(RateKind::Service, self.service_rate_per_min)?;
        validate_speed(self.speed_multiplier)?;
        if self.history_capacity == 0 {
            return Err(SimulationError::InvalidHistoryCapacity);
        }
        Ok(())
    }

    pub(crate) fn apply(&mut self, update: &ConfigUpdate) {
        if let Some(rate) = update.arrival_rate_per_min {
            self.arrival_rate_per_min = rate;
        }
        if let Some(rate) = update.service_rate_per_min {
            self.service_rate_per_min = rate;
        }
        if let Some(multiplier) = update.speed_multiplier {
            self.speed_multiplier = multiplier;
        }
        if let Some(policy) = update.event_policy {
            self.event_policy = policy;
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arrival_rate_per_min: 4.0,
            service_rate_per_min: 5.0,
            speed_multiplier: 1.0,
            event_policy: EventPolicy::SinglePerTick,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Partial reconfiguration. Absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub arrival_rate_per_min: Option<f64>,
    pub service_rate_per_min: Option<f64>,
    pub speed_multiplier: Option<f64>,
    pub event_policy: Option<EventPolicy>,
}

impl ConfigUpdate {
    pub fn arrival_rate(per_minute: f64) -> Self {
        Self {
            arrival_rate_per_min: Some(per_minute),
            ..Self::default()
        }
    }

    pub fn service_rate(per_minute: f64) -> Self {
        Self {
            service_rate_per_min: Some(per_minute),
            ..Self::default()
        }
    }

    pub fn speed(multiplier: f64) -> Self {
        Self {
            speed_multiplier: Some(multiplier),
            ..Self::default()
        }
    }

    pub fn event_policy(policy: EventPolicy) -> Self {
        Self {
            event_policy: Some(policy),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(rate) = self.arrival_rate_per_min {
            validate_rate(RateKind::Arrival, rate)?;
        }
        if let Some(rate) = self.service_rate_per_min {
            validate_rate(RateKind::Service, rate)?;
        }
        if let Some(multiplier) = self.speed_multiplier {
            validate_speed(multiplier)?;
        }
        Ok(())
    }
}

pub fn validate_speed(multiplier: f64) -> Result<f64> {
    if multiplier.is_finite() && multiplier > 0.0 {
        Ok(multiplier)
    } else {
        Err(SimulationError::InvalidSpeed(multiplier))
    }
}
