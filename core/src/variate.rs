use std::fmt;

use rand::Rng;
use rand::distributions::Open01;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

pub const SECONDS_PER_MINUTE: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    Arrival,
    Service,
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateKind::Arrival => f.write_str("arrival"),
            RateKind::Service => f.write_str("service"),
        }
    }
}

pub fn validate_rate(kind: RateKind, per_minute: f64) -> Result<f64> {
    if per_minute.is_finite() && per_minute > 0.0 {
        Ok(per_minute)
    } else {
        Err(SimulationError::InvalidRate {
            kind,
            value: per_minute,
        })
    }
}

/// Inverse-CDF transform of a uniform draw in (0, 1) into an exponential
/// duration in simulated seconds.
pub fn exponential_from_unit(unit: f64, rate_per_minute: f64) -> f64 {
    let rate_per_second = rate_per_minute / SECONDS_PER_MINUTE;
    -unit.ln() / rate_per_second
}

pub(crate) fn draw_exponential<R: Rng + ?Sized>(rng: &mut R, rate_per_minute: f64) -> f64 {
    let unit: f64 = rng.sample(Open01);
    exponential_from_unit(unit, rate_per_minute)
}

/// Samples an exponentially distributed duration (seconds) for a rate given in
/// customers per minute.
pub fn sample_exponential<R: Rng + ?Sized>(
    rng: &mut R,
    kind: RateKind,
    rate_per_minute: f64,
) -> Result<f64> {
    let rate = validate_rate(kind, rate_per_minute)?;
    Ok(draw_exponential(rng, rate))
}
