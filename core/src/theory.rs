//! Closed-form M/M/1 steady-state figures, shown next to the measured ones.

use serde::Serialize;

use crate::error::Result;
use crate::variate::{RateKind, SECONDS_PER_MINUTE, validate_rate};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SteadyState {
    pub expected_in_system: f64,
    pub expected_in_queue: f64,
    /// Seconds.
    pub expected_sojourn: f64,
    /// Seconds.
    pub expected_wait: f64,
    pub idle_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    pub traffic_intensity: f64,
    pub stable: bool,
    /// Absent when the queue grows without bound.
    pub steady_state: Option<SteadyState>,
}

pub fn traffic_intensity(arrival_rate_per_min: f64, service_rate_per_min: f64) -> f64 {
    arrival_rate_per_min / service_rate_per_min
}

pub fn project(arrival_rate_per_min: f64, service_rate_per_min: f64) -> Result<Projection> {
    let lambda = validate_rate(RateKind::Arrival, arrival_rate_per_min)? / SECONDS_PER_MINUTE;
    let mu = validate_rate(RateKind::Service, service_rate_per_min)? / SECONDS_PER_MINUTE;
    let rho = lambda / mu;

    if rho >= 1.0 {
        return Ok(Projection {
            traffic_intensity: rho,
            stable: false,
            steady_state: None,
        });
    }

    Ok(Projection {
        traffic_intensity: rho,
        stable: true,
        steady_state: Some(SteadyState {
            expected_in_system: rho / (1.0 - rho),
            expected_in_queue: rho * rho / (1.0 - rho),
            expected_sojourn: 1.0 / (mu - lambda),
            expected_wait: rho / (mu - lambda),
            idle_probability: 1.0 - rho,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_defaults_give_known_values() {
        let projection = project(4.0, 5.0).unwrap();
        assert!(projection.stable);
        assert!((projection.traffic_intensity - 0.8).abs() < 1e-12);

        let steady = projection.steady_state.unwrap();
        assert!((steady.expected_in_system - 4.0).abs() < 1e-9);
        assert!((steady.expected_in_queue - 3.2).abs() < 1e-9);
        // mu - lambda = 1 customer per minute
        assert!((steady.expected_sojourn - 60.0).abs() < 1e-9);
        assert!((steady.expected_wait - 48.0).abs() < 1e-9);
        assert!((steady.idle_probability - 0.2).abs() < 1e-9);
        // Little's law
        let lambda = 4.0 / 60.0;
        assert!((steady.expected_in_queue - lambda * steady.expected_wait).abs() < 1e-9);
    }

    #[test]
    fn saturated_system_has_no_steady_state() {
        let projection = project(5.0, 5.0).unwrap();
        assert!(!projection.stable);
        assert_eq!(projection.steady_state, None);
        assert_eq!(traffic_intensity(12.0, 4.0), 3.0);
    }

    #[test]
    fn rejects_zero_rates() {
        assert!(project(0.0, 5.0).is_err());
        assert!(project(4.0, -5.0).is_err());
    }
}
