use thiserror::Error;

use crate::variate::RateKind;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SimulationError {
    #[error("{kind} rate must be a positive finite number of customers per minute, got {value}")]
    InvalidRate { kind: RateKind, value: f64 },

    #[error("simulated time can only advance by a non-negative finite amount, got {0}")]
    DegenerateAdvance(f64),

    #[error("speed multiplier must be a positive finite number, got {0}")]
    InvalidSpeed(f64),

    #[error("frame limit must be a positive finite number of seconds, got {0}")]
    InvalidFrameLimit(f64),

    #[error("history capacity must hold at least one sample")]
    InvalidHistoryCapacity,
}

pub type Result<T> = std::result::Result<T, SimulationError>;
