use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    Idle,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventKind {
    Arrival,
    Departure,
}

/// The two pending events of a single-teller system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EventSchedule {
    next_arrival: f64,
    next_departure: f64,
}

impl EventSchedule {
    pub fn new(first_arrival: f64) -> Self {
        Self {
            next_arrival: first_arrival,
            next_departure: f64::INFINITY,
        }
    }

    pub fn next_arrival(&self) -> f64 {
        self.next_arrival
    }

    pub fn next_departure(&self) -> f64 {
        self.next_departure
    }

    pub fn arrival_due(&self, clock: f64) -> bool {
        clock >= self.next_arrival
    }

    pub fn departure_due(&self, clock: f64) -> bool {
        clock >= self.next_departure
    }

    pub fn postpone_arrival(&mut self, gap: f64) {
        self.next_arrival += gap;
    }

    pub fn schedule_departure(&mut self, at: f64) {
        self.next_departure = at;
    }

    pub fn clear_departure(&mut self) {
        self.next_departure = f64::INFINITY;
    }

    /// Earliest pending event no later than `horizon`. Arrivals win ties.
    pub fn next_due(&self, horizon: f64) -> Option<(EventKind, f64)> {
        let (kind, at) = if self.next_arrival <= self.next_departure {
            (EventKind::Arrival, self.next_arrival)
        } else {
            (EventKind::Departure, self.next_departure)
        };
        (at <= horizon).then_some((kind, at))
    }
}
