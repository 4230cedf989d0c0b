mod customer;
mod history;
mod scheduler;
mod snapshot;
mod stats;

use std::collections::VecDeque;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use customer::Customer;
pub use history::{DEFAULT_HISTORY_CAPACITY, HistorySample, HistorySampler};
pub use scheduler::ServerStatus;
pub use snapshot::Snapshot;
pub use stats::{StatsAccumulator, StatsSummary};

use scheduler::{EventKind, EventSchedule};

use crate::config::{ConfigUpdate, EventPolicy, SimulationConfig};
use crate::error::{Result, SimulationError};
use crate::variate::{RateKind, draw_exponential, validate_rate};

const MAX_EVENTS_PER_ADVANCE: usize = 100_000;

/// What a single `advance` call fired.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceOutcome {
    pub arrivals: usize,
    pub departed: Vec<Customer>,
    pub history_sampled: bool,
}

/// Single-teller queue driven by externally supplied simulated-time deltas.
#[derive(Debug)]
pub struct Simulation<R = StdRng> {
    config: SimulationConfig,
    rng: R,
    clock: f64,
    queue: VecDeque<Customer>,
    server: Option<Customer>,
    schedule: EventSchedule,
    stats: StatsAccumulator,
    history: HistorySampler,
    next_customer_id: u64,
    event_cap: usize,
}

impl Simulation<StdRng> {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: SimulationConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(config: SimulationConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let mut simulation = Self {
            history: HistorySampler::new(config.history_capacity),
            config,
            rng,
            clock: 0.0,
            queue: VecDeque::new(),
            server: None,
            schedule: EventSchedule::new(f64::INFINITY),
            stats: StatsAccumulator::default(),
            next_customer_id: 1,
            event_cap: MAX_EVENTS_PER_ADVANCE,
        };
        let first_arrival = simulation.draw(RateKind::Arrival);
        simulation.schedule = EventSchedule::new(first_arrival);
        Ok(simulation)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn status(&self) -> ServerStatus {
        if self.server.is_some() {
            ServerStatus::Busy
        } else {
            ServerStatus::Idle
        }
    }

    pub fn queue(&self) -> impl ExactSizeIterator<Item = &Customer> + '_ {
        self.queue.iter()
    }

    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    pub fn server(&self) -> Option<&Customer> {
        self.server.as_ref()
    }

    pub fn stats(&self) -> &StatsAccumulator {
        &self.stats
    }

    pub fn history(&self) -> &HistorySampler {
        &self.history
    }

    pub fn next_arrival(&self) -> f64 {
        self.schedule.next_arrival()
    }

    pub fn next_departure(&self) -> Option<f64> {
        Some(self.schedule.next_departure()).filter(|at| at.is_finite())
    }

    pub fn customers_created(&self) -> u64 {
        self.next_customer_id - 1
    }

    pub fn advance(&mut self, delta: f64) -> Result<AdvanceOutcome> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(SimulationError::DegenerateAdvance(delta));
        }

        let mut outcome = AdvanceOutcome::default();
        match self.config.event_policy {
            EventPolicy::SinglePerTick => self.advance_single(delta, &mut outcome),
            EventPolicy::CatchUp => self.advance_catch_up(delta, &mut outcome),
        }
        outcome.history_sampled = self.history.observe(self.clock, self.queue.len());
        Ok(outcome)
    }

    fn advance_single(&mut self, delta: f64, outcome: &mut AdvanceOutcome) {
        self.stats.integrate_queue(self.queue.len(), delta);
        self.clock += delta;
        let now = self.clock;

        if self.schedule.arrival_due(now) {
            self.fire_arrival(now);
            outcome.arrivals += 1;
        }

        if self.server.is_some() && self.schedule.departure_due(now) {
            if let Some(finished) = self.fire_departure(now) {
                outcome.departed.push(finished);
            }
        }
    }

    fn advance_catch_up(&mut self, delta: f64, outcome: &mut AdvanceOutcome) {
        let horizon = self.clock + delta;
        let mut fired = 0;

        while let Some((kind, at)) = self.schedule.next_due(horizon) {
            if fired == self.event_cap {
                warn!(
                    "catch-up stopped after {fired} events at t={:.3}; the rest fire on later ticks",
                    self.clock
                );
                break;
            }
            let at = at.max(self.clock);
            self.stats.integrate_queue(self.queue.len(), at - self.clock);
            self.clock = at;
            match kind {
                EventKind::Arrival => {
                    self.fire_arrival(at);
                    outcome.arrivals += 1;
                }
                EventKind::Departure => {
                    if let Some(finished) = self.fire_departure(at) {
                        outcome.departed.push(finished);
                    }
                }
            }
            fired += 1;
        }

        self.stats
            .integrate_queue(self.queue.len(), horizon - self.clock);
        self.clock = horizon;
    }

    fn fire_arrival(&mut self, now: f64) {
        let arrival_time = self.schedule.next_arrival();
        let service_duration = self.draw(RateKind::Service);
        let customer = Customer::new(self.next_customer_id, arrival_time, service_duration);
        self.next_customer_id += 1;
        trace!(
            "customer {} arrives at t={:.3} (service {:.3}s)",
            customer.id(),
            arrival_time,
            service_duration
        );

        if self.server.is_none() {
            self.begin_service(customer, now);
        } else {
            self.queue.push_back(customer);
            self.stats.observe_queue(self.queue.len());
        }

        let gap = self.draw(RateKind::Arrival);
        self.schedule.postpone_arrival(gap);
    }

    fn fire_departure(&mut self, now: f64) -> Option<Customer> {
        let Some(finished) = self.server.take() else {
            self.schedule.clear_departure();
            return None;
        };

        let arrival = finished.arrival_time();
        let started = finished.start_service_time().unwrap_or(arrival);
        self.stats
            .record(started - arrival, now - arrival, finished.service_duration());
        trace!(
            "customer {} departs at t={:.3} after waiting {:.3}s",
            finished.id(),
            now,
            started - arrival
        );

        match self.queue.pop_front() {
            Some(next) => self.begin_service(next, now),
            None => self.schedule.clear_departure(),
        }
        Some(finished)
    }

    fn begin_service(&mut self, mut customer: Customer, now: f64) {
        customer.begin_service(now);
        self.schedule
            .schedule_departure(now + customer.service_duration());
        self.server = Some(customer);
    }

    fn draw(&mut self, kind: RateKind) -> f64 {
        let rate = match kind {
            RateKind::Arrival => self.config.arrival_rate_per_min,
            RateKind::Service => self.config.service_rate_per_min,
        };
        draw_exponential(&mut self.rng, rate)
    }

    /// Clears all state and starts over with the given rates. Both rates are
    /// checked before anything is touched.
    pub fn reset(&mut self, arrival_rate_per_min: f64, service_rate_per_min: f64) -> Result<()> {
        validate_rate(RateKind::Arrival, arrival_rate_per_min)?;
        validate_rate(RateKind::Service, service_rate_per_min)?;

        self.config.arrival_rate_per_min = arrival_rate_per_min;
        self.config.service_rate_per_min = service_rate_per_min;
        self.clock = 0.0;
        self.queue.clear();
        self.server = None;
        self.stats = StatsAccumulator::default();
        self.history.clear();
        self.next_customer_id = 1;
        let first_arrival = self.draw(RateKind::Arrival);
        self.schedule = EventSchedule::new(first_arrival);

        debug!(
            "simulation reset: lambda={arrival_rate_per_min}/min mu={service_rate_per_min}/min, first arrival at t={first_arrival:.3}"
        );
        Ok(())
    }

    pub fn restart(&mut self) -> Result<()> {
        self.reset(
            self.config.arrival_rate_per_min,
            self.config.service_rate_per_min,
        )
    }

    /// Applies new parameters to future draws only; pending events keep their
    /// scheduled instants.
    pub fn reconfigure(&mut self, update: ConfigUpdate) -> Result<()> {
        update.validate()?;
        self.config.apply(&update);
        debug!("simulation reconfigured: {update:?}");
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            clock: self.clock,
            status: self.status(),
            queue: self.queue.iter().copied().collect(),
            server: self.server,
            next_arrival: self.schedule.next_arrival(),
            next_departure: self.next_departure(),
            customers_created: self.customers_created(),
            stats: self.stats.summarize(self.clock),
            history: self.history.samples().copied().collect(),
            config: self.config,
        }
    }
}
