use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Customer {
    id: u64,
    arrival_time: f64,
    service_duration: f64,
    start_service_time: Option<f64>,
}

impl Customer {
    pub(crate) fn new(id: u64, arrival_time: f64, service_duration: f64) -> Self {
        debug_assert!(service_duration > 0.0, "service duration must be positive");
        Self {
            id,
            arrival_time,
            service_duration,
            start_service_time: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    pub fn start_service_time(&self) -> Option<f64> {
        self.start_service_time
    }

    pub fn wait_time(&self) -> Option<f64> {
        self.start_service_time
            .map(|started| started - self.arrival_time)
    }

    pub(crate) fn begin_service(&mut self, at: f64) {
        debug_assert!(
            self.start_service_time.is_none(),
            "customer {} already started service",
            self.id
        );
        debug_assert!(at >= self.arrival_time, "service cannot start before arrival");
        self.start_service_time = Some(at);
    }
}
