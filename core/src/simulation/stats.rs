use serde::Serialize;

use crate::variate::SECONDS_PER_MINUTE;

/// Running totals over departed customers plus the time-integrated queue length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatsAccumulator {
    total_served: u64,
    total_wait_time: f64,
    total_system_time: f64,
    busy_time: f64,
    queue_area: f64,
    peak_queue_length: usize,
}

impl StatsAccumulator {
    pub fn record(&mut self, wait: f64, sojourn: f64, service_duration: f64) {
        self.total_served += 1;
        self.total_wait_time += wait;
        self.total_system_time += sojourn;
        self.busy_time += service_duration;
    }

    pub(crate) fn integrate_queue(&mut self, queue_length: usize, elapsed: f64) {
        if elapsed > 0.0 {
            self.queue_area += queue_length as f64 * elapsed;
        }
    }

    pub(crate) fn observe_queue(&mut self, queue_length: usize) {
        self.peak_queue_length = self.peak_queue_length.max(queue_length);
    }

    pub fn total_served(&self) -> u64 {
        self.total_served
    }

    pub fn total_wait_time(&self) -> f64 {
        self.total_wait_time
    }

    pub fn total_system_time(&self) -> f64 {
        self.total_system_time
    }

    pub fn busy_time(&self) -> f64 {
        self.busy_time
    }

    pub fn peak_queue_length(&self) -> usize {
        self.peak_queue_length
    }

    pub fn average_wait(&self) -> f64 {
        if self.total_served == 0 {
            0.0
        } else {
            self.total_wait_time / self.total_served as f64
        }
    }

    pub fn average_sojourn(&self) -> f64 {
        if self.total_served == 0 {
            0.0
        } else {
            self.total_system_time / self.total_served as f64
        }
    }

    pub fn utilization(&self, clock: f64) -> f64 {
        if clock <= 0.0 {
            0.0
        } else {
            (self.busy_time / clock).clamp(0.0, 1.0)
        }
    }

    pub fn throughput_per_min(&self, clock: f64) -> f64 {
        if clock <= 0.0 {
            0.0
        } else {
            self.total_served as f64 / clock * SECONDS_PER_MINUTE
        }
    }

    pub fn average_queue_length(&self, clock: f64) -> f64 {
        if clock <= 0.0 {
            0.0
        } else {
            self.queue_area / clock
        }
    }

    pub fn summarize(&self, clock: f64) -> StatsSummary {
        StatsSummary {
            total_served: self.total_served,
            total_wait_time: self.total_wait_time,
            total_system_time: self.total_system_time,
            busy_time: self.busy_time,
            peak_queue_length: self.peak_queue_length,
            average_wait: self.average_wait(),
            average_sojourn: self.average_sojourn(),
            utilization: self.utilization(clock),
            throughput_per_min: self.throughput_per_min(clock),
            average_queue_length: self.average_queue_length(clock),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total_served: u64,
    pub total_wait_time: f64,
    pub total_system_time: f64,
    pub busy_time: f64,
    pub peak_queue_length: usize,
    pub average_wait: f64,
    pub average_sojourn: f64,
    pub utilization: f64,
    pub throughput_per_min: f64,
    pub average_queue_length: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_accumulator_reports_zeroes() {
        let stats = StatsAccumulator::default();
        let summary = stats.summarize(0.0);
        assert_eq!(summary.total_served, 0);
        assert_eq!(summary.average_wait, 0.0);
        assert_eq!(summary.average_sojourn, 0.0);
        assert_eq!(summary.utilization, 0.0);
        assert_eq!(summary.throughput_per_min, 0.0);
    }

    #[test]
    fn averages_follow_recorded_customers() {
        let mut stats = StatsAccumulator::default();
        stats.record(0.0, 12.0, 12.0);
        stats.record(6.0, 14.0, 8.0);
        assert_eq!(stats.total_served(), 2);
        assert!((stats.average_wait() - 3.0).abs() < 1e-12);
        assert!((stats.average_sojourn() - 13.0).abs() < 1e-12);
        assert!((stats.utilization(40.0) - 0.5).abs() < 1e-12);
        assert!((stats.throughput_per_min(60.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn queue_area_gives_time_average() {
        let mut stats = StatsAccumulator::default();
        stats.integrate_queue(2, 5.0);
        stats.integrate_queue(0, 5.0);
        stats.integrate_queue(7, -1.0);
        stats.observe_queue(3);
        stats.observe_queue(1);
        assert!((stats.average_queue_length(10.0) - 1.0).abs() < 1e-12);
        assert_eq!(stats.peak_queue_length(), 3);
    }
}
