//! Browser bindings: JavaScript drives [`BankSimulation::tick`] from
//! `requestAnimationFrame` and renders the returned snapshot.

use bankqueue_core::{ConfigUpdate, Driver, SimulationConfig, SimulationError, theory};
use thiserror::Error;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    Ok(())
}

#[wasm_bindgen]
pub struct BankSimulation {
    driver: Driver,
}

#[wasm_bindgen]
impl BankSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(
        arrival_rate_per_min: f64,
        service_rate_per_min: f64,
        speed_multiplier: f64,
    ) -> Result<BankSimulation, JsValue> {
        Self::build(arrival_rate_per_min, service_rate_per_min, speed_multiplier).map_err(to_js)
    }

    /// Advances by the time since the previous frame and returns the snapshot
    /// as a plain JS object.
    pub fn tick(&mut self, timestamp: f64) -> Result<JsValue, JsValue> {
        let json = self.tick_json(timestamp).map_err(to_js)?;
        js_sys::JSON::parse(&json)
    }

    pub fn start(&mut self) {
        self.driver.start();
    }

    pub fn pause(&mut self) {
        self.driver.pause();
    }

    /// Returns `true` when the simulation is running afterwards.
    pub fn toggle(&mut self) -> bool {
        self.driver.toggle();
        self.driver.is_running()
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.driver.reset().map_err(|e| to_js(e.into()))
    }

    pub fn set_arrival_rate(&mut self, per_minute: f64) -> Result<(), JsValue> {
        self.apply(ConfigUpdate::arrival_rate(per_minute))
            .map_err(to_js)
    }

    pub fn set_service_rate(&mut self, per_minute: f64) -> Result<(), JsValue> {
        self.apply(ConfigUpdate::service_rate(per_minute))
            .map_err(to_js)
    }

    pub fn set_speed(&mut self, multiplier: f64) -> Result<(), JsValue> {
        self.apply(ConfigUpdate::speed(multiplier)).map_err(to_js)
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.snapshot_string().map_err(to_js)
    }

    pub fn theory_json(&self) -> Result<String, JsValue> {
        self.theory_string().map_err(to_js)
    }
}

impl BankSimulation {
    fn build(
        arrival_rate_per_min: f64,
        service_rate_per_min: f64,
        speed_multiplier: f64,
    ) -> Result<Self, BindingError> {
        let config = SimulationConfig::new(arrival_rate_per_min, service_rate_per_min)?
            .with_speed(speed_multiplier)?;
        Ok(Self {
            driver: Driver::from_config(config)?,
        })
    }

    fn apply(&mut self, update: ConfigUpdate) -> Result<(), BindingError> {
        self.driver.reconfigure(update)?;
        Ok(())
    }

    fn tick_json(&mut self, timestamp: f64) -> Result<String, BindingError> {
        let snapshot = self.driver.tick(timestamp)?;
        Ok(snapshot.to_json()?)
    }

    fn snapshot_string(&self) -> Result<String, BindingError> {
        Ok(self.driver.snapshot().to_json()?)
    }

    fn theory_string(&self) -> Result<String, BindingError> {
        let config = self.driver.simulation().config();
        let projection = theory::project(config.arrival_rate_per_min, config.service_rate_per_min)?;
        Ok(serde_json::to_string(&projection)?)
    }
}

/// Keeps failures out of `JsValue` until they cross the boundary.
#[derive(Debug, Error)]
enum BindingError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

fn to_js(error: BindingError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(BankSimulation::build(0.0, 5.0, 1.0).is_err());
        assert!(BankSimulation::build(4.0, f64::NAN, 1.0).is_err());
        assert!(BankSimulation::build(4.0, 5.0, 0.0).is_err());
    }

    #[test]
    fn binding_errors_keep_the_engine_message() {
        let Err(error) = BankSimulation::build(4.0, 5.0, -2.0) else {
            panic!("negative speed must be rejected");
        };
        assert!(matches!(
            error,
            BindingError::Simulation(SimulationError::InvalidSpeed(_))
        ));
        assert_eq!(
            error.to_string(),
            SimulationError::InvalidSpeed(-2.0).to_string()
        );
    }

    #[test]
    fn ticks_produce_snapshot_json() {
        let mut simulation = BankSimulation::build(4.0, 5.0, 20.0).unwrap();
        simulation.start();
        simulation.tick_json(0.0).unwrap();
        let json = simulation.tick_json(200.0).unwrap();

        let value: Value = serde_json::from_str(&json).unwrap();
        assert!((value["clock"].as_f64().unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(value["config"]["speed_multiplier"], 20.0);
        assert!(value["queue"].is_array());
    }

    #[test]
    fn toggling_and_reset() {
        let mut simulation = BankSimulation::build(4.0, 5.0, 1.0).unwrap();
        assert!(!simulation.is_running());
        assert!(simulation.toggle());
        simulation.tick_json(0.0).unwrap();
        simulation.tick_json(100.0).unwrap();
        assert!(simulation.driver.simulation().clock() > 0.0);

        simulation.driver.reset().unwrap();
        assert!(!simulation.is_running());
        assert_eq!(simulation.driver.simulation().clock(), 0.0);
    }

    #[test]
    fn theory_reports_instability() {
        let mut simulation = BankSimulation::build(4.0, 5.0, 1.0).unwrap();
        let stable: Value = serde_json::from_str(&simulation.theory_string().unwrap()).unwrap();
        assert_eq!(stable["stable"], true);

        simulation.apply(ConfigUpdate::arrival_rate(6.0)).unwrap();
        let unstable: Value = serde_json::from_str(&simulation.theory_string().unwrap()).unwrap();
        assert_eq!(unstable["stable"], false);
        assert!(unstable["steady_state"].is_null());
        assert!(simulation.apply(ConfigUpdate::service_rate(-1.0)).is_err());
    }
}
