//! Simulated sensor bank.
//!
//! Every node samples from the same bank; the operator (or a test) sets
//! the readings directly.

use log::info;

use crate::app::ports::SensorPort;
use crate::config::SensorBaseline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimSensors {
    humidity: u8,
    temperature: i16,
    light: u16,
}

impl SimSensors {
    pub fn new(baseline: SensorBaseline) -> Self {
        Self {
            humidity: baseline.humidity.min(100),
            temperature: baseline.temperature,
            light: baseline.light,
        }
    }

    /// Clamped to 100 %.
    pub fn set_humidity(&mut self, humidity: u8) {
        self.humidity = humidity.min(100);
        info!("sensors: humidity set to {}%", self.humidity);
    }

    pub fn set_temperature(&mut self, celsius: i16) {
        self.temperature = celsius;
        info!("sensors: temperature set to {} C", celsius);
    }

    pub fn set_light(&mut self, light: u16) {
        self.light = light;
        info!("sensors: light set to {}", light);
    }
}

impl Default for SimSensors {
    fn default() -> Self {
        Self::new(SensorBaseline::default())
    }
}

impl SensorPort for SimSensors {
    fn sample_humidity(&mut self) -> u8 {
        self.humidity
    }

    fn sample_temperature(&mut self) -> i16 {
        self.temperature
    }

    fn sample_light(&mut self) -> u16 {
        self.light
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_follow_setters() {
        let mut sensors = SimSensors::default();
        sensors.set_humidity(150);
        sensors.set_temperature(-4);
        sensors.set_light(900);
        assert_eq!(sensors.sample_humidity(), 100);
        assert_eq!(sensors.sample_temperature(), -4);
        assert_eq!(sensors.sample_light(), 900);
    }
}
