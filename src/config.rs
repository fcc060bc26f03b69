//! Network configuration parameters
//!
//! All tunable parameters for the home network: radio behaviour, the
//! reliable-send retry policy, and per-node timing and thresholds.
//! Values can be overridden from a JSON file passed to the simulator.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Reliable-send retry policy shared by every node's link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Retransmissions after the first attempt before a send times out.
    pub max_retransmissions: u8,
    /// Time to wait for an ACK before retransmitting (milliseconds).
    pub retransmit_timeout_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_retransmissions: 5,
            retransmit_timeout_ms: 1000,
        }
    }
}

/// Behaviour of the shared radio medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// One-way frame latency (milliseconds).
    pub latency_ms: u32,
    /// Probability (0-100%) that a unicast data frame is lost.
    pub data_loss_percent: u8,
    /// Probability (0-100%) that an ACK frame is lost.
    pub ack_loss_percent: u8,
    /// Probability (0-100%) that a broadcast is lost, rolled per receiver.
    pub broadcast_loss_percent: u8,
}

impl RadioConfig {
    /// A medium that never drops frames.
    pub const fn lossless() -> Self {
        Self {
            latency_ms: 20,
            data_loss_percent: 0,
            ack_loss_percent: 0,
            broadcast_loss_percent: 0,
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            latency_ms: 20,
            data_loss_percent: 5,
            ack_loss_percent: 5,
            broadcast_loss_percent: 5,
        }
    }
}

/// Central dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralConfig {
    /// Inactivity window that closes a click sequence (milliseconds).
    pub click_window_ms: u32,
    /// Largest click count that maps to a command.
    pub max_clicks: u8,
}

impl Default for CentralConfig {
    fn default() -> Self {
        Self {
            click_window_ms: 4000,
            max_clicks: 5,
        }
    }
}

/// Gate or door satellite.
///
/// There is no single default: a partial JSON section is laid over the
/// gate or door profile of the field it is read into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatelliteConfig {
    /// Alarm blink period (milliseconds).
    pub alarm_blink_ms: u32,
    /// Interval between automatic-opening ticks (milliseconds).
    pub opening_tick_ms: u32,
    /// Total ticks of an automatic opening.
    pub opening_ticks: u8,
    /// First tick that blinks the blue LED (1-based).
    pub first_blink_tick: u8,
}

impl SatelliteConfig {
    /// Gate: eight ticks, every tick blinks.
    pub const fn gate() -> Self {
        Self {
            alarm_blink_ms: 2000,
            opening_tick_ms: 2000,
            opening_ticks: 8,
            first_blink_tick: 1,
        }
    }

    /// Door: waits for the gate, then blinks from tick 7 to tick 15.
    pub const fn door() -> Self {
        Self {
            alarm_blink_ms: 2000,
            opening_tick_ms: 2000,
            opening_ticks: 15,
            first_blink_tick: 7,
        }
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.alarm_blink_ms == 0 || self.opening_tick_ms == 0 {
            return Err(ConfigError(name));
        }
        if self.opening_ticks == 0
            || self.first_blink_tick == 0
            || self.first_blink_tick > self.opening_ticks
        {
            return Err(ConfigError(name));
        }
        Ok(())
    }
}

/// Fields present in a satellite section of the JSON file.
#[derive(Deserialize)]
struct SatelliteOverrides {
    alarm_blink_ms: Option<u32>,
    opening_tick_ms: Option<u32>,
    opening_ticks: Option<u8>,
    first_blink_tick: Option<u8>,
}

impl SatelliteOverrides {
    fn apply(self, base: SatelliteConfig) -> SatelliteConfig {
        SatelliteConfig {
            alarm_blink_ms: self.alarm_blink_ms.unwrap_or(base.alarm_blink_ms),
            opening_tick_ms: self.opening_tick_ms.unwrap_or(base.opening_tick_ms),
            opening_ticks: self.opening_ticks.unwrap_or(base.opening_ticks),
            first_blink_tick: self.first_blink_tick.unwrap_or(base.first_blink_tick),
        }
    }
}

fn gate_profile<'de, D: Deserializer<'de>>(de: D) -> Result<SatelliteConfig, D::Error> {
    SatelliteOverrides::deserialize(de).map(|o| o.apply(SatelliteConfig::gate()))
}

fn door_profile<'de, D: Deserializer<'de>>(de: D) -> Result<SatelliteConfig, D::Error> {
    SatelliteOverrides::deserialize(de).map(|o| o.apply(SatelliteConfig::door()))
}

/// Door temperature sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorSamplerConfig {
    /// Temperature sampling period (milliseconds).
    pub interval_ms: u32,
}

impl Default for DoorSamplerConfig {
    fn default() -> Self {
        Self { interval_ms: 10_000 }
    }
}

/// Bathroom humidity automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BathroomConfig {
    /// Humidity (%) above which the green LED turns on.
    pub lower_threshold: u8,
    /// Humidity (%) above which ventilation starts.
    pub upper_threshold: u8,
    /// Shower and ventilation step period (milliseconds).
    pub step_ms: u32,
    /// Shower step is `1..=max_increase + 1` percent.
    pub max_increase: u8,
    /// Ventilation step (percent).
    pub ventilation_decrease: u8,
}

impl Default for BathroomConfig {
    fn default() -> Self {
        Self {
            lower_threshold: 35,
            upper_threshold: 60,
            step_ms: 3000,
            max_increase: 5,
            ventilation_decrease: 7,
        }
    }
}

/// Kitchen fire detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitchenConfig {
    /// Temperature sampling period (milliseconds).
    pub sample_interval_ms: u32,
    /// Initial warning threshold (degrees).
    pub warning_threshold: u16,
    /// Largest simulated temperature jump armed by the button.
    pub max_jump: u16,
    /// Time the camera waits for a fire confirmation (milliseconds).
    pub camera_window_ms: u32,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 10_000,
            warning_threshold: 40,
            max_jump: 30,
            camera_window_ms: 4000,
        }
    }
}

/// Initial readings of the simulated sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorBaseline {
    pub humidity: u8,
    pub temperature: i16,
    pub light: u16,
}

impl Default for SensorBaseline {
    fn default() -> Self {
        Self {
            humidity: 30,
            temperature: 21,
            light: 420,
        }
    }
}

/// Real-time pacing for the simulator binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Wall-clock period of one clock tick (milliseconds).
    pub tick_ms: u32,
    /// Virtual milliseconds advanced per wall-clock millisecond.
    pub speed: u32,
    /// Seed for helper randomness and radio loss.
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            speed: 1,
            seed: 0x5eed,
        }
    }
}

/// Complete network configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub link: LinkConfig,
    pub radio: RadioConfig,
    pub central: CentralConfig,
    #[serde(default = "SatelliteConfig::gate", deserialize_with = "gate_profile")]
    pub gate: SatelliteConfig,
    #[serde(default = "SatelliteConfig::door", deserialize_with = "door_profile")]
    pub door: SatelliteConfig,
    pub door_sampler: DoorSamplerConfig,
    pub bathroom: BathroomConfig,
    pub kitchen: KitchenConfig,
    pub sensors: SensorBaseline,
    pub simulator: SimulatorConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            radio: RadioConfig::default(),
            central: CentralConfig::default(),
            gate: SatelliteConfig::gate(),
            door: SatelliteConfig::door(),
            door_sampler: DoorSamplerConfig::default(),
            bathroom: BathroomConfig::default(),
            kitchen: KitchenConfig::default(),
            sensors: SensorBaseline::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl NetworkConfig {
    /// Default timing on a radio that never drops frames.
    pub fn lossless() -> Self {
        Self {
            radio: RadioConfig::lossless(),
            ..Self::default()
        }
    }

    /// Check every field range.  Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let radio = &self.radio;
        if radio.latency_ms == 0 {
            return Err(ConfigError("radio.latency_ms"));
        }
        if radio.data_loss_percent > 100
            || radio.ack_loss_percent > 100
            || radio.broadcast_loss_percent > 100
        {
            return Err(ConfigError("radio loss percentages"));
        }
        // An ACK needs a full round trip before the retransmission timer fires.
        if u64::from(self.link.retransmit_timeout_ms) <= 2 * u64::from(radio.latency_ms) {
            return Err(ConfigError("link.retransmit_timeout_ms"));
        }
        if self.central.click_window_ms == 0 {
            return Err(ConfigError("central.click_window_ms"));
        }
        if !(1..=5).contains(&self.central.max_clicks) {
            return Err(ConfigError("central.max_clicks"));
        }
        self.gate.validate("gate")?;
        self.door.validate("door")?;
        if self.door_sampler.interval_ms == 0 {
            return Err(ConfigError("door_sampler.interval_ms"));
        }
        let bath = &self.bathroom;
        if bath.lower_threshold >= bath.upper_threshold || bath.upper_threshold > 100 {
            return Err(ConfigError("bathroom thresholds"));
        }
        if bath.step_ms == 0 || bath.ventilation_decrease == 0 {
            return Err(ConfigError("bathroom.step_ms"));
        }
        let kitchen = &self.kitchen;
        if kitchen.sample_interval_ms == 0 || kitchen.camera_window_ms == 0 {
            return Err(ConfigError("kitchen timing"));
        }
        if kitchen.warning_threshold == 0 {
            return Err(ConfigError("kitchen.warning_threshold"));
        }
        if self.simulator.tick_ms == 0 || self.simulator.speed == 0 {
            return Err(ConfigError("simulator pacing"));
        }
        Ok(())
    }
}
