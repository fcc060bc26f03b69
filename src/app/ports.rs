//! Port traits — the boundary between node logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Node (domain)
//! ```
//!
//! Driven adapters (simulated sensors, LED banks, random sources, event
//! sinks) implement these traits.  Nodes receive them as trait objects
//! through [`NodeIo`](crate::nodes::station::NodeIo).

use crate::drivers::leds::Led;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: nodes call this to obtain calibrated readings.
pub trait SensorPort {
    /// Relative humidity, percent.
    fn sample_humidity(&mut self) -> u8;

    /// Temperature, degrees Celsius.
    fn sample_temperature(&mut self) -> i16;

    /// External light level, raw units.
    fn sample_light(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LEDs)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the three indicator LEDs of a node.
pub trait IndicatorPort {
    fn set_indicator(&mut self, led: Led, on: bool);

    fn is_on(&self, led: Led) -> bool;

    fn any_on(&self) -> bool {
        Led::ALL.into_iter().any(|led| self.is_on(led))
    }

    fn set_all(&mut self, on: bool) {
        for led in Led::ALL {
            self.set_indicator(led, on);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Entropy port (driven adapter: RNG → domain)
// ───────────────────────────────────────────────────────────────

/// Source of small random numbers for helper routines and radio loss.
pub trait EntropyPort {
    /// Uniform value in `0..bound`.  `bound` must be non-zero.
    fn below(&mut self, bound: u16) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → operator / logging)
// ───────────────────────────────────────────────────────────────

/// Nodes emit structured [`AppEvent`](super::events::AppEvent)s through
/// this port.  Adapters decide where they go (console log, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
