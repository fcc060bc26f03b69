//! Application boundary: port traits and operator-visible events.
//!
//! ```text
//!   nodes ──▶ EventSink (AppEvent) ──▶ adapters
//!   nodes ◀── SensorPort / IndicatorPort / EntropyPort ◀── adapters
//! ```

pub mod events;
pub mod ports;
