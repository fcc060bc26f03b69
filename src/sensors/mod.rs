//! Sensor subsystem — sample processing and the simulated sensor bank.
//!
//! - [`ring`] — fixed-size rolling average of recent samples
//! - [`threshold`] — edge detection for threshold crossings
//! - [`sim`] — in-memory [`SensorPort`](crate::app::ports::SensorPort)

pub mod ring;
pub mod sim;
pub mod threshold;
