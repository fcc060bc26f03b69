//! Node peripherals.

pub mod leds;
