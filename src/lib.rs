//! HomeNet library.
//!
//! A central dispatcher and four satellites (gate, door, kitchen,
//! bathroom) modelled as cooperative event-driven nodes on a shared
//! lossy radio.  Everything runs on a virtual millisecond clock so the
//! whole network can be driven deterministically from tests, and in real
//! time from the `homenet-sim` binary.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod network;
pub mod nodes;
pub mod operator;
pub mod scheduler;
pub mod sensors;
pub mod transport;

pub use config::NetworkConfig;
pub use error::{Error, Result};
pub use network::Network;
