//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter     | Implements    | Connects to                 |
//! |-------------|---------------|-----------------------------|
//! | `entropy`   | EntropyPort   | seeded `rand::rngs::StdRng` |
//! | `log_sink`  | EventSink     | `log` facade / console      |

pub mod entropy;
pub mod log_sink;
