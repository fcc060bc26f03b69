//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the whole network on its
//! virtual clock against mock adapters.  No real radio or hardware is
//! involved.

mod bathroom_tests;
mod dispatcher_tests;
mod kitchen_tests;
mod mock_hw;
mod network_tests;
mod satellite_tests;
