//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no field I/O.

mod engine_tests;
mod gateway_tests;
mod mock_plant;
mod scenario_tests;
