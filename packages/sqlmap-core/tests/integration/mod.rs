//! Integration test suite.
//!
//! Exercises the public API end to end:
//! 1. Statement compilation through the engine
//! 2. Record encoding and row decoding
//! 3. Configuration loading

pub mod compile_tests;
pub mod config_tests;
pub mod helpers;
pub mod record_tests;
