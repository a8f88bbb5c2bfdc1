//! Common test utilities for audio-dl integration tests

#[allow(dead_code)]
pub mod fakes;

#[allow(unused_imports)]
pub use fakes::*;
