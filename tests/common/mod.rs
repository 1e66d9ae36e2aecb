//! Common test utilities for eksforge CLI tests.
//!
//! - `TestEnv`: isolated project and home directories plus CLI runner
//! - Fixtures: reusable manifest and config content

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
