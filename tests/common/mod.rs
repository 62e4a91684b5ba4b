//! Shared test utilities for logship integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. The in-memory fakes are deterministic under
//! `tokio::time::pause()`; the HTTP fakes bind a random port on 127.0.0.1.

pub mod assertions;
pub mod fake_opensearch;
pub mod fakes;
pub mod fixtures;

pub use builders::*;
pub use fakes::*;
pub use fixtures::*;
