//! Testing utilities for unit and integration tests
//!
//! Book builders, a sequenced feed that drives an [`Engine`](crate::engine::Engine),
//! and a fixture for calling a strategy without an engine.

pub mod helpers;

pub use helpers::*;
