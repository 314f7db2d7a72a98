//! Property-based tests for the integer price helpers
//!
//! Tick alignment and square roots feed every quoted price, so they are
//! checked across randomized inputs rather than a handful of cases.
