//! Common utilities shared across the writers.

pub mod unit;
pub mod xml;
