//! Trains a Fashion-MNIST classifier once per batch size and reports how each run did.

pub mod config;
pub mod fashion;
pub mod report;
pub mod sweep;
