//! Infrastructure - ports and the adapters that implement them.

pub mod clock;
pub mod config;
pub mod persistence;
pub mod ports;
