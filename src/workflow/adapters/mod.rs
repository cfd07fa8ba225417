//! Adapter implementations of the workflow ports.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
