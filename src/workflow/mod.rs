//! Loan-origination workflow engine.
//!
//! Applications move through a fixed sequence of review stages, each owned
//! by one role. A user claims an application before acting on it, every
//! state change is written together with an audit entry, and concurrent
//! writers are resolved by conditional writes so that exactly one wins.
//! The module follows hexagonal architecture:
//!
//! - Domain types and the transition registry in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration and query services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
