//! Kreditflow: a loan-origination workflow engine.
//!
//! Loan applications pass through a fixed sequence of review stages, each
//! owned by one role. Users claim an application before acting on it, every
//! transition is validated against a single registry of rules, and every
//! change is recorded in an append-only audit trail.
//!
//! # Architecture
//!
//! Kreditflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and user lookup
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`workflow`]: Status registry, claims, transitions, audit trail, queries
//! - [`api`]: JSON-over-HTTP surface
//! - [`config`]: Environment-driven configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod api;
pub mod config;
pub mod telemetry;
pub mod workflow;
