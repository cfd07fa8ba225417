//! Unit tests for the workflow module.

mod service_failure_tests;
mod support;
