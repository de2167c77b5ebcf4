//! restqa workspace-level test utilities.
//!
//! This crate exists solely to support workspace-level integration tests,
//! particularly the BDD/cucumber tests in `tests/cucumber.rs`.
//!
//! The actual restqa functionality is in the workspace member crates:
//! - `restqa-types`: project descriptor, init answers, CI flavors
//! - `restqa-error`: shared error type and its transport classification
//! - `restqa-adapters`: config, feature, preferences and curl adapters
//! - `restqa-app`: project service, init use case, CI templates, tips
//! - `restqa-server`: dashboard HTTP API
//! - `restqa` (restqa-cli): CLI interface
