//! # dehydra-test
//!
//! Test doubles and fixtures for code built on `dehydra-core`.
//!
//! - [`store::MemoryStore`]: in-memory persistence that counts loads and saves
//! - [`authorization::DenyList`]: authorization denying reads of chosen documents
//! - [`fixtures`]: person / activity / deliverable resources wired to both
//! - [`assertions`]: JSON assertion helpers
//! - [`logging`]: tracing output for tests

pub mod assertions;
pub mod authorization;
pub mod fixtures;
pub mod logging;
pub mod store;

pub use assertions::*;
pub use authorization::DenyList;
pub use fixtures::{TestApi, test_api, wire};
pub use logging::init_test_logging;
pub use store::MemoryStore;
