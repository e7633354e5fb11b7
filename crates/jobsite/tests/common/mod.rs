//! Shared test utilities for jobsite integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated test execution with temp directories
//! - Builders for legacy and current stored documents

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
