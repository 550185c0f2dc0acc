//! Integration test crate for the Agora marketplace.
//!
//! This crate exists solely to run integration tests that span the Agora
//! crates. It has no public API - all functionality is in the test modules.

#![forbid(unsafe_code)]
