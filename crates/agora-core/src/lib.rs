//! # agora-core
//!
//! Primitives for the Agora peer-to-peer marketplace.
//!
//! This crate provides:
//!
//! - [`Amount`] — wei-denominated value with checked arithmetic
//! - [`AccountId`] — participant identity (base58-encoded Ed25519 public key)
//! - [`Keypair`] — identity generation and recovery

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod error;
pub mod identity;

pub use amount::Amount;
pub use error::CoreError;
pub use identity::{AccountId, Keypair};
