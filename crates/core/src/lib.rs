//! Storeloft Core - Shared types library.
//!
//! This crate provides common types used across all Storeloft components:
//! - `catalog` - Per-store catalog cache, resolution, and synchronization
//! - `integration-tests` - Multi-context scenarios
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no async, no storage access.
//! Every record that crosses the durable record store boundary or a
//! cross-context channel is defined here so all contexts agree on the wire
//! shape.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, currency, statuses, and the catalog data model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
