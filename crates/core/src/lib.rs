//! Artisania Core - Domain types for the marketplace.
//!
//! This crate provides the types shared by the Artisania components:
//! - `api` - The REST API server
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. The order lifecycle (status transitions, pricing, order
//! numbers) lives here so it can be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, phones, money, statuses, and addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
