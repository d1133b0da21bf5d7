//! Artisania marketplace API library.
//!
//! The binary in `main.rs` is a thin wrapper around [`app::router`]; keeping
//! everything in the library lets the integration tests drive the same
//! router without a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
