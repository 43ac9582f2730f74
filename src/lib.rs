//! Library crate for word-party-back, exposing modules for binaries and integration tests.

pub mod clock;
pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
