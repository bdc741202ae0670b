//! # Core Infrastructure
//!
//! Shared building blocks used by the backend clients.

pub mod http_client;
