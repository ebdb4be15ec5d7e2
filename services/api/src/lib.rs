//! services/api/src/lib.rs
//!
//! Library half of the `api` service: configuration, errors, adapters and
//! the web layer, shared by the `api` and `openapi` binaries and the
//! integration tests.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
