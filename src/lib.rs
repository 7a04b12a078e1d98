//! Library crate for yobi-back, exposing modules for binaries and integration tests.

pub mod config;
/// Storage layer: entities, the `GameStore` trait and its backends.
pub mod dao;
/// HTTP payloads and their validation.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Axum routers.
pub mod routes;
pub mod services;
/// Shared application state.
pub mod state;
