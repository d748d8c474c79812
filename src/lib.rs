//! Library crate for king-of-the-table, exposing modules for binaries and integration tests.

/// Application configuration loaded at startup.
pub mod config;
/// Storage-facing models and stats store backends.
pub mod dao;
/// HTTP request and response payloads.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Axum route trees.
pub mod routes;
/// Operations behind the routes.
pub mod services;
/// In-memory game state and the rotation engine.
pub mod state;
