//! Shared building blocks for the document database console.
//!
//! - `config`: environment-driven service configuration and the database skip-set
//! - `errors`: the unified `AppError` type and its HTTP mapping
//! - `middleware`: request id propagation
//! - `models`: DTOs shared between the explorer core and the HTTP layer
//! - `response`: the `ApiResponse` envelope
//! - `utils`: case-insensitive ordering and name validation

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;
