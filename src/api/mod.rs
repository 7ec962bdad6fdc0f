//! HTTP API layer: handlers, middleware, DTOs and routing.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
mod doc;

pub use routes::{RouterOptions, create_router};
