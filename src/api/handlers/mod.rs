//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod departments;
pub mod health;
pub mod jobs;
pub mod persons;
