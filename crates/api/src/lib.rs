//! HTTP API: routing, request gates, and response mapping.

pub mod app;
pub mod context;
pub mod cookies;
pub mod middleware;
