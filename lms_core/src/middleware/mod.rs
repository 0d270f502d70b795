//! Middleware components for the HTTP server

pub mod logging;
