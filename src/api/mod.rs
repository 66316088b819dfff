//! HTTP API
//!
//! Public hub rendering, preview, visit/click tracking and health checks.

pub mod services;
