//! linkhub - link-in-bio hub service
//!
//! A hub is one public page holding an ordered list of links plus a set
//! of rules. For each visitor the rules engine decides which links are
//! shown, in what order, and which are highlighted.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `engine`: Pure rule evaluation (conditions, actions, CTR boost)
//! - `storage`: Hub data source and visit/click counters
//! - `services`: Visitor resolution, rate limiting, tracking, hub service
//! - `api`: HTTP handlers
//! - `interfaces`: CLI commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
