//! Service layer
//!
//! Business logic shared by the HTTP API and the CLI: visitor resolution
//! (device, country), rate limiting, tracking and hub evaluation.

pub mod device;
pub mod geoip;
mod hub_service;
mod rate_limiter;
mod tracking;

pub use device::DeviceDetector;
pub use geoip::{GeoInfo, GeoIpLookup, GeoIpProvider};
pub use hub_service::{HubPreview, HubService, PublicHub, PublicLink, VisitorInfo};
pub use rate_limiter::{RateLimitDecision, VisitorRateLimiter};
pub use tracking::{TrackOutcome, VisitTracker};
