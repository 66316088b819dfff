pub mod health;
pub mod helpers;
pub mod public;
pub mod tracking;

pub use health::{AppStartTime, HealthService, health_routes};
pub use public::{PublicService, public_routes};
pub use tracking::{TrackingService, tracking_routes};
