pub mod analyzers;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod output;
pub mod store;

pub use engine::FleetAnalytics;
pub use error::{AnalyticsError, Result};
