//! Fleet analytics and predictive maintenance.
//!
//! Each analyzer pulls raw records through [`FleetData`], derives its metrics
//! and returns a freshly built result from [`types`]. The higher-level
//! analyzers reuse [`prediction`] and [`efficiency`] rather than repeating
//! their rules.

pub mod aggregate;
pub mod alerts;
pub mod cost;
pub mod cost_per_student;
pub mod efficiency;
pub mod grade;
pub mod health;
pub mod optimization;
pub mod prediction;
pub mod types;
pub mod utility;

#[cfg(test)]
pub(crate) mod test_support;

use crate::clock::Clock;
use crate::config::AnalyticsConfig;
use crate::store::FleetData;

/// Dependencies shared by every analyzer for the duration of one call.
#[derive(Clone, Copy)]
pub struct AnalyticsContext<'a> {
    pub data: &'a dyn FleetData,
    pub clock: &'a dyn Clock,
    pub config: &'a AnalyticsConfig,
}

impl<'a> AnalyticsContext<'a> {
    pub fn new(data: &'a dyn FleetData, clock: &'a dyn Clock, config: &'a AnalyticsConfig) -> Self {
        Self {
            data,
            clock,
            config,
        }
    }
}
