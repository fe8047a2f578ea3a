//! Per-route mileage, ridership and efficiency metrics.

use anyhow::anyhow;
use tracing::debug;

use crate::analyzers::types::RouteEfficiencyMetrics;
use crate::analyzers::utility::round2;
use crate::config::AnalyticsConfig;
use crate::error::{Result, computation_failure};
use crate::models::{Route, RouteLeg};

const BASE_SCORE: f64 = 50.0;
const DENSITY_MULTIPLIER: f64 = 20.0;
const MAX_DENSITY_BONUS: f64 = 30.0;
const LONG_ROUTE_MILES: f64 = 50.0;
const SPARSE_ROUTE_RIDERS: u32 = 10;
const LONG_SPARSE_PENALTY: f64 = 20.0;

pub struct RouteEfficiencyCalculator<'a> {
    config: &'a AnalyticsConfig,
}

impl<'a> RouteEfficiencyCalculator<'a> {
    pub fn new(config: &'a AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Derives efficiency metrics for one route.
    ///
    /// Returns `Ok(None)` when there is no route, or when the route carries
    /// no id, no name, no assignment and no usable mileage on either leg.
    ///
    /// # Errors
    ///
    /// [`ComputationFailure`](crate::AnalyticsError::ComputationFailure) when
    /// a mileage reading is not a finite number.
    pub fn efficiency(&self, route: Option<&Route>) -> Result<Option<RouteEfficiencyMetrics>> {
        let Some(route) = route else {
            return Ok(None);
        };

        if !has_meaningful_data(route) {
            debug!(date = %route.date, "Route has no usable data, skipping");
            return Ok(None);
        }

        check_readings(route, "AM", &route.am)?;
        check_readings(route, "PM", &route.pm)?;

        let am_miles = route.am.miles();
        let pm_miles = route.pm.miles();
        let total_miles = am_miles + pm_miles;
        let total_riders = route
            .am
            .riders()
            .checked_add(route.pm.riders())
            .ok_or_else(|| {
                computation_failure(
                    format!("efficiency for {} on {}", route.display_name(), route.date),
                    anyhow!(
                        "rider count overflows: AM {} + PM {}",
                        route.am.riders(),
                        route.pm.riders()
                    ),
                )
            })?;

        let miles_per_rider = if total_riders > 0 {
            round2(total_miles / total_riders as f64)
        } else {
            0.0
        };

        let efficiency_score = if total_riders > 0 && total_miles > 0.0 {
            efficiency_score(total_miles, total_riders)
        } else {
            0.0
        };

        Ok(Some(RouteEfficiencyMetrics {
            route_id: route.id,
            route_name: route.display_name(),
            date: route.date,
            am_total_miles: am_miles,
            am_riders: route.am.riders(),
            am_vehicle_id: route.am.vehicle_id,
            am_driver_id: route.am.driver_id,
            pm_total_miles: pm_miles,
            pm_riders: route.pm.riders(),
            pm_vehicle_id: route.pm.vehicle_id,
            pm_driver_id: route.pm.driver_id,
            total_miles,
            total_riders,
            miles_per_rider,
            efficiency_score,
            estimated_fuel_cost: self.fuel_cost(total_miles),
        }))
    }

    /// Fuel spend for `miles` at the configured mileage and price.
    pub fn fuel_cost(&self, miles: f64) -> f64 {
        if miles <= 0.0 || self.config.miles_per_gallon <= 0.0 {
            return 0.0;
        }
        let gallons = miles / self.config.miles_per_gallon;
        round2(gallons * self.config.fuel_price_per_gallon)
    }
}

/// Rewards riders per mile and penalises long routes with few riders.
fn efficiency_score(total_miles: f64, total_riders: u32) -> f64 {
    let density = total_riders as f64 / total_miles.max(1.0);
    let bonus = (density * DENSITY_MULTIPLIER).min(MAX_DENSITY_BONUS);
    let penalty = if total_miles > LONG_ROUTE_MILES && total_riders < SPARSE_ROUTE_RIDERS {
        LONG_SPARSE_PENALTY
    } else {
        0.0
    };
    round2((BASE_SCORE + bonus - penalty).clamp(0.0, 100.0))
}

fn has_meaningful_data(route: &Route) -> bool {
    route.id.is_some()
        || route.name.as_deref().is_some_and(|n| !n.trim().is_empty())
        || route.am.has_assignment()
        || route.pm.has_assignment()
        || route.am.has_mileage()
        || route.pm.has_mileage()
}

fn check_readings(route: &Route, leg_name: &str, leg: &RouteLeg) -> Result<()> {
    for (field, value) in [("begin", leg.begin_miles), ("end", leg.end_miles)] {
        if let Some(v) = value.filter(|v| !v.is_finite()) {
            return Err(computation_failure(
                format!(
                    "efficiency for {} on {}",
                    route.display_name(),
                    route.date
                ),
                anyhow!("{leg_name} {field} mileage is {v}"),
            ));
        }
    }
    Ok(())
}
