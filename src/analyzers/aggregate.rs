//! Day-by-day roll-ups of route efficiency per driver and across the fleet.
//!
//! Both roll-ups walk the period one day at a time, visiting at most
//! `min(days + 1, max_range_days)` days. The fleet summary also checks a
//! [`CancellationToken`] before each day and returns what it has so far once
//! the token fires.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::analyzers::AnalyticsContext;
use crate::analyzers::efficiency::RouteEfficiencyCalculator;
use crate::analyzers::grade::performance_rating;
use crate::analyzers::types::{
    DriverPerformanceMetrics, FleetAnalyticsSummary, RouteEfficiencyMetrics, SkippedItem,
};
use crate::analyzers::utility::{day_budget, mean, ratio, round2};
use crate::cancel::CancellationToken;
use crate::error::{Result, not_found};
use crate::models::Route;

const TOP_ROUTES: usize = 5;

pub struct FleetAggregator<'a> {
    ctx: AnalyticsContext<'a>,
}

impl<'a> FleetAggregator<'a> {
    pub fn new(ctx: AnalyticsContext<'a>) -> Self {
        Self { ctx }
    }

    /// Mileage, ridership and average route efficiency for the legs a driver
    /// ran between `start` and `end`.
    ///
    /// # Errors
    ///
    /// [`InvalidRange`](crate::AnalyticsError::InvalidRange) for an inverted
    /// or over-long period, [`NotFound`](crate::AnalyticsError::NotFound) for
    /// an unknown driver.
    #[tracing::instrument(skip(self))]
    pub fn driver_performance(
        &self,
        driver_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DriverPerformanceMetrics> {
        let days = day_budget(start, end, self.ctx.config.max_range_days)?;

        if driver_id <= 0 {
            return Err(not_found("driver", driver_id));
        }
        let driver = self
            .ctx
            .data
            .driver(driver_id)?
            .ok_or_else(|| not_found("driver", driver_id))?;

        let calc = RouteEfficiencyCalculator::new(self.ctx.config);
        let mut skipped = Vec::new();
        let mut scores = Vec::new();
        let mut total_routes = 0usize;
        let mut total_miles = 0.0;
        let mut total_riders = 0u64;
        let mut days_processed = 0usize;

        for day in start.iter_days().take(days) {
            let Some(routes) = self.routes_on(day, &mut skipped) else {
                continue;
            };
            days_processed += 1;

            for route in routes.iter().filter(|r| r.uses_driver(driver_id)) {
                total_routes += 1;
                let Some(metrics) = efficiency_or_skip(&calc, route, &mut skipped) else {
                    continue;
                };

                if route.am.driver_id == Some(driver_id) {
                    total_miles += metrics.am_total_miles;
                    total_riders += u64::from(metrics.am_riders);
                }
                if route.pm.driver_id == Some(driver_id) {
                    total_miles += metrics.pm_total_miles;
                    total_riders += u64::from(metrics.pm_riders);
                }
                scores.push(metrics.efficiency_score);
            }
        }

        let average_efficiency_score = round2(mean(&scores));

        info!(
            driver_id,
            days_processed,
            total_routes,
            average_efficiency_score,
            "Driver performance computed"
        );

        Ok(DriverPerformanceMetrics {
            driver_id,
            driver_name: driver.name,
            period_start: start,
            period_end: end,
            days_processed,
            total_routes,
            total_miles: round2(total_miles),
            total_riders,
            average_miles_per_route: round2(ratio(total_miles, total_routes as f64)),
            average_riders_per_route: round2(ratio(total_riders as f64, total_routes as f64)),
            average_efficiency_score,
            performance_rating: performance_rating(average_efficiency_score),
            skipped,
        })
    }

    /// Fleet-wide summary bounded by the configured timeout.
    pub fn fleet_summary(&self, start: NaiveDate, end: NaiveDate) -> Result<FleetAnalyticsSummary> {
        let token = CancellationToken::with_timeout(self.ctx.config.fleet_summary_timeout());
        self.fleet_summary_with_token(start, end, &token)
    }

    /// Fleet-wide summary that stops early, with partial totals, once `token`
    /// is cancelled.
    #[tracing::instrument(skip(self, token))]
    pub fn fleet_summary_with_token(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        token: &CancellationToken,
    ) -> Result<FleetAnalyticsSummary> {
        let days = day_budget(start, end, self.ctx.config.max_range_days)?;
        let vehicles = self.ctx.data.vehicles()?;

        let calc = RouteEfficiencyCalculator::new(self.ctx.config);
        let mut skipped = Vec::new();
        let mut metrics: Vec<RouteEfficiencyMetrics> = Vec::new();
        let mut vehicles_in_use = BTreeSet::new();
        let mut total_routes = 0usize;
        let mut days_processed = 0usize;
        let mut timed_out = false;

        for day in start.iter_days().take(days) {
            if token.is_cancelled() {
                warn!(%day, days_processed, "Fleet summary cancelled, returning partial results");
                timed_out = true;
                break;
            }

            let Some(routes) = self.routes_on(day, &mut skipped) else {
                continue;
            };
            days_processed += 1;

            for route in &routes {
                total_routes += 1;
                vehicles_in_use.extend(route.am.vehicle_id);
                vehicles_in_use.extend(route.pm.vehicle_id);

                if let Some(m) = efficiency_or_skip(&calc, route, &mut skipped) {
                    metrics.push(m);
                }
            }
        }

        let total_miles: f64 = metrics.iter().map(|m| m.total_miles).sum();
        let total_riders: u64 = metrics.iter().map(|m| u64::from(m.total_riders)).sum();
        let estimated_fuel_cost: f64 = metrics.iter().map(|m| m.estimated_fuel_cost).sum();
        let scores: Vec<f64> = metrics.iter().map(|m| m.efficiency_score).collect();

        let mut top_routes = metrics;
        top_routes.sort_by(|a, b| b.efficiency_score.total_cmp(&a.efficiency_score));
        top_routes.truncate(TOP_ROUTES);

        info!(
            days_processed,
            total_routes,
            timed_out,
            vehicles_in_use = vehicles_in_use.len(),
            "Fleet summary computed"
        );

        Ok(FleetAnalyticsSummary {
            period_start: start,
            period_end: end,
            days_processed,
            timed_out,
            total_routes,
            total_miles: round2(total_miles),
            total_riders,
            average_efficiency_score: round2(mean(&scores)),
            estimated_fuel_cost: round2(estimated_fuel_cost),
            total_vehicles: vehicles.len(),
            active_vehicles: vehicles.iter().filter(|v| v.is_active()).count(),
            out_of_service_vehicles: vehicles.iter().filter(|v| v.is_out_of_service()).count(),
            vehicles_in_use: vehicles_in_use.len(),
            vehicle_utilization_rate: ratio(vehicles_in_use.len() as f64, vehicles.len() as f64),
            top_routes,
            skipped,
        })
    }

    fn routes_on(&self, day: NaiveDate, skipped: &mut Vec<SkippedItem>) -> Option<Vec<Route>> {
        match self.ctx.data.routes_on(day) {
            Ok(routes) => Some(routes),
            Err(e) => {
                warn!(%day, error = %e, "Skipping day, routes unavailable");
                skipped.push(SkippedItem {
                    id: None,
                    reason: format!("routes for {day}: {e}"),
                });
                None
            }
        }
    }
}

pub(crate) fn efficiency_or_skip(
    calc: &RouteEfficiencyCalculator<'_>,
    route: &Route,
    skipped: &mut Vec<SkippedItem>,
) -> Option<RouteEfficiencyMetrics> {
    match calc.efficiency(Some(route)) {
        Ok(metrics) => metrics,
        Err(e) => {
            warn!(route_id = ?route.id, error = %e, "Skipping route");
            skipped.push(SkippedItem {
                id: route.id,
                reason: e.to_string(),
            });
            None
        }
    }
}
