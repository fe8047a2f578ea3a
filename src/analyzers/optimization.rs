//! Route and vehicle-assignment suggestions for one service day.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::analyzers::AnalyticsContext;
use crate::analyzers::efficiency::RouteEfficiencyCalculator;
use crate::analyzers::types::{
    Priority, RouteOptimizationSuggestion, SkippedItem, SuggestionReport, SuggestionType,
};
use crate::analyzers::utility::round2;
use crate::error::Result;
use crate::models::Route;

const EFFICIENCY_TARGET: f64 = 60.0;
const EFFICIENCY_CRITICAL: f64 = 40.0;
/// Share of the inefficient mileage assumed recoverable.
const RECOVERABLE_MILEAGE_SHARE: f64 = 0.3;
const MILES_PER_RIDER_LIMIT: f64 = 5.0;
const MILEAGE_SAVINGS_PER_MILE_PER_RIDER: f64 = 2.5;
const SAVINGS_PER_IDLE_VEHICLE: f64 = 25.0;

pub struct OptimizationAdvisor<'a> {
    ctx: AnalyticsContext<'a>,
}

impl<'a> OptimizationAdvisor<'a> {
    pub fn new(ctx: AnalyticsContext<'a>) -> Self {
        Self { ctx }
    }

    /// Suggestions for the routes run on `date`, ranked by priority and then
    /// by potential savings.
    #[tracing::instrument(skip(self))]
    pub fn suggest(&self, date: NaiveDate) -> Result<SuggestionReport> {
        let routes = self.ctx.data.routes_on(date)?;
        let calc = RouteEfficiencyCalculator::new(self.ctx.config);

        let mut report = SuggestionReport::default();

        for route in &routes {
            let metrics = match calc.efficiency(Some(route)) {
                Ok(Some(metrics)) => metrics,
                Ok(None) => continue,
                Err(e) => {
                    warn!(route_id = ?route.id, error = %e, "Skipping route in optimization pass");
                    report.skipped.push(SkippedItem {
                        id: route.id,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let score = metrics.efficiency_score;
            if score < EFFICIENCY_TARGET {
                let recoverable_miles =
                    metrics.total_miles * (100.0 - score) / 100.0 * RECOVERABLE_MILEAGE_SHARE;
                report.suggestions.push(RouteOptimizationSuggestion {
                    route_id: metrics.route_id,
                    route_name: metrics.route_name.clone(),
                    suggestion_type: SuggestionType::EfficiencyImprovement,
                    description: format!(
                        "Efficiency score {score:.1} is below {EFFICIENCY_TARGET:.0}; consolidate stops or rebalance riders"
                    ),
                    potential_savings: calc.fuel_cost(recoverable_miles),
                    priority: if score < EFFICIENCY_CRITICAL {
                        Priority::High
                    } else {
                        Priority::Medium
                    },
                });
            }

            if metrics.miles_per_rider > MILES_PER_RIDER_LIMIT {
                report.suggestions.push(RouteOptimizationSuggestion {
                    route_id: metrics.route_id,
                    route_name: metrics.route_name.clone(),
                    suggestion_type: SuggestionType::MileageReduction,
                    description: format!(
                        "{:.2} miles per rider exceeds {MILES_PER_RIDER_LIMIT:.1}; review the route path",
                        metrics.miles_per_rider
                    ),
                    potential_savings: round2(
                        metrics.miles_per_rider * MILEAGE_SAVINGS_PER_MILE_PER_RIDER,
                    ),
                    priority: Priority::Medium,
                });
            }
        }

        let single_use = single_use_vehicles(&routes);
        if single_use > 0 {
            report.suggestions.push(RouteOptimizationSuggestion {
                route_id: None,
                route_name: "Fleet".to_string(),
                suggestion_type: SuggestionType::VehicleUtilization,
                description: format!(
                    "{single_use} vehicle(s) ran a single leg on {date}; consider combining assignments"
                ),
                potential_savings: single_use as f64 * SAVINGS_PER_IDLE_VEHICLE,
                priority: Priority::Low,
            });
        }

        report.suggestions.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.potential_savings.total_cmp(&a.potential_savings))
        });

        info!(
            routes = routes.len(),
            suggestions = report.suggestions.len(),
            "Optimization pass complete"
        );

        Ok(report)
    }
}

/// Vehicles that appear exactly once across the day's legs. A vehicle that
/// runs both legs of the same route counts once.
fn single_use_vehicles(routes: &[Route]) -> usize {
    let mut usage: BTreeMap<i64, u32> = BTreeMap::new();

    for route in routes {
        if let Some(v) = route.am.vehicle_id {
            *usage.entry(v).or_default() += 1;
        }
        if let Some(v) = route.pm.vehicle_id.filter(|v| route.am.vehicle_id != Some(*v)) {
            *usage.entry(v).or_default() += 1;
        }
    }

    usage.values().filter(|&&count| count == 1).count()
}
