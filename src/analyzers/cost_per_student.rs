//! Transportation cost per student-day.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::analyzers::AnalyticsContext;
use crate::analyzers::aggregate::efficiency_or_skip;
use crate::analyzers::efficiency::RouteEfficiencyCalculator;
use crate::analyzers::types::{CostPerStudentMetrics, SkippedItem};
use crate::analyzers::utility::{day_budget, ratio, round2};
use crate::error::Result;
use crate::models::{Activity, Route};

const DRIVER_LEGS_PER_ROUTE: f64 = 2.0;
const ACTIVITY_DRIVER_STIPEND: f64 = 50.0;

/// Activity trips carry no measured mileage or headcount, so each kind is
/// costed from fixed estimates: (miles per trip, students per trip).
const SPORTS_TRIP: (f64, u64) = (50.0, 20);
const FIELD_TRIP: (f64, u64) = (75.0, 25);

pub struct CostPerStudentCalculator<'a> {
    ctx: AnalyticsContext<'a>,
}

impl<'a> CostPerStudentCalculator<'a> {
    pub fn new(ctx: AnalyticsContext<'a>) -> Self {
        Self { ctx }
    }

    #[tracing::instrument(skip(self))]
    pub fn cost_per_student(&self, start: NaiveDate, end: NaiveDate) -> Result<CostPerStudentMetrics> {
        let days = day_budget(start, end, self.ctx.config.max_range_days)?;
        let calc = RouteEfficiencyCalculator::new(self.ctx.config);
        let per_mile = self.ctx.config.maintenance_cost_per_mile;

        let mut route_cost = 0.0;
        let mut route_student_days = 0u64;
        let mut activity_trips = 0usize;
        let mut activity_cost = 0.0;
        let mut activity_student_days = 0u64;
        let mut days_processed = 0usize;
        let mut skipped = Vec::new();

        for day in start.iter_days().take(days) {
            let Some((routes, activities)) = self.day_records(day, &mut skipped) else {
                continue;
            };
            days_processed += 1;

            for route in &routes {
                let Some(metrics) = efficiency_or_skip(&calc, route, &mut skipped) else {
                    continue;
                };
                route_cost += metrics.estimated_fuel_cost
                    + metrics.total_miles * per_mile
                    + DRIVER_LEGS_PER_ROUTE * self.ctx.config.driver_cost_per_leg;
                route_student_days += u64::from(metrics.total_riders);
            }

            for (miles, students) in activities.iter().filter_map(trip_estimate) {
                activity_trips += 1;
                activity_cost += calc.fuel_cost(miles) + miles * per_mile + ACTIVITY_DRIVER_STIPEND;
                activity_student_days += students;
            }
        }

        let total_cost = route_cost + activity_cost;
        let total_student_days = route_student_days + activity_student_days;

        info!(days_processed, total_cost, total_student_days, "Cost per student computed");

        Ok(CostPerStudentMetrics {
            period_start: start,
            period_end: end,
            days_processed,
            route_cost: round2(route_cost),
            route_student_days,
            route_cost_per_student: round2(ratio(route_cost, route_student_days as f64)),
            activity_trips,
            activity_cost: round2(activity_cost),
            activity_student_days,
            activity_cost_per_student: round2(ratio(activity_cost, activity_student_days as f64)),
            total_cost: round2(total_cost),
            total_student_days,
            cost_per_student: round2(ratio(total_cost, total_student_days as f64)),
            skipped,
        })
    }

    /// Routes and activities for `day`, or `None` with a skip entry when
    /// either read fails.
    fn day_records(
        &self,
        day: NaiveDate,
        skipped: &mut Vec<SkippedItem>,
    ) -> Option<(Vec<Route>, Vec<Activity>)> {
        let records = self
            .ctx
            .data
            .routes_on(day)
            .map_err(|e| ("routes", e))
            .and_then(|routes| {
                let activities = self.ctx.data.activities_on(day).map_err(|e| ("activities", e))?;
                Ok((routes, activities))
            });

        match records {
            Ok(records) => Some(records),
            Err((what, e)) => {
                warn!(%day, error = %e, "Skipping day, {what} unavailable");
                skipped.push(SkippedItem {
                    id: None,
                    reason: format!("{what} for {day}: {e}"),
                });
                None
            }
        }
    }
}

fn trip_estimate(activity: &Activity) -> Option<(f64, u64)> {
    if activity.type_contains("Sports") {
        Some(SPORTS_TRIP)
    } else if activity.type_contains("Field") || activity.type_contains("Trip") {
        Some(FIELD_TRIP)
    } else {
        None
    }
}
