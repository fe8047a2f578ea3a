//! Maintenance cost breakdown and trend over a period.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;

use crate::analyzers::AnalyticsContext;
use crate::analyzers::prediction::MaintenancePredictor;
use crate::analyzers::types::{CostTrend, MaintenanceCostAnalysis};
use crate::analyzers::utility::{ratio, round2};
use crate::error::{AnalyticsError, Result};
use crate::models::MaintenanceRecord;

/// Half-over-half cost change beyond which the trend counts as moving.
const TREND_THRESHOLD: f64 = 500.0;

pub struct CostAnalyzer<'a> {
    ctx: AnalyticsContext<'a>,
}

impl<'a> CostAnalyzer<'a> {
    pub fn new(ctx: AnalyticsContext<'a>) -> Self {
        Self { ctx }
    }

    /// Aggregates maintenance spending for a vehicle over `[start, end]`.
    ///
    /// # Errors
    ///
    /// [`NotFound`](AnalyticsError::NotFound) for an unknown vehicle and
    /// [`InvalidRange`](AnalyticsError::InvalidRange) when `start > end`.
    #[tracing::instrument(skip(self))]
    pub fn analyze(
        &self,
        vehicle_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MaintenanceCostAnalysis> {
        if start > end {
            return Err(AnalyticsError::InvalidRange {
                start,
                end,
                reason: "start is after end".to_string(),
            });
        }

        let vehicle = MaintenancePredictor::new(self.ctx).find_vehicle(vehicle_id)?;

        let mut records: Vec<MaintenanceRecord> = self
            .ctx
            .data
            .maintenance_for_vehicle(vehicle.id)?
            .into_iter()
            .filter(|r| r.date.is_some_and(|d| d >= start && d <= end))
            .collect();
        records.sort_by_key(|r| r.date);

        let total_cost: f64 = records.iter().map(cost_of).sum();
        let service_count = records.len();

        let mut cost_by_category = BTreeMap::new();
        let mut cost_by_month = BTreeMap::new();
        for record in &records {
            *cost_by_category.entry(category_of(record)).or_insert(0.0) += cost_of(record);
            *cost_by_month.entry(month_key(record.date)).or_insert(0.0) += cost_of(record);
        }

        debug!(vehicle_id, service_count, total_cost, "Cost analysis computed");

        Ok(MaintenanceCostAnalysis {
            vehicle_id: vehicle.id,
            period_start: start,
            period_end: end,
            total_cost: round2(total_cost),
            average_cost: round2(ratio(total_cost, service_count as f64)),
            service_count,
            cost_by_category,
            cost_by_month,
            projected_annual_cost: round2(projected_annual_cost(&records, total_cost)),
            cost_trend: cost_trend(&records),
        })
    }
}

fn cost_of(record: &MaintenanceRecord) -> f64 {
    record.repair_cost.unwrap_or(0.0)
}

fn category_of(record: &MaintenanceRecord) -> String {
    match record.maintenance_type.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => "Other".to_string(),
    }
}

/// `YYYY-MM`; undated records land in `0000-00`.
fn month_key(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{:04}-{:02}", d.year(), d.month()),
        None => "0000-00".to_string(),
    }
}

/// Scales the observed spend to a 365-day year over the span between the
/// first and last record. A single record, or records on one day, are taken
/// to represent a full year.
fn projected_annual_cost(sorted: &[MaintenanceRecord], total_cost: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let first = sorted.first().and_then(|r| r.date);
    let last = sorted.last().and_then(|r| r.date);
    let span_days = match (first, last) {
        (Some(first), Some(last)) if sorted.len() > 1 => (last - first).num_days(),
        _ => 365,
    };

    let span_days = if span_days <= 0 { 365 } else { span_days };
    total_cost / span_days as f64 * 365.0
}

fn cost_trend(sorted: &[MaintenanceRecord]) -> CostTrend {
    if sorted.len() < 2 {
        return CostTrend::InsufficientData;
    }

    let (first_half, second_half) = sorted.split_at(sorted.len() / 2);
    let first: f64 = first_half.iter().map(cost_of).sum();
    let second: f64 = second_half.iter().map(cost_of).sum();

    match second - first {
        diff if diff > TREND_THRESHOLD => CostTrend::Increasing,
        diff if diff < -TREND_THRESHOLD => CostTrend::Decreasing,
        _ => CostTrend::Stable,
    }
}
