//! Composite vehicle health score.

use chrono::{Datelike, Days};
use tracing::{debug, warn};

use crate::analyzers::AnalyticsContext;
use crate::analyzers::grade::{age_score, cost_efficiency_score, health_status, mileage_score};
use crate::analyzers::prediction::MaintenancePredictor;
use crate::analyzers::types::{HealthSweep, SkippedItem, VehicleHealthScore};
use crate::analyzers::utility::mean;
use crate::error::Result;
use crate::models::{MaintenanceRecord, Vehicle};

/// Component weights in percent: compliance, age, mileage, reliability,
/// cost efficiency.
const WEIGHTS: [f64; 5] = [25.0, 15.0, 20.0, 30.0, 10.0];

const NEUTRAL_COMPLIANCE: f64 = 50.0;
const NEUTRAL_RELIABILITY: f64 = 70.0;
const NEUTRAL_COST_EFFICIENCY: f64 = 70.0;

const BREAKDOWN_KEYWORDS: &[&str] = &["breakdown", "emergency", "tow", "failure"];

pub struct HealthScorer<'a> {
    ctx: AnalyticsContext<'a>,
}

impl<'a> HealthScorer<'a> {
    pub fn new(ctx: AnalyticsContext<'a>) -> Self {
        Self { ctx }
    }

    #[tracing::instrument(skip(self))]
    pub fn score(&self, vehicle_id: i64) -> Result<VehicleHealthScore> {
        let vehicle = MaintenancePredictor::new(self.ctx).find_vehicle(vehicle_id)?;
        self.score_for(&vehicle)
    }

    pub fn score_for(&self, vehicle: &Vehicle) -> Result<VehicleHealthScore> {
        let today = self.ctx.clock.today();
        let records = self.ctx.data.maintenance_for_vehicle(vehicle.id)?;
        let mileage = MaintenancePredictor::new(self.ctx).current_mileage(vehicle.id)?;

        let cutoff = today - Days::new(365);
        let recent: Vec<&MaintenanceRecord> = records
            .iter()
            .filter(|r| r.date.is_some_and(|d| d >= cutoff))
            .collect();

        let compliance = if records.is_empty() {
            NEUTRAL_COMPLIANCE
        } else {
            (recent.len() as f64 * 25.0).clamp(10.0, 100.0)
        };
        let age = age_score(today.year() - vehicle.manufacture_year);
        let mileage_component = mileage_score(mileage);
        let reliability = reliability_score(&recent);
        let cost_efficiency = cost_score(&recent);

        let components = [compliance, age, mileage_component, reliability, cost_efficiency];
        let weighted: f64 = components.iter().zip(WEIGHTS).map(|(s, w)| s * w).sum();
        let overall = (weighted / 100.0).round().clamp(0.0, 100.0);

        let mut recommendations = Vec::new();
        if compliance < 60.0 {
            recommendations.push("Increase preventive maintenance frequency".to_string());
        }
        if reliability < 70.0 {
            recommendations.push("Address recurring issues".to_string());
        }
        if cost_efficiency < 60.0 {
            recommendations.push("Review maintenance costs and service providers".to_string());
        }
        if overall < 50.0 {
            recommendations.push("Consider replacement evaluation".to_string());
        }

        debug!(vehicle_id = vehicle.id, overall, recent = recent.len(), "Health scored");

        Ok(VehicleHealthScore {
            vehicle_id: vehicle.id,
            maintenance_compliance_score: compliance,
            age_score: age,
            mileage_score: mileage_component,
            reliability_score: reliability,
            cost_efficiency_score: cost_efficiency,
            overall_score: overall,
            health_status: health_status(overall),
            recommendations,
        })
    }

    /// Scores every vehicle, worst first. Vehicles that fail are reported in
    /// `skipped`.
    #[tracing::instrument(skip(self))]
    pub fn score_fleet(&self) -> Result<HealthSweep> {
        let mut sweep = HealthSweep::default();

        for vehicle in self.ctx.data.vehicles()? {
            match self.score_for(&vehicle) {
                Ok(score) => sweep.scores.push(score),
                Err(e) => {
                    warn!(vehicle_id = vehicle.id, error = %e, "Skipping vehicle in health sweep");
                    sweep.skipped.push(SkippedItem {
                        id: Some(vehicle.id),
                        reason: e.to_string(),
                    });
                }
            }
        }

        sweep
            .scores
            .sort_by(|a, b| a.overall_score.total_cmp(&b.overall_score));
        Ok(sweep)
    }
}

fn reliability_score(recent: &[&MaintenanceRecord]) -> f64 {
    if recent.is_empty() {
        return NEUTRAL_RELIABILITY;
    }

    let breakdowns = recent
        .iter()
        .filter(|r| BREAKDOWN_KEYWORDS.iter().any(|k| r.notes_contain(k)))
        .count();

    ((1.0 - breakdowns as f64 / recent.len() as f64) * 100.0).round()
}

fn cost_score(recent: &[&MaintenanceRecord]) -> f64 {
    let costs: Vec<f64> = recent.iter().filter_map(|r| r.repair_cost).collect();
    if costs.is_empty() {
        return NEUTRAL_COST_EFFICIENCY;
    }
    cost_efficiency_score(mean(&costs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::*;
    use crate::analyzers::types::HealthStatus;
    use crate::error::AnalyticsError;
    use crate::store::InMemoryStore;

    fn score(store: &InMemoryStore, vehicle_id: i64) -> Result<VehicleHealthScore> {
        let clock = clock();
        let config = config();
        HealthScorer::new(AnalyticsContext::new(store, &clock, &config)).score(vehicle_id)
    }

    #[test]
    fn test_new_vehicle_without_history() {
        let store = InMemoryStore::new().with_vehicle(vehicle(1, 2026));

        let health = score(&store, 1).unwrap();

        assert_eq!(health.age_score, 100.0);
        assert_eq!(health.mileage_score, 100.0);
        assert_eq!(health.maintenance_compliance_score, 50.0);
        assert_eq!(health.reliability_score, 70.0);
        assert_eq!(health.cost_efficiency_score, 70.0);
        assert_eq!(health.overall_score, 76.0);
        assert_eq!(health.health_status, HealthStatus::Good);
        assert_eq!(
            health.recommendations,
            vec!["Increase preventive maintenance frequency".to_string()]
        );
    }

    #[test]
    fn test_compliance_counts_trailing_year_only() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2020))
            .with_maintenance(maintenance(1, days_ago(30), "Oil Change", None, None))
            .with_maintenance(maintenance(1, days_ago(90), "Tire", None, None))
            .with_maintenance(maintenance(1, days_ago(200), "Brake", None, None))
            .with_maintenance(maintenance(1, days_ago(500), "Brake", None, None));

        let health = score(&store, 1).unwrap();
        assert_eq!(health.maintenance_compliance_score, 75.0);
    }

    #[test]
    fn test_compliance_floor_with_only_old_history() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2020))
            .with_maintenance(maintenance(1, days_ago(800), "Oil Change", None, None));

        let health = score(&store, 1).unwrap();
        assert_eq!(health.maintenance_compliance_score, 10.0);
        assert_eq!(health.reliability_score, 70.0);
    }

    #[test]
    fn test_reliability_counts_breakdown_notes() {
        let mut towed = maintenance(1, days_ago(20), "Repair", None, None);
        towed.notes = Some("Bus TOWED after roadside stop".to_string());

        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2020))
            .with_maintenance(towed)
            .with_maintenance(maintenance(1, days_ago(40), "Oil Change", None, None))
            .with_maintenance(maintenance(1, days_ago(60), "Tire", None, None))
            .with_maintenance(maintenance(1, days_ago(80), "Brake", None, None));

        let health = score(&store, 1).unwrap();
        assert_eq!(health.reliability_score, 75.0);
    }

    #[test]
    fn test_cost_efficiency_ignores_missing_costs() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2020))
            .with_maintenance(maintenance(1, days_ago(20), "Repair", None, Some(400.0)))
            .with_maintenance(maintenance(1, days_ago(40), "Repair", None, Some(800.0)))
            .with_maintenance(maintenance(1, days_ago(60), "Inspection", None, None));

        let health = score(&store, 1).unwrap();
        assert_eq!(health.cost_efficiency_score, 70.0);
    }

    #[test]
    fn test_worn_vehicle_gets_every_recommendation() {
        let mut breakdown = maintenance(1, days_ago(15), "Engine", None, Some(3_000.0));
        breakdown.notes = Some("Engine failure on route".to_string());

        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2000))
            .with_maintenance(breakdown)
            .with_fuel(fuel(1, today(), 350_000.0));

        let health = score(&store, 1).unwrap();

        assert_eq!(health.age_score, 20.0);
        assert_eq!(health.mileage_score, 25.0);
        assert_eq!(health.reliability_score, 0.0);
        assert_eq!(health.cost_efficiency_score, 30.0);
        assert_eq!(health.overall_score, 17.0);
        assert_eq!(health.health_status, HealthStatus::Critical);
        assert_eq!(health.recommendations.len(), 4);
        assert_eq!(health.recommendations[3], "Consider replacement evaluation");
    }

    #[test]
    fn test_overall_stays_in_bounds() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2025))
            .with_maintenance(maintenance(1, days_ago(10), "Oil Change", None, Some(50.0)))
            .with_maintenance(maintenance(1, days_ago(40), "Oil Change", None, Some(50.0)))
            .with_maintenance(maintenance(1, days_ago(70), "Oil Change", None, Some(50.0)))
            .with_maintenance(maintenance(1, days_ago(100), "Oil Change", None, Some(50.0)));

        let health = score(&store, 1).unwrap();
        assert_eq!(health.overall_score, 100.0);
        assert_eq!(health.health_status, HealthStatus::Excellent);
        assert!(health.recommendations.is_empty());
    }

    #[test]
    fn test_unknown_vehicle_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(score(&store, 5), Err(AnalyticsError::NotFound { .. })));
    }

    #[test]
    fn test_score_fleet_orders_worst_first() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2026))
            .with_vehicle(vehicle(2, 1998))
            .with_fuel(fuel(2, today(), 320_000.0));

        let clock = clock();
        let config = config();
        let sweep = HealthScorer::new(AnalyticsContext::new(&store, &clock, &config))
            .score_fleet()
            .unwrap();

        assert_eq!(sweep.scores.len(), 2);
        assert_eq!(sweep.scores[0].vehicle_id, 2);
        assert!(sweep.skipped.is_empty());
    }
}
