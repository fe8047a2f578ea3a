//! Next-service prediction per vehicle and maintenance type.
//!
//! Every type follows the same pattern: find the most recent record whose
//! free-text type matches, measure miles and days since it, and compare the
//! distance against that type's interval. A vehicle that was never serviced
//! for a type counts its whole odometer as miles since service.

use chrono::{Days, NaiveDate};
use tracing::{debug, warn};

use crate::analyzers::AnalyticsContext;
use crate::analyzers::types::{MaintenancePrediction, Priority, PredictionSweep, SkippedItem};
use crate::error::{Result, not_found};
use crate::models::{MaintenanceRecord, Vehicle};

/// Days-since value used when no dated matching record exists.
const NEVER_SERVICED_DAYS: i64 = 365;

const OIL_CHANGE_MILES: f64 = 5_000.0;
const OIL_CHANGE_DAYS: i64 = 180;
const OIL_CHANGE_GRACE_MILES: f64 = 1_000.0;
const OIL_CHANGE_GRACE_DAYS: i64 = 30;
const OIL_CHANGE_COST: f64 = 75.0;

const BRAKE_MILES: f64 = 25_000.0;
const BRAKE_DUE_RATIO: f64 = 0.8;
const BRAKE_COST: f64 = 200.0;

const TIRE_MILES: f64 = 8_000.0;
const TIRE_COST: f64 = 100.0;

const INSPECTION_DUE_DAYS: i64 = 330;
const INSPECTION_OVERDUE_DAYS: i64 = 365;
pub(crate) const INSPECTION_COST: f64 = 150.0;

const ENGINE_MILES: f64 = 100_000.0;
const ENGINE_DUE_RATIO: f64 = 0.9;
const ENGINE_COST: f64 = 1_500.0;

pub struct MaintenancePredictor<'a> {
    ctx: AnalyticsContext<'a>,
}

impl<'a> MaintenancePredictor<'a> {
    pub fn new(ctx: AnalyticsContext<'a>) -> Self {
        Self { ctx }
    }

    /// Predicts upcoming maintenance for one vehicle, ordered by predicted
    /// date.
    ///
    /// # Errors
    ///
    /// [`NotFound`](crate::AnalyticsError::NotFound) if the id is not
    /// positive or no such vehicle exists.
    #[tracing::instrument(skip(self))]
    pub fn predict(&self, vehicle_id: i64) -> Result<Vec<MaintenancePrediction>> {
        let vehicle = self.find_vehicle(vehicle_id)?;
        self.predict_for(&vehicle)
    }

    pub fn predict_for(&self, vehicle: &Vehicle) -> Result<Vec<MaintenancePrediction>> {
        let today = self.ctx.clock.today();
        let records = self.ctx.data.maintenance_for_vehicle(vehicle.id)?;
        let mileage = self.current_mileage(vehicle.id)?;

        let history = |keyword: &str| ServiceHistory::find(&records, keyword, mileage, today);

        let mut predictions: Vec<MaintenancePrediction> = [
            oil_change(vehicle.id, &history("Oil Change"), today),
            brake_inspection(vehicle.id, &history("Brake"), today),
            tire_service(vehicle.id, &history("Tire"), today),
            annual_inspection(vehicle, mileage, today),
            engine_service(vehicle.id, &history("Engine"), today),
        ]
        .into_iter()
        .flatten()
        .collect();

        predictions.sort_by_key(|p| p.predicted_date);

        debug!(
            vehicle_id = vehicle.id,
            mileage,
            records = records.len(),
            predictions = predictions.len(),
            "Maintenance predicted"
        );

        Ok(predictions)
    }

    /// Runs [`predict`](Self::predict) for every vehicle in the fleet. A
    /// vehicle whose records cannot be read is reported in `skipped` and the
    /// sweep carries on.
    #[tracing::instrument(skip(self))]
    pub fn predict_fleet(&self) -> Result<PredictionSweep> {
        let mut sweep = PredictionSweep::default();

        for vehicle in self.ctx.data.vehicles()? {
            match self.predict_for(&vehicle) {
                Ok(predictions) => sweep.predictions.extend(predictions),
                Err(e) => {
                    warn!(vehicle_id = vehicle.id, error = %e, "Skipping vehicle in prediction sweep");
                    sweep.skipped.push(SkippedItem {
                        id: Some(vehicle.id),
                        reason: e.to_string(),
                    });
                }
            }
        }

        sweep.predictions.sort_by_key(|p| p.predicted_date);
        Ok(sweep)
    }

    /// Best known odometer value: the latest fuel-up reading, else the highest
    /// end mileage on the vehicle's latest route, else zero.
    pub fn current_mileage(&self, vehicle_id: i64) -> Result<f64> {
        let fuel = self.ctx.data.fuel_for_vehicle(vehicle_id)?;
        let latest_fuel_reading = fuel
            .iter()
            .filter(|f| f.odometer_reading.is_some())
            .max_by_key(|f| f.date)
            .and_then(|f| f.odometer_reading);

        if let Some(reading) = latest_fuel_reading {
            return Ok(reading);
        }

        let routes = self.ctx.data.routes_for_vehicle(vehicle_id)?;
        let latest_route_reading = routes.iter().max_by_key(|r| r.date).and_then(|r| {
            [r.am.end_miles, r.pm.end_miles]
                .into_iter()
                .flatten()
                .reduce(f64::max)
        });

        Ok(latest_route_reading.unwrap_or(0.0))
    }

    pub(crate) fn find_vehicle(&self, vehicle_id: i64) -> Result<Vehicle> {
        if vehicle_id <= 0 {
            return Err(not_found("vehicle", vehicle_id));
        }
        self.ctx
            .data
            .vehicle(vehicle_id)?
            .ok_or_else(|| not_found("vehicle", vehicle_id))
    }
}

/// Distance and time since the last record of one maintenance type.
struct ServiceHistory {
    last_date: Option<NaiveDate>,
    found: bool,
    miles_since: f64,
    days_since: i64,
    /// Odometer value at the last service, as far as it can be inferred.
    service_mileage: f64,
}

impl ServiceHistory {
    fn find(
        records: &[MaintenanceRecord],
        keyword: &str,
        current_mileage: f64,
        today: NaiveDate,
    ) -> Self {
        let last = records
            .iter()
            .filter(|r| r.type_contains(keyword))
            .max_by_key(|r| r.date);

        let miles_since = match last.and_then(|r| r.odometer_reading) {
            Some(reading) => (current_mileage - reading).max(0.0),
            None => current_mileage,
        };

        let last_date = last.and_then(|r| r.date);
        let days_since = last_date
            .map(|d| (today - d).num_days().max(0))
            .unwrap_or(NEVER_SERVICED_DAYS);

        Self {
            last_date,
            found: last.is_some(),
            miles_since,
            days_since,
            service_mileage: (current_mileage - miles_since).max(0.0),
        }
    }

    fn describe(&self, label: &str) -> String {
        match (self.found, self.last_date) {
            (true, Some(date)) => format!(
                "{:.0} miles and {} days since last {label} on {date}",
                self.miles_since, self.days_since
            ),
            (true, None) => format!(
                "{:.0} miles since last {label} (service date unknown)",
                self.miles_since
            ),
            (false, _) => format!(
                "No {label} on record; {:.0} miles on the odometer",
                self.miles_since
            ),
        }
    }
}

fn in_days(today: NaiveDate, days: u64) -> NaiveDate {
    today + Days::new(days)
}

fn oil_change(vehicle_id: i64, h: &ServiceHistory, today: NaiveDate) -> Option<MaintenancePrediction> {
    let mileage_due = h.miles_since >= OIL_CHANGE_MILES;
    let time_due = h.days_since >= OIL_CHANGE_DAYS;
    if !mileage_due && !time_due {
        return None;
    }

    // Escalates only once both grace margins are used up.
    let well_overdue = h.miles_since > OIL_CHANGE_MILES + OIL_CHANGE_GRACE_MILES
        && h.days_since > OIL_CHANGE_DAYS + OIL_CHANGE_GRACE_DAYS;
    let (priority, lead_days) = if well_overdue {
        (Priority::High, 7)
    } else {
        (Priority::Medium, 14)
    };

    Some(MaintenancePrediction {
        vehicle_id,
        maintenance_type: "Oil Change".to_string(),
        predicted_date: in_days(today, lead_days),
        priority,
        estimated_cost: OIL_CHANGE_COST,
        reason: h.describe("oil change"),
        is_mileage_based: mileage_due,
        predicted_mileage: Some(h.service_mileage + OIL_CHANGE_MILES),
    })
}

fn brake_inspection(
    vehicle_id: i64,
    h: &ServiceHistory,
    today: NaiveDate,
) -> Option<MaintenancePrediction> {
    if h.miles_since < BRAKE_MILES * BRAKE_DUE_RATIO {
        return None;
    }

    let (priority, lead_days) = if h.miles_since >= BRAKE_MILES {
        (Priority::High, 14)
    } else {
        (Priority::Medium, 30)
    };

    Some(MaintenancePrediction {
        vehicle_id,
        maintenance_type: "Brake Inspection".to_string(),
        predicted_date: in_days(today, lead_days),
        priority,
        estimated_cost: BRAKE_COST,
        reason: h.describe("brake service"),
        is_mileage_based: true,
        predicted_mileage: Some(h.service_mileage + BRAKE_MILES),
    })
}

fn tire_service(vehicle_id: i64, h: &ServiceHistory, today: NaiveDate) -> Option<MaintenancePrediction> {
    if h.miles_since < TIRE_MILES {
        return None;
    }

    Some(MaintenancePrediction {
        vehicle_id,
        maintenance_type: "Tire Service".to_string(),
        predicted_date: in_days(today, 21),
        priority: Priority::Medium,
        estimated_cost: TIRE_COST,
        reason: h.describe("tire service"),
        is_mileage_based: true,
        predicted_mileage: Some(h.service_mileage + TIRE_MILES),
    })
}

/// Calendar-anchored: due on the anniversary of the last inspection, never
/// inferred when that date is unknown.
fn annual_inspection(
    vehicle: &Vehicle,
    mileage: f64,
    today: NaiveDate,
) -> Option<MaintenancePrediction> {
    let last = vehicle.last_inspection_date?;
    let days_since = (today - last).num_days();
    if days_since < INSPECTION_DUE_DAYS {
        return None;
    }

    let priority = if days_since >= INSPECTION_OVERDUE_DAYS {
        Priority::Critical
    } else {
        Priority::High
    };

    Some(MaintenancePrediction {
        vehicle_id: vehicle.id,
        maintenance_type: "Annual Inspection".to_string(),
        predicted_date: last + Days::new(INSPECTION_OVERDUE_DAYS as u64),
        priority,
        estimated_cost: INSPECTION_COST,
        reason: format!("{days_since} days since last annual inspection on {last}"),
        is_mileage_based: false,
        predicted_mileage: Some(mileage),
    })
}

fn engine_service(vehicle_id: i64, h: &ServiceHistory, today: NaiveDate) -> Option<MaintenancePrediction> {
    if h.miles_since < ENGINE_MILES * ENGINE_DUE_RATIO {
        return None;
    }

    let (priority, lead_days) = if h.miles_since >= ENGINE_MILES {
        (Priority::High, 30)
    } else {
        (Priority::Low, 90)
    };

    Some(MaintenancePrediction {
        vehicle_id,
        maintenance_type: "Major Engine Service".to_string(),
        predicted_date: in_days(today, lead_days),
        priority,
        estimated_cost: ENGINE_COST,
        reason: h.describe("engine service"),
        is_mileage_based: true,
        predicted_mileage: Some(h.service_mileage + ENGINE_MILES),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::*;
    use crate::error::AnalyticsError;
    use crate::store::InMemoryStore;

    fn predict(store: &InMemoryStore, vehicle_id: i64) -> Result<Vec<MaintenancePrediction>> {
        let clock = clock();
        let config = config();
        let ctx = AnalyticsContext::new(store, &clock, &config);
        MaintenancePredictor::new(ctx).predict(vehicle_id)
    }

    fn of_type<'p>(predictions: &'p [MaintenancePrediction], label: &str) -> Option<&'p MaintenancePrediction> {
        predictions.iter().find(|p| p.maintenance_type == label)
    }

    #[test]
    fn test_oil_change_past_interval_is_medium() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2022))
            .with_maintenance(maintenance(1, days_ago(40), "Oil Change", Some(10_000.0), Some(70.0)))
            .with_fuel(fuel(1, today(), 16_200.0));

        let predictions = predict(&store, 1).unwrap();
        let oil = of_type(&predictions, "Oil Change").expect("oil change predicted");

        assert_eq!(oil.priority, Priority::Medium);
        assert_eq!(oil.predicted_date, today() + Days::new(14));
        assert_eq!(oil.estimated_cost, 75.0);
        assert!(oil.is_mileage_based);
        assert_eq!(oil.predicted_mileage, Some(15_000.0));
    }

    #[test]
    fn test_oil_change_well_overdue_is_high() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2022))
            .with_maintenance(maintenance(1, days_ago(250), "oil change", Some(10_000.0), None))
            .with_fuel(fuel(1, today(), 17_000.0));

        let predictions = predict(&store, 1).unwrap();
        let oil = of_type(&predictions, "Oil Change").unwrap();

        assert_eq!(oil.priority, Priority::High);
        assert_eq!(oil.predicted_date, today() + Days::new(7));
    }

    #[test]
    fn test_oil_change_high_needs_both_grace_margins() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2022))
            .with_maintenance(maintenance(1, days_ago(10), "Oil Change", Some(10_000.0), None))
            .with_fuel(fuel(1, today(), 22_000.0));

        let predictions = predict(&store, 1).unwrap();
        let oil = of_type(&predictions, "Oil Change").unwrap();

        assert_eq!(oil.priority, Priority::Medium);
        assert_eq!(oil.predicted_date, today() + Days::new(14));
    }

    #[test]
    fn test_recent_oil_change_not_predicted() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2022))
            .with_maintenance(maintenance(1, days_ago(30), "Oil Change", Some(10_000.0), None))
            .with_fuel(fuel(1, today(), 11_000.0));

        let predictions = predict(&store, 1).unwrap();
        assert!(of_type(&predictions, "Oil Change").is_none());
    }

    #[test]
    fn test_no_history_never_fails() {
        let store = InMemoryStore::new().with_vehicle(vehicle(1, 2026));

        let predictions = predict(&store, 1).unwrap();

        // Only the time-triggered oil change fires at zero miles.
        assert_eq!(predictions.len(), 1);
        let oil = &predictions[0];
        assert_eq!(oil.maintenance_type, "Oil Change");
        assert_eq!(oil.priority, Priority::Medium);
        assert!(!oil.is_mileage_based);
        assert!(oil.reason.starts_with("No oil change on record"));
    }

    #[test]
    fn test_never_serviced_counts_full_odometer() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2015))
            .with_fuel(fuel(1, today(), 120_000.0));

        let predictions = predict(&store, 1).unwrap();

        assert_eq!(of_type(&predictions, "Brake Inspection").unwrap().priority, Priority::High);
        assert_eq!(of_type(&predictions, "Tire Service").unwrap().priority, Priority::Medium);
        assert_eq!(of_type(&predictions, "Major Engine Service").unwrap().priority, Priority::High);
    }

    #[test]
    fn test_brake_due_at_eighty_percent() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2020))
            .with_maintenance(maintenance(1, days_ago(100), "Brake pads", Some(0.0), None))
            .with_maintenance(maintenance(1, days_ago(10), "Tire rotation", Some(20_500.0), None))
            .with_maintenance(maintenance(1, days_ago(10), "Oil Change", Some(20_500.0), None))
            .with_fuel(fuel(1, today(), 21_000.0));

        let predictions = predict(&store, 1).unwrap();
        let brake = of_type(&predictions, "Brake Inspection").unwrap();

        assert_eq!(brake.priority, Priority::Medium);
        assert_eq!(brake.predicted_date, today() + Days::new(30));
        assert_eq!(brake.estimated_cost, 200.0);
    }

    #[test]
    fn test_engine_service_low_priority_before_interval() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2012))
            .with_maintenance(maintenance(1, days_ago(5), "Engine overhaul", Some(5_000.0), None))
            .with_fuel(fuel(1, today(), 100_000.0));

        let predictions = predict(&store, 1).unwrap();
        let engine = of_type(&predictions, "Major Engine Service").unwrap();

        assert_eq!(engine.priority, Priority::Low);
        assert_eq!(engine.predicted_date, today() + Days::new(90));
        assert_eq!(engine.estimated_cost, 1_500.0);
    }

    #[test]
    fn test_annual_inspection_anchored_to_last_inspection() {
        let mut v = vehicle(1, 2020);
        let last = days_ago(340);
        v.last_inspection_date = Some(last);
        let store = InMemoryStore::new().with_vehicle(v);

        let predictions = predict(&store, 1).unwrap();
        let inspection = of_type(&predictions, "Annual Inspection").unwrap();

        assert_eq!(inspection.priority, Priority::High);
        assert_eq!(inspection.predicted_date, last + Days::new(365));
        assert!(!inspection.is_mileage_based);
    }

    #[test]
    fn test_annual_inspection_overdue_is_critical() {
        let mut v = vehicle(1, 2020);
        v.last_inspection_date = Some(days_ago(400));
        let store = InMemoryStore::new().with_vehicle(v);

        let predictions = predict(&store, 1).unwrap();
        assert_eq!(
            of_type(&predictions, "Annual Inspection").unwrap().priority,
            Priority::Critical
        );
    }

    #[test]
    fn test_annual_inspection_skipped_without_date() {
        let store = InMemoryStore::new().with_vehicle(vehicle(1, 2010));
        let predictions = predict(&store, 1).unwrap();
        assert!(of_type(&predictions, "Annual Inspection").is_none());
    }

    #[test]
    fn test_predictions_sorted_by_date() {
        let mut v = vehicle(1, 2015);
        v.last_inspection_date = Some(days_ago(360));
        let store = InMemoryStore::new()
            .with_vehicle(v)
            .with_fuel(fuel(1, today(), 95_000.0));

        let predictions = predict(&store, 1).unwrap();
        let dates: Vec<_> = predictions.iter().map(|p| p.predicted_date).collect();
        let mut sorted = dates.clone();
        sorted.sort();

        assert_eq!(dates, sorted);
        assert_eq!(predictions[0].maintenance_type, "Annual Inspection");
    }

    #[test]
    fn test_reading_above_odometer_counts_as_zero_miles() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2022))
            .with_maintenance(maintenance(1, days_ago(10), "Oil Change", Some(20_000.0), None))
            .with_maintenance(maintenance(1, days_ago(10), "Tire", Some(20_000.0), None))
            .with_fuel(fuel(1, today(), 15_000.0));

        let predictions = predict(&store, 1).unwrap();
        assert!(of_type(&predictions, "Oil Change").is_none());
        assert!(of_type(&predictions, "Tire Service").is_none());
    }

    #[test]
    fn test_unknown_vehicle_is_not_found() {
        let store = InMemoryStore::new().with_vehicle(vehicle(1, 2022));

        assert!(matches!(predict(&store, 0), Err(AnalyticsError::NotFound { .. })));
        assert!(matches!(predict(&store, -3), Err(AnalyticsError::NotFound { .. })));
        assert!(matches!(predict(&store, 99), Err(AnalyticsError::NotFound { .. })));
    }

    #[test]
    fn test_current_mileage_prefers_latest_fuel_reading() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2022))
            .with_fuel(fuel(1, days_ago(10), 9_000.0))
            .with_fuel(fuel(1, days_ago(2), 9_400.0))
            .with_route(route(5, days_ago(1), leg(1, 10, 9_400.0, 9_450.0, 5), Default::default()));

        let clock = clock();
        let config = config();
        let predictor = MaintenancePredictor::new(AnalyticsContext::new(&store, &clock, &config));

        assert_eq!(predictor.current_mileage(1).unwrap(), 9_400.0);
    }

    #[test]
    fn test_current_mileage_falls_back_to_latest_route() {
        let store = InMemoryStore::new()
            .with_vehicle(vehicle(1, 2022))
            .with_route(route(5, days_ago(30), leg(1, 10, 400.0, 500.0, 5), Default::default()))
            .with_route(route(6, days_ago(1), leg(1, 10, 100.0, 120.0, 5), leg(1, 10, 150.0, 180.0, 5)));

        let clock = clock();
        let config = config();
        let predictor = MaintenancePredictor::new(AnalyticsContext::new(&store, &clock, &config));

        assert_eq!(predictor.current_mileage(1).unwrap(), 180.0);
        assert_eq!(predictor.current_mileage(2).unwrap(), 0.0);
    }

    #[test]
    fn test_predict_fleet_skips_failing_vehicle() {
        let store = FailingStore {
            inner: InMemoryStore::new()
                .with_vehicle(vehicle(1, 2022))
                .with_vehicle(vehicle(2, 2022)),
            failing_vehicle: 1,
        };

        let clock = clock();
        let config = config();
        let sweep = MaintenancePredictor::new(AnalyticsContext::new(&store, &clock, &config))
            .predict_fleet()
            .unwrap();

        assert_eq!(sweep.skipped.len(), 1);
        assert_eq!(sweep.skipped[0].id, Some(1));
        assert!(sweep.predictions.iter().all(|p| p.vehicle_id == 2));
        assert!(!sweep.predictions.is_empty());
    }
}
