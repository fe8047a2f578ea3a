//! Record builders shared by the analyzer unit tests.

use anyhow::{Result, bail};
use chrono::{Days, NaiveDate};

use crate::clock::FixedClock;
use crate::config::AnalyticsConfig;
use crate::models::{Activity, Driver, FuelRecord, MaintenanceRecord, Route, RouteLeg, Vehicle};
use crate::store::{FleetData, InMemoryStore};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
}

pub fn clock() -> FixedClock {
    FixedClock(today())
}

pub fn config() -> AnalyticsConfig {
    AnalyticsConfig::default()
}

pub fn days_ago(days: u64) -> NaiveDate {
    today() - Days::new(days)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn vehicle(id: i64, manufacture_year: i32) -> Vehicle {
    Vehicle {
        id,
        registration_number: format!("BUS-{id:03}"),
        manufacture_year,
        status: "Active".to_string(),
        last_inspection_date: None,
    }
}

pub fn maintenance(
    vehicle_id: i64,
    date: NaiveDate,
    maintenance_type: &str,
    odometer: Option<f64>,
    cost: Option<f64>,
) -> MaintenanceRecord {
    MaintenanceRecord {
        vehicle_id: Some(vehicle_id),
        date: Some(date),
        maintenance_type: Some(maintenance_type.to_string()),
        odometer_reading: odometer,
        repair_cost: cost,
        notes: None,
    }
}

pub fn fuel(vehicle_id: i64, date: NaiveDate, odometer: f64) -> FuelRecord {
    FuelRecord {
        vehicle_id: Some(vehicle_id),
        date,
        odometer_reading: Some(odometer),
    }
}

pub fn leg(vehicle_id: i64, driver_id: i64, begin: f64, end: f64, riders: u32) -> RouteLeg {
    RouteLeg {
        vehicle_id: Some(vehicle_id),
        driver_id: Some(driver_id),
        begin_miles: Some(begin),
        end_miles: Some(end),
        riders: Some(riders),
    }
}

pub fn route(id: i64, date: NaiveDate, am: RouteLeg, pm: RouteLeg) -> Route {
    Route {
        id: Some(id),
        name: Some(format!("Route {id}")),
        date,
        am,
        pm,
    }
}

pub fn driver(id: i64, name: &str) -> Driver {
    Driver {
        id,
        name: name.to_string(),
    }
}

pub fn activity(date: NaiveDate, activity_type: &str) -> Activity {
    Activity {
        date: Some(date),
        activity_type: Some(activity_type.to_string()),
    }
}

/// Wraps a store and fails every maintenance lookup for one vehicle.
pub struct FailingStore {
    pub inner: InMemoryStore,
    pub failing_vehicle: i64,
}

impl FleetData for FailingStore {
    fn vehicle(&self, id: i64) -> Result<Option<Vehicle>> {
        self.inner.vehicle(id)
    }

    fn vehicles(&self) -> Result<Vec<Vehicle>> {
        self.inner.vehicles()
    }

    fn driver(&self, id: i64) -> Result<Option<Driver>> {
        self.inner.driver(id)
    }

    fn drivers(&self) -> Result<Vec<Driver>> {
        self.inner.drivers()
    }

    fn maintenance_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<MaintenanceRecord>> {
        if vehicle_id == self.failing_vehicle {
            bail!("maintenance table unavailable for vehicle {vehicle_id}");
        }
        self.inner.maintenance_for_vehicle(vehicle_id)
    }

    fn fuel_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<FuelRecord>> {
        self.inner.fuel_for_vehicle(vehicle_id)
    }

    fn routes_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<Route>> {
        self.inner.routes_for_vehicle(vehicle_id)
    }

    fn routes_on(&self, date: NaiveDate) -> Result<Vec<Route>> {
        self.inner.routes_on(date)
    }

    fn activities_on(&self, date: NaiveDate) -> Result<Vec<Activity>> {
        self.inner.activities_on(date)
    }
}

/// Wraps a store and fails the route or activity lookup for single days.
pub struct FailingDayStore {
    pub inner: InMemoryStore,
    pub failing_routes_on: Option<NaiveDate>,
    pub failing_activities_on: Option<NaiveDate>,
}

impl FleetData for FailingDayStore {
    fn vehicle(&self, id: i64) -> Result<Option<Vehicle>> {
        self.inner.vehicle(id)
    }

    fn vehicles(&self) -> Result<Vec<Vehicle>> {
        self.inner.vehicles()
    }

    fn driver(&self, id: i64) -> Result<Option<Driver>> {
        self.inner.driver(id)
    }

    fn drivers(&self) -> Result<Vec<Driver>> {
        self.inner.drivers()
    }

    fn maintenance_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<MaintenanceRecord>> {
        self.inner.maintenance_for_vehicle(vehicle_id)
    }

    fn fuel_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<FuelRecord>> {
        self.inner.fuel_for_vehicle(vehicle_id)
    }

    fn routes_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<Route>> {
        self.inner.routes_for_vehicle(vehicle_id)
    }

    fn routes_on(&self, date: NaiveDate) -> Result<Vec<Route>> {
        if self.failing_routes_on == Some(date) {
            bail!("route table unavailable for {date}");
        }
        self.inner.routes_on(date)
    }

    fn activities_on(&self, date: NaiveDate) -> Result<Vec<Activity>> {
        if self.failing_activities_on == Some(date) {
            bail!("activity table unavailable for {date}");
        }
        self.inner.activities_on(date)
    }
}
