use anyhow::Result;
use chrono::NaiveDate;

use super::FleetData;
use crate::models::{Activity, Driver, FuelRecord, MaintenanceRecord, Route, Vehicle};

/// [`FleetData`] over in-memory collections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub vehicles: Vec<Vehicle>,
    pub drivers: Vec<Driver>,
    pub maintenance: Vec<MaintenanceRecord>,
    pub fuel: Vec<FuelRecord>,
    pub routes: Vec<Route>,
    pub activities: Vec<Activity>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicle(mut self, vehicle: Vehicle) -> Self {
        self.vehicles.push(vehicle);
        self
    }

    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.drivers.push(driver);
        self
    }

    pub fn with_maintenance(mut self, record: MaintenanceRecord) -> Self {
        self.maintenance.push(record);
        self
    }

    pub fn with_fuel(mut self, record: FuelRecord) -> Self {
        self.fuel.push(record);
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activities.push(activity);
        self
    }
}

impl FleetData for InMemoryStore {
    fn vehicle(&self, id: i64) -> Result<Option<Vehicle>> {
        Ok(self.vehicles.iter().find(|v| v.id == id).cloned())
    }

    fn vehicles(&self) -> Result<Vec<Vehicle>> {
        Ok(self.vehicles.clone())
    }

    fn driver(&self, id: i64) -> Result<Option<Driver>> {
        Ok(self.drivers.iter().find(|d| d.id == id).cloned())
    }

    fn drivers(&self) -> Result<Vec<Driver>> {
        Ok(self.drivers.clone())
    }

    fn maintenance_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<MaintenanceRecord>> {
        Ok(self
            .maintenance
            .iter()
            .filter(|m| m.vehicle_id == Some(vehicle_id))
            .cloned()
            .collect())
    }

    fn fuel_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<FuelRecord>> {
        Ok(self
            .fuel
            .iter()
            .filter(|f| f.vehicle_id == Some(vehicle_id))
            .cloned()
            .collect())
    }

    fn routes_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<Route>> {
        Ok(self
            .routes
            .iter()
            .filter(|r| r.uses_vehicle(vehicle_id))
            .cloned()
            .collect())
    }

    fn routes_on(&self, date: NaiveDate) -> Result<Vec<Route>> {
        Ok(self
            .routes
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    fn activities_on(&self, date: NaiveDate) -> Result<Vec<Activity>> {
        Ok(self
            .activities
            .iter()
            .filter(|a| a.date == Some(date))
            .cloned()
            .collect())
    }
}
