//! Read access to fleet records.
//!
//! [`FleetData`] is the trait the analyzers pull records through.
//! [`InMemoryStore`] implements it over plain collections and can be filled
//! from a directory of CSV exports with [`InMemoryStore::load_dir`].

mod csv_loader;
mod memory;

pub use memory::InMemoryStore;

use anyhow::Result;
use chrono::NaiveDate;

use crate::models::{Activity, Driver, FuelRecord, MaintenanceRecord, Route, Vehicle};

/// Abstraction over the fleet database.
///
/// Implementations return owned snapshots; the analyzers never write back.
pub trait FleetData: Send + Sync {
    fn vehicle(&self, id: i64) -> Result<Option<Vehicle>>;

    fn vehicles(&self) -> Result<Vec<Vehicle>>;

    fn driver(&self, id: i64) -> Result<Option<Driver>>;

    fn drivers(&self) -> Result<Vec<Driver>>;

    fn maintenance_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<MaintenanceRecord>>;

    fn fuel_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<FuelRecord>>;

    /// Routes where the vehicle is assigned to either leg.
    fn routes_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<Route>>;

    fn routes_on(&self, date: NaiveDate) -> Result<Vec<Route>>;

    fn activities_on(&self, date: NaiveDate) -> Result<Vec<Activity>>;
}
