//! Loads an [`InMemoryStore`] from a directory of CSV exports.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

use super::InMemoryStore;
use crate::models::{Route, RouteLeg};

/// Flat CSV shape of a route; the AM/PM columns become two [`RouteLeg`]s.
#[derive(Debug, Deserialize)]
struct RouteRow {
    id: Option<i64>,
    name: Option<String>,
    date: NaiveDate,
    am_vehicle_id: Option<i64>,
    am_driver_id: Option<i64>,
    am_begin_miles: Option<f64>,
    am_end_miles: Option<f64>,
    am_riders: Option<u32>,
    pm_vehicle_id: Option<i64>,
    pm_driver_id: Option<i64>,
    pm_begin_miles: Option<f64>,
    pm_end_miles: Option<f64>,
    pm_riders: Option<u32>,
}

impl From<RouteRow> for Route {
    fn from(row: RouteRow) -> Self {
        Route {
            id: row.id,
            name: row.name,
            date: row.date,
            am: RouteLeg {
                vehicle_id: row.am_vehicle_id,
                driver_id: row.am_driver_id,
                begin_miles: row.am_begin_miles,
                end_miles: row.am_end_miles,
                riders: row.am_riders,
            },
            pm: RouteLeg {
                vehicle_id: row.pm_vehicle_id,
                driver_id: row.pm_driver_id,
                begin_miles: row.pm_begin_miles,
                end_miles: row.pm_end_miles,
                riders: row.pm_riders,
            },
        }
    }
}

impl InMemoryStore {
    /// Reads `vehicles.csv`, `drivers.csv`, `maintenance.csv`, `fuel.csv`,
    /// `routes.csv` and `activities.csv` from `dir`. Missing files load as
    /// empty collections.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let routes: Vec<RouteRow> = load_rows(dir, "routes.csv")?;

        let store = InMemoryStore {
            vehicles: load_rows(dir, "vehicles.csv")?,
            drivers: load_rows(dir, "drivers.csv")?,
            maintenance: load_rows(dir, "maintenance.csv")?,
            fuel: load_rows(dir, "fuel.csv")?,
            routes: routes.into_iter().map(Route::from).collect(),
            activities: load_rows(dir, "activities.csv")?,
        };

        info!(
            dir = %dir.display(),
            vehicles = store.vehicles.len(),
            drivers = store.drivers.len(),
            maintenance = store.maintenance.len(),
            fuel = store.fuel.len(),
            routes = store.routes.len(),
            activities = store.activities.len(),
            "Fleet data loaded"
        );

        Ok(store)
    }
}

fn load_rows<T: DeserializeOwned>(dir: &Path, file_name: &str) -> Result<Vec<T>> {
    let path = dir.join(file_name);
    if !path.exists() {
        warn!(path = %path.display(), "Data file missing, loading as empty");
        return Ok(Vec::new());
    }

    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let record: T =
            result.with_context(|| format!("{} row {}", path.display(), line + 1))?;
        rows.push(record);
    }

    debug!(path = %path.display(), rows = rows.len(), "CSV rows read");
    Ok(rows)
}
