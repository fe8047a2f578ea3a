//! Input records read from the data-access layer.
//!
//! Every field the fleet database may leave blank is an `Option`; the
//! analyzers state their own fallback for each missing value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub registration_number: String,
    pub manufacture_year: i32,
    pub status: String,
    pub last_inspection_date: Option<NaiveDate>,
}

impl Vehicle {
    pub fn is_active(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("active")
    }

    pub fn is_out_of_service(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("out of service")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub vehicle_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub maintenance_type: Option<String>,
    pub odometer_reading: Option<f64>,
    pub repair_cost: Option<f64>,
    pub notes: Option<String>,
}

impl MaintenanceRecord {
    /// Case-insensitive substring match against the free-text type.
    pub fn type_contains(&self, needle: &str) -> bool {
        contains_ignore_case(self.maintenance_type.as_deref(), needle)
    }

    pub fn notes_contain(&self, needle: &str) -> bool {
        contains_ignore_case(self.notes.as_deref(), needle)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelRecord {
    pub vehicle_id: Option<i64>,
    pub date: NaiveDate,
    pub odometer_reading: Option<f64>,
}

/// One half-day (AM or PM) of a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub vehicle_id: Option<i64>,
    pub driver_id: Option<i64>,
    pub begin_miles: Option<f64>,
    pub end_miles: Option<f64>,
    pub riders: Option<u32>,
}

impl RouteLeg {
    /// Distance driven on this leg. Corrupted odometer pairs (end below
    /// begin) count as zero.
    pub fn miles(&self) -> f64 {
        match (self.begin_miles, self.end_miles) {
            (Some(begin), Some(end)) => (end - begin).max(0.0),
            _ => 0.0,
        }
    }

    pub fn has_mileage(&self) -> bool {
        self.begin_miles.is_some() && self.end_miles.is_some()
    }

    pub fn has_assignment(&self) -> bool {
        self.vehicle_id.is_some() || self.driver_id.is_some()
    }

    pub fn riders(&self) -> u32 {
        self.riders.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub am: RouteLeg,
    pub pm: RouteLeg,
}

impl Route {
    pub fn uses_vehicle(&self, vehicle_id: i64) -> bool {
        self.am.vehicle_id == Some(vehicle_id) || self.pm.vehicle_id == Some(vehicle_id)
    }

    pub fn uses_driver(&self, driver_id: i64) -> bool {
        self.am.driver_id == Some(driver_id) || self.pm.driver_id == Some(driver_id)
    }

    pub fn display_name(&self) -> String {
        match (&self.name, self.id) {
            (Some(name), _) if !name.trim().is_empty() => name.clone(),
            (_, Some(id)) => format!("Route {id}"),
            _ => "Unnamed route".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub date: Option<NaiveDate>,
    pub activity_type: Option<String>,
}

impl Activity {
    pub fn type_contains(&self, needle: &str) -> bool {
        contains_ignore_case(self.activity_type.as_deref(), needle)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    pub name: String,
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}
