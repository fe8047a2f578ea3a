//! Result types produced by the analyzers.
//!
//! All of them are built fresh per call and never mutated afterwards.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Urgency of a prediction, suggestion or alert. Ordered from least to most
/// urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenancePrediction {
    pub vehicle_id: i64,
    pub maintenance_type: String,
    pub predicted_date: NaiveDate,
    pub priority: Priority,
    pub estimated_cost: f64,
    pub reason: String,
    pub is_mileage_based: bool,
    pub predicted_mileage: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleHealthScore {
    pub vehicle_id: i64,
    pub maintenance_compliance_score: f64,
    pub age_score: f64,
    pub mileage_score: f64,
    pub reliability_score: f64,
    pub cost_efficiency_score: f64,
    pub overall_score: f64,
    pub health_status: HealthStatus,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CostTrend {
    Increasing,
    Decreasing,
    Stable,
    #[serde(rename = "Insufficient data")]
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceCostAnalysis {
    pub vehicle_id: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_cost: f64,
    pub average_cost: f64,
    pub service_count: usize,
    pub cost_by_category: BTreeMap<String, f64>,
    pub cost_by_month: BTreeMap<String, f64>,
    pub projected_annual_cost: f64,
    pub cost_trend: CostTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceAlert {
    pub vehicle_id: i64,
    pub severity: Priority,
    pub message: String,
    pub due_date: NaiveDate,
    pub estimated_cost: f64,
}

/// An item a sweep could not process, kept so failures stay observable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedItem {
    pub id: Option<i64>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertSweep {
    pub alerts: Vec<MaintenanceAlert>,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PredictionSweep {
    pub predictions: Vec<MaintenancePrediction>,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthSweep {
    pub scores: Vec<VehicleHealthScore>,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEfficiencyMetrics {
    pub route_id: Option<i64>,
    pub route_name: String,
    pub date: NaiveDate,

    pub am_total_miles: f64,
    pub am_riders: u32,
    pub am_vehicle_id: Option<i64>,
    pub am_driver_id: Option<i64>,

    pub pm_total_miles: f64,
    pub pm_riders: u32,
    pub pm_vehicle_id: Option<i64>,
    pub pm_driver_id: Option<i64>,

    pub total_miles: f64,
    pub total_riders: u32,
    pub miles_per_rider: f64,
    pub efficiency_score: f64,
    pub estimated_fuel_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SuggestionType {
    EfficiencyImprovement,
    MileageReduction,
    VehicleUtilization,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteOptimizationSuggestion {
    pub route_id: Option<i64>,
    pub route_name: String,
    pub suggestion_type: SuggestionType,
    pub description: String,
    pub potential_savings: f64,
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuggestionReport {
    pub suggestions: Vec<RouteOptimizationSuggestion>,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceRating {
    Excellent,
    Good,
    Average,
    BelowAverage,
    NeedsImprovement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverPerformanceMetrics {
    pub driver_id: i64,
    pub driver_name: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub days_processed: usize,
    pub total_routes: usize,
    pub total_miles: f64,
    pub total_riders: u64,
    pub average_miles_per_route: f64,
    pub average_riders_per_route: f64,
    pub average_efficiency_score: f64,
    pub performance_rating: PerformanceRating,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetAnalyticsSummary {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub days_processed: usize,
    /// The day loop stopped early on cancellation; totals cover
    /// `days_processed` days only.
    pub timed_out: bool,
    pub total_routes: usize,
    pub total_miles: f64,
    pub total_riders: u64,
    pub average_efficiency_score: f64,
    pub estimated_fuel_cost: f64,
    pub total_vehicles: usize,
    pub active_vehicles: usize,
    pub out_of_service_vehicles: usize,
    pub vehicles_in_use: usize,
    pub vehicle_utilization_rate: f64,
    pub top_routes: Vec<RouteEfficiencyMetrics>,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostPerStudentMetrics {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub days_processed: usize,
    pub route_cost: f64,
    pub route_student_days: u64,
    pub route_cost_per_student: f64,
    pub activity_trips: usize,
    pub activity_cost: f64,
    pub activity_student_days: u64,
    pub activity_cost_per_student: f64,
    pub total_cost: f64,
    pub total_student_days: u64,
    pub cost_per_student: f64,
    pub skipped: Vec<SkippedItem>,
}
