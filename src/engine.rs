//! Single entry point over all analyzers.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::analyzers::AnalyticsContext;
use crate::analyzers::aggregate::FleetAggregator;
use crate::analyzers::alerts::AlertGenerator;
use crate::analyzers::cost::CostAnalyzer;
use crate::analyzers::cost_per_student::CostPerStudentCalculator;
use crate::analyzers::efficiency::RouteEfficiencyCalculator;
use crate::analyzers::health::HealthScorer;
use crate::analyzers::optimization::OptimizationAdvisor;
use crate::analyzers::prediction::MaintenancePredictor;
use crate::analyzers::types::{
    AlertSweep, CostPerStudentMetrics, DriverPerformanceMetrics, FleetAnalyticsSummary, HealthSweep,
    MaintenanceCostAnalysis, MaintenancePrediction, PredictionSweep, RouteEfficiencyMetrics,
    SuggestionReport, VehicleHealthScore,
};
use crate::cancel::CancellationToken;
use crate::clock::Clock;
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::models::Route;
use crate::store::FleetData;

/// Holds the data source, clock and config, and hands them to each analyzer
/// per call. Cheap to clone.
#[derive(Clone)]
pub struct FleetAnalytics {
    data: Arc<dyn FleetData>,
    clock: Arc<dyn Clock>,
    config: AnalyticsConfig,
}

impl FleetAnalytics {
    pub fn new(data: Arc<dyn FleetData>, clock: Arc<dyn Clock>, config: AnalyticsConfig) -> Self {
        Self {
            data,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    fn ctx(&self) -> AnalyticsContext<'_> {
        AnalyticsContext::new(self.data.as_ref(), self.clock.as_ref(), &self.config)
    }

    pub fn predict(&self, vehicle_id: i64) -> Result<Vec<MaintenancePrediction>> {
        MaintenancePredictor::new(self.ctx()).predict(vehicle_id)
    }

    pub fn predict_fleet(&self) -> Result<PredictionSweep> {
        MaintenancePredictor::new(self.ctx()).predict_fleet()
    }

    pub fn score(&self, vehicle_id: i64) -> Result<VehicleHealthScore> {
        HealthScorer::new(self.ctx()).score(vehicle_id)
    }

    pub fn score_fleet(&self) -> Result<HealthSweep> {
        HealthScorer::new(self.ctx()).score_fleet()
    }

    pub fn analyze_costs(
        &self,
        vehicle_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MaintenanceCostAnalysis> {
        CostAnalyzer::new(self.ctx()).analyze(vehicle_id, start, end)
    }

    pub fn sweep_alerts(&self) -> Result<AlertSweep> {
        AlertGenerator::new(self.ctx()).sweep_all()
    }

    pub fn efficiency(&self, route: Option<&Route>) -> Result<Option<RouteEfficiencyMetrics>> {
        RouteEfficiencyCalculator::new(&self.config).efficiency(route)
    }

    /// Metrics for every route on `date` that carries usable data. Any
    /// computation failure fails the whole call.
    pub fn route_efficiency_on(&self, date: NaiveDate) -> Result<Vec<RouteEfficiencyMetrics>> {
        let calc = RouteEfficiencyCalculator::new(&self.config);
        let mut metrics = Vec::new();
        for route in self.data.routes_on(date)? {
            metrics.extend(calc.efficiency(Some(&route))?);
        }
        Ok(metrics)
    }

    pub fn suggest(&self, date: NaiveDate) -> Result<SuggestionReport> {
        OptimizationAdvisor::new(self.ctx()).suggest(date)
    }

    pub fn driver_performance(
        &self,
        driver_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DriverPerformanceMetrics> {
        FleetAggregator::new(self.ctx()).driver_performance(driver_id, start, end)
    }

    pub fn fleet_summary(&self, start: NaiveDate, end: NaiveDate) -> Result<FleetAnalyticsSummary> {
        FleetAggregator::new(self.ctx()).fleet_summary(start, end)
    }

    pub fn fleet_summary_with_token(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        token: &CancellationToken,
    ) -> Result<FleetAnalyticsSummary> {
        FleetAggregator::new(self.ctx()).fleet_summary_with_token(start, end, token)
    }

    pub fn cost_per_student(&self, start: NaiveDate, end: NaiveDate) -> Result<CostPerStudentMetrics> {
        CostPerStudentCalculator::new(self.ctx()).cost_per_student(start, end)
    }
}
