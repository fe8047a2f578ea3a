//! Step functions mapping raw measurements and scores onto bands.

use crate::analyzers::types::{HealthStatus, PerformanceRating};

/// Converts vehicle age in years into a 0–100 score.
///
/// | Age (years) | Score |
/// |-------------|-------|
/// | <= 2        | 100   |
/// | <= 5        | 90    |
/// | <= 10       | 75    |
/// | <= 15       | 60    |
/// | <= 20       | 40    |
/// | > 20        | 20    |
pub fn age_score(years: i32) -> f64 {
    match years {
        y if y <= 2 => 100.0,
        y if y <= 5 => 90.0,
        y if y <= 10 => 75.0,
        y if y <= 15 => 60.0,
        y if y <= 20 => 40.0,
        _ => 20.0,
    }
}

/// Converts current odometer mileage into a 0–100 score.
pub fn mileage_score(miles: f64) -> f64 {
    match miles {
        m if m <= 50_000.0 => 100.0,
        m if m <= 100_000.0 => 85.0,
        m if m <= 150_000.0 => 70.0,
        m if m <= 200_000.0 => 55.0,
        m if m <= 300_000.0 => 40.0,
        _ => 25.0,
    }
}

/// Converts an average repair cost into a 0–100 score.
pub fn cost_efficiency_score(average_cost: f64) -> f64 {
    match average_cost {
        c if c <= 200.0 => 100.0,
        c if c <= 500.0 => 85.0,
        c if c <= 1000.0 => 70.0,
        c if c <= 2000.0 => 55.0,
        _ => 30.0,
    }
}

/// | Overall score | Status    |
/// |---------------|-----------|
/// | >= 85         | Excellent |
/// | >= 70         | Good      |
/// | >= 55         | Fair      |
/// | >= 40         | Poor      |
/// | < 40          | Critical  |
pub fn health_status(score: f64) -> HealthStatus {
    match score {
        s if s >= 85.0 => HealthStatus::Excellent,
        s if s >= 70.0 => HealthStatus::Good,
        s if s >= 55.0 => HealthStatus::Fair,
        s if s >= 40.0 => HealthStatus::Poor,
        _ => HealthStatus::Critical,
    }
}

pub fn performance_rating(average_efficiency: f64) -> PerformanceRating {
    match average_efficiency {
        s if s >= 80.0 => PerformanceRating::Excellent,
        s if s >= 70.0 => PerformanceRating::Good,
        s if s >= 60.0 => PerformanceRating::Average,
        s if s >= 50.0 => PerformanceRating::BelowAverage,
        _ => PerformanceRating::NeedsImprovement,
    }
}
