//! Fleet-wide sweep for urgent maintenance.

use chrono::Days;
use tracing::{info, warn};

use crate::analyzers::AnalyticsContext;
use crate::analyzers::prediction::{INSPECTION_COST, MaintenancePredictor};
use crate::analyzers::types::{AlertSweep, MaintenanceAlert, Priority, SkippedItem};
use crate::error::Result;

/// High-priority predictions become alerts when due within this many days.
const HIGH_PRIORITY_WINDOW_DAYS: u64 = 7;
const INSPECTION_PERIOD_DAYS: i64 = 365;

pub struct AlertGenerator<'a> {
    ctx: AnalyticsContext<'a>,
}

impl<'a> AlertGenerator<'a> {
    pub fn new(ctx: AnalyticsContext<'a>) -> Self {
        Self { ctx }
    }

    /// Scans every vehicle and returns alerts ordered by severity (most
    /// severe first), then due date.
    ///
    /// A vehicle whose predictions fail is skipped and listed in
    /// [`AlertSweep::skipped`]; the remaining vehicles are still scanned.
    #[tracing::instrument(skip(self))]
    pub fn sweep_all(&self) -> Result<AlertSweep> {
        let today = self.ctx.clock.today();
        let horizon = today + Days::new(HIGH_PRIORITY_WINDOW_DAYS);
        let predictor = MaintenancePredictor::new(self.ctx);

        let mut sweep = AlertSweep::default();

        for vehicle in self.ctx.data.vehicles()? {
            let predictions = match predictor.predict_for(&vehicle) {
                Ok(predictions) => predictions,
                Err(e) => {
                    warn!(vehicle_id = vehicle.id, error = %e, "Skipping vehicle in alert sweep");
                    sweep.skipped.push(SkippedItem {
                        id: Some(vehicle.id),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for p in predictions {
                let urgent = p.priority == Priority::Critical
                    || (p.priority == Priority::High && p.predicted_date <= horizon);
                if urgent {
                    sweep.alerts.push(MaintenanceAlert {
                        vehicle_id: vehicle.id,
                        severity: p.priority,
                        message: format!("{}: {}", p.maintenance_type, p.reason),
                        due_date: p.predicted_date,
                        estimated_cost: p.estimated_cost,
                    });
                }
            }

            if let Some(last) = vehicle.last_inspection_date {
                let days_since = (today - last).num_days();
                if days_since > INSPECTION_PERIOD_DAYS {
                    sweep.alerts.push(MaintenanceAlert {
                        vehicle_id: vehicle.id,
                        severity: Priority::Critical,
                        message: format!(
                            "Annual inspection overdue by {} days",
                            days_since - INSPECTION_PERIOD_DAYS
                        ),
                        due_date: last + Days::new(INSPECTION_PERIOD_DAYS as u64),
                        estimated_cost: INSPECTION_COST,
                    });
                }
            }
        }

        sweep.alerts.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.due_date.cmp(&b.due_date))
        });

        info!(
            alerts = sweep.alerts.len(),
            skipped = sweep.skipped.len(),
            "Alert sweep complete"
        );

        Ok(sweep)
    }
}
