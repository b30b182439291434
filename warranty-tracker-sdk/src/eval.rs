use crate::basis::WarrantyBasis;
use crate::error::{Error, Result};
use crate::period::{PeriodDefinition, PeriodKind, Schedule};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Ordered so that a period only ever moves forward: `NotStarted < Active < Expired`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodState {
    NotStarted,
    Active,
    Expired,
}

impl PeriodState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodState::NotStarted => "not_started",
            PeriodState::Active => "active",
            PeriodState::Expired => "expired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeriodState::NotStarted => "Not started",
            PeriodState::Active => "Active",
            PeriodState::Expired => "Expired",
        }
    }
}

impl fmt::Display for PeriodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStatus {
    pub kind: PeriodKind,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub duration_days: u32,
    pub state: PeriodState,
    /// Whole elapsed days over the duration, so 0 for the first day of an active period.
    pub progress_percent: f64,
    /// Whole days left until `end_date`, rounded up. Zero unless active.
    pub remaining_days: i64,
    /// Whole days left until `start_date`, rounded up. Zero unless not started.
    pub days_until_start: i64,
}

impl PeriodStatus {
    pub fn is_active(&self) -> bool {
        self.state == PeriodState::Active
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyReport {
    pub evaluated_at: DateTime<Utc>,
    pub manufacturing: PeriodStatus,
    pub replacement: PeriodStatus,
    pub maintenance1: PeriodStatus,
    pub maintenance2: PeriodStatus,
}

impl WarrantyReport {
    /// Periods in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &PeriodStatus> {
        [
            &self.manufacturing,
            &self.replacement,
            &self.maintenance1,
            &self.maintenance2,
        ]
        .into_iter()
    }

    pub fn get(&self, kind: PeriodKind) -> &PeriodStatus {
        match kind {
            PeriodKind::Manufacturing => &self.manufacturing,
            PeriodKind::Replacement => &self.replacement,
            PeriodKind::Maintenance1 => &self.maintenance1,
            PeriodKind::Maintenance2 => &self.maintenance2,
        }
    }

    pub fn any_active(&self) -> bool {
        self.iter().any(PeriodStatus::is_active)
    }

    /// Earliest instant after `evaluated_at` at which some period changes state.
    pub fn next_transition(&self) -> Option<DateTime<Utc>> {
        self.iter()
            .flat_map(|p| [p.start_date, p.end_date])
            .filter(|at| *at > self.evaluated_at)
            .min()
    }
}

fn days_rounded_up(span: Duration) -> i64 {
    let days = span.num_days();
    if span > Duration::days(days) {
        days + 1
    } else {
        days
    }
}

/// Classifies one period window anchored at `anchor` as seen from `now`.
pub fn evaluate_period(
    definition: &PeriodDefinition,
    anchor: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<PeriodStatus> {
    let end_date = anchor
        .checked_add_signed(definition.duration())
        .ok_or_else(|| {
            Error::DateOutOfRange(format!(
                "{} starting {} does not end within the supported calendar",
                definition.kind, anchor
            ))
        })?;

    let (state, progress_percent, remaining_days, days_until_start) = if now < anchor {
        (PeriodState::NotStarted, 0.0, 0, days_rounded_up(anchor - now))
    } else if now >= end_date {
        (PeriodState::Expired, 100.0, 0, 0)
    } else {
        let elapsed_days = (now - anchor).num_days();
        let progress =
            (elapsed_days as f64 / f64::from(definition.duration_days) * 100.0).min(100.0);
        (
            PeriodState::Active,
            progress,
            days_rounded_up(end_date - now).max(0),
            0,
        )
    };

    debug!(
        period = %definition.kind,
        %state,
        progress = progress_percent,
        remaining_days,
        days_until_start,
        "evaluated warranty period"
    );

    Ok(PeriodStatus {
        kind: definition.kind,
        start_date: anchor,
        end_date,
        duration_days: definition.duration_days,
        state,
        progress_percent,
        remaining_days,
        days_until_start,
    })
}

impl Schedule {
    pub fn evaluate(&self, basis: &WarrantyBasis) -> Result<WarrantyReport> {
        let now = basis.now;
        let from_inspection =
            |kind: PeriodKind| evaluate_period(self.get(kind), basis.start_date, now);

        let manufacturing = from_inspection(PeriodKind::Manufacturing)?;
        let replacement = from_inspection(PeriodKind::Replacement)?;
        let maintenance1 = from_inspection(PeriodKind::Maintenance1)?;
        // Chained to the scheduled end of cycle 1, whatever state cycle 1 is in.
        let maintenance2 = evaluate_period(
            self.get(PeriodKind::Maintenance2),
            maintenance1.end_date,
            now,
        )?;

        Ok(WarrantyReport {
            evaluated_at: now,
            manufacturing,
            replacement,
            maintenance1,
            maintenance2,
        })
    }
}

pub fn compute_all(schedule: &Schedule, basis: &WarrantyBasis) -> Result<WarrantyReport> {
    schedule.evaluate(basis)
}

/// [`compute_all`] against the standard 180/14/180/180-day schedule.
pub fn compute_standard(basis: &WarrantyBasis) -> Result<WarrantyReport> {
    Schedule::standard().evaluate(basis)
}
