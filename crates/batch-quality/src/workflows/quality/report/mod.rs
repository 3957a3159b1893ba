//! Aggregations over a materialized working set. Every call recomputes from
//! the batches it is handed; nothing is cached between calls.

mod acceptance;
mod alerts;
mod statistics;
pub mod views;

use super::domain::{AlertSeverity, AlertType, AssessedBatch, LabelError};
use views::{
    AcceptanceReport, AlertFilter, AlertListEntry, AlertSummary, DateWindow, GradeFilterView,
    QualityStatistics, ScoreEntry,
};

/// Request-level failures raised before any aggregation runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    InvalidParameter(#[from] LabelError),
    #[error("date_from {from} is after date_to {to}")]
    InvertedWindow {
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    },
}

/// Read-only view over assessed batches exposing the dashboard aggregates.
#[derive(Debug, Clone, Copy)]
pub struct QualityReport<'a> {
    batches: &'a [AssessedBatch],
}

impl<'a> QualityReport<'a> {
    pub fn new(batches: &'a [AssessedBatch]) -> Self {
        Self { batches }
    }

    pub fn scores(&self) -> Vec<ScoreEntry> {
        statistics::scores(self.batches)
    }

    pub fn statistics(&self) -> QualityStatistics {
        statistics::statistics(self.batches)
    }

    pub fn top_performers(&self, limit: usize) -> Vec<ScoreEntry> {
        statistics::top_performers(self.batches, limit)
    }

    pub fn poor_performers(&self, limit: usize) -> Vec<ScoreEntry> {
        statistics::poor_performers(self.batches, limit)
    }

    /// Fails for anything other than exactly `A`, `B`, `C`, `D`, or `F`.
    pub fn by_grade(&self, grade: &str) -> Result<GradeFilterView, ReportError> {
        statistics::by_grade(self.batches, grade)
    }

    pub fn acceptance_stats(&self, window: DateWindow) -> Result<AcceptanceReport, ReportError> {
        window.validate()?;
        Ok(acceptance::acceptance_stats(self.batches, window))
    }

    pub fn alerts_count(&self) -> AlertSummary {
        alerts::alerts_count(self.batches)
    }

    pub fn alerts_list(&self, filter: AlertFilter) -> Vec<AlertListEntry> {
        alerts::alerts_list(self.batches, filter)
    }
}

impl DateWindow {
    /// Rejects a window whose start falls after its end.
    pub fn validate(&self) -> Result<(), ReportError> {
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) if from > to => Err(ReportError::InvertedWindow { from, to }),
            _ => Ok(()),
        }
    }
}

/// Builds an [`AlertFilter`] from raw query parameters. Blank values are
/// treated as absent.
pub fn parse_alert_filter(
    severity: Option<&str>,
    kind: Option<&str>,
    limit: Option<usize>,
) -> Result<AlertFilter, ReportError> {
    fn present(value: Option<&str>) -> Option<&str> {
        value.filter(|raw| !raw.trim().is_empty())
    }

    let severity = present(severity)
        .map(str::parse::<AlertSeverity>)
        .transpose()?;
    let kind = present(kind).map(str::parse::<AlertType>).transpose()?;

    Ok(AlertFilter {
        severity,
        kind,
        limit,
    })
}
