use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::assessment::{expiry_bucket, score_components, QualityEngine};
use super::domain::{
    Alert, AssessedBatch, BatchSnapshot, BatchStatus, DerivedQuality, QualityGrade,
};
use super::report::views::{
    AcceptanceReport, AlertListEntry, AlertSummary, BatchDetailView, DateWindow, GradeFilterView,
    QualityStatistics, ScoreEntry,
};
use super::report::{parse_alert_filter, QualityReport, ReportError};
use super::store::{RecordStore, RecordStoreError};
use crate::config::ReportingConfig;
use crate::workflows::import::{BatchImportError, BatchImporter, ImportSummary};

/// Share of the store in one lifecycle state after a refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: BatchStatus,
    pub count: usize,
    pub percentage: f64,
}

/// Outcome of re-deriving every stored record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshSummary {
    pub total: usize,
    /// Records whose derived fields changed (written unless `dry_run`).
    pub updated: usize,
    /// Records that moved into each status, keyed by the new status.
    pub status_changes: BTreeMap<&'static str, usize>,
    pub records_with_alerts: usize,
    pub total_alerts: usize,
    pub distribution: Vec<StatusShare>,
    pub dry_run: bool,
}

/// Service tying the quality engine to a record store: every write goes
/// through `derive` first and lands in a single store call.
pub struct BatchQualityService<S> {
    store: Arc<S>,
    reporting: ReportingConfig,
    reference: Option<QualityEngine>,
}

impl<S> BatchQualityService<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>, reporting: ReportingConfig) -> Self {
        Self {
            store,
            reporting,
            reference: None,
        }
    }

    /// Pins "today" and the alert timestamp instead of reading the clock.
    pub fn with_reference(mut self, today: NaiveDate, generated_at: DateTime<Utc>) -> Self {
        self.reference = Some(QualityEngine::new(today, generated_at));
        self
    }

    pub fn engine(&self) -> QualityEngine {
        self.reference.unwrap_or_else(QualityEngine::current)
    }

    /// Derives and stores a new batch.
    pub fn create(&self, snapshot: BatchSnapshot) -> Result<AssessedBatch, QualityServiceError> {
        if snapshot.batch_number.trim().is_empty() {
            return Err(QualityServiceError::MissingBatchNumber);
        }

        let engine = self.engine();
        let mut record = snapshot.into_record();
        if record.created_at.is_none() {
            record.created_at = Some(engine.generated_at());
        }

        let assessed = engine.assess(record);
        debug!(
            batch_number = %assessed.record.batch_number,
            quality_score = assessed.derived.quality_score,
            quality_grade = %assessed.derived.quality_grade,
            status = %assessed.derived.status,
            "batch assessed"
        );

        let stored = self.store.insert(assessed)?;
        Ok(stored)
    }

    /// Replaces the caller-authored fields of an existing batch and derives
    /// again. The path identifier wins over any number in the payload and the
    /// original creation time is kept unless the payload supplies one.
    pub fn replace(
        &self,
        batch_number: &str,
        mut snapshot: BatchSnapshot,
    ) -> Result<AssessedBatch, QualityServiceError> {
        let existing = self
            .store
            .fetch(batch_number)?
            .ok_or_else(|| RecordStoreError::NotFound(batch_number.to_string()))?;

        snapshot.batch_number = existing.record.batch_number.clone();
        let mut record = snapshot.into_record();
        if record.created_at.is_none() {
            record.created_at = existing.record.created_at;
        }

        let assessed = self.engine().assess(record);
        if assessed.derived.status != existing.derived.status {
            info!(
                batch_number = %assessed.record.batch_number,
                from = %existing.derived.status,
                to = %assessed.derived.status,
                "batch status changed"
            );
        }

        self.store.update(assessed.clone())?;
        Ok(assessed)
    }

    /// Fetches one batch, re-derived against today, with its shelf-life
    /// helpers and score breakdown.
    pub fn detail(&self, batch_number: &str) -> Result<BatchDetailView, QualityServiceError> {
        let stored = self
            .store
            .fetch(batch_number)?
            .ok_or_else(|| RecordStoreError::NotFound(batch_number.to_string()))?;

        let engine = self.engine();
        let today = engine.today();
        let batch = engine.assess(stored.record);
        let record = &batch.record;

        Ok(BatchDetailView {
            days_until_expiry: record.days_until_expiry(today),
            expiry_status: expiry_bucket(record, today),
            is_expired: record.is_expired(today),
            days_since_manufacture: record.days_since_manufacture(today),
            score_breakdown: score_components(&record.measurements).to_vec(),
            batch,
        })
    }

    pub fn delete(&self, batch_number: &str) -> Result<(), QualityServiceError> {
        self.store.delete(batch_number)?;
        info!(batch_number, "batch deleted");
        Ok(())
    }

    /// Lists batches, optionally narrowed to those whose name, supplier, or
    /// batch number contains `search` (case-insensitive).
    pub fn list(&self, search: Option<&str>) -> Result<Vec<AssessedBatch>, QualityServiceError> {
        let batches = self.working_set()?;
        let needle = match search.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw.to_lowercase(),
            None => return Ok(batches),
        };

        Ok(batches
            .into_iter()
            .filter(|batch| {
                let record = &batch.record;
                [&record.name, &record.supplier, &record.batch_number]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect())
    }

    /// Every stored record, derived afresh against today.
    pub fn working_set(&self) -> Result<Vec<AssessedBatch>, QualityServiceError> {
        let stored = self.store.scan()?;
        let engine = self.engine();
        Ok(engine.materialize(stored.into_iter().map(|batch| batch.record)))
    }

    pub fn scores(&self) -> Result<Vec<ScoreEntry>, QualityServiceError> {
        let batches = self.working_set()?;
        Ok(QualityReport::new(&batches).scores())
    }

    pub fn statistics(&self) -> Result<QualityStatistics, QualityServiceError> {
        let batches = self.working_set()?;
        Ok(QualityReport::new(&batches).statistics())
    }

    pub fn top_performers(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<ScoreEntry>, QualityServiceError> {
        let limit = limit.unwrap_or(self.reporting.performer_limit);
        let batches = self.working_set()?;
        Ok(QualityReport::new(&batches).top_performers(limit))
    }

    pub fn poor_performers(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<ScoreEntry>, QualityServiceError> {
        let limit = limit.unwrap_or(self.reporting.performer_limit);
        let batches = self.working_set()?;
        Ok(QualityReport::new(&batches).poor_performers(limit))
    }

    pub fn by_grade(&self, grade: &str) -> Result<GradeFilterView, QualityServiceError> {
        grade.parse::<QualityGrade>().map_err(ReportError::from)?;
        let batches = self.working_set()?;
        Ok(QualityReport::new(&batches).by_grade(grade)?)
    }

    pub fn acceptance_stats(
        &self,
        window: DateWindow,
    ) -> Result<AcceptanceReport, QualityServiceError> {
        window.validate()?;
        let batches = self.working_set()?;
        Ok(QualityReport::new(&batches).acceptance_stats(window)?)
    }

    pub fn alerts_count(&self) -> Result<AlertSummary, QualityServiceError> {
        let batches = self.working_set()?;
        Ok(QualityReport::new(&batches).alerts_count())
    }

    pub fn alerts_list(
        &self,
        severity: Option<&str>,
        kind: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<AlertListEntry>, QualityServiceError> {
        let filter = parse_alert_filter(severity, kind, limit)?;
        let batches = self.working_set()?;
        Ok(QualityReport::new(&batches).alerts_list(filter))
    }

    /// Imports CSV rows through [`Self::create`]; failing rows are reported
    /// in the summary rather than aborting the import.
    pub fn import_csv<R: Read>(&self, reader: R) -> Result<ImportSummary, QualityServiceError> {
        let importer = BatchImporter::new(self.reporting.import_error_limit);
        let summary = importer.from_reader(reader, |snapshot| self.import_row(snapshot))?;
        info!(
            imported = summary.imported,
            failed = summary.failed,
            "batch import complete"
        );
        Ok(summary)
    }

    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<ImportSummary, QualityServiceError> {
        let importer = BatchImporter::new(self.reporting.import_error_limit);
        let summary = importer.from_path(path, |snapshot| self.import_row(snapshot))?;
        info!(
            imported = summary.imported,
            failed = summary.failed,
            "batch import complete"
        );
        Ok(summary)
    }

    fn import_row(&self, snapshot: BatchSnapshot) -> Result<(), String> {
        self.create(snapshot)
            .map(|_| ())
            .map_err(|error| error.to_string())
    }

    /// Re-derives every stored record against today. Records whose derived
    /// fields changed are written back through `update` unless `dry_run`.
    pub fn refresh(&self, dry_run: bool) -> Result<RefreshSummary, QualityServiceError> {
        let stored = self.store.scan()?;
        let engine = self.engine();
        let total = stored.len();
        let interval = self.reporting.refresh_progress_interval;

        info!(total, dry_run, "refreshing batch statuses");

        let mut updated = 0;
        let mut status_changes: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut records_with_alerts = 0;
        let mut total_alerts = 0;
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();

        for (index, previous) in stored.into_iter().enumerate() {
            let fresh = engine.assess(previous.record.clone());

            total_alerts += fresh.derived.alerts.len();
            if !fresh.derived.alerts.is_empty() {
                records_with_alerts += 1;
            }
            *counts.entry(fresh.derived.status.label()).or_default() += 1;

            if fresh.derived.status != previous.derived.status {
                debug!(
                    batch_number = %fresh.record.batch_number,
                    from = %previous.derived.status,
                    to = %fresh.derived.status,
                    "status change"
                );
                *status_changes.entry(fresh.derived.status.label()).or_default() += 1;
            }

            if !same_assessment(&previous.derived, &fresh.derived) {
                updated += 1;
                if !dry_run {
                    self.store.update(fresh)?;
                }
            }

            let processed = index + 1;
            if reports_progress(processed, total, interval) {
                info!(processed, total, "refresh progress");
            }
        }

        let distribution = BatchStatus::ordered()
            .into_iter()
            .map(|status| {
                let count = counts.get(status.label()).copied().unwrap_or(0);
                StatusShare {
                    status,
                    count,
                    percentage: percentage(count, total),
                }
            })
            .collect();

        info!(
            total,
            updated,
            records_with_alerts,
            total_alerts,
            dry_run,
            "refresh complete"
        );

        Ok(RefreshSummary {
            total,
            updated,
            status_changes,
            records_with_alerts,
            total_alerts,
            distribution,
            dry_run,
        })
    }
}

/// Progress is logged every `interval` records and once more for the final
/// partial chunk.
pub(super) fn reports_progress(processed: usize, total: usize, interval: usize) -> bool {
    interval > 0 && (processed % interval == 0 || processed == total)
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64 * 1000.0).round() / 10.0
    }
}

/// Compares two derivations ignoring when their alerts were generated.
fn same_assessment(left: &DerivedQuality, right: &DerivedQuality) -> bool {
    fn same_alert(left: &Alert, right: &Alert) -> bool {
        left.kind == right.kind
            && left.severity == right.severity
            && left.value == right.value
            && left.threshold == right.threshold
    }

    left.quality_score == right.quality_score
        && left.quality_grade == right.quality_grade
        && left.quality_status == right.quality_status
        && left.status == right.status
        && left.alerts.len() == right.alerts.len()
        && left
            .alerts
            .iter()
            .zip(&right.alerts)
            .all(|(left, right)| same_alert(left, right))
}

/// Error raised by the quality service.
#[derive(Debug, thiserror::Error)]
pub enum QualityServiceError {
    #[error("batch_number is required")]
    MissingBatchNumber,
    #[error(transparent)]
    Store(#[from] RecordStoreError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Import(#[from] BatchImportError),
}
