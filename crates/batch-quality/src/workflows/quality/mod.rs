//! Batch quality assessment: scoring, alerting, lifecycle status derivation,
//! and the dashboard aggregations built on top of them.
//!
//! Records flow through a two-phase pipeline. The [`QualityEngine`] derives
//! `{score, grade, status label, alerts, status}` from a snapshot, then the
//! service hands the result to the [`RecordStore`] in a single write. Reports
//! re-derive the working set in memory before aggregating.

pub mod assessment;
pub mod domain;
pub mod report;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use assessment::{QualityEngine, ScoreComponent, ScoreFactor};
pub use domain::{
    Alert, AlertSeverity, AlertThreshold, AlertType, AssessedBatch, BatchRecord, BatchSnapshot,
    BatchStatus, DerivedQuality, ExpiryBucket, LabelError, Measurements, QualityGrade,
    QualityStatus,
};
pub use report::{parse_alert_filter, QualityReport, ReportError};
pub use router::quality_router;
pub use service::{BatchQualityService, QualityServiceError, RefreshSummary, StatusShare};
pub use store::{RecordStore, RecordStoreError};
