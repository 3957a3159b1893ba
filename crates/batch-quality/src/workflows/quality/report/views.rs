use super::super::assessment::ScoreComponent;
use super::super::domain::{
    Alert, AlertSeverity, AlertType, BatchStatus, ExpiryBucket, QualityGrade, QualityStatus,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreEntry {
    pub batch_number: String,
    pub name: String,
    pub supplier: String,
    pub quality_score: f64,
    pub quality_grade: QualityGrade,
    pub quality_status: QualityStatus,
    pub status: BatchStatus,
    pub alert_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityStatistics {
    pub total_records: usize,
    pub average_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub grade_distribution: BTreeMap<QualityGrade, usize>,
    pub status_distribution: BTreeMap<QualityStatus, usize>,
    pub lifecycle_distribution: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeFilterView {
    pub grade: QualityGrade,
    pub quality_status: QualityStatus,
    pub count: usize,
    pub records: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DateWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionReason {
    pub reason: QualityStatus,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierAcceptance {
    pub supplier: String,
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub acceptance_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptanceReport {
    pub window: DateWindow,
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub acceptance_rate: f64,
    pub rejection_rate: f64,
    pub rejection_reasons: Vec<RejectionReason>,
    pub by_supplier: Vec<SupplierAcceptance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    pub total_alerts: usize,
    pub critical: usize,
    pub warning: usize,
    pub by_type: BTreeMap<&'static str, usize>,
    pub records_with_alerts: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertFilter {
    pub severity: Option<AlertSeverity>,
    pub kind: Option<AlertType>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertListEntry {
    pub batch_number: String,
    pub name: String,
    pub alerts: Vec<Alert>,
    pub alert_count: usize,
    pub critical_count: usize,
    pub warning_count: usize,
    pub quality_score: f64,
    pub quality_grade: QualityGrade,
}

/// Single-record view including the shelf-life helpers and score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchDetailView {
    #[serde(flatten)]
    pub batch: super::super::domain::AssessedBatch,
    pub days_until_expiry: i64,
    pub expiry_status: ExpiryBucket,
    pub is_expired: bool,
    pub days_since_manufacture: i64,
    pub score_breakdown: Vec<ScoreComponent>,
}
