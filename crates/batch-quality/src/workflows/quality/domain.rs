use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Manufacture date used when a snapshot omits one.
pub const DEFAULT_MANUFACTURE_DATE: (i32, u32, u32) = (2000, 1, 1);
/// Expiry date used when a snapshot omits one.
pub const DEFAULT_EXPIRY_DATE: (i32, u32, u32) = (2100, 1, 1);

fn sentinel((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

pub fn default_manufacture_date() -> NaiveDate {
    sentinel(DEFAULT_MANUFACTURE_DATE)
}

pub fn default_expiry_date() -> NaiveDate {
    sentinel(DEFAULT_EXPIRY_DATE)
}

fn unknown_inspector() -> String {
    "Unknown".to_string()
}

/// The five raw readings every derivation is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurements {
    pub temperature: f64,
    pub humidity: f64,
    pub ph_level: f64,
    pub contaminant_level: f64,
    pub active_ingredient_purity: f64,
}

/// Caller-authored portion of a batch record. Derived fields live in
/// [`DerivedQuality`] and are never accepted from callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub batch_number: String,
    pub name: String,
    pub quantity: u32,
    #[serde(flatten)]
    pub measurements: Measurements,
    pub manufacture_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub accepted_or_rejected: String,
    pub supplier: String,
    pub manufacturer: String,
    pub category: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "unknown_inspector")]
    pub inspected_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl BatchRecord {
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    pub fn days_since_manufacture(&self, today: NaiveDate) -> i64 {
        (today - self.manufacture_date).num_days()
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.days_until_expiry(today) < 0
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted_or_rejected.trim().eq_ignore_ascii_case("accepted")
    }

    pub fn is_rejected(&self) -> bool {
        self.accepted_or_rejected.trim().eq_ignore_ascii_case("rejected")
    }
}

/// Inbound payload from manual entry or bulk import. Missing numbers read as
/// `0.0` and missing dates fall back to the far-past/far-future sentinels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub batch_number: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub ph_level: Option<f64>,
    #[serde(default)]
    pub contaminant_level: Option<f64>,
    #[serde(default)]
    pub active_ingredient_purity: Option<f64>,
    #[serde(default)]
    pub manufacture_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub accepted_or_rejected: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub inspected_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl BatchSnapshot {
    pub fn into_record(self) -> BatchRecord {
        fn text(value: Option<String>, fallback: &str) -> String {
            value
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        }

        BatchRecord {
            batch_number: self.batch_number.trim().to_string(),
            name: text(self.name, "Unknown"),
            quantity: self.quantity.unwrap_or(0),
            measurements: Measurements {
                temperature: self.temperature.unwrap_or(0.0),
                humidity: self.humidity.unwrap_or(0.0),
                ph_level: self.ph_level.unwrap_or(0.0),
                contaminant_level: self.contaminant_level.unwrap_or(0.0),
                active_ingredient_purity: self.active_ingredient_purity.unwrap_or(0.0),
            },
            manufacture_date: self
                .manufacture_date
                .unwrap_or_else(default_manufacture_date),
            expiry_date: self.expiry_date.unwrap_or_else(default_expiry_date),
            accepted_or_rejected: text(self.accepted_or_rejected, "Unknown"),
            supplier: text(self.supplier, "Unknown"),
            manufacturer: text(self.manufacturer, "Unknown"),
            category: text(self.category, "General"),
            price: self.price.unwrap_or(0.0),
            inspected_by: text(self.inspected_by, "Unknown"),
            created_at: self.created_at,
        }
    }
}

/// Letter bucket of the quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityGrade {
    A,
    B,
    C,
    D,
    F,
}

impl QualityGrade {
    pub const fn ordered() -> [Self; 5] {
        [Self::A, Self::B, Self::C, Self::D, Self::F]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    pub const fn status(self) -> QualityStatus {
        match self {
            Self::A => QualityStatus::Excellent,
            Self::B => QualityStatus::Good,
            Self::C => QualityStatus::Fair,
            Self::D => QualityStatus::Poor,
            Self::F => QualityStatus::Failed,
        }
    }
}

impl FromStr for QualityGrade {
    type Err = LabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "F" => Ok(Self::F),
            other => Err(LabelError::Grade(other.to_string())),
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-facing label paired one-to-one with [`QualityGrade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Failed,
}

impl QualityStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Excellent,
            Self::Good,
            Self::Fair,
            Self::Poor,
            Self::Failed,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Active,
    Expired,
    Quarantine,
}

impl BatchStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Active, Self::Expired, Self::Quarantine]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Quarantine => "quarantine",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse bucket of the remaining shelf life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryBucket {
    Expired,
    Urgent,
    Warning,
    Safe,
}

impl ExpiryBucket {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Urgent => "urgent",
            Self::Warning => "warning",
            Self::Safe => "safe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Temperature,
    Humidity,
    Contamination,
    Purity,
    #[serde(rename = "phLevel")]
    PhLevel,
}

impl AlertType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Temperature,
            Self::Humidity,
            Self::Contamination,
            Self::Purity,
            Self::PhLevel,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Contamination => "contamination",
            Self::Purity => "purity",
            Self::PhLevel => "phLevel",
        }
    }
}

impl FromStr for AlertType {
    type Err = LabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.label() == value.trim())
            .ok_or_else(|| LabelError::AlertType(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl FromStr for AlertSeverity {
    type Err = LabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            other => Err(LabelError::Severity(other.to_string())),
        }
    }
}

/// Boundary that an alert crossed. pH alerts carry the whole accepted band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlertThreshold {
    Limit(f64),
    Band(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub value: f64,
    pub threshold: AlertThreshold,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn is_critical(&self) -> bool {
        self.severity == AlertSeverity::Critical
    }
}

/// Everything the engine computes for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedQuality {
    pub quality_score: f64,
    pub quality_grade: QualityGrade,
    pub quality_status: QualityStatus,
    pub alerts: Vec<Alert>,
    pub status: BatchStatus,
}

impl DerivedQuality {
    pub fn critical_alerts(&self) -> usize {
        self.alerts.iter().filter(|alert| alert.is_critical()).count()
    }
}

/// A record together with its derived fields, as held by the store and
/// consumed by reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessedBatch {
    #[serde(flatten)]
    pub record: BatchRecord,
    #[serde(flatten)]
    pub derived: DerivedQuality,
}

/// Rejection of a request parameter that does not name a known label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    #[error("invalid grade '{0}': expected one of A, B, C, D, F")]
    Grade(String),
    #[error("invalid severity '{0}': expected warning or critical")]
    Severity(String),
    #[error(
        "invalid alert type '{0}': expected temperature, humidity, contamination, purity or phLevel"
    )]
    AlertType(String),
}
