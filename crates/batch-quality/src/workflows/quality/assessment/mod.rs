mod alerts;
mod expiry;
mod grading;
mod scoring;
mod status;

pub use alerts::generate_alerts;
pub use expiry::{classify_days, expiry_bucket};
pub use grading::{classify, grade_for};
pub use scoring::{quality_score, score_components, ScoreComponent, ScoreFactor};
pub use status::{
    resolve_status, StatusInputs, QUARANTINE_CONTAMINANT_PPM, QUARANTINE_SCORE_FLOOR,
};

pub(crate) use scoring::round2;

use super::domain::{AssessedBatch, BatchRecord, DerivedQuality};
use chrono::{DateTime, Local, NaiveDate, Utc};

/// Stateless evaluator pinned to a reference date. Every derivation is a pure
/// function of the record and that date, so re-running it on an unchanged
/// record yields the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityEngine {
    today: NaiveDate,
    generated_at: DateTime<Utc>,
}

impl QualityEngine {
    pub fn new(today: NaiveDate, generated_at: DateTime<Utc>) -> Self {
        Self {
            today,
            generated_at,
        }
    }

    /// Engine for the current local date.
    pub fn current() -> Self {
        Self::new(Local::now().date_naive(), Utc::now())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn derive(&self, record: &BatchRecord) -> DerivedQuality {
        let measurements = &record.measurements;
        let quality_score = quality_score(measurements);
        let alerts = generate_alerts(measurements, self.generated_at);
        let (quality_grade, quality_status) = classify(quality_score);
        let status = resolve_status(StatusInputs {
            days_until_expiry: record.days_until_expiry(self.today),
            quality_score,
            alerts: &alerts,
            contaminant_level: measurements.contaminant_level,
        });

        DerivedQuality {
            quality_score,
            quality_grade,
            quality_status,
            alerts,
            status,
        }
    }

    pub fn assess(&self, record: BatchRecord) -> AssessedBatch {
        let derived = self.derive(&record);
        AssessedBatch { record, derived }
    }

    /// Derives every record of a working set so reports can aggregate in
    /// memory. Records carry no cross-record dependencies.
    pub fn materialize<I>(&self, records: I) -> Vec<AssessedBatch>
    where
        I: IntoIterator<Item = BatchRecord>,
    {
        records.into_iter().map(|record| self.assess(record)).collect()
    }
}
