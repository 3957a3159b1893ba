use super::super::assessment::round2;
use super::super::domain::{AssessedBatch, BatchStatus, QualityGrade, QualityStatus};
use super::views::{GradeFilterView, QualityStatistics, ScoreEntry};
use super::ReportError;
use std::cmp::Ordering;
use std::collections::BTreeMap;

impl AssessedBatch {
    pub fn score_entry(&self) -> ScoreEntry {
        ScoreEntry {
            batch_number: self.record.batch_number.clone(),
            name: self.record.name.clone(),
            supplier: self.record.supplier.clone(),
            quality_score: self.derived.quality_score,
            quality_grade: self.derived.quality_grade,
            quality_status: self.derived.quality_status,
            status: self.derived.status,
            alert_count: self.derived.alerts.len(),
        }
    }
}

pub(crate) fn scores(batches: &[AssessedBatch]) -> Vec<ScoreEntry> {
    batches.iter().map(AssessedBatch::score_entry).collect()
}

pub(crate) fn statistics(batches: &[AssessedBatch]) -> QualityStatistics {
    let mut grade_distribution: BTreeMap<QualityGrade, usize> = QualityGrade::ordered()
        .into_iter()
        .map(|grade| (grade, 0))
        .collect();
    let mut status_distribution: BTreeMap<QualityStatus, usize> = QualityStatus::ordered()
        .into_iter()
        .map(|status| (status, 0))
        .collect();
    let mut lifecycle_distribution: BTreeMap<&'static str, usize> = BatchStatus::ordered()
        .into_iter()
        .map(|status| (status.label(), 0))
        .collect();

    let mut total = 0.0;
    let mut min_score = f64::INFINITY;
    let mut max_score = f64::NEG_INFINITY;

    for batch in batches {
        let derived = &batch.derived;
        *grade_distribution.entry(derived.quality_grade).or_default() += 1;
        *status_distribution.entry(derived.quality_status).or_default() += 1;
        *lifecycle_distribution
            .entry(derived.status.label())
            .or_default() += 1;

        total += derived.quality_score;
        min_score = min_score.min(derived.quality_score);
        max_score = max_score.max(derived.quality_score);
    }

    let (average_score, min_score, max_score) = if batches.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        (round2(total / batches.len() as f64), min_score, max_score)
    };

    QualityStatistics {
        total_records: batches.len(),
        average_score,
        min_score,
        max_score,
        grade_distribution,
        status_distribution,
        lifecycle_distribution,
    }
}

/// Highest scores first. The sort is stable, so ties keep their input order.
pub(crate) fn top_performers(batches: &[AssessedBatch], limit: usize) -> Vec<ScoreEntry> {
    ranked(batches, limit, |a, b| {
        b.quality_score
            .partial_cmp(&a.quality_score)
            .unwrap_or(Ordering::Equal)
    })
}

/// Lowest scores first, ties in input order.
pub(crate) fn poor_performers(batches: &[AssessedBatch], limit: usize) -> Vec<ScoreEntry> {
    ranked(batches, limit, |a, b| {
        a.quality_score
            .partial_cmp(&b.quality_score)
            .unwrap_or(Ordering::Equal)
    })
}

fn ranked<F>(batches: &[AssessedBatch], limit: usize, order: F) -> Vec<ScoreEntry>
where
    F: Fn(&ScoreEntry, &ScoreEntry) -> Ordering,
{
    let mut entries = scores(batches);
    entries.sort_by(order);
    entries.truncate(limit);
    entries
}

pub(crate) fn by_grade(
    batches: &[AssessedBatch],
    grade: &str,
) -> Result<GradeFilterView, ReportError> {
    let grade: QualityGrade = grade.parse()?;
    let records: Vec<ScoreEntry> = batches
        .iter()
        .filter(|batch| batch.derived.quality_grade == grade)
        .map(AssessedBatch::score_entry)
        .collect();

    Ok(GradeFilterView {
        grade,
        quality_status: grade.status(),
        count: records.len(),
        records,
    })
}
