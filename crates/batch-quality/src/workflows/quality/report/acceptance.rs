use super::super::assessment::round2;
use super::super::domain::{AssessedBatch, QualityStatus};
use super::views::{AcceptanceReport, DateWindow, RejectionReason, SupplierAcceptance};
use chrono::Duration;
use std::cmp::Ordering;
use std::collections::BTreeMap;

const REJECTION_REASON_LIMIT: usize = 5;

fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 / total as f64 * 100.0)
    }
}

impl DateWindow {
    pub fn is_bounded(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    /// `date_to` is inclusive: a record created at any time on that day
    /// matches. Unbounded windows match records without a creation time.
    pub fn contains(&self, batch: &AssessedBatch) -> bool {
        if !self.is_bounded() {
            return true;
        }

        let Some(created) = batch.record.created_at.map(|at| at.naive_utc()) else {
            return false;
        };

        let after_start = self
            .date_from
            .and_then(|from| from.and_hms_opt(0, 0, 0))
            .map_or(true, |start| created >= start);
        let before_end = self
            .date_to
            .and_then(|to| to.checked_add_signed(Duration::days(1)))
            .and_then(|end| end.and_hms_opt(0, 0, 0))
            .map_or(true, |end| created < end);

        after_start && before_end
    }
}

#[derive(Default)]
struct Tally {
    total: usize,
    accepted: usize,
    rejected: usize,
}

impl Tally {
    fn record(&mut self, batch: &AssessedBatch) {
        self.total += 1;
        if batch.record.is_accepted() {
            self.accepted += 1;
        } else if batch.record.is_rejected() {
            self.rejected += 1;
        }
    }
}

pub(crate) fn acceptance_stats(batches: &[AssessedBatch], window: DateWindow) -> AcceptanceReport {
    let mut overall = Tally::default();
    let mut suppliers: BTreeMap<&str, Tally> = BTreeMap::new();
    let mut reasons: BTreeMap<QualityStatus, usize> = BTreeMap::new();

    for batch in batches.iter().filter(|batch| window.contains(batch)) {
        overall.record(batch);
        suppliers
            .entry(batch.record.supplier.as_str())
            .or_default()
            .record(batch);
        if batch.record.is_rejected() {
            *reasons.entry(batch.derived.quality_status).or_default() += 1;
        }
    }

    // BTreeMap iteration already follows Excellent..Failed, so the stable
    // sort keeps that order between equal counts.
    let mut rejection_reasons: Vec<RejectionReason> = reasons
        .into_iter()
        .map(|(reason, count)| RejectionReason {
            reason,
            count,
            percentage: rate(count, overall.rejected),
        })
        .collect();
    rejection_reasons.sort_by(|a, b| b.count.cmp(&a.count));
    rejection_reasons.truncate(REJECTION_REASON_LIMIT);

    let mut by_supplier: Vec<SupplierAcceptance> = suppliers
        .into_iter()
        .map(|(supplier, tally)| SupplierAcceptance {
            supplier: supplier.to_string(),
            total: tally.total,
            accepted: tally.accepted,
            rejected: tally.rejected,
            acceptance_rate: rate(tally.accepted, tally.total),
        })
        .collect();
    by_supplier.sort_by(|a, b| {
        b.acceptance_rate
            .partial_cmp(&a.acceptance_rate)
            .unwrap_or(Ordering::Equal)
    });

    AcceptanceReport {
        window,
        total: overall.total,
        accepted: overall.accepted,
        rejected: overall.rejected,
        acceptance_rate: rate(overall.accepted, overall.total),
        rejection_rate: rate(overall.rejected, overall.total),
        rejection_reasons,
        by_supplier,
    }
}
