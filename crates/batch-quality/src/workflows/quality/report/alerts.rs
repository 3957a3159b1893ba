use super::super::domain::{Alert, AlertSeverity, AlertType, AssessedBatch};
use super::views::{AlertFilter, AlertListEntry, AlertSummary};
use std::collections::BTreeMap;

pub(crate) fn alerts_count(batches: &[AssessedBatch]) -> AlertSummary {
    let mut by_type: BTreeMap<&'static str, usize> = AlertType::ordered()
        .into_iter()
        .map(|kind| (kind.label(), 0))
        .collect();
    let mut summary = AlertSummary {
        total_alerts: 0,
        critical: 0,
        warning: 0,
        by_type: BTreeMap::new(),
        records_with_alerts: 0,
    };

    for batch in batches {
        let alerts = &batch.derived.alerts;
        if !alerts.is_empty() {
            summary.records_with_alerts += 1;
        }
        for alert in alerts {
            summary.total_alerts += 1;
            match alert.severity {
                AlertSeverity::Critical => summary.critical += 1,
                AlertSeverity::Warning => summary.warning += 1,
            }
            *by_type.entry(alert.kind.label()).or_default() += 1;
        }
    }

    summary.by_type = by_type;
    summary
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        self.severity.map_or(true, |severity| alert.severity == severity)
            && self.kind.map_or(true, |kind| alert.kind == kind)
    }
}

/// Records with at least one alert passing the filter, most critical first.
pub(crate) fn alerts_list(batches: &[AssessedBatch], filter: AlertFilter) -> Vec<AlertListEntry> {
    let mut entries: Vec<AlertListEntry> = batches
        .iter()
        .filter_map(|batch| {
            let alerts: Vec<Alert> = batch
                .derived
                .alerts
                .iter()
                .filter(|alert| filter.matches(alert))
                .cloned()
                .collect();
            if alerts.is_empty() {
                return None;
            }

            let critical_count = alerts.iter().filter(|alert| alert.is_critical()).count();
            Some(AlertListEntry {
                batch_number: batch.record.batch_number.clone(),
                name: batch.record.name.clone(),
                alert_count: alerts.len(),
                critical_count,
                warning_count: alerts.len() - critical_count,
                alerts,
                quality_score: batch.derived.quality_score,
                quality_grade: batch.derived.quality_grade,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        (b.critical_count, b.alert_count).cmp(&(a.critical_count, a.alert_count))
    });

    if let Some(limit) = filter.limit {
        entries.truncate(limit);
    }

    entries
}
