use super::super::domain::{Alert, BatchStatus};

/// Contaminant level (ppm) above which a batch is held regardless of alerts.
/// Independent of the 0.1/10 ppm alert tiers.
pub const QUARANTINE_CONTAMINANT_PPM: f64 = 1.0;

/// Minimum score for a batch to stay in circulation.
pub const QUARANTINE_SCORE_FLOOR: f64 = 60.0;

/// Inputs the lifecycle status is resolved from. The previous status is not
/// one of them.
#[derive(Debug, Clone, Copy)]
pub struct StatusInputs<'a> {
    pub days_until_expiry: i64,
    pub quality_score: f64,
    pub alerts: &'a [Alert],
    pub contaminant_level: f64,
}

/// First matching rule wins: expiry, then score floor, then critical alerts,
/// then the contaminant guard.
pub fn resolve_status(inputs: StatusInputs<'_>) -> BatchStatus {
    if inputs.days_until_expiry < 0 {
        return BatchStatus::Expired;
    }

    if inputs.quality_score < QUARANTINE_SCORE_FLOOR {
        return BatchStatus::Quarantine;
    }

    if inputs.alerts.iter().any(Alert::is_critical) {
        return BatchStatus::Quarantine;
    }

    if inputs.contaminant_level > QUARANTINE_CONTAMINANT_PPM {
        return BatchStatus::Quarantine;
    }

    BatchStatus::Active
}
