use crate::infra::{quality_service, resolve_today, InMemoryRecordStore};
use crate::routes::{build_dashboard, QualityDashboard};
use batch_quality::config::{AppConfig, ReportingConfig};
use batch_quality::error::AppError;
use batch_quality::telemetry;
use batch_quality::workflows::import::ImportSummary;
use batch_quality::workflows::quality::report::views::{DateWindow, ScoreEntry};
use batch_quality::workflows::quality::{BatchSnapshot, QualityServiceError, RefreshSummary};
use chrono::{Duration, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Batch CSV export to assess
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Evaluation date for expiry and status (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Start of the acceptance window (YYYY-MM-DD, inclusive)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date_from: Option<NaiveDate>,
    /// End of the acceptance window (YYYY-MM-DD, inclusive)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date_to: Option<NaiveDate>,
    /// Length of the performer lists (defaults to APP_PERFORMER_LIMIT)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Print every critical alert message
    #[arg(long)]
    pub(crate) list_alerts: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RefreshArgs {
    /// Batch CSV export to load
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Date the export was originally assessed on (defaults to --today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) assessed_on: Option<NaiveDate>,
    /// Date to refresh statuses against (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Compute changes without writing them back
    #[arg(long)]
    pub(crate) dry_run: bool,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        csv,
        today,
        date_from,
        date_to,
        limit,
        list_alerts,
    } = args;

    let config = AppConfig::load()?;
    let window = DateWindow { date_from, date_to };
    window.validate().map_err(QualityServiceError::from)?;

    let today = resolve_today(today);
    let service = quality_service(Arc::default(), config.reporting, Some(today));
    let import = service.import_path(&csv)?;
    let dashboard = build_dashboard(&service, today, import, window, limit)?;

    println!("Batch quality report for {}", csv.display());
    render_dashboard(&dashboard, list_alerts);
    Ok(())
}

pub(crate) fn run_refresh(args: RefreshArgs) -> Result<(), AppError> {
    let RefreshArgs {
        csv,
        assessed_on,
        today,
        dry_run,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let today = resolve_today(today);
    let assessed_on = assessed_on.unwrap_or(today);
    let store = Arc::new(InMemoryRecordStore::default());

    let intake = quality_service(store.clone(), config.reporting.clone(), Some(assessed_on));
    let import = intake.import_path(&csv)?;
    println!(
        "Loaded {} batches from {} as assessed on {} ({} rows rejected)",
        import.imported,
        csv.display(),
        assessed_on,
        import.failed
    );
    render_import_errors(&import);

    let service = quality_service(store, config.reporting, Some(today));
    let summary = service.refresh(dry_run)?;
    println!("\nStatus refresh as of {today}");
    render_refresh(&summary);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = resolve_today(args.today);
    let store = Arc::new(InMemoryRecordStore::default());
    let service = quality_service(store.clone(), ReportingConfig::default(), Some(today));

    println!("Batch quality demo ({today})");
    let mut imported = 0;
    for snapshot in sample_batches(today) {
        match service.create(snapshot) {
            Ok(batch) => {
                imported += 1;
                println!(
                    "- {} {} -> score {:.2} grade {} ({}), status {}, {} alert(s)",
                    batch.record.batch_number,
                    batch.record.name,
                    batch.derived.quality_score,
                    batch.derived.quality_grade,
                    batch.derived.quality_status,
                    batch.derived.status,
                    batch.derived.alerts.len()
                );
            }
            Err(err) => println!("  Skipped sample batch: {}", err),
        }
    }

    let import = ImportSummary {
        imported,
        ..ImportSummary::default()
    };
    let dashboard = build_dashboard(&service, today, import, DateWindow::default(), None)?;
    render_dashboard(&dashboard, true);

    println!("\nBatch detail: PAR-2403");
    match service.detail("PAR-2403") {
        Ok(detail) => {
            println!(
                "- expires in {} days ({}) | manufactured {} days ago",
                detail.days_until_expiry,
                detail.expiry_status.label(),
                detail.days_since_manufacture
            );
            for component in &detail.score_breakdown {
                println!(
                    "  - {:?}: {:.2} / {:.0}",
                    component.factor, component.points, component.max_points
                );
            }
        }
        Err(err) => println!("  Detail unavailable: {}", err),
    }

    println!("\nContamination re-test on AMX-2401 reads 1.5 ppm");
    let mut retest = sample_batches(today)
        .into_iter()
        .find(|snapshot| snapshot.batch_number == "AMX-2401")
        .unwrap_or_default();
    retest.contaminant_level = Some(1.5);
    match service.replace("AMX-2401", retest) {
        Ok(batch) => println!(
            "- score {:.2} grade {} | status {} | {} alert(s)",
            batch.derived.quality_score,
            batch.derived.quality_grade,
            batch.derived.status,
            batch.derived.alerts.len()
        ),
        Err(err) => println!("  Update rejected: {}", err),
    }

    let outlook = today + Duration::days(30);
    let lookahead = quality_service(store, ReportingConfig::default(), Some(outlook));
    let summary = lookahead.refresh(true)?;
    println!("\nStatus outlook for {outlook}");
    render_refresh(&summary);

    Ok(())
}

pub(crate) fn render_dashboard(dashboard: &QualityDashboard, list_alerts: bool) {
    let stats = &dashboard.statistics;
    println!("\nQuality dashboard as of {}", dashboard.today);
    println!(
        "- {} batches assessed | {} rows rejected at import",
        dashboard.import.imported, dashboard.import.failed
    );
    render_import_errors(&dashboard.import);
    println!(
        "- Average score {:.2} (min {:.2} / max {:.2}) across {} batches",
        stats.average_score, stats.min_score, stats.max_score, stats.total_records
    );

    println!("Grade distribution:");
    for (grade, count) in &stats.grade_distribution {
        println!("  - {} ({}): {}", grade, grade.status(), count);
    }
    println!("Lifecycle status:");
    for (status, count) in &stats.lifecycle_distribution {
        println!("  - {}: {}", status, count);
    }

    println!("Top performers:");
    render_entries(&dashboard.top_performers);
    println!("Poor performers:");
    render_entries(&dashboard.poor_performers);

    let acceptance = &dashboard.acceptance;
    println!(
        "Acceptance: {} accepted / {} rejected of {} ({:.2}% accepted, {:.2}% rejected)",
        acceptance.accepted,
        acceptance.rejected,
        acceptance.total,
        acceptance.acceptance_rate,
        acceptance.rejection_rate
    );
    for reason in &acceptance.rejection_reasons {
        println!(
            "  - rejected while {}: {} ({:.2}%)",
            reason.reason, reason.count, reason.percentage
        );
    }
    for supplier in &acceptance.by_supplier {
        println!(
            "  - {}: {}/{} accepted ({:.2}%)",
            supplier.supplier, supplier.accepted, supplier.total, supplier.acceptance_rate
        );
    }

    let alerts = &dashboard.alerts;
    println!(
        "Alerts: {} total | {} critical | {} warning across {} batches",
        alerts.total_alerts, alerts.critical, alerts.warning, alerts.records_with_alerts
    );
    for (kind, count) in &alerts.by_type {
        println!("  - {}: {}", kind, count);
    }

    if list_alerts && !dashboard.critical_alerts.is_empty() {
        println!("Critical alerts:");
        for entry in &dashboard.critical_alerts {
            println!(
                "  - {} {} (score {:.2}, grade {})",
                entry.batch_number, entry.name, entry.quality_score, entry.quality_grade
            );
            for alert in &entry.alerts {
                println!("    - {}", alert.message);
            }
        }
    }
}

fn render_entries(entries: &[ScoreEntry]) {
    if entries.is_empty() {
        println!("  (none)");
    }
    for entry in entries {
        println!(
            "  - {} {} [{}]: {:.2} ({}) {}",
            entry.batch_number,
            entry.name,
            entry.supplier,
            entry.quality_score,
            entry.quality_grade,
            entry.status
        );
    }
}

fn render_import_errors(import: &ImportSummary) {
    for error in &import.errors {
        println!("  - row {}: {}", error.row, error.error);
    }
    let hidden = import.failed.saturating_sub(import.errors.len());
    if hidden > 0 {
        println!("  - ... and {} more", hidden);
    }
}

pub(crate) fn render_refresh(summary: &RefreshSummary) {
    let mode = if summary.dry_run { " (dry run)" } else { "" };
    println!(
        "- {} of {} batches changed{}",
        summary.updated, summary.total, mode
    );
    for (status, count) in &summary.status_changes {
        println!("  - {} moved to {}", count, status);
    }
    println!(
        "- {} alerts across {} batches",
        summary.total_alerts, summary.records_with_alerts
    );
    for share in &summary.distribution {
        println!(
            "  - {}: {} ({:.1}%)",
            share.status, share.count, share.percentage
        );
    }
}

/// Readings are `[temperature, humidity, ph_level, contaminant_level, purity]`.
struct SampleBatch {
    batch_number: &'static str,
    name: &'static str,
    readings: [f64; 5],
    manufactured_days_ago: i64,
    expires_in_days: i64,
    disposition: &'static str,
    supplier: &'static str,
    category: &'static str,
    price: f64,
}

const SAMPLE_BATCHES: [SampleBatch; 8] = [
    SampleBatch {
        batch_number: "AMX-2401",
        name: "Amoxicillin 500mg",
        readings: [22.0, 50.0, 7.0, 0.0005, 99.5],
        manufactured_days_ago: 60,
        expires_in_days: 200,
        disposition: "Accepted",
        supplier: "MedSupply Ltd",
        category: "Antibiotic",
        price: 25.50,
    },
    SampleBatch {
        batch_number: "AMX-2402",
        name: "Amoxicillin 250mg",
        readings: [28.0, 65.0, 7.0, 0.0005, 99.2],
        manufactured_days_ago: 340,
        expires_in_days: 20,
        disposition: "Accepted",
        supplier: "MedSupply Ltd",
        category: "Antibiotic",
        price: 18.00,
    },
    SampleBatch {
        batch_number: "PAR-2403",
        name: "Paracetamol 500mg",
        readings: [22.0, 50.0, 7.0, 0.5, 85.0],
        manufactured_days_ago: 700,
        expires_in_days: 5,
        disposition: "Rejected",
        supplier: "PharmaCo",
        category: "Analgesic",
        price: 9.75,
    },
    SampleBatch {
        batch_number: "IBU-2404",
        name: "Ibuprofen 200mg",
        readings: [40.0, 90.0, 5.0, 12.0, 70.0],
        manufactured_days_ago: 30,
        expires_in_days: 90,
        disposition: "Rejected",
        supplier: "PharmaCo",
        category: "Analgesic",
        price: 14.20,
    },
    SampleBatch {
        batch_number: "VIT-2405",
        name: "Vitamin C 1000mg",
        readings: [36.0, 50.0, 7.0, 0.02, 99.5],
        manufactured_days_ago: 15,
        expires_in_days: 60,
        disposition: "Accepted",
        supplier: "Acme Labs",
        category: "Supplement",
        price: 11.00,
    },
    SampleBatch {
        batch_number: "ASP-2406",
        name: "Aspirin 81mg",
        readings: [22.0, 50.0, 7.0, 0.0005, 99.5],
        manufactured_days_ago: 730,
        expires_in_days: -5,
        disposition: "Accepted",
        supplier: "Acme Labs",
        category: "Analgesic",
        price: 6.40,
    },
    SampleBatch {
        batch_number: "MET-2407",
        name: "Metformin 850mg",
        readings: [24.0, 55.0, 6.8, 0.005, 96.0],
        manufactured_days_ago: 10,
        expires_in_days: 400,
        disposition: "Accepted",
        supplier: "Global Generics",
        category: "Antidiabetic",
        price: 21.30,
    },
    SampleBatch {
        batch_number: "OME-2408",
        name: "Omeprazole 20mg",
        readings: [26.0, 68.0, 7.8, 0.05, 92.0],
        manufactured_days_ago: 320,
        expires_in_days: 25,
        disposition: "Rejected",
        supplier: "Global Generics",
        category: "Gastrointestinal",
        price: 16.80,
    },
];

/// Sample set covering every expiry bucket and most grade bands.
pub(crate) fn sample_batches(today: NaiveDate) -> Vec<BatchSnapshot> {
    SAMPLE_BATCHES
        .iter()
        .map(|sample| {
            let [temperature, humidity, ph_level, contaminant_level, purity] = sample.readings;
            BatchSnapshot {
                batch_number: sample.batch_number.to_string(),
                name: Some(sample.name.to_string()),
                quantity: Some(500),
                temperature: Some(temperature),
                humidity: Some(humidity),
                ph_level: Some(ph_level),
                contaminant_level: Some(contaminant_level),
                active_ingredient_purity: Some(purity),
                manufacture_date: Some(today - Duration::days(sample.manufactured_days_ago)),
                expiry_date: Some(today + Duration::days(sample.expires_in_days)),
                accepted_or_rejected: Some(sample.disposition.to_string()),
                supplier: Some(sample.supplier.to_string()),
                manufacturer: Some("Northwind Pharma".to_string()),
                category: Some(sample.category.to_string()),
                price: Some(sample.price),
                inspected_by: Some("QA Lab".to_string()),
                created_at: None,
            }
        })
        .collect()
}
