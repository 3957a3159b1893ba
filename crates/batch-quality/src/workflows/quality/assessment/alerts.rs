use super::super::domain::{Alert, AlertSeverity, AlertThreshold, AlertType, Measurements};
use chrono::{DateTime, Utc};

pub(crate) const PH_BAND: &str = "6.0-8.0";

/// Runs the threshold checks in a fixed order (temperature, humidity,
/// contamination, purity, pH). Each check contributes at most one alert.
pub fn generate_alerts(measurements: &Measurements, generated_at: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let temperature = measurements.temperature;
    if temperature > 30.0 {
        let (severity, threshold) = if temperature > 35.0 {
            (AlertSeverity::Critical, 35.0)
        } else {
            (AlertSeverity::Warning, 30.0)
        };
        alerts.push(Alert {
            kind: AlertType::Temperature,
            severity,
            message: format!("Temperature {temperature}°C is outside the normal range (15-30°C)"),
            value: temperature,
            threshold: AlertThreshold::Limit(threshold),
            timestamp: generated_at,
        });
    }

    let humidity = measurements.humidity;
    if humidity > 70.0 {
        let (severity, threshold) = if humidity > 80.0 {
            (AlertSeverity::Critical, 80.0)
        } else {
            (AlertSeverity::Warning, 70.0)
        };
        alerts.push(Alert {
            kind: AlertType::Humidity,
            severity,
            message: format!("Humidity {humidity}% is outside the normal range (30-70%)"),
            value: humidity,
            threshold: AlertThreshold::Limit(threshold),
            timestamp: generated_at,
        });
    }

    let contaminant = measurements.contaminant_level;
    let contamination = if contaminant > 10.0 {
        Some((AlertSeverity::Critical, 10.0))
    } else if contaminant > 0.1 {
        Some((AlertSeverity::Warning, 0.1))
    } else {
        None
    };
    if let Some((severity, threshold)) = contamination {
        alerts.push(Alert {
            kind: AlertType::Contamination,
            severity,
            message: format!(
                "Contaminant level {contaminant} ppm exceeds the normal limit (<= 0.1 ppm)"
            ),
            value: contaminant,
            threshold: AlertThreshold::Limit(threshold),
            timestamp: generated_at,
        });
    }

    let purity = measurements.active_ingredient_purity;
    if purity < 90.0 {
        let (severity, threshold) = if purity < 80.0 {
            (AlertSeverity::Critical, 80.0)
        } else {
            (AlertSeverity::Warning, 90.0)
        };
        alerts.push(Alert {
            kind: AlertType::Purity,
            severity,
            message: format!(
                "Active ingredient purity {purity}% is below the normal minimum (>= 90%)"
            ),
            value: purity,
            threshold: AlertThreshold::Limit(threshold),
            timestamp: generated_at,
        });
    }

    let ph = measurements.ph_level;
    if ph < 6.0 || ph > 8.0 {
        alerts.push(Alert {
            kind: AlertType::PhLevel,
            severity: AlertSeverity::Warning,
            message: format!("pH level {ph} is outside the normal range ({PH_BAND})"),
            value: ph,
            threshold: AlertThreshold::Band(PH_BAND.to_string()),
            timestamp: generated_at,
        });
    }

    alerts
}
