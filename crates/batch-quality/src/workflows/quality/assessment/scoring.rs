use super::super::domain::Measurements;
use serde::{Deserialize, Serialize};

/// Measurement that contributes a slice of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Temperature,
    Humidity,
    PhLevel,
    Contaminant,
    Purity,
}

/// Discrete contribution to a quality score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: f64,
    pub max_points: f64,
}

pub(crate) const TEMPERATURE_MAX: f64 = 20.0;
pub(crate) const HUMIDITY_MAX: f64 = 20.0;
pub(crate) const PH_MAX: f64 = 15.0;
pub(crate) const CONTAMINANT_MAX: f64 = 25.0;
pub(crate) const PURITY_MAX: f64 = 20.0;

/// Composite 0-100 score rounded to two decimals.
pub fn quality_score(measurements: &Measurements) -> f64 {
    let total: f64 = score_components(measurements)
        .iter()
        .map(|component| component.points)
        .sum();
    round2(total.clamp(0.0, 100.0))
}

pub fn score_components(measurements: &Measurements) -> [ScoreComponent; 5] {
    [
        component(
            ScoreFactor::Temperature,
            temperature_points(measurements.temperature),
            TEMPERATURE_MAX,
        ),
        component(
            ScoreFactor::Humidity,
            humidity_points(measurements.humidity),
            HUMIDITY_MAX,
        ),
        component(
            ScoreFactor::PhLevel,
            ph_points(measurements.ph_level),
            PH_MAX,
        ),
        component(
            ScoreFactor::Contaminant,
            contaminant_points(measurements.contaminant_level),
            CONTAMINANT_MAX,
        ),
        component(
            ScoreFactor::Purity,
            purity_points(measurements.active_ingredient_purity),
            PURITY_MAX,
        ),
    ]
}

fn component(factor: ScoreFactor, points: f64, max_points: f64) -> ScoreComponent {
    // NaN readings fall through every band comparison; pin them to zero.
    let points = if points.is_finite() {
        points.clamp(0.0, max_points)
    } else {
        0.0
    };
    ScoreComponent {
        factor,
        points,
        max_points,
    }
}

/// Full marks inside `ideal`, a linear penalty from the nearest ideal edge
/// inside `acceptable`, nothing outside.
fn banded(value: f64, ideal: (f64, f64), acceptable: (f64, f64), max: f64, slope: f64) -> f64 {
    if value >= ideal.0 && value <= ideal.1 {
        max
    } else if value >= acceptable.0 && value <= acceptable.1 {
        let distance = (value - ideal.0).abs().min((value - ideal.1).abs());
        (max - slope * distance).max(0.0)
    } else {
        0.0
    }
}

pub(crate) fn temperature_points(celsius: f64) -> f64 {
    banded(celsius, (20.0, 25.0), (15.0, 30.0), TEMPERATURE_MAX, 2.0)
}

pub(crate) fn humidity_points(percent: f64) -> f64 {
    banded(percent, (40.0, 60.0), (30.0, 70.0), HUMIDITY_MAX, 1.5)
}

pub(crate) fn ph_points(ph: f64) -> f64 {
    banded(ph, (6.5, 7.5), (6.0, 8.0), PH_MAX, 10.0)
}

pub(crate) fn contaminant_points(ppm: f64) -> f64 {
    if ppm <= 0.001 {
        CONTAMINANT_MAX
    } else if ppm <= 0.01 {
        CONTAMINANT_MAX - (ppm - 0.001) / 0.009 * 15.0
    } else if ppm <= 0.1 {
        (10.0 - 50.0 * ppm).max(0.0)
    } else {
        0.0
    }
}

pub(crate) fn purity_points(percent: f64) -> f64 {
    if percent >= 99.0 {
        PURITY_MAX
    } else if percent >= 95.0 {
        15.0 + (percent - 95.0) / 4.0 * 5.0
    } else if percent >= 90.0 {
        10.0 + (percent - 90.0) / 5.0 * 5.0
    } else {
        (percent / 90.0 * 10.0).max(0.0)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ideal() -> Measurements {
        Measurements {
            temperature: 22.0,
            humidity: 50.0,
            ph_level: 7.0,
            contaminant_level: 0.0005,
            active_ingredient_purity: 99.5,
        }
    }

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn ideal_batch_scores_full_marks() {
        assert_eq!(quality_score(&ideal()), 100.0);
    }

    #[test]
    fn temperature_penalises_distance_from_ideal_band() {
        approx(temperature_points(22.0), 20.0);
        approx(temperature_points(17.0), 14.0);
        approx(temperature_points(28.0), 14.0);
        approx(temperature_points(15.0), 10.0);
        approx(temperature_points(30.0), 10.0);
        approx(temperature_points(30.5), 0.0);
        approx(temperature_points(-40.0), 0.0);
    }

    #[test]
    fn humidity_and_ph_follow_their_slopes() {
        approx(humidity_points(65.0), 12.5);
        approx(humidity_points(30.0), 5.0);
        approx(humidity_points(71.0), 0.0);
        approx(ph_points(6.2), 12.0);
        approx(ph_points(8.0), 10.0);
        approx(ph_points(5.9), 0.0);
    }

    #[test]
    fn contaminant_decays_across_three_tiers() {
        approx(contaminant_points(0.001), 25.0);
        approx(contaminant_points(0.0055), 17.5);
        approx(contaminant_points(0.01), 10.0);
        approx(contaminant_points(0.02), 9.0);
        approx(contaminant_points(0.1), 5.0);
        approx(contaminant_points(0.2), 0.0);
        approx(contaminant_points(-3.0), 25.0);
    }

    #[test]
    fn purity_rewards_higher_concentration() {
        approx(purity_points(99.0), 20.0);
        approx(purity_points(97.0), 17.5);
        approx(purity_points(92.5), 12.5);
        approx(purity_points(45.0), 5.0);
        approx(purity_points(-10.0), 0.0);
    }

    #[test]
    fn score_stays_within_bounds_for_hostile_inputs() {
        let samples = [
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
            -1.0e9,
            0.0,
            7.0,
            50.0,
            1.0e9,
        ];
        for &value in &samples {
            let measurements = Measurements {
                temperature: value,
                humidity: value,
                ph_level: value,
                contaminant_level: value,
                active_ingredient_purity: value,
            };
            let score = quality_score(&measurements);
            assert!((0.0..=100.0).contains(&score), "{value} produced {score}");
        }
    }

    #[test]
    fn components_expose_each_factor() {
        let mut measurements = ideal();
        measurements.temperature = 36.0;
        let components = score_components(&measurements);
        assert_eq!(components.len(), 5);
        assert_eq!(components[0].factor, ScoreFactor::Temperature);
        approx(components[0].points, 0.0);
        approx(components.iter().map(|c| c.max_points).sum::<f64>(), 100.0);
        approx(quality_score(&measurements), 80.0);
    }

    #[test]
    fn score_is_rounded_to_two_decimals() {
        let mut measurements = ideal();
        measurements.contaminant_level = 0.003;
        // 25 - (0.002 / 0.009) * 15 = 21.666...
        approx(quality_score(&measurements), 96.67);
    }
}
