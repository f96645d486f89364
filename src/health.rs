//! Plant health scoring
//!
//! Compares the averaged recent readings of a plant against the ideal
//! ranges of its type profile and produces a weighted health score, a
//! qualitative status, the issues detected and the care recommendations
//! attached to those issues.

use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{PlantRecord, SensorAverages, SensorReading};
use crate::profiles::{Parameter, PlantProfile, Threshold};

/// Fraction below `min` / above `max` at which a parameter counts as extreme
pub const EXTREME_MARGIN: f64 = 0.3;

/// Number of simultaneously extreme parameters that triggers `multiple_stress`
pub const MULTIPLE_STRESS_MIN_COUNT: usize = 2;

/// Qualitative health band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthStatus {
    #[serde(rename = "very poor")]
    VeryPoor,
    #[serde(rename = "poor")]
    Poor,
    #[serde(rename = "average")]
    Average,
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "excellent")]
    Excellent,
}

impl HealthStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            HealthStatus::Excellent
        } else if score >= 0.6 {
            HealthStatus::Good
        } else if score >= 0.4 {
            HealthStatus::Average
        } else if score >= 0.2 {
            HealthStatus::Poor
        } else {
            HealthStatus::VeryPoor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "excellent",
            HealthStatus::Good => "good",
            HealthStatus::Average => "average",
            HealthStatus::Poor => "poor",
            HealthStatus::VeryPoor => "very poor",
        }
    }
}

/// Named diagnosis from the issue catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthIssue {
    Overwatering,
    Underwatering,
    TemperatureStress,
    LowHumidity,
    HighHumidity,
    LightDeficiency,
    LightExcess,
    MultipleStress,
}

impl HealthIssue {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthIssue::Overwatering => "overwatering",
            HealthIssue::Underwatering => "underwatering",
            HealthIssue::TemperatureStress => "temperature_stress",
            HealthIssue::LowHumidity => "low_humidity",
            HealthIssue::HighHumidity => "high_humidity",
            HealthIssue::LightDeficiency => "light_deficiency",
            HealthIssue::LightExcess => "light_excess",
            HealthIssue::MultipleStress => "multiple_stress",
        }
    }

    /// Catalog-defined remediation advice
    pub fn recommendations(&self) -> &'static [&'static str] {
        catalog_entry(*self).recommendations
    }
}

/// Trigger rule for a catalog issue
#[derive(Debug, Clone, Copy)]
enum Condition {
    /// value < min * (1 - margin)
    Low(Parameter, f64),
    /// value > max * (1 + margin)
    High(Parameter, f64),
    /// either of the above
    Extreme(Parameter, f64),
    /// at least `count` parameters are extreme at `margin`
    MultipleExtreme { margin: f64, count: usize },
}

struct IssueRule {
    issue: HealthIssue,
    condition: Condition,
    recommendations: &'static [&'static str],
}

static ISSUE_CATALOG: [IssueRule; 8] = [
    IssueRule {
        issue: HealthIssue::Overwatering,
        condition: Condition::High(Parameter::SoilMoisture, 0.2),
        recommendations: &[
            "Reduce watering frequency",
            "Make sure the soil drains well",
            "Check the pot's drainage holes",
        ],
    },
    IssueRule {
        issue: HealthIssue::Underwatering,
        condition: Condition::Low(Parameter::SoilMoisture, 0.2),
        recommendations: &[
            "Increase watering frequency",
            "Water on a more regular schedule",
            "Consider an automatic irrigation system",
        ],
    },
    IssueRule {
        issue: HealthIssue::TemperatureStress,
        condition: Condition::Extreme(Parameter::Temperature, EXTREME_MARGIN),
        recommendations: &[
            "Move the plant to a spot with a more suitable temperature",
            "Protect the plant from temperature extremes",
            "Adjust the ambient temperature if possible",
        ],
    },
    IssueRule {
        issue: HealthIssue::LowHumidity,
        condition: Condition::Low(Parameter::Humidity, 0.2),
        recommendations: &[
            "Mist the air around the plant",
            "Use a humidifier",
            "Group plants together to build a humid microclimate",
        ],
    },
    IssueRule {
        issue: HealthIssue::HighHumidity,
        condition: Condition::High(Parameter::Humidity, 0.2),
        recommendations: &[
            "Improve air circulation",
            "Mist less often",
            "Avoid crowding plants together",
        ],
    },
    IssueRule {
        issue: HealthIssue::LightDeficiency,
        condition: Condition::Low(Parameter::Light, 0.2),
        recommendations: &[
            "Move the plant to a brighter location",
            "Add a grow light",
            "Prune surrounding foliage to let more light through",
        ],
    },
    IssueRule {
        issue: HealthIssue::LightExcess,
        condition: Condition::High(Parameter::Light, 0.2),
        recommendations: &[
            "Move the plant out of direct sunlight",
            "Use a shade cloth to reduce light intensity",
            "Keep the plant away from south- or west-facing windows",
        ],
    },
    IssueRule {
        issue: HealthIssue::MultipleStress,
        condition: Condition::MultipleExtreme {
            margin: EXTREME_MARGIN,
            count: MULTIPLE_STRESS_MIN_COUNT,
        },
        recommendations: &[
            "Review every aspect of the plant's care conditions",
            "Bring all parameters back into their ideal ranges",
            "Monitor the plant's recovery closely",
        ],
    },
];

fn catalog_entry(issue: HealthIssue) -> &'static IssueRule {
    let index = match issue {
        HealthIssue::Overwatering => 0,
        HealthIssue::Underwatering => 1,
        HealthIssue::TemperatureStress => 2,
        HealthIssue::LowHumidity => 3,
        HealthIssue::HighHumidity => 4,
        HealthIssue::LightDeficiency => 5,
        HealthIssue::LightExcess => 6,
        HealthIssue::MultipleStress => 7,
    };
    &ISSUE_CATALOG[index]
}

/// Per-parameter scores in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterScores {
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
}

impl ParameterScores {
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::SoilMoisture => self.soil_moisture,
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::Light => self.light,
        }
    }
}

/// Result of scoring averaged readings against a profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub health_score: f64,
    pub status: HealthStatus,
    pub issues: Vec<HealthIssue>,
    pub recommendations: Vec<String>,
    pub parameter_scores: ParameterScores,
}

/// Health assessment of a single plant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthAssessment {
    pub plant_id: String,
    pub plant_name: String,
    pub plant_type: String,
    pub health_score: f64,
    pub status: HealthStatus,
    pub issues: Vec<HealthIssue>,
    pub recommendations: Vec<String>,
    pub parameter_scores: ParameterScores,
    pub average_data: SensorAverages,
}

/// Assess a plant from its recent readings.
///
/// Fails with [`AppError::InsufficientData`] when `readings` is empty.
pub fn assess(
    plant: &PlantRecord,
    profile: &PlantProfile,
    readings: &[SensorReading],
) -> AppResult<HealthAssessment> {
    let averages = SensorAverages::from_readings(readings).ok_or_else(|| {
        AppError::InsufficientData(format!("No sensor data for plant {}", plant.id))
    })?;

    let report = evaluate(&averages, profile);

    debug!(
        plant_id = %plant.id,
        readings = readings.len(),
        health_score = report.health_score,
        status = report.status.as_str(),
        issues = report.issues.len(),
        "Plant health evaluated"
    );

    Ok(HealthAssessment {
        plant_id: plant.id.clone(),
        plant_name: plant.name.clone(),
        plant_type: plant.plant_type.clone(),
        health_score: report.health_score,
        status: report.status,
        issues: report.issues,
        recommendations: report.recommendations,
        parameter_scores: report.parameter_scores,
        average_data: averages,
    })
}

/// Score averaged readings against a profile
pub fn evaluate(averages: &SensorAverages, profile: &PlantProfile) -> HealthReport {
    let parameter_scores = ParameterScores {
        soil_moisture: parameter_score(averages.soil_moisture, &profile.soil_moisture),
        temperature: parameter_score(averages.temperature, &profile.temperature),
        humidity: parameter_score(averages.humidity, &profile.humidity),
        light: parameter_score(averages.light, &profile.light),
    };
    let health_score = overall_score(&parameter_scores, profile);
    let issues = detect_issues(averages, profile);
    let recommendations = recommendations_for(&issues);

    HealthReport {
        health_score,
        status: HealthStatus::from_score(health_score),
        issues,
        recommendations,
        parameter_scores,
    }
}

/// Score a single value against its ideal range.
///
/// Peaks at 1.0 on the range midpoint and falls linearly to 0 at the range
/// edges; outside the range the score is penalized by the relative distance
/// to the violated bound. A zero bound imposes no constraint on that side.
pub fn parameter_score(value: f64, threshold: &Threshold) -> f64 {
    let Threshold { min, max, .. } = *threshold;

    let score = if min > 0.0 && value < min {
        1.0 - ((min - value) / min).min(1.0)
    } else if max > 0.0 && value > max {
        1.0 - ((value - max) / max).min(1.0)
    } else {
        let half_range = (max - min) / 2.0;
        let distance = (value - threshold.midpoint()).abs();
        if half_range > 0.0 {
            1.0 - distance / half_range
        } else if distance == 0.0 {
            1.0
        } else {
            0.0
        }
    };

    // max/min rather than clamp so a NaN collapses to 0
    score.max(0.0).min(1.0)
}

/// Weighted mean of the parameter scores; weights are treated as relative.
pub fn overall_score(scores: &ParameterScores, profile: &PlantProfile) -> f64 {
    let (weighted_sum, total_weight) = Parameter::ALL.iter().fold((0.0, 0.0), |(sum, total), p| {
        let weight = profile.threshold(*p).weight.max(0.0);
        (sum + scores.get(*p) * weight, total + weight)
    });

    if total_weight <= 0.0 {
        return 0.0;
    }
    (weighted_sum / total_weight).max(0.0).min(1.0)
}

/// Evaluate the issue catalog against averaged readings
pub fn detect_issues(averages: &SensorAverages, profile: &PlantProfile) -> Vec<HealthIssue> {
    ISSUE_CATALOG
        .iter()
        .filter(|rule| condition_met(rule.condition, averages, profile))
        .map(|rule| rule.issue)
        .collect()
}

/// Flatten issue recommendations, keeping first occurrence order and dropping duplicates
pub fn recommendations_for(issues: &[HealthIssue]) -> Vec<String> {
    let mut recommendations: Vec<String> = Vec::new();
    for issue in issues {
        for rec in issue.recommendations() {
            if !recommendations.iter().any(|r| r == rec) {
                recommendations.push((*rec).to_string());
            }
        }
    }
    recommendations
}

fn value_of(averages: &SensorAverages, parameter: Parameter) -> f64 {
    match parameter {
        Parameter::SoilMoisture => averages.soil_moisture,
        Parameter::Temperature => averages.temperature,
        Parameter::Humidity => averages.humidity,
        Parameter::Light => averages.light,
    }
}

fn is_low(value: f64, threshold: &Threshold, margin: f64) -> bool {
    value < threshold.min * (1.0 - margin)
}

fn is_high(value: f64, threshold: &Threshold, margin: f64) -> bool {
    value > threshold.max * (1.0 + margin)
}

fn condition_met(condition: Condition, averages: &SensorAverages, profile: &PlantProfile) -> bool {
    match condition {
        Condition::Low(p, margin) => is_low(value_of(averages, p), profile.threshold(p), margin),
        Condition::High(p, margin) => is_high(value_of(averages, p), profile.threshold(p), margin),
        Condition::Extreme(p, margin) => {
            let value = value_of(averages, p);
            let threshold = profile.threshold(p);
            is_low(value, threshold, margin) || is_high(value, threshold, margin)
        }
        Condition::MultipleExtreme { margin, count } => {
            let extreme = Parameter::ALL
                .iter()
                .filter(|p| condition_met(Condition::Extreme(**p, margin), averages, profile))
                .count();
            extreme >= count
        }
    }
}
