//! Daily energy budget (Mifflin-St Jeor BMR scaled by activity, shifted by goal).

use serde::{Deserialize, Serialize};

use crate::profile::{ProfileError, UserProfile};

const MALE_OFFSET: f64 = 5.0;
const FEMALE_OFFSET: f64 = -161.0;
const DEFAULT_ACTIVITY_MULTIPLIER: f64 = 1.2;
const GOAL_ADJUSTMENT_KCAL: f64 = 500.0;

const ACTIVITY_MULTIPLIERS: &[(&str, f64)] = &[
    ("sedentary", 1.2),
    ("moderate", 1.55),
    ("active", 1.7),
];

/// BMR = 10 x weight + 6.25 x height - 5 x age + offset.
/// Only an exact (case-insensitive) "male" gets the male offset; everything else uses -161.
pub fn basal_metabolic_rate(profile: &UserProfile) -> f64 {
    let offset = if profile.gender.trim().eq_ignore_ascii_case("male") {
        MALE_OFFSET
    } else {
        FEMALE_OFFSET
    };
    10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * f64::from(profile.age) + offset
}

pub fn activity_multiplier(activity_level: &str) -> f64 {
    let level = activity_level.trim().to_lowercase();
    ACTIVITY_MULTIPLIERS
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(DEFAULT_ACTIVITY_MULTIPLIER)
}

pub fn goal_adjustment(health_goals: &str) -> f64 {
    let goals = health_goals.to_lowercase();
    if goals.contains("gain") {
        GOAL_ADJUSTMENT_KCAL
    } else if goals.contains("lose") {
        -GOAL_ADJUSTMENT_KCAL
    } else {
        0.0
    }
}

/// Daily calorie budget in kcal. Not clamped: a pathological profile may yield a negative value.
/// Stays floating point; truncate only when presenting.
pub fn daily_budget(profile: &UserProfile) -> f64 {
    basal_metabolic_rate(profile) * activity_multiplier(&profile.activity_level)
        + goal_adjustment(&profile.health_goals)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthAnalysis {
    pub bmi: String,
    pub bmi_category: String,
    pub daily_calorie_needs: i64,
}

pub fn bmi_category(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "Underweight"
    } else if bmi < 24.9 {
        "Normal weight"
    } else if bmi < 29.9 {
        "Overweight"
    } else {
        "Obese"
    }
}

pub fn analyze_health(profile: &UserProfile) -> Result<HealthAnalysis, ProfileError> {
    profile.validate()?;
    let bmi = profile.bmi();
    Ok(HealthAnalysis {
        bmi: format!("{:.2}", bmi),
        bmi_category: bmi_category(bmi).to_string(),
        daily_calorie_needs: daily_budget(profile) as i64,
    })
}
