use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Anthropometric inputs shared by the energy model, the strategy classifier and the planners.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: String,
    pub activity_level: String,
    /// Free text such as "Lose Weight" or "Gain Muscle".
    pub health_goals: String,
    #[serde(default = "default_restrictions")]
    pub dietary_restrictions: String,
}

fn default_restrictions() -> String {
    "None".to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileError {
    NonPositiveHeight(f64),
    NonPositiveWeight(f64),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::NonPositiveHeight(h) => {
                write!(f, "Invalid profile: heightCm must be a positive number, got {}", h)
            }
            ProfileError::NonPositiveWeight(w) => {
                write!(f, "Invalid profile: weightKg must be a positive number, got {}", w)
            }
        }
    }
}

impl Error for ProfileError {}

impl UserProfile {
    /// Boundary check run before a profile reaches the energy model or the classifier.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !self.height_cm.is_finite() || self.height_cm <= 0.0 {
            return Err(ProfileError::NonPositiveHeight(self.height_cm));
        }
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(ProfileError::NonPositiveWeight(self.weight_kg));
        }
        Ok(())
    }

    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> UserProfile {
    UserProfile {
        weight_kg: 80.0,
        height_cm: 175.0,
        age: 30,
        gender: "Male".to_string(),
        activity_level: "Moderate".to_string(),
        health_goals: "Lose Weight".to_string(),
        dietary_restrictions: "None".to_string(),
    }
}
