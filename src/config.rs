use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::api_connection::endpoints::OPENROUTER_MODELS;
use crate::nutrition::DEFAULT_SERVING_SIZE_G;
use crate::planner::PlannerMode;

pub const DEFAULT_NUTRITION_TABLE: &str = "FoodData_Central_foundation_food.json";
pub const DEFAULT_STRATEGY_MODEL: &str = "models/diet_model.bin";
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const DEFAULT_RECIPE_MODEL: &str = OPENROUTER_MODELS[0].model_name;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;

/// Startup configuration. Every field has a default; the environment only overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub nutrition_table: PathBuf,
    pub strategy_model: PathBuf,
    /// Name of the variable holding the OpenRouter key, not the key itself.
    pub api_key_env: String,
    pub api_base_url: Option<String>,
    pub recipe_model: String,
    pub generation_timeout: Duration,
    pub planner_mode: PlannerMode,
    pub serving_size_g: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nutrition_table: PathBuf::from(DEFAULT_NUTRITION_TABLE),
            strategy_model: PathBuf::from(DEFAULT_STRATEGY_MODEL),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_base_url: None,
            recipe_model: DEFAULT_RECIPE_MODEL.to_string(),
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            planner_mode: PlannerMode::default(),
            serving_size_g: DEFAULT_SERVING_SIZE_G,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid value '{}' for {}", raw, name)),
        _ => Ok(None),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let text = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(path) = text("NUTRICHEF_NUTRITION_TABLE") {
            config.nutrition_table = PathBuf::from(path);
        }
        if let Some(path) = text("NUTRICHEF_STRATEGY_MODEL") {
            config.strategy_model = PathBuf::from(path);
        }
        if let Some(name) = text("NUTRICHEF_API_KEY_ENV") {
            config.api_key_env = name;
        }
        config.api_base_url = text("NUTRICHEF_API_BASE_URL");
        if let Some(model) = text("NUTRICHEF_RECIPE_MODEL") {
            config.recipe_model = model;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "NUTRICHEF_GENERATION_TIMEOUT_SECS")? {
            config.generation_timeout = Duration::from_secs(secs);
        }
        if let Some(mode) = parse_var::<PlannerMode>(&lookup, "NUTRICHEF_PLANNER_MODE")? {
            config.planner_mode = mode;
        }
        if let Some(grams) = parse_var::<f64>(&lookup, "NUTRICHEF_SERVING_SIZE_G")? {
            anyhow::ensure!(
                grams.is_finite() && grams > 0.0,
                "NUTRICHEF_SERVING_SIZE_G must be a positive number, got {}",
                grams
            );
            config.serving_size_g = grams;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.generation_timeout, Duration::from_secs(30));
        assert_eq!(config.planner_mode, PlannerMode::Generated);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("NUTRICHEF_NUTRITION_TABLE", "data/table.csv"),
            ("NUTRICHEF_PLANNER_MODE", "catalog"),
            ("NUTRICHEF_GENERATION_TIMEOUT_SECS", " 5 "),
            ("NUTRICHEF_SERVING_SIZE_G", "150"),
            ("NUTRICHEF_API_BASE_URL", "http://localhost:8080/v1/chat/completions"),
        ]))
        .unwrap();
        assert_eq!(config.nutrition_table, PathBuf::from("data/table.csv"));
        assert_eq!(config.planner_mode, PlannerMode::Catalog);
        assert_eq!(config.generation_timeout, Duration::from_secs(5));
        assert_eq!(config.serving_size_g, 150.0);
        assert!(config.api_base_url.is_some());
    }

    #[test]
    fn test_malformed_values_are_errors() {
        assert!(AppConfig::from_lookup(lookup(&[("NUTRICHEF_GENERATION_TIMEOUT_SECS", "soon")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("NUTRICHEF_PLANNER_MODE", "random")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("NUTRICHEF_SERVING_SIZE_G", "-10")])).is_err());
    }
}
