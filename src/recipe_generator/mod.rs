pub mod generative;
pub mod service;
pub mod template;

use async_trait::async_trait;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::Duration;

use crate::api_connection::ApiConnectionError;

pub use generative::{parse_generated_recipe, OpenRouterRecipeGenerator};
pub use service::RecipeService;
pub use template::TemplateRecipeEngine;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    /// Comma separated ingredient list.
    pub ingredients: String,
    #[serde(default = "default_cuisine")]
    pub cuisine: String,
    #[serde(default)]
    pub dietary_restrictions: String,
}

fn default_cuisine() -> String {
    "Any".to_string()
}

impl RecipeRequest {
    pub fn new(ingredients: impl Into<String>, cuisine: impl Into<String>, dietary_restrictions: impl Into<String>) -> Self {
        Self {
            ingredients: ingredients.into(),
            cuisine: cuisine.into(),
            dietary_restrictions: dietary_restrictions.into(),
        }
    }
}

/// Raw backend output before calories and presentation fields are attached.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecipeDraft {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub cuisine_type: String,
    /// Overwritten by the planners with the slot allocation.
    pub calories: i64,
    pub image_url: String,
}

#[derive(Debug)]
pub enum RecipeBackendError {
    Api(ApiConnectionError),
    Timeout(Duration),
    Unparseable(String),
}

impl fmt::Display for RecipeBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeBackendError::Api(err) => write!(f, "Recipe backend call failed: {}", err),
            RecipeBackendError::Timeout(limit) => write!(f, "Recipe backend timed out after {:?}", limit),
            RecipeBackendError::Unparseable(raw) => write!(f, "Recipe backend output could not be parsed: {}", raw),
        }
    }
}

impl Error for RecipeBackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RecipeBackendError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiConnectionError> for RecipeBackendError {
    fn from(err: ApiConnectionError) -> Self {
        RecipeBackendError::Api(err)
    }
}

/// Source of recipe text for a comma separated ingredient list.
#[async_trait]
pub trait RecipeTextProvider: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn produce(
        &self,
        request: &RecipeRequest,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<RecipeDraft, RecipeBackendError>;
}
