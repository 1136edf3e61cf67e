use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::template::TemplateRecipeEngine;
use super::{Recipe, RecipeBackendError, RecipeDraft, RecipeRequest, RecipeTextProvider};
use crate::nutrition::{split_ingredient_list, NutritionEstimator};

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

const GENERATIVE_SUFFIX: &str = " (ML Powered)";
const TEMPLATE_SUFFIX: &str = " (Algorithmic AI)";
const DEFAULT_INSTRUCTIONS: &str = "Generated recipe instructions";
const IMAGE_PLACEHOLDER_URL: &str = "https://via.placeholder.com/300?text=";

fn placeholder_image_url(title: &str) -> String {
    format!("{}{}", IMAGE_PLACEHOLDER_URL, title.replace(' ', "+"))
}

/// Best-effort recipe generation: tries the generative backend when one is configured and falls
/// back to the template engine on any failure or timeout. Always returns a recipe.
pub struct RecipeService {
    generative: Option<Box<dyn RecipeTextProvider>>,
    template: TemplateRecipeEngine,
    estimator: Arc<NutritionEstimator>,
    timeout: Duration,
}

impl RecipeService {
    pub fn new(
        estimator: Arc<NutritionEstimator>,
        generative: Option<Box<dyn RecipeTextProvider>>,
        timeout: Duration,
    ) -> Self {
        Self {
            generative,
            template: TemplateRecipeEngine::new(),
            estimator,
            timeout,
        }
    }

    pub fn template_only(estimator: Arc<NutritionEstimator>) -> Self {
        Self::new(estimator, None, DEFAULT_GENERATION_TIMEOUT)
    }

    pub fn has_generative_backend(&self) -> bool {
        self.generative.is_some()
    }

    pub fn estimator(&self) -> &NutritionEstimator {
        &self.estimator
    }

    pub async fn generate(&self, request: &RecipeRequest, rng: &mut (dyn RngCore + Send)) -> Recipe {
        if let Some(backend) = &self.generative {
            match self.try_generative(backend.as_ref(), request, rng).await {
                Ok(draft) => return self.assemble_generated(draft, request),
                Err(e) => warn!(backend = backend.name(), "Recipe generation failed ({}), falling back to templates", e),
            }
        }
        let draft = self.template.render(request, rng);
        self.assemble_templated(draft, request)
    }

    async fn try_generative(
        &self,
        backend: &dyn RecipeTextProvider,
        request: &RecipeRequest,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<RecipeDraft, RecipeBackendError> {
        match tokio::time::timeout(self.timeout, backend.produce(request, rng)).await {
            Ok(result) => result,
            Err(_) => Err(RecipeBackendError::Timeout(self.timeout)),
        }
    }

    fn assemble_generated(&self, draft: RecipeDraft, request: &RecipeRequest) -> Recipe {
        let ingredients = if draft.ingredients.is_empty() {
            split_ingredient_list(&request.ingredients)
        } else {
            draft.ingredients
        };
        let instructions = if draft.instructions.is_empty() {
            DEFAULT_INSTRUCTIONS.to_string()
        } else {
            draft.instructions
        };
        let nutrition = self.estimator.estimate(&ingredients);
        debug!(title = %draft.title, calories = nutrition.calories, "Generated recipe");

        Recipe {
            image_url: placeholder_image_url(&draft.title),
            title: format!("{}{}", draft.title, GENERATIVE_SUFFIX),
            ingredients,
            instructions,
            cuisine_type: request.cuisine.clone(),
            calories: nutrition.calories,
        }
    }

    fn assemble_templated(&self, draft: RecipeDraft, request: &RecipeRequest) -> Recipe {
        // Staples are seasoning; calories come from what the user asked for.
        let requested = split_ingredient_list(&request.ingredients);
        let counted = if requested.is_empty() { &draft.ingredients } else { &requested };
        let nutrition = self.estimator.estimate(counted);
        debug!(title = %draft.title, calories = nutrition.calories, "Template recipe");

        Recipe {
            image_url: placeholder_image_url(&draft.title),
            title: format!("{}{}", draft.title, TEMPLATE_SUFFIX),
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            cuisine_type: request.cuisine.clone(),
            calories: nutrition.calories,
        }
    }
}
