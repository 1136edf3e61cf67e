use rand::RngCore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::api_connection::Provider;
use crate::config::AppConfig;
use crate::energy::{self, daily_budget, HealthAnalysis};
use crate::nutrition::{build_nutrition_table, NutritionEstimate, NutritionEstimator};
use crate::planner::{
    select_catalog_meals, DietOrchestrator, DietRecommendation, MealPlanResponse, PlanAllocator, PlannedMeal,
    PlannerMode, FULL_DAY_SCHEDULE,
};
use crate::profile::{ProfileError, UserProfile};
use crate::recipe_generator::service::DEFAULT_GENERATION_TIMEOUT;
use crate::recipe_generator::{OpenRouterRecipeGenerator, Recipe, RecipeRequest, RecipeService, RecipeTextProvider};
use crate::strategy::StrategyClassifier;

/// What initialization managed to load. Missing pieces degrade, they never fail a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub has_reference_table: bool,
    pub has_strategy_model: bool,
    pub has_generative_backend: bool,
}

/// Process-wide service: the nutrition table and strategy model are loaded once here and only
/// read afterwards.
pub struct NutriChef {
    capabilities: Capabilities,
    planner_mode: PlannerMode,
    estimator: Arc<NutritionEstimator>,
    classifier: Arc<StrategyClassifier>,
    recipes: Arc<RecipeService>,
    orchestrator: DietOrchestrator,
}

impl NutriChef {
    /// Loads everything the configuration points at. Never fails; see [`Capabilities`].
    pub fn initialize(config: &AppConfig) -> Self {
        let (table, has_reference_table) = build_nutrition_table(Some(config.nutrition_table.as_path()));
        let estimator = NutritionEstimator::with_serving_size(table, config.serving_size_g);
        let classifier = StrategyClassifier::load(Some(config.strategy_model.as_path()));

        let mut provider = Provider::openrouter(&config.api_key_env);
        if let Some(url) = &config.api_base_url {
            provider = provider.with_base_url(url);
        }
        let generator = OpenRouterRecipeGenerator::new(provider, config.recipe_model.clone());
        let generative: Option<Box<dyn RecipeTextProvider>> = if generator.is_available() {
            Some(Box::new(generator))
        } else {
            info!(
                "{} not set, recipes come from the template engine only",
                config.api_key_env
            );
            None
        };

        let engine = Self::assemble(
            estimator,
            classifier,
            generative,
            config.generation_timeout,
            config.planner_mode,
            has_reference_table,
        );
        info!(capabilities = ?engine.capabilities, mode = %engine.planner_mode, "NutriChef initialized");
        engine
    }

    /// Wires an engine from already-built components.
    pub fn from_parts(
        estimator: NutritionEstimator,
        classifier: StrategyClassifier,
        generative: Option<Box<dyn RecipeTextProvider>>,
        planner_mode: PlannerMode,
    ) -> Self {
        Self::assemble(
            estimator,
            classifier,
            generative,
            DEFAULT_GENERATION_TIMEOUT,
            planner_mode,
            false,
        )
    }

    fn assemble(
        estimator: NutritionEstimator,
        classifier: StrategyClassifier,
        generative: Option<Box<dyn RecipeTextProvider>>,
        timeout: Duration,
        planner_mode: PlannerMode,
        has_reference_table: bool,
    ) -> Self {
        let estimator = Arc::new(estimator);
        let classifier = Arc::new(classifier);
        let recipes = Arc::new(RecipeService::new(estimator.clone(), generative, timeout));
        let capabilities = Capabilities {
            has_reference_table,
            has_strategy_model: classifier.has_model(),
            has_generative_backend: recipes.has_generative_backend(),
        };
        let orchestrator = DietOrchestrator::new(
            estimator.clone(),
            classifier.clone(),
            PlanAllocator::new(recipes.clone()),
        );

        Self {
            capabilities,
            planner_mode,
            estimator,
            classifier,
            recipes,
            orchestrator,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn planner_mode(&self) -> PlannerMode {
        self.planner_mode
    }

    pub fn estimator(&self) -> &NutritionEstimator {
        &self.estimator
    }

    /// Always returns a recipe; backend failures fall back to templates.
    pub async fn generate_recipe(&self, request: &RecipeRequest, rng: &mut (dyn RngCore + Send)) -> Recipe {
        self.recipes.generate(request, rng).await
    }

    pub async fn create_meal_plan(
        &self,
        profile: &UserProfile,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<MealPlanResponse, ProfileError> {
        profile.validate()?;
        let target = daily_budget(profile);

        let meals: Vec<PlannedMeal> = match self.planner_mode {
            PlannerMode::Generated => {
                let strategy = self.classifier.classify(profile);
                let plan = self
                    .orchestrator
                    .allocator()
                    .allocate_plan(target, &strategy, FULL_DAY_SCHEDULE, rng)
                    .await;
                plan.slots.into_iter().map(PlannedMeal::from).collect()
            }
            PlannerMode::Catalog => select_catalog_meals(target, rng).iter().map(PlannedMeal::from).collect(),
        };

        Ok(MealPlanResponse::new(&profile.health_goals, target, meals))
    }

    pub async fn recommend_adaptive_diet(
        &self,
        food_item: &str,
        meal_type: &str,
        profile: &UserProfile,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<DietRecommendation, ProfileError> {
        self.orchestrator.log_meal(food_item, meal_type, profile, rng).await
    }

    pub fn analyze_health(&self, profile: &UserProfile) -> Result<HealthAnalysis, ProfileError> {
        energy::analyze_health(profile)
    }

    pub fn estimate(&self, ingredients: &[String]) -> NutritionEstimate {
        self.estimator.estimate(ingredients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::NutritionTable;
    use crate::profile::sample_profile;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine(mode: PlannerMode) -> NutriChef {
        NutriChef::from_parts(
            NutritionEstimator::new(NutritionTable::with_defaults()),
            StrategyClassifier::default(),
            None,
            mode,
        )
    }

    #[test]
    fn test_capabilities_without_artifacts() {
        let caps = engine(PlannerMode::Generated).capabilities();
        assert!(!caps.has_reference_table);
        assert!(!caps.has_strategy_model);
        assert!(!caps.has_generative_backend);
    }

    #[test]
    fn test_initialize_with_missing_files_degrades() {
        let config = AppConfig {
            nutrition_table: "does/not/exist.json".into(),
            strategy_model: "does/not/exist.bin".into(),
            api_key_env: "NUTRICHEF_TEST_MISSING_KEY".to_string(),
            ..AppConfig::default()
        };
        let engine = NutriChef::initialize(&config);
        assert_eq!(
            engine.capabilities(),
            Capabilities {
                has_reference_table: false,
                has_strategy_model: false,
                has_generative_backend: false,
            }
        );
        assert_eq!(engine.estimate(&["rice".to_string()]).calories, 260);
    }

    #[tokio::test]
    async fn test_generated_meal_plan_covers_the_day() {
        let mut rng = StdRng::seed_from_u64(12);
        let plan = engine(PlannerMode::Generated)
            .create_meal_plan(&sample_profile(), &mut rng)
            .await
            .unwrap();

        assert_eq!(plan.goal, "Lose Weight");
        assert_eq!(plan.total_daily_calories, 2210);
        let types: Vec<&str> = plan.meals.iter().map(|m| m.meal_type.as_str()).collect();
        assert_eq!(types, vec!["Breakfast", "Lunch", "Snack", "Dinner"]);
        // 552 + 773 + 221 + 663
        let total: i64 = plan.meals.iter().map(|m| m.calories).sum();
        assert_eq!(total, 2209);
        assert_eq!(plan.suggestion, "Target: 2210 kcal. Generated Plan: 2209 kcal.");
        assert!(plan.meals.iter().all(|m| m.recipe.as_ref().map(|r| r.calories) == Some(m.calories)));
    }

    #[tokio::test]
    async fn test_catalog_meal_plan() {
        let mut rng = StdRng::seed_from_u64(12);
        let plan = engine(PlannerMode::Catalog)
            .create_meal_plan(&sample_profile(), &mut rng)
            .await
            .unwrap();
        assert!(plan.meals.len() >= 3);
        assert!(plan.meals.iter().all(|m| m.recipe.is_none()));
    }

    #[tokio::test]
    async fn test_meal_plan_rejects_zero_height() {
        let mut profile = sample_profile();
        profile.height_cm = 0.0;
        let mut rng = StdRng::seed_from_u64(1);
        let result = engine(PlannerMode::Generated).create_meal_plan(&profile, &mut rng).await;
        assert_eq!(result, Err(ProfileError::NonPositiveHeight(0.0)));
    }
}
