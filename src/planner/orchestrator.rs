use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::allocator::{DayPlan, PlanAllocator};
use super::ScheduleEntry;
use crate::energy::daily_budget;
use crate::nutrition::NutritionEstimator;
use crate::profile::{ProfileError, UserProfile};
use crate::recipe_generator::Recipe;
use crate::strategy::StrategyClassifier;

const AFTER_BREAKFAST: &[ScheduleEntry] = &[
    ScheduleEntry::new("Lunch", 0.45),
    ScheduleEntry::new("Snack", 0.15),
    ScheduleEntry::new("Dinner", 0.40),
];
const AFTER_LUNCH: &[ScheduleEntry] = &[ScheduleEntry::new("Snack", 0.20), ScheduleEntry::new("Dinner", 0.80)];
const AFTER_DINNER: &[ScheduleEntry] = &[ScheduleEntry::new("Late Snack", 1.0)];
const AFTER_OTHER: &[ScheduleEntry] = &[ScheduleEntry::new("Next Meal", 1.0)];

const HIGH_CARB_FOODS: &[&str] = &["pizza", "burger", "pasta", "rice", "bread", "fries"];
const HIGH_CALORIE_FOODS: &[&str] = &["chocolate", "burger", "pizza"];
const CARB_RESTRICTED_STRATEGIES: &[&str] = &["Low-Carb", "Keto", "Atkins"];
const HEAVY_MEAL_KCAL: i64 = 600;
const SUGGESTION_PREVIEW_INGREDIENTS: usize = 5;

/// Rest-of-day schedule after logging a meal of type `meal_type`.
///
/// Matching is by containment in the order breakfast, lunch, dinner; a blank type counts as
/// lunch.
pub fn remaining_schedule(meal_type: &str) -> &'static [ScheduleEntry] {
    let normalized = meal_type.trim().to_lowercase();
    let normalized = if normalized.is_empty() { "lunch" } else { normalized.as_str() };
    if normalized.contains("breakfast") {
        AFTER_BREAKFAST
    } else if normalized.contains("lunch") {
        AFTER_LUNCH
    } else if normalized.contains("dinner") {
        AFTER_DINNER
    } else {
        AFTER_OTHER
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedMeal {
    #[serde(rename = "type")]
    pub meal_type: String,
    pub recipe: Recipe,
    pub suggestion_reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DietRecommendation {
    pub calories_consumed_estimate: i64,
    pub calories_remaining: i64,
    pub nutritional_analysis: String,
    pub next_meal_suggestion: String,
    pub contextual_advice: String,
    pub day_plan: Vec<RecommendedMeal>,
}

struct MealContext<'a> {
    food_item: &'a str,
    strategy: &'a str,
    consumed: i64,
    remaining: f64,
    health_goals: &'a str,
}

fn contextual_advice(ctx: &MealContext<'_>, rng: &mut (dyn RngCore + Send)) -> String {
    let food = ctx.food_item.to_lowercase();
    let eaten = ctx.food_item;
    let strategy = ctx.strategy;

    let options: Vec<String> = if HIGH_CARB_FOODS.iter().any(|f| food.contains(f)) {
        if CARB_RESTRICTED_STRATEGIES.contains(&strategy) {
            vec![
                format!("Since you ate {} (High Carb) but are on {}, ensure your next meal is ZERO carb.", eaten, strategy),
                format!("That {} used up your carb limit. Go for a pure protein dinner like Grilled Salmon.", eaten),
                format!("Oops, {} isn't great for {}. Skip carbs for the rest of the day.", eaten, strategy),
            ]
        } else {
            vec![
                "Balance that High Carb meal with a High Protein dinner (e.g. Chicken Breast).".to_string(),
                format!("Good energy from the {}. Now switch to fiber and protein for your next meal.", eaten),
                format!("To keep your blood sugar stable after {}, eat something green and lean next.", eaten),
            ]
        }
    } else if HIGH_CALORIE_FOODS.iter().any(|f| food.contains(f)) || ctx.consumed > HEAVY_MEAL_KCAL {
        vec![
            format!(
                "That was a heavy meal ({} kcal). Suggesting a light salad or soup next to stay within limit.",
                ctx.consumed
            ),
            "Big meal! Let's go light for the next one, maybe a Cucumber Salad?".to_string(),
            format!(
                "Since you indulged in {}, try intermittent fasting until breakfast or have a light broth.",
                eaten
            ),
        ]
    } else if strategy == "Vegan" && food.contains("chicken") {
        vec![
            "Note: You are marked as 'Vegan', but ate meat. Suggesting a Lentil Stew to reset.".to_string(),
            "Did you cheat on your Vegan diet? It happens! Try a Tofu Stir-fry next.".to_string(),
            "Back to plants! How about a Chickpea Curry for your next meal?".to_string(),
        ]
    } else {
        vec![
            format!("Keep it up! A {} friendly snack like Almonds would be great.", strategy),
            "Stay hydrated! Pair your next meal with water to help digestion.".to_string(),
            format!("You have {} kcal left. A balanced dinner fits perfectly.", ctx.remaining as i64),
            format!("Great choice with {}. Maybe try a fruit smoothie next?", eaten),
            format!(
                "Doing well! Stick to the plan and you'll hit your goal of {}.",
                ctx.health_goals
            ),
        ]
    };

    options
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| format!("Continue with {} diet.", strategy))
}

fn render_day_plan(strategy: &str, budget: f64, remaining: f64, plan: &DayPlan) -> String {
    let mut lines = vec![
        format!("### Day Plan (Strategy: {})", strategy),
        format!("**Goal**: {} kcal | **Remaining**: {} kcal", budget as i64, remaining as i64),
        "---".to_string(),
    ];
    for slot in &plan.slots {
        lines.push(format!("**{}** (~{} kcal)", slot.label, slot.allocated_calories));
        lines.push(format!("**{}**", slot.recipe.title));
        let preview: Vec<&str> = slot
            .recipe
            .ingredients
            .iter()
            .take(SUGGESTION_PREVIEW_INGREDIENTS)
            .map(String::as_str)
            .collect();
        lines.push(format!("_{}_", preview.join(", ")));
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Adaptive day planning: takes one logged meal and plans the rest of the day around what is
/// left of the budget.
pub struct DietOrchestrator {
    estimator: Arc<NutritionEstimator>,
    classifier: Arc<StrategyClassifier>,
    allocator: PlanAllocator,
}

impl DietOrchestrator {
    pub fn new(estimator: Arc<NutritionEstimator>, classifier: Arc<StrategyClassifier>, allocator: PlanAllocator) -> Self {
        Self {
            estimator,
            classifier,
            allocator,
        }
    }

    pub fn allocator(&self) -> &PlanAllocator {
        &self.allocator
    }

    pub async fn log_meal(
        &self,
        food_item: &str,
        meal_type: &str,
        profile: &UserProfile,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<DietRecommendation, ProfileError> {
        profile.validate()?;

        let consumed = self.estimator.estimate_meal_calories(food_item);
        let budget = daily_budget(profile);
        let remaining = budget - consumed as f64;
        let strategy = self.classifier.classify(profile);
        let schedule = remaining_schedule(meal_type);
        info!(
            consumed,
            remaining = remaining as i64,
            strategy = %strategy,
            slots = schedule.len(),
            "Planning rest of day after '{}'",
            food_item
        );

        let plan = self.allocator.allocate_plan(remaining, &strategy, schedule, rng).await;

        let context = MealContext {
            food_item,
            strategy: &strategy,
            consumed,
            remaining,
            health_goals: &profile.health_goals,
        };
        let contextual_advice = contextual_advice(&context, rng);
        let next_meal_suggestion = render_day_plan(&strategy, budget, remaining, &plan);

        let day_plan = plan
            .slots
            .into_iter()
            .map(|slot| RecommendedMeal {
                meal_type: slot.label,
                recipe: slot.recipe,
                suggestion_reason: slot.reason,
            })
            .collect();

        Ok(DietRecommendation {
            calories_consumed_estimate: consumed,
            calories_remaining: remaining as i64,
            nutritional_analysis: format!("Analyzed '{}'. Strategy: {}", food_item, strategy),
            next_meal_suggestion,
            contextual_advice,
            day_plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::NutritionTable;
    use crate::planner::allocated_calories;
    use crate::profile::sample_profile;
    use crate::recipe_generator::RecipeService;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn orchestrator() -> DietOrchestrator {
        let estimator = Arc::new(NutritionEstimator::new(NutritionTable::with_defaults()));
        let recipes = Arc::new(RecipeService::template_only(estimator.clone()));
        DietOrchestrator::new(
            estimator,
            Arc::new(StrategyClassifier::default()),
            PlanAllocator::new(recipes),
        )
    }

    fn context<'a>(food: &'a str, strategy: &'a str, consumed: i64) -> MealContext<'a> {
        MealContext {
            food_item: food,
            strategy,
            consumed,
            remaining: 1500.0,
            health_goals: "Lose Weight",
        }
    }

    #[test]
    fn test_schedule_selection_by_meal_type() {
        let labels = |s: &[ScheduleEntry]| s.iter().map(|e| e.label).collect::<Vec<_>>();
        assert_eq!(labels(remaining_schedule("Breakfast")), vec!["Lunch", "Snack", "Dinner"]);
        assert_eq!(labels(remaining_schedule("  LUNCH ")), vec!["Snack", "Dinner"]);
        assert_eq!(labels(remaining_schedule("dinner")), vec!["Late Snack"]);
        assert_eq!(labels(remaining_schedule("brunch")), vec!["Next Meal"]);
        assert_eq!(labels(remaining_schedule("")), vec!["Snack", "Dinner"]);
        assert_eq!(labels(remaining_schedule("Late Breakfast")), vec!["Lunch", "Snack", "Dinner"]);
    }

    #[test]
    fn test_schedule_ratios_sum_to_one() {
        for meal_type in ["breakfast", "lunch", "dinner", "other"] {
            let total: f64 = remaining_schedule(meal_type).iter().map(|e| e.ratio).sum();
            assert!((total - 1.0).abs() < 1e-9, "{} sums to {}", meal_type, total);
        }
    }

    #[test]
    fn test_advice_for_high_carb_on_keto() {
        let mut rng = StdRng::seed_from_u64(3);
        let advice = contextual_advice(&context("Pizza", "Keto", 532), &mut rng);
        assert!(advice.contains("Pizza") || advice.contains("carb"), "{}", advice);
    }

    #[test]
    fn test_advice_for_heavy_meal() {
        let mut rng = StdRng::seed_from_u64(3);
        let advice = contextual_advice(&context("chocolate cake", "Balanced", 300), &mut rng);
        assert!(advice.contains("light") || advice.contains("heavy"), "{}", advice);
    }

    #[test]
    fn test_advice_for_meat_on_vegan() {
        let mut rng = StdRng::seed_from_u64(3);
        let advice = contextual_advice(&context("chicken", "Vegan", 330), &mut rng);
        assert!(advice.contains("Vegan") || advice.contains("plants"), "{}", advice);
    }

    #[tokio::test]
    async fn test_breakfast_plan_matches_budget_decomposition() {
        let profile = sample_profile();
        let mut rng = StdRng::seed_from_u64(17);
        let recommendation = orchestrator()
            .log_meal("oats, banana", "Breakfast", &profile, &mut rng)
            .await
            .unwrap();

        // oats 778 + banana 178
        assert_eq!(recommendation.calories_consumed_estimate, 956);
        let remaining = 2210.5625 - 956.0;
        assert_eq!(recommendation.calories_remaining, 1254);

        let expected: i64 = [0.45, 0.15, 0.40].iter().map(|r| allocated_calories(remaining, *r)).sum();
        let planned: i64 = recommendation.day_plan.iter().map(|m| m.recipe.calories).sum();
        assert_eq!(planned, expected);

        let types: Vec<&str> = recommendation.day_plan.iter().map(|m| m.meal_type.as_str()).collect();
        assert_eq!(types, vec!["Lunch", "Snack", "Dinner"]);
        assert_eq!(recommendation.nutritional_analysis, "Analyzed 'oats, banana'. Strategy: Balanced");
        assert!(recommendation.next_meal_suggestion.starts_with("### Day Plan (Strategy: Balanced)"));
        assert!(recommendation.next_meal_suggestion.contains("**Goal**: 2210 kcal | **Remaining**: 1254 kcal"));
    }

    #[tokio::test]
    async fn test_overspent_budget_still_yields_minimum_slot() {
        let profile = sample_profile();
        let mut rng = StdRng::seed_from_u64(5);
        let recommendation = orchestrator()
            .log_meal("butter, butter, butter, nuts, olive oil", "dinner", &profile, &mut rng)
            .await
            .unwrap();
        assert!(recommendation.calories_remaining < 0);
        assert_eq!(recommendation.day_plan.len(), 1);
        assert_eq!(recommendation.day_plan[0].meal_type, "Late Snack");
        assert_eq!(recommendation.day_plan[0].recipe.calories, 200);
    }

    #[tokio::test]
    async fn test_invalid_profile_is_rejected() {
        let mut profile = sample_profile();
        profile.height_cm = 0.0;
        let mut rng = StdRng::seed_from_u64(5);
        let result = orchestrator().log_meal("apple", "lunch", &profile, &mut rng).await;
        assert!(matches!(result, Err(ProfileError::NonPositiveHeight(_))));
    }
}
