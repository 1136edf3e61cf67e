use rand::seq::SliceRandom;
use rand::RngCore;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::ScheduleEntry;
use crate::nutrition::NutritionEstimate;
use crate::recipe_generator::{Recipe, RecipeRequest, RecipeService};
use crate::strategy::DEFAULT_STRATEGY;

/// Floor for any slot allocation, so a nearly spent budget still yields a real meal.
pub const MIN_SLOT_CALORIES: i64 = 200;

const INGREDIENTS_PER_SLOT: usize = 3;

const STRATEGY_POOLS: &[(&str, &[&str])] = &[
    ("Keto", &["Chicken", "Avocado", "Spinach", "Cheese", "Salmon", "Eggs"]),
    ("Vegan", &["Tofu", "Lentils", "Chickpeas", "Quinoa", "Kale"]),
    ("Low-Carb", &["Turkey", "Zucchini", "Broccoli", "Cauliflower"]),
    ("Paleo", &["Steak", "Carrots", "Asparagus", "Walnuts"]),
    ("Balanced", &["Rice", "Chicken", "Veggies", "Beans", "Yogurt"]),
    ("Mediterranean", &["Fish", "Olive Oil", "Tomatoes", "Feta"]),
    ("DASH", &["Oats", "Banana", "Almonds", "Milk"]),
];

fn lookup_pool(strategy: &str) -> Option<&'static [&'static str]> {
    STRATEGY_POOLS
        .iter()
        .find(|(name, _)| *name == strategy)
        .map(|(_, pool)| *pool)
}

/// Ingredient pool for a strategy label, falling back to the "Balanced" pool.
pub fn ingredient_pool(strategy: &str) -> &'static [&'static str] {
    lookup_pool(strategy)
        .or_else(|| lookup_pool(DEFAULT_STRATEGY))
        .unwrap_or(&[])
}

/// `floor(remaining * ratio)`, never below `MIN_SLOT_CALORIES`.
///
/// Clamping means a day's slots can add up to more than `remaining`.
pub fn allocated_calories(remaining: f64, ratio: f64) -> i64 {
    let share = (remaining * ratio).floor();
    if share.is_finite() {
        (share as i64).max(MIN_SLOT_CALORIES)
    } else {
        MIN_SLOT_CALORIES
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealSlot {
    pub label: String,
    pub ratio: f64,
    pub allocated_calories: i64,
    /// `recipe.calories` always equals `allocated_calories`.
    pub recipe: Recipe,
    pub reason: String,
    /// Estimate over the sampled pool items, pantry staples excluded; informational only.
    pub nutrition: NutritionEstimate,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct DayPlan {
    pub slots: Vec<MealSlot>,
}

impl DayPlan {
    pub fn total_allocated(&self) -> i64 {
        self.slots.iter().map(|s| s.allocated_calories).sum()
    }
}

/// Splits a calorie budget over a schedule and fills each slot with a recipe built from the
/// strategy's ingredient pool.
pub struct PlanAllocator {
    recipes: Arc<RecipeService>,
}

impl PlanAllocator {
    pub fn new(recipes: Arc<RecipeService>) -> Self {
        Self { recipes }
    }

    pub fn recipes(&self) -> &RecipeService {
        &self.recipes
    }

    /// Builds one slot worth `target_calories` (raised to the minimum if needed).
    pub async fn allocate_slot(
        &self,
        entry: ScheduleEntry,
        target_calories: i64,
        strategy: &str,
        rng: &mut (dyn RngCore + Send),
    ) -> MealSlot {
        let allocated = target_calories.max(MIN_SLOT_CALORIES);
        let pool = ingredient_pool(strategy);
        let picked: Vec<&str> = pool
            .choose_multiple(rng, INGREDIENTS_PER_SLOT.min(pool.len()))
            .copied()
            .collect();

        let request = RecipeRequest::new(picked.join(", "), strategy, strategy);
        let mut recipe = self.recipes.generate(&request, rng).await;
        let counted: Vec<String> = picked.iter().map(|item| item.to_string()).collect();
        let nutrition = self.recipes.estimator().estimate(&counted);
        debug!(
            slot = entry.label,
            allocated,
            estimated = nutrition.calories,
            "Allocated slot for strategy {}",
            strategy
        );
        recipe.calories = allocated;

        MealSlot {
            label: entry.label.to_string(),
            ratio: entry.ratio,
            allocated_calories: allocated,
            recipe,
            reason: format!("Allocated {} kcal for your {} plan.", allocated, strategy),
            nutrition,
        }
    }

    /// Runs the schedule in order over `remaining` kcal.
    pub async fn allocate_plan(
        &self,
        remaining: f64,
        strategy: &str,
        schedule: &[ScheduleEntry],
        rng: &mut (dyn RngCore + Send),
    ) -> DayPlan {
        let mut slots = Vec::with_capacity(schedule.len());
        for entry in schedule {
            let target = allocated_calories(remaining, entry.ratio);
            slots.push(self.allocate_slot(*entry, target, strategy, rng).await);
        }
        DayPlan { slots }
    }
}
