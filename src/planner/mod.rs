pub mod allocator;
pub mod catalog;
pub mod orchestrator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::recipe_generator::Recipe;

pub use allocator::{allocated_calories, ingredient_pool, DayPlan, MealSlot, PlanAllocator, MIN_SLOT_CALORIES};
pub use catalog::{select_catalog_meals, CatalogMeal, MealType, MEAL_CATALOG};
pub use orchestrator::{DietOrchestrator, DietRecommendation, RecommendedMeal};

/// One entry of a day schedule: a slot label and its share of the budget being split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEntry {
    pub label: &'static str,
    pub ratio: f64,
}

impl ScheduleEntry {
    pub const fn new(label: &'static str, ratio: f64) -> Self {
        Self { label, ratio }
    }
}

/// Whole-day split used by `CreateMealPlan` in generated mode.
pub const FULL_DAY_SCHEDULE: &[ScheduleEntry] = &[
    ScheduleEntry::new("Breakfast", 0.25),
    ScheduleEntry::new("Lunch", 0.35),
    ScheduleEntry::new("Snack", 0.10),
    ScheduleEntry::new("Dinner", 0.30),
];

/// Which meal-plan algorithm backs `CreateMealPlan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlannerMode {
    /// Ratio-based slots, each with a generated recipe.
    #[default]
    Generated,
    /// Fixed catalog selection.
    Catalog,
}

impl FromStr for PlannerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generated" => Ok(PlannerMode::Generated),
            "catalog" => Ok(PlannerMode::Catalog),
            other => Err(format!("unknown planner mode '{}' (expected 'generated' or 'catalog')", other)),
        }
    }
}

impl fmt::Display for PlannerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerMode::Generated => write!(f, "generated"),
            PlannerMode::Catalog => write!(f, "catalog"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlannedMeal {
    pub name: String,
    #[serde(rename = "type")]
    pub meal_type: String,
    pub calories: i64,
    pub macros: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub recipe: Option<Recipe>,
}

impl From<&CatalogMeal> for PlannedMeal {
    fn from(meal: &CatalogMeal) -> Self {
        Self {
            name: meal.name.to_string(),
            meal_type: meal.meal_type.to_string(),
            calories: meal.calories,
            macros: meal.macros.to_string(),
            recipe: None,
        }
    }
}

impl From<MealSlot> for PlannedMeal {
    fn from(slot: MealSlot) -> Self {
        Self {
            name: slot.recipe.title.clone(),
            meal_type: slot.label.to_string(),
            calories: slot.allocated_calories,
            macros: format!(
                "P: {}g, C: {}g, F: {}g",
                slot.nutrition.protein, slot.nutrition.carbs, slot.nutrition.fat
            ),
            recipe: Some(slot.recipe),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanResponse {
    pub goal: String,
    pub total_daily_calories: i64,
    pub suggestion: String,
    pub meals: Vec<PlannedMeal>,
}

impl MealPlanResponse {
    pub fn new(goal: &str, target: f64, meals: Vec<PlannedMeal>) -> Self {
        let total_daily_calories = target as i64;
        let planned: i64 = meals.iter().map(|m| m.calories).sum();
        Self {
            goal: goal.to_string(),
            total_daily_calories,
            suggestion: format!("Target: {} kcal. Generated Plan: {} kcal.", total_daily_calories, planned),
            meals,
        }
    }
}
