use regex::Regex;
use serde::{Deserialize, Serialize};

use super::table::{NutrientRecord, NutritionTable};

pub const DEFAULT_SERVING_SIZE_G: f64 = 200.0;

/// Contribution of an ingredient with no table match. Not scaled by serving size.
pub const UNMATCHED_FALLBACK: NutrientRecord = NutrientRecord::new(150.0, 5.0, 3.0, 20.0);

const MODIFIER_PATTERN: &str = r"\b(chopped|diced|sliced|fresh|raw|cooked|boiled|grilled|fried|cups?|tablespoon|tbsp|teaspoon|tsp|grams?|g|kg|oz|pound|lb)\b";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionEstimate {
    pub calories: i64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub matched_count: usize,
    pub total_count: usize,
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub struct NutritionEstimator {
    table: NutritionTable,
    modifiers: Regex,
    serving_size_g: f64,
}

impl NutritionEstimator {
    pub fn new(table: NutritionTable) -> Self {
        Self::with_serving_size(table, DEFAULT_SERVING_SIZE_G)
    }

    pub fn with_serving_size(table: NutritionTable, serving_size_g: f64) -> Self {
        // The pattern is a compile-time constant.
        let modifiers = Regex::new(MODIFIER_PATTERN).expect("modifier pattern is valid");
        Self { table, modifiers, serving_size_g }
    }

    pub fn table(&self) -> &NutritionTable {
        &self.table
    }

    pub fn serving_size_g(&self) -> f64 {
        self.serving_size_g
    }

    /// Lowercases, drops preparation and measurement words, trims.
    pub fn normalize(&self, ingredient: &str) -> String {
        let lowered = ingredient.trim().to_lowercase();
        self.modifiers.replace_all(&lowered, "").trim().to_string()
    }

    /// Exact key first, then the first table key (in table order) that contains or is contained
    /// by the normalized name.
    pub fn find_match(&self, ingredient: &str) -> Option<&NutrientRecord> {
        let normalized = self.normalize(ingredient);
        if let Some(record) = self.table.get(&normalized) {
            return Some(record);
        }
        self.table
            .iter()
            .find(|(name, _)| normalized.contains(name) || name.contains(normalized.as_str()))
            .map(|(_, record)| record)
    }

    pub fn estimate(&self, ingredients: &[String]) -> NutritionEstimate {
        self.estimate_with_serving(ingredients, self.serving_size_g)
    }

    pub fn estimate_with_serving(&self, ingredients: &[String], serving_size_g: f64) -> NutritionEstimate {
        let scale = serving_size_g / 100.0;
        let mut total = NutrientRecord::default();
        let mut matched_count = 0;

        for ingredient in ingredients {
            let contribution = match self.find_match(ingredient) {
                Some(record) => {
                    matched_count += 1;
                    NutrientRecord::new(
                        record.calories * scale,
                        record.protein * scale,
                        record.fat * scale,
                        record.carbs * scale,
                    )
                }
                None => UNMATCHED_FALLBACK,
            };
            total.calories += contribution.calories;
            total.protein += contribution.protein;
            total.fat += contribution.fat;
            total.carbs += contribution.carbs;
        }

        NutritionEstimate {
            calories: total.calories as i64,
            protein: round_one_decimal(total.protein),
            fat: round_one_decimal(total.fat),
            carbs: round_one_decimal(total.carbs),
            matched_count,
            total_count: ingredients.len(),
        }
    }

    /// Calorie estimate for a comma separated food description such as "pizza, coke".
    pub fn estimate_meal_calories(&self, description: &str) -> i64 {
        self.estimate(&split_ingredient_list(description)).calories
    }
}

/// Splits a comma separated list, trimming and dropping empty items.
pub fn split_ingredient_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
