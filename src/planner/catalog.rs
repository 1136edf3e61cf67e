use rand::seq::SliceRandom;
use rand::RngCore;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CatalogMeal {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub calories: i64,
    pub macros: &'static str,
}

const fn meal(name: &'static str, meal_type: MealType, calories: i64, macros: &'static str) -> CatalogMeal {
    CatalogMeal { name, meal_type, calories, macros }
}

pub const MEAL_CATALOG: &[CatalogMeal] = &[
    meal("Oatmeal with Berries", MealType::Breakfast, 250, "P: 8g, C: 45g, F: 5g"),
    meal("Veggie Omelette", MealType::Breakfast, 300, "P: 14g, C: 5g, F: 20g"),
    meal("Avocado Toast", MealType::Breakfast, 350, "P: 6g, C: 40g, F: 15g"),
    meal("Protein Pancakes", MealType::Breakfast, 400, "P: 25g, C: 40g, F: 8g"),
    meal("Grilled Chicken Salad", MealType::Lunch, 350, "P: 30g, C: 15g, F: 10g"),
    meal("Quinoa Bowl with Tofu", MealType::Lunch, 400, "P: 18g, C: 50g, F: 12g"),
    meal("Turkey Wrap", MealType::Lunch, 450, "P: 28g, C: 35g, F: 15g"),
    meal("Lentil Soup & Bread", MealType::Lunch, 300, "P: 15g, C: 45g, F: 5g"),
    meal("Salmon with Asparagus", MealType::Dinner, 500, "P: 35g, C: 10g, F: 25g"),
    meal("Beef Stir Fry", MealType::Dinner, 600, "P: 30g, C: 60g, F: 20g"),
    meal("Pasta Primavera", MealType::Dinner, 550, "P: 12g, C: 80g, F: 15g"),
    meal("Baked Cod with Rice", MealType::Dinner, 450, "P: 25g, C: 50g, F: 10g"),
    meal("Greek Yogurt", MealType::Snack, 150, "P: 15g, C: 10g, F: 0g"),
    meal("Almonds & Apple", MealType::Snack, 200, "P: 4g, C: 20g, F: 12g"),
    meal("Protein Shake", MealType::Snack, 180, "P: 25g, C: 5g, F: 2g"),
    meal("Hummus & Carrots", MealType::Snack, 150, "P: 5g, C: 15g, F: 8g"),
    meal("Cottage Cheese", MealType::Snack, 120, "P: 12g, C: 4g, F: 2g"),
];

const MAIN_MEALS: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];
const FILL_ATTEMPTS: usize = 20;
const FILL_MARGIN: f64 = 100.0;
const LIGHT_MEAL_LIMIT: i64 = 300;

/// Greedy catalog selection: one breakfast, one lunch and one dinner, then snacks or light
/// entries until the total reaches `target - 100` or the attempt budget runs out. Never repeats
/// an entry.
pub fn select_catalog_meals(target: f64, rng: &mut (dyn RngCore + Send)) -> Vec<CatalogMeal> {
    let mut pool: Vec<CatalogMeal> = MEAL_CATALOG.to_vec();
    pool.shuffle(rng);

    let mut selected: Vec<CatalogMeal> = Vec::new();
    let mut total = 0i64;

    for meal_type in MAIN_MEALS {
        let options: Vec<&CatalogMeal> = pool.iter().filter(|m| m.meal_type == meal_type).collect();
        if let Some(choice) = options.choose(rng) {
            total += choice.calories;
            selected.push(**choice);
        }
    }

    let fillers: Vec<&CatalogMeal> = pool
        .iter()
        .filter(|m| m.meal_type == MealType::Snack || m.calories < LIGHT_MEAL_LIMIT)
        .collect();
    let mut attempts = 0;
    while (total as f64) < target - FILL_MARGIN && attempts < FILL_ATTEMPTS {
        let Some(choice) = fillers.choose(rng) else { break };
        if !selected.iter().any(|m| m.name == choice.name) {
            total += choice.calories;
            selected.push(**choice);
        }
        attempts += 1;
    }

    selected
}
