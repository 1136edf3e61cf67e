use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::RngCore;

use super::{RecipeBackendError, RecipeDraft, RecipeRequest, RecipeTextProvider};
use crate::nutrition::split_ingredient_list;

pub const PANTRY_STAPLES: [&str; 3] = ["Olive Oil", "Salt", "Special Herbs"];

const TITLE_TEMPLATES: &[&str] = &[
    "{Cuisine} Delight: {Main}",
    "Homestyle {Main} ({Cuisine} Twist)",
    "Quick & Easy {Main} with {Sides}",
    "The Ultimate {Cuisine} {Main}",
];

const INSTRUCTION_TEMPLATES: &[&str] = &[
    "Start by prepping {ingredients}. Heat a pan and cook the base. Add seasonings and simmer. Serve fresh.",
    "Marinate {main_item} for 30 mins. Roast vegetables. Combine everything in a pot and cook until tender.",
    "Chop all ingredients finely. Sauté the {main_item} until golden. Mix in the rest and cook on high heat.",
    "Whisk the wet ingredients. Fold in {ingredients}. Bake at 350F for 20 mins or until cooked through.",
];

/// Deterministic fallback generator: fills one of a few fixed templates with the first
/// ingredient as the main item and the rest as sides.
#[derive(Debug, Clone, Default)]
pub struct TemplateRecipeEngine;

impl TemplateRecipeEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, request: &RecipeRequest, rng: &mut (dyn RngCore + Send)) -> RecipeDraft {
        let items = split_ingredient_list(&request.ingredients);
        let main_item = items.first().map(String::as_str).unwrap_or("Dish");
        let sides = if items.len() > 1 { items[1..].join(", ") } else { "Spices".to_string() };

        let title_template = TITLE_TEMPLATES.choose(rng).copied().unwrap_or(TITLE_TEMPLATES[0]);
        let instruction_template = INSTRUCTION_TEMPLATES.choose(rng).copied().unwrap_or(INSTRUCTION_TEMPLATES[0]);

        let title = title_template
            .replace("{Cuisine}", &request.cuisine)
            .replace("{Main}", main_item)
            .replace("{Sides}", &sides);
        let instructions = instruction_template
            .replace("{ingredients}", &request.ingredients)
            .replace("{main_item}", main_item);

        let mut ingredients = items.clone();
        ingredients.extend(PANTRY_STAPLES.iter().map(|s| s.to_string()));

        RecipeDraft { title, ingredients, instructions }
    }
}

#[async_trait]
impl RecipeTextProvider for TemplateRecipeEngine {
    fn name(&self) -> &str {
        "template"
    }

    async fn produce(
        &self,
        request: &RecipeRequest,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<RecipeDraft, RecipeBackendError> {
        Ok(self.render(request, rng))
    }
}
