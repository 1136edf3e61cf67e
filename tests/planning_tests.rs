use nutrichef::config::AppConfig;
use nutrichef::engine::NutriChef;
use nutrichef::planner::{allocated_calories, PlannerMode};
use nutrichef::profile::{ProfileError, UserProfile};
use nutrichef::recipe_generator::RecipeRequest;
use nutrichef::strategy::{StrategyModel, DEFAULT_FEATURES, DEFAULT_LABEL_COLUMN};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, TempDir};

fn reference_profile() -> UserProfile {
    UserProfile {
        weight_kg: 80.0,
        height_cm: 175.0,
        age: 30,
        gender: "Male".to_string(),
        activity_level: "Moderate".to_string(),
        health_goals: "Lose Weight".to_string(),
        dietary_restrictions: "None".to_string(),
    }
}

fn write_file(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

/// Engine backed by a small CSV table and a strategy model that labels the reference profile Keto.
fn trained_engine(dir: &TempDir) -> NutriChef {
    let table = write_file(
        dir.path(),
        "table.csv",
        &[
            "Name,kcal/100g,Protein (g/100g),Fat (g/100g),Carbohydrate (g/100g)",
            "Dragon Fruit,60,1.2,0,13",
        ],
    );
    let dataset = write_file(
        dir.path(),
        "diet.csv",
        &[
            "Patient_ID,Age,Weight_kg,Height_cm,BMI,Diet_Recommendation",
            "P1,30,80,175,26.1,Keto",
            "P2,31,82,176,26.5,Keto",
            "P3,29,78,174,25.8,Keto",
            "P4,65,55,160,21.5,Balanced",
            "P5,70,50,158,20.0,Balanced",
            "P6,60,58,165,21.3,Balanced",
        ],
    );
    let features: Vec<String> = DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect();
    let model_path = dir.path().join("models").join("diet_model.bin");
    StrategyModel::fit_from_csv(&dataset, &features, DEFAULT_LABEL_COLUMN, 3)
        .unwrap()
        .save(&model_path)
        .unwrap();

    let config = AppConfig {
        nutrition_table: table,
        strategy_model: model_path,
        api_key_env: "NUTRICHEF_E2E_UNSET_KEY".to_string(),
        planner_mode: PlannerMode::Generated,
        ..AppConfig::default()
    };
    NutriChef::initialize(&config)
}

#[test]
fn test_initialization_reports_loaded_artifacts() {
    let dir = Builder::new().prefix("nutrichef").tempdir().unwrap();
    let engine = trained_engine(&dir);
    let caps = engine.capabilities();
    assert!(caps.has_reference_table);
    assert!(caps.has_strategy_model);
    assert!(!caps.has_generative_backend);

    // merged entry plus the defaults still in place
    assert_eq!(engine.estimate(&["dragon fruit".to_string()]).calories, 120);
    assert_eq!(engine.estimate(&["rice".to_string()]).calories, 260);
}

#[tokio::test]
async fn test_adaptive_plan_after_breakfast() {
    let dir = Builder::new().prefix("nutrichef").tempdir().unwrap();
    let engine = trained_engine(&dir);
    let mut rng = StdRng::seed_from_u64(2024);

    let recommendation = engine
        .recommend_adaptive_diet("pizza", "Breakfast", &reference_profile(), &mut rng)
        .await
        .unwrap();

    assert_eq!(recommendation.calories_consumed_estimate, 532);
    assert_eq!(recommendation.calories_remaining, 1678);
    assert_eq!(recommendation.nutritional_analysis, "Analyzed 'pizza'. Strategy: Keto");
    assert!(recommendation.contextual_advice.contains("pizza"));

    let remaining = 2210.5625 - 532.0;
    let ratios = [0.45, 0.15, 0.40];
    assert!((ratios.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    let expected: i64 = ratios.iter().map(|r| allocated_calories(remaining, *r)).sum();
    let planned: i64 = recommendation.day_plan.iter().map(|m| m.recipe.calories).sum();
    assert_eq!(planned, expected);
    assert_eq!(planned, 755 + 251 + 671);

    let first = &recommendation.day_plan[0];
    assert_eq!(first.meal_type, "Lunch");
    assert_eq!(first.suggestion_reason, "Allocated 755 kcal for your Keto plan.");
    assert!(first.recipe.title.ends_with(" (Algorithmic AI)"));
}

#[tokio::test]
async fn test_adaptive_plan_is_reproducible_for_a_seed() {
    let dir = Builder::new().prefix("nutrichef").tempdir().unwrap();
    let engine = trained_engine(&dir);
    let profile = reference_profile();

    let first = engine
        .recommend_adaptive_diet("salad", "lunch", &profile, &mut StdRng::seed_from_u64(77))
        .await
        .unwrap();
    let second = engine
        .recommend_adaptive_diet("salad", "lunch", &profile, &mut StdRng::seed_from_u64(77))
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_generate_recipe_is_structurally_valid() {
    let dir = Builder::new().prefix("nutrichef").tempdir().unwrap();
    let engine = trained_engine(&dir);
    let request = RecipeRequest::new("chicken, broccoli, rice", "Asian", "None");

    for seed in 0..5 {
        let recipe = engine.generate_recipe(&request, &mut StdRng::seed_from_u64(seed)).await;
        assert!(!recipe.title.is_empty());
        assert!(!recipe.ingredients.is_empty());
        assert!(recipe.calories > 0);
        assert_eq!(recipe.cuisine_type, "Asian");
    }
}

#[tokio::test]
async fn test_zero_height_is_rejected_at_the_boundary() {
    let dir = Builder::new().prefix("nutrichef").tempdir().unwrap();
    let engine = trained_engine(&dir);
    let mut profile = reference_profile();
    profile.height_cm = 0.0;
    let mut rng = StdRng::seed_from_u64(1);

    let adaptive = engine.recommend_adaptive_diet("apple", "lunch", &profile, &mut rng).await;
    assert!(matches!(adaptive, Err(ProfileError::NonPositiveHeight(_))));
    assert!(engine.create_meal_plan(&profile, &mut rng).await.is_err());
    assert!(engine.analyze_health(&profile).is_err());
}

#[tokio::test]
async fn test_meal_plan_uses_classified_strategy() {
    let dir = Builder::new().prefix("nutrichef").tempdir().unwrap();
    let engine = trained_engine(&dir);
    let mut rng = StdRng::seed_from_u64(3);

    let plan = engine.create_meal_plan(&reference_profile(), &mut rng).await.unwrap();
    assert_eq!(plan.total_daily_calories, 2210);
    assert_eq!(plan.meals.len(), 4);
    for meal in &plan.meals {
        let recipe = meal.recipe.as_ref().unwrap();
        assert_eq!(recipe.cuisine_type, "Keto");
        assert_eq!(recipe.calories, meal.calories);
    }
}
