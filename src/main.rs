use anyhow::{Context, Result};
use nutrichef::cli::{parse_args, Command};
use nutrichef::config::AppConfig;
use nutrichef::engine::NutriChef;
use nutrichef::nutrition::split_ingredient_list;
use nutrichef::profile::UserProfile;
use nutrichef::recipe_generator::RecipeRequest;
use nutrichef::strategy::{StrategyModel, DEFAULT_FEATURES};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", rendered);
    Ok(())
}

fn train_strategy(data: &Path, output: &Path, features: Vec<String>, label_column: &str, k: usize) -> Result<()> {
    let features = if features.is_empty() {
        DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect()
    } else {
        features
    };
    let model = StrategyModel::fit_from_csv(data, &features, label_column, k)
        .with_context(|| format!("Failed to fit strategy model from '{}'", data.display()))?;
    model
        .save(output)
        .with_context(|| format!("Failed to save strategy model to '{}'", output.display()))?;
    info!(rows = model.index.len(), "Strategy model written to {}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let mut config = AppConfig::from_env().context("Failed to read NutriChef configuration")?;
    cli.apply_overrides(&mut config);

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let engine = || NutriChef::initialize(&config);

    match cli.command {
        Command::Recipe {
            ingredients,
            cuisine,
            dietary_restrictions,
        } => {
            let request = RecipeRequest::new(ingredients, cuisine, dietary_restrictions);
            print_json(&engine().generate_recipe(&request, &mut rng).await)
        }
        Command::MealPlan { profile } => {
            let profile = UserProfile::from(profile);
            print_json(&engine().create_meal_plan(&profile, &mut rng).await?)
        }
        Command::Adaptive {
            food,
            meal_type,
            profile,
        } => {
            let profile = UserProfile::from(profile);
            print_json(&engine().recommend_adaptive_diet(&food, &meal_type, &profile, &mut rng).await?)
        }
        Command::Health { profile } => print_json(&engine().analyze_health(&UserProfile::from(profile))?),
        Command::Estimate {
            ingredients,
            serving_size_g,
        } => {
            let engine = engine();
            let items = split_ingredient_list(&ingredients);
            let estimate = match serving_size_g {
                Some(grams) => engine.estimator().estimate_with_serving(&items, grams),
                None => engine.estimate(&items),
            };
            print_json(&estimate)
        }
        Command::TrainStrategy {
            data,
            output,
            k,
            label_column,
            features,
        } => {
            let output = output.unwrap_or_else(|| config.strategy_model.clone());
            train_strategy(&data, &output, features, &label_column, k)
        }
    }
}
