use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::planner::PlannerMode;
use crate::profile::UserProfile;
use crate::strategy::{DEFAULT_LABEL_COLUMN, DEFAULT_NEIGHBORS};

#[derive(Parser, Debug)]
#[command(author, version, about = "Calorie-budgeted recipes and meal plans", long_about = None)]
pub struct Cli {
    /// Seed for reproducible sampling and phrasing
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Nutrition reference dataset (FoodData Central JSON or CSV)
    #[arg(long, global = true)]
    pub nutrition_table: Option<PathBuf>,

    /// Trained strategy model artifact
    #[arg(long, global = true)]
    pub strategy_model: Option<PathBuf>,

    /// Meal plan algorithm: generated or catalog
    #[arg(long, global = true)]
    pub planner_mode: Option<PlannerMode>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate one recipe from a comma separated ingredient list
    Recipe {
        #[arg(short, long)]
        ingredients: String,
        #[arg(long, default_value = "Any")]
        cuisine: String,
        #[arg(long, default_value = "")]
        dietary_restrictions: String,
    },
    /// Build a full-day meal plan for a profile
    MealPlan {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Log a meal and plan the rest of the day
    Adaptive {
        /// What was eaten, e.g. "pizza, coke"
        #[arg(short, long)]
        food: String,
        #[arg(long, default_value = "lunch")]
        meal_type: String,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// BMI and daily calorie needs
    Health {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Estimate macros for a comma separated ingredient list
    Estimate {
        ingredients: String,
        #[arg(long)]
        serving_size_g: Option<f64>,
    },
    /// Fit the strategy model from a labelled CSV dataset and save it
    TrainStrategy {
        #[arg(long)]
        data: PathBuf,
        /// Defaults to the configured strategy model path
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(short, long, default_value_t = DEFAULT_NEIGHBORS)]
        k: usize,
        #[arg(long, default_value = DEFAULT_LABEL_COLUMN)]
        label_column: String,
        /// Feature columns, comma separated (default: Age,Weight_kg,Height_cm,BMI)
        #[arg(long, value_delimiter = ',')]
        features: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub weight_kg: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub height_cm: f64,
    #[arg(long)]
    pub age: u32,
    #[arg(long)]
    pub gender: String,
    /// sedentary, moderate or active
    #[arg(long, default_value = "Sedentary")]
    pub activity_level: String,
    #[arg(long, default_value = "Maintain")]
    pub health_goals: String,
    #[arg(long, default_value = "None")]
    pub dietary_restrictions: String,
}

impl From<ProfileArgs> for UserProfile {
    fn from(args: ProfileArgs) -> Self {
        UserProfile {
            weight_kg: args.weight_kg,
            height_cm: args.height_cm,
            age: args.age,
            gender: args.gender,
            activity_level: args.activity_level,
            health_goals: args.health_goals,
            dietary_restrictions: args.dietary_restrictions,
        }
    }
}

impl Cli {
    /// Flags win over environment values.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(path) = &self.nutrition_table {
            config.nutrition_table = path.clone();
        }
        if let Some(path) = &self.strategy_model {
            config.strategy_model = path.clone();
        }
        if let Some(mode) = self.planner_mode {
            config.planner_mode = mode;
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
