pub mod data_loader;
pub mod estimator;
pub mod table;

pub use data_loader::build_nutrition_table;
pub use estimator::{split_ingredient_list, NutritionEstimate, NutritionEstimator, DEFAULT_SERVING_SIZE_G};
pub use table::{NutrientRecord, NutritionTable};
