pub mod api_connection;
pub mod cli;
pub mod config;
pub mod energy;
pub mod engine;
pub mod nutrition;
pub mod planner;
pub mod profile;
pub mod recipe_generator;
pub mod strategy;
