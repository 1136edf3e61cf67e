pub mod classifier;
pub mod neighbors;

pub use classifier::{
    majority_label, StrategyClassifier, StrategyModel, DEFAULT_FEATURES, DEFAULT_LABEL_COLUMN, DEFAULT_NEIGHBORS,
    DEFAULT_STRATEGY,
};
pub use neighbors::NeighborIndex;
