pub mod export;
pub mod features;
pub mod hybrid;
pub mod providers;
pub mod recommendations;
pub mod snapshot;
pub mod strategies;

pub use hybrid::HybridSettings;
pub use recommendations::{recommend, RecommendationRequest, RecommendationSettings};
pub use snapshot::{ModelSnapshot, TrainingError};
