mod metrics;
mod model_trainer;

pub use metrics::Metrics;
pub use model_trainer::ModelTrainer;
