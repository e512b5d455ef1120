pub mod activity;
pub mod affinity;
pub mod config;
pub mod error;
pub mod features;
pub mod priors;
pub mod scoring;
pub mod service;
pub mod types;

pub use config::ModelConfig;
pub use service::{PredictionReport, PredictionRequest, PredictionService};
pub use types::*;
