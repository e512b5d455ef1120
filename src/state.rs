use std::sync::Arc;

use crate::model::{ModelConfig, PredictionService};

#[derive(Clone)]
pub struct AppState {
    service: Arc<PredictionService>,
}

impl AppState {
    pub fn new(service: PredictionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn from_env() -> Self {
        Self::new(PredictionService::new(ModelConfig::from_env()))
    }

    pub fn service(&self) -> &PredictionService {
        &self.service
    }
}
