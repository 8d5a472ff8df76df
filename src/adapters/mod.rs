pub mod prediction_api;

pub use prediction_api::{PredictRequest, PredictionApiClient, PredictionTransport, IMAGE_FIELD};

#[cfg(test)]
pub use prediction_api::MockPredictionTransport;
