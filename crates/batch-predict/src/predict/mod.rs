//! Batch prediction over matrix rows.
//!
//! - [`batch_predict`] / [`batch_predict_into`]: infallible predictors
//! - [`try_batch_predict`] / [`try_batch_predict_into`]: fallible predictors, fail-fast
//! - [`BatchPredictor`]: the same operations with a stored factory and [`BatchPredictConfig`]

mod batch;
mod config;
mod error;
mod predictor;

pub use batch::{
    batch_predict, batch_predict_into, try_batch_predict, try_batch_predict_into, BatchPredictor,
};
pub use config::{BatchPredictConfig, DEFAULT_PARTITION_SIZE};
pub use error::{BatchPredictError, MatrixSide};
pub use predictor::{
    CloneFactory, FalliblePredictor, FalliblePredictorFactory, Predictor, PredictorFactory,
};
