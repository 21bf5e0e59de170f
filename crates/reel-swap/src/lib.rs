//! Face swap prediction API client.
//!
//! Wraps a hosted prediction service: submit a face swap job, poll it to a
//! terminal status, and hand back the output download URL.

pub mod client;
pub mod error;
pub mod types;

pub use client::{PredictionClient, PredictionClientConfig, DEFAULT_MODEL_VERSION};
pub use error::{SwapError, SwapResult};
pub use types::{Prediction, PredictionRequest, PredictionStatus, SwapInput};
