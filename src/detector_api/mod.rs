pub mod connection;
pub mod endpoints;

pub use connection::{Detector, DetectorApiError};
pub use endpoints::{DetectionRequest, DetectionResponse, DETECTION_MODELS};
