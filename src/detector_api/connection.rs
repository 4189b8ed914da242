use dotenv::dotenv;
use reqwest::Client;
use std::env;
use std::error::Error;
use std::fmt;

use super::endpoints::{
    AvailableDetectionModel, DetectionRequest, DetectionResponse, DETECTION_MODELS,
};

#[derive(Debug)]
pub enum DetectorApiError {
    MissingConfiguration(String),
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
}

impl fmt::Display for DetectorApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorApiError::MissingConfiguration(var_name) => {
                write!(f, "Detector configuration not found in environment: {}", var_name)
            }
            DetectorApiError::NetworkError(err) => write!(f, "Network error: {}", err),
            DetectorApiError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            DetectorApiError::ApiError { status, error_body } => {
                write!(f, "Detector API error {}: {}", status, error_body)
            }
        }
    }
}

impl Error for DetectorApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DetectorApiError::NetworkError(err) => Some(err),
            DetectorApiError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DetectorApiError {
    fn from(err: reqwest::Error) -> Self {
        DetectorApiError::NetworkError(err)
    }
}

impl From<serde_json::Error> for DetectorApiError {
    fn from(err: serde_json::Error) -> Self {
        DetectorApiError::SerializationError(err)
    }
}

/// External object-detection collaborator. The core treats it purely as a
/// source of per-class counts; thresholds and tracking identity stay on
/// the service side.
#[derive(Clone, Debug)]
pub enum Detector {
    HttpService {
        endpoint_env: String,
        api_key_env: String,
        available_models: Vec<AvailableDetectionModel>,
    },
}

impl Detector {
    pub fn http_service(endpoint_env_var_name: &str, api_key_env_var_name: &str) -> Self {
        dotenv().ok();
        Self::HttpService {
            endpoint_env: endpoint_env_var_name.to_string(),
            api_key_env: api_key_env_var_name.to_string(),
            available_models: DETECTION_MODELS.to_vec(),
        }
    }

    pub fn get_available_models(&self) -> Vec<AvailableDetectionModel> {
        match self {
            Detector::HttpService {
                available_models, ..
            } => available_models.clone(),
        }
    }

    /// Ask the detection service to analyze a media resource.
    ///
    /// Failures surface as a single error for the operation; nothing is
    /// persisted on this path.
    pub async fn run_detection(
        &self,
        request: DetectionRequest,
    ) -> Result<DetectionResponse, DetectorApiError> {
        match self {
            Detector::HttpService {
                endpoint_env: endpoint_env_var_name,
                api_key_env: api_key_env_var_name,
                ..
            } => {
                dotenv().ok();
                let endpoint = env::var(endpoint_env_var_name).map_err(|_| {
                    DetectorApiError::MissingConfiguration(endpoint_env_var_name.clone())
                })?;
                let api_key = env::var(api_key_env_var_name).map_err(|_| {
                    DetectorApiError::MissingConfiguration(api_key_env_var_name.clone())
                })?;

                let client = Client::new();
                let response = client
                    .post(&endpoint)
                    .bearer_auth(api_key)
                    .header("Content-Type", "application/json")
                    .json(&request)
                    .send()
                    .await?;

                if response.status().is_success() {
                    let detection_response = response.json::<DetectionResponse>().await?;
                    Ok(detection_response)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    Err(DetectorApiError::ApiError { status, error_body })
                }
            }
        }
    }
}
