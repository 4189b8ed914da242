use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvailableDetectionModel {
    pub model_name: &'static str,
    pub model_source: &'static str,
}

pub const DETECTION_MODELS: &[AvailableDetectionModel] = &[AvailableDetectionModel {
    model_name: "kitchen-food-count-v2",
    model_source: "hosted",
}];

/// Request sent to the detection service: which media resource to analyze
/// and which model to run.
#[derive(Debug, Serialize, Clone)]
pub struct DetectionRequest {
    pub video_uri: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f32>,
}

/// One detected class and how many distinct instances were counted.
#[derive(Debug, Deserialize, Clone)]
pub struct DetectedClassCount {
    pub label: String,
    pub count: u64,
}

/// Detection service response: an opaque report identifier plus one row
/// per distinct detected class.
#[derive(Debug, Deserialize, Clone)]
pub struct DetectionResponse {
    pub report_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub detections: Vec<DetectedClassCount>,
}
