use crate::error::{AppError, PredictionError};
use crate::models::diagnosis_types::{DiagnosisClass, PredictionOutcome, PredictionResult};
use crate::models::intake_types::ImageCandidate;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://felipepflorezo-corn-disease-api.hf.space/predict";

/// Multipart field holding the image bytes.
const FILE_FIELD: &str = "file";

/// Performs one remote classification per call.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, candidate: &ImageCandidate) -> PredictionOutcome;
}

#[derive(Deserialize)]
struct RawPrediction {
    predicted_class: String,
    confidence: String,
    all_probabilities: serde_json::Map<String, serde_json::Value>,
}

/// Classifier backed by the HTTP prediction endpoint.
pub struct HttpClassifier {
    endpoint: String,
    http_client: Client,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            endpoint: endpoint.into(),
            http_client: builder.build()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn image_part(candidate: &ImageCandidate) -> Part {
        let file_name = candidate.display_file_name().to_string();
        match Part::bytes(candidate.bytes().to_vec())
            .file_name(file_name.clone())
            .mime_str(candidate.media_type())
        {
            Ok(part) => part,
            Err(e) => {
                warn!(media_type = %candidate.media_type(), "Unusable media type, sending without it: {}", e);
                Part::bytes(candidate.bytes().to_vec()).file_name(file_name)
            }
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, candidate: &ImageCandidate) -> PredictionOutcome {
        debug!(
            endpoint = %self.endpoint,
            file = %candidate.display_file_name(),
            bytes = candidate.size(),
            "Sending classification request"
        );

        let form = Form::new().part(FILE_FIELD, Self::image_part(candidate));

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PredictionError::Connection(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), "Classification response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                warn!(status = status.as_u16(), "Failed to read error body: {}", e);
                String::new()
            });
            return Err(PredictionError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PredictionError::Connection(format!("Failed to read response body: {}", e)))?;

        parse_response(&body)
    }
}

/// Turns a response body into a typed result.
///
/// Bodies that are not JSON at all are protocol errors; JSON that lacks the
/// expected fields is a malformed response.
pub fn parse_response(body: &str) -> PredictionOutcome {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| PredictionError::Protocol(format!("Failed to parse response: {}", e)))?;

    let raw: RawPrediction = serde_json::from_value(value)
        .map_err(|e| PredictionError::MalformedResponse(e.to_string()))?;

    if raw.predicted_class.is_empty() {
        return Err(PredictionError::MalformedResponse("empty predicted_class".into()));
    }
    if raw.confidence.is_empty() {
        return Err(PredictionError::MalformedResponse("empty confidence".into()));
    }
    if raw.all_probabilities.is_empty() {
        return Err(PredictionError::MalformedResponse("empty all_probabilities".into()));
    }

    let mut probabilities = Vec::with_capacity(raw.all_probabilities.len());
    for (label, value) in raw.all_probabilities {
        match value {
            serde_json::Value::String(text) => probabilities.push((label, text)),
            other => {
                return Err(PredictionError::MalformedResponse(format!(
                    "probability for {} is not text: {}",
                    label, other
                )))
            }
        }
    }

    if !probabilities.iter().any(|(label, _)| *label == raw.predicted_class) {
        warn!(predicted = %raw.predicted_class, "Predicted class missing from probability map");
    }

    Ok(PredictionResult {
        predicted_class: DiagnosisClass::from_label(&raw.predicted_class),
        confidence: raw.confidence,
        probabilities,
    })
}
