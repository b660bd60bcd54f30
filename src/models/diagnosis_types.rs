use serde::{Deserialize, Serialize};

use crate::error::PredictionError;

/// Disease classes the remote classifier is known to emit.
///
/// Labels outside the fixed set are kept verbatim in `Unknown` so a newer
/// service version never breaks display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DiagnosisClass {
    Blight,
    CommonRust,
    GrayLeafSpot,
    Healthy,
    Unknown(String),
}

const KNOWN_CLASSES: [DiagnosisClass; 4] = [
    DiagnosisClass::Blight,
    DiagnosisClass::CommonRust,
    DiagnosisClass::GrayLeafSpot,
    DiagnosisClass::Healthy,
];

impl DiagnosisClass {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Blight" => DiagnosisClass::Blight,
            "Common_Rust" => DiagnosisClass::CommonRust,
            "Gray_Leaf_Spot" => DiagnosisClass::GrayLeafSpot,
            "Healthy" => DiagnosisClass::Healthy,
            other => DiagnosisClass::Unknown(other.to_string()),
        }
    }

    /// Wire label as sent by the classification service.
    pub fn label(&self) -> &str {
        match self {
            DiagnosisClass::Blight => "Blight",
            DiagnosisClass::CommonRust => "Common_Rust",
            DiagnosisClass::GrayLeafSpot => "Gray_Leaf_Spot",
            DiagnosisClass::Healthy => "Healthy",
            DiagnosisClass::Unknown(raw) => raw,
        }
    }

    /// Spanish display name; unknown labels pass through untouched.
    pub fn display_name(&self) -> &str {
        match self {
            DiagnosisClass::Blight => "Tizón",
            DiagnosisClass::CommonRust => "Roya Común",
            DiagnosisClass::GrayLeafSpot => "Mancha Gris",
            DiagnosisClass::Healthy => "Saludable",
            DiagnosisClass::Unknown(raw) => raw,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            DiagnosisClass::Blight => "🦠",
            DiagnosisClass::CommonRust => "🔶",
            DiagnosisClass::GrayLeafSpot => "⚫",
            DiagnosisClass::Healthy => "✅",
            DiagnosisClass::Unknown(_) => "❓",
        }
    }

    /// Reverse lookup used by history entries, which only keep the display name.
    pub fn from_display_name(name: &str) -> Option<Self> {
        KNOWN_CLASSES
            .iter()
            .find(|class| class.display_name() == name)
            .cloned()
    }
}

impl From<String> for DiagnosisClass {
    fn from(label: String) -> Self {
        DiagnosisClass::from_label(&label)
    }
}

impl From<DiagnosisClass> for String {
    fn from(class: DiagnosisClass) -> Self {
        class.label().to_string()
    }
}

/// A validated classification response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predicted_class: DiagnosisClass,
    pub confidence: String,
    /// Label to percentage text, in the order the service sent them.
    pub probabilities: Vec<(String, String)>,
}

pub type PredictionOutcome = Result<PredictionResult, PredictionError>;

/// One class probability placed within a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub label: String,
    pub display_name: String,
    pub percentage: f64,
    pub percentage_text: String,
    pub is_top: bool,
}

impl RankedEntry {
    pub fn class(&self) -> DiagnosisClass {
        DiagnosisClass::from_label(&self.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    NotAnImage,
    UnreadableImage,
    ConnectionError,
    ServerError,
    ProtocolError,
    MalformedResponse,
}

/// A failure as exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub message: String,
}

impl From<&PredictionError> for Failure {
    fn from(err: &PredictionError) -> Self {
        let status = match err {
            PredictionError::Server { status, .. } => Some(*status),
            _ => None,
        };
        Failure {
            kind: err.kind(),
            status,
            message: err.to_string(),
        }
    }
}
