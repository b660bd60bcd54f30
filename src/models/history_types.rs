use serde::{Deserialize, Serialize};

use super::diagnosis_types::DiagnosisClass;

/// One past diagnosis. Field names match the stored JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    /// Display name of the predicted class.
    pub diagnosis: String,
    pub confidence: String,
    /// Local time rendered in the es-ES style, or raw epoch millis.
    pub timestamp: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

impl HistoryRecord {
    pub fn icon(&self) -> &'static str {
        DiagnosisClass::from_display_name(&self.diagnosis)
            .map(|class| class.icon())
            .unwrap_or("❓")
    }
}
