use crate::models::diagnosis_types::PredictionResult;
use crate::models::history_types::HistoryRecord;
use crate::services::store::KeyValueStore;
use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Store entry holding the serialized record list.
pub const HISTORY_KEY: &str = "cornDiseaseHistory";

/// Ordered, size-bounded log of past diagnoses, newest first.
///
/// Every mutation is written through to the store. Store failures are logged
/// and otherwise ignored: history is best effort and never blocks a diagnosis.
pub struct HistoryLedger {
    store: Arc<dyn KeyValueStore>,
    records: Vec<HistoryRecord>,
    /// Maximum records kept; `None` keeps everything.
    limit: Option<usize>,
}

impl HistoryLedger {
    /// Opens the ledger and loads whatever the store holds.
    pub fn open(store: Arc<dyn KeyValueStore>, limit: Option<usize>) -> Self {
        let mut ledger = Self {
            store,
            records: Vec::new(),
            limit: limit.filter(|l| *l > 0),
        };
        ledger.load();
        ledger
    }

    /// Re-reads the store. Absent or unreadable data yields an empty ledger.
    pub fn load(&mut self) -> &[HistoryRecord] {
        self.records = match self.store.get(HISTORY_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<HistoryRecord>>(&json) {
                Ok(records) => {
                    debug!(count = records.len(), "History loaded");
                    records
                }
                Err(e) => {
                    warn!("Could not load history, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not load history, starting empty: {}", e);
                Vec::new()
            }
        };

        if let Some(limit) = self.limit {
            if self.records.len() > limit {
                debug!(limit, dropped = self.records.len() - limit, "Trimming stored history");
                self.records.truncate(limit);
                self.persist();
            }
        }
        &self.records
    }

    /// Prepends a record for `result` and persists the whole list.
    pub fn record(&mut self, result: &PredictionResult, file_name: &str) -> HistoryRecord {
        let now_ms = Local::now().timestamp_millis();
        let id = match self.records.first() {
            Some(latest) if latest.id >= now_ms => latest.id + 1,
            _ => now_ms,
        };

        let record = HistoryRecord {
            id,
            diagnosis: result.predicted_class.display_name().to_string(),
            confidence: result.confidence.clone(),
            timestamp: format_timestamp(now_ms),
            file_name: file_name.to_string(),
        };

        self.records.insert(0, record.clone());
        if let Some(limit) = self.limit {
            self.records.truncate(limit);
        }

        debug!(id = record.id, diagnosis = %record.diagnosis, "History record added");
        self.persist();
        record
    }

    /// Empties the ledger. Callers must have confirmed this with the user.
    pub fn clear(&mut self) {
        self.records.clear();
        self.persist();
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.records) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not serialize history: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(HISTORY_KEY, &json) {
            warn!("Could not save history: {}", e);
        }
    }
}

/// Renders epoch millis like the es-ES locale ("17/10/2026, 14:05:09").
/// Falls back to the raw number when the instant is out of range.
pub fn format_timestamp(epoch_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(epoch_ms) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%-d/%-m/%Y, %H:%M:%S")
            .to_string(),
        None => epoch_ms.to_string(),
    }
}
