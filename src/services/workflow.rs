use crate::error::IntakeError;
use crate::models::diagnosis_types::{Failure, PredictionResult, RankedEntry};
use crate::models::history_types::HistoryRecord;
use crate::models::intake_types::ImageCandidate;
use crate::services::classifier::client::Classifier;
use crate::services::classifier::ranking;
use crate::services::history::HistoryLedger;
use crate::services::intake::ImageIntake;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowPhase {
    Idle,
    ImageStaged,
    Submitting,
    ResultReady,
    Failed,
}

/// Service reachability as last observed, only reported when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionStatus {
    Checking,
    Online,
    Offline,
}

impl ConnectionStatus {
    pub fn message(&self) -> &'static str {
        match self {
            ConnectionStatus::Checking => "Analizando imagen...",
            ConnectionStatus::Online => "Análisis completado exitosamente",
            ConnectionStatus::Offline => "Error en el análisis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// The call resolved and its outcome is now exposed.
    Resolved,
    /// The call resolved after a newer image was staged; its outcome was dropped.
    Superseded,
    /// A call is already outstanding; nothing was sent.
    Busy,
    /// No image is staged; nothing was sent.
    NothingStaged,
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowConfig {
    pub report_connection_status: bool,
}

/// A successful diagnosis ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub result: PredictionResult,
    pub ranking: Vec<RankedEntry>,
    pub record: HistoryRecord,
}

impl ResultView {
    pub fn top(&self) -> Option<&RankedEntry> {
        self.ranking.iter().find(|entry| entry.is_top)
    }
}

/// Everything the presentation layer reads, captured at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSnapshot {
    pub phase: WorkflowPhase,
    pub candidate: Option<ImageCandidate>,
    pub result: Option<ResultView>,
    pub failure: Option<Failure>,
    pub history: Vec<HistoryRecord>,
    pub connection_status: Option<ConnectionStatus>,
}

struct WorkflowState {
    phase: WorkflowPhase,
    candidate: Option<ImageCandidate>,
    result: Option<ResultView>,
    failure: Option<Failure>,
    connection_status: Option<ConnectionStatus>,
    ledger: HistoryLedger,
    in_flight: bool,
    /// Bumped on every selection so late outcomes can be recognised.
    generation: u64,
}

/// Releases the in-flight slot if a submit is dropped before it resolves.
struct InFlightGuard {
    state: Arc<Mutex<WorkflowState>>,
    generation: u64,
    armed: bool,
}

impl InFlightGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.in_flight = false;
        if state.generation == self.generation && state.phase == WorkflowPhase::Submitting {
            state.phase = WorkflowPhase::ImageStaged;
            state.connection_status = None;
        }
        warn!("Classification abandoned before it resolved");
    }
}

/// Drives select -> submit -> outcome -> continue for one user.
///
/// Clones share state. At most one classification is outstanding per
/// controller; everything except `submit` completes without suspending.
#[derive(Clone)]
pub struct WorkflowController {
    classifier: Arc<dyn Classifier>,
    config: WorkflowConfig,
    state: Arc<Mutex<WorkflowState>>,
}

impl WorkflowController {
    pub fn new(classifier: Arc<dyn Classifier>, ledger: HistoryLedger, config: WorkflowConfig) -> Self {
        Self {
            classifier,
            config,
            state: Arc::new(Mutex::new(WorkflowState {
                phase: WorkflowPhase::Idle,
                candidate: None,
                result: None,
                failure: None,
                connection_status: None,
                ledger,
                in_flight: false,
                generation: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Validates and stages raw bytes, replacing any previous image and outcome.
    pub fn select_image(
        &self,
        bytes: Vec<u8>,
        media_type: &str,
        file_name: &str,
    ) -> Result<(), IntakeError> {
        self.apply_selection(ImageIntake::validate(bytes, media_type, file_name))
    }

    /// Like [`select_image`](Self::select_image) but reads the image from disk.
    pub async fn open_image(&self, path: &Path) -> Result<(), IntakeError> {
        let selection = ImageIntake::from_path(path).await;
        self.apply_selection(selection)
    }

    fn apply_selection(
        &self,
        selection: Result<ImageCandidate, IntakeError>,
    ) -> Result<(), IntakeError> {
        let mut state = self.lock();
        state.generation += 1;
        state.result = None;

        match selection {
            Ok(candidate) => {
                debug!(file = %candidate.display_file_name(), "Image selected");
                state.candidate = Some(candidate);
                state.failure = None;
                state.phase = WorkflowPhase::ImageStaged;
                Ok(())
            }
            Err(e) => {
                warn!("Image rejected: {}", e);
                state.candidate = None;
                state.failure = Some(Failure {
                    kind: e.kind(),
                    status: None,
                    message: e.to_string(),
                });
                state.phase = WorkflowPhase::Failed;
                Err(e)
            }
        }
    }

    /// Sends the staged image to the classifier and waits for the outcome.
    pub async fn submit(&self) -> SubmitStatus {
        let (candidate, generation) = {
            let mut state = self.lock();
            if state.in_flight {
                debug!("Submit ignored, a classification is already outstanding");
                return SubmitStatus::Busy;
            }
            let candidate = match state.candidate.clone() {
                Some(candidate) => candidate,
                None => return SubmitStatus::NothingStaged,
            };

            state.in_flight = true;
            state.phase = WorkflowPhase::Submitting;
            state.result = None;
            state.failure = None;
            if self.config.report_connection_status {
                state.connection_status = Some(ConnectionStatus::Checking);
            }
            (candidate, state.generation)
        };

        let guard = InFlightGuard {
            state: Arc::clone(&self.state),
            generation,
            armed: true,
        };

        info!(file = %candidate.display_file_name(), "Submitting image for diagnosis");
        let outcome = self.classifier.classify(&candidate).await;
        guard.disarm();

        let mut state = self.lock();
        state.in_flight = false;
        let superseded = state.generation != generation;

        match outcome {
            Ok(result) => {
                let record = state.ledger.record(&result, candidate.display_file_name());
                info!(
                    diagnosis = %record.diagnosis,
                    confidence = %record.confidence,
                    "Diagnosis received"
                );
                if superseded {
                    return SubmitStatus::Superseded;
                }

                let ranking = ranking::rank(&result.probabilities);
                state.result = Some(ResultView {
                    result,
                    ranking,
                    record,
                });
                state.phase = WorkflowPhase::ResultReady;
                if self.config.report_connection_status {
                    state.connection_status = Some(ConnectionStatus::Online);
                }
            }
            Err(e) => {
                warn!(kind = ?e.kind(), "Diagnosis failed: {}", e);
                if superseded {
                    return SubmitStatus::Superseded;
                }

                state.failure = Some(Failure::from(&e));
                state.phase = WorkflowPhase::Failed;
                if self.config.report_connection_status {
                    state.connection_status = Some(ConnectionStatus::Offline);
                }
            }
        }

        SubmitStatus::Resolved
    }

    /// Returns to `Idle` from a finished diagnosis. No-op in any other phase.
    pub fn continue_analysis(&self) -> bool {
        let mut state = self.lock();
        match state.phase {
            WorkflowPhase::ResultReady | WorkflowPhase::Failed => {
                state.candidate = None;
                state.result = None;
                state.failure = None;
                state.connection_status = None;
                state.phase = WorkflowPhase::Idle;
                true
            }
            _ => false,
        }
    }

    /// Wipes the history. The caller is responsible for confirming first.
    pub fn clear_history(&self) {
        let mut state = self.lock();
        state.ledger.clear();
        info!("History cleared");
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.lock().phase
    }

    pub fn is_busy(&self) -> bool {
        self.lock().in_flight
    }

    pub fn candidate(&self) -> Option<ImageCandidate> {
        self.lock().candidate.clone()
    }

    pub fn result(&self) -> Option<ResultView> {
        self.lock().result.clone()
    }

    pub fn failure(&self) -> Option<Failure> {
        self.lock().failure.clone()
    }

    pub fn connection_status(&self) -> Option<ConnectionStatus> {
        self.lock().connection_status
    }

    pub fn history(&self) -> Vec<HistoryRecord> {
        self.lock().ledger.records().to_vec()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.lock();
        WorkflowSnapshot {
            phase: state.phase,
            candidate: state.candidate.clone(),
            result: state.result.clone(),
            failure: state.failure.clone(),
            history: state.ledger.records().to_vec(),
            connection_status: state.connection_status,
        }
    }
}
