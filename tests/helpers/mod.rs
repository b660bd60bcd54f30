//! Shared fixtures for integration tests
//!
//! Classifier doubles and a throwaway HTTP prediction endpoint.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use corn_doctor_lib::error::PredictionError;
use corn_doctor_lib::models::diagnosis_types::PredictionOutcome;
use corn_doctor_lib::models::intake_types::ImageCandidate;
use corn_doctor_lib::services::classifier::client::{parse_response, Classifier};
use corn_doctor_lib::services::history::HistoryLedger;
use corn_doctor_lib::services::store::{KeyValueStore, MemoryStore};
use corn_doctor_lib::services::workflow::{WorkflowConfig, WorkflowController};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const COMMON_RUST_RESPONSE: &str = r#"{"predicted_class":"Common_Rust","confidence":"87.3%","all_probabilities":{"Common_Rust":"87.3%","Healthy":"10.1%","Blight":"1.8%","Gray_Leaf_Spot":"0.8%"}}"#;

pub const HEALTHY_RESPONSE: &str = r#"{"predicted_class":"Healthy","confidence":"98.2%","all_probabilities":{"Blight":"0.5%","Common_Rust":"0.7%","Gray_Leaf_Spot":"0.6%","Healthy":"98.2%"}}"#;

pub fn outcome_from(body: &str) -> PredictionOutcome {
    parse_response(body)
}

/// Replays queued outcomes in order; runs dry into connection errors.
pub struct ScriptedClassifier {
    outcomes: Mutex<VecDeque<PredictionOutcome>>,
    calls: AtomicUsize,
    seen_files: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    pub fn new(outcomes: Vec<PredictionOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
            seen_files: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_files(&self) -> Vec<String> {
        self.seen_files.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, candidate: &ImageCandidate) -> PredictionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_files
            .lock()
            .unwrap()
            .push(candidate.file_name().to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PredictionError::Connection("script exhausted".into())))
    }
}

/// Blocks every call until released, so tests can act mid-flight.
pub struct GatedClassifier {
    outcome: PredictionOutcome,
    calls: AtomicUsize,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedClassifier {
    pub fn new(outcome: PredictionOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for GatedClassifier {
    async fn classify(&self, _candidate: &ImageCandidate) -> PredictionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        self.outcome.clone()
    }
}

pub fn controller_with(
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn KeyValueStore>,
) -> WorkflowController {
    WorkflowController::new(
        classifier,
        HistoryLedger::open(store, None),
        WorkflowConfig::default(),
    )
}

pub fn memory_controller(classifier: Arc<dyn Classifier>) -> WorkflowController {
    controller_with(classifier, Arc::new(MemoryStore::new()))
}

/// Serves `router` on an ephemeral local port and returns the predict URL.
pub async fn spawn_endpoint(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/predict", addr)
}
