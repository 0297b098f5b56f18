
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::module_system::error::BoxError;
use crate::module_system::initializer::InitAction;

// Test helper to track step execution
#[derive(Clone, Default)]
pub(crate) struct ExecutionTracker {
    executed: Arc<Mutex<Vec<String>>>,
}

impl ExecutionTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, step: &str) {
        self.executed.lock().unwrap().push(step.to_string());
    }

    pub(crate) fn order(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    /// Position of `step` in the execution order
    pub(crate) fn position(&self, step: &str) -> Option<usize> {
        self.order().iter().position(|s| s == step)
    }

    /// A step that records `label` and succeeds
    pub(crate) fn step(&self, label: &str) -> RecordingStep {
        RecordingStep {
            label: label.to_string(),
            tracker: self.clone(),
            error_message: None,
        }
    }

    /// A step that records `label` and then fails
    pub(crate) fn failing_step(&self, label: &str, message: &str) -> RecordingStep {
        RecordingStep {
            label: label.to_string(),
            tracker: self.clone(),
            error_message: Some(message.to_string()),
        }
    }
}

pub(crate) struct RecordingStep {
    label: String,
    tracker: ExecutionTracker,
    error_message: Option<String>,
}

#[async_trait]
impl InitAction for RecordingStep {
    async fn run(&self) -> Result<(), BoxError> {
        self.tracker.record(&self.label);
        match &self.error_message {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }
}
