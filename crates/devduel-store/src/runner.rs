//! The code-execution service boundary.
//!
//! Execution happens in an external sandbox; this module only fixes the
//! request/report shapes and provides a scripted stand-in for tests and
//! the demo. The match core consumes nothing from a report beyond the
//! aggregate score fraction of a successful run.

use std::collections::VecDeque;

use devduel_protocol::{ProblemId, Score};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::StoreError;

/// An available language runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runtime {
    pub language: String,
    pub version: String,
}

/// A request to execute a player's solution against a problem's suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub language: String,
    pub version: String,
    pub problem_id: ProblemId,
    pub code: String,
}

/// Per-test outcome within a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

/// Classified result of one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunReport {
    /// The code ran; per-test results plus captured stdout.
    Success {
        tests: Vec<TestResult>,
        output: Vec<String>,
        score: Score,
    },
    /// The code raised a runtime error.
    Bug { output: Vec<String> },
    /// The execution infrastructure itself failed.
    Failure { error: String },
}

impl RunReport {
    /// The submittable score, present only for successful runs.
    pub fn score(&self) -> Option<Score> {
        match self {
            Self::Success { score, .. } => Some(*score),
            _ => None,
        }
    }
}

/// The sandboxed execution service.
pub trait CodeRunner: Send + Sync + 'static {
    /// Lists available language runtimes.
    async fn runtimes(&self) -> Result<Vec<Runtime>, StoreError>;

    /// Executes a solution and classifies the result.
    async fn run(&self, request: RunRequest) -> Result<RunReport, StoreError>;
}

// ---------------------------------------------------------------------------
// ScriptedRunner
// ---------------------------------------------------------------------------

/// A [`CodeRunner`] that replays queued reports in order.
///
/// Lets tests and the demo drive a match without a sandbox: queue the
/// reports each `run` call should produce, in call order.
pub struct ScriptedRunner {
    runtimes: Vec<Runtime>,
    reports: Mutex<VecDeque<RunReport>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            runtimes: vec![
                Runtime {
                    language: "python".into(),
                    version: "3.12.0".into(),
                },
                Runtime {
                    language: "javascript".into(),
                    version: "20.11.1".into(),
                },
                Runtime {
                    language: "java".into(),
                    version: "21.0.2".into(),
                },
            ],
            reports: Mutex::new(VecDeque::new()),
        }
    }

    /// Queues the report the next unscripted `run` call will return.
    pub async fn queue(&self, report: RunReport) {
        self.reports.lock().await.push_back(report);
    }

    /// Shorthand for queueing a successful run with the given score.
    pub async fn queue_success(&self, score: Score) {
        self.queue(RunReport::Success {
            tests: Vec::new(),
            output: Vec::new(),
            score,
        })
        .await;
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeRunner for ScriptedRunner {
    async fn runtimes(&self) -> Result<Vec<Runtime>, StoreError> {
        Ok(self.runtimes.clone())
    }

    async fn run(&self, request: RunRequest) -> Result<RunReport, StoreError> {
        let mut reports = self.reports.lock().await;
        match reports.pop_front() {
            Some(report) => Ok(report),
            None => {
                tracing::warn!(
                    problem_id = %request.problem_id,
                    "scripted runner exhausted, reporting failure"
                );
                Ok(RunReport::Failure {
                    error: "no scripted result queued".into(),
                })
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
