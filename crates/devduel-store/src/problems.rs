//! Problem definitions and the problem store.
//!
//! Problems live in an external collection; the match core only needs
//! to pick one by difficulty at session creation and look one up by id.

use std::collections::HashMap;

use devduel_protocol::{Difficulty, ProblemId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::StoreError;

/// Sample tests shown to players; the full suite stays server-side.
pub const MAX_SAMPLE_TESTS: usize = 3;

/// One example test case with literal parameters and expected output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub params: String,
    pub expected: String,
}

/// A problem definition as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub problem_id: ProblemId,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Per-language reference signature, keyed by language name.
    pub signatures: HashMap<String, String>,
    /// Declared parameter names.
    pub params: Vec<String>,
    /// Up to [`MAX_SAMPLE_TESTS`] example cases.
    pub sample_tests: Vec<TestCase>,
    /// Size of the full test suite — the session's score denominator.
    pub total_tests: u32,
}

/// Source of problem definitions.
pub trait ProblemStore: Send + Sync + 'static {
    /// Picks a problem matching the difficulty. `Ok(None)` means no
    /// problem matches (the caller surfaces this as problem-unavailable).
    async fn pick(&self, difficulty: Difficulty) -> Result<Option<Problem>, StoreError>;

    /// Looks up a specific problem by id.
    async fn get(&self, id: &ProblemId) -> Result<Option<Problem>, StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryProblems
// ---------------------------------------------------------------------------

/// A [`ProblemStore`] backed by a seeded process-local list.
///
/// `pick` rotates through the problems of a difficulty so repeated
/// sessions don't always get the same one.
#[derive(Default)]
pub struct MemoryProblems {
    problems: Vec<Problem>,
    next_pick: Mutex<usize>,
}

impl MemoryProblems {
    pub fn new(mut problems: Vec<Problem>) -> Self {
        for problem in &mut problems {
            problem.sample_tests.truncate(MAX_SAMPLE_TESTS);
        }
        Self {
            problems,
            next_pick: Mutex::new(0),
        }
    }
}

impl ProblemStore for MemoryProblems {
    async fn pick(&self, difficulty: Difficulty) -> Result<Option<Problem>, StoreError> {
        let matching: Vec<&Problem> = self
            .problems
            .iter()
            .filter(|p| p.difficulty == difficulty)
            .collect();
        if matching.is_empty() {
            return Ok(None);
        }
        let mut next = self.next_pick.lock().await;
        let picked = matching[*next % matching.len()].clone();
        *next += 1;
        Ok(Some(picked))
    }

    async fn get(&self, id: &ProblemId) -> Result<Option<Problem>, StoreError> {
        Ok(self.problems.iter().find(|p| &p.problem_id == id).cloned())
    }
}

// =========================================================================
// Tests
// =========================================================================
