//! The `"solved/total"` score fraction.
//!
//! Scores travel through the session store as strings, so there are two
//! parsing paths: the strict one ([`Score::parse`]) for values this
//! client is about to write, and [`Score::parse_or_zero`] for values the
//! opponent wrote — a broken peer must not be able to crash our outcome
//! computation, so garbage degrades to `0/total`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ScoreError;

/// A player's score as a fraction of test cases passed.
///
/// Invariants (enforced by [`Score::parse`] and the constructors):
/// `total >= 1` and `solved <= total`. Both players in a session share
/// the same `total` — it is the problem's test count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub solved: u32,
    pub total: u32,
}

impl Score {
    /// A zero score over the given denominator. The denominator is
    /// clamped to at least 1 so a zero score still has a valid fraction.
    pub fn zero(total: u32) -> Self {
        Self {
            solved: 0,
            total: total.max(1),
        }
    }

    /// Strict parse of a `"solved/total"` string.
    ///
    /// # Errors
    /// [`ScoreError::Malformed`] on a missing slash, non-numeric parts,
    /// a zero denominator, or `solved > total`.
    pub fn parse(s: &str) -> Result<Self, ScoreError> {
        let malformed = || ScoreError::Malformed(s.to_string());
        let (solved, total) = s.split_once('/').ok_or_else(malformed)?;
        let solved: u32 = solved.trim().parse().map_err(|_| malformed())?;
        let total: u32 = total.trim().parse().map_err(|_| malformed())?;
        if total == 0 || solved > total {
            return Err(malformed());
        }
        Ok(Self { solved, total })
    }

    /// Parse with a fallback: malformed input becomes `0/total_hint`.
    ///
    /// Used whenever the string came from the other player. `total_hint`
    /// is the session's known denominator.
    pub fn parse_or_zero(s: &str, total_hint: u32) -> Self {
        Self::parse(s).unwrap_or_else(|_| Self::zero(total_hint))
    }

    /// The score as a fraction in `[0, 1]`.
    pub fn fraction(self) -> f64 {
        f64::from(self.solved) / f64::from(self.total)
    }

    /// `true` when every test case passed.
    pub fn is_perfect(self) -> bool {
        self.solved == self.total
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.solved, self.total)
    }
}

// =========================================================================
// Tests
// =========================================================================
