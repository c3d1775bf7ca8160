//! The outcome resolver: a pure comparison over the stored entries.
//!
//! Both clients evaluate this function against the same two stored
//! entries and the session's creation time, so determinism here is what
//! makes the distributed outcome consistent — there is no coordination,
//! only the same arithmetic on the same inputs.
//!
//! The rules, from the evaluating player's perspective:
//!
//! 1. Higher score fraction wins.
//! 2. Equal fractions, both zero: a loss for both viewpoints. There is
//!    no draw state — a 0-0 duel has no winner.
//! 3. Equal nonzero fractions: whoever reached that score in less time
//!    (smaller `submitted_at - created_at`) wins. Exactly equal elapsed
//!    times lose from both viewpoints, the same convention as 0-0.
//!
//! A missing or malformed opponent entry is scored `0/total`, so the
//! match always resolves even when the other client never wrote or
//! wrote garbage.

use devduel_protocol::Timestamp;
use devduel_store::PlayerEntry;

/// Decides the match from `me`'s perspective.
///
/// Returns `true` if `me` won. `opponent` is `None` when no second
/// entry exists at evaluation time (the opponent never joined or never
/// submitted a readable score).
pub fn resolve(
    me: &PlayerEntry,
    opponent: Option<&PlayerEntry>,
    created_at: Timestamp,
    total_tests: u32,
) -> bool {
    let mine = me.score_or_zero(total_tests).fraction();
    let theirs = opponent
        .map(|o| o.score_or_zero(total_tests).fraction())
        .unwrap_or(0.0);

    if mine > theirs {
        return true;
    }
    if mine < theirs {
        return false;
    }

    // Equal fractions. A scoreless tie is a loss for both viewpoints.
    if mine == 0.0 {
        return false;
    }

    // Equal and nonzero: the opponent entry must exist (a missing one
    // scores 0, which the zero case above already handled). Faster to
    // the shared score wins; an exact tie loses from both viewpoints.
    match opponent {
        Some(opp) => me.elapsed(created_at) < opp.elapsed(created_at),
        None => false,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use devduel_protocol::PlayerId;

    use super::*;

    // -- Helpers ----------------------------------------------------------

    const CREATED: Timestamp = Timestamp(1_000);

    /// Entry that submitted `score` at `secs_after` seconds past creation.
    fn entry(id: &str, score: &str, secs_after: u64) -> PlayerEntry {
        PlayerEntry {
            player_id: PlayerId::from(id),
            display_name: id.to_string(),
            score: score.to_string(),
            submitted_at: CREATED.plus_secs(secs_after),
        }
    }

    /// Resolves the same pair from both perspectives.
    fn both_views(a: &PlayerEntry, b: &PlayerEntry) -> (bool, bool) {
        (
            resolve(a, Some(b), CREATED, 10),
            resolve(b, Some(a), CREATED, 10),
        )
    }

    // =====================================================================
    // Basic fraction comparison
    // =====================================================================

    #[test]
    fn test_resolve_higher_fraction_wins() {
        let a = entry("a", "7/10", 30);
        let b = entry("b", "4/10", 20);
        assert_eq!(both_views(&a, &b), (true, false));
    }

    #[test]
    fn test_resolve_lower_fraction_loses() {
        let a = entry("a", "2/10", 10);
        let b = entry("b", "9/10", 50);
        assert_eq!(both_views(&a, &b), (false, true));
    }

    #[test]
    fn test_resolve_zero_zero_is_double_loss() {
        // No draw state: a scoreless duel has no winner.
        let a = entry("a", "0/10", 0);
        let b = entry("b", "0/10", 0);
        assert_eq!(both_views(&a, &b), (false, false));
    }

    // =====================================================================
    // Tie-break on elapsed time
    // =====================================================================

    #[test]
    fn test_resolve_equal_scores_faster_player_wins() {
        // A reached 5/10 at t=30s, B reached 5/10 at t=45s: A wins on
        // both clients.
        let a = entry("a", "5/10", 30);
        let b = entry("b", "5/10", 45);
        assert_eq!(both_views(&a, &b), (true, false));
    }

    #[test]
    fn test_resolve_equal_scores_equal_elapsed_double_loss() {
        // Strict "less time wins" from each viewpoint: an exact tie
        // satisfies neither, same convention as 0-0.
        let a = entry("a", "5/10", 30);
        let b = entry("b", "5/10", 30);
        assert_eq!(both_views(&a, &b), (false, false));
    }

    #[test]
    fn test_resolve_tiebreak_uses_elapsed_not_absolute() {
        // The comparison is submitted_at - created_at for each player,
        // evaluated identically by both clients.
        let a = entry("a", "5/10", 10);
        let b = entry("b", "5/10", 11);
        assert!(resolve(&a, Some(&b), CREATED, 10));
    }

    // =====================================================================
    // Missing / malformed opponents
    // =====================================================================

    #[test]
    fn test_resolve_missing_opponent_scored_zero() {
        let a = entry("a", "1/10", 30);
        assert!(resolve(&a, None, CREATED, 10), "any score beats absent");
    }

    #[test]
    fn test_resolve_missing_opponent_and_zero_self_loses() {
        let a = entry("a", "0/10", 0);
        assert!(!resolve(&a, None, CREATED, 10));
    }

    #[test]
    fn test_resolve_malformed_opponent_scored_zero() {
        // A broken peer writes garbage; it must resolve as 0/total, not
        // crash or win.
        let a = entry("a", "3/10", 30);
        let b = entry("b", "NaN/banana", 10);
        assert_eq!(both_views(&a, &b), (true, false));
    }

    #[test]
    fn test_resolve_both_malformed_double_loss() {
        let a = entry("a", "", 0);
        let b = entry("b", "oops", 0);
        assert_eq!(both_views(&a, &b), (false, false));
    }

    // =====================================================================
    // Symmetry property
    // =====================================================================

    #[test]
    fn test_resolve_never_both_win_across_grid() {
        // Sweep score/time combinations: the two viewpoints must never
        // both claim victory, and must only both lose in the defined
        // tie cases (equal fractions, and if nonzero, equal elapsed).
        let cases: &[(&str, u64)] = &[
            ("0/10", 0),
            ("3/10", 10),
            ("5/10", 30),
            ("5/10", 45),
            ("10/10", 20),
            ("bogus", 15),
        ];

        for &(sa, ta) in cases {
            for &(sb, tb) in cases {
                let a = entry("a", sa, ta);
                let b = entry("b", sb, tb);
                let (a_won, b_won) = both_views(&a, &b);

                assert!(
                    !(a_won && b_won),
                    "both won for {sa}@{ta} vs {sb}@{tb}"
                );

                let fa = a.score_or_zero(10).fraction();
                let fb = b.score_or_zero(10).fraction();
                if !a_won && !b_won {
                    assert_eq!(fa, fb, "double loss with unequal scores");
                    if fa > 0.0 {
                        assert_eq!(
                            a.elapsed(CREATED),
                            b.elapsed(CREATED),
                            "nonzero double loss with unequal elapsed"
                        );
                    }
                }
            }
        }
    }
}
