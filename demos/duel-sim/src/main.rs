//! Simulated duel: two clients race on one problem, end to end.
//!
//! Alice creates a room, Bob finds it in the lobby and joins, both run
//! scripted "solutions" and submit scores, and Bob's perfect run ends
//! the match early. Both coordinators resolve independently and must
//! agree on the winner.
//!
//! Run with:
//! ```text
//! RUST_LOG=devduel=info cargo run -p duel-sim
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use devduel::prelude::*;
use devduel::{
    CodeRunner, HistoryStore, MemoryAnchors, MemoryHistory, MemoryProblems,
    MemoryStore, Problem, ProblemId, RunRequest, ScriptedRunner, TestCase,
};
use tracing_subscriber::EnvFilter;

fn seed_problems() -> Vec<Problem> {
    vec![Problem {
        problem_id: ProblemId::from("two-sum"),
        name: "Two Sum".into(),
        description: "Given a list of integers and a target, return the \
                      indices of the two numbers that add up to the target."
            .into(),
        difficulty: Difficulty::Easy,
        signatures: HashMap::from([
            ("python".into(), "def two_sum(nums, target):".into()),
            ("javascript".into(), "function twoSum(nums, target) {}".into()),
        ]),
        params: vec!["nums".into(), "target".into()],
        sample_tests: vec![TestCase {
            params: "[2, 7, 11, 15], 9".into(),
            expected: "[0, 1]".into(),
        }],
        total_tests: 10,
    }]
}

#[tokio::main]
async fn main() -> Result<(), DevduelError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("devduel=info")),
        )
        .init();

    // Shared backends — the one thing both clients touch.
    let store = Arc::new(MemoryStore::new());
    let history = Arc::new(MemoryHistory::new());
    let problems = Arc::new(MemoryProblems::new(seed_problems()));

    // Per-client state.
    let alice = DuelClient::new(
        PlayerIdentity::new("user-alice", "alice"),
        Arc::clone(&store),
        Arc::clone(&problems),
        Arc::clone(&history),
        Arc::new(MemoryAnchors::new()),
    );
    let bob = DuelClient::new(
        PlayerIdentity::guest("bob"),
        Arc::clone(&store),
        Arc::clone(&problems),
        Arc::clone(&history),
        Arc::new(MemoryAnchors::new()),
    );

    // Alice opens a room; Bob discovers and joins it.
    let open = alice.create_match(Difficulty::Easy, 300).await?;

    let lobby = bob.lobby().await?;
    let room = lobby.first().expect("alice's room should be listed");
    println!(
        "lobby: {}'s game ({}, {}s)",
        room.room_name, room.difficulty, room.duration_secs
    );
    let mut bob_game = bob.join_match(&room.session_id).await?;
    let mut alice_game = open.wait_for_opponent().await?;

    // Each player "runs" their code against the sandbox stand-in.
    let runner = ScriptedRunner::new();
    runner.queue_success(Score { solved: 6, total: 10 }).await;
    runner.queue_success(Score { solved: 10, total: 10 }).await;

    let alice_code = "def two_sum(nums, target):\n    ...  # partial";
    let alice_report = runner
        .run(RunRequest {
            language: "python".into(),
            version: "3.12.0".into(),
            problem_id: ProblemId::from("two-sum"),
            code: alice_code.into(),
        })
        .await?;
    if let Some(score) = alice_report.score() {
        alice_game.submit(score, alice_code.into()).await?;
    }

    let bob_code = "function twoSum(nums, target) { /* full solution */ }";
    let bob_report = runner
        .run(RunRequest {
            language: "javascript".into(),
            version: "20.11.1".into(),
            problem_id: ProblemId::from("two-sum"),
            code: bob_code.into(),
        })
        .await?;
    if let Some(score) = bob_report.score() {
        // A perfect run: this ends the match for both players, well
        // before the 300s clock.
        bob_game.submit(score, bob_code.into()).await?;
    }

    let alice_outcome = alice_game.outcome().await.expect("match should resolve");
    let bob_outcome = bob_game.outcome().await.expect("match should resolve");

    println!(
        "alice: {} ({} vs {})",
        if alice_outcome.won { "won" } else { "lost" },
        alice_outcome.my_score,
        alice_outcome.opponent_score,
    );
    println!(
        "bob:   {} ({} vs {})",
        if bob_outcome.won { "won" } else { "lost" },
        bob_outcome.my_score,
        bob_outcome.opponent_score,
    );
    assert_ne!(alice_outcome.won, bob_outcome.won, "clients must agree");

    println!("\nleaderboard:");
    for (player, wins) in history.leaderboard().await? {
        println!("  {player}: {wins} wins");
    }

    Ok(())
}
