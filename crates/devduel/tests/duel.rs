//! End-to-end tests through the `devduel` facade: two clients, one
//! shared store, a full duel from lobby to leaderboard.

use std::collections::HashMap;
use std::sync::Arc;

use devduel::{
    Difficulty, DuelClient, HistoryStore, MatchError, MemoryAnchors,
    MemoryHistory, MemoryProblems, MemoryStore, PlayerEntry, PlayerId,
    PlayerIdentity, Problem, ProblemId, Score, SessionDoc, SessionError,
    SessionId, SessionStore, TestCase, Timestamp,
};

// =========================================================================
// Helpers
// =========================================================================

type Client = DuelClient<MemoryStore, MemoryProblems, MemoryHistory, MemoryAnchors>;

struct World {
    store: Arc<MemoryStore>,
    history: Arc<MemoryHistory>,
    problems: Arc<MemoryProblems>,
}

impl World {
    fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            history: Arc::new(MemoryHistory::new()),
            problems: Arc::new(MemoryProblems::new(vec![two_sum()])),
        }
    }

    /// A client for `name`, with its own private anchor storage (each
    /// real client has its own browser/local state).
    fn client(&self, name: &str) -> Client {
        DuelClient::new(
            PlayerIdentity::guest(name),
            Arc::clone(&self.store),
            Arc::clone(&self.problems),
            Arc::clone(&self.history),
            Arc::new(MemoryAnchors::new()),
        )
    }
}

fn two_sum() -> Problem {
    Problem {
        problem_id: ProblemId::from("two-sum"),
        name: "Two Sum".into(),
        description: "Return indices of the two numbers adding to target.".into(),
        difficulty: Difficulty::Easy,
        signatures: HashMap::from([(
            "python".into(),
            "def two_sum(nums, target):".into(),
        )]),
        params: vec!["nums".into(), "target".into()],
        sample_tests: vec![TestCase {
            params: "[2, 7, 11, 15], 9".into(),
            expected: "[0, 1]".into(),
        }],
        total_tests: 10,
    }
}

// =========================================================================
// Full duel
// =========================================================================

#[tokio::test]
async fn test_full_duel_lobby_to_leaderboard() {
    let world = World::new();
    let alice = world.client("alice");
    let bob = world.client("bob");

    // Alice opens a room.
    let open = alice.create_match(Difficulty::Easy, 300).await.unwrap();

    // Bob finds it in the lobby and joins.
    let lobby = bob.lobby().await.unwrap();
    assert_eq!(lobby.len(), 1);
    assert_eq!(lobby[0].room_name, "alice");
    let mut bob_game = bob.join_match(&lobby[0].session_id).await.unwrap();

    // Alice's side sees the join and her match begins.
    let mut alice_game = open.wait_for_opponent().await.unwrap();

    // Alice gets partway; Bob finishes the problem.
    alice_game
        .submit(Score { solved: 6, total: 10 }, "partial".into())
        .await
        .unwrap();
    bob_game
        .submit(Score { solved: 10, total: 10 }, "complete".into())
        .await
        .unwrap();

    // Both clients resolve, and they agree.
    let alice_outcome = alice_game.outcome().await.unwrap();
    let bob_outcome = bob_game.outcome().await.unwrap();
    assert!(bob_outcome.won);
    assert!(!alice_outcome.won);
    assert_eq!(alice_outcome.opponent_score, Score { solved: 10, total: 10 });

    // The session is gone; the lobby is empty again.
    assert!(alice.lobby().await.unwrap().is_empty());

    // One win for bob on the board.
    let board = world.history.leaderboard().await.unwrap();
    assert_eq!(board[0], (PlayerId::from("bob"), 1));
}

#[tokio::test]
async fn test_third_client_bounced_back_to_lobby() {
    let world = World::new();
    let alice = world.client("alice");
    let bob = world.client("bob");
    let carol = world.client("carol");

    let open = alice.create_match(Difficulty::Easy, 300).await.unwrap();
    let session_id = open.session_id().clone();
    let _bob_game = bob.join_match(&session_id).await.unwrap();

    // Carol raced for the same room and lost.
    let err = carol
        .join_match(&session_id)
        .await
        .err()
        .expect("third join should fail");
    match err {
        devduel::DevduelError::Session(SessionError::Full(id)) => {
            assert_eq!(id, session_id);
        }
        other => panic!("expected Full, got {other}"),
    }

    // Discovery shows her no joinable rooms (the duel is in progress).
    let lobby = carol.lobby().await.unwrap();
    assert!(devduel::joinable(&lobby).is_empty());
}

#[tokio::test]
async fn test_create_without_matching_problem_fails() {
    let world = World::new();
    let alice = world.client("alice");

    // The seeded store only has an Easy problem.
    let result = alice.create_match(Difficulty::Hard, 300).await;
    assert!(matches!(
        result,
        Err(devduel::DevduelError::Session(
            SessionError::ProblemUnavailable(Difficulty::Hard)
        ))
    ));
}

#[tokio::test]
async fn test_cancelled_waiting_room_is_deleted() {
    let world = World::new();
    let alice = world.client("alice");

    let open = alice.create_match(Difficulty::Easy, 300).await.unwrap();
    let session_id = open.session_id().clone();

    open.cancel().await.unwrap();

    assert!(matches!(
        world.store.get(&session_id).await,
        Err(devduel::StoreError::NotFound(_))
    ));
    assert!(alice.lobby().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_abandoned_match_frees_the_room() {
    let world = World::new();
    let alice = world.client("alice");
    let bob = world.client("bob");

    let open = alice.create_match(Difficulty::Easy, 300).await.unwrap();
    let session_id = open.session_id().clone();
    let _bob_game = bob.join_match(&session_id).await.unwrap();
    let alice_game = open.wait_for_opponent().await.unwrap();

    alice_game.abandon().await.unwrap();

    assert!(matches!(
        world.store.get(&session_id).await,
        Err(devduel::StoreError::NotFound(_))
    ));
    assert!(alice.lobby().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_after_match_ends_is_finished_error() {
    let world = World::new();
    let alice = world.client("alice");
    let bob = world.client("bob");

    let open = alice.create_match(Difficulty::Easy, 300).await.unwrap();
    let session_id = open.session_id().clone();
    let bob_game = bob.join_match(&session_id).await.unwrap();
    let mut alice_game = open.wait_for_opponent().await.unwrap();

    bob_game
        .submit(Score { solved: 10, total: 10 }, "done".into())
        .await
        .unwrap();
    alice_game.outcome().await.unwrap();

    let result = alice_game
        .submit(Score { solved: 9, total: 10 }, "late".into())
        .await;
    assert!(matches!(
        result,
        Err(devduel::DevduelError::Match(MatchError::Finished))
    ));
}

// =========================================================================
// Lobby cleanup
// =========================================================================

#[tokio::test]
async fn test_lobby_prunes_abandoned_rooms() {
    let world = World::new();
    let alice = world.client("alice");

    // A 7-hour-old full session and a dead one, written directly as a
    // stale backend would hold them.
    let seven_hours_ago = Timestamp(Timestamp::now().as_millis() - 7 * 60 * 60 * 1_000);
    let stale = SessionDoc {
        session_id: SessionId::from("stale"),
        room_name: "ghosts".into(),
        problem_id: ProblemId::from("two-sum"),
        difficulty: Difficulty::Easy,
        duration_secs: 60,
        created_at: seven_hours_ago,
        players: vec![
            PlayerEntry::joining(&PlayerIdentity::guest("g1"), 10, seven_hours_ago),
            PlayerEntry::joining(&PlayerIdentity::guest("g2"), 10, seven_hours_ago),
        ],
    };
    let dead = SessionDoc {
        session_id: SessionId::from("dead"),
        players: vec![],
        ..stale.clone()
    };
    world.store.create(stale).await.unwrap();
    world.store.create(dead).await.unwrap();

    let lobby = alice.lobby().await.unwrap();
    assert!(lobby.is_empty());

    // And they are really gone, not just filtered.
    assert!(world.store.get(&SessionId::from("stale")).await.is_err());
    assert!(world.store.get(&SessionId::from("dead")).await.is_err());
}
