//! In-memory reference implementation of [`SessionStore`].
//!
//! Used by tests and the demo. Because the map sits behind one mutex,
//! this implementation closes the two-joiners race atomically — a real
//! remote store may only manage best effort, which is why callers must
//! still treat [`StoreError::Full`] on join as a normal outcome.

use std::collections::HashMap;

use devduel_protocol::SessionId;
use tokio::sync::{broadcast, Mutex};

use crate::{PlayerEntry, SessionDoc, SessionStore, SessionWatch, StoreError, MAX_PLAYERS};

/// Buffered snapshots per subscription before a slow consumer lags.
const SNAPSHOT_BUFFER: usize = 32;

struct Slot {
    doc: SessionDoc,
    /// Mutation fan-out. Dropping the slot (deletion) closes every
    /// subscriber's watch.
    notify: broadcast::Sender<SessionDoc>,
}

/// A [`SessionStore`] backed by a process-local map.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<SessionId, Slot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    async fn create(&self, doc: SessionDoc) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        let id = doc.session_id.clone();
        let (notify, _) = broadcast::channel(SNAPSHOT_BUFFER);
        let _ = notify.send(doc.clone());
        sessions.insert(id.clone(), Slot { doc, notify });
        tracing::info!(session_id = %id, "session document created");
        Ok(())
    }

    async fn get(&self, id: &SessionId) -> Result<SessionDoc, StoreError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(id)
            .map(|slot| slot.doc.clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn merge_player(
        &self,
        id: &SessionId,
        entry: PlayerEntry,
    ) -> Result<SessionDoc, StoreError> {
        let mut sessions = self.sessions.lock().await;
        let slot = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let players = &mut slot.doc.players;
        match players.iter_mut().find(|p| p.player_id == entry.player_id) {
            Some(existing) => *existing = entry,
            None => {
                if players.len() >= MAX_PLAYERS {
                    return Err(StoreError::Full(id.clone()));
                }
                players.push(entry);
            }
        }

        // Every subscriber gets the full updated document. Send fails
        // only when there are no receivers, which is fine.
        let _ = slot.notify.send(slot.doc.clone());
        Ok(slot.doc.clone())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.remove(id).is_some() {
            tracing::info!(session_id = %id, "session document deleted");
        } else {
            tracing::debug!(session_id = %id, "delete of absent session (no-op)");
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SessionDoc>, StoreError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.values().map(|slot| slot.doc.clone()).collect())
    }

    async fn subscribe(&self, id: &SessionId) -> Result<SessionWatch, StoreError> {
        let sessions = self.sessions.lock().await;
        let slot = sessions
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(SessionWatch::new(slot.notify.subscribe()))
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use devduel_protocol::{Difficulty, PlayerId, PlayerIdentity, ProblemId, Timestamp};

    use super::*;
    use crate::SessionStatus;

    // -- Helpers ----------------------------------------------------------

    fn doc(id: &str) -> SessionDoc {
        SessionDoc {
            session_id: SessionId::from(id),
            room_name: "alice".into(),
            problem_id: ProblemId::from("p1"),
            difficulty: Difficulty::Easy,
            duration_secs: 60,
            created_at: Timestamp::from_millis(0),
            players: vec![],
        }
    }

    fn entry(id: &str) -> PlayerEntry {
        PlayerEntry::joining(
            &PlayerIdentity::new(id, id),
            10,
            Timestamp::from_millis(0),
        )
    }

    // =====================================================================
    // create() / get() / delete()
    // =====================================================================

    #[tokio::test]
    async fn test_get_returns_created_doc() {
        let store = MemoryStore::new();
        store.create(doc("s1")).await.unwrap();

        let got = store.get(&SessionId::from("s1")).await.unwrap();
        assert_eq!(got.session_id, SessionId::from("s1"));
    }

    #[tokio::test]
    async fn test_get_missing_returns_not_found() {
        let store = MemoryStore::new();
        let result = store.get(&SessionId::from("nope")).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.create(doc("s1")).await.unwrap();

        store.delete(&SessionId::from("s1")).await.unwrap();
        // Second delete of the same id must also succeed.
        store.delete(&SessionId::from("s1")).await.unwrap();

        assert!(store.get(&SessionId::from("s1")).await.is_err());
    }

    #[tokio::test]
    async fn test_read_after_delete_is_not_found_not_empty() {
        // Deletion is terminal: the document is gone, not "zero players".
        let store = MemoryStore::new();
        store.create(doc("s1")).await.unwrap();
        store.delete(&SessionId::from("s1")).await.unwrap();

        assert!(matches!(
            store.get(&SessionId::from("s1")).await,
            Err(StoreError::NotFound(_))
        ));
    }

    // =====================================================================
    // merge_player()
    // =====================================================================

    #[tokio::test]
    async fn test_merge_player_appends_up_to_two() {
        let store = MemoryStore::new();
        store.create(doc("s1")).await.unwrap();
        let id = SessionId::from("s1");

        let after_one = store.merge_player(&id, entry("a")).await.unwrap();
        assert_eq!(after_one.status(), SessionStatus::Open);

        let after_two = store.merge_player(&id, entry("b")).await.unwrap();
        assert_eq!(after_two.status(), SessionStatus::Full);
    }

    #[tokio::test]
    async fn test_merge_player_third_player_rejected_full() {
        let store = MemoryStore::new();
        store.create(doc("s1")).await.unwrap();
        let id = SessionId::from("s1");
        store.merge_player(&id, entry("a")).await.unwrap();
        store.merge_player(&id, entry("b")).await.unwrap();

        let result = store.merge_player(&id, entry("c")).await;
        assert!(matches!(result, Err(StoreError::Full(_))));

        // The losing joiner must not have corrupted the document.
        let doc = store.get(&id).await.unwrap();
        assert_eq!(doc.players.len(), 2);
    }

    #[tokio::test]
    async fn test_merge_player_updates_existing_in_place() {
        let store = MemoryStore::new();
        store.create(doc("s1")).await.unwrap();
        let id = SessionId::from("s1");
        store.merge_player(&id, entry("a")).await.unwrap();
        store.merge_player(&id, entry("b")).await.unwrap();

        let mut update = entry("a");
        update.score = "5/10".into();
        update.submitted_at = Timestamp::from_millis(30_000);
        let merged = store.merge_player(&id, update).await.unwrap();

        // Same cardinality, same join order, new score.
        assert_eq!(merged.players.len(), 2);
        assert_eq!(merged.players[0].player_id, PlayerId::from("a"));
        assert_eq!(merged.players[0].score, "5/10");
    }

    #[tokio::test]
    async fn test_merge_player_after_delete_returns_not_found() {
        let store = MemoryStore::new();
        store.create(doc("s1")).await.unwrap();
        store.delete(&SessionId::from("s1")).await.unwrap();

        let result = store
            .merge_player(&SessionId::from("s1"), entry("a"))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    // =====================================================================
    // list()
    // =====================================================================

    #[tokio::test]
    async fn test_list_returns_all_sessions() {
        let store = MemoryStore::new();
        store.create(doc("s1")).await.unwrap();
        store.create(doc("s2")).await.unwrap();

        let mut ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.session_id.0)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["s1", "s2"]);
    }

    // =====================================================================
    // subscribe()
    // =====================================================================

    #[tokio::test]
    async fn test_subscribe_delivers_full_doc_per_mutation() {
        let store = MemoryStore::new();
        store.create(doc("s1")).await.unwrap();
        let id = SessionId::from("s1");

        let mut watch = store.subscribe(&id).await.unwrap();
        store.merge_player(&id, entry("a")).await.unwrap();

        let snapshot = watch.changed().await.expect("snapshot should arrive");
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].player_id, PlayerId::from("a"));
    }

    #[tokio::test]
    async fn test_subscribe_closes_on_delete() {
        let store = MemoryStore::new();
        store.create(doc("s1")).await.unwrap();
        let id = SessionId::from("s1");

        let mut watch = store.subscribe(&id).await.unwrap();
        store.delete(&id).await.unwrap();

        assert!(watch.changed().await.is_none(), "watch should close");
    }

    #[tokio::test]
    async fn test_subscribe_missing_session_fails() {
        let store = MemoryStore::new();
        let result = store.subscribe(&SessionId::from("nope")).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_to_latest() {
        // Write more snapshots than the buffer holds; the watch must
        // recover and deliver a recent document rather than erroring.
        let store = MemoryStore::new();
        store.create(doc("s1")).await.unwrap();
        let id = SessionId::from("s1");
        let mut watch = store.subscribe(&id).await.unwrap();

        for i in 0..(SNAPSHOT_BUFFER + 8) {
            let mut update = entry("a");
            update.score = format!("{}/100", i.min(100));
            store.merge_player(&id, update).await.unwrap();
        }

        let snapshot = watch.changed().await.expect("should still deliver");
        assert_eq!(snapshot.players.len(), 1);
    }
}
