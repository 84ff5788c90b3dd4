//! Reference Notes Store implementation using Axum.
//!
//! Serves the note CRUD contract under `/api`:
//! - GET    /api/notes       - All notes, newest id first
//! - POST   /api/notes       - Create a note
//! - PUT    /api/notes/:id   - Replace a note's text
//! - DELETE /api/notes/:id   - Delete a note
//!
//! Notes live in memory only. Statuses and messages for rejected requests
//! are 400 "Text cannot be empty" and 404 "Note not found"; the body is the
//! bare message as plain text.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use tokio::sync::oneshot;

use crate::error::{NotesError, NotesResult};
use crate::models::{DeleteReceipt, Note, NoteId, NoteText};

/// Shutdown handle of the most recently started server
static SHUTDOWN_TX: Mutex<Option<oneshot::Sender<()>>> = Mutex::new(None);

#[derive(Debug, Default)]
struct StoreInner {
    notes: Vec<Note>,
    next_id: NoteId,
}

/// In-memory note table shared between handlers
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

/// Handler failure carrying its status and message
#[derive(Debug, PartialEq, Eq)]
pub struct StoreRejection {
    pub status: StatusCode,
    pub message: &'static str,
}

impl StoreRejection {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "Note not found",
        }
    }

    fn empty_text() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Text cannot be empty",
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Store unavailable",
        }
    }
}

impl IntoResponse for StoreRejection {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl MemoryStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreInner>, StoreRejection> {
        self.inner.lock().map_err(|_| StoreRejection::internal())
    }

    /// All notes, highest id first
    pub fn list(&self) -> Result<Vec<Note>, StoreRejection> {
        let inner = self.lock()?;
        let mut notes = inner.notes.clone();
        notes.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(notes)
    }

    pub fn create(&self, text: &str) -> Result<Note, StoreRejection> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreRejection::empty_text());
        }

        let mut inner = self.lock()?;
        inner.next_id += 1;
        let now = Utc::now();
        let note = Note {
            id: inner.next_id,
            text: text.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.notes.push(note.clone());
        Ok(note)
    }

    pub fn update(&self, id: NoteId, text: &str) -> Result<Note, StoreRejection> {
        let mut inner = self.lock()?;
        let note = inner
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(StoreRejection::not_found)?;

        let text = text.trim();
        if text.is_empty() {
            return Err(StoreRejection::empty_text());
        }

        note.text = text.to_string();
        note.updated_at = Utc::now().max(note.created_at);
        Ok(note.clone())
    }

    pub fn delete(&self, id: NoteId) -> Result<DeleteReceipt, StoreRejection> {
        let mut inner = self.lock()?;
        let index = inner
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(StoreRejection::not_found)?;
        inner.notes.remove(index);
        Ok(DeleteReceipt { deleted: true, id })
    }
}

// Route handlers

async fn list_notes(State(store): State<MemoryStore>) -> Result<Json<Vec<Note>>, StoreRejection> {
    tracing::debug!("GET /api/notes");
    store.list().map(Json)
}

async fn create_note(
    State(store): State<MemoryStore>,
    Json(payload): Json<NoteText>,
) -> Result<Json<Note>, StoreRejection> {
    tracing::debug!("POST /api/notes");
    store.create(&payload.text).map(Json)
}

async fn update_note(
    State(store): State<MemoryStore>,
    Path(id): Path<NoteId>,
    Json(payload): Json<NoteText>,
) -> Result<Json<Note>, StoreRejection> {
    tracing::debug!("PUT /api/notes/{}", id);
    store.update(id, &payload.text).map(Json)
}

async fn delete_note(
    State(store): State<MemoryStore>,
    Path(id): Path<NoteId>,
) -> Result<Json<DeleteReceipt>, StoreRejection> {
    tracing::debug!("DELETE /api/notes/{}", id);
    store.delete(id).map(Json)
}

/// Create the notes router
pub fn create_router(store: MemoryStore) -> Router {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/:id", put(update_note).delete(delete_note))
        .with_state(store)
}

/// Start the notes server
pub async fn start_server(store: MemoryStore, port: u16) -> NotesResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| NotesError::Config(format!("Cannot bind {}: {}", addr, e)))?;

    serve(listener, store).await
}

/// Serve on an already bound listener until `stop_server` is called.
///
/// A server started while another is running replaces its shutdown handle,
/// which stops the earlier one.
pub async fn serve(listener: tokio::net::TcpListener, store: MemoryStore) -> NotesResult<()> {
    let router = create_router(store);

    // Create shutdown channel
    let (tx, rx) = oneshot::channel::<()>();
    *SHUTDOWN_TX.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);

    tracing::info!("Starting notes server on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            rx.await.ok();
        })
        .await?;

    Ok(())
}

/// Stop the notes server
pub fn stop_server() {
    let tx = SHUTDOWN_TX
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(tx) = tx {
        let _ = tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trims_and_assigns_ids() {
        let store = MemoryStore::default();
        let a = store.create("  first  ").unwrap();
        let b = store.create("second").unwrap();

        assert_eq!(a.text, "first");
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn test_create_rejects_blank() {
        let store = MemoryStore::default();
        let err = store.create("   ").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Text cannot be empty");
    }

    #[test]
    fn test_list_newest_first() {
        let store = MemoryStore::default();
        store.create("a").unwrap();
        store.create("b").unwrap();
        store.create("c").unwrap();

        let ids: Vec<NoteId> = store.list().unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_update_missing_before_blank_check() {
        let store = MemoryStore::default();
        let err = store.update(5, "  ").unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_update_bumps_updated_at() {
        let store = MemoryStore::default();
        let note = store.create("a").unwrap();
        let updated = store.update(note.id, " b ").unwrap();

        assert_eq!(updated.text, "b");
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn test_delete() {
        let store = MemoryStore::default();
        let note = store.create("a").unwrap();

        let receipt = store.delete(note.id).unwrap();
        assert_eq!(receipt, DeleteReceipt { deleted: true, id: note.id });
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.delete(note.id).unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_server_restarts_after_stop() {
        use crate::config::ClientConfig;
        use crate::http_client::HttpNotesStore;
        use crate::store::NotesStore;
        use std::time::Duration;

        let store = MemoryStore::default();

        for round in 0..2 {
            let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
                .await
                .unwrap();
            let addr = listener.local_addr().unwrap();
            let server = tokio::spawn(serve(listener, store.clone()));

            let client =
                HttpNotesStore::new(&ClientConfig::with_base_url(&format!("http://{}/api", addr)))
                    .unwrap();
            client.create(&format!("round {}", round)).await.unwrap();

            // Still serving after the first request
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(!server.is_finished());
            assert_eq!(client.list().await.unwrap().len(), round + 1);

            stop_server();
            tokio::time::timeout(Duration::from_secs(5), server)
                .await
                .unwrap()
                .unwrap()
                .unwrap();
        }
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = MemoryStore::default();
        let a = store.create("a").unwrap();
        store.delete(a.id).unwrap();
        let b = store.create("b").unwrap();
        assert_ne!(a.id, b.id);
    }
}
