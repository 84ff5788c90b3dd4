//! Note lifecycle synchronization.
//!
//! `SyncController` owns the local view of the note collection and decides
//! which store requests may be in flight:
//! - one create at a time
//! - one delete at a time, across all notes
//! - one edit session at a time, with at most one save for it
//! - one load at a time
//!
//! Operations take `&self` and never hold the state lock across a store
//! call, so operations of different kinds can be driven concurrently on a
//! single task. Local notes change only in response to successful store
//! responses.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{Note, NoteId};
use crate::store::NotesStore;
use crate::validation::normalize_note_text;

/// What happened to a requested operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A precondition did not hold; no request was issued
    Skipped,
    /// The request succeeded and its result was applied
    Completed,
    /// The request failed; `last_error` holds the message
    Failed,
}

/// The single note currently being drafted for update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub note_id: NoteId,
    pub draft: String,
    pub saving: bool,
    generation: u64,
}

/// Everything a view needs to render the note list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// Newest first; at most one note per id
    pub notes: Vec<Note>,
    pub loading: bool,
    pub creating: bool,
    pub deleting_id: Option<NoteId>,
    pub edit: Option<EditSession>,
    pub last_error: Option<String>,
    /// Text in the "new note" input, cleared after a successful create
    pub new_note_draft: String,
    next_generation: u64,
}

impl SyncState {
    pub fn editing_id(&self) -> Option<NoteId> {
        self.edit.as_ref().map(|s| s.note_id)
    }

    pub fn editing_draft(&self) -> Option<&str> {
        self.edit.as_ref().map(|s| s.draft.as_str())
    }

    pub fn saving_edit(&self) -> bool {
        self.edit.as_ref().is_some_and(|s| s.saving)
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Whether the edit affordance for `id` should be enabled
    pub fn can_start_edit(&self, id: NoteId) -> bool {
        self.edit.is_none() && self.deleting_id != Some(id) && self.note(id).is_some()
    }

    /// Whether the delete affordance for `id` should be enabled
    pub fn can_delete(&self, id: NoteId) -> bool {
        self.deleting_id.is_none() && !(self.editing_id() == Some(id) && self.saving_edit())
    }

    fn replace_all(&mut self, notes: Vec<Note>) {
        let mut seen = HashSet::with_capacity(notes.len());
        self.notes = notes.into_iter().filter(|n| seen.insert(n.id)).collect();
    }

    fn prepend(&mut self, note: Note) {
        self.notes.retain(|n| n.id != note.id);
        self.notes.insert(0, note);
    }

    /// Swap in the store's record; a note no longer held locally stays gone.
    fn replace(&mut self, note: Note) {
        if let Some(slot) = self.notes.iter_mut().find(|n| n.id == note.id) {
            *slot = note;
        }
    }

    fn is_current_session(&self, generation: u64) -> bool {
        self.edit.as_ref().is_some_and(|s| s.generation == generation)
    }
}

/// Keeps a local note collection in step with a `NotesStore`
pub struct SyncController<S> {
    store: S,
    state: Mutex<SyncState>,
}

impl<S: NotesStore> SyncController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: Mutex::new(SyncState::default()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> SyncState {
        self.state().clone()
    }

    /// Replace local notes with the store's full collection
    pub async fn load(&self) -> Outcome {
        {
            let mut state = self.state();
            if state.loading {
                tracing::debug!("load skipped: already loading");
                return Outcome::Skipped;
            }
            state.loading = true;
            state.last_error = None;
        }

        let result = self.store.list().await;

        let mut state = self.state();
        state.loading = false;
        match result {
            Ok(notes) => {
                tracing::debug!("loaded {} notes", notes.len());
                state.replace_all(notes);
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!("load failed: {}", e);
                state.last_error = Some(e.user_message());
                Outcome::Failed
            }
        }
    }

    pub fn set_new_note_draft(&self, text: &str) {
        self.state().new_note_draft = text.to_string();
    }

    /// Create a note from `raw_text` and put it at the top of the list
    pub async fn create(&self, raw_text: &str) -> Outcome {
        let text = match normalize_note_text(raw_text) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("create skipped: {}", e);
                return Outcome::Skipped;
            }
        };

        {
            let mut state = self.state();
            if state.creating {
                tracing::debug!("create skipped: already creating");
                return Outcome::Skipped;
            }
            state.creating = true;
            state.last_error = None;
        }

        let result = self.store.create(&text).await;

        let mut state = self.state();
        state.creating = false;
        match result {
            Ok(note) => {
                tracing::info!("created note {}", note.id);
                state.prepend(note);
                state.new_note_draft.clear();
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!("create failed: {}", e);
                state.last_error = Some(e.user_message());
                Outcome::Failed
            }
        }
    }

    /// Open an edit session on `id`, seeded with its current text
    pub fn start_edit(&self, id: NoteId) -> bool {
        let mut state = self.state();
        if !state.can_start_edit(id) {
            tracing::debug!("start_edit({}) rejected", id);
            return false;
        }

        let Some(draft) = state.note(id).map(|n| n.text.clone()) else {
            return false;
        };
        let generation = state.next_generation;
        state.next_generation += 1;
        state.edit = Some(EditSession {
            note_id: id,
            draft,
            saving: false,
            generation,
        });
        true
    }

    /// Replace the draft of the open edit session
    pub fn set_edit_draft(&self, text: &str) -> bool {
        match self.state().edit.as_mut() {
            Some(session) => {
                session.draft = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Close the edit session. An in-flight save keeps running.
    pub fn cancel_edit(&self) {
        self.state().edit = None;
    }

    /// Send the trimmed draft of the open session to the store.
    ///
    /// On success the note is replaced even if the session was cancelled
    /// meanwhile; the session itself is closed only if it is still the one
    /// that issued the save. On failure the session stays open with its draft.
    pub async fn save_edit(&self) -> Outcome {
        let (id, text, generation) = {
            let mut state = self.state();
            let deleting_id = state.deleting_id;
            let Some(session) = state.edit.as_mut() else {
                tracing::debug!("save_edit skipped: no edit session");
                return Outcome::Skipped;
            };
            if session.saving {
                tracing::debug!("save_edit skipped: already saving");
                return Outcome::Skipped;
            }
            if deleting_id == Some(session.note_id) {
                tracing::debug!("save_edit skipped: note {} is being deleted", session.note_id);
                return Outcome::Skipped;
            }
            let Ok(text) = normalize_note_text(&session.draft) else {
                tracing::debug!("save_edit skipped: blank draft");
                return Outcome::Skipped;
            };
            session.saving = true;
            let pending = (session.note_id, text, session.generation);
            state.last_error = None;
            pending
        };

        let result = self.store.update(id, &text).await;

        let mut state = self.state();
        let current = state.is_current_session(generation);
        match result {
            Ok(note) => {
                tracing::info!("saved note {}", note.id);
                state.replace(note);
                if current {
                    state.edit = None;
                }
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!("save of note {} failed: {}", id, e);
                if current {
                    if let Some(session) = state.edit.as_mut() {
                        session.saving = false;
                    }
                }
                state.last_error = Some(e.user_message());
                Outcome::Failed
            }
        }
    }

    /// Delete `id` in the store, then drop it locally
    pub async fn delete(&self, id: NoteId) -> Outcome {
        {
            let mut state = self.state();
            if !state.can_delete(id) {
                tracing::debug!("delete({}) skipped", id);
                return Outcome::Skipped;
            }
            state.deleting_id = Some(id);
            state.last_error = None;
        }

        let result = self.store.delete(id).await;

        let mut state = self.state();
        state.deleting_id = None;
        match result {
            Ok(_) => {
                tracing::info!("deleted note {}", id);
                state.notes.retain(|n| n.id != id);
                if state.editing_id() == Some(id) {
                    state.edit = None;
                }
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!("delete of note {} failed: {}", id, e);
                state.last_error = Some(e.user_message());
                Outcome::Failed
            }
        }
    }
}
