//! The Notes Store contract as seen by the sync controller.

use std::future::Future;

use crate::error::NotesResult;
use crate::models::{DeleteReceipt, Note, NoteId};

/// Remote CRUD over the note collection.
///
/// Every failure, whatever its cause, is reported as
/// `NotesError::RequestFailed`.
pub trait NotesStore {
    /// Fetch the full collection, in the store's order
    fn list(&self) -> impl Future<Output = NotesResult<Vec<Note>>>;

    /// Create a note from already-trimmed text
    fn create(&self, text: &str) -> impl Future<Output = NotesResult<Note>>;

    /// Replace a note's text, returning the full updated record
    fn update(&self, id: NoteId, text: &str) -> impl Future<Output = NotesResult<Note>>;

    /// Delete a note; `None` when the store answered with a void body
    fn delete(&self, id: NoteId) -> impl Future<Output = NotesResult<Option<DeleteReceipt>>>;
}
