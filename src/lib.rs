//! notesync - keeps a local note list consistent with a remote Notes Store.
//!
//! This library provides:
//! - Data models (Note, DeleteReceipt)
//! - The Notes Store request contract and an HTTP adapter for it
//! - The sync controller that gates create/edit/delete requests and applies
//!   their responses to local state
//! - Configuration management
//!
//! # Feature Flags
//!
//! - `server`: Include a reference in-memory Notes Store served with axum.
//! - `desktop`: Resolve the default config directory from the platform.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod http_client;
pub mod models;
pub mod store;
#[cfg(feature = "server")]
pub mod store_server;
pub mod validation;

// Re-export commonly used types
pub use config::{ClientConfig, Config};
pub use controller::{EditSession, Outcome, SyncController, SyncState};
pub use error::{NotesError, NotesResult};
pub use http_client::HttpNotesStore;
pub use models::{DeleteReceipt, Note, NoteId};
pub use store::NotesStore;
