//! Notes Store request contract.
//!
//! Builds the four requests the store understands and normalizes what comes
//! back, independent of the HTTP library used to send them:
//! - `GET    /notes`       list
//! - `POST   /notes`       create, body `{text}`
//! - `PUT    /notes/{id}`  update, body `{text}`
//! - `DELETE /notes/{id}`  delete

use std::fmt;

use crate::models::{NoteId, NoteText};

/// HTTP method of a store request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request against the Notes Store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// JSON body; present only for mutating requests that carry text
    pub body: Option<NoteText>,
}

impl ApiRequest {
    pub fn list() -> Self {
        Self {
            method: Method::Get,
            path: "/notes".to_string(),
            body: None,
        }
    }

    pub fn create(text: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: "/notes".to_string(),
            body: Some(NoteText::new(text)),
        }
    }

    pub fn update(id: NoteId, text: impl Into<String>) -> Self {
        Self {
            method: Method::Put,
            path: format!("/notes/{}", id),
            body: Some(NoteText::new(text)),
        }
    }

    pub fn delete(id: NoteId) -> Self {
        Self {
            method: Method::Delete,
            path: format!("/notes/{}", id),
            body: None,
        }
    }

    /// Absolute URL of this request under `base`
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", normalize_base(base), self.path)
    }
}

/// Strip trailing slashes from a configured base
pub fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

/// Message for a non-2xx response.
///
/// The server's body text is used verbatim when there is any.
pub fn failure_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("Request failed ({})", status)
    } else {
        body.to_string()
    }
}

/// Decode a success body; empty or non-JSON bodies are void.
pub fn decode_body(bytes: &[u8]) -> Option<serde_json::Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}
