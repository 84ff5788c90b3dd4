//! HTTP adapter for the Notes Store.
//!
//! Sends the requests built in `api` with reqwest and folds every failure
//! (transport, non-2xx status, undecodable body) into
//! `NotesError::RequestFailed`.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::api::{decode_body, failure_message, ApiRequest, Method};
use crate::config::ClientConfig;
use crate::error::{NotesError, NotesResult};
use crate::models::{DeleteReceipt, Note, NoteId};
use crate::store::NotesStore;

/// Notes Store reached over HTTP
pub struct HttpNotesStore {
    client: Client,
    base_url: String,
}

impl HttpNotesStore {
    /// Create a new store adapter
    pub fn new(config: &ClientConfig) -> NotesResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| NotesError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and return the response if its status is a success.
    async fn send(&self, request: &ApiRequest) -> NotesResult<reqwest::Response> {
        let url = request.url(&self.base_url);
        tracing::debug!("{} {}", request.method, url);

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", request.method, url, e);
            NotesError::request_failed(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = failure_message(status.as_u16(), &body);
            tracing::warn!("{} {} returned {}: {}", request.method, url, status, message);
            return Err(NotesError::request_failed(message));
        }

        Ok(response)
    }

    /// Send a request whose success body must decode to `T`
    async fn send_expecting<T: DeserializeOwned>(&self, request: ApiRequest) -> NotesResult<T> {
        let response = self.send(&request).await?;

        response.json::<T>().await.map_err(|e| {
            NotesError::request_failed(format!(
                "Failed to parse response from {} {}: {}",
                request.method, request.path, e
            ))
        })
    }
}

impl NotesStore for HttpNotesStore {
    async fn list(&self) -> NotesResult<Vec<Note>> {
        self.send_expecting(ApiRequest::list()).await
    }

    async fn create(&self, text: &str) -> NotesResult<Note> {
        self.send_expecting(ApiRequest::create(text)).await
    }

    async fn update(&self, id: NoteId, text: &str) -> NotesResult<Note> {
        self.send_expecting(ApiRequest::update(id, text)).await
    }

    /// A void or unrecognized success body yields `None`.
    async fn delete(&self, id: NoteId) -> NotesResult<Option<DeleteReceipt>> {
        let response = self.send(&ApiRequest::delete(id)).await?;
        let bytes = response.bytes().await?;

        Ok(decode_body(&bytes).and_then(|value| serde_json::from_value(value).ok()))
    }
}

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;
    use crate::store_server::{create_router, MemoryStore};
    use std::net::SocketAddr;

    /// Serve a fresh reference store on an ephemeral port
    async fn spawn_store() -> (HttpNotesStore, MemoryStore) {
        let store = MemoryStore::default();
        let router = create_router(store.clone());
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = ClientConfig::with_base_url(&format!("http://{}/api/", addr));
        (HttpNotesStore::new(&config).unwrap(), store)
    }

    #[tokio::test]
    async fn test_create_list_update_delete() {
        let (client, _store) = spawn_store().await;

        let first = client.create("first").await.unwrap();
        let second = client.create("second").await.unwrap();
        assert_eq!(first.created_at, first.updated_at);

        let notes = client.list().await.unwrap();
        let ids: Vec<NoteId> = notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let updated = client.update(first.id, "first, edited").await.unwrap();
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.text, "first, edited");
        assert!(updated.updated_at >= updated.created_at);

        let receipt = client.delete(second.id).await.unwrap();
        assert_eq!(receipt, Some(DeleteReceipt { deleted: true, id: second.id }));
        assert_eq!(client.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_server_message_surfaces() {
        let (client, _store) = spawn_store().await;

        let err = client.update(999, "x").await.unwrap_err();
        assert!(matches!(err, NotesError::RequestFailed { .. }));
        assert_eq!(err.user_message(), "Note not found");

        let err = client.delete(999).await.unwrap_err();
        assert_eq!(err.user_message(), "Note not found");

        let err = client.create("   ").await.unwrap_err();
        assert_eq!(err.user_message(), "Text cannot be empty");
    }

    #[tokio::test]
    async fn test_unreachable_store_is_request_failed() {
        let config = ClientConfig {
            request_timeout_secs: 2,
            ..ClientConfig::with_base_url("http://127.0.0.1:1/api")
        };
        let client = HttpNotesStore::new(&config).unwrap();

        let err = client.list().await.unwrap_err();
        assert!(matches!(err, NotesError::RequestFailed { .. }));
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_trimmed() {
        let (client, _store) = spawn_store().await;
        assert!(client.base_url().ends_with("/api"));
    }
}
