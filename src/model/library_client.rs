//! Catalog listing client

use reqwest::StatusCode;

use crate::auth::Credential;
use super::errors::StreamError;
use super::track::Track;

/// Read-only client for the song catalog. Upload, search and edits live in
/// other clients of the server; this one only lists.
#[derive(Clone)]
pub struct LibraryClient {
    http: reqwest::Client,
    base_url: String,
}

impl LibraryClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Fetch the full catalog in server order; that order is the playback
    /// order.
    pub async fn list_songs(&self, credential: &Credential) -> Result<Vec<Track>, StreamError> {
        let url = format!("{}/api/songs", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(credential.token())
            .send()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(StreamError::Auth),
            s if !s.is_success() => {
                return Err(StreamError::Network(format!("unexpected status {s}")));
            }
            _ => {}
        }

        let songs: Vec<Track> = response
            .json()
            .await
            .map_err(|e| StreamError::Network(format!("malformed catalog: {e}")))?;

        tracing::info!(count = songs.len(), "catalog fetched");
        Ok(songs)
    }
}
