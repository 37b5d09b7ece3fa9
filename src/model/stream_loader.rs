//! Authenticated per-track byte fetching
//!
//! One fetch per `acquire`, no automatic retries. Each acquire bumps a
//! generation counter; a fetch that completes after a newer acquire started is
//! reported as `Superseded` and never becomes a handle, so a stale result can
//! never reach the renderer. The returned [`ResourceHandle`] is the release
//! guard: dropping it revokes the local byte blob on every exit path.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use bytes::Bytes;
use reqwest::StatusCode;

use crate::auth::Credential;
use super::errors::StreamError;

/// A locally materialized, revocable reference to one track's audio bytes.
#[derive(Debug)]
pub struct ResourceHandle {
    track_id: u64,
    generation: u64,
    bytes: Bytes,
    live: Arc<AtomicUsize>,
}

impl ResourceHandle {
    pub fn track_id(&self) -> u64 {
        self.track_id
    }

    /// The audio bytes. `Bytes` clones are reference-counted views, not
    /// copies; the blob itself is freed when the handle is dropped and the
    /// renderer has let go of its view.
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!(
            track_id = self.track_id,
            generation = self.generation,
            "resource handle released"
        );
    }
}

/// Fetches track audio from `GET /api/songs/{id}/stream` with bearer auth.
pub struct StreamLoader {
    http: reqwest::Client,
    base_url: String,
    generation: AtomicU64,
    live: Arc<AtomicUsize>,
}

impl StreamLoader {
    /// `http` should carry the request timeout; a fetch that never resolves
    /// would otherwise leave the controller in Loading forever.
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            base_url,
            generation: AtomicU64::new(0),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fetch the bytes for `track_id` under `credential` and produce a
    /// handle. Errors map the server's responses: 401 -> `Auth`, 404 ->
    /// `NotFound`, anything else non-2xx or transport-level -> `Network`.
    /// `Superseded` means a newer acquire started while this one was in
    /// flight; the caller discards it without touching any state. The whole
    /// completion is gated on generation currency, so a stale fetch that
    /// failed is `Superseded` too, never its underlying error.
    pub async fn acquire(
        &self,
        track_id: u64,
        credential: &Credential,
    ) -> Result<ResourceHandle, StreamError> {
        let generation = self.begin();
        let result = self.fetch(track_id, generation, credential).await;

        // The caller only ever sees the outcome of its own acquire; a stale
        // error must not reach whoever owns the state now.
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(track_id, generation, "stale completion discarded");
            return Err(StreamError::Superseded);
        }

        let bytes = result?;
        tracing::info!(track_id, generation, size = bytes.len(), "track audio fetched");
        self.install(generation, track_id, bytes)
    }

    async fn fetch(
        &self,
        track_id: u64,
        generation: u64,
        credential: &Credential,
    ) -> Result<Bytes, StreamError> {
        let url = format!("{}/api/songs/{}/stream", self.base_url, track_id);
        tracing::debug!(track_id, generation, %url, "fetching track audio");

        let response = self
            .http
            .get(&url)
            .bearer_auth(credential.token())
            .send()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(StreamError::Auth),
            StatusCode::NOT_FOUND => return Err(StreamError::NotFound(track_id)),
            s if !s.is_success() => {
                return Err(StreamError::Network(format!("unexpected status {s}")));
            }
            _ => {}
        }

        response
            .bytes()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))
    }

    /// Number of unreleased handles. At most 1 by contract; the controller
    /// drops the outgoing handle before acquiring the next one.
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let outstanding = self.live.load(Ordering::SeqCst);
        if outstanding != 0 {
            tracing::warn!(outstanding, "acquire started with a handle still live");
        }
        generation
    }

    /// Turn fetched bytes into a handle, unless a newer acquire superseded
    /// this generation while the fetch was in flight.
    fn install(
        &self,
        generation: u64,
        track_id: u64,
        bytes: Bytes,
    ) -> Result<ResourceHandle, StreamError> {
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(track_id, generation, "stale fetch discarded");
            return Err(StreamError::Superseded);
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(ResourceHandle {
            track_id,
            generation,
            bytes,
            live: self.live.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> StreamLoader {
        StreamLoader::new(reqwest::Client::new(), "http://localhost:5000".into())
    }

    #[test]
    fn stale_generation_never_becomes_a_handle() {
        let loader = loader();
        let first = loader.begin();
        let second = loader.begin();

        // The older fetch resolves after the newer one started.
        let stale = loader.install(first, 1, Bytes::from_static(b"a"));
        assert!(matches!(stale, Err(StreamError::Superseded)));
        assert_eq!(loader.live_handles(), 0);

        let current = loader.install(second, 2, Bytes::from_static(b"b"));
        assert!(current.is_ok());
        assert_eq!(current.unwrap().track_id(), 2);
    }

    #[test]
    fn at_most_one_live_handle_and_release_on_drop() {
        let loader = loader();

        let g1 = loader.begin();
        let h1 = loader.install(g1, 1, Bytes::from_static(b"a")).unwrap();
        assert_eq!(loader.live_handles(), 1);

        // Release before the next acquire, as the controller does.
        drop(h1);
        assert_eq!(loader.live_handles(), 0);

        let g2 = loader.begin();
        let h2 = loader.install(g2, 2, Bytes::from_static(b"b")).unwrap();
        assert_eq!(loader.live_handles(), 1);
        drop(h2);
        assert_eq!(loader.live_handles(), 0);
    }

    #[test]
    fn handle_bytes_are_shared_views() {
        let loader = loader();
        let g = loader.begin();
        let handle = loader.install(g, 7, Bytes::from_static(b"abc")).unwrap();
        let view = handle.bytes();
        drop(handle);
        // The renderer's view stays valid until it is dropped too.
        assert_eq!(&view[..], b"abc");
        assert_eq!(loader.live_handles(), 0);
    }

    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::auth::Credential;

    /// Serve a single canned HTTP response after `delay`, then close the
    /// connection.
    async fn serve_once(delay: Duration, response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            tokio::time::sleep(delay).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn acquire_yields_a_live_handle_on_success() {
        let base = serve_once(
            Duration::ZERO,
            "HTTP/1.1 200 OK\r\n\
             Content-Type: audio/mpeg\r\n\
             Content-Length: 3\r\n\
             Connection: close\r\n\r\nabc",
        )
        .await;
        let loader = StreamLoader::new(reqwest::Client::new(), base);
        let credential = Credential::new("tok".into());

        let handle = loader.acquire(42, &credential).await.unwrap();
        assert_eq!(handle.track_id(), 42);
        assert_eq!(&handle.bytes()[..], b"abc");
        assert_eq!(loader.live_handles(), 1);
        drop(handle);
        assert_eq!(loader.live_handles(), 0);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_error() {
        let base = serve_once(
            Duration::ZERO,
            "HTTP/1.1 401 UNAUTHORIZED\r\n\
             Content-Length: 0\r\n\
             Connection: close\r\n\r\n",
        )
        .await;
        let loader = StreamLoader::new(reqwest::Client::new(), base);
        let credential = Credential::new("expired".into());

        let err = loader.acquire(1, &credential).await.unwrap_err();
        assert!(matches!(err, StreamError::Auth));
        assert_eq!(loader.live_handles(), 0);
    }

    #[tokio::test]
    async fn missing_track_maps_to_not_found() {
        let base = serve_once(
            Duration::ZERO,
            "HTTP/1.1 404 NOT FOUND\r\n\
             Content-Length: 0\r\n\
             Connection: close\r\n\r\n",
        )
        .await;
        let loader = StreamLoader::new(reqwest::Client::new(), base);
        let credential = Credential::new("tok".into());

        let err = loader.acquire(99, &credential).await.unwrap_err();
        assert!(matches!(err, StreamError::NotFound(99)));
    }

    #[tokio::test]
    async fn stale_error_completion_is_superseded() {
        // The server answers 404, but only after a newer acquire has begun;
        // the stale failure must not surface as a real error to whoever owns
        // the state by then.
        let base = serve_once(
            Duration::from_millis(200),
            "HTTP/1.1 404 NOT FOUND\r\n\
             Content-Length: 0\r\n\
             Connection: close\r\n\r\n",
        )
        .await;
        let loader = Arc::new(StreamLoader::new(reqwest::Client::new(), base));

        let stale = tokio::spawn({
            let loader = loader.clone();
            async move { loader.acquire(1, &Credential::new("tok".into())).await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = loader.begin();

        let err = stale.await.unwrap().unwrap_err();
        assert!(matches!(err, StreamError::Superseded));
        assert_eq!(loader.live_handles(), 0);
    }
}
