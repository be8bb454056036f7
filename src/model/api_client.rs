//! HTTP client for the Impulse backend
//!
//! Translates typed calls into authenticated requests and normalizes the
//! backend's heterogeneous response shapes into plain entity vectors. All
//! JSON endpoints authenticate with a bearer header; only asset URLs embed
//! the token as a query parameter so they can be used directly as media
//! sources.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{Config, REQUEST_TIMEOUT};

use super::catalog::{Album, Artist, CatalogIndex, Song, User};
use super::session::SessionStore;

/// Error taxonomy for all backend interactions.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport or timeout failure. Retryable by the user; never
    /// invalidates the session.
    #[error("network error: {0}")]
    Network(String),
    /// 401/403 outside of the login flow.
    #[error("unauthorized")]
    Unauthorized,
    /// 401/403 from `/login`.
    #[error("invalid username or password")]
    InvalidCredentials,
    /// 409 from `/register`.
    #[error("username is already taken")]
    UsernameTaken,
    #[error("not found")]
    NotFound,
    /// 409 outside the register flow.
    #[error("{0}")]
    Conflict(String),
    /// 4xx with a structured error body, surfaced verbatim.
    #[error("{0}")]
    Validation(String),
    /// 5xx responses.
    #[error("server error: {0}")]
    Server(String),
    /// Client-side pre-upload rejection; no network round-trip happened.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl ApiError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("request timed out".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Which kind of binary a form slot accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    /// Album/artist covers: PNG only.
    CoverPng,
    /// Audio uploads: MP3 only.
    AudioMp3,
}

impl AssetKind {
    fn extension(self) -> &'static str {
        match self {
            AssetKind::CoverPng => "png",
            AssetKind::AudioMp3 => "mp3",
        }
    }

    fn mime(self) -> &'static str {
        match self {
            AssetKind::CoverPng => "image/png",
            AssetKind::AudioMp3 => "audio/mpeg",
        }
    }
}

/// Upload response payload.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AssetInfo {
    pub asset_id: i64,
}

/// Reduce a structured backend error body to one human-readable string.
///
/// Known shapes: `detail` as a list of field errors, `message`, `error`.
pub fn extract_error_message(body: &Value) -> Option<String> {
    if let Some(s) = body.as_str() {
        return Some(s.to_string());
    }
    if let Some(detail) = body.get("detail").and_then(Value::as_array) {
        let parts: Vec<String> = detail
            .iter()
            .map(|d| {
                d.get("msg")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| d.to_string())
            })
            .collect();
        if !parts.is_empty() {
            return Some(parts.join(", "));
        }
    }
    for key in ["message", "error"] {
        if let Some(msg) = body.get(key).and_then(Value::as_str) {
            return Some(msg.to_string());
        }
    }
    None
}

/// Normalize a collection response into a plain array of entities.
///
/// The backend wraps collections inconsistently: sometimes `items`,
/// sometimes an entity-specific key, sometimes a bare array. The priority
/// order is `items`, then the given entity keys, then a bare array; anything
/// else yields an empty vector.
pub fn extract_items(body: &Value, entity_keys: &[&str]) -> Vec<Value> {
    if let Some(items) = body.get("items").and_then(Value::as_array) {
        return items.clone();
    }
    for key in entity_keys {
        if let Some(items) = body.get(key).and_then(Value::as_array) {
            return items.clone();
        }
    }
    if let Some(items) = body.as_array() {
        return items.clone();
    }
    Vec::new()
}

/// Map an HTTP error status to the [`ApiError`] taxonomy.
fn error_for_status(status: u16, message: String) -> ApiError {
    match status {
        401 | 403 => ApiError::Unauthorized,
        404 => ApiError::NotFound,
        409 => ApiError::Conflict(message),
        400..=499 => ApiError::Validation(message),
        _ => ApiError::Server(message),
    }
}

fn parse_items<T: DeserializeOwned>(body: &Value, entity_keys: &[&str]) -> Vec<T> {
    extract_items(body, entity_keys)
        .into_iter()
        .filter_map(|v| match serde_json::from_value(v) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed catalog entity");
                None
            }
        })
        .collect()
}

/// Typed client for the backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<String>,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionStore) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: Arc::new(config.backend_url.clone()),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authenticated retrieval URL for a binary asset. The token is embedded
    /// in the URL itself so it can be used as a media source directly.
    pub async fn asset_url(&self, asset_id: i64) -> String {
        match self.session.token().await {
            Some(token) => format!(
                "{}/user/asset/{}?token={}",
                self.base_url,
                asset_id,
                urlencoding::encode(&token)
            ),
            None => format!("{}/user/asset/{}", self.base_url, asset_id),
        }
    }

    async fn send(&self, mut request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        if let Some(token) = self.session.token().await {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::from_transport)?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(body);
        }

        let message = extract_error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        Err(error_for_status(status.as_u16(), message))
    }

    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send(self.http.get(self.url(path))).await
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    async fn put_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        self.send(self.http.put(self.url(path)).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send(self.http.delete(self.url(path))).await
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// `POST /login`. On success the token and profile are stored in the
    /// session; 401/403 map to `InvalidCredentials`.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<User>, ApiError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let result = self.post_json("/login", &body).await;
        let data = match result {
            Err(ApiError::Unauthorized) => return Err(ApiError::InvalidCredentials),
            other => other?,
        };
        self.store_auth_response(&data).await
    }

    /// `POST /register`. Same contract as login; a 409 conflict maps to
    /// `UsernameTaken` regardless of the body wording.
    pub async fn register(&self, username: &str, password: &str) -> Result<Option<User>, ApiError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let data = match self.post_json("/register", &body).await {
            Ok(data) => data,
            Err(e) => return Err(Self::map_register_error(e)),
        };
        self.store_auth_response(&data).await
    }

    fn map_register_error(error: ApiError) -> ApiError {
        match error {
            ApiError::Conflict(_) => ApiError::UsernameTaken,
            other => other,
        }
    }

    /// The backend returns either `{token, user}` or a bare token string.
    async fn store_auth_response(&self, data: &Value) -> Result<Option<User>, ApiError> {
        let token = data
            .get("token")
            .and_then(Value::as_str)
            .or_else(|| data.as_str())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Server("no token in auth response".to_string()))?;

        let user: Option<User> = data
            .get("user")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok());

        self.session.set_session(token, user.clone()).await;
        tracing::info!(user = ?user.as_ref().map(|u| &u.username), "Session established");
        Ok(user)
    }

    /// `GET /user/me`. Returns the fresh profile, or `None` when there is no
    /// usable session. A confirmed 401/403 clears the stored session; a
    /// network failure leaves it untouched so an offline client stays
    /// signed in.
    pub async fn who_am_i(&self) -> Option<User> {
        if !self.session.is_authenticated().await {
            return None;
        }
        let outcome = self.get("/user/me").await.map(|data| {
            data.get("user")
                .cloned()
                .or_else(|| Some(data.clone()))
                .and_then(|v| serde_json::from_value(v).ok())
        });
        self.apply_who_am_i_outcome(outcome).await
    }

    /// Session-invalidation rule for whoAmI, factored out so it can be
    /// exercised without a live backend.
    pub(crate) async fn apply_who_am_i_outcome(
        &self,
        outcome: Result<Option<User>, ApiError>,
    ) -> Option<User> {
        match outcome {
            Ok(Some(user)) => {
                self.session.set_user(user.clone()).await;
                Some(user)
            }
            Ok(None) => None,
            Err(ApiError::Unauthorized) => {
                tracing::info!("Session expired, clearing stored token");
                self.session.clear().await;
                None
            }
            Err(e) => {
                // Offline is not logged out; keep the token.
                tracing::warn!(error = %e, "whoAmI failed without invalidating session");
                None
            }
        }
    }

    /// Best-effort server notification, then unconditional local clear.
    pub async fn logout(&self) {
        if let Err(e) = self.post_json("/user/logout", &Value::Null).await {
            tracing::warn!(error = %e, "Logout request failed");
        }
        self.session.clear().await;
    }

    // ========================================================================
    // Catalog reads
    // ========================================================================

    /// `GET /user/` — the recent-items index (artists, albums, songs).
    pub async fn get_index(&self) -> Result<CatalogIndex, ApiError> {
        let data = self.get("/user/").await?;
        Ok(Self::parse_index(&data))
    }

    /// `GET /user/search?q=` — same shape as the index.
    pub async fn search(&self, query: &str) -> Result<CatalogIndex, ApiError> {
        let path = format!("/user/search?q={}", urlencoding::encode(query));
        let data = self.get(&path).await?;
        Ok(Self::parse_index(&data))
    }

    fn parse_index(data: &Value) -> CatalogIndex {
        CatalogIndex {
            artists: parse_items(data, &["artists"]),
            albums: parse_items(data, &["albums"]),
            songs: parse_items(data, &["songs"]),
        }
    }

    pub async fn get_artist(&self, artist_id: i64) -> Result<Artist, ApiError> {
        let data = self.get(&format!("/user/artist/{}", artist_id)).await?;
        let value = data.get("artist").cloned().unwrap_or(data);
        serde_json::from_value(value)
            .map_err(|e| ApiError::Server(format!("malformed artist response: {}", e)))
    }

    pub async fn get_artist_albums(&self, artist_id: i64) -> Result<Vec<Album>, ApiError> {
        let data = self
            .get(&format!("/user/artist/{}/albums", artist_id))
            .await?;
        Ok(parse_items(&data, &["albums"]))
    }

    pub async fn get_album(&self, album_id: i64) -> Result<Album, ApiError> {
        let data = self.get(&format!("/user/album/{}", album_id)).await?;
        let value = data.get("album").cloned().unwrap_or(data);
        serde_json::from_value(value)
            .map_err(|e| ApiError::Server(format!("malformed album response: {}", e)))
    }

    pub async fn get_album_songs(&self, album_id: i64) -> Result<Vec<Song>, ApiError> {
        let data = self.get(&format!("/user/album/{}/songs", album_id)).await?;
        Ok(parse_items(&data, &["songs"]))
    }

    /// Fetch a binary asset into memory (used by the playback engine).
    pub async fn fetch_asset(&self, asset_id: i64) -> Result<Vec<u8>, ApiError> {
        let url = self.asset_url(asset_id).await;
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => ApiError::Unauthorized,
                404 => ApiError::NotFound,
                _ => ApiError::Server(format!("asset fetch failed: {}", status)),
            });
        }
        let bytes = response.bytes().await.map_err(ApiError::from_transport)?;
        Ok(bytes.to_vec())
    }

    // ========================================================================
    // Admin CRUD
    // ========================================================================

    pub async fn admin_list_users(&self, page: u32) -> Result<Vec<User>, ApiError> {
        let data = self.get(&format!("/admin/users?page={}", page)).await?;
        Ok(parse_items(&data, &["users"]))
    }

    pub async fn admin_list_artists(&self, page: u32) -> Result<Vec<Artist>, ApiError> {
        let data = self.get(&format!("/admin/artists?page={}", page)).await?;
        Ok(parse_items(&data, &["artists"]))
    }

    pub async fn admin_list_albums(&self, page: u32) -> Result<Vec<Album>, ApiError> {
        let data = self.get(&format!("/admin/albums?page={}", page)).await?;
        Ok(parse_items(&data, &["albums"]))
    }

    pub async fn admin_list_songs(&self, page: u32) -> Result<Vec<Song>, ApiError> {
        let data = self.get(&format!("/admin/songs?page={}", page)).await?;
        Ok(parse_items(&data, &["songs"]))
    }

    pub async fn admin_create_user(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
            "is_admin": is_admin,
        });
        self.post_json("/admin/users", &body).await?;
        Ok(())
    }

    pub async fn admin_update_user(
        &self,
        user_id: i64,
        username: &str,
        is_admin: bool,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({ "username": username, "is_admin": is_admin });
        self.put_json(&format!("/admin/users/{}", user_id), &body)
            .await?;
        Ok(())
    }

    pub async fn admin_delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/admin/users/{}", user_id)).await?;
        Ok(())
    }

    pub async fn admin_create_artist(
        &self,
        name: &str,
        biography: Option<&str>,
        asset_id: Option<i64>,
    ) -> Result<Artist, ApiError> {
        let body = serde_json::json!({
            "name": name,
            "biography": biography,
            "asset_id": asset_id,
        });
        let data = self.post_json("/admin/artists", &body).await?;
        let value = data.get("artist").cloned().unwrap_or(data);
        serde_json::from_value(value)
            .map_err(|e| ApiError::Server(format!("malformed artist response: {}", e)))
    }

    pub async fn admin_update_artist(
        &self,
        artist_id: i64,
        name: &str,
        biography: Option<&str>,
        asset_id: Option<i64>,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "name": name,
            "biography": biography,
            "asset_id": asset_id,
        });
        self.put_json(&format!("/admin/artists/{}", artist_id), &body)
            .await?;
        Ok(())
    }

    pub async fn admin_delete_artist(&self, artist_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/admin/artists/{}", artist_id)).await?;
        Ok(())
    }

    pub async fn admin_create_album(
        &self,
        name: &str,
        artist_id: i64,
        asset_id: Option<i64>,
    ) -> Result<Album, ApiError> {
        let body = serde_json::json!({
            "name": name,
            "artist_id": artist_id,
            "asset_id": asset_id,
        });
        let data = self.post_json("/admin/albums", &body).await?;
        let value = data.get("album").cloned().unwrap_or(data);
        serde_json::from_value(value)
            .map_err(|e| ApiError::Server(format!("malformed album response: {}", e)))
    }

    pub async fn admin_update_album(
        &self,
        album_id: i64,
        name: &str,
        artist_id: i64,
        asset_id: Option<i64>,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "name": name,
            "artist_id": artist_id,
            "asset_id": asset_id,
        });
        self.put_json(&format!("/admin/albums/{}", album_id), &body)
            .await?;
        Ok(())
    }

    pub async fn admin_delete_album(&self, album_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/admin/albums/{}", album_id)).await?;
        Ok(())
    }

    pub async fn admin_create_song(
        &self,
        name: &str,
        album_id: i64,
        asset_id: i64,
    ) -> Result<Song, ApiError> {
        let body = serde_json::json!({
            "name": name,
            "album_id": album_id,
            "asset_id": asset_id,
        });
        let data = self.post_json("/admin/songs", &body).await?;
        let value = data.get("song").cloned().unwrap_or(data);
        serde_json::from_value(value)
            .map_err(|e| ApiError::Server(format!("malformed song response: {}", e)))
    }

    pub async fn admin_update_song(
        &self,
        song_id: i64,
        name: &str,
        album_id: i64,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({ "name": name, "album_id": album_id });
        self.put_json(&format!("/admin/songs/{}", song_id), &body)
            .await?;
        Ok(())
    }

    pub async fn admin_delete_song(&self, song_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/admin/songs/{}", song_id)).await?;
        Ok(())
    }

    // ========================================================================
    // Asset upload
    // ========================================================================

    /// Validate a file for an upload slot without touching the network.
    pub fn validate_upload(path: &Path, kind: AssetKind) -> Result<(), ApiError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if extension != kind.extension() {
            return Err(ApiError::UnsupportedFormat(format!(
                "expected .{} file, got {:?}",
                kind.extension(),
                path.file_name().unwrap_or_default()
            )));
        }
        Ok(())
    }

    /// Multipart upload with a monotonic 0–100 progress callback.
    ///
    /// The file is validated client-side first and the call fails fast with
    /// `UnsupportedFormat` before any network round-trip.
    pub async fn upload_asset<F>(
        &self,
        path: &Path,
        kind: AssetKind,
        on_progress: F,
    ) -> Result<AssetInfo, ApiError>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        Self::validate_upload(path, kind)?;

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Validation(format!("cannot read file: {}", e)))?;
        let total = data.len().max(1) as u64;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        on_progress(0);
        let sent = Arc::new(AtomicU64::new(0));
        let progress = Arc::new(on_progress);

        // Stream the body in chunks so upload progress can be reported the
        // way the browser client did with XHR progress events.
        let chunks: Vec<Vec<u8>> = data.chunks(64 * 1024).map(<[u8]>::to_vec).collect();
        let stream = futures::stream::iter(chunks.into_iter().map({
            let sent = sent.clone();
            let progress = progress.clone();
            move |chunk| {
                let done = sent.fetch_add(chunk.len() as u64, Ordering::SeqCst) + chunk.len() as u64;
                let pct = ((done * 100) / total).min(100) as u8;
                progress(pct);
                Ok::<_, std::io::Error>(chunk)
            }
        }));

        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(stream),
            total,
        )
        .file_name(file_name)
        .mime_str(kind.mime())
        .map_err(|e| ApiError::Validation(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let path = format!(
            "/admin/upload?ensure_type={}",
            urlencoding::encode(kind.mime())
        );
        let data = self
            .send(self.http.post(self.url(&path)).multipart(form))
            .await?;

        let value = data.get("asset").cloned().unwrap_or(data);
        let info: AssetInfo = serde_json::from_value(value)
            .map_err(|e| ApiError::Server(format!("malformed upload response: {}", e)))?;
        progress(100);
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_client(dir: &tempfile::TempDir) -> ApiClient {
        let config = Config {
            backend_url: "http://localhost:8080".to_string(),
        };
        let session = SessionStore::with_path(dir.path().join("session.json"));
        ApiClient::new(&config, session)
    }

    #[test]
    fn extract_items_prefers_items_key() {
        let body = serde_json::json!({
            "items": [1, 2],
            "songs": [3],
        });
        assert_eq!(extract_items(&body, &["songs"]).len(), 2);
    }

    #[test]
    fn extract_items_falls_back_to_entity_key_then_bare_array() {
        let body = serde_json::json!({ "songs": [1, 2, 3] });
        assert_eq!(extract_items(&body, &["songs"]).len(), 3);

        let bare = serde_json::json!([1, 2]);
        assert_eq!(extract_items(&bare, &["songs"]).len(), 2);

        let unknown = serde_json::json!({ "other": [1] });
        assert!(extract_items(&unknown, &["songs"]).is_empty());
    }

    #[test]
    fn error_message_from_detail_list() {
        let body = serde_json::json!({
            "detail": [
                { "msg": "name is required" },
                { "msg": "asset_id must be a number" },
            ]
        });
        assert_eq!(
            extract_error_message(&body).unwrap(),
            "name is required, asset_id must be a number"
        );
    }

    #[test]
    fn error_message_from_message_and_error_keys() {
        let body = serde_json::json!({ "message": "boom" });
        assert_eq!(extract_error_message(&body).unwrap(), "boom");

        let body = serde_json::json!({ "error": "broken" });
        assert_eq!(extract_error_message(&body).unwrap(), "broken");

        let body = serde_json::json!({ "unexpected": true });
        assert!(extract_error_message(&body).is_none());
    }

    #[test]
    fn register_conflict_maps_to_username_taken_regardless_of_wording() {
        let err = error_for_status(409, "username already exists".to_string());
        assert!(matches!(err, ApiError::Conflict(_)));
        assert!(matches!(
            ApiClient::map_register_error(err),
            ApiError::UsernameTaken
        ));

        // Other 4xx bodies keep their message.
        let err = error_for_status(422, "password too short".to_string());
        assert!(matches!(
            ApiClient::map_register_error(err),
            ApiError::Validation(msg) if msg == "password too short"
        ));
    }

    #[test]
    fn upload_validation_rejects_wrong_extension() {
        let err = ApiClient::validate_upload(&PathBuf::from("cover.jpg"), AssetKind::CoverPng)
            .unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedFormat(_)));

        ApiClient::validate_upload(&PathBuf::from("cover.PNG"), AssetKind::CoverPng).unwrap();
        ApiClient::validate_upload(&PathBuf::from("song.mp3"), AssetKind::AudioMp3).unwrap();
    }

    #[tokio::test]
    async fn who_am_i_network_failure_keeps_token() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&dir);
        client.session().set_session("tok".into(), None).await;

        let result = client
            .apply_who_am_i_outcome(Err(ApiError::Network("offline".into())))
            .await;
        assert!(result.is_none());
        assert_eq!(client.session().token().await.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn who_am_i_unauthorized_clears_token() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&dir);
        client.session().set_session("tok".into(), None).await;

        let result = client
            .apply_who_am_i_outcome(Err(ApiError::Unauthorized))
            .await;
        assert!(result.is_none());
        assert_eq!(client.session().token().await, None);
    }

    #[tokio::test]
    async fn asset_url_embeds_token() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&dir);
        client.session().set_session("a b".into(), None).await;

        let url = client.asset_url(42).await;
        assert_eq!(url, "http://localhost:8080/user/asset/42?token=a%20b");
    }
}
