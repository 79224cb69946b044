//! HTTP client for the streaming backend
//!
//! Every backend call goes through `ApiClient`. Calls that need a session read
//! the bearer token installed by the session store and fail with
//! `ApiError::AuthRequired` before touching the network when there is none.

use std::path::Path;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::RwLock;

use super::content::{Album, Comment, DownloadRecord, ItemKind, Playlist, SearchResults, Track};
use super::types::SearchTab;
use crate::auth::Session;
use crate::config::ApiSettings;
use crate::error::ApiError;
use crate::{log_api_request, log_api_result};

type Result<T> = std::result::Result<T, ApiError>;

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct SongsEnvelope {
    #[serde(default)]
    songs: Vec<Track>,
}

#[derive(Deserialize)]
struct AlbumsEnvelope {
    #[serde(default)]
    albums: Vec<Album>,
}

#[derive(Deserialize)]
struct SongEnvelope {
    song: Track,
}

#[derive(Deserialize)]
struct LikedEnvelope {
    #[serde(default)]
    liked: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadUrlEnvelope {
    download_url: String,
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

/// Registration details
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Playlist fields sent on create and update
#[derive(Clone, Debug)]
pub struct PlaylistDraft {
    pub name: String,
    pub description: String,
    pub is_public: bool,
}

/// Metadata for a song upload; files are read from disk
#[derive(Clone, Debug, Default)]
pub struct SongUpload {
    pub name: String,
    pub desc: String,
    pub artist: String,
    pub genre: String,
    /// `m:ss`
    pub duration: String,
}

/// Backend client with the current bearer token
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout())
            .connect_timeout(settings.connect_timeout())
            .user_agent(format!("tunestream-rs/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn bearer(&self) -> Result<String> {
        self.token.read().await.clone().ok_or(ApiError::AuthRequired)
    }

    /// Attaches the token when there is one, for endpoints where it is optional
    async fn maybe_authed(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let response = req.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<MessageBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// For endpoints whose success body is irrelevant
    async fn send_unit(&self, req: RequestBuilder) -> Result<()> {
        self.send::<serde_json::Value>(req).await.map(|_| ())
    }

    // ---- auth ----

    pub async fn register(&self, user: &NewUser) -> Result<Session> {
        log_api_request!("register", email = %user.email);
        let req = self.http.post(self.url("/auth/user/register")).json(&json!({
            "name": user.name,
            "email": user.email,
            "password": user.password,
        }));
        let result: Result<Session> = self.send(req).await;
        log_api_result!("register", result);
        result
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        log_api_request!("login", email = %email);
        let req = self
            .http
            .post(self.url("/auth/user/login"))
            .json(&json!({ "email": email, "password": password }));
        let result: Result<Session> = self.send(req).await;
        log_api_result!("login", result);
        result
    }

    /// Returns the backend's confirmation message, if any
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>> {
        log_api_request!("forgot_password", email = %email);
        let req = self
            .http
            .post(self.url("/auth/user/forgot-password"))
            .json(&json!({ "email": email }));
        let result: Result<MessageBody> = self.send(req).await;
        log_api_result!("forgot_password", result);
        result.map(|b| b.message)
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<Option<String>> {
        log_api_request!("reset_password", token_len = token.len());
        let req = self
            .http
            .put(self.url(&format!("/auth/user/reset-password/{}", token)))
            .json(&json!({ "password": password }));
        let result: Result<MessageBody> = self.send(req).await;
        log_api_result!("reset_password", result);
        result.map(|b| b.message)
    }

    // ---- catalog ----

    pub async fn list_songs(&self) -> Result<Vec<Track>> {
        let result: Result<SongsEnvelope> = self.send(self.http.get(self.url("/song/list"))).await;
        log_api_result!("list_songs", result);
        result.map(|e| e.songs)
    }

    pub async fn get_song(&self, song_id: &str) -> Result<Track> {
        log_api_request!("get_song", song_id = %song_id);
        let result: Result<Track> = self.send(self.http.get(self.url(&format!("/song/{}", song_id)))).await;
        log_api_result!("get_song", result);
        result
    }

    pub async fn list_albums(&self) -> Result<Vec<Album>> {
        let result: Result<AlbumsEnvelope> = self.send(self.http.get(self.url("/album/list"))).await;
        log_api_result!("list_albums", result);
        result.map(|e| e.albums)
    }

    pub async fn upload_song(&self, meta: &SongUpload, audio: &Path, image: &Path) -> Result<Track> {
        let token = self.bearer().await?;
        log_api_request!("upload_song", name = %meta.name, audio = %audio.display());

        let form = Form::new()
            .text("name", meta.name.clone())
            .text("desc", meta.desc.clone())
            .text("artist", meta.artist.clone())
            .text("genre", meta.genre.clone())
            .text("duration", meta.duration.clone())
            .part("audio", file_part(audio).await?)
            .part("image", file_part(image).await?);

        let req = self
            .http
            .post(self.url("/song/add"))
            .bearer_auth(token)
            .multipart(form);
        let result: Result<SongEnvelope> = self.send(req).await;
        log_api_result!("upload_song", result);
        result.map(|e| e.song)
    }

    // ---- playlists ----

    pub async fn user_playlists(&self) -> Result<Vec<Playlist>> {
        let token = self.bearer().await?;
        let req = self.http.get(self.url("/playlist")).bearer_auth(token);
        let result: Result<DataEnvelope<Vec<Playlist>>> = self.send(req).await;
        log_api_result!("user_playlists", result);
        result.map(|e| e.data)
    }

    pub async fn public_playlists(&self) -> Result<Vec<Playlist>> {
        let result: Result<DataEnvelope<Vec<Playlist>>> =
            self.send(self.http.get(self.url("/playlist/public"))).await;
        log_api_result!("public_playlists", result);
        result.map(|e| e.data)
    }

    /// Playlist with its songs populated
    pub async fn playlist_playback(&self, playlist_id: &str) -> Result<Playlist> {
        log_api_request!("playlist_playback", playlist_id = %playlist_id);
        let req = self
            .maybe_authed(self.http.get(self.url(&format!("/playlist/{}/playback", playlist_id))))
            .await;
        let result: Result<DataEnvelope<Playlist>> = self.send(req).await;
        log_api_result!("playlist_playback", result);
        result.map(|e| e.data)
    }

    pub async fn create_playlist(&self, draft: &PlaylistDraft) -> Result<Playlist> {
        let token = self.bearer().await?;
        log_api_request!("create_playlist", name = %draft.name);
        let req = self
            .http
            .post(self.url("/playlist"))
            .bearer_auth(token)
            .multipart(playlist_form(draft));
        let result: Result<DataEnvelope<Playlist>> = self.send(req).await;
        log_api_result!("create_playlist", result);
        result.map(|e| e.data)
    }

    pub async fn update_playlist(&self, playlist_id: &str, draft: &PlaylistDraft) -> Result<Playlist> {
        let token = self.bearer().await?;
        log_api_request!("update_playlist", playlist_id = %playlist_id);
        let req = self
            .http
            .put(self.url(&format!("/playlist/{}", playlist_id)))
            .bearer_auth(token)
            .multipart(playlist_form(draft));
        let result: Result<DataEnvelope<Playlist>> = self.send(req).await;
        log_api_result!("update_playlist", result);
        result.map(|e| e.data)
    }

    pub async fn delete_playlist(&self, playlist_id: &str) -> Result<()> {
        let token = self.bearer().await?;
        log_api_request!("delete_playlist", playlist_id = %playlist_id);
        let req = self
            .http
            .delete(self.url(&format!("/playlist/{}", playlist_id)))
            .bearer_auth(token);
        let result = self.send_unit(req).await;
        log_api_result!("delete_playlist", result);
        result
    }

    pub async fn add_song_to_playlist(&self, playlist_id: &str, song_id: &str) -> Result<()> {
        let token = self.bearer().await?;
        log_api_request!("add_song_to_playlist", playlist_id = %playlist_id, song_id = %song_id);
        let req = self
            .http
            .post(self.url(&format!("/playlist/{}/songs/{}", playlist_id, song_id)))
            .bearer_auth(token)
            .json(&json!({}));
        let result = self.send_unit(req).await;
        log_api_result!("add_song_to_playlist", result);
        result
    }

    pub async fn remove_song_from_playlist(&self, playlist_id: &str, song_id: &str) -> Result<()> {
        let token = self.bearer().await?;
        log_api_request!("remove_song_from_playlist", playlist_id = %playlist_id, song_id = %song_id);
        let req = self
            .http
            .delete(self.url(&format!("/playlist/{}/songs/{}", playlist_id, song_id)))
            .bearer_auth(token);
        let result = self.send_unit(req).await;
        log_api_result!("remove_song_from_playlist", result);
        result
    }

    // ---- likes ----

    pub async fn is_liked(&self, kind: ItemKind, item_id: &str) -> Result<bool> {
        let token = self.bearer().await?;
        let req = self
            .http
            .get(self.url(&format!("/like/check/{}/{}", kind.as_path(), item_id)))
            .bearer_auth(token);
        let result: Result<LikedEnvelope> = self.send(req).await;
        result.map(|e| e.liked)
    }

    pub async fn like(&self, kind: ItemKind, item_id: &str) -> Result<()> {
        let token = self.bearer().await?;
        log_api_request!("like", kind = kind.as_path(), item_id = %item_id);
        let req = self
            .http
            .post(self.url(&format!("/like/{}/{}", kind.as_path(), item_id)))
            .bearer_auth(token)
            .json(&json!({}));
        let result = self.send_unit(req).await;
        log_api_result!("like", result);
        result
    }

    pub async fn unlike(&self, kind: ItemKind, item_id: &str) -> Result<()> {
        let token = self.bearer().await?;
        log_api_request!("unlike", kind = kind.as_path(), item_id = %item_id);
        let req = self
            .http
            .delete(self.url(&format!("/like/{}/{}", kind.as_path(), item_id)))
            .bearer_auth(token);
        let result = self.send_unit(req).await;
        log_api_result!("unlike", result);
        result
    }

    pub async fn liked_songs(&self) -> Result<Vec<Track>> {
        let token = self.bearer().await?;
        let req = self.http.get(self.url("/like/user/songs")).bearer_auth(token);
        let result: Result<DataEnvelope<Option<Vec<Track>>>> = self.send(req).await;
        log_api_result!("liked_songs", result);
        result.map(|e| e.data.unwrap_or_default())
    }

    // ---- comments ----

    pub async fn comments(&self, kind: ItemKind, item_id: &str) -> Result<Vec<Comment>> {
        let req = self
            .http
            .get(self.url(&format!("/comment/{}/{}", kind.as_path(), item_id)));
        let result: Result<DataEnvelope<Vec<Comment>>> = self.send(req).await;
        log_api_result!("comments", result);
        result.map(|e| e.data)
    }

    pub async fn add_comment(&self, kind: ItemKind, item_id: &str, content: &str) -> Result<Comment> {
        let token = self.bearer().await?;
        log_api_request!("add_comment", kind = kind.as_path(), item_id = %item_id);
        let req = self
            .http
            .post(self.url(&format!("/comment/{}/{}", kind.as_path(), item_id)))
            .bearer_auth(token)
            .json(&json!({ "content": content }));
        let result: Result<DataEnvelope<Comment>> = self.send(req).await;
        log_api_result!("add_comment", result);
        result.map(|e| e.data)
    }

    pub async fn edit_comment(&self, comment_id: &str, content: &str) -> Result<Comment> {
        let token = self.bearer().await?;
        log_api_request!("edit_comment", comment_id = %comment_id);
        let req = self
            .http
            .put(self.url(&format!("/comment/{}", comment_id)))
            .bearer_auth(token)
            .json(&json!({ "content": content }));
        let result: Result<DataEnvelope<Comment>> = self.send(req).await;
        log_api_result!("edit_comment", result);
        result.map(|e| e.data)
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        let token = self.bearer().await?;
        log_api_request!("delete_comment", comment_id = %comment_id);
        let req = self
            .http
            .delete(self.url(&format!("/comment/{}", comment_id)))
            .bearer_auth(token);
        let result = self.send_unit(req).await;
        log_api_result!("delete_comment", result);
        result
    }

    // ---- downloads ----

    /// Issues a download URL and records the download server-side
    pub async fn download_url(&self, song_id: &str) -> Result<String> {
        let token = self.bearer().await?;
        log_api_request!("download_url", song_id = %song_id);
        let req = self
            .http
            .get(self.url(&format!("/download/song/{}", song_id)))
            .bearer_auth(token);
        let result: Result<DownloadUrlEnvelope> = self.send(req).await;
        log_api_result!("download_url", result);
        result.map(|e| e.download_url)
    }

    pub async fn user_downloads(&self) -> Result<Vec<DownloadRecord>> {
        let token = self.bearer().await?;
        let req = self.http.get(self.url("/download/user")).bearer_auth(token);
        let result: Result<DataEnvelope<Option<Vec<DownloadRecord>>>> = self.send(req).await;
        log_api_result!("user_downloads", result);
        result.map(|e| e.data.unwrap_or_default())
    }

    /// Raw bytes from an absolute URL (audio files, download links)
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: String::new(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    // ---- search ----

    pub async fn search(&self, query: &str, tab: SearchTab) -> Result<SearchResults> {
        log_api_request!("search", query = %query, tab = tab.label());
        let mut params = vec![("query", query)];
        if let Some(kind) = tab.query_type() {
            params.push(("type", kind));
        }
        let req = self
            .maybe_authed(self.http.get(self.url("/search")).query(&params))
            .await;
        let result: Result<DataEnvelope<SearchResults>> = self.send(req).await;
        log_api_result!("search", result);
        result.map(|e| e.data)
    }
}

fn playlist_form(draft: &PlaylistDraft) -> Form {
    Form::new()
        .text("name", draft.name.clone())
        .text("description", draft.description.clone())
        .text("isPublic", draft.is_public.to_string())
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok(Part::bytes(bytes).file_name(file_name))
}

#[cfg(test)]
mod tests;
