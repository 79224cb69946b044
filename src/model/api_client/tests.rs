use super::*;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> ApiClient {
    let settings = ApiSettings {
        base_url: format!("{}/", server.uri()),
        ..Default::default()
    };
    ApiClient::new(&settings).unwrap()
}

#[tokio::test]
async fn song_list_applies_field_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/song/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "songs": [
                {"_id": "s1", "name": "Intro", "file": "https://cdn/s1.mp3", "duration": "3:05"},
                {"_id": "s2", "name": "Outro", "artist": "", "album": "Night", "releaseYear": "2021"}
            ]
        })))
        .mount(&server)
        .await;

    let songs = client(&server).await.list_songs().await.unwrap();
    assert_eq!(songs.len(), 2);
    assert_eq!(songs[0].artist(), "Unknown Artist");
    assert_eq!(songs[0].album(), "Unknown Album");
    assert_eq!(songs[0].genre(), "");
    assert_eq!(songs[0].duration_secs(), Some(185));
    assert_eq!(songs[0].likes_count, 0);
    assert_eq!(songs[1].artist(), "Unknown Artist");
    assert_eq!(songs[1].album(), "Night");
    assert_eq!(songs[1].release_year().as_deref(), Some("2021"));
}

#[tokio::test]
async fn authenticated_calls_fail_fast_without_a_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/playlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&server).await;
    assert!(matches!(api.user_playlists().await, Err(ApiError::AuthRequired)));
}

#[tokio::test]
async fn bearer_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/playlist"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"_id": "p1", "name": "Mine", "user": "u1", "songs": ["s1", "s2"]}]
        })))
        .mount(&server)
        .await;

    let api = client(&server).await;
    api.set_token(Some("tok-1".into())).await;
    let playlists = api.user_playlists().await.unwrap();
    assert_eq!(playlists[0].name(), "Mine");
    assert!(playlists[0].is_owned_by("u1"));
    assert!(playlists[0].is_public);
    assert!(playlists[0].contains_song("s2"));
    assert!(playlists[0].tracks().is_empty());
}

#[tokio::test]
async fn playlist_playback_populates_songs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/playlist/p1/playback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "_id": "p1",
                "name": "Road trip",
                "isPublic": false,
                "user": {"_id": "u2", "name": "Grace"},
                "songs": [
                    {"_id": "s1", "name": "One", "file": "https://cdn/1.mp3"},
                    {"_id": "s2", "name": "Two", "file": "https://cdn/2.mp3"}
                ]
            }
        })))
        .mount(&server)
        .await;

    let playlist = client(&server).await.playlist_playback("p1").await.unwrap();
    assert!(!playlist.is_public);
    assert_eq!(playlist.owner_name(), "Grace");
    let ids: Vec<String> = playlist.tracks().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, ["s1", "s2"]);
}

#[tokio::test]
async fn non_success_status_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/playlist/p1/songs/s1"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"message": "Song is already in the playlist"})),
        )
        .mount(&server)
        .await;

    let api = client(&server).await;
    api.set_token(Some("t".into())).await;
    let err = api.add_song_to_playlist("p1", "s1").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.backend_message(), Some("Song is already in the playlist"));
}

#[tokio::test]
async fn malformed_success_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/song/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client(&server).await.get_song("s1").await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn search_sends_type_only_for_filtered_tabs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("query", "love"))
        .and(query_param("type", "album"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"albums": [{"_id": "a1", "name": "Love"}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("query", "love"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"songs": [{"_id": "s1", "name": "Love song"}], "albums": [], "playlists": []}
        })))
        .mount(&server)
        .await;

    let api = client(&server).await;
    let albums = api.search("love", SearchTab::Albums).await.unwrap();
    assert_eq!(albums.albums.len(), 1);
    assert!(albums.songs.is_empty());

    let all = api.search("love", SearchTab::All).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(matches!(all.row(0), Some(crate::model::SearchRow::Song(_))));
}

#[tokio::test]
async fn likes_comments_and_downloads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/like/check/playlist/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"liked": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/comment/song/s1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": {
                "_id": "c1",
                "content": "great",
                "user": {"_id": "u1", "name": "Ada"},
                "createdAt": "2024-01-31T14:05:00.000Z"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/download/song/s1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"downloadUrl": "https://cdn/s1.mp3"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/download/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"_id": "d1", "song": {"_id": "s1", "name": "One"}, "downloadedAt": "2024-02-01T00:00:00Z"}]
        })))
        .mount(&server)
        .await;

    let api = client(&server).await;
    api.set_token(Some("t".into())).await;

    assert!(api.is_liked(ItemKind::Playlist, "p1").await.unwrap());

    let comment = api.add_comment(ItemKind::Song, "s1", "great").await.unwrap();
    assert_eq!(comment.author(), "Ada");
    assert!(comment.is_by("u1"));
    assert_eq!(comment.posted_label(), "2024-01-31 at 14:05");

    assert_eq!(api.download_url("s1").await.unwrap(), "https://cdn/s1.mp3");

    let downloads = api.user_downloads().await.unwrap();
    assert_eq!(downloads[0].song.as_ref().map(|s| s.name()), Some("One"));
}

#[tokio::test]
async fn liked_songs_tolerate_null_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/like/user/songs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": null})))
        .mount(&server)
        .await;

    let api = client(&server).await;
    api.set_token(Some("t".into())).await;
    assert!(api.liked_songs().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_song_returns_the_new_track() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/song/add"))
        .and(header("authorization", "Bearer t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "song": {"_id": "new1", "name": "Demo"}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("demo.mp3");
    let image = dir.path().join("cover.png");
    std::fs::write(&audio, b"ID3").unwrap();
    std::fs::write(&image, b"PNG").unwrap();

    let api = client(&server).await;
    api.set_token(Some("t".into())).await;
    let meta = SongUpload {
        name: "Demo".into(),
        duration: "0:01".into(),
        ..Default::default()
    };
    let song = api.upload_song(&meta, &audio, &image).await.unwrap();
    assert_eq!(song.id, "new1");

    let missing = api.upload_song(&meta, &dir.path().join("nope.mp3"), &image).await;
    assert!(matches!(missing, Err(ApiError::Io(_))));
}
