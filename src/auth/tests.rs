use super::*;
use crate::config::ApiSettings;
use crate::error::ValidationError;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer, dir: &std::path::Path) -> (SessionStore, ApiClient) {
    let settings = ApiSettings {
        base_url: server.uri(),
        ..Default::default()
    };
    let api = ApiClient::new(&settings).unwrap();
    (SessionStore::new(api.clone(), SessionStorage::new(dir)), api)
}

fn user_json() -> serde_json::Value {
    serde_json::json!({
        "_id": "u1",
        "name": "Ada",
        "email": "ada@example.com",
        "token": "jwt-abc"
    })
}

#[tokio::test]
async fn login_persists_session_and_installs_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/user/login"))
        .and(body_json(serde_json::json!({"email": "ada@example.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (store, api) = store_for(&server, dir.path());

    let session = store.login(" ada@example.com ", "secret1").await.unwrap();
    assert_eq!(session.id, "u1");
    assert_eq!(session.token, "jwt-abc");
    assert!(store.is_authenticated().await);
    assert!(api.has_token().await);
    assert!(dir.path().join("user.json").exists());
}

#[tokio::test]
async fn wrong_password_yields_auth_error_and_persists_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/user/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (store, api) = store_for(&server, dir.path());

    let err = store.login("ada@example.com", "wrong").await.unwrap_err();
    assert_eq!(err, AuthError::new("Invalid credentials"));
    assert!(!store.is_authenticated().await);
    assert!(!api.has_token().await);
    assert!(!dir.path().join("user.json").exists());
}

#[tokio::test]
async fn failures_without_a_message_use_the_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/user/register"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/auth/user/reset-password/tok"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_for(&server, dir.path());

    let err = store
        .register(NewUser {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.message, "Registration failed");

    let err = store.reset_password("tok", "secret1").await.unwrap_err();
    assert_eq!(err.message, "Failed to reset password");
}

#[tokio::test]
async fn session_survives_restart_and_logout_clears_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/user/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_json()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_for(&server, dir.path());
    store
        .register(NewUser {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();

    let (restarted, api) = store_for(&server, dir.path());
    let restored = restarted.restore().await.unwrap();
    assert_eq!(restored.name, "Ada");
    assert!(api.has_token().await);

    restarted.logout().await;
    assert!(restarted.current().await.is_none());
    assert!(!api.has_token().await);

    let (again, _) = store_for(&server, dir.path());
    assert!(again.restore().await.is_none());
}

#[tokio::test]
async fn corrupt_record_is_discarded() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("user.json"), "{not json").unwrap();

    let (store, _) = store_for(&server, dir.path());
    assert!(store.restore().await.is_none());
    assert!(!dir.path().join("user.json").exists());
}

#[tokio::test]
async fn forgot_password_returns_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/user/forgot-password"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "Email sent"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_for(&server, dir.path());
    assert_eq!(store.forgot_password("ada@example.com").await.unwrap(), "Email sent");
}

#[test]
fn validation_rules() {
    assert_eq!(validation::login("", "x"), Err(ValidationError::Required("Email")));
    assert_eq!(validation::login("ada", "x"), Err(ValidationError::InvalidEmail));
    assert_eq!(validation::login("ada@example.com", "  "), Err(ValidationError::Required("Password")));
    assert!(validation::login("ada@example.com", "x").is_ok());

    assert_eq!(
        validation::register("Ada", "ada@example.com", "secret1", "secret2"),
        Err(ValidationError::PasswordMismatch)
    );
    assert_eq!(
        validation::register("Ada", "ada@example.com", "abc", "abc"),
        Err(ValidationError::PasswordTooShort { min: 6 })
    );
    assert_eq!(
        validation::register(" ", "ada@example.com", "secret1", "secret1"),
        Err(ValidationError::Required("Name"))
    );
    assert!(validation::register("Ada", "ada@example.com", "secret1", "secret1").is_ok());

    assert_eq!(
        ValidationError::PasswordTooShort { min: 6 }.to_string(),
        "Password must be at least 6 characters long"
    );
    assert_eq!(validation::playlist_name(""), Err(ValidationError::Required("Playlist name")));
    assert_eq!(validation::comment("\n"), Err(ValidationError::Required("Comment")));
}
