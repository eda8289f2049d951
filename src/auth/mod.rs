//! Identity provider client
//!
//! Wraps the signup endpoint of the remote identity provider and keeps the
//! latest issued session cached in memory.

mod types;

use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::config::ClientOptions;

pub use types::{AuthResponse, Session, User};

/// エラー型
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Profile metadata attached to a signup request
#[derive(Debug, Clone, Serialize)]
pub struct SignUpMetadata {
    pub full_name: String,
}

/// Auth クライアント
pub struct AuthClient {
    url: String,
    key: String,
    http_client: Client,
    options: ClientOptions,
    current_session: Arc<Mutex<Option<Session>>>,
}

impl AuthClient {
    /// 新しい Auth クライアントを作成
    pub(crate) fn new(url: &str, key: &str, http_client: Client, options: ClientOptions) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
            options,
            current_session: Arc::new(Mutex::new(None)),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    /// ユーザー登録
    ///
    /// Posts the credentials and profile metadata to the signup endpoint and
    /// returns the provider's response as-is; callers decide what a usable
    /// success looks like.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AuthResponse, AuthError> {
        let url = self.auth_url("/signup");

        let payload = json!({
            "email": email,
            "password": password,
            "data": metadata,
        });

        debug!("signing up {}", email);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AuthError::ApiError(extract_error_message(&error_text)));
        }

        let result: AuthResponse = response.json().await?;

        // セッションを保存
        if self.options.persist_session {
            if let Some(session) = result.session() {
                let mut guard = self.current_session.lock().unwrap();
                *guard = Some(session);
            }
        }

        Ok(result)
    }

    /// 現在のセッションを取得
    pub fn get_session(&self) -> Option<Session> {
        let guard = self.current_session.lock().unwrap();
        guard.clone()
    }

    /// セッションを設定
    pub fn set_session(&self, session: Session) {
        let mut guard = self.current_session.lock().unwrap();
        *guard = Some(session);
    }
}

// Provider error bodies are JSON with the human-readable message under one
// of a few keys; fall back to the raw body when none parses.
fn extract_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        msg: Option<String>,
        message: Option<String>,
        error_description: Option<String>,
        error: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed
            .msg
            .or(parsed.message)
            .or(parsed.error_description)
            .or(parsed.error)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn metadata() -> SignUpMetadata {
        SignUpMetadata {
            full_name: "Ann Example".to_string(),
        }
    }

    #[test]
    fn test_sign_up() {
        tokio_test::block_on(async {
            let mock_server = MockServer::start().await;

            let response_body = serde_json::json!({
                "access_token": "test_access_token",
                "refresh_token": "test_refresh_token",
                "expires_in": 3600,
                "token_type": "bearer",
                "user": {
                    "id": "test_user_id",
                    "email": "test@example.com",
                    "user_metadata": { "full_name": "Ann Example" },
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-01T00:00:00Z"
                }
            });

            Mock::given(method("POST"))
                .and(path("/auth/v1/signup"))
                .and(body_partial_json(serde_json::json!({
                    "email": "test@example.com",
                    "data": { "full_name": "Ann Example" }
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
                .mount(&mock_server)
                .await;

            let auth = AuthClient::new(
                &mock_server.uri(),
                "test_key",
                Client::new(),
                ClientOptions::default(),
            );

            let result = auth
                .sign_up("test@example.com", "password123", &metadata())
                .await;

            assert!(result.is_ok());
            let response = result.unwrap();
            let session = response.session().expect("session should be assembled");
            assert_eq!(session.access_token, "test_access_token");

            // セッションがメモリ上にも保存されること
            let cached = auth.get_session().expect("session should be cached");
            assert_eq!(cached.access_token, "test_access_token");
        });
    }

    #[test]
    fn test_sign_up_error_message_is_extracted() {
        tokio_test::block_on(async {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/auth/v1/signup"))
                .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                    "code": 400,
                    "msg": "User already registered"
                })))
                .mount(&mock_server)
                .await;

            let auth = AuthClient::new(
                &mock_server.uri(),
                "test_key",
                Client::new(),
                ClientOptions::default(),
            );

            let result = auth
                .sign_up("test@example.com", "password123", &metadata())
                .await;

            match result {
                Err(AuthError::ApiError(message)) => {
                    assert_eq!(message, "User already registered")
                }
                other => panic!("unexpected result: {:?}", other),
            }
        });
    }

    #[test]
    fn test_session_is_not_cached_when_persist_disabled() {
        tokio_test::block_on(async {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/auth/v1/signup"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "access_token": "t",
                    "refresh_token": "r",
                    "expires_in": 3600,
                    "token_type": "bearer",
                    "user": { "id": "u1" }
                })))
                .mount(&mock_server)
                .await;

            let options = ClientOptions::default().with_persist_session(false);
            let auth = AuthClient::new(&mock_server.uri(), "test_key", Client::new(), options);

            let result = auth
                .sign_up("test@example.com", "password123", &metadata())
                .await;

            assert!(result.is_ok());
            assert!(auth.get_session().is_none());
        });
    }
}
