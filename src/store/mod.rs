//! Table store client
//!
//! Thin PostgREST writer for the application-owned rows created at signup.
//! Only inserts are exposed; this client never reads, updates, or deletes.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::ClientOptions;

/// PostgREST APIエラーの詳細情報
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoreApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for StoreApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// エラー型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("API error: {details} (Status: {status})")]
    ApiError {
        details: StoreApiErrorDetails,
        status: reqwest::StatusCode,
    },

    #[error("API error (unparsed): {message} (Status: {status})")]
    UnparsedApiError {
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// 新規ユーザーのプロフィール行
#[derive(Debug, Clone, Serialize)]
struct UserRow<'a> {
    id: &'a str,
    email: &'a str,
    full_name: &'a str,
}

/// 初期化された統計行
#[derive(Debug, Clone, Serialize)]
struct StatsRow<'a> {
    user_id: &'a str,
}

/// テーブルストアクライアント
#[derive(Clone)]
pub struct TableStore {
    base_url: String,
    api_key: String,
    http_client: Client,
    options: ClientOptions,
    bearer_token: Option<String>,
}

impl TableStore {
    /// 新しいテーブルストアクライアントを作成
    pub(crate) fn new(
        base_url: &str,
        api_key: &str,
        http_client: Client,
        options: ClientOptions,
    ) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            http_client,
            options,
            bearer_token: None,
        }
    }

    /// 認証トークンを設定したクライアントを返す
    pub fn with_auth(&self, token: &str) -> Self {
        let mut store = self.clone();
        store.bearer_token = Some(token.to_string());
        store
    }

    /// Create the profile row for a newly registered user
    pub async fn insert_user(
        &self,
        user_id: &str,
        email: &str,
        full_name: &str,
    ) -> Result<(), StoreError> {
        let row = UserRow {
            id: user_id,
            email,
            full_name,
        };
        self.insert(&self.options.users_table, &[row]).await
    }

    /// Create the initial statistics row for a newly registered user
    pub async fn insert_stats(&self, user_id: &str) -> Result<(), StoreError> {
        let row = StatsRow { user_id };
        self.insert(&self.options.stats_table, &[row]).await
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.api_key).map_err(|_| {
                StoreError::InvalidParameters("Invalid API key header value".to_string())
            })?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        if let Some(token) = &self.bearer_token {
            headers.insert(
                "Authorization",
                HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                    StoreError::InvalidParameters("Invalid bearer token value".to_string())
                })?,
            );
        }

        // PostgREST writes outside the default schema need a profile header
        if self.options.db_schema != "public" {
            headers.insert(
                "Content-Profile",
                HeaderValue::from_str(&self.options.db_schema).map_err(|_| {
                    StoreError::InvalidParameters(format!(
                        "Invalid schema name: {}",
                        self.options.db_schema
                    ))
                })?,
            );
        }

        Ok(headers)
    }

    /// データを挿入
    async fn insert<T: Serialize>(&self, table: &str, values: &T) -> Result<(), StoreError> {
        let url = self.table_url(table);

        let response = self
            .http_client
            .post(&url)
            .headers(self.headers()?)
            .json(values)
            .send()
            .await
            .map_err(StoreError::NetworkError)?;

        let status = response.status();
        if status.is_success() {
            debug!("inserted into {}", table);
            return Ok(());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response".to_string());

        match serde_json::from_str::<StoreApiErrorDetails>(&error_text) {
            Ok(details) => Err(StoreError::ApiError { details, status }),
            Err(_) => Err(StoreError::UnparsedApiError {
                message: error_text,
                status,
            }),
        }
    }
}
