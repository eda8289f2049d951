//! Types for the identity provider wire format

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Authentication response
///
/// The signup endpoint answers in one of two shapes: a nested
/// `{user, session}` pair, or the session fields flattened at the top level
/// next to `user`. Both are kept optional here and unified by
/// [`AuthResponse::session`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The user record, when one was created
    pub user: Option<User>,

    /// The session, when the provider nests it
    pub session: Option<Session>,

    /// The access token
    #[serde(rename = "access_token")]
    pub access_token: Option<String>,

    /// The refresh token
    #[serde(rename = "refresh_token")]
    pub refresh_token: Option<String>,

    /// The token type
    #[serde(rename = "token_type")]
    pub token_type: Option<String>,

    /// The expiry time in seconds
    #[serde(rename = "expires_in")]
    pub expires_in: Option<i64>,

    /// The expiry timestamp
    #[serde(rename = "expires_at")]
    pub expires_at: Option<i64>,

    /// Any error reported inside the response body
    pub error: Option<String>,

    /// The error description
    #[serde(rename = "error_description")]
    pub error_description: Option<String>,
}

impl AuthResponse {
    /// The error reported inside the body, if any.
    ///
    /// Providers may answer 200 and still report failure in the payload.
    pub fn provider_error(&self) -> Option<String> {
        self.error_description
            .clone()
            .or_else(|| self.error.clone())
    }

    /// Assemble the session from either wire shape
    pub fn session(&self) -> Option<Session> {
        if let Some(session) = &self.session {
            return Some(session.clone());
        }

        let access_token = self.access_token.clone()?;
        Some(Session {
            access_token,
            refresh_token: self.refresh_token.clone().unwrap_or_default(),
            token_type: self
                .token_type
                .clone()
                .unwrap_or_else(|| "bearer".to_string()),
            expires_in: self.expires_in.unwrap_or(0),
            expires_at: self.expires_at,
            user: self.user.clone(),
        })
    }
}

/// User data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: String,

    /// The user's email address
    pub email: Option<String>,

    /// The user metadata; profile fields such as `full_name` live here
    #[serde(default, rename = "user_metadata")]
    pub user_metadata: HashMap<String, serde_json::Value>,

    /// The creation time
    #[serde(rename = "created_at")]
    pub created_at: Option<String>,

    /// The update time
    #[serde(rename = "updated_at")]
    pub updated_at: Option<String>,
}

impl User {
    /// The echoed `full_name` metadata, when present and non-empty
    pub fn full_name(&self) -> Option<&str> {
        self.user_metadata
            .get("full_name")
            .and_then(|value| value.as_str())
            .filter(|name| !name.is_empty())
    }
}

/// Session data
///
/// An opaque token bundle: it is serialized for storage as issued, and its
/// tokens are never inspected beyond presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    #[serde(rename = "access_token")]
    pub access_token: String,

    /// The refresh token
    #[serde(rename = "refresh_token")]
    pub refresh_token: String,

    /// The token type
    #[serde(rename = "token_type")]
    pub token_type: String,

    /// The expiry time in seconds
    #[serde(rename = "expires_in")]
    pub expires_in: i64,

    /// The expiry timestamp
    #[serde(rename = "expires_at")]
    pub expires_at: Option<i64>,

    /// The user this session belongs to
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_is_assembled_from_flat_fields() {
        let body = serde_json::json!({
            "access_token": "at",
            "refresh_token": "rt",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": { "id": "u1", "user_metadata": { "full_name": "Ann" } }
        });

        let response: AuthResponse = serde_json::from_value(body).unwrap();
        let session = response.session().expect("flat shape should assemble");

        assert_eq!(session.access_token, "at");
        assert_eq!(session.user.as_ref().unwrap().id, "u1");
    }

    #[test]
    fn nested_session_wins_over_flat_fields() {
        let body = serde_json::json!({
            "session": {
                "access_token": "nested",
                "refresh_token": "rt",
                "token_type": "bearer",
                "expires_in": 3600
            },
            "access_token": "flat",
            "user": { "id": "u1" }
        });

        let response: AuthResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.session().unwrap().access_token, "nested");
    }

    #[test]
    fn missing_session_yields_none() {
        let body = serde_json::json!({
            "user": { "id": "u1", "user_metadata": { "full_name": "Ann" } }
        });

        let response: AuthResponse = serde_json::from_value(body).unwrap();
        assert!(response.session().is_none());
    }

    #[test]
    fn empty_full_name_metadata_is_rejected() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "user_metadata": { "full_name": "" }
        }))
        .unwrap();

        assert!(user.full_name().is_none());
    }

    #[test]
    fn session_serialization_round_trips() {
        let session = Session {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: None,
            user: None,
        };

        let serialized = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&serialized).unwrap();
        assert_eq!(session, restored);
    }
}
