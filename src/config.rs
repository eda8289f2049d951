//! Configuration options for the onboarding client

use std::time::Duration;

/// Configuration options for the onboarding client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Whether to keep the latest session cached in memory on the auth client
    pub persist_session: bool,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema the application tables live in
    pub db_schema: String,

    /// The table holding user profile rows
    pub users_table: String,

    /// The table holding per-user statistics rows
    pub stats_table: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            persist_session: true,
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            users_table: "users".to_string(),
            stats_table: "stats".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set whether to cache the session in memory
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the user profile table
    pub fn with_users_table(mut self, value: &str) -> Self {
        self.users_table = value.to_string();
        self
    }

    /// Set the statistics table
    pub fn with_stats_table(mut self, value: &str) -> Self {
        self.stats_table = value.to_string();
        self
    }
}
