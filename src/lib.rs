//! Strider Onboarding Client Library
//!
//! A Rust client library for the Strider signup flow, covering local form
//! validation, the remote registration sequence against a Supabase backend,
//! and durable session persistence on the device.

pub mod auth;
pub mod config;
pub mod error;
pub mod signup;
pub mod storage;
pub mod store;
pub mod validator;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::AuthClient;
use crate::config::ClientOptions;
use crate::signup::SignupFlow;
use crate::storage::KeyValueStorage;
use crate::store::TableStore;

/// The main entry point for the onboarding client
pub struct OnboardingClient {
    /// The base URL for the backend project
    pub url: String,
    /// The anonymous API key for the backend project
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
}

impl OnboardingClient {
    /// Create a new onboarding client
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL for your backend project
    /// * `key` - The anonymous API key for your backend project
    ///
    /// # Example
    ///
    /// ```
    /// use strider_onboarding::OnboardingClient;
    ///
    /// let client = OnboardingClient::new("https://your-project-url.supabase.co", "your-anon-key");
    /// ```
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new onboarding client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use strider_onboarding::{config::ClientOptions, OnboardingClient};
    ///
    /// let options = ClientOptions::default().with_users_table("profiles");
    /// let client = OnboardingClient::new_with_options(
    ///     "https://your-project-url.supabase.co",
    ///     "your-anon-key",
    ///     options,
    /// );
    /// ```
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().unwrap_or_else(|_| Client::new());

        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http_client,
            options,
        }
    }

    /// Create an auth client for the identity provider
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(
            &self.url,
            &self.key,
            self.http_client.clone(),
            self.options.clone(),
        )
    }

    /// Create a table store client for the application-owned tables
    pub fn store(&self) -> TableStore {
        TableStore::new(
            &self.url,
            &self.key,
            self.http_client.clone(),
            self.options.clone(),
        )
    }

    /// Create a signup flow backed by the given local storage
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use strider_onboarding::storage::FileStorage;
    /// use strider_onboarding::OnboardingClient;
    ///
    /// let client = OnboardingClient::new("https://your-project-url.supabase.co", "your-anon-key");
    /// let flow = client.signup_flow(Arc::new(FileStorage::new("/tmp/strider")));
    /// ```
    pub fn signup_flow(&self, storage: Arc<dyn KeyValueStorage>) -> SignupFlow {
        SignupFlow::new(self.auth(), self.store(), storage)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::signup::SignupFlow;
    pub use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage, SESSION_STORAGE_KEY};
    pub use crate::validator::{validate, Field, FieldErrors, SignupFields};
    pub use crate::OnboardingClient;
}
