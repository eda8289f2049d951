//! Error handling for the onboarding client
//!
//! Each service module carries its own error enum; this module defines the
//! attempt-level taxonomy the signup flow reports. Every variant names the
//! step that failed, so callers can tell a rejection that left no remote
//! state apart from a partial failure that did.

use thiserror::Error;

use crate::storage::StorageError;
use crate::store::StoreError;
use crate::validator::FieldErrors;

/// Unified error type for one signup attempt
#[derive(Error, Debug)]
pub enum Error {
    /// The form failed local validation; nothing was sent to the network
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// The identity provider rejected the signup
    #[error("auth provider error: {0}")]
    AuthProvider(String),

    /// The provider reported success but the payload was missing the
    /// session, the user id, or the echoed profile name
    #[error("auth provider returned an incomplete signup response")]
    IncompleteResponse,

    /// The profile row could not be written; the auth identity already
    /// exists remotely
    #[error("profile write error: {0}")]
    ProfileWrite(#[source] StoreError),

    /// The stats row could not be written; the auth identity and profile
    /// row already exist remotely
    #[error("stats write error: {0}")]
    StatsWrite(#[source] StoreError),

    /// Local session persistence failed after registration fully succeeded
    /// remotely
    #[error("session persist error: {0}")]
    SessionPersist(#[source] StorageError),
}

impl Error {
    /// A message suitable for direct display to the user.
    ///
    /// Provider rejections are shown verbatim; remote write failures and
    /// protocol violations collapse into a generic failure; a local persist
    /// failure says the account itself was created.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(_) => "Please fix the errors in the form.".to_string(),
            Error::AuthProvider(message) => message.clone(),
            Error::IncompleteResponse | Error::ProfileWrite(_) | Error::StatsWrite(_) => {
                "Sign up failed. Please try again later.".to_string()
            }
            Error::SessionPersist(_) => {
                "Your account was created, but the session could not be saved on this device."
                    .to_string()
            }
        }
    }
}
