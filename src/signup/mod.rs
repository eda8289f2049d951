//! Signup orchestration
//!
//! Runs the registration sequence: create the auth identity, verify the
//! response is complete, create the profile and stats rows, persist the
//! session. Steps are strictly ordered; a failed step aborts the attempt,
//! nothing is retried, and earlier steps are not compensated.

use log::{error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::auth::{AuthClient, AuthError, SignUpMetadata};
use crate::error::Error;
use crate::storage::{KeyValueStorage, SESSION_STORAGE_KEY};
use crate::store::TableStore;
use crate::validator::{validate, Field, FieldErrors, SignupFields};

/// Drives one signup attempt from raw form input to a persisted session.
///
/// Holds the state the screen renders between attempts: the current field
/// errors and an in-flight flag.
pub struct SignupFlow {
    auth: AuthClient,
    store: TableStore,
    storage: Arc<dyn KeyValueStorage>,
    in_flight: AtomicBool,
    field_errors: RwLock<FieldErrors>,
}

impl SignupFlow {
    pub(crate) fn new(
        auth: AuthClient,
        store: TableStore,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            auth,
            store,
            storage,
            in_flight: AtomicBool::new(false),
            field_errors: RwLock::new(FieldErrors::default()),
        }
    }

    /// Whether a validated attempt is currently running.
    ///
    /// The flow itself accepts concurrent `submit` calls; callers that must
    /// prevent a double submit (a double-tapped button) read this flag and
    /// disable re-submission while it is raised.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Field errors from the most recent validation pass
    pub fn field_errors(&self) -> FieldErrors {
        self.field_errors.read().unwrap().clone()
    }

    /// Drop the error shown for one field, typically as the user edits it
    pub fn clear_field_error(&self, field: Field) {
        let mut errors = self.field_errors.write().unwrap();
        errors.remove(field);
    }

    /// Validate and, if the form is clean, run the registration sequence.
    ///
    /// Returns the serialized session on success. Validation failures never
    /// reach the network; remote failures abort the attempt at the failing
    /// step. A failure after the identity was created leaves that identity
    /// in place, so retrying a failed attempt registers a brand-new one.
    pub async fn submit(&self, fields: &SignupFields) -> Result<String, Error> {
        let errors = validate(fields);
        {
            let mut current = self.field_errors.write().unwrap();
            *current = errors.clone();
        }
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        self.in_flight.store(true, Ordering::SeqCst);
        let result = self.run(fields).await;
        self.in_flight.store(false, Ordering::SeqCst);

        if let Err(err) = &result {
            error!("signup attempt failed: {}", err);
        }
        result
    }

    // The remote part of one attempt; the form has already validated.
    async fn run(&self, fields: &SignupFields) -> Result<String, Error> {
        let metadata = SignUpMetadata {
            full_name: fields.full_name.trim().to_string(),
        };

        let response = self
            .auth
            .sign_up(&fields.email, &fields.password, &metadata)
            .await
            .map_err(|err| match err {
                AuthError::ApiError(message) => Error::AuthProvider(message),
                other => Error::AuthProvider(other.to_string()),
            })?;

        if let Some(message) = response.provider_error() {
            return Err(Error::AuthProvider(message));
        }

        // A success response must carry a session, a user id and the echoed
        // profile name; anything less is a protocol violation and nothing
        // may be written on its basis.
        let session = response.session().ok_or(Error::IncompleteResponse)?;
        let user = response
            .user
            .as_ref()
            .filter(|user| !user.id.is_empty())
            .ok_or(Error::IncompleteResponse)?;
        let full_name = user
            .full_name()
            .ok_or(Error::IncompleteResponse)?
            .to_string();

        // Profile first, then stats. The rows key on the fresh user id and
        // the inserts run under the fresh session's token.
        let store = self.store.with_auth(&session.access_token);
        store
            .insert_user(&user.id, &fields.email, &full_name)
            .await
            .map_err(Error::ProfileWrite)?;
        store
            .insert_stats(&user.id)
            .await
            .map_err(Error::StatsWrite)?;

        // Persist the session blob last, so the slot only ever holds a
        // fully-validated session. The remote rows stay in place even if
        // this fails.
        let serialized =
            serde_json::to_string(&session).map_err(|err| Error::SessionPersist(err.into()))?;
        self.storage
            .set_item(SESSION_STORAGE_KEY, &serialized)
            .await
            .map_err(Error::SessionPersist)?;

        info!("user {} created and session saved", user.id);

        Ok(serialized)
    }
}
