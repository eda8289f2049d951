//! Signup form validation
//!
//! Pure validation of the raw form input. No network access, no side
//! effects; the same input always yields the same result.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 6;

lazy_static! {
    // A non-space run, an @, and a dotted domain; the provider performs
    // the authoritative check.
    static ref EMAIL_RE: Regex = Regex::new(r"\S+@\S+\.\S+").unwrap();
}

/// One named input field of the signup form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    Email,
    Password,
    ConfirmPassword,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::FullName => "full_name",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm_password",
        };
        write!(f, "{}", name)
    }
}

/// Raw signup form input, owned by a single submit attempt
#[derive(Debug, Clone, Default)]
pub struct SignupFields {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Field-level validation errors; empty means the form is valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// True when no field is in error
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields currently in error
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The message for one field, if it is in error
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(|message| message.as_str())
    }

    /// Iterate fields in error, in form order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        self.0
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }

    pub(crate) fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_string());
    }

    pub(crate) fn remove(&mut self, field: Field) {
        self.0.remove(&field);
    }
}

/// Validate the signup form.
///
/// Every field is checked in the same pass and every applicable error is
/// recorded; the result is rebuilt from scratch on each call, never merged
/// into a previous one.
pub fn validate(fields: &SignupFields) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if fields.full_name.trim().is_empty() {
        errors.insert(Field::FullName, "Full name is required");
    }

    if fields.email.is_empty() {
        errors.insert(Field::Email, "Email is required");
    } else if !EMAIL_RE.is_match(&fields.email) {
        errors.insert(Field::Email, "Email is invalid");
    }

    if fields.password.is_empty() {
        errors.insert(Field::Password, "Password is required");
    } else if fields.password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(Field::Password, "Password must be at least 6 characters");
    }

    // An untouched confirmation field is reported in its own right; once
    // either field is filled in, the two must match exactly, even when the
    // password already has an error of its own.
    if fields.password.is_empty() && fields.confirm_password.is_empty() {
        errors.insert(Field::ConfirmPassword, "Confirm password is required");
    } else if fields.confirm_password != fields.password {
        errors.insert(Field::ConfirmPassword, "Passwords do not match");
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(full_name: &str, email: &str, password: &str, confirm: &str) -> SignupFields {
        SignupFields {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = validate(&SignupFields::default());

        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(Field::FullName), Some("Full name is required"));
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
        assert_eq!(errors.get(Field::Password), Some("Password is required"));
        assert_eq!(
            errors.get(Field::ConfirmPassword),
            Some("Confirm password is required")
        );
    }

    #[test]
    fn whitespace_full_name_is_treated_as_empty() {
        let errors = validate(&fields("   ", "a@b.com", "abcdef", "abcdef"));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::FullName), Some("Full name is required"));
    }

    #[test]
    fn malformed_email_is_the_only_error() {
        let errors = validate(&fields("Ann", "bad", "abcdef", "abcdef"));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Email), Some("Email is invalid"));
    }

    #[test]
    fn short_password_is_reported_as_short_not_missing() {
        let errors = validate(&fields("Ann", "a@b.com", "abc", "abc"));

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(Field::Password),
            Some("Password must be at least 6 characters")
        );
    }

    #[test]
    fn mismatched_confirmation_is_the_only_error() {
        let errors = validate(&fields("Ann", "a@b.com", "abcdef", "xyz"));

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(Field::ConfirmPassword),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn confirmation_is_checked_even_when_password_is_in_error() {
        let errors = validate(&fields("Ann", "a@b.com", "abc", "abcd"));

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get(Field::Password),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(
            errors.get(Field::ConfirmPassword),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn valid_form_yields_no_errors() {
        let errors = validate(&fields("Ann", "a@b.com", "abcdef", "abcdef"));
        assert!(errors.is_empty());
    }

    #[test]
    fn validation_is_deterministic() {
        let input = fields("Ann", "bad", "", "");
        assert_eq!(validate(&input), validate(&input));
    }

    #[test]
    fn iteration_follows_form_order() {
        let errors = validate(&SignupFields::default());
        let order: Vec<Field> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(
            order,
            vec![
                Field::FullName,
                Field::Email,
                Field::Password,
                Field::ConfirmPassword
            ]
        );
    }
}
