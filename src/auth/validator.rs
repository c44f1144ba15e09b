//! Credential validation
//!
//! Checks a username/password pair against the `auth.basic` table of the
//! runtime configuration.

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Name of the account that authenticated the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

/// Validates a username/password pair.
///
/// The config loader lower-cases table keys, so a username that is not found
/// verbatim is looked up again in lower case.
pub fn validate_credentials(
    username: &str,
    password: &str,
    config: &AuthConfig,
) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let stored = config
        .basic
        .get(username)
        .or_else(|| config.basic.get(&username.to_lowercase()));

    match stored {
        Some(stored) if stored == password => Ok(()),
        Some(_) => Err(AuthError::InvalidPassword(username.to_string())),
        None => Err(AuthError::UserNotFound(username.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> AuthConfig {
        let mut config = AuthConfig::default();
        config.basic.insert("alice".into(), "alice123".into());
        config.basic.insert("bob".into(), "bob123".into());
        config
    }

    #[test]
    fn test_accepts_known_account() {
        assert!(validate_credentials("alice", "alice123", &accounts()).is_ok());
    }

    #[test]
    fn test_rejects_wrong_password() {
        assert!(matches!(
            validate_credentials("alice", "bob123", &accounts()),
            Err(AuthError::InvalidPassword(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_user() {
        assert!(matches!(
            validate_credentials("mallory", "alice123", &accounts()),
            Err(AuthError::UserNotFound(_))
        ));
    }

    #[test]
    fn test_empty_table_rejects_everyone() {
        assert!(validate_credentials("alice", "alice123", &AuthConfig::default()).is_err());
        assert!(matches!(
            validate_credentials("", "", &accounts()),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_username_falls_back_to_lower_case() {
        assert!(validate_credentials("Alice", "alice123", &accounts()).is_ok());
    }
}
