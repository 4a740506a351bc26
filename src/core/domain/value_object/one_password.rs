use crate::core::domain::error::ValidationError;
use std::fmt;

/// An OpenNebula password (plaintext, only forwarded in the session string).
#[derive(Clone, PartialEq)]
pub struct OnePassword(String);

impl OnePassword {
    /// Validates and wraps a password.
    pub fn new(password: String) -> Result<Self, ValidationError> {
        validate_password(&password)?;
        Ok(Self(password))
    }

    /// Creates a new password without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(password: String) -> Self {
        Self(password)
    }

    /// Returns the password as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OnePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OnePassword(********)")
    }
}

/// Validates a password. OpenNebula accepts any non-empty secret, including tokens.
pub(crate) fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Field {
            field: "api_password".to_string(),
            message: "Password cannot be empty".to_string(),
        });
    }
    Ok(())
}
