use crate::core::domain::error::ValidationError;

const MAX_USERNAME_LENGTH: usize = 128;

/// A validated OpenNebula username.
#[derive(Debug, Clone, PartialEq)]
pub struct OneUsername(String);

impl OneUsername {
    /// Validates and wraps a username.
    pub fn new(username: String) -> Result<Self, ValidationError> {
        validate_username(&username)?;
        Ok(Self(username))
    }

    /// Creates a new username without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(username: String) -> Self {
        Self(username)
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates a username. The session string is `username:password`, so the
/// username itself must not contain the separator.
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::Field {
            field: "api_username".to_string(),
            message: "Username cannot be empty".to_string(),
        });
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::Format(format!(
            "Username cannot exceed {} characters (got {})",
            MAX_USERNAME_LENGTH,
            username.len()
        )));
    }
    if username.contains(':') {
        return Err(ValidationError::Format(
            "Username cannot contain ':'".to_string(),
        ));
    }
    if username.chars().any(char::is_control) {
        return Err(ValidationError::Format(
            "Username contains control characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("oneadmin").is_ok());
        assert!(validate_username("ansible-test").is_ok());
        assert!(validate_username("john.doe@corp").is_ok());
    }

    #[test]
    fn test_validate_username_invalid() {
        assert!(validate_username("").is_err());
        assert!(validate_username("user:name").is_err());
        assert!(validate_username("user\nname").is_err());
        assert!(validate_username(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_username_new_unchecked() {
        let username = OneUsername::new_unchecked("test".to_string());
        assert_eq!(username.as_str(), "test");
    }
}
