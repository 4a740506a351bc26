use crate::core::domain::error::ValidationError;
use url::Url;

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];
const MAX_URL_LENGTH: usize = 2083;

/// A validated OpenNebula XML-RPC endpoint, e.g. `https://one.example.com:2633/RPC2`.
#[derive(Debug, Clone, PartialEq)]
pub struct OneUrl(Url);

impl OneUrl {
    /// Parses and validates an endpoint URL.
    pub fn new(url: &str) -> Result<Self, ValidationError> {
        validate_url(url)?;
        let parsed = Url::parse(url)
            .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;
        Ok(Self(parsed))
    }

    /// Creates a new URL without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(url: &str) -> Self {
        Self(Url::parse(url).expect("test URL must parse"))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the parsed URL.
    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

/// Validates an endpoint URL: non-empty, bounded length, http(s) scheme and a host.
pub(crate) fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::Field {
            field: "api_url".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let parsed =
        Url::parse(url).map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme '{}'. Must be one of: {}",
            parsed.scheme(),
            ALLOWED_SCHEMES.join(", ")
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::Field {
            field: "api_url".to_string(),
            message: "URL must contain a host".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_valid() {
        assert!(validate_url("https://one.example.com:2633/RPC2").is_ok());
        assert!(validate_url("http://10.0.0.1:2633/RPC2").is_ok());
        assert!(validate_url("http://localhost:2633").is_ok());
    }

    #[test]
    fn test_validate_url_invalid() {
        assert!(validate_url("").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("ftp://one.example.com/RPC2").is_err());
        assert!(validate_url(&format!("https://{}.com", "a".repeat(2100))).is_err());
    }

    #[test]
    fn test_url_new_keeps_path() {
        let url = OneUrl::new("https://one.example.com:2633/RPC2").unwrap();
        assert_eq!(url.as_str(), "https://one.example.com:2633/RPC2");
        assert_eq!(url.as_url().path(), "/RPC2");
    }
}
