use crate::core::domain::{
    error::{OneError, OneResult},
    value_object::{OnePassword, OneSession, OneUrl, OneUsername},
};
use std::{env, fmt};

/// Environment variable consulted when no endpoint is given.
pub const ENV_URL: &str = "ONE_URL";
/// Environment variable consulted when no username is given.
pub const ENV_USERNAME: &str = "ONE_USERNAME";
/// Environment variable consulted when no password is given.
pub const ENV_PASSWORD: &str = "ONE_PASSWORD";

/// Connection options as supplied by the caller; any of them may be missing.
#[derive(Clone, Default)]
pub struct ConnectionParams {
    pub api_url: Option<String>,
    pub api_username: Option<String>,
    pub api_password: Option<String>,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("api_url", &self.api_url)
            .field("api_username", &self.api_username)
            .field("api_password", &self.api_password.as_ref().map(|_| "********"))
            .finish()
    }
}

/// A resolved and validated endpoint plus credentials.
#[derive(Debug, Clone)]
pub struct OneConnection {
    url: OneUrl,
    username: OneUsername,
    password: OnePassword,
}

impl OneConnection {
    pub fn new(url: OneUrl, username: OneUsername, password: OnePassword) -> Self {
        Self {
            url,
            username,
            password,
        }
    }

    /// Resolves the connection, falling back to `ONE_URL`, `ONE_USERNAME` and
    /// `ONE_PASSWORD` from the process environment.
    pub fn from_env(params: ConnectionParams) -> OneResult<Self> {
        Self::resolve(params, |key| env::var(key).ok())
    }

    /// Resolves the connection using `lookup` for every missing or empty value.
    ///
    /// # Errors
    ///
    /// * [`OneError::Configuration`] if any of the three values is still missing
    /// * [`OneError::Validation`] if a value is present but malformed
    pub fn resolve<F>(params: ConnectionParams, lookup: F) -> OneResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |given: Option<String>, key: &str| {
            given
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(key))
                .filter(|v| !v.is_empty())
        };

        let url = pick(params.api_url, ENV_URL);
        let username = pick(params.api_username, ENV_USERNAME);
        let password = pick(params.api_password, ENV_PASSWORD);

        let (Some(url), Some(username), Some(password)) = (url, username, password) else {
            return Err(OneError::Configuration(
                "One or more connection parameters (api_url, api_username, api_password) were not specified"
                    .to_string(),
            ));
        };

        Ok(Self::new(
            OneUrl::new(&url)?,
            OneUsername::new(username)?,
            OnePassword::new(password)?,
        ))
    }

    pub fn url(&self) -> &OneUrl {
        &self.url
    }

    pub fn username(&self) -> &OneUsername {
        &self.username
    }

    pub fn password(&self) -> &OnePassword {
        &self.password
    }

    /// The `username:password` session string.
    pub fn session(&self) -> OneSession {
        OneSession::new(&self.username, &self.password)
    }
}
