use crate::core::domain::value_object::{OnePassword, OneUsername};
use std::fmt;

/// The `username:password` credential sent as the first argument of every RPC call.
#[derive(Clone)]
pub struct OneSession(String);

impl OneSession {
    pub fn new(username: &OneUsername, password: &OnePassword) -> Self {
        Self(format!("{}:{}", username.as_str(), password.as_str()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OneSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OneSession(********)")
    }
}
