mod one_password;
mod one_session;
mod one_url;
mod one_username;

pub use one_password::OnePassword;
pub use one_session::OneSession;
pub use one_url::OneUrl;
pub use one_username::OneUsername;

