#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use counsel::admin::AdminError;
use counsel::config::ConfigError;
use counsel::session::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("not logged in as admin; run `admin login` first")]
    MissingAdminToken,
    #[error("admin login rejected: {0}")]
    AdminLoginRejected(String),
    #[error("health check failed: {0}")]
    Health(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
