//! Backend selection.
//!
//! [`ConnectionTarget::resolve`] is the only place that decides between the
//! remote server and the local file. It performs no I/O; opening the target is
//! the adapter's job.

use std::fmt;
use std::path::PathBuf;

use super::config::DatabaseSettings;
use crate::domain::errors::ConfigError;

/// Physical backend a connection handle is bound to.
///
/// Chosen once when the handle is created and never changed afterwards.
#[derive(Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// Network-hosted libSQL server
    Remote {
        url: String,
        auth_token: Option<String>,
    },
    /// `SQLite` database file on local disk
    LocalFile { path: PathBuf },
    /// In-memory database with no persistence
    Ephemeral,
}

impl ConnectionTarget {
    /// Pick the backend for the given settings.
    ///
    /// Any non-empty remote URL wins and the local path is ignored; a URL that
    /// is set but malformed is an error, never a fallback. Only an absent or
    /// empty URL selects the configured local path.
    pub fn resolve(settings: &DatabaseSettings) -> Result<Self, ConfigError> {
        if let Some(url) = non_empty(settings.remote_url.as_deref()) {
            if !has_scheme(url) {
                return Err(ConfigError::InvalidRemoteUrl(url.to_string()));
            }
            return Ok(Self::Remote {
                url: url.to_string(),
                auth_token: non_empty(settings.auth_token.as_deref()).map(str::to_string),
            });
        }

        if settings.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        Ok(Self::LocalFile {
            path: settings.path.clone(),
        })
    }

    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Short backend label used in logs and CLI output.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Remote { .. } => "remote",
            Self::LocalFile { .. } => "local_file",
            Self::Ephemeral => "ephemeral",
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// `scheme:rest`, where the scheme is a letter followed by letters, digits,
/// `+`, `-` or `.`.
fn has_scheme(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
}

// Never prints the auth token.
impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { url, auth_token } => {
                let token = if auth_token.is_some() { "set" } else { "none" };
                write!(f, "remote {url} (token: {token})")
            }
            Self::LocalFile { path } => write!(f, "file {}", path.display()),
            Self::Ephemeral => write!(f, ":memory:"),
        }
    }
}

impl fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { url, auth_token } => f
                .debug_struct("Remote")
                .field("url", url)
                .field("auth_token", &auth_token.as_ref().map(|_| "[REDACTED]"))
                .finish(),
            Self::LocalFile { path } => f.debug_struct("LocalFile").field("path", path).finish(),
            Self::Ephemeral => write!(f, "Ephemeral"),
        }
    }
}
