//! Basic-auth credentials attached to every outbound request.

use std::fmt;

use crate::error::{HelpdeskError, Result};

/// Suffix appended to the identity when the secret is an API token instead of a password.
const API_TOKEN_SUFFIX: &str = "/token";

/// Represents a stable (identity, secret) pair used for HTTP basic authentication for the life of a run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    identity: String,
    secret: String,
}

impl Credentials {
    /// Builds password credentials, rejecting blank identity or secret.
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        let identity = identity.into().trim().to_string();
        let secret = secret.into();
        if identity.is_empty() {
            return Err(HelpdeskError::Config("identity must not be empty".into()));
        }
        if secret.is_empty() {
            return Err(HelpdeskError::Config("secret must not be empty".into()));
        }
        Ok(Self { identity, secret })
    }

    /// Builds API-token credentials, where the basic-auth user is `<email>/token`.
    pub fn api_token(email: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let email = email.into();
        let identity = if email.trim_end().ends_with(API_TOKEN_SUFFIX) {
            email
        } else {
            format!("{}{}", email.trim(), API_TOKEN_SUFFIX)
        };
        Self::new(identity, token)
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}
