//! Static credential discovery
//!
//! Credentials resolve through the same enumerated chain as every other
//! ambient value: explicit override, then the standard environment
//! variables, then the selected profile in the shared credentials file.
//! A source that supplies one half of a key pair without the other is an
//! error rather than a fallthrough, so a typo cannot silently switch the
//! process to a different identity.

use std::fmt;

use tracing::debug;

use crate::error::PlatformError;
use crate::profile::Profiles;

pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// A static credential set for signing control-plane calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
  access_key_id: String,
  secret_access_key: String,
  session_token: Option<String>,
}

impl Credentials {
  pub fn new(
    access_key_id: impl Into<String>,
    secret_access_key: impl Into<String>,
    session_token: Option<String>,
  ) -> Self {
    Self {
      access_key_id: access_key_id.into(),
      secret_access_key: secret_access_key.into(),
      session_token,
    }
  }

  pub fn access_key_id(&self) -> &str {
    &self.access_key_id
  }

  pub fn secret_access_key(&self) -> &str {
    &self.secret_access_key
  }

  pub fn session_token(&self) -> Option<&str> {
    self.session_token.as_deref()
  }

  /// Resolve credentials, in order: explicit override, environment
  /// variables, the selected profile in the shared credentials file.
  pub fn discover(
    explicit: Option<Credentials>,
    profiles: &Profiles,
  ) -> Result<Self, PlatformError> {
    if let Some(credentials) = explicit {
      debug!("using explicit credentials");
      return Ok(credentials);
    }

    if let Some(credentials) = from_env()? {
      debug!(access_key_id = %credentials.access_key_id, "credentials from environment");
      return Ok(credentials);
    }

    if let Some(credentials) = from_profile(profiles)? {
      debug!(
        access_key_id = %credentials.access_key_id,
        profile = %profiles.name(),
        "credentials from shared credentials file"
      );
      return Ok(credentials);
    }

    Err(PlatformError::CredentialsNotFound {
      profile: profiles.name().to_string(),
    })
  }
}

// Secret material must never reach logs or terminal output.
impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("access_key_id", &self.access_key_id)
      .field("secret_access_key", &"<redacted>")
      .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

fn from_env() -> Result<Option<Credentials>, PlatformError> {
  let id = non_empty_var(ENV_ACCESS_KEY_ID);
  let secret = non_empty_var(ENV_SECRET_ACCESS_KEY);

  match (id, secret) {
    (Some(id), Some(secret)) => Ok(Some(Credentials::new(id, secret, non_empty_var(ENV_SESSION_TOKEN)))),
    (None, None) => Ok(None),
    _ => Err(PlatformError::IncompleteCredentials {
      origin: "environment".to_string(),
    }),
  }
}

fn from_profile(profiles: &Profiles) -> Result<Option<Credentials>, PlatformError> {
  match (profiles.access_key_id(), profiles.secret_access_key()) {
    (Some(id), Some(secret)) => Ok(Some(Credentials::new(
      id,
      secret,
      profiles.session_token().map(str::to_string),
    ))),
    (None, None) => Ok(None),
    _ => Err(PlatformError::IncompleteCredentials {
      origin: format!("profile `{}`", profiles.name()),
    }),
  }
}

fn non_empty_var(var: &str) -> Option<String> {
  match std::env::var(var) {
    Ok(value) if !value.is_empty() => Some(value),
    _ => None,
  }
}
