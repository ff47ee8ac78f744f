//! Error types for penguins-platform

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving the ambient AWS context
#[derive(Debug, Error)]
pub enum PlatformError {
  /// Every region source was consulted and came up empty.
  #[error(
    "no region configured for profile `{profile}`: checked AWS_REGION, AWS_DEFAULT_REGION, and the shared config file"
  )]
  RegionNotFound { profile: String },

  /// Every credential source was consulted and came up empty.
  #[error(
    "no credentials configured for profile `{profile}`: checked AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY and the shared credentials file"
  )]
  CredentialsNotFound { profile: String },

  /// One half of a static key pair was present without the other.
  #[error("incomplete credentials from {origin}: access key id and secret access key must be set together")]
  IncompleteCredentials { origin: String },

  /// Every role source was consulted and came up empty.
  #[error(
    "no execution role configured for profile `{profile}`: checked PENGUINS_ROLE_ARN, AWS_ROLE_ARN, and the shared config file"
  )]
  RoleNotFound { profile: String },

  #[error("invalid region identifier {value:?}")]
  InvalidRegion { value: String },

  #[error("invalid role ARN {value:?}: {reason}")]
  InvalidRoleArn { value: String, reason: &'static str },

  #[error("failed to determine home directory")]
  NoHomeDirectory,

  #[error("failed to read profile file {}: {source}", path.display())]
  ReadProfileFile { path: PathBuf, source: std::io::Error },

  #[error("malformed profile file {} at line {line}: {reason}", path.display())]
  MalformedProfileFile {
    path: PathBuf,
    line: usize,
    reason: &'static str,
  },

  #[error("failed to construct HTTP client: {0}")]
  HttpClient(#[from] reqwest::Error),
}
