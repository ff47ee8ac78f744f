//! Region discovery

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlatformError;
use crate::profile::Profiles;

pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

/// AWS region identifier (e.g., "eu-west-1")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
  /// Validate and wrap a region identifier.
  pub fn new(value: impl Into<String>) -> Result<Self, PlatformError> {
    let value = value.into();
    if is_valid_region(&value) {
      Ok(Self(value))
    } else {
      Err(PlatformError::InvalidRegion { value })
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Resolve the region, in order: explicit override, `AWS_REGION`,
  /// `AWS_DEFAULT_REGION`, the selected profile's `region` key.
  pub fn discover(explicit: Option<&str>, profiles: &Profiles) -> Result<Self, PlatformError> {
    if let Some(value) = explicit {
      debug!(region = %value, "using explicit region");
      return Self::new(value);
    }

    for var in [ENV_REGION, ENV_DEFAULT_REGION] {
      match std::env::var(var) {
        Ok(value) if !value.is_empty() => {
          debug!(region = %value, source = var, "region from environment");
          return Self::new(value);
        }
        _ => {}
      }
    }

    if let Some(value) = profiles.region() {
      debug!(region = %value, profile = %profiles.name(), "region from shared config");
      return Self::new(value);
    }

    Err(PlatformError::RegionNotFound {
      profile: profiles.name().to_string(),
    })
  }
}

impl fmt::Display for Region {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Region identifiers are short lowercase alphanumeric segments joined by
/// hyphens ("us-east-1", "eu-central-1").
fn is_valid_region(value: &str) -> bool {
  !value.is_empty()
    && value.len() <= 32
    && value.starts_with(|c: char| c.is_ascii_lowercase())
    && !value.ends_with('-')
    && value
      .chars()
      .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
