//! Execution role discovery
//!
//! Pipeline steps run under an IAM role. The role resolves through an
//! enumerated chain (explicit override, `PENGUINS_ROLE_ARN`, `AWS_ROLE_ARN`,
//! the selected profile's `role_arn` key) and every accepted value must be a
//! well-formed IAM role ARN.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlatformError;
use crate::profile::Profiles;

/// Project-scoped override, consulted before the standard variable.
pub const ENV_PENGUINS_ROLE_ARN: &str = "PENGUINS_ROLE_ARN";
pub const ENV_ROLE_ARN: &str = "AWS_ROLE_ARN";

/// IAM role the pipeline executes under, held as a validated ARN
/// (`arn:<partition>:iam::<account>:role/<name>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionRole(String);

impl ExecutionRole {
  /// Validate and wrap a role ARN.
  pub fn new(value: impl Into<String>) -> Result<Self, PlatformError> {
    let value = value.into();
    validate_role_arn(&value).map_err(|reason| PlatformError::InvalidRoleArn {
      value: value.clone(),
      reason,
    })?;
    Ok(Self(value))
  }

  pub fn arn(&self) -> &str {
    &self.0
  }

  /// The role name, i.e. the final path segment of the ARN resource.
  pub fn name(&self) -> &str {
    self
      .0
      .rsplit_once('/')
      .map_or(self.0.as_str(), |(_, name)| name)
  }

  /// The twelve-digit account id the role belongs to.
  pub fn account_id(&self) -> &str {
    self.0.split(':').nth(4).unwrap_or_default()
  }

  /// Resolve the execution role, in order: explicit override,
  /// `PENGUINS_ROLE_ARN`, `AWS_ROLE_ARN`, the selected profile's
  /// `role_arn` key.
  pub fn discover(explicit: Option<&str>, profiles: &Profiles) -> Result<Self, PlatformError> {
    if let Some(value) = explicit {
      debug!(role = %value, "using explicit execution role");
      return Self::new(value);
    }

    for var in [ENV_PENGUINS_ROLE_ARN, ENV_ROLE_ARN] {
      match std::env::var(var) {
        Ok(value) if !value.is_empty() => {
          debug!(role = %value, source = var, "execution role from environment");
          return Self::new(value);
        }
        _ => {}
      }
    }

    if let Some(value) = profiles.role_arn() {
      debug!(role = %value, profile = %profiles.name(), "execution role from shared config");
      return Self::new(value);
    }

    Err(PlatformError::RoleNotFound {
      profile: profiles.name().to_string(),
    })
  }
}

impl fmt::Display for ExecutionRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

fn validate_role_arn(value: &str) -> Result<(), &'static str> {
  let mut parts = value.splitn(6, ':');
  let (arn, partition, service, region, account, resource) = (
    parts.next().unwrap_or_default(),
    parts.next().unwrap_or_default(),
    parts.next().unwrap_or_default(),
    parts.next().unwrap_or_default(),
    parts.next().unwrap_or_default(),
    parts.next().unwrap_or_default(),
  );

  if arn != "arn" {
    return Err("must start with `arn:`");
  }
  if partition.is_empty() {
    return Err("missing partition");
  }
  if service != "iam" {
    return Err("not an IAM ARN");
  }
  if !region.is_empty() {
    return Err("IAM ARNs carry no region");
  }
  if account.len() != 12 || !account.chars().all(|c| c.is_ascii_digit()) {
    return Err("account id must be twelve digits");
  }
  match resource.strip_prefix("role/") {
    Some(name) if !name.is_empty() => Ok(()),
    _ => Err("resource must be `role/<name>`"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::profile::Profile;
  use serial_test::serial;
  use temp_env::with_vars;

  const ARN: &str = "arn:aws:iam::123456789012:role/penguins-execution";

  fn profiles_with_role(role_arn: Option<&str>) -> Profiles {
    Profiles::new(
      "default",
      Profile {
        role_arn: role_arn.map(str::to_string),
        ..Profile::default()
      },
    )
  }

  #[test]
  fn accepts_well_formed_arns() {
    let role = ExecutionRole::new(ARN).unwrap();
    assert_eq!(role.name(), "penguins-execution");
    assert_eq!(role.account_id(), "123456789012");

    // Path-qualified role names keep only the final segment
    let role = ExecutionRole::new("arn:aws:iam::123456789012:role/service/penguins").unwrap();
    assert_eq!(role.name(), "penguins");
  }

  #[test]
  fn rejects_malformed_arns() {
    for bad in [
      "",
      "penguins-execution",
      "arn:aws:s3:::penguindatamlschool",
      "arn:aws:iam::12345:role/short-account",
      "arn:aws:iam::123456789012:user/not-a-role",
      "arn:aws:iam::123456789012:role/",
    ] {
      assert!(
        matches!(
          ExecutionRole::new(bad),
          Err(PlatformError::InvalidRoleArn { .. })
        ),
        "accepted {bad:?}"
      );
    }
  }

  #[test]
  #[serial]
  fn project_variable_precedes_standard_one() {
    with_vars(
      [
        (ENV_PENGUINS_ROLE_ARN, Some(ARN)),
        (
          ENV_ROLE_ARN,
          Some("arn:aws:iam::123456789012:role/other-role"),
        ),
      ],
      || {
        let role = ExecutionRole::discover(None, &profiles_with_role(None)).unwrap();
        assert_eq!(role.arn(), ARN);
      },
    );
  }

  #[test]
  #[serial]
  fn profile_is_last_resort() {
    with_vars(
      [
        (ENV_PENGUINS_ROLE_ARN, None::<&str>),
        (ENV_ROLE_ARN, None::<&str>),
      ],
      || {
        let role = ExecutionRole::discover(None, &profiles_with_role(Some(ARN))).unwrap();
        assert_eq!(role.arn(), ARN);

        let err = ExecutionRole::discover(None, &profiles_with_role(None)).unwrap_err();
        assert!(matches!(err, PlatformError::RoleNotFound { .. }));
      },
    );
  }

  #[test]
  #[serial]
  fn invalid_value_is_an_error_not_a_fallthrough() {
    with_vars(
      [
        (ENV_PENGUINS_ROLE_ARN, Some("not-an-arn")),
        (ENV_ROLE_ARN, Some(ARN)),
      ],
      || {
        let err = ExecutionRole::discover(None, &profiles_with_role(None)).unwrap_err();
        assert!(matches!(err, PlatformError::InvalidRoleArn { .. }));
      },
    );
  }
}
