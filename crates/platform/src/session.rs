//! Sessions and control-plane client handles
//!
//! A [`Session`] is built once at process start and shared read-only for the
//! life of the process. It bundles the discovered region, credentials, and
//! execution role with one HTTP handle that every derived [`Client`] shares.
//!
//! Clients are opaque, scoped handles: they know which service they target
//! and the endpoint calls would go to. Issuing signed requests through them
//! belongs to the pipeline-definition code, not to this crate.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::credentials::Credentials;
use crate::error::PlatformError;
use crate::profile::Profiles;
use crate::region::Region;
use crate::role::ExecutionRole;

const SERVICE_DOMAIN: &str = "amazonaws.com";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Control-plane services the pipeline talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
  SageMaker,
  Iam,
  S3,
  Sts,
}

impl Service {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Service::SageMaker => "sagemaker",
      Service::Iam => "iam",
      Service::S3 => "s3",
      Service::Sts => "sts",
    }
  }

  /// The HTTPS endpoint for this service in `region`.
  ///
  /// IAM is a global service with a single endpoint; everything else is
  /// regional (`https://<service>.<region>.amazonaws.com`).
  pub fn endpoint(&self, region: &Region) -> String {
    match self {
      Service::Iam => format!("https://iam.{SERVICE_DOMAIN}"),
      _ => format!("https://{}.{}.{SERVICE_DOMAIN}", self.as_str(), region.as_str()),
    }
  }
}

impl fmt::Display for Service {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Explicit overrides for [`Session::discover`]. Any field left `None`
/// falls back to the environment and the shared profile files.
#[derive(Debug, Default, Clone)]
pub struct SessionOverrides {
  pub profile: Option<String>,
  pub region: Option<String>,
  pub credentials: Option<Credentials>,
  pub role: Option<String>,
}

/// Authenticated scope for control-plane calls.
///
/// Owned by the process for its entire lifetime; there is no teardown.
#[derive(Debug, Clone)]
pub struct Session {
  profile: String,
  region: Region,
  credentials: Credentials,
  role: Option<ExecutionRole>,
  http: reqwest::Client,
}

impl Session {
  /// Discover a session from overrides, the environment, and the shared
  /// profile files.
  ///
  /// Fails fast with the first discovery error. A missing execution role is
  /// not an error here; callers that need one use [`Session::require_role`].
  pub fn discover(overrides: &SessionOverrides) -> Result<Self, PlatformError> {
    let profiles = match overrides.profile.as_deref() {
      Some(name) => Profiles::load_named(name)?,
      None => Profiles::load()?,
    };

    let region = Region::discover(overrides.region.as_deref(), &profiles)?;
    let credentials = Credentials::discover(overrides.credentials.clone(), &profiles)?;
    let role = match ExecutionRole::discover(overrides.role.as_deref(), &profiles) {
      Ok(role) => Some(role),
      Err(PlatformError::RoleNotFound { .. }) => None,
      Err(e) => return Err(e),
    };

    let http = reqwest::Client::builder()
      .connect_timeout(CONNECT_TIMEOUT)
      .timeout(REQUEST_TIMEOUT)
      .build()?;

    info!(
      profile = %profiles.name(),
      region = %region,
      role = role.as_ref().map(ExecutionRole::arn).unwrap_or("<none>"),
      "session ready"
    );

    Ok(Self {
      profile: profiles.name().to_string(),
      region,
      credentials,
      role,
      http,
    })
  }

  /// The profile name the session was resolved from.
  pub fn profile(&self) -> &str {
    &self.profile
  }

  pub fn region(&self) -> &Region {
    &self.region
  }

  pub fn credentials(&self) -> &Credentials {
    &self.credentials
  }

  pub fn role(&self) -> Option<&ExecutionRole> {
    self.role.as_ref()
  }

  /// The execution role, or the discovery error a role-requiring caller
  /// would have hit.
  pub fn require_role(&self) -> Result<&ExecutionRole, PlatformError> {
    self.role.as_ref().ok_or(PlatformError::RoleNotFound {
      profile: self.profile.clone(),
    })
  }

  /// The session's shared HTTP handle.
  pub fn http(&self) -> &reqwest::Client {
    &self.http
  }

  /// Derive a client handle for one service. Clients share the session's
  /// HTTP handle and region.
  pub fn client(&self, service: Service) -> Client {
    Client {
      service,
      endpoint: service.endpoint(&self.region),
      region: self.region.clone(),
      http: self.http.clone(),
    }
  }
}

/// Opaque handle to one control-plane service, scoped by the session that
/// created it.
#[derive(Debug, Clone)]
pub struct Client {
  service: Service,
  endpoint: String,
  region: Region,
  http: reqwest::Client,
}

impl Client {
  pub fn service(&self) -> Service {
    self.service
  }

  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }

  pub fn region(&self) -> &Region {
    &self.region
  }

  /// The HTTP handle shared with the owning session.
  pub fn http(&self) -> &reqwest::Client {
    &self.http
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::credentials::{ENV_ACCESS_KEY_ID, ENV_SECRET_ACCESS_KEY, ENV_SESSION_TOKEN};
  use crate::profile::{ENV_CONFIG_FILE, ENV_PROFILE, ENV_SHARED_CREDENTIALS_FILE};
  use crate::region::{ENV_DEFAULT_REGION, ENV_REGION};
  use crate::role::{ENV_PENGUINS_ROLE_ARN, ENV_ROLE_ARN};
  use serial_test::serial;
  use temp_env::with_vars;

  const ARN: &str = "arn:aws:iam::123456789012:role/penguins-execution";

  /// Run `f` with a fully controlled ambient environment: no shared files,
  /// region/credentials/role purely from the given variables.
  fn with_ambient_env<F: FnOnce()>(role: Option<&str>, f: F) {
    let temp = tempfile::TempDir::new().unwrap();
    let config = temp.path().join("config");
    let credentials = temp.path().join("credentials");
    with_vars(
      [
        (ENV_CONFIG_FILE, config.to_str()),
        (ENV_SHARED_CREDENTIALS_FILE, credentials.to_str()),
        (ENV_PROFILE, None),
        (ENV_REGION, Some("eu-west-1")),
        (ENV_DEFAULT_REGION, None),
        (ENV_ACCESS_KEY_ID, Some("AKIATEST")),
        (ENV_SECRET_ACCESS_KEY, Some("testsecret")),
        (ENV_SESSION_TOKEN, None),
        (ENV_PENGUINS_ROLE_ARN, role),
        (ENV_ROLE_ARN, None),
      ],
      f,
    );
  }

  #[test]
  fn endpoints_follow_the_regional_rule() {
    let region = Region::new("eu-west-1").unwrap();
    assert_eq!(
      Service::SageMaker.endpoint(&region),
      "https://sagemaker.eu-west-1.amazonaws.com"
    );
    assert_eq!(Service::S3.endpoint(&region), "https://s3.eu-west-1.amazonaws.com");
    assert_eq!(Service::Sts.endpoint(&region), "https://sts.eu-west-1.amazonaws.com");
    // IAM has no regional endpoints
    assert_eq!(Service::Iam.endpoint(&region), "https://iam.amazonaws.com");
  }

  #[test]
  #[serial]
  fn discovers_a_full_session_from_the_environment() {
    with_ambient_env(Some(ARN), || {
      let session = Session::discover(&SessionOverrides::default()).unwrap();
      assert_eq!(session.profile(), "default");
      assert_eq!(session.region().as_str(), "eu-west-1");
      assert_eq!(session.credentials().access_key_id(), "AKIATEST");
      assert_eq!(session.require_role().unwrap().arn(), ARN);
    });
  }

  #[test]
  #[serial]
  fn missing_role_is_deferred_until_required() {
    with_ambient_env(None, || {
      let session = Session::discover(&SessionOverrides::default()).unwrap();
      assert!(session.role().is_none());
      assert!(matches!(
        session.require_role(),
        Err(PlatformError::RoleNotFound { .. })
      ));
    });
  }

  #[test]
  #[serial]
  fn clients_agree_with_their_session() {
    with_ambient_env(Some(ARN), || {
      let session = Session::discover(&SessionOverrides::default()).unwrap();
      let sagemaker = session.client(Service::SageMaker);
      let iam = session.client(Service::Iam);

      assert_eq!(sagemaker.region(), session.region());
      assert_eq!(iam.region(), session.region());
      assert_eq!(sagemaker.endpoint(), "https://sagemaker.eu-west-1.amazonaws.com");
      assert_eq!(iam.endpoint(), "https://iam.amazonaws.com");
      assert_eq!(sagemaker.service().as_str(), "sagemaker");
    });
  }

  #[test]
  #[serial]
  fn explicit_overrides_beat_the_environment() {
    with_ambient_env(Some(ARN), || {
      let overrides = SessionOverrides {
        region: Some("ap-southeast-2".to_string()),
        ..SessionOverrides::default()
      };
      let session = Session::discover(&overrides).unwrap();
      assert_eq!(session.region().as_str(), "ap-southeast-2");
    });
  }
}
