//! Process-wide pipeline wiring
//!
//! An application entry point builds a [`PipelineContext`] once, then shares
//! it read-only with the pipeline-definition code. Nothing here runs at
//! module load; initialization order and failure are explicit and testable.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use penguins_platform::{
  Client, ExecutionRole, PlatformError, Region, Service, Session, SessionOverrides,
};

use crate::s3::BucketName;
use crate::settings::{Settings, SettingsError, SettingsOverrides};

/// Errors from context initialization.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Settings(#[from] SettingsError),

  #[error(transparent)]
  Platform(#[from] PlatformError),
}

/// Overrides for [`PipelineContext::initialize`].
#[derive(Debug, Default, Clone)]
pub struct ContextOverrides {
  pub settings: SettingsOverrides,
  pub session: SessionOverrides,
}

/// A [`Session`] specialized for pipeline-definition calls, carrying the
/// bucket pipeline steps stage their intermediate artifacts under.
#[derive(Debug, Clone)]
pub struct PipelineSession {
  session: Session,
  default_bucket: BucketName,
}

impl PipelineSession {
  pub fn new(session: Session, default_bucket: BucketName) -> Self {
    Self {
      session,
      default_bucket,
    }
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub fn default_bucket(&self) -> &BucketName {
    &self.default_bucket
  }

  pub fn region(&self) -> &Region {
    self.session.region()
  }
}

/// Everything the pipeline-definition code needs, built once at startup and
/// passed down by reference. Handles from one context agree on region and
/// target configuration.
#[derive(Debug, Clone)]
pub struct PipelineContext {
  settings: Settings,
  session: Session,
  pipeline_session: PipelineSession,
  sagemaker: Client,
  iam: Client,
  role: ExecutionRole,
}

impl PipelineContext {
  /// Resolve settings, discover the ambient session, and derive the handles
  /// the pipeline consumes. Fails with the first typed discovery error; an
  /// execution role is required here.
  pub fn initialize(overrides: &ContextOverrides) -> Result<Self, PipelineError> {
    let settings = Settings::resolve(&overrides.settings)?;
    let session = Session::discover(&overrides.session)?;
    let role = session.require_role()?.clone();

    let sagemaker = session.client(Service::SageMaker);
    let iam = session.client(Service::Iam);
    let pipeline_session = PipelineSession::new(session.clone(), settings.bucket.clone());

    info!(
      region = %session.region(),
      bucket = %settings.bucket,
      endpoint = %settings.endpoint,
      "pipeline context initialized"
    );

    Ok(Self {
      settings,
      session,
      pipeline_session,
      sagemaker,
      iam,
      role,
    })
  }

  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub fn pipeline_session(&self) -> &PipelineSession {
    &self.pipeline_session
  }

  /// Handle for SageMaker control-plane calls.
  pub fn sagemaker(&self) -> &Client {
    &self.sagemaker
  }

  /// Handle for IAM control-plane calls.
  pub fn iam(&self) -> &Client {
    &self.iam
  }

  pub fn role(&self) -> &ExecutionRole {
    &self.role
  }

  pub fn region(&self) -> &Region {
    self.session.region()
  }

  /// A serializable snapshot of the configured targets, for inspection
  /// output. Secret material never appears here.
  pub fn summary(&self) -> ContextSummary {
    ContextSummary {
      settings: self.settings.clone(),
      profile: self.session.profile().to_string(),
      region: self.session.region().clone(),
      role: self.role.clone(),
      sagemaker_endpoint: self.sagemaker.endpoint().to_string(),
      iam_endpoint: self.iam.endpoint().to_string(),
    }
  }
}

/// Inspection view of an initialized context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSummary {
  pub settings: Settings,
  pub profile: String,
  pub region: Region,
  pub role: ExecutionRole,
  pub sagemaker_endpoint: String,
  pub iam_endpoint: String,
}
