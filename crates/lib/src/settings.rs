//! Layered resolution of the pipeline configuration
//!
//! Every field resolves through the same chain: explicit override →
//! `PENGUINS_*` environment variable → built-in default. The derived S3
//! locations are recomputed from the resolved bucket unless independently
//! overridden, so pointing the pipeline at another bucket moves everything
//! under it in one step.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::consts;
use crate::s3::{BucketName, S3Location, S3LocationError};

/// Errors from settings resolution.
#[derive(Debug, Error)]
pub enum SettingsError {
  #[error(transparent)]
  Location(#[from] S3LocationError),

  #[error("failed to resolve working directory: {0}")]
  WorkingDir(#[source] std::io::Error),
}

/// Explicit overrides for [`Settings::resolve`]. Any field left `None`
/// falls back to the environment, then the built-in default.
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
  pub bucket: Option<String>,
  pub s3_location: Option<String>,
  pub data_filepath: Option<PathBuf>,
  pub endpoint: Option<String>,
  pub ground_truth_location: Option<String>,
  pub model_package_group: Option<String>,
}

/// The pipeline's configuration values, immutable once resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
  /// Bucket the pipeline stages data and artifacts under.
  pub bucket: BucketName,
  /// Base location every pipeline step writes beneath.
  pub s3_location: S3Location,
  /// Local dataset file the pipeline uploads from.
  pub data_filepath: PathBuf,
  /// Logical name of the deployed inference endpoint.
  pub endpoint: String,
  /// Location monitoring jobs read captured ground-truth labels from.
  pub ground_truth_location: S3Location,
  /// Model registry group versioned models are filed under.
  pub model_package_group: String,
}

impl Settings {
  /// Resolve the full configuration. Derived locations are computed from
  /// the resolved bucket unless independently overridden.
  pub fn resolve(overrides: &SettingsOverrides) -> Result<Self, SettingsError> {
    let bucket = BucketName::new(resolve_value(
      overrides.bucket.as_deref(),
      consts::env::BUCKET,
      consts::DEFAULT_BUCKET,
    ))?;

    let s3_location = match layered(overrides.s3_location.as_deref(), consts::env::S3_LOCATION) {
      Some(value) => S3Location::parse(&value)?,
      None => S3Location::new(bucket.clone(), consts::S3_KEY_PREFIX),
    };

    let ground_truth_location = match layered(
      overrides.ground_truth_location.as_deref(),
      consts::env::GROUND_TRUTH_LOCATION,
    ) {
      Some(value) => S3Location::parse(&value)?,
      None => s3_location.join(consts::GROUND_TRUTH_SUFFIX),
    };

    let data_filepath = resolve_data_filepath(overrides.data_filepath.as_deref())?;

    let endpoint = resolve_value(
      overrides.endpoint.as_deref(),
      consts::env::ENDPOINT,
      consts::DEFAULT_ENDPOINT,
    );
    let model_package_group = resolve_value(
      overrides.model_package_group.as_deref(),
      consts::env::MODEL_PACKAGE_GROUP,
      consts::DEFAULT_MODEL_PACKAGE_GROUP,
    );

    debug!(
      bucket = %bucket,
      s3_location = %s3_location,
      endpoint = %endpoint,
      "settings resolved"
    );

    Ok(Self {
      bucket,
      s3_location,
      data_filepath,
      endpoint,
      ground_truth_location,
      model_package_group,
    })
  }
}

/// Explicit value, else a non-empty environment variable.
fn layered(explicit: Option<&str>, var: &str) -> Option<String> {
  if let Some(value) = explicit {
    return Some(value.to_string());
  }
  match std::env::var(var) {
    Ok(value) if !value.is_empty() => Some(value),
    _ => None,
  }
}

fn resolve_value(explicit: Option<&str>, var: &str, default: &str) -> String {
  layered(explicit, var).unwrap_or_else(|| default.to_string())
}

/// The dataset path: override (explicit or `PENGUINS_DATA_FILEPATH`),
/// resolved against the working directory when relative; defaults to
/// `<cwd>/data.csv`.
fn resolve_data_filepath(explicit: Option<&Path>) -> Result<PathBuf, SettingsError> {
  let cwd = std::env::current_dir().map_err(SettingsError::WorkingDir)?;
  let candidate = match explicit {
    Some(path) => Some(path.to_path_buf()),
    None => layered(None, consts::env::DATA_FILEPATH).map(PathBuf::from),
  };
  Ok(match candidate {
    Some(path) if path.is_absolute() => path,
    Some(path) => cwd.join(path),
    None => cwd.join(consts::DATA_FILENAME),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use temp_env::with_vars;

  /// Clear every settings variable, then apply `set` on top.
  fn with_settings_env<F: FnOnce()>(set: &[(&str, &str)], f: F) {
    let mut vars: Vec<(&str, Option<&str>)> = vec![
      (consts::env::BUCKET, None),
      (consts::env::S3_LOCATION, None),
      (consts::env::DATA_FILEPATH, None),
      (consts::env::ENDPOINT, None),
      (consts::env::GROUND_TRUTH_LOCATION, None),
      (consts::env::MODEL_PACKAGE_GROUP, None),
    ];
    for &(var, value) in set {
      vars.retain(|&(name, _)| name != var);
      vars.push((var, Some(value)));
    }
    with_vars(vars, f);
  }

  #[test]
  #[serial]
  fn defaults_match_the_fixed_wiring() {
    with_settings_env(&[], || {
      let settings = Settings::resolve(&SettingsOverrides::default()).unwrap();

      assert_eq!(settings.bucket.as_str(), "penguindatamlschool");
      assert_eq!(settings.s3_location.uri(), "s3://penguindatamlschool/penguins");
      assert_eq!(
        settings.ground_truth_location.uri(),
        "s3://penguindatamlschool/penguins/monitoring/groundtruth"
      );
      assert_eq!(settings.endpoint, "penguins-endpoint");
      assert_eq!(settings.model_package_group, "penguins");
      assert_eq!(
        settings.data_filepath,
        std::env::current_dir().unwrap().join("data.csv")
      );
    });
  }

  #[test]
  #[serial]
  fn resolving_twice_yields_identical_values() {
    with_settings_env(&[], || {
      let first = Settings::resolve(&SettingsOverrides::default()).unwrap();
      let second = Settings::resolve(&SettingsOverrides::default()).unwrap();
      assert_eq!(first, second);
    });
  }

  #[test]
  #[serial]
  fn bucket_override_flows_into_derived_locations() {
    with_settings_env(&[(consts::env::BUCKET, "penguins-staging")], || {
      let settings = Settings::resolve(&SettingsOverrides::default()).unwrap();
      assert_eq!(settings.s3_location.uri(), "s3://penguins-staging/penguins");
      assert_eq!(
        settings.ground_truth_location.uri(),
        "s3://penguins-staging/penguins/monitoring/groundtruth"
      );
    });
  }

  #[test]
  #[serial]
  fn explicit_location_override_beats_derivation() {
    with_settings_env(&[(consts::env::BUCKET, "penguins-staging")], || {
      let overrides = SettingsOverrides {
        s3_location: Some("s3://elsewhere/archive".to_string()),
        ..SettingsOverrides::default()
      };
      let settings = Settings::resolve(&overrides).unwrap();
      assert_eq!(settings.s3_location.uri(), "s3://elsewhere/archive");
      // Ground truth still derives from the effective base location
      assert_eq!(
        settings.ground_truth_location.uri(),
        "s3://elsewhere/archive/monitoring/groundtruth"
      );
    });
  }

  #[test]
  #[serial]
  fn explicit_override_beats_environment() {
    with_settings_env(&[(consts::env::ENDPOINT, "penguins-endpoint-env")], || {
      let overrides = SettingsOverrides {
        endpoint: Some("penguins-endpoint-explicit".to_string()),
        ..SettingsOverrides::default()
      };
      let settings = Settings::resolve(&overrides).unwrap();
      assert_eq!(settings.endpoint, "penguins-endpoint-explicit");
    });
  }

  #[test]
  #[serial]
  fn relative_data_path_resolves_against_cwd() {
    with_settings_env(&[(consts::env::DATA_FILEPATH, "datasets/penguins.csv")], || {
      let settings = Settings::resolve(&SettingsOverrides::default()).unwrap();
      assert_eq!(
        settings.data_filepath,
        std::env::current_dir().unwrap().join("datasets/penguins.csv")
      );
    });
  }

  #[test]
  #[serial]
  fn invalid_env_bucket_is_a_typed_error() {
    with_settings_env(&[(consts::env::BUCKET, "Bad_Bucket")], || {
      let err = Settings::resolve(&SettingsOverrides::default()).unwrap_err();
      assert!(matches!(
        err,
        SettingsError::Location(S3LocationError::InvalidBucket { .. })
      ));
    });
  }
}
