//! Built-in defaults for the penguins pipeline.
//!
//! Every value here is a last-resort default; see [`crate::settings`] for
//! the override chain.

/// Object-storage bucket the pipeline stages data and artifacts under.
pub const DEFAULT_BUCKET: &str = "penguindatamlschool";

/// Key prefix under the bucket for everything the pipeline writes.
pub const S3_KEY_PREFIX: &str = "penguins";

/// Logical name of the deployed inference endpoint.
pub const DEFAULT_ENDPOINT: &str = "penguins-endpoint";

/// Key suffix, relative to the base location, where captured ground-truth
/// labels land for monitoring.
pub const GROUND_TRUTH_SUFFIX: &str = "monitoring/groundtruth";

/// Model registry group versioned penguins models are filed under.
pub const DEFAULT_MODEL_PACKAGE_GROUP: &str = "penguins";

/// Local dataset file name, resolved against the working directory.
pub const DATA_FILENAME: &str = "data.csv";

pub mod env {
  //! Environment variables honored by
  //! [`Settings::resolve`](crate::settings::Settings::resolve).

  pub const BUCKET: &str = "PENGUINS_BUCKET";
  pub const S3_LOCATION: &str = "PENGUINS_S3_LOCATION";
  pub const DATA_FILEPATH: &str = "PENGUINS_DATA_FILEPATH";
  pub const ENDPOINT: &str = "PENGUINS_ENDPOINT";
  pub const GROUND_TRUTH_LOCATION: &str = "PENGUINS_GROUND_TRUTH_LOCATION";
  pub const MODEL_PACKAGE_GROUP: &str = "PENGUINS_MODEL_PACKAGE_GROUP";
}
