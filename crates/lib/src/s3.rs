//! Typed S3 locations
//!
//! The pipeline addresses object storage through `s3://bucket/key` URIs.
//! [`BucketName`] enforces the bucket naming rules once at the boundary;
//! [`S3Location`] keeps bucket and key prefix separate so derived locations
//! are built by joining segments instead of concatenating strings.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const SCHEME: &str = "s3://";

/// Errors from bucket or location validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum S3LocationError {
  #[error("invalid bucket name {value:?}: {reason}")]
  InvalidBucket { value: String, reason: &'static str },

  #[error("expected an s3:// URI, got {value:?}")]
  NotS3 { value: String },
}

/// A validated object-storage bucket name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
  /// Validate and wrap a bucket name.
  ///
  /// Enforces the S3 rules this pipeline can run into: 3-63 characters,
  /// lowercase letters, digits, hyphens and dots, starting and ending
  /// alphanumeric, no empty dot-separated labels.
  pub fn new(value: impl Into<String>) -> Result<Self, S3LocationError> {
    let value = value.into();
    match validate_bucket_name(&value) {
      Ok(()) => Ok(Self(value)),
      Err(reason) => Err(S3LocationError::InvalidBucket { value, reason }),
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for BucketName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl Serialize for BucketName {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for BucketName {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = String::deserialize(deserializer)?;
    Self::new(value).map_err(D::Error::custom)
  }
}

fn validate_bucket_name(value: &str) -> Result<(), &'static str> {
  if value.len() < 3 || value.len() > 63 {
    return Err("must be 3-63 characters");
  }
  if !value
    .chars()
    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
  {
    return Err("only lowercase letters, digits, hyphens, and dots");
  }
  let first = value.chars().next().unwrap_or_default();
  let last = value.chars().last().unwrap_or_default();
  if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
    return Err("must start and end with a letter or digit");
  }
  if value.split('.').any(str::is_empty) {
    return Err("dot-separated labels must be non-empty");
  }
  Ok(())
}

/// A location in object storage: a bucket plus an optional key prefix,
/// rendered as `s3://bucket[/prefix]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct S3Location {
  bucket: BucketName,
  key: String,
}

impl S3Location {
  /// Build a location under `bucket`. The key is normalized: redundant
  /// slashes collapse and leading/trailing slashes are dropped.
  pub fn new(bucket: BucketName, key: impl AsRef<str>) -> Self {
    Self {
      bucket,
      key: normalize_key(key.as_ref()),
    }
  }

  /// Parse an `s3://bucket[/key]` URI.
  pub fn parse(value: &str) -> Result<Self, S3LocationError> {
    let rest = value.strip_prefix(SCHEME).ok_or_else(|| S3LocationError::NotS3 {
      value: value.to_string(),
    })?;
    let (bucket, key) = match rest.split_once('/') {
      Some((bucket, key)) => (bucket, key),
      None => (rest, ""),
    };
    if bucket.is_empty() {
      return Err(S3LocationError::NotS3 {
        value: value.to_string(),
      });
    }
    Ok(Self::new(BucketName::new(bucket)?, key))
  }

  pub fn bucket(&self) -> &BucketName {
    &self.bucket
  }

  /// The key prefix, without leading or trailing slash. Empty for a
  /// bucket-root location.
  pub fn key(&self) -> &str {
    &self.key
  }

  /// Append a key segment, normalizing slashes on both sides.
  pub fn join(&self, segment: &str) -> Self {
    let segment = normalize_key(segment);
    let key = if self.key.is_empty() {
      segment
    } else if segment.is_empty() {
      self.key.clone()
    } else {
      format!("{}/{}", self.key, segment)
    };
    Self {
      bucket: self.bucket.clone(),
      key,
    }
  }

  /// The full `s3://` URI.
  pub fn uri(&self) -> String {
    self.to_string()
  }

  /// Whether `other` is this location or nested beneath it.
  pub fn contains(&self, other: &S3Location) -> bool {
    self.bucket == other.bucket
      && (self.key.is_empty()
        || other.key == self.key
        || other
          .key
          .strip_prefix(&self.key)
          .is_some_and(|rest| rest.starts_with('/')))
  }
}

impl fmt::Display for S3Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.key.is_empty() {
      write!(f, "{SCHEME}{}", self.bucket)
    } else {
      write!(f, "{SCHEME}{}/{}", self.bucket, self.key)
    }
  }
}

impl Serialize for S3Location {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for S3Location {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = String::deserialize(deserializer)?;
    Self::parse(&value).map_err(D::Error::custom)
  }
}

fn normalize_key(key: &str) -> String {
  key
    .split('/')
    .filter(|segment| !segment.is_empty())
    .collect::<Vec<_>>()
    .join("/")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn bucket(name: &str) -> BucketName {
    BucketName::new(name).unwrap()
  }

  #[test]
  fn bucket_name_rules() {
    assert!(BucketName::new("penguindatamlschool").is_ok());
    assert!(BucketName::new("my-bucket.backup-2").is_ok());

    assert!(BucketName::new("ab").is_err());
    assert!(BucketName::new("UpperCase").is_err());
    assert!(BucketName::new("-leading-hyphen").is_err());
    assert!(BucketName::new("trailing-dot.").is_err());
    assert!(BucketName::new("double..dot").is_err());
    assert!(BucketName::new("under_score").is_err());
  }

  #[test]
  fn display_round_trips_through_parse() {
    let location = S3Location::new(bucket("penguindatamlschool"), "penguins");
    assert_eq!(location.to_string(), "s3://penguindatamlschool/penguins");
    assert_eq!(S3Location::parse(&location.to_string()).unwrap(), location);

    let root = S3Location::new(bucket("penguindatamlschool"), "");
    assert_eq!(root.to_string(), "s3://penguindatamlschool");
    assert_eq!(S3Location::parse("s3://penguindatamlschool/").unwrap(), root);
  }

  #[test]
  fn parse_rejects_other_schemes_and_empty_buckets() {
    assert_eq!(
      S3Location::parse("gs://bucket/key"),
      Err(S3LocationError::NotS3 {
        value: "gs://bucket/key".to_string()
      })
    );
    assert!(S3Location::parse("s3:///key").is_err());
    assert!(S3Location::parse("penguindatamlschool/penguins").is_err());
  }

  #[test]
  fn join_never_doubles_slashes() {
    let base = S3Location::parse("s3://penguindatamlschool/penguins").unwrap();

    let joined = base.join("monitoring/groundtruth");
    assert_eq!(joined.uri(), "s3://penguindatamlschool/penguins/monitoring/groundtruth");

    assert_eq!(base.join("/monitoring/groundtruth/"), joined);
    assert_eq!(base.join("monitoring//groundtruth"), joined);
    assert_eq!(base.join(""), base);

    let root = S3Location::new(bucket("penguindatamlschool"), "");
    assert_eq!(root.join("data").uri(), "s3://penguindatamlschool/data");
  }

  #[test]
  fn containment_respects_segment_boundaries() {
    let base = S3Location::parse("s3://penguindatamlschool/penguins").unwrap();
    assert!(base.contains(&base));
    assert!(base.contains(&base.join("monitoring/groundtruth")));
    assert!(!base.contains(&S3Location::parse("s3://penguindatamlschool/penguins-other").unwrap()));
    assert!(!base.contains(&S3Location::parse("s3://other-bucket/penguins/data").unwrap()));
  }

  #[test]
  fn serde_uses_the_uri_form() {
    let location = S3Location::parse("s3://penguindatamlschool/penguins").unwrap();
    let json = serde_json::to_string(&location).unwrap();
    assert_eq!(json, "\"s3://penguindatamlschool/penguins\"");
    let back: S3Location = serde_json::from_str(&json).unwrap();
    assert_eq!(back, location);

    assert!(serde_json::from_str::<S3Location>("\"https://example.com\"").is_err());
  }
}
