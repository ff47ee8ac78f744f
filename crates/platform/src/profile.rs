//! Shared AWS profile files
//!
//! Locates, selects, and parses the shared config and credentials files
//! (`~/.aws/config` and `~/.aws/credentials`). The two files use slightly
//! different section headings: the config file prefixes named profiles with
//! `profile ` (e.g. `[profile staging]`) while the credentials file does not
//! (`[staging]`). Both spell the default profile `[default]`.
//!
//! A missing file is not an error and yields an empty view; an unreadable or
//! malformed file is.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::PlatformError;

/// Selects the profile when no explicit name is given.
pub const ENV_PROFILE: &str = "AWS_PROFILE";
/// Overrides the location of the shared config file.
pub const ENV_CONFIG_FILE: &str = "AWS_CONFIG_FILE";
/// Overrides the location of the shared credentials file.
pub const ENV_SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";

const DEFAULT_PROFILE: &str = "default";

/// Properties of a single named profile, merged across both files.
///
/// Only the keys this workspace consumes are retained; everything else in
/// the files is ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Profile {
  pub region: Option<String>,
  pub role_arn: Option<String>,
  pub aws_access_key_id: Option<String>,
  pub aws_secret_access_key: Option<String>,
  pub aws_session_token: Option<String>,
}

impl Profile {
  /// Overlay `other` on top of `self`, keeping `self`'s value where `other`
  /// has none. Used to let the credentials file win over the config file.
  fn overlaid_with(mut self, other: Profile) -> Profile {
    self.region = other.region.or(self.region);
    self.role_arn = other.role_arn.or(self.role_arn);
    self.aws_access_key_id = other.aws_access_key_id.or(self.aws_access_key_id);
    self.aws_secret_access_key = other.aws_secret_access_key.or(self.aws_secret_access_key);
    self.aws_session_token = other.aws_session_token.or(self.aws_session_token);
    self
  }

  fn set(&mut self, key: &str, value: String) {
    match key {
      "region" => self.region = Some(value),
      "role_arn" => self.role_arn = Some(value),
      "aws_access_key_id" => self.aws_access_key_id = Some(value),
      "aws_secret_access_key" => self.aws_secret_access_key = Some(value),
      "aws_session_token" => self.aws_session_token = Some(value),
      _ => {}
    }
  }
}

/// The selected profile's merged view of both shared files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profiles {
  name: String,
  profile: Profile,
}

impl Profiles {
  /// Build a view directly from parts. Callers normally use [`Profiles::load`].
  pub fn new(name: impl Into<String>, profile: Profile) -> Self {
    Self {
      name: name.into(),
      profile,
    }
  }

  /// Load the profile selected by `AWS_PROFILE` (default `default`).
  pub fn load() -> Result<Self, PlatformError> {
    match std::env::var(ENV_PROFILE) {
      Ok(name) if !name.is_empty() => Self::load_named(&name),
      _ => Self::load_named(DEFAULT_PROFILE),
    }
  }

  /// Load a specific named profile from the shared files.
  pub fn load_named(name: &str) -> Result<Self, PlatformError> {
    let config = load_document(&config_file_path()?, Flavor::Config)?;
    let credentials = load_document(&credentials_file_path()?, Flavor::Credentials)?;

    let base = config.get(name).cloned().unwrap_or_default();
    let overlay = credentials.get(name).cloned().unwrap_or_default();
    let profile = base.overlaid_with(overlay);

    debug!(profile = %name, "loaded shared profile files");
    Ok(Self::new(name, profile))
  }

  /// The selected profile name.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn region(&self) -> Option<&str> {
    self.profile.region.as_deref()
  }

  pub fn role_arn(&self) -> Option<&str> {
    self.profile.role_arn.as_deref()
  }

  pub fn access_key_id(&self) -> Option<&str> {
    self.profile.aws_access_key_id.as_deref()
  }

  pub fn secret_access_key(&self) -> Option<&str> {
    self.profile.aws_secret_access_key.as_deref()
  }

  pub fn session_token(&self) -> Option<&str> {
    self.profile.aws_session_token.as_deref()
  }
}

/// Location of the shared config file (`AWS_CONFIG_FILE` override, else
/// `~/.aws/config`).
pub fn config_file_path() -> Result<PathBuf, PlatformError> {
  match std::env::var(ENV_CONFIG_FILE) {
    Ok(path) if !path.is_empty() => Ok(PathBuf::from(path)),
    _ => Ok(aws_dir()?.join("config")),
  }
}

/// Location of the shared credentials file (`AWS_SHARED_CREDENTIALS_FILE`
/// override, else `~/.aws/credentials`).
pub fn credentials_file_path() -> Result<PathBuf, PlatformError> {
  match std::env::var(ENV_SHARED_CREDENTIALS_FILE) {
    Ok(path) if !path.is_empty() => Ok(PathBuf::from(path)),
    _ => Ok(aws_dir()?.join("credentials")),
  }
}

fn aws_dir() -> Result<PathBuf, PlatformError> {
  let home = dirs::home_dir().ok_or(PlatformError::NoHomeDirectory)?;
  Ok(home.join(".aws"))
}

/// Which of the two shared files is being parsed. Affects how section
/// headings map to profile names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
  Config,
  Credentials,
}

fn load_document(path: &Path, flavor: Flavor) -> Result<BTreeMap<String, Profile>, PlatformError> {
  let text = match std::fs::read_to_string(path) {
    Ok(text) => text,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      debug!(path = ?path, "profile file not present");
      return Ok(BTreeMap::new());
    }
    Err(source) => {
      return Err(PlatformError::ReadProfileFile {
        path: path.to_path_buf(),
        source,
      });
    }
  };
  parse_document(path, &text, flavor)
}

fn parse_document(
  path: &Path,
  text: &str,
  flavor: Flavor,
) -> Result<BTreeMap<String, Profile>, PlatformError> {
  let mut sections: BTreeMap<String, Profile> = BTreeMap::new();
  let mut current: Option<String> = None;

  for (idx, raw) in text.lines().enumerate() {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
      continue;
    }

    if line.starts_with('[') {
      let heading = line
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(PlatformError::MalformedProfileFile {
          path: path.to_path_buf(),
          line: idx + 1,
          reason: "unterminated section heading",
        })?;
      let name = section_profile_name(heading.trim(), flavor);
      sections.entry(name.clone()).or_default();
      current = Some(name);
      continue;
    }

    let (key, value) = line
      .split_once('=')
      .ok_or(PlatformError::MalformedProfileFile {
        path: path.to_path_buf(),
        line: idx + 1,
        reason: "expected `key = value`",
      })?;
    let name = current.as_ref().ok_or(PlatformError::MalformedProfileFile {
      path: path.to_path_buf(),
      line: idx + 1,
      reason: "property outside of a section",
    })?;
    let profile = sections.entry(name.clone()).or_default();
    profile.set(&key.trim().to_ascii_lowercase(), value.trim().to_string());
  }

  Ok(sections)
}

fn section_profile_name(heading: &str, flavor: Flavor) -> String {
  match flavor {
    // Config file: `[default]` or `[profile name]`
    Flavor::Config => heading
      .strip_prefix("profile ")
      .map_or_else(|| heading.to_string(), |name| name.trim().to_string()),
    // Credentials file: always the bare name
    Flavor::Credentials => heading.to_string(),
  }
}
