//! Show the resolved pipeline configuration and ambient context.
//!
//! Discovery failures are reported per item; `info` itself only fails when
//! the configuration or the profile files are unusable.

use anyhow::Result;
use serde::Serialize;

use penguins_lib::settings::{Settings, SettingsOverrides};
use penguins_platform::{Credentials, ExecutionRole, Profiles, Region, Service};

use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct InfoReport {
  settings: Settings,
  platform: PlatformReport,
}

#[derive(Serialize)]
struct PlatformReport {
  profile: String,
  region: Option<Region>,
  access_key_id: Option<String>,
  role: Option<ExecutionRole>,
  sagemaker_endpoint: Option<String>,
  iam_endpoint: Option<String>,
}

pub fn cmd_info(profile: Option<&str>, format: OutputFormat) -> Result<()> {
  let settings = Settings::resolve(&SettingsOverrides::default())?;

  let profiles = match profile {
    Some(name) => Profiles::load_named(name)?,
    None => Profiles::load()?,
  };

  let region = Region::discover(None, &profiles).ok();
  let credentials = Credentials::discover(None, &profiles).ok();
  let role = ExecutionRole::discover(None, &profiles).ok();

  let report = InfoReport {
    settings,
    platform: PlatformReport {
      profile: profiles.name().to_string(),
      sagemaker_endpoint: region.as_ref().map(|r| Service::SageMaker.endpoint(r)),
      iam_endpoint: region.as_ref().map(|r| Service::Iam.endpoint(r)),
      region,
      access_key_id: credentials.map(|c| c.access_key_id().to_string()),
      role,
    },
  };

  if format.is_json() {
    return output::print_json(&report);
  }

  output::print_heading("Pipeline:");
  output::print_stat("bucket", report.settings.bucket.as_str());
  output::print_stat("s3 location", &report.settings.s3_location.uri());
  output::print_stat("ground truth", &report.settings.ground_truth_location.uri());
  output::print_stat("data file", &report.settings.data_filepath.display().to_string());
  output::print_stat("endpoint", &report.settings.endpoint);
  output::print_stat("model package group", &report.settings.model_package_group);

  println!();
  output::print_heading("Platform:");
  output::print_stat("profile", &report.platform.profile);
  output::print_stat(
    "region",
    report
      .platform
      .region
      .as_ref()
      .map_or("not configured", Region::as_str),
  );
  output::print_stat(
    "access key id",
    report.platform.access_key_id.as_deref().unwrap_or("not configured"),
  );
  output::print_stat(
    "execution role",
    report
      .platform
      .role
      .as_ref()
      .map_or("not configured", ExecutionRole::arn),
  );
  if let Some(endpoint) = &report.platform.sagemaker_endpoint {
    output::print_stat("sagemaker endpoint", endpoint);
  }
  if let Some(endpoint) = &report.platform.iam_endpoint {
    output::print_stat("iam endpoint", endpoint);
  }

  Ok(())
}
