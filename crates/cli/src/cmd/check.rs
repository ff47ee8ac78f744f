//! Validate that the configuration and ambient context resolve.
//!
//! Each item prints a pass/fail line; the command exits non-zero if any
//! item fails.

use anyhow::Result;
use tracing::debug;

use penguins_lib::settings::{Settings, SettingsOverrides};
use penguins_platform::{Credentials, ExecutionRole, Profiles, Region};

use crate::output;

pub fn cmd_check(profile: Option<&str>, data: bool) -> Result<()> {
  let mut failures = 0usize;

  let settings = match Settings::resolve(&SettingsOverrides::default()) {
    Ok(settings) => {
      output::print_success(&format!("settings resolve ({})", settings.s3_location));
      Some(settings)
    }
    Err(e) => {
      output::print_error(&format!("settings: {e}"));
      failures += 1;
      None
    }
  };

  if let Some(settings) = &settings {
    if !settings.s3_location.contains(&settings.ground_truth_location) {
      output::print_warning(&format!(
        "ground truth location {} is outside the base location {}",
        settings.ground_truth_location, settings.s3_location
      ));
    }

    if data {
      if settings.data_filepath.is_file() {
        output::print_success(&format!("dataset present ({})", settings.data_filepath.display()));
      } else {
        output::print_error(&format!(
          "dataset missing: {}",
          settings.data_filepath.display()
        ));
        failures += 1;
      }
    }
  }

  let profiles = match profile {
    Some(name) => Profiles::load_named(name),
    None => Profiles::load(),
  };
  match profiles {
    Ok(profiles) => {
      output::print_success(&format!("profile files parse (profile `{}`)", profiles.name()));

      match Region::discover(None, &profiles) {
        Ok(region) => output::print_success(&format!("region resolves ({region})")),
        Err(e) => {
          output::print_error(&format!("region: {e}"));
          failures += 1;
        }
      }

      match Credentials::discover(None, &profiles) {
        Ok(credentials) => {
          output::print_success(&format!("credentials resolve ({})", credentials.access_key_id()));
        }
        Err(e) => {
          output::print_error(&format!("credentials: {e}"));
          failures += 1;
        }
      }

      match ExecutionRole::discover(None, &profiles) {
        Ok(role) => output::print_success(&format!("execution role resolves ({})", role.name())),
        Err(e) => {
          output::print_error(&format!("execution role: {e}"));
          failures += 1;
        }
      }
    }
    Err(e) => {
      output::print_error(&format!("profile files: {e}"));
      output::print_warning("skipping region, credential, and role checks");
      failures += 1;
    }
  }

  debug!(failures, "check complete");

  if failures > 0 {
    println!();
    output::print_error(&format!("{failures} check(s) failed"));
    std::process::exit(1);
  }

  println!();
  output::print_success("all checks passed");
  Ok(())
}
