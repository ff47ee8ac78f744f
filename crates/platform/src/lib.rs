//! Ambient AWS context for the penguins pipeline
//!
//! This crate provides typed discovery of the cloud execution context:
//! - Region, credential, and execution-role resolution
//! - Shared config/credentials profile files
//! - Session construction and control-plane client handles

mod credentials;
mod error;
mod profile;
mod region;
mod role;
mod session;

pub use credentials::Credentials;
pub use error::PlatformError;
pub use profile::{Profile, Profiles};
pub use region::Region;
pub use role::ExecutionRole;
pub use session::{Client, Service, Session, SessionOverrides};
