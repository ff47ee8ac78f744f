//! penguins-lib: configuration and wiring for the penguins ML pipeline
//!
//! This crate provides the values and handles the pipeline-definition code
//! consumes:
//! - `Settings`: the pipeline's resolved configuration (bucket, locations,
//!   endpoint and registry names, local dataset path)
//! - `S3Location`: typed `s3://` locations derived from the bucket
//! - `PipelineContext`: sessions and client handles, built once at the
//!   application entry point and shared read-only

pub mod consts;
pub mod pipeline;
pub mod s3;
pub mod settings;
