#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod rewrite;
pub mod scan;
pub mod timestamps;

pub use builder::{BundleBuilder, StagingArea, resolve_bundle_path};
pub use config::BundleConfig;
pub use error::{BundleError, ErrorKind, Result};
pub use models::{AttachmentAnnotation, BundleRequest, PathMapping, Reference};
