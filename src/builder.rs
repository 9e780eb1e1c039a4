//! Bundle assembly: staging, asset collection, rewriting, stamping and publication.

use std::fs;
use std::path::{Path, PathBuf, is_separator};

use crate::config::BundleConfig;
use crate::error::{BundleError, Result};
use crate::fetch::{HttpFetcher, RemoteFetcher, fetch_resource, install_asset};
use crate::models::{AttachmentAnnotation, BundleManifest, BundleRequest, PathMapping, ReferenceKind};
use crate::rewrite::rewrite_text;
use crate::scan::ReferenceScanner;
use crate::timestamps::{FilesystemTimestamps, TimestampSink};

/// Temporary directory a bundle is assembled in before being renamed into place.
#[derive(Debug, Clone)]
pub struct StagingArea {
  /// Root of the staging directory.
  pub root: PathBuf,
  /// Assets directory inside the root.
  pub assets: PathBuf,
}

/// Converts Markdown documents into bundles.
pub struct BundleBuilder<'a, R, T> {
  config: &'a BundleConfig,
  remote: R,
  stamper: T,
}

impl<'a> BundleBuilder<'a, HttpFetcher, FilesystemTimestamps> {
  /// Builder fetching over HTTP and stamping through filesystem metadata.
  pub fn with_defaults(config: &'a BundleConfig) -> Result<Self> {
    let remote = HttpFetcher::new(config.fetch_timeout()).map_err(BundleError::HttpClient)?;
    Ok(Self::new(config, remote, FilesystemTimestamps))
  }
}

impl<'a, R, T> BundleBuilder<'a, R, T>
where
  R: RemoteFetcher,
  T: TimestampSink,
{
  /// Create a builder with explicit fetch and stamping collaborators.
  pub fn new(config: &'a BundleConfig, remote: R, stamper: T) -> Self {
    Self {
      config,
      remote,
      stamper,
    }
  }

  /// Convert one document and return the path of the published bundle.
  ///
  /// On failure after staging the staging directory is left on disk and nothing is published.
  pub fn build(&self, request: &BundleRequest<'_>) -> Result<PathBuf> {
    let text =
      std::str::from_utf8(request.contents).map_err(|source| BundleError::NonUtf8Source {
        path: request.source_path.to_path_buf(),
        source,
      })?;

    let staging = self.stage()?;
    log::debug!("staging {} in {}", request.source_path.display(), staging.root.display());

    let (mapping, annotations) = self.collect_references(text, request, &staging)?;

    let output = rewrite_text(
      text,
      &mapping,
      &annotations,
      request.append,
      &document_filename(request.source_path),
    )?;

    self.persist(&staging, &output)?;

    self
      .stamper
      .set_creation_time(&staging.root, request.created)?;
    self
      .stamper
      .set_modification_time(&staging.root, request.modified)?;

    let target = resolve_bundle_path(self.config, request.destination, request.source_path);
    fs::rename(&staging.root, &target).map_err(|source| BundleError::Publish {
      from: staging.root.clone(),
      to: target.clone(),
      source,
    })?;

    log::info!("wrote {}", target.display());
    Ok(target)
  }

  fn stage(&self) -> Result<StagingArea> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(&self.config.staging_prefix);
    let temp = match &self.config.staging_root {
      Some(root) => builder.tempdir_in(root),
      None => builder.tempdir(),
    }
    .map_err(BundleError::Stage)?;

    let root = temp.keep();
    let assets = root.join(&self.config.assets_dir);
    fs::create_dir(&assets).map_err(BundleError::Stage)?;

    Ok(StagingArea { root, assets })
  }

  fn collect_references(
    &self,
    text: &str,
    request: &BundleRequest<'_>,
    staging: &StagingArea,
  ) -> Result<(PathMapping, Vec<AttachmentAnnotation>)> {
    let mut mapping = PathMapping::new();
    let mut annotations: Vec<AttachmentAnnotation> = Vec::new();

    for reference in ReferenceScanner::new(text, request.process_attachments) {
      match reference.kind {
        ReferenceKind::Image => {
          if mapping.get(&reference.destination).is_some() {
            continue;
          }

          log::debug!("fetching {}", reference.destination);
          let asset = fetch_resource(&self.remote, &reference, request.source_path)?;
          install_asset(&staging.assets, &asset)?;
          mapping.insert(
            reference.destination.clone(),
            self.config.asset_reference(&asset.filename),
          );
        }
        ReferenceKind::Attachment => {
          let Some(annotation) = AttachmentAnnotation::from_reference(&reference) else {
            continue;
          };
          if !annotations.contains(&annotation) {
            log::debug!("annotating attachment {}", annotation.destination);
            annotations.push(annotation);
          }
        }
      }
    }

    Ok((mapping, annotations))
  }

  fn persist(&self, staging: &StagingArea, text: &str) -> Result<()> {
    let text_path = staging.root.join(&self.config.text_file);
    fs::write(&text_path, text).map_err(|source| BundleError::Persist {
      path: text_path.clone(),
      source,
    })?;

    let manifest_path = staging.root.join(&self.config.manifest_file);
    fs::write(&manifest_path, manifest_contents(self.config)?).map_err(|source| {
      BundleError::Persist {
        path: manifest_path.clone(),
        source,
      }
    })
  }
}

/// Serialised bundle descriptor. Depends only on the configuration.
pub fn manifest_contents(config: &BundleConfig) -> Result<String> {
  let mut json = serde_json::to_string_pretty(&BundleManifest::from(config))?;
  json.push('\n');
  Ok(json)
}

/// Final location of the bundle.
///
/// A destination naming a directory (empty, `.` or ending in a separator) receives
/// `<document name>.<extension>`; any other destination is used as the exact bundle path.
pub fn resolve_bundle_path(config: &BundleConfig, destination: &Path, source_path: &Path) -> PathBuf {
  if names_directory(destination) {
    destination.join(format!(
      "{}.{}",
      document_filename(source_path),
      config.bundle_extension
    ))
  } else {
    destination.to_path_buf()
  }
}

/// Destination that places the bundle inside `dir`.
pub fn directory_destination(dir: &Path) -> PathBuf {
  let mut raw = dir.as_os_str().to_os_string();
  if !names_directory(dir) {
    raw.push(std::path::MAIN_SEPARATOR_STR);
  }
  PathBuf::from(raw)
}

fn names_directory(path: &Path) -> bool {
  let raw = path.as_os_str().to_string_lossy();
  raw.is_empty()
    || raw == "."
    || raw.ends_with(is_separator)
    || raw
      .strip_suffix('.')
      .is_some_and(|rest| rest.ends_with(is_separator))
}

fn document_filename(source_path: &Path) -> String {
  source_path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default()
}
