//! Data structures produced while converting a document into a bundle.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::BundleConfig;

/// Where a reference's destination lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
  /// The destination parses as an absolute URI.
  Remote,
  /// The destination is a path relative to the document.
  Local,
}

/// How a discovered reference is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
  /// An image that is fetched into the assets directory.
  Image,
  /// A local link annotated with a processing marker.
  Attachment,
}

/// An image or link occurrence discovered in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
  /// Raw destination string as written in the Markdown.
  pub destination: String,
  /// Processing applied to the reference.
  pub kind: ReferenceKind,
  /// Classification of the destination.
  pub location: Location,
}

impl Reference {
  /// Whether the destination must be fetched over the network.
  pub fn is_remote(&self) -> bool {
    self.location == Location::Remote
  }

  /// Last path segment of the destination, used to name assets and markers.
  pub fn filename(&self) -> String {
    match self.location {
      Location::Remote => remote_filename(&self.destination),
      Location::Local => local_filename(&self.destination),
    }
  }

  /// Marker substituted for an attachment link.
  pub fn attachment_marker(&self) -> Option<String> {
    match self.kind {
      ReferenceKind::Attachment => Some(format!(
        "#todo/process-attachment ({})",
        self.filename()
      )),
      ReferenceKind::Image => None,
    }
  }
}

fn remote_filename(destination: &str) -> String {
  let Ok(url) = url::Url::parse(destination) else {
    return local_filename(destination);
  };

  url
    .path_segments()
    .and_then(|segments| segments.filter(|segment| !segment.is_empty()).last())
    .map(str::to_string)
    .or_else(|| url.host_str().map(str::to_string))
    .unwrap_or_else(|| local_filename(destination))
}

fn local_filename(destination: &str) -> String {
  Path::new(destination)
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| destination.to_string())
}

/// Mapping from raw image destinations to their relative path inside the bundle.
///
/// Entries are only recorded after the asset has been written to the staging area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMapping {
  entries: BTreeMap<String, String>,
}

impl PathMapping {
  /// Create an empty mapping.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record the relocated path for a destination.
  pub fn insert(&mut self, destination: impl Into<String>, relative_path: impl Into<String>) {
    self.entries.insert(destination.into(), relative_path.into());
  }

  /// Relocated path for a destination, if one was recorded.
  pub fn get(&self, destination: &str) -> Option<&str> {
    self.entries.get(destination).map(String::as_str)
  }

  /// Iterate over `(destination, relative_path)` pairs.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|(destination, path)| (destination.as_str(), path.as_str()))
  }

  /// Number of recorded destinations.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when nothing has been recorded.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// A local link destination paired with the marker that replaces the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentAnnotation {
  /// Raw destination string of the link.
  pub destination: String,
  /// Literal replacement text.
  pub marker: String,
}

impl AttachmentAnnotation {
  /// Build the annotation for an attachment reference.
  pub fn from_reference(reference: &Reference) -> Option<Self> {
    reference.attachment_marker().map(|marker| Self {
      destination: reference.destination.clone(),
      marker,
    })
  }
}

/// Descriptor written as the bundle manifest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
  /// The bundle is meant for exchange, not long-term storage.
  pub transient: bool,
  /// Uniform type identifier of the text.
  #[serde(rename = "type")]
  pub document_type: String,
  /// Identifier of the producing tool.
  pub creator_identifier: String,
  /// Bundle format version.
  pub version: u32,
}

impl From<&BundleConfig> for BundleManifest {
  fn from(config: &BundleConfig) -> Self {
    Self {
      transient: true,
      document_type: config.document_type.clone(),
      creator_identifier: config.creator_identifier.clone(),
      version: config.version,
    }
  }
}

/// Everything needed to convert one document.
#[derive(Debug, Clone)]
pub struct BundleRequest<'a> {
  /// Raw document contents.
  pub contents: &'a [u8],
  /// Absolute path of the document.
  pub source_path: &'a Path,
  /// Creation time applied to the bundle.
  pub created: DateTime<Utc>,
  /// Modification time applied to the bundle.
  pub modified: DateTime<Utc>,
  /// Destination directory (trailing separator) or exact bundle path.
  pub destination: &'a Path,
  /// Annotate links to local files.
  pub process_attachments: bool,
  /// Text appended to the document; `%f` is replaced by the document file name.
  pub append: &'a str,
}
