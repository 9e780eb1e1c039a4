//! Error types for bundle generation.
//!
//! Every failure aborts the conversion of the current document. The variants carry the path or
//! URL that was being processed so the caller can report the error verbatim.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for bundle operations.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Broad classification of a [`BundleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The source document could not be read or interpreted.
  Input,
  /// A referenced image could not be fetched.
  Resource,
  /// Timestamps could not be discovered or applied.
  Timestamp,
  /// Staging, persisting or publishing the bundle failed.
  Filesystem,
}

/// Main error type for all bundle operations.
#[derive(Error, Debug)]
pub enum BundleError {
  /// The source document could not be read.
  #[error("failed to read {}: {source}", path.display())]
  ReadSource {
    /// Path of the document.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },

  /// The source document could not be made absolute.
  #[error("failed to resolve absolute path of {}: {source}", path.display())]
  ResolveSource {
    /// Path of the document as supplied.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },

  /// The source document is not valid UTF-8.
  #[error("{} is not valid UTF-8: {source}", path.display())]
  NonUtf8Source {
    /// Path of the document.
    path: PathBuf,
    /// Decoding error.
    source: std::str::Utf8Error,
  },

  /// A remote image could not be downloaded.
  #[error("error downloading image {url}: {source}")]
  Remote {
    /// URL being fetched.
    url: String,
    /// Underlying fetch error.
    source: FetchError,
  },

  /// The HTTP client used for remote images could not be created.
  #[error("failed to initialise HTTP client: {0}")]
  HttpClient(#[source] FetchError),

  /// A local image could not be read.
  #[error("error opening local image {}: {source}", path.display())]
  LocalAsset {
    /// Resolved path of the image.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },

  /// A fetched asset could not be written into the staging area.
  #[error("error creating asset file {}: {source}", path.display())]
  WriteAsset {
    /// Destination inside the assets directory.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },

  /// The staging area could not be created.
  #[error("failed to create staging directory: {0}")]
  Stage(#[source] std::io::Error),

  /// The rewritten text or manifest could not be written.
  #[error("failed to write {}: {source}", path.display())]
  Persist {
    /// File being written.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },

  /// The manifest could not be serialised.
  #[error("failed to serialise bundle manifest: {0}")]
  Manifest(#[from] serde_json::Error),

  /// A substitution pattern failed to compile.
  #[error("invalid substitution pattern: {0}")]
  Pattern(#[from] regex::Error),

  /// Timestamps could not be discovered or applied.
  #[error(transparent)]
  Timestamp(#[from] TimestampError),

  /// The staging area could not be renamed into place.
  #[error("failed to move {} to {}: {source}", from.display(), to.display())]
  Publish {
    /// Staging directory.
    from: PathBuf,
    /// Final bundle path.
    to: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },
}

impl BundleError {
  /// Classify the error.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::ReadSource { .. } | Self::ResolveSource { .. } | Self::NonUtf8Source { .. } => {
        ErrorKind::Input
      }
      Self::Remote { .. } | Self::HttpClient(_) | Self::LocalAsset { .. } => {
        ErrorKind::Resource
      }
      Self::Timestamp(_) => ErrorKind::Timestamp,
      Self::WriteAsset { .. }
      | Self::Stage(_)
      | Self::Persist { .. }
      | Self::Manifest(_)
      | Self::Pattern(_)
      | Self::Publish { .. } => ErrorKind::Filesystem,
    }
  }
}

/// Failures while downloading a remote resource.
#[derive(Error, Debug)]
pub enum FetchError {
  /// The HTTP request could not be completed.
  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  /// The server answered with a non-success status.
  #[error("server responded with {0}")]
  Status(reqwest::StatusCode),

  /// Reading the response failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

/// Failures while discovering or applying bundle timestamps.
#[derive(Error, Debug)]
pub enum TimestampError {
  /// The platform offers no way to perform the operation.
  #[error("current OS does not support {operation}")]
  Unsupported {
    /// Description of the unsupported operation.
    operation: &'static str,
  },

  /// Reading or updating file metadata failed.
  #[error("failed to access timestamps of {}: {source}", path.display())]
  Io {
    /// Path being inspected or updated.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },

  /// The git CLI could not be located.
  #[error("git CLI not found in PATH (you should install git)")]
  GitUnavailable(#[source] which::Error),

  /// `git log` could not be run or exited unsuccessfully.
  #[error("git log failed for {}: {message}", path.display())]
  Git {
    /// File whose history was queried.
    path: PathBuf,
    /// Captured stderr or spawn error.
    message: String,
  },

  /// The file has no commits in history.
  #[error("{} not found in git history", path.display())]
  MissingHistory {
    /// File whose history was queried.
    path: PathBuf,
  },

  /// A date printed by git could not be parsed.
  #[error("failed to parse git date {raw:?}: {source}")]
  Parse {
    /// The raw date text.
    raw: String,
    /// Parse error.
    source: chrono::ParseError,
  },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classifies_errors_by_stage() {
    let missing = || std::io::Error::new(std::io::ErrorKind::NotFound, "missing");

    let input = BundleError::ReadSource {
      path: PathBuf::from("notes.md"),
      source: missing(),
    };
    assert_eq!(input.kind(), ErrorKind::Input);

    let resource = BundleError::LocalAsset {
      path: PathBuf::from("image.png"),
      source: missing(),
    };
    assert_eq!(resource.kind(), ErrorKind::Resource);

    let timestamp = BundleError::from(TimestampError::Unsupported {
      operation: "setting file creation times",
    });
    assert_eq!(timestamp.kind(), ErrorKind::Timestamp);

    let filesystem = BundleError::Stage(missing());
    assert_eq!(filesystem.kind(), ErrorKind::Filesystem);
  }

  #[test]
  fn messages_include_the_offending_path() {
    let err = BundleError::LocalAsset {
      path: PathBuf::from("/docs/image.png"),
      source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
    };
    let message = err.to_string();
    assert!(message.contains("/docs/image.png"));
    assert!(message.contains("No such file"));
  }
}
