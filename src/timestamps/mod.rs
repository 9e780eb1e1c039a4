//! Discovering and applying the creation and modification times of a bundle.

mod filesystem;
mod git;

use std::path::Path;

use chrono::{DateTime, Utc};

pub use filesystem::FilesystemTimestamps;
pub use git::{GitTimestamps, parse_git_date};

use crate::error::TimestampError;

/// Provides the creation and modification times of a source document.
pub trait TimestampSource {
  /// When the document was created.
  fn creation_time(&self, path: &Path) -> Result<DateTime<Utc>, TimestampError>;
  /// When the document was last modified.
  fn modification_time(&self, path: &Path) -> Result<DateTime<Utc>, TimestampError>;
}

/// Applies creation and modification times to a path on disk.
pub trait TimestampSink {
  /// Set the creation time of `path`.
  fn set_creation_time(&self, path: &Path, time: DateTime<Utc>) -> Result<(), TimestampError>;
  /// Set the modification time of `path`.
  fn set_modification_time(&self, path: &Path, time: DateTime<Utc>)
  -> Result<(), TimestampError>;
}

/// Strategy used to look up document timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampStrategy {
  /// Filesystem metadata.
  #[default]
  Filesystem,
  /// Author dates from git history.
  Git,
}

impl TimestampStrategy {
  /// Select the strategy from the `git-dates` flag.
  pub fn from_git_flag(use_git_dates: bool) -> Self {
    if use_git_dates { Self::Git } else { Self::Filesystem }
  }

  /// Instantiate the source for this strategy.
  pub fn source(self) -> Box<dyn TimestampSource> {
    match self {
      Self::Filesystem => Box::new(FilesystemTimestamps),
      Self::Git => Box::new(GitTimestamps),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn git_flag_selects_strategy() {
    assert_eq!(TimestampStrategy::from_git_flag(true), TimestampStrategy::Git);
    assert_eq!(
      TimestampStrategy::from_git_flag(false),
      TimestampStrategy::Filesystem
    );
  }
}
