use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Utc};

use crate::error::TimestampError;
use crate::timestamps::TimestampSource;

/// Reads timestamps from the author dates in git history.
///
/// Requires the `git` CLI and a file that has been committed at least once.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitTimestamps;

impl TimestampSource for GitTimestamps {
  fn creation_time(&self, path: &Path) -> Result<DateTime<Utc>, TimestampError> {
    git_author_date(path, &["--diff-filter=A", "--follow"])
  }

  fn modification_time(&self, path: &Path) -> Result<DateTime<Utc>, TimestampError> {
    git_author_date(path, &[])
  }
}

fn git_author_date(path: &Path, filters: &[&str]) -> Result<DateTime<Utc>, TimestampError> {
  let git = which::which("git").map_err(TimestampError::GitUnavailable)?;

  let dir = path.parent().unwrap_or_else(|| Path::new("."));
  let filename = path.file_name().unwrap_or(path.as_os_str());

  let output = Command::new(git)
    .arg("log")
    .args(filters)
    .args(["--format=%aD", "-1", "--"])
    .arg(filename)
    .current_dir(dir)
    .output()
    .map_err(|err| TimestampError::Git {
      path: path.to_path_buf(),
      message: err.to_string(),
    })?;

  if !output.status.success() {
    return Err(TimestampError::Git {
      path: path.to_path_buf(),
      message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    });
  }

  let raw = String::from_utf8_lossy(&output.stdout);
  let raw = raw.trim();
  if raw.is_empty() {
    return Err(TimestampError::MissingHistory {
      path: path.to_path_buf(),
    });
  }

  parse_git_date(raw)
}

/// Parse an RFC 2822 author date as printed by `git log --format=%aD`.
pub fn parse_git_date(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
  DateTime::parse_from_rfc2822(raw.trim())
    .map(|date| date.with_timezone(&Utc))
    .map_err(|source| TimestampError::Parse {
      raw: raw.to_string(),
      source,
    })
}
