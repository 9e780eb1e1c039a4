use std::fs::{self, File};
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::error::TimestampError;
use crate::timestamps::{TimestampSink, TimestampSource};

/// Reads and writes timestamps through filesystem metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemTimestamps;

impl TimestampSource for FilesystemTimestamps {
  fn creation_time(&self, path: &Path) -> Result<DateTime<Utc>, TimestampError> {
    let metadata = fs::metadata(path).map_err(|source| io_error(path, source))?;
    match metadata.created() {
      Ok(created) => Ok(created.into()),
      Err(err) if err.kind() == std::io::ErrorKind::Unsupported => {
        Err(TimestampError::Unsupported {
          operation: "getting creation time of files",
        })
      }
      Err(err) => Err(io_error(path, err)),
    }
  }

  fn modification_time(&self, path: &Path) -> Result<DateTime<Utc>, TimestampError> {
    let metadata = fs::metadata(path).map_err(|source| io_error(path, source))?;
    let modified = metadata
      .modified()
      .map_err(|source| io_error(path, source))?;
    Ok(modified.into())
  }
}

impl TimestampSink for FilesystemTimestamps {
  fn set_creation_time(&self, path: &Path, time: DateTime<Utc>) -> Result<(), TimestampError> {
    set_created(path, SystemTime::from(time))
  }

  fn set_modification_time(
    &self,
    path: &Path,
    time: DateTime<Utc>,
  ) -> Result<(), TimestampError> {
    let file = open_for_times(path)?;
    file
      .set_modified(SystemTime::from(time))
      .map_err(|source| io_error(path, source))
  }
}

fn io_error(path: &Path, source: std::io::Error) -> TimestampError {
  TimestampError::Io {
    path: path.to_path_buf(),
    source,
  }
}

#[cfg(not(windows))]
fn open_for_times(path: &Path) -> Result<File, TimestampError> {
  File::open(path).map_err(|source| io_error(path, source))
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> Result<File, TimestampError> {
  use std::os::windows::fs::OpenOptionsExt;

  const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
  const FILE_FLAG_BACKUP_SEMANTICS: u32 = 0x0200_0000;

  fs::OpenOptions::new()
    .access_mode(FILE_WRITE_ATTRIBUTES)
    .custom_flags(FILE_FLAG_BACKUP_SEMANTICS)
    .open(path)
    .map_err(|source| io_error(path, source))
}

#[cfg(target_os = "macos")]
fn set_created(path: &Path, time: SystemTime) -> Result<(), TimestampError> {
  use std::fs::FileTimes;
  use std::os::macos::fs::FileTimesExt;

  let file = open_for_times(path)?;
  file
    .set_times(FileTimes::new().set_created(time))
    .map_err(|source| io_error(path, source))
}

#[cfg(windows)]
fn set_created(path: &Path, time: SystemTime) -> Result<(), TimestampError> {
  use std::fs::FileTimes;
  use std::os::windows::fs::FileTimesExt;

  let file = open_for_times(path)?;
  file
    .set_times(FileTimes::new().set_created(time))
    .map_err(|source| io_error(path, source))
}

#[cfg(not(any(target_os = "macos", windows)))]
fn set_created(_path: &Path, _time: SystemTime) -> Result<(), TimestampError> {
  Err(TimestampError::Unsupported {
    operation: "setting file creation times",
  })
}
