//! Materialising referenced images into the staging area.

mod http;

use std::fs;
use std::path::{Path, PathBuf};

pub use http::{HttpFetcher, RemoteFetcher};

use crate::error::{BundleError, Result};
use crate::models::Reference;

/// Bytes of a fetched resource together with the file name it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
  /// Base file name derived from the destination.
  pub filename: String,
  /// Raw resource contents.
  pub bytes: Vec<u8>,
}

/// Retrieve the bytes behind a reference.
///
/// Remote destinations go through `remote`; local destinations are resolved relative to the
/// directory containing `source_path`.
pub fn fetch_resource<R>(remote: &R, reference: &Reference, source_path: &Path) -> Result<FetchedAsset>
where
  R: RemoteFetcher + ?Sized,
{
  let bytes = if reference.is_remote() {
    remote
      .fetch(&reference.destination)
      .map_err(|source| BundleError::Remote {
        url: reference.destination.clone(),
        source,
      })?
  } else {
    let path = resolve_local_path(source_path, &reference.destination);
    fs::read(&path).map_err(|source| BundleError::LocalAsset { path, source })?
  };

  Ok(FetchedAsset {
    filename: reference.filename(),
    bytes,
  })
}

/// Resolve a local destination against the document's directory.
///
/// Root-relative destinations are also taken relative to that directory.
pub fn resolve_local_path(source_path: &Path, destination: &str) -> PathBuf {
  source_path
    .parent()
    .unwrap_or_else(|| Path::new(""))
    .join(destination.trim_start_matches(['/', '\\']))
}

/// Write an asset into the assets directory, returning its path.
///
/// Assets sharing a file name overwrite one another; the last one written wins.
pub fn install_asset(assets_dir: &Path, asset: &FetchedAsset) -> Result<PathBuf> {
  let destination = assets_dir.join(&asset.filename);
  if destination.exists() {
    log::warn!(
      "asset {} already exists in bundle and will be overwritten",
      asset.filename
    );
  }

  fs::write(&destination, &asset.bytes).map_err(|source| BundleError::WriteAsset {
    path: destination.clone(),
    source,
  })?;

  Ok(destination)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::FetchError;
  use crate::models::{Location, ReferenceKind};
  use tempfile::tempdir;

  fn image(destination: &str, location: Location) -> Reference {
    Reference {
      destination: destination.into(),
      kind: ReferenceKind::Image,
      location,
    }
  }

  fn unreachable(_: &str) -> std::result::Result<Vec<u8>, FetchError> {
    panic!("remote fetch not expected");
  }

  #[test]
  fn reads_local_files_relative_to_document() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("img"))?;
    fs::write(dir.path().join("img/photo.png"), b"pixels")?;
    let source = dir.path().join("notes.md");

    let asset = fetch_resource(&unreachable, &image("img/photo.png", Location::Local), &source)?;

    assert_eq!(asset.filename, "photo.png");
    assert_eq!(asset.bytes, b"pixels");
    Ok(())
  }

  #[test]
  fn root_relative_destinations_stay_under_the_document_directory() {
    let resolved = resolve_local_path(Path::new("/docs/notes.md"), "/img/photo.png");
    assert_eq!(resolved, Path::new("/docs/img/photo.png"));
  }

  #[test]
  fn missing_local_files_are_resource_errors() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("notes.md");

    let err = fetch_resource(&unreachable, &image("missing.png", Location::Local), &source)
      .unwrap_err();

    assert!(matches!(err, BundleError::LocalAsset { ref path, .. } if path.ends_with("missing.png")));
  }

  #[test]
  fn remote_destinations_use_the_fetcher() {
    let fake = |url: &str| -> std::result::Result<Vec<u8>, FetchError> {
      assert_eq!(url, "https://example.com/cat.jpg");
      Ok(b"meow".to_vec())
    };

    let asset = fetch_resource(
      &fake,
      &image("https://example.com/cat.jpg", Location::Remote),
      Path::new("/docs/notes.md"),
    )
    .unwrap();

    assert_eq!(asset.filename, "cat.jpg");
    assert_eq!(asset.bytes, b"meow");
  }

  #[test]
  fn remote_failures_carry_the_url() {
    let failing = |_: &str| -> std::result::Result<Vec<u8>, FetchError> {
      Err(FetchError::Status(reqwest::StatusCode::NOT_FOUND))
    };

    let err = fetch_resource(
      &failing,
      &image("https://example.com/gone.png", Location::Remote),
      Path::new("/docs/notes.md"),
    )
    .unwrap_err();

    assert!(err.to_string().contains("https://example.com/gone.png"));
    assert!(err.to_string().contains("404"));
  }

  #[test]
  fn colliding_assets_keep_the_last_write() -> std::io::Result<()> {
    let dir = tempdir()?;
    let first = FetchedAsset {
      filename: "photo.png".into(),
      bytes: b"first".to_vec(),
    };
    let second = FetchedAsset {
      filename: "photo.png".into(),
      bytes: b"second".to_vec(),
    };

    install_asset(dir.path(), &first).unwrap();
    let path = install_asset(dir.path(), &second).unwrap();

    assert_eq!(fs::read(path)?, b"second");
    Ok(())
  }
}
