//! Bundle layout configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// File name searched for by [`BundleConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "textbundler.json";

/// Names and identifiers used when laying out a bundle on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Extension appended to the document name when the destination is a directory.
    pub bundle_extension: String,
    /// File name of the rewritten Markdown inside the bundle.
    pub text_file: String,
    /// File name of the bundle descriptor.
    pub manifest_file: String,
    /// Directory holding fetched assets, relative to the bundle root.
    pub assets_dir: String,
    /// Uniform type identifier of the bundled text.
    pub document_type: String,
    /// Identifier of the tool that produced the bundle.
    pub creator_identifier: String,
    /// Bundle format version written to the descriptor.
    pub version: u32,
    /// Prefix of the temporary staging directory name.
    pub staging_prefix: String,
    /// Directory in which staging areas are created. Defaults to the system temp dir.
    pub staging_root: Option<PathBuf>,
    /// Timeout for remote fetches in seconds. `None` waits indefinitely.
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            bundle_extension: "textbundle".into(),
            text_file: "text.markdown".into(),
            manifest_file: "info.json".into(),
            assets_dir: "assets".into(),
            document_type: "net.daringfireball.markdown".into(),
            creator_identifier: "com.zachlatta.Textbundler".into(),
            version: 2,
            staging_prefix: "Textbundle".into(),
            staging_root: None,
            fetch_timeout_secs: Some(60),
        }
    }
}

impl BundleConfig {
    /// Load `textbundler.json` from the provided directory.
    ///
    /// A missing or malformed file yields the defaults.
    pub fn discover(dir: &Path) -> Self {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if !candidate.exists() {
            return Self::default();
        }
        match Self::from_path(&candidate) {
            Ok(config) => config,
            Err(err) => {
                log::warn!(
                    "ignoring unreadable configuration {}, using defaults: {err:#}",
                    candidate.display()
                );
                Self::default()
            }
        }
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("failed to read file")?;
        serde_json::from_str(&content).context("invalid JSON")
    }

    /// Timeout applied to remote fetches.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    /// Relative path written into the text for an asset with the given file name.
    ///
    /// Always uses forward slashes so the rewritten Markdown is portable.
    pub fn asset_reference(&self, filename: &str) -> String {
        let dir = self.assets_dir.trim_end_matches(['/', '\\']);
        format!("{dir}/{filename}").replace('\\', "/")
    }
}
