//! Remote downloads for images referenced by URL.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::FetchError;

/// Source of bytes for remote destinations.
///
/// Implemented by [`HttpFetcher`] and by any `Fn(&str) -> Result<Vec<u8>, FetchError>`, which
/// lets callers substitute canned responses.
pub trait RemoteFetcher {
  /// Download the resource at `url`.
  fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<F> RemoteFetcher for F
where
  F: Fn(&str) -> Result<Vec<u8>, FetchError>,
{
  fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
    self(url)
  }
}

/// Blocking HTTP GET client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: Client,
}

impl HttpFetcher {
  /// Build a client. `None` disables the request timeout.
  pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client })
  }
}

impl RemoteFetcher for HttpFetcher {
  fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
    log::info!("Downloading {}", url);

    let response = self.client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status(status));
    }

    Ok(response.bytes()?.to_vec())
  }
}
