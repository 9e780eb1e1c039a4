//! Discovery of image and link references in Markdown source.
//!
//! Scanning is pure: it needs neither the filesystem nor the network, so fetching happens in a
//! separate pass over the references produced here.

mod classify;
mod markdown;

pub use classify::classify_destination;
pub use markdown::{ReferenceScanner, scan_references};
