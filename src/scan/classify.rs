use url::Url;

use crate::models::Location;

/// Classify a Markdown destination as remote or local.
///
/// A destination is remote when it parses as an absolute URI with a scheme. Anything else,
/// including root-relative and protocol-relative paths, is resolved against the document.
pub fn classify_destination(value: &str) -> Location {
    if Url::parse(value).is_ok() {
        Location::Remote
    } else {
        Location::Local
    }
}
