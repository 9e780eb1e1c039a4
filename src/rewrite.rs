//! Rewriting the document text to point at relocated assets.

use regex::{Captures, NoExpand, Regex};

use crate::error::Result;
use crate::models::{AttachmentAnnotation, PathMapping};

/// Placeholder in the append template replaced by the document's file name.
pub const FILENAME_PLACEHOLDER: &str = "%f";

/// Apply image relocations and attachment markers to `text`, then append `append` if non-empty.
///
/// Image destinations are replaced everywhere they occur as plain substrings, including outside
/// of link syntax. All destinations are substituted in a single pass, preferring the longest one
/// at each position, so relocated paths are never rewritten again. Appended text is added last so
/// it is never subject to substitution.
pub fn rewrite_text(
  text: &str,
  mapping: &PathMapping,
  annotations: &[AttachmentAnnotation],
  append: &str,
  document_filename: &str,
) -> Result<String> {
  let mut output = relocate_images(text, mapping)?;

  for annotation in annotations {
    let pattern = attachment_pattern(&annotation.destination)?;
    output = pattern
      .replace_all(&output, NoExpand(&annotation.marker))
      .into_owned();
  }

  if !append.is_empty() {
    output.push('\n');
    output.push_str(&render_append(append, document_filename));
    output.push('\n');
  }

  Ok(output)
}

fn relocate_images(text: &str, mapping: &PathMapping) -> Result<String> {
  if mapping.is_empty() {
    return Ok(text.to_string());
  }

  let mut destinations: Vec<&str> = mapping.iter().map(|(destination, _)| destination).collect();
  destinations.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
  let alternation = destinations
    .iter()
    .map(|destination| regex::escape(destination))
    .collect::<Vec<_>>()
    .join("|");
  let pattern = Regex::new(&alternation)?;

  let relocated = pattern.replace_all(text, |caps: &Captures<'_>| {
    mapping.get(&caps[0]).unwrap_or(&caps[0]).to_string()
  });
  Ok(relocated.into_owned())
}

/// Pattern matching a single Markdown link on one line whose destination contains `destination`
/// literally.
///
/// The link text may hold one level of nested brackets, so a linked image is matched as a whole.
/// Neighbouring links on the same line are left alone.
pub fn attachment_pattern(destination: &str) -> Result<Regex> {
  let escaped = regex::escape(destination);
  Ok(Regex::new(&format!(
    r"\[(?:[^\[\]\n]|\[[^\[\]\n]*\])*\]\([^)\n]*{escaped}[^)\n]*\)"
  ))?)
}

/// Substitute the document file name into an append template.
pub fn render_append(template: &str, document_filename: &str) -> String {
  template.replace(FILENAME_PLACEHOLDER, document_filename)
}
