//! Markdown traversal producing typed references.

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag};

use crate::models::{Location, Reference, ReferenceKind};
use crate::scan::classify::classify_destination;

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    options
}

/// Lazily yields the image and link references found in a Markdown document.
///
/// Images are always reported. Links are reported only when `process_attachments` is set and
/// their destination is local. Parsing never fails; whatever tree the parser recovers is walked.
pub struct ReferenceScanner<'a> {
    parser: Parser<'a>,
    process_attachments: bool,
}

impl<'a> ReferenceScanner<'a> {
    /// Create a scanner over the provided Markdown text.
    pub fn new(markdown: &'a str, process_attachments: bool) -> Self {
        Self {
            parser: Parser::new_ext(markdown, markdown_options()),
            process_attachments,
        }
    }
}

impl Iterator for ReferenceScanner<'_> {
    type Item = Reference;

    fn next(&mut self) -> Option<Self::Item> {
        let process_attachments = self.process_attachments;
        self.parser
            .by_ref()
            .find_map(|event| reference_for(event, process_attachments))
    }
}

/// Collect every reference in the document.
pub fn scan_references(markdown: &str, process_attachments: bool) -> Vec<Reference> {
    ReferenceScanner::new(markdown, process_attachments).collect()
}

fn reference_for(event: Event<'_>, process_attachments: bool) -> Option<Reference> {
    match event {
        Event::Start(Tag::Image { dest_url, .. }) => image_reference(dest_url),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            ..
        }) if process_attachments => attachment_reference(link_type, dest_url),
        _ => None,
    }
}

fn image_reference(dest_url: CowStr<'_>) -> Option<Reference> {
    if dest_url.is_empty() {
        return None;
    }

    Some(Reference {
        location: classify_destination(&dest_url),
        destination: dest_url.into_string(),
        kind: ReferenceKind::Image,
    })
}

fn attachment_reference(link_type: LinkType, dest_url: CowStr<'_>) -> Option<Reference> {
    // e-mail autolinks carry a bare address without the mailto: scheme
    if dest_url.is_empty() || link_type == LinkType::Email {
        return None;
    }

    match classify_destination(&dest_url) {
        Location::Remote => None,
        Location::Local => Some(Reference {
            destination: dest_url.into_string(),
            kind: ReferenceKind::Attachment,
            location: Location::Local,
        }),
    }
}
