//! Title/description extraction from the model's free-form reply.

use folio_shared::{CaptionResult, DEFAULT_DESCRIPTION, DEFAULT_TITLE};

/// Split a reply into a caption.
///
/// Lines are trimmed and blank ones dropped. The first line is the title; the
/// rest, joined by single spaces, is the description. Missing parts fall back
/// to [`DEFAULT_TITLE`] and [`DEFAULT_DESCRIPTION`].
pub fn parse_caption(text: &str) -> CaptionResult {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let title = lines.next().unwrap_or(DEFAULT_TITLE).to_string();
    let description = lines.collect::<Vec<_>>().join(" ");
    let description = if description.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        description
    };

    CaptionResult { title, description }
}
