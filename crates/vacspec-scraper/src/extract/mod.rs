//! Page-level spec extraction.
//!
//! Three extractors run in a fixed precedence order and each only fills
//! fields the earlier ones left empty:
//!
//! 1. [`jsonld`]: schema.org `additionalProperty` entries
//! 2. [`table`]: `<th>/<td>` and `<dt>/<dd>` label/value pairs
//! 3. [`fallback`]: vocabulary regexes over the page text

pub mod fallback;
pub mod jsonld;
pub mod table;

use vacspec_core::{ExtractionResult, SpecDetails, SpecField, SpecValues};

use crate::discovery::source_domain;
use crate::snippets::extract_snippets;
use crate::text::normalize_page_text;

pub use fallback::extract_fallback_specs;
pub use jsonld::extract_jsonld_specs;
pub use table::extract_table_specs;

/// Runs every extractor over `html` in precedence order.
#[must_use]
pub fn extract_specs(html: &str) -> SpecValues {
    let mut text = None;
    extract_with_text(html, &mut text)
}

/// Extracts values from one fetched page and attaches provenance plus
/// evidence snippets for every resolved field.
///
/// Returns an empty result (no provenance) when the page yields nothing.
#[must_use]
pub fn extract_page(url: &str, html: &str, snippet_limit: usize) -> ExtractionResult {
    let mut text = None;
    let values = extract_with_text(html, &mut text);
    if !values.has_any() {
        return ExtractionResult::default();
    }

    let text = text.get_or_insert_with(|| normalize_page_text(html));
    let mut details = SpecDetails::default();
    for field in SpecField::ALL {
        if values.get(field).is_some() {
            details.set(field, extract_snippets(text, field, snippet_limit));
        }
    }

    ExtractionResult {
        values,
        source_url: Some(url.to_string()),
        source_domain: source_domain(url),
        details,
    }
}

/// Normalized text is only built when the regex fallback actually runs;
/// `text` caches it for the caller.
fn extract_with_text(html: &str, text: &mut Option<String>) -> SpecValues {
    let mut values = extract_jsonld_specs(html);
    if values.is_complete() {
        return values;
    }

    values.fill_missing_from(&extract_table_specs(html));
    if values.is_complete() {
        return values;
    }

    let text = text.get_or_insert_with(|| normalize_page_text(html));
    values.fill_missing_from(&extract_fallback_specs(text));
    values
}
