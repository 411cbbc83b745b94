//! Text normalization shared by the extractors.
//!
//! Everything here is pure: no I/O, no logging, no failure modes.

use std::sync::LazyLock;

use regex::Regex;

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script>|<style\b[^>]*>.*?</style>|<noscript\b[^>]*>.*?</noscript>|<!--.*?-->")
        .expect("valid block regex")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid entity regex"));

/// Number directly followed by a `pa` unit, e.g. `5000Pa`, `5,000 pa`.
static SUCTION_WITH_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*pa\b").expect("valid suction regex")
});
/// Number followed by `kpa`, e.g. `2.5 kPa`.
static SUCTION_KPA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*kpa\b").expect("valid kpa regex")
});
static STANDALONE_PA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpa\b").expect("valid unit regex"));
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?").expect("valid number regex")
});

/// Keywords shorter than this must match on word boundaries; longer ones
/// match as plain substrings.
const SHORT_KEYWORD_LEN: usize = 4;

/// Removes script/style/noscript blocks and comments, drops every remaining
/// tag, decodes common entities, and collapses whitespace runs to one space.
#[must_use]
pub fn strip_markup(html: &str) -> String {
    let without_blocks = BLOCK_RE.replace_all(html, " ");
    let without_tags = TAG_RE.replace_all(&without_blocks, " ");
    let decoded = decode_entities(&without_tags);
    collapse_whitespace(&decoded)
}

/// [`strip_markup`] followed by lower-casing: the form the regex fallback and
/// snippet extractors scan.
#[must_use]
pub fn normalize_page_text(html: &str) -> String {
    strip_markup(html).to_lowercase()
}

/// Collapses every whitespace run to a single space and trims both ends.
#[must_use]
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(input: &str) -> String {
    let named = input
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'");
    let numeric = NUMERIC_ENTITY_RE.replace_all(&named, |caps: &regex::Captures<'_>| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), |c| c.to_string())
    });
    // `&amp;` last so `&amp;lt;` stays literal text.
    numeric.replace("&amp;", "&")
}

/// Canonicalizes a raw suction value to `"<N> Pa"`.
///
/// - A number followed by `kpa` is scaled to pascals: `"2.5 kPa"` → `"2500 Pa"`.
/// - A number directly followed by a `pa` unit becomes exactly `"<N> Pa"`
///   (thousands separators dropped, fractions rounded): `"5000PA"` → `"5000 Pa"`.
/// - Otherwise, a standalone `pa` token is re-cased in place.
/// - Otherwise the first numeric run gets `" Pa"` appended, unless it is
///   fractional, since a unitless `2.5` is most likely kilopascals.
///
/// Returns `None` when the input holds no digits at all.
#[must_use]
pub fn canonicalize_suction(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    if let Some(caps) = SUCTION_KPA_RE.captures(trimmed) {
        let kilopascals: f64 = caps[1].parse().ok()?;
        return Some(format!("{:.0} Pa", kilopascals * 1000.0));
    }

    if let Some(caps) = SUCTION_WITH_UNIT_RE.captures(trimmed) {
        return whole_pascals(&caps[1]);
    }

    if STANDALONE_PA_RE.is_match(trimmed) {
        let recased = STANDALONE_PA_RE.replace(trimmed, "Pa");
        return Some(collapse_whitespace(&recased));
    }

    let number = NUMBER_RE.find(trimmed)?.as_str();
    if number.contains('.') {
        return None;
    }
    whole_pascals(number)
}

fn whole_pascals(number: &str) -> Option<String> {
    let digits = number.replace(',', "");
    if !digits.contains('.') {
        return Some(format!("{digits} Pa"));
    }
    let pascals: f64 = digits.parse().ok()?;
    Some(format!("{:.0} Pa", pascals.round()))
}

/// Finds the first occurrence of `keyword` in `haystack` at or after `from`.
///
/// Both arguments must already be lower-cased. Short keywords such as `pa`
/// only match as whole words so they do not fire inside `capacity`.
#[must_use]
pub fn find_keyword(haystack: &str, keyword: &str, from: usize) -> Option<usize> {
    if keyword.is_empty() || from > haystack.len() {
        return None;
    }
    let whole_word = keyword.len() < SHORT_KEYWORD_LEN;
    let mut search_from = from;

    loop {
        let abs = search_from + haystack.get(search_from..)?.find(keyword)?;
        let end = abs + keyword.len();
        // Advance by one char so the loop always makes progress.
        search_from = abs + haystack[abs..].chars().next().map_or(1, char::len_utf8);

        if !whole_word {
            return Some(abs);
        }
        let before_ok = !haystack[..abs]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        let after_ok = !haystack[end..]
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric);
        if before_ok && after_ok {
            return Some(abs);
        }
    }
}

/// `true` when `keyword` occurs in `haystack` under the [`find_keyword`] rules.
#[must_use]
pub fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    find_keyword(haystack, keyword, 0).is_some()
}
