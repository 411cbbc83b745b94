//! Last-resort vocabulary patterns over normalized page text.

use std::sync::LazyLock;

use regex::Regex;
use vacspec_core::{SpecField, SpecValues};

use crate::text::canonicalize_suction;

static SUCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:\d{1,2},\d{3}|\d{3,5})\s*pa\b").expect("valid suction regex")
});
static NAVIGATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:lidar|laser|vslam|camera|gyro)").expect("valid navigation regex")
});
static MOP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:dual[- ]spinning|sonic|vibrating|oscillating|vibra-?mop|pad|wash/dry)\b")
        .expect("valid mop regex")
});
static BASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:self[- ]empty(?:ing)?|auto[- ]empty(?:ing)?|charging dock|wash/dry station)\b",
    )
    .expect("valid base regex")
});

fn pattern_for(field: SpecField) -> &'static Regex {
    match field {
        SpecField::Base => &BASE_RE,
        SpecField::Navigation => &NAVIGATION_RE,
        SpecField::Suction => &SUCTION_RE,
        SpecField::MopType => &MOP_RE,
    }
}

/// Applies one fixed pattern per field to `text` (output of
/// [`crate::text::normalize_page_text`]). The first match wins.
#[must_use]
pub fn extract_fallback_specs(text: &str) -> SpecValues {
    let mut values = SpecValues::default();
    for field in SpecField::ALL {
        let Some(m) = pattern_for(field).find(text) else {
            continue;
        };
        let value = if field == SpecField::Suction {
            canonicalize_suction(m.as_str())
        } else {
            Some(m.as_str().to_string())
        };
        if let Some(value) = value {
            values.set_if_absent(field, value);
        }
    }
    values
}
