//! Header/data pair heuristic over raw markup.
//!
//! Recognizes `<th>label</th><td>value</td>` rows and
//! `<dt>label</dt><dd>value</dd>` definition lists. The markup is scanned
//! as-is; no DOM is built.

use std::sync::LazyLock;

use regex::Regex;
use vacspec_core::{SpecField, SpecValues};

use crate::text::{canonicalize_suction, contains_keyword, strip_markup};

static CELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(th|td|dt|dd)\b[^>]*>(.*?)</(?:th|td|dt|dd)\s*>")
        .expect("valid table cell regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Header,
    Data,
    Term,
    Definition,
}

impl CellKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "th" => Some(CellKind::Header),
            "td" => Some(CellKind::Data),
            "dt" => Some(CellKind::Term),
            "dd" => Some(CellKind::Definition),
            _ => None,
        }
    }

    fn pairs_with(self, next: CellKind) -> bool {
        matches!(
            (self, next),
            (CellKind::Header, CellKind::Data) | (CellKind::Term, CellKind::Definition)
        )
    }
}

struct Cell {
    kind: CellKind,
    text: String,
    start: usize,
    end: usize,
}

/// A label cell and the value cell that immediately follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LabeledPair {
    /// Lower-cased label text.
    label: String,
    value: String,
}

/// Extracts spec fields from header/data pairs. The first keyword of each
/// field's list that labels a non-empty cell wins.
#[must_use]
pub fn extract_table_specs(html: &str) -> SpecValues {
    let pairs = labeled_pairs(html);
    let mut values = SpecValues::default();
    if pairs.is_empty() {
        return values;
    }

    for field in SpecField::ALL {
        if let Some(value) = value_for_field(field, &pairs) {
            values.set_if_absent(field, value);
        }
    }
    values
}

fn labeled_pairs(html: &str) -> Vec<LabeledPair> {
    let cells: Vec<Cell> = CELL_RE
        .captures_iter(html)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let kind = CellKind::from_tag(cap.get(1)?.as_str())?;
            Some(Cell {
                kind,
                text: strip_markup(cap.get(2).map_or("", |m| m.as_str())),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect();

    cells
        .windows(2)
        .filter_map(|pair| {
            let (label, value) = (&pair[0], &pair[1]);
            if !label.kind.pairs_with(value.kind) {
                return None;
            }
            // Only whitespace may separate the two cells.
            if !html[label.end..value.start].trim().is_empty() {
                return None;
            }
            if label.text.is_empty() || value.text.is_empty() {
                return None;
            }
            Some(LabeledPair {
                label: label.text.to_lowercase(),
                value: value.text.clone(),
            })
        })
        .collect()
}

fn value_for_field(field: SpecField, pairs: &[LabeledPair]) -> Option<String> {
    for keyword in field.keywords() {
        for pair in pairs.iter().filter(|p| contains_keyword(&p.label, keyword)) {
            if field != SpecField::Suction {
                return Some(pair.value.clone());
            }
            if let Some(canonical) = canonicalize_suction(&pair.value) {
                return Some(canonical);
            }
        }
    }
    None
}
