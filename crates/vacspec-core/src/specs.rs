//! Specification fields, product identity, and extraction results.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One of the four specification attributes resolved for a robot vacuum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecField {
    /// Charging / dock station type.
    Base,
    /// Mapping technology.
    Navigation,
    /// Suction power, canonical unit `Pa`.
    Suction,
    /// Mopping mechanism.
    MopType,
}

impl SpecField {
    /// All fields in resolution order.
    pub const ALL: [SpecField; 4] = [
        SpecField::Base,
        SpecField::Navigation,
        SpecField::Suction,
        SpecField::MopType,
    ];

    /// Lookup keywords and synonyms shared by every extractor. Order matters:
    /// the first keyword that matches wins.
    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            SpecField::Base => &[
                "dock",
                "base",
                "station",
                "charging dock",
                "self-empty",
                "wash",
                "dry",
            ],
            SpecField::Navigation => &[
                "navigation",
                "mapping",
                "lidar",
                "laser",
                "camera",
                "vslam",
                "gyro",
            ],
            SpecField::Suction => &["suction", "suction power", "pa"],
            SpecField::MopType => &["mop", "mopping", "mop type", "pad", "spin"],
        }
    }

    /// Wire name, matching the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SpecField::Base => "base",
            SpecField::Navigation => "navigation",
            SpecField::Suction => "suction",
            SpecField::MopType => "mopType",
        }
    }
}

impl std::fmt::Display for SpecField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a product as supplied by the caller. Only used to build
/// search queries and cache keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdentity {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub asin: Option<String>,
}

impl ProductIdentity {
    /// Brand with surrounding whitespace removed; `None` when blank.
    #[must_use]
    pub fn brand(&self) -> Option<&str> {
        non_blank(self.brand.as_deref())
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        non_blank(self.model.as_deref())
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    #[must_use]
    pub fn ean(&self) -> Option<&str> {
        non_blank(self.ean.as_deref())
    }

    #[must_use]
    pub fn asin(&self) -> Option<&str> {
        non_blank(self.asin.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Strings pass through and numbers (e.g. an EAN sent as a JSON number) are
/// stringified. Any other shape, `null` included, reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// A list of strings, tolerating `null`, a bare string, and non-string items
/// (which are dropped).
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Caller-facing resolution request: a product identity plus retailer URLs
/// already known for it (e.g. resolved shopping links).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecRequest {
    #[serde(flatten)]
    pub identity: ProductIdentity,
    #[serde(
        default,
        deserialize_with = "lenient_string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub hint_urls: Vec<String>,
}

impl From<ProductIdentity> for SpecRequest {
    fn from(identity: ProductIdentity) -> Self {
        Self {
            identity,
            hint_urls: Vec::new(),
        }
    }
}

/// Resolved values, one optional string per [`SpecField`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mop_type: Option<String>,
}

impl SpecValues {
    #[must_use]
    pub fn get(&self, field: SpecField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    fn slot(&self, field: SpecField) -> &Option<String> {
        match field {
            SpecField::Base => &self.base,
            SpecField::Navigation => &self.navigation,
            SpecField::Suction => &self.suction,
            SpecField::MopType => &self.mop_type,
        }
    }

    fn slot_mut(&mut self, field: SpecField) -> &mut Option<String> {
        match field {
            SpecField::Base => &mut self.base,
            SpecField::Navigation => &mut self.navigation,
            SpecField::Suction => &mut self.suction,
            SpecField::MopType => &mut self.mop_type,
        }
    }

    /// Stores `value` only if the field is still empty and the value is not
    /// blank. Returns `true` when the value was taken.
    pub fn set_if_absent(&mut self, field: SpecField, value: impl Into<String>) -> bool {
        let slot = self.slot_mut(field);
        if slot.is_some() {
            return false;
        }
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return false;
        }
        *slot = Some(trimmed.to_string());
        true
    }

    /// Fills every empty field from `other`; populated fields are never replaced.
    pub fn fill_missing_from(&mut self, other: &SpecValues) {
        for field in SpecField::ALL {
            if let Some(value) = other.get(field) {
                self.set_if_absent(field, value);
            }
        }
    }

    #[must_use]
    pub fn has_any(&self) -> bool {
        SpecField::ALL.iter().any(|f| self.get(*f).is_some())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        SpecField::ALL.iter().all(|f| self.get(*f).is_some())
    }

    /// Fields that are still unresolved.
    #[must_use]
    pub fn missing(&self) -> Vec<SpecField> {
        SpecField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }
}

/// Human-readable evidence snippets per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecDetails {
    #[serde(rename = "baseDetails", default, skip_serializing_if = "Vec::is_empty")]
    pub base: Vec<String>,
    #[serde(
        rename = "navigationDetails",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub navigation: Vec<String>,
    #[serde(
        rename = "suctionDetails",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub suction: Vec<String>,
    #[serde(
        rename = "mopTypeDetails",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub mop_type: Vec<String>,
}

impl SpecDetails {
    #[must_use]
    pub fn get(&self, field: SpecField) -> &[String] {
        match field {
            SpecField::Base => &self.base,
            SpecField::Navigation => &self.navigation,
            SpecField::Suction => &self.suction,
            SpecField::MopType => &self.mop_type,
        }
    }

    pub fn set(&mut self, field: SpecField, snippets: Vec<String>) {
        let slot = match field {
            SpecField::Base => &mut self.base,
            SpecField::Navigation => &mut self.navigation,
            SpecField::Suction => &mut self.suction,
            SpecField::MopType => &mut self.mop_type,
        };
        *slot = snippets;
    }

    /// Copies snippet lists from `other` for fields that have none yet.
    pub fn fill_missing_from(&mut self, other: &SpecDetails) {
        for field in SpecField::ALL {
            if self.get(field).is_empty() && !other.get(field).is_empty() {
                self.set(field, other.get(field).to_vec());
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        SpecField::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

/// Outcome of one resolution: values plus provenance and evidence.
///
/// An all-empty result is a normal outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    #[serde(flatten)]
    pub values: SpecValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_domain: Option<String>,
    #[serde(flatten)]
    pub details: SpecDetails,
}

impl ExtractionResult {
    #[must_use]
    pub fn has_any(&self) -> bool {
        self.values.has_any()
    }
}

/// Merges two partial results where `primary` (hints or manufacturer tier)
/// takes precedence over `secondary`.
///
/// A defined field is never replaced, neither by an undefined one nor by a
/// secondary value. Secondary values, their snippets, and its provenance
/// only fill what `primary` lacks.
#[must_use]
pub fn merge_preferring(primary: ExtractionResult, secondary: ExtractionResult) -> ExtractionResult {
    let mut merged = primary;
    merged.values.fill_missing_from(&secondary.values);
    merged.details.fill_missing_from(&secondary.details);
    if merged.source_url.is_none() {
        merged.source_url = secondary.source_url;
        merged.source_domain = secondary.source_domain;
    }
    merged
}
