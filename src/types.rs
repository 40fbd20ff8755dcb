use serde::{Deserialize, Serialize};

/// A person record as stored in Airtable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Record identifier assigned by Airtable. Never client-generated.
    pub id: String,
    pub fields: PersonFields,
}

/// The fields of a person record, using the Airtable column names on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonFields {
    /// Human-friendly 8-character token generated at creation time.
    /// Not used for lookup.
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,

    #[serde(rename = "Vorname", default)]
    pub first_name: String,

    #[serde(rename = "Nachname", default)]
    pub last_name: String,

    #[serde(rename = "Sterne", default)]
    pub stars: u32,

    /// Newline-delimited rating history, newest entry first.
    #[serde(rename = "LOG", default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

impl PersonFields {
    /// Full display name ("Vorname Nachname"), trimmed.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Clamp a star value into `0..=max`.
pub fn clamp_stars(stars: u32, max: u32) -> u32 {
    stars.min(max)
}

/// Coerce a loosely-typed rating value to a number, defaulting to 0.
///
/// Accepts JSON numbers and numeric strings; anything else (missing, null,
/// negative, fractional garbage) becomes 0.
pub fn coerce_stars(value: Option<&serde_json::Value>) -> u32 {
    match value {
        Some(serde_json::Value::Number(n)) => {
            n.as_u64().map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX))
        }
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
