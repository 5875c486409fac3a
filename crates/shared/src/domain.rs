use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::error::NavigationError;

const FRAGMENT_PREFIX: &str = "screen";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ScreenId {
    Search,
    Form,
    Review,
    Confirmation,
}

impl ScreenId {
    pub const ALL: [ScreenId; 4] = [
        ScreenId::Search,
        ScreenId::Form,
        ScreenId::Review,
        ScreenId::Confirmation,
    ];

    pub fn number(self) -> u8 {
        match self {
            ScreenId::Search => 1,
            ScreenId::Form => 2,
            ScreenId::Review => 3,
            ScreenId::Confirmation => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|screen| screen.number() == number)
    }

    /// Location fragment mirroring this screen, e.g. `#screen2`.
    pub fn fragment(self) -> String {
        format!("#{FRAGMENT_PREFIX}{}", self.number())
    }

    /// Parses a navigation token reported by the host history mechanism.
    ///
    /// Accepts `#screen<N>`, `screen<N>` and a bare `<N>`. Anything that does
    /// not name one of the four known screens is rejected.
    pub fn parse_token(token: &str) -> Result<Self, NavigationError> {
        let trimmed = token.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let digits = digits.strip_prefix(FRAGMENT_PREFIX).unwrap_or(digits);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NavigationError::MalformedToken(token.to_string()));
        }

        digits
            .parse::<u8>()
            .ok()
            .and_then(Self::from_number)
            .ok_or_else(|| NavigationError::UnknownScreen(token.to_string()))
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenId::Search => "search",
            ScreenId::Form => "form",
            ScreenId::Review => "review",
            ScreenId::Confirmation => "confirmation",
        };
        write!(f, "{name}")
    }
}

impl From<ScreenId> for u8 {
    fn from(value: ScreenId) -> Self {
        value.number()
    }
}

impl TryFrom<u8> for ScreenId {
    type Error = NavigationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or_else(|| NavigationError::UnknownScreen(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub code: String,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Field-key to raw-value pairs in the order the form lists them.
///
/// Serializes as a JSON object and keeps key order on the way back in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationEntries(Vec<(String, String)>);

impl DonationEntries {
    /// Replaces the value of an existing key in place, otherwise appends.
    pub fn insert(&mut self, key: String, value: String) {
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Serialize for DonationEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DonationEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = DonationEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of donation field keys to string amounts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = DonationEntries::default();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    entries.insert(key, value);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Donation amounts captured at the last aggregation pass.
///
/// Per-field values stay as the raw strings the user typed; `total` is the
/// numeric sum and is written into the same JSON object as the fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(flatten)]
    pub fields: DonationEntries,
}

impl AggregatedFields {
    pub const TOTAL_KEY: &'static str = "total";

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when there is nothing to submit.
    pub fn has_no_donation(&self) -> bool {
        self.total.map_or(true, |total| total == 0.0)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.total = None;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_screen: ScreenId,
    pub selected_entity: String,
    pub aggregated_fields: AggregatedFields,
    pub navigation_history: Vec<ScreenId>,
    pub captured_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(captured_at: DateTime<Utc>) -> Self {
        Self {
            current_screen: ScreenId::Search,
            selected_entity: String::new(),
            aggregated_fields: AggregatedFields::default(),
            navigation_history: vec![ScreenId::Search],
            captured_at,
        }
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_entity.is_empty()
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.captured_at) >= ttl
    }
}
