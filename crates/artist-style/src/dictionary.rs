//! The name to style mapping served by the proxy and consumed by the matchers.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StyleError, StyleResult};
use crate::normalize::normalize_name;

/// Advisory bookkeeping for a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    /// Epoch milliseconds of the last write.
    pub timestamp: i64,
    /// ISO-8601 form of the same instant.
    pub last_modified: String,
}

impl EntryMetadata {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.timestamp_millis(),
            last_modified: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Snapshot of the artist dictionary.
///
/// Keys are display names with their original casing. No two keys share a
/// normalized form; [`StyleDictionary::upsert`] keeps it that way by reusing
/// the existing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDictionary {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub artists: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, EntryMetadata>,
}

fn default_enabled() -> bool {
    true
}

impl Default for StyleDictionary {
    fn default() -> Self {
        Self {
            enabled: true,
            artists: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }
}

impl StyleDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            artists: entries
                .into_iter()
                .map(|(name, style)| (name.into(), style.into()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    /// Existing display name that normalizes the same as `name`.
    pub fn find_key(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.artists.get_key_value(name) {
            return Some(key.as_str());
        }
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.artists
            .keys()
            .find(|key| normalize_name(key) == wanted)
            .map(String::as_str)
    }

    /// Style for `name`, compared in normalized form.
    pub fn style_for(&self, name: &str) -> Option<&str> {
        let key = self.find_key(name)?;
        self.artists.get(key).map(String::as_str)
    }

    /// Inserts or updates an entry and returns the key actually written.
    pub fn upsert(&mut self, name: &str, style: &str, now: DateTime<Utc>) -> StyleResult<String> {
        let name = name.trim();
        let style = style.trim();
        if name.is_empty() || style.is_empty() {
            return Err(StyleError::InvalidInput(
                "Name and style are required".to_string(),
            ));
        }
        let key = self
            .find_key(name)
            .map(str::to_string)
            .unwrap_or_else(|| name.to_string());
        self.artists.insert(key.clone(), style.to_string());
        self.metadata.insert(key.clone(), EntryMetadata::at(now));
        Ok(key)
    }

    /// Removes the entry matching `name` and returns the removed key.
    pub fn remove(&mut self, name: &str) -> StyleResult<String> {
        let key = self
            .find_key(name)
            .map(str::to_string)
            .ok_or_else(|| StyleError::NotFound("Artist not found".to_string()))?;
        self.artists.remove(&key);
        self.metadata.remove(&key);
        Ok(key)
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Bulk upload. Returns how many entries were written.
    pub fn merge<I, K, V>(&mut self, entries: I, now: DateTime<Utc>) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut written = 0;
        for (name, style) in entries {
            match self.upsert(name.as_ref(), style.as_ref(), now) {
                Ok(_) => written += 1,
                Err(error) => {
                    tracing::warn!("skipping bulk entry {:?}: {error}", name.as_ref());
                }
            }
        }
        written
    }

    pub fn clear(&mut self) {
        self.artists.clear();
        self.metadata.clear();
    }

    /// Entries ordered longest display name first.
    pub fn entries_longest_first(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .artists
            .iter()
            .map(|(name, style)| (name.as_str(), style.as_str()))
            .collect();
        entries.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid date")
    }

    #[test]
    fn parses_server_payload_without_metadata() {
        let dict: StyleDictionary = serde_json::from_value(json!({
            "enabled": false,
            "artists": { "Billy Joel": "Piano Rock" }
        }))
        .expect("parse");
        assert!(!dict.enabled);
        assert_eq!(dict.style_for("billy joel"), Some("Piano Rock"));
        assert!(dict.metadata.is_empty());
    }

    #[test]
    fn missing_enabled_defaults_to_true() {
        let dict: StyleDictionary =
            serde_json::from_value(json!({ "artists": {} })).expect("parse");
        assert!(dict.enabled);
    }

    #[test]
    fn upsert_reuses_normalized_key() {
        let mut dict = StyleDictionary::new();
        let first = dict.upsert("Beyoncé", "R&B", fixed_now()).expect("insert");
        let second = dict.upsert("beyonce", "Pop R&B", fixed_now()).expect("update");
        assert_eq!(first, "Beyoncé");
        assert_eq!(second, "Beyoncé");
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.style_for("BEYONCE"), Some("Pop R&B"));
        let meta = dict.metadata.get("Beyoncé").expect("metadata");
        assert_eq!(meta.timestamp, fixed_now().timestamp_millis());
        assert_eq!(meta.last_modified, "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn upsert_rejects_blank_fields() {
        let mut dict = StyleDictionary::new();
        let error = dict.upsert("  ", "Rock", fixed_now()).expect_err("blank name");
        assert!(matches!(error, StyleError::InvalidInput(_)));
        assert!(dict.upsert("Adele", "", fixed_now()).is_err());
    }

    #[test]
    fn remove_uses_normalized_lookup() {
        let mut dict = StyleDictionary::with_entries([("Guns N' Roses", "Hard Rock")]);
        assert_eq!(dict.remove("guns n roses").expect("remove"), "Guns N' Roses");
        assert!(dict.is_empty());
        assert!(matches!(dict.remove("Adele"), Err(StyleError::NotFound(_))));
    }

    #[test]
    fn merge_skips_invalid_entries() {
        let mut dict = StyleDictionary::with_entries([("Adele", "Soul")]);
        let written = dict.merge(
            [("ADELE", "Soul, Piano"), ("Drake", "Hip Hop"), ("", "Nothing")],
            fixed_now(),
        );
        assert_eq!(written, 2);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.style_for("adele"), Some("Soul, Piano"));
    }

    #[test]
    fn clear_keeps_enabled_flag() {
        let mut dict = StyleDictionary::with_entries([("Adele", "Soul")]);
        dict.toggle();
        dict.clear();
        assert!(dict.is_empty());
        assert!(!dict.enabled);
    }

    #[test]
    fn orders_longest_first() {
        let dict = StyleDictionary::with_entries([("Billy", "B"), ("Billy Joel", "BJ"), ("Sia", "S")]);
        let names: Vec<&str> = dict.entries_longest_first().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Billy Joel", "Billy", "Sia"]);
    }
}
