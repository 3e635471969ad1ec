//! Alias table: canonical place names and their abbreviations.

use std::collections::HashMap;

use tracing::debug;

use super::normalize::normalize_name;

/// Abbreviations every table starts with.
///
/// `Saint` only maps one way: `st` resolves to `saint`, never back.
const BUILT_IN: &[(&str, &[&str])] = &[
    ("Charing Cross", &["CX", "CHX"]),
    ("Battersea Power Station", &["Battersea"]),
    ("Tottenham Court Road", &["TCR"]),
    ("King's Cross St. Pancras", &["KX"]),
    ("Elephant & Castle", &["E&C"]),
    ("Saint", &["St"]),
];

/// Bidirectional mapping between canonical names and abbreviations.
///
/// Keys are normalized with [`normalize_name`]; abbreviations keep the
/// spelling they were given in for display. Every abbreviation belongs to
/// exactly one canonical name.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    /// Normalized canonical name → display abbreviations, in insertion order.
    canonical_to_abbrevs: HashMap<String, Vec<String>>,
    /// Normalized abbreviation → normalized canonical name.
    abbrev_to_canonical: HashMap<String, String>,
}

impl AliasTable {
    /// Build a table from the built-in abbreviations plus `overrides`.
    ///
    /// `overrides` has the form `name=abbrev1,abbrev2;name2=abbrev3`.
    /// Malformed entries are skipped. When an abbreviation is already owned
    /// by a different name, the override takes it over.
    pub fn build(overrides: Option<&str>) -> Self {
        let mut table = Self::empty();
        for (name, abbrevs) in BUILT_IN {
            for abbrev in *abbrevs {
                table.insert(name, abbrev);
            }
        }
        if let Some(overrides) = overrides {
            table.apply_overrides(overrides);
        }
        table
    }

    /// A table with no entries at all.
    pub fn empty() -> Self {
        Self::default()
    }

    fn apply_overrides(&mut self, overrides: &str) {
        for entry in overrides.split(';') {
            let Some((name, abbrevs)) = entry.split_once('=') else {
                if !entry.trim().is_empty() {
                    debug!(entry, "skipping alias override without '='");
                }
                continue;
            };
            for abbrev in abbrevs.split(',') {
                self.insert(name, abbrev);
            }
        }
    }

    /// Register `abbrev` as an abbreviation of `name`.
    fn insert(&mut self, name: &str, abbrev: &str) {
        let canonical = normalize_name(name);
        let abbrev = abbrev.trim();
        let key = normalize_name(abbrev);
        if canonical.is_empty() || key.is_empty() || key == canonical {
            return;
        }

        if let Some(previous) = self.abbrev_to_canonical.get(&key)
            && *previous != canonical
        {
            debug!(abbrev, from = %previous, to = %canonical, "alias reassigned");
            if let Some(list) = self.canonical_to_abbrevs.get_mut(previous) {
                list.retain(|a| normalize_name(a) != key);
            }
        }

        let list = self.canonical_to_abbrevs.entry(canonical.clone()).or_default();
        if !list.iter().any(|a| normalize_name(a) == key) {
            list.push(abbrev.to_string());
        }
        self.abbrev_to_canonical.insert(key, canonical);
    }

    /// Map an abbreviation to its normalized canonical name.
    ///
    /// Unknown tokens are returned unchanged.
    pub fn resolve_to_canonical(&self, token: &str) -> String {
        self.abbrev_to_canonical
            .get(&normalize_name(token))
            .cloned()
            .unwrap_or_else(|| token.to_string())
    }

    /// The comparison key for a place name: normalized, with abbreviations
    /// replaced by their canonical names.
    ///
    /// The whole name is looked up first, then each word on its own
    /// (so `"St John's Wood"` becomes `"saint johns wood"`).
    pub fn canonical_key(&self, name: &str) -> String {
        let normalized = normalize_name(name);
        if self.canonical_to_abbrevs.contains_key(&normalized) {
            return normalized;
        }
        if let Some(canonical) = self.abbrev_to_canonical.get(&normalized) {
            return canonical.clone();
        }

        let words: Vec<&str> = normalized
            .split(' ')
            .map(|word| {
                self.abbrev_to_canonical
                    .get(word)
                    .map(String::as_str)
                    .unwrap_or(word)
            })
            .collect();
        let rewritten = words.join(" ");

        match self.abbrev_to_canonical.get(&rewritten) {
            Some(canonical) => canonical.clone(),
            None => rewritten,
        }
    }

    /// Whether two names refer to the same place.
    pub fn same_place(&self, a: &str, b: &str) -> bool {
        self.canonical_key(a) == self.canonical_key(b)
    }

    /// The shortest known abbreviation for `name`, or `name` itself.
    ///
    /// Ties between equally short abbreviations go to the alphabetically
    /// first one.
    pub fn expand_for_display(&self, name: &str) -> String {
        self.abbreviations(name)
            .iter()
            .min_by(|a, b| a.chars().count().cmp(&b.chars().count()).then(a.cmp(b)))
            .cloned()
            .unwrap_or_else(|| name.trim().to_string())
    }

    /// Display abbreviations registered for a name or any of its aliases.
    pub fn abbreviations(&self, name: &str) -> &[String] {
        self.canonical_to_abbrevs
            .get(&self.canonical_key(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
