//! Station resolution.
//!
//! Picks one stop out of the provider's search results for a free-text
//! query, preferring an exact (alias-aware) name match over the provider's
//! own relevance ranking.

use tracing::debug;

use crate::aliases::{AliasTable, normalize_name};
use crate::domain::{NoStationFound, Station};

/// The stop chosen for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationMatch {
    pub station: Station,
    /// False when we fell back to an acronym or the provider's top result;
    /// callers should tell the user which stop was used.
    pub matched_exactly: bool,
}

/// Choose the best candidate for `query`.
///
/// # Algorithm
///
/// 1. First candidate whose canonical name equals the query's.
/// 2. First candidate whose word initials spell the query (`"OC"`).
/// 3. The first candidate (providers rank by relevance).
///
/// Only step 1 counts as an exact match.
pub fn resolve_station(
    query: &str,
    candidates: &[Station],
    aliases: &AliasTable,
) -> Result<StationMatch, NoStationFound> {
    let first = candidates.first().ok_or_else(|| NoStationFound {
        query: query.to_string(),
    })?;

    let wanted = aliases.canonical_key(query);
    if let Some(station) = candidates
        .iter()
        .find(|c| aliases.canonical_key(&c.canonical_name) == wanted)
    {
        return Ok(StationMatch {
            station: station.clone(),
            matched_exactly: true,
        });
    }

    let token: String = query
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    if !token.is_empty()
        && let Some(station) = candidates
            .iter()
            .find(|c| initials(&c.canonical_name).as_deref() == Some(token.as_str()))
    {
        debug!(query, station = %station.canonical_name, "matched station by initials");
        return Ok(StationMatch {
            station: station.clone(),
            matched_exactly: false,
        });
    }

    Ok(StationMatch {
        station: first.clone(),
        matched_exactly: false,
    })
}

/// First letters of each word in a multi-word name.
fn initials(name: &str) -> Option<String> {
    let normalized = normalize_name(name);
    let words: Vec<&str> = normalized.split(' ').filter(|w| *w != "&").collect();
    if words.len() < 2 {
        return None;
    }
    Some(words.iter().filter_map(|w| w.chars().next()).collect())
}
