//! Station and destination name normalization.

/// Trailing words TfL appends to stop names, removed before comparison.
const STOP_SUFFIXES: [&str; 4] = [
    " underground station",
    " dlr station",
    " rail station",
    " station",
];

/// Normalize a place name for comparison.
///
/// Lowercases, deletes apostrophes, turns any other punctuation except `&`
/// into a space, collapses whitespace and strips trailing
/// `underground station` / `station` suffixes.
///
/// # Examples
///
/// ```
/// use tube_timing::aliases::normalize_name;
///
/// assert_eq!(
///     normalize_name("Tottenham Court Road Underground Station"),
///     "tottenham court road"
/// );
/// assert_eq!(normalize_name("Regent's Park"), "regents park");
/// assert_eq!(normalize_name("Totteridge & Whetstone"), "totteridge & whetstone");
/// ```
pub fn normalize_name(value: &str) -> String {
    let mut spaced = String::with_capacity(value.len());
    for c in value.chars().flat_map(char::to_lowercase) {
        match c {
            '\'' | '\u{2019}' => {}
            '&' => spaced.push_str(" & "),
            c if c.is_alphanumeric() => spaced.push(c),
            _ => spaced.push(' '),
        }
    }

    let mut text = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

    while let Some(stripped) = STOP_SUFFIXES
        .iter()
        .find_map(|suffix| text.strip_suffix(suffix))
        .filter(|rest| !rest.is_empty())
    {
        text = stripped.to_string();
    }

    text
}

/// Drop the `Underground Station` suffix TfL puts on destinations,
/// keeping the original casing for display.
pub fn compact_destination(value: &str) -> String {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    let cut = lower
        .strip_suffix("underground station")
        .map(|rest| rest.trim_end().len())
        .filter(|len| *len > 0)
        .unwrap_or(trimmed.len());
    trimmed[..cut].split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split `"Edgware via Charing Cross"` into destination and via parts.
pub fn split_via(value: &str) -> (&str, Option<&str>) {
    let lower = value.to_ascii_lowercase();
    match lower.find(" via ") {
        Some(pos) => {
            let destination = value[..pos].trim();
            let via = value[pos + " via ".len()..].trim();
            if via.is_empty() {
                (destination, None)
            } else {
                (destination, Some(via))
            }
        }
        None => (value.trim(), None),
    }
}
