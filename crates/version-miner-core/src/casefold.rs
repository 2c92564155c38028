//! Case-insensitive string helpers.
//!
//! Comparison folds each `char` through its lowercase mapping, so non-ASCII
//! names compare the same way ASCII ones do. This is lowercase folding, not
//! uppercase ordinal comparison: the two differ only for a few code points
//! whose upper and lower mappings are not inverses (dotless `ı`, `ſ`, the
//! Kelvin sign).

/// Compare two strings ignoring case.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Strip `prefix` from the start of `value` ignoring case.
///
/// Returns the remainder of `value` when it starts with `prefix`, and `None`
/// otherwise. An empty prefix never matches.
pub fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }

    let mut rest = value.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = rest.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }

    let offset = rest.next().map(|(i, _)| i).unwrap_or(value.len());
    Some(&value[offset..])
}
