//! Candidate version key list parsing.

/// Ordered list of element names that may hold the version.
///
/// Order is significant: the first key with a non-empty value wins.
/// Duplicates are kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionKeys(Vec<String>);

impl VersionKeys {
    /// Split a comma-separated list, trimming entries and dropping blanks.
    ///
    /// `"A,, B ,"` parses to `["A", "B"]`. No case normalization happens here.
    pub fn parse(raw: &str) -> Self {
        VersionKeys(
            raw.split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for VersionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

impl<'a> IntoIterator for &'a VersionKeys {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
