//! Key/value extraction from XML documents.
//!
//! Keys are element names. A lookup scans every element below the root
//! element in document order; the root element itself is never a candidate.
//! Element names are compared by local name, so a default namespace
//! (`xmlns="..."`) or a prefix does not hide an element.

use crate::casefold::eq_ignore_case;
use crate::error::ExtractError;
use roxmltree::{Document, Node};

/// Looks up version keys in document text.
///
/// `exists` and `value` are separate calls so callers can tell a missing key
/// apart from a key whose value is empty.
pub trait KeyValueExtractor: Send + Sync {
    /// Whether an element named `key` appears below the root element.
    fn exists(&self, document: &str, key: &str, case_sensitive: bool)
        -> Result<bool, ExtractError>;

    /// Text content of the first element named `key`.
    ///
    /// Fails with [`ExtractError::NoSuchElement`] when there is none.
    fn value(&self, document: &str, key: &str, case_sensitive: bool)
        -> Result<String, ExtractError>;
}

/// [`KeyValueExtractor`] for XML documents such as C# project files.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlExtractor;

impl XmlExtractor {
    pub fn new() -> Self {
        XmlExtractor
    }
}

fn name_matches(node: &Node<'_, '_>, key: &str, case_sensitive: bool) -> bool {
    let name = node.tag_name().name();
    if case_sensitive {
        name == key
    } else {
        eq_ignore_case(name, key)
    }
}

fn find_element<'a, 'input>(
    doc: &'a Document<'input>,
    key: &str,
    case_sensitive: bool,
) -> Option<Node<'a, 'input>> {
    doc.root_element()
        .descendants()
        .skip(1)
        .filter(Node::is_element)
        .find(|node| name_matches(node, key, case_sensitive))
}

/// Concatenated text of every text node under `node`, untrimmed.
fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

impl KeyValueExtractor for XmlExtractor {
    fn exists(
        &self,
        document: &str,
        key: &str,
        case_sensitive: bool,
    ) -> Result<bool, ExtractError> {
        let doc = Document::parse(document)?;
        Ok(find_element(&doc, key, case_sensitive).is_some())
    }

    fn value(
        &self,
        document: &str,
        key: &str,
        case_sensitive: bool,
    ) -> Result<String, ExtractError> {
        let doc = Document::parse(document)?;
        find_element(&doc, key, case_sensitive)
            .map(text_content)
            .ok_or_else(|| ExtractError::NoSuchElement(key.to_string()))
    }
}
