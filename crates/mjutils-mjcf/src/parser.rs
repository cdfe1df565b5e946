//! MJCF text → [`Element`] tree.
//!
//! Only element structure and attributes are kept.  Comments, processing
//! instructions and whitespace between elements carry no meaning in MJCF and
//! are dropped.

use std::path::Path;

use mjutils_types::MjError;
use tracing::debug;

use crate::element::Element;

/// Parse an MJCF document held in memory and return its root element.
pub fn parse_str(xml: &str) -> Result<Element, MjError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| MjError::Parse(e.to_string()))?;
    Ok(convert(doc.root_element()))
}

/// Read and parse an MJCF file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Element, MjError> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path).map_err(|e| MjError::io(path, e))?;
    debug!(path = %path.display(), bytes = xml.len(), "parsing MJCF file");
    parse_str(&xml)
}

fn convert(node: roxmltree::Node<'_, '_>) -> Element {
    let mut element = Element::new(node.tag_name().name());
    for attr in node.attributes() {
        element.set_raw(attr.name(), attr.value());
    }
    for child in node.children().filter(|n| n.is_element()) {
        element.push_child(convert(child));
    }
    element
}
