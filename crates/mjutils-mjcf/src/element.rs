//! The in-memory MJCF element tree.
//!
//! An [`Element`] owns its tag, an ordered attribute list and its child
//! elements.  Attribute values are either free text or a list of numbers so
//! that floating point quantities can be re-formatted on export.

use mjutils_types::MjError;

/// Attribute keys whose values are names or references, never quantities.
/// A model may name a body `"1"`; that must not be treated as a number.
const TEXT_KEYS: &[&str] = &[
    "name", "class", "childclass", "model", "file", "type", "joint", "joint1", "joint2",
    "jointinparent", "body", "body1", "body2", "site", "site1", "site2", "geom", "geom1",
    "geom2", "mesh", "material", "texture", "hfield", "skin", "tendon", "tendon1", "tendon2",
    "actuator", "objname", "refname", "target", "slidersite", "cranksite", "prefix",
];

/// The value of a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Free text, kept verbatim.
    Text(String),
    /// One or more floating point numbers, re-formatted on export.
    Numbers(Vec<f64>),
}

impl AttrValue {
    /// Classify a raw attribute string.
    ///
    /// A value becomes [`AttrValue::Numbers`] when every whitespace-separated
    /// token is a number and at least one token is not a plain integer.
    /// Integer-only values (counts, flags, indices) stay text so they are
    /// written back untouched.
    pub fn parse(key: &str, raw: &str) -> Self {
        if TEXT_KEYS.contains(&key) {
            return Self::Text(raw.to_string());
        }
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.is_empty() {
            return Self::Text(raw.to_string());
        }
        let numbers: Option<Vec<f64>> = tokens.iter().map(|t| t.parse::<f64>().ok()).collect();
        let is_float = tokens.iter().any(|t| t.parse::<i64>().is_err());
        match numbers {
            Some(values) if is_float => Self::Numbers(values),
            _ => Self::Text(raw.to_string()),
        }
    }

    /// Numeric view of the value: numbers as-is, text parsed on demand.
    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        match self {
            AttrValue::Numbers(values) => Some(values.clone()),
            AttrValue::Text(raw) => raw
                .split_whitespace()
                .map(|t| t.parse::<f64>().ok())
                .collect(),
        }
    }
}

/// A single MJCF element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    attributes: Vec<(String, AttrValue)>,
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style text attribute.
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_raw(key, value);
        self
    }

    /// Builder-style child.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    // ── attributes ──────────────────────────────────────────────────────────

    /// All attributes in document order.
    pub fn attributes(&self) -> &[(String, AttrValue)] {
        &self.attributes
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    /// The attribute as text, only when it is stored as text.
    pub fn text_attr(&self, key: &str) -> Option<&str> {
        match self.attr(key)? {
            AttrValue::Text(s) => Some(s.as_str()),
            AttrValue::Numbers(_) => None,
        }
    }

    /// The `name` attribute.
    pub fn name(&self) -> Option<&str> {
        self.text_attr("name")
    }

    /// Parse the attribute as a list of numbers.
    ///
    /// Returns `Ok(None)` when the attribute is absent and
    /// [`MjError::InvalidAttribute`] when it is present but not numeric.
    pub fn numbers(&self, key: &str) -> Result<Option<Vec<f64>>, MjError> {
        match self.attr(key) {
            None => Ok(None),
            Some(value) => value.as_numbers().map(Some).ok_or_else(|| {
                MjError::InvalidAttribute {
                    element: self.tag.clone(),
                    attribute: key.to_string(),
                    details: "expected a list of numbers".to_string(),
                }
            }),
        }
    }

    /// Parse the attribute as exactly `N` numbers.
    pub fn fixed<const N: usize>(&self, key: &str) -> Result<Option<[f64; N]>, MjError> {
        match self.numbers(key)? {
            None => Ok(None),
            Some(values) => {
                let arr: [f64; N] =
                    values
                        .try_into()
                        .map_err(|v: Vec<f64>| MjError::InvalidAttribute {
                            element: self.tag.clone(),
                            attribute: key.to_string(),
                            details: format!("expected {} numbers, got {}", N, v.len()),
                        })?;
                Ok(Some(arr))
            }
        }
    }

    /// Set an attribute from its raw string form, classifying it like the
    /// parser does.
    pub fn set_raw(&mut self, key: &str, raw: &str) {
        self.set_value(key, AttrValue::parse(key, raw));
    }

    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        self.set_value(key, AttrValue::Text(value.into()));
    }

    pub fn set_numbers(&mut self, key: &str, values: &[f64]) {
        self.set_value(key, AttrValue::Numbers(values.to_vec()));
    }

    /// Insert or replace an attribute, keeping its original position.
    pub fn set_value(&mut self, key: &str, value: AttrValue) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, key: &str) -> Option<AttrValue> {
        let idx = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(idx).1)
    }

    /// Keep only the attributes for which `keep` returns `true`.
    pub fn retain_attrs(&mut self, mut keep: impl FnMut(&str, &AttrValue) -> bool) {
        self.attributes.retain(|(k, v)| keep(k, v));
    }

    // ── children ────────────────────────────────────────────────────────────

    /// First direct child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn child_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.tag == tag)
    }

    /// Direct children with the given tag.
    pub fn children_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Pre-order traversal of every element below `self` (excluding `self`).
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// First descendant (or `self`) with matching tag and name.
    pub fn find(&self, tag: &str, name: &str) -> Option<&Element> {
        if self.tag == tag && self.name() == Some(name) {
            return Some(self);
        }
        self.descendants()
            .find(|e| e.tag == tag && e.name() == Some(name))
    }

    pub fn find_mut(&mut self, tag: &str, name: &str) -> Option<&mut Element> {
        if self.tag == tag && self.name() == Some(name) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_mut(tag, name))
    }

    /// Child-index path from `self` to the first element matching `pred`.
    ///
    /// An empty path designates `self`.
    pub fn path_to(&self, pred: &impl Fn(&Element) -> bool) -> Option<Vec<usize>> {
        if pred(self) {
            return Some(Vec::new());
        }
        for (i, child) in self.children.iter().enumerate() {
            if let Some(mut rest) = child.path_to(pred) {
                rest.insert(0, i);
                return Some(rest);
            }
        }
        None
    }

    /// Element reached by following a child-index path.
    pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |node, &i| node.children.get(i))
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        path.iter()
            .try_fold(self, |node, &i| node.children.get_mut(i))
    }
}

/// Iterator returned by [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}
