//! Minimal element tree over `quick-xml` events.
//!
//! Only what the API documents need: element names, attributes, text content
//! and child order. Namespaces, processing instructions and comments are
//! dropped.

use crate::error::{EveApiError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Deepest element nesting accepted by [`Document::parse`]. Walking the tree
/// (drop, clone, row mapping) recurses once per level.
pub const MAX_DEPTH: usize = 1024;

/// One XML element with its attributes, text and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Element name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by exact name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Direct children in document order
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Direct children with a given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First direct child with a given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Trimmed text of the first direct child with a given name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(Element::text)
    }

    /// Trimmed text content directly inside this element
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Check if this element has any child elements
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// All descendants in document order, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(self)
    }

    /// First element named `name`, searching `self` and then its descendants
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.descendants()
            .map(|(_, el)| el)
            .find(|el| el.name == name)
    }

    /// Follow a path of child names from `self`
    pub fn at_path(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, name| el.child(name))
    }
}

/// Pre-order walk yielding `(parent, element)` pairs
pub struct Descendants<'a> {
    stack: Vec<(&'a Element, &'a Element)>,
}

impl<'a> Descendants<'a> {
    fn new(root: &'a Element) -> Self {
        let stack = root.children.iter().rev().map(|c| (root, c)).collect();
        Self { stack }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (&'a Element, &'a Element);

    fn next(&mut self) -> Option<Self::Item> {
        let (parent, el) = self.stack.pop()?;
        self.stack
            .extend(el.children.iter().rev().map(|child| (el, child)));
        Some((parent, el))
    }
}

/// A parsed document. A blank body parses to a document with no root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    root: Option<Element>,
}

impl Document {
    /// Parse XML text into an element tree
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| malformed(&reader, e))?;

            match event {
                Event::Start(start) => {
                    ensure_single_root(&root, &reader)?;
                    if stack.len() >= MAX_DEPTH {
                        return Err(EveApiError::malformed_response(format!(
                            "elements nested deeper than {} levels",
                            MAX_DEPTH
                        )));
                    }
                    stack.push(open_element(&start)?);
                }
                Event::Empty(start) => {
                    ensure_single_root(&root, &reader)?;
                    let element = open_element(&start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        EveApiError::malformed_response("closing tag without an open element")
                    })?;
                    attach(&mut stack, &mut root, element);
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| EveApiError::malformed_response(e.to_string()))?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(data) => {
                    push_text(&mut stack, &String::from_utf8_lossy(&data))?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(EveApiError::malformed_response(format!(
                "unexpected end of document inside <{}>",
                open.name
            )));
        }

        Ok(Self { root })
    }

    /// The root element, if the document has one
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// First element named `name` anywhere in the document
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.root.as_ref().and_then(|root| root.find(name))
    }

    /// The `<result>` element under the root
    pub fn result(&self) -> Option<&Element> {
        self.root.as_ref().and_then(|root| root.child("result"))
    }

    /// Check if the document has no root element
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

fn open_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| EveApiError::malformed_response(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| EveApiError::malformed_response(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(EveApiError::malformed_response(
            "text outside of the root element",
        )),
    }
}

fn ensure_single_root(root: &Option<Element>, reader: &Reader<&[u8]>) -> Result<()> {
    if root.is_some() {
        return Err(EveApiError::malformed_response(format!(
            "second root element at byte {}",
            reader.buffer_position()
        )));
    }
    Ok(())
}

fn malformed(reader: &Reader<&[u8]>, err: quick_xml::Error) -> EveApiError {
    EveApiError::malformed_response(format!(
        "{} (at byte {})",
        err,
        reader.buffer_position()
    ))
}
