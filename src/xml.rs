//! Minimal XML element tree for XAML documents
//!
//! XAML scene documents are small and are read out of order (keyed
//! resources may be referenced before they are declared), so the document
//! is first materialized into an element tree with `quick-xml` and then
//! queried. Text content is not retained; XAML 3D stores everything the
//! loader needs in attributes.

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Default buffer capacity for XML parsing (4KB)
const XML_BUFFER_CAPACITY: usize = 4096;

/// Deepest element nesting accepted by [`Document::parse`]
///
/// The element tree and the scene walker are recursive, so nesting is
/// bounded to keep both within the stack.
pub const MAX_ELEMENT_DEPTH: usize = 256;

/// A single `name="value"` pair on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified attribute name, including any namespace prefix (e.g. `x:Key`)
    pub name: String,
    /// Unescaped attribute value
    pub value: String,
}

/// An XML element with its attributes and child elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified element name, including any namespace prefix
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<Attribute>,
    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element without attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Find an attribute by its exact, case-sensitive name
    ///
    /// Returns the first match in attribute order.
    pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Get an attribute value by its exact name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.find_attribute(name).map(|attr| attr.value.as_str())
    }

    /// Get an attribute value by its local name, regardless of namespace prefix
    ///
    /// `x:Key` and `Key` both have local name `"Key"`.
    pub fn attribute_by_local_name(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| get_local_name(&attr.name) == local_name)
            .map(|attr| attr.value.as_str())
    }

    /// Find a child element by exact tag name
    ///
    /// Without `recursive`, only immediate children are considered. With
    /// `recursive`, the subtree is searched depth-first in pre-order, so the
    /// result is the first matching element in document order.
    pub fn find_child(&self, name: &str, recursive: bool) -> Option<&Element> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if recursive && let Some(found) = child.find_child(name, true) {
                return Some(found);
            }
        }
        None
    }

    /// Iterate over all descendants (not including `self`) in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// All descendants with the given tag name, in document order
    pub fn descendants_by_tag_name<'a, 'b>(
        &'a self,
        name: &'b str,
    ) -> impl Iterator<Item = &'a Element> + use<'a, 'b> {
        self.descendants().filter(move |element| element.name == name)
    }
}

/// Pre-order iterator over the descendants of an element
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse XML text into an element tree
    ///
    /// Fails on malformed XML: mismatched or unclosed tags, invalid
    /// attribute syntax, or a document without exactly one root element.
    /// Documents nested deeper than [`MAX_ELEMENT_DEPTH`] are rejected too.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::with_capacity(XML_BUFFER_CAPACITY);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    check_depth(stack.len() + 1)?;
                    stack.push(element_from_start(e)?);
                }
                Event::Empty(ref e) => {
                    check_depth(stack.len() + 1)?;
                    let element = element_from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::InvalidXml("unexpected end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(Error::InvalidXml(format!(
                "element <{}> is never closed",
                open.name
            )));
        }

        root.map(|root| Document { root })
            .ok_or_else(|| Error::InvalidXml("document has no root element".to_string()))
    }

    /// The document element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// All elements with the given tag name, including the root, in document order
    pub fn elements_by_tag_name<'a, 'b>(
        &'a self,
        name: &'b str,
    ) -> impl Iterator<Item = &'a Element> + use<'a, 'b> {
        std::iter::once(&self.root)
            .chain(self.root.descendants())
            .filter(move |element| element.name == name)
    }

    /// First element with the given tag name in document order
    pub fn first_element_by_tag_name(&self, name: &str) -> Option<&Element> {
        self.elements_by_tag_name(name).next()
    }
}

/// Decode raw document bytes into text
///
/// Accepts UTF-8 (with or without BOM) and BOM-marked UTF-16 in either
/// byte order.
pub fn decode_document(bytes: &[u8]) -> Result<String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => decode_utf8(rest),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => decode_utf8(bytes),
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| Error::Encoding(e.to_string()))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::Encoding(
            "UTF-16 document has an odd number of bytes".to_string(),
        ));
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Extract local name from potentially namespaced XML name
///
/// - `"x:Key"` returns `"Key"`
/// - `"Positions"` returns `"Positions"`
pub(crate) fn get_local_name(name_str: &str) -> &str {
    if let Some(pos) = name_str.rfind(':') {
        &name_str[pos + 1..]
    } else {
        name_str
    }
}

fn element_from_start(e: &BytesStart) -> Result<Element> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| Error::InvalidXml(e.to_string()))?
        .to_string();

    let mut element = Element::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        let key =
            std::str::from_utf8(attr.key.as_ref()).map_err(|e| Error::InvalidXml(e.to_string()))?;
        let raw =
            std::str::from_utf8(&attr.value).map_err(|e| Error::InvalidXml(e.to_string()))?;
        let value = quick_xml::escape::unescape(raw).map_err(|e| Error::XmlAttr(e.to_string()))?;

        element.attributes.push(Attribute {
            name: key.to_string(),
            value: value.into_owned(),
        });
    }
    Ok(element)
}

fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_ELEMENT_DEPTH {
        return Err(Error::InvalidXml(format!(
            "elements nested deeper than {} levels",
            MAX_ELEMENT_DEPTH
        )));
    }
    Ok(())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(Error::InvalidXml(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}
