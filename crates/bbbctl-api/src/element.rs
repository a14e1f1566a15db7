//! Generic XML element tree.
//!
//! API responses are kept as plain trees so renderers can walk unknown or
//! future tags without a schema. Nothing the server sends is dropped.

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use crate::error::ParseError;

/// Status value reported by successful calls.
pub const RETURNCODE_SUCCESS: &str = "SUCCESS";

const RETURNCODE_TAG: &str = "returncode";

/// One XML element: tag, attributes, leading text, and ordered children.
///
/// Text that follows a child is kept as that child's `tail`, so mixed content
/// serializes back in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    tail: String,
    children: Vec<Self>,
}

impl Element {
    /// Element with the given tag and no content.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Replace the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Parse a complete XML document into its root element.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the document is not well formed or does not
    /// contain exactly one root element.
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Self> = Vec::new();
        let mut root: Option<Self> = None;

        loop {
            let position = reader.buffer_position();
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(open_element(&start, position)?),
                Ok(Event::Empty(start)) => {
                    let element = open_element(&start, position)?;
                    attach(&mut stack, &mut root, element, position)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ParseError::new(position, "unexpected closing tag"))?;
                    attach(&mut stack, &mut root, element, position)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text
                        .unescape()
                        .map_err(|err| ParseError::new(position, err.to_string()))?;
                    push_text(&mut stack, &text, position)?;
                }
                Ok(Event::CData(data)) => {
                    let bytes = data.into_inner();
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|err| ParseError::new(position, err.to_string()))?;
                    push_text(&mut stack, text, position)?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => return Err(ParseError::new(reader.error_position(), err.to_string())),
            }
        }

        if let Some(open) = stack.last() {
            return Err(ParseError::new(
                reader.buffer_position(),
                format!("unclosed element <{}>", open.tag),
            ));
        }
        root.ok_or_else(|| ParseError::new(0, "document has no root element"))
    }

    /// Element tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Raw text before the first child, untrimmed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Trimmed text content, or `None` when it is empty.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Child elements in document order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Whether the element has no child elements.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// First immediate child with the given tag.
    #[must_use]
    pub fn child(&self, tag: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Trimmed text of the first immediate child with the given tag.
    #[must_use]
    pub fn child_value(&self, tag: &str) -> Option<&str> {
        self.child(tag).and_then(Self::value)
    }

    /// All elements reached by following a `/`-separated tag path from this node.
    #[must_use]
    pub fn find_all(&self, path: &str) -> Vec<&Self> {
        let mut current = vec![self];
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|node| node.children.iter().filter(move |child| child.tag == segment))
                .collect();
        }
        current
    }

    /// Remove every immediate child with the given tag, returning how many were removed.
    pub fn remove_children(&mut self, tag: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|child| child.tag != tag);
        before - self.children.len()
    }

    /// Text of the `returncode` child, if present.
    #[must_use]
    pub fn returncode(&self) -> Option<&str> {
        self.child_value(RETURNCODE_TAG)
    }

    /// Whether the `returncode` child reports success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.returncode() == Some(RETURNCODE_SUCCESS)
    }

    /// Serialize this element and its subtree back to XML text.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape(value.as_str()));
        }
        if self.text.is_empty() && self.children.is_empty() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        out.push_str(&escape(self.text.as_str()));
        for child in &self.children {
            child.write_xml(out);
            out.push_str(&escape(child.tail.as_str()));
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn open_element(start: &BytesStart<'_>, position: u64) -> Result<Element, ParseError> {
    let tag = std::str::from_utf8(start.name().as_ref())
        .map_err(|err| ParseError::new(position, err.to_string()))?
        .to_string();
    let mut element = Element::new(tag);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| ParseError::new(position, err.to_string()))?;
        let name = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|err| ParseError::new(position, err.to_string()))?
            .to_string();
        let value = attribute
            .unescape_value()
            .map_err(|err| ParseError::new(position, err.to_string()))?
            .into_owned();
        element.attributes.push((name, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::new(position, "multiple root elements"));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str, position: u64) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(current) => {
            match current.children.last_mut() {
                Some(previous) => previous.tail.push_str(text),
                None => current.text.push_str(text),
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::new(position, "text outside of the root element")),
    }
}
