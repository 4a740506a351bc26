//! Minimal element tree built from `quick-xml` events.
//!
//! OpenNebula documents are small, attribute-free and mostly one level of
//! `<TAG>text</TAG>` children, often wrapped in CDATA. Decoding them into a
//! tree first lets every typed decoder work on one shape.
//!
//! Leaf text is kept exactly as sent. Whitespace that only separates child
//! elements is dropped.

use crate::core::domain::error::{OneError, OneResult};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::str;

/// An XML element: its tag, its direct text content and its child elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parses a document and returns its root element.
    pub fn parse(xml: &str) -> OneResult<Self> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => stack.push(Self::open(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = Self::open(e)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| OneError::Parse("Unbalanced closing tag".to_string()))?;
                    if !element.children.is_empty() && element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| OneError::Parse(format!("Invalid text content: {}", e)))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    let bytes = e.into_inner();
                    let text = str::from_utf8(&bytes)
                        .map_err(|_| OneError::Parse("Invalid UTF-8 in CDATA".to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OneError::Parse(format!(
                        "XML error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(OneError::Parse("Unexpected end of document".to_string()));
        }
        root.ok_or_else(|| OneError::Parse("Empty document".to_string()))
    }

    fn open(e: &BytesStart) -> OneResult<Self> {
        let name = e.name();
        let name = str::from_utf8(name.as_ref())
            .map_err(|_| OneError::Parse("Invalid UTF-8 in tag name".to_string()))?;
        Ok(Self {
            name: name.to_string(),
            ..Default::default()
        })
    }

    fn attach(
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        element: XmlElement,
    ) -> OneResult<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => return Err(OneError::Parse("Multiple root elements".to_string())),
        }
        Ok(())
    }

    /// First direct child with the given tag.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given tag, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of a direct child, if the child exists.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Direct child that must exist.
    pub fn required_child(&self, name: &str) -> OneResult<&XmlElement> {
        self.child(name).ok_or_else(|| {
            OneError::Parse(format!("<{}> is missing <{}>", self.name, name))
        })
    }

    /// Text of a direct child that must exist.
    pub fn required_text(&self, name: &str) -> OneResult<&str> {
        self.required_child(name).map(|c| c.text.as_str())
    }

    /// Text of a direct child parsed into a number.
    pub fn required_parse<T>(&self, name: &str) -> OneResult<T>
    where
        T: str::FromStr,
        T::Err: std::fmt::Display,
    {
        let text = self.required_text(name)?;
        text.trim().parse::<T>().map_err(|e| {
            OneError::Parse(format!(
                "<{}> in <{}> has invalid value '{}': {}",
                name, self.name, text, e
            ))
        })
    }
}
