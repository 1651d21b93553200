// Copyright (c) The quick-trx Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A minimal element tree over `quick-xml` events.
//!
//! TRX documents are small enough to hold in memory whole, and the converter
//! needs random access (result elements are matched to their definitions by
//! id), so the streaming reader is materialized into a tree up front.
//!
//! Elements are stored under their local names. The TRX default namespace
//! (`http://microsoft.com/schemas/VisualStudio/TeamTest/2010`) carries no
//! prefix in practice, and matching on local names accepts both prefixed and
//! unprefixed documents.

use crate::errors::ParseError;
use indexmap::IndexMap;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

/// A parsed XML document.
#[derive(Clone, Debug)]
pub(crate) struct Document {
    root: Element,
}

impl Document {
    /// Parses raw bytes into a document tree.
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) => {
                    stack.push(Element::from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    // quick-xml checks tag balance, so the stack is non-empty
                    // whenever an end event is produced.
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(cdata) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.text.push_str(&String::from_utf8_lossy(&cdata));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let root = root.ok_or(ParseError::MissingNode {
            path: "document root",
        })?;
        Ok(Self { root })
    }

    /// Returns all elements with the given local name, in document order.
    /// The root element itself is included in the walk.
    pub(crate) fn descendants<'a, 'n>(&'a self, name: &'n str) -> Descendants<'a, 'n> {
        Descendants {
            stack: vec![&self.root],
            name,
        }
    }

    /// Returns the first element with the given local name, if any.
    pub(crate) fn first_descendant(&self, name: &str) -> Option<&Element> {
        self.descendants(name).next()
    }
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// One element of the document tree.
#[derive(Clone, Debug)]
pub(crate) struct Element {
    name: String,
    attrs: IndexMap<String, String>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ParseError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attrs = IndexMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attrs.insert(key, value);
        }

        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// The value of the named attribute. Attribute names are matched exactly,
    /// including case.
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// The first direct child with the given local name, matched
    /// case-insensitively.
    pub(crate) fn child(&self, name: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|child| child.name.eq_ignore_ascii_case(name))
    }

    /// All direct children with the given local name, matched
    /// case-insensitively.
    pub(crate) fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |child| child.name.eq_ignore_ascii_case(name))
    }

    /// The concatenated text content of this element and its descendants.
    pub(crate) fn inner_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// Pre-order traversal filtered by local name.
pub(crate) struct Descendants<'a, 'n> {
    stack: Vec<&'a Element>,
    name: &'n str,
}

impl<'a> Iterator for Descendants<'a, '_> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(element) = self.stack.pop() {
            self.stack.extend(element.children.iter().rev());
            if element.name.eq_ignore_ascii_case(self.name) {
                return Some(element);
            }
        }
        None
    }
}
