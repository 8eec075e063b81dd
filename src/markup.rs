//! Markup Module
//!
//! Owned markup tree built from an html5ever parse. Every compiler stage works
//! on this tree instead of a shared mutable DOM, so detaching a subtree moves
//! it out of its parent and nothing is ever aliased.

use html5ever::parse_document;
use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tendril::TendrilSink;

use crate::error::{Result, ViewError};

lazy_static! {
    static ref VOID_ELEMENTS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("area");
        s.insert("base");
        s.insert("br");
        s.insert("col");
        s.insert("embed");
        s.insert("hr");
        s.insert("img");
        s.insert("input");
        s.insert("link");
        s.insert("meta");
        s.insert("param");
        s.insert("source");
        s.insert("track");
        s.insert("wbr");
        s
    };
}

/// Elements whose text content is emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(tag)
}

// ═══════════════════════════════════════════════════════════════════════════════
// MARKUP TREE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MarkupNode {
    Element(Element),
    Text { value: String },
    Comment { value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<MarkupNode>,
}

impl MarkupNode {
    pub fn text(value: impl Into<String>) -> Self {
        MarkupNode::Text {
            value: value.into(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            MarkupNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            MarkupNode::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(index).value)
    }
}

/// Visit every element in document order (pre-order), mutably.
pub fn for_each_element_mut(nodes: &mut [MarkupNode], f: &mut dyn FnMut(&mut Element)) {
    for node in nodes.iter_mut() {
        if let MarkupNode::Element(el) = node {
            f(el);
            for_each_element_mut(&mut el.children, f);
        }
    }
}

/// Remove every element (with its subtree) matching the predicate.
pub fn remove_elements(nodes: &mut Vec<MarkupNode>, predicate: &dyn Fn(&Element) -> bool) {
    nodes.retain(|node| match node {
        MarkupNode::Element(el) => !predicate(el),
        _ => true,
    });
    for node in nodes.iter_mut() {
        if let MarkupNode::Element(el) = node {
            remove_elements(&mut el.children, predicate);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse a markup document and return the content of its `<body>`.
///
/// Fragments are parsed as full documents, so `<head>` content and anything
/// html5ever hoists out of the body is dropped.
pub fn parse_body(html: &str, view: &str) -> Result<Vec<MarkupNode>> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|source| ViewError::Parse {
            view: view.to_string(),
            source,
        })?;

    Ok(find_body(&dom.document)
        .map(|body| convert_children(&body))
        .unwrap_or_default())
}

fn find_body(handle: &Handle) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data {
        if &*name.local == "body" {
            return Some(handle.clone());
        }
    }
    handle.children.borrow().iter().find_map(find_body)
}

fn convert_children(handle: &Handle) -> Vec<MarkupNode> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(convert_node)
        .collect()
}

fn convert_node(handle: &Handle) -> Option<MarkupNode> {
    match &handle.data {
        NodeData::Text { contents } => Some(MarkupNode::text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(MarkupNode::Comment {
            value: contents.to_string(),
        }),
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let attributes = attrs
                .borrow()
                .iter()
                .map(|attr| Attribute {
                    name: match &attr.name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                        None => attr.name.local.to_string(),
                    },
                    value: attr.value.to_string(),
                })
                .collect();

            // <template> keeps its content in a separate fragment
            let children = match template_contents.borrow().as_ref() {
                Some(contents) => convert_children(contents),
                None => convert_children(handle),
            };

            Some(MarkupNode::Element(Element {
                tag: name.local.to_string(),
                attributes,
                children,
            }))
        }
        NodeData::Document
        | NodeData::Doctype { .. }
        | NodeData::ProcessingInstruction { .. } => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRINTING
// ═══════════════════════════════════════════════════════════════════════════════

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn open_tag(el: &Element) -> String {
    let mut out = format!("<{}", el.tag);
    for attr in &el.attributes {
        out.push_str(&format!(" {}=\"{}\"", attr.name, escape_attribute(&attr.value)));
    }
    out.push('>');
    out
}

/// Serialize nodes on a single line without reformatting.
pub fn to_html(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_compact(node, false, &mut out);
    }
    out
}

fn write_compact(node: &MarkupNode, raw: bool, out: &mut String) {
    match node {
        MarkupNode::Text { value } if raw => out.push_str(value),
        MarkupNode::Text { value } => out.push_str(&escape_text(value)),
        MarkupNode::Comment { value } => out.push_str(&format!("<!--{}-->", value)),
        MarkupNode::Element(el) => {
            out.push_str(&open_tag(el));
            if is_void_element(&el.tag) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&el.tag.as_str());
            for child in &el.children {
                write_compact(child, raw, out);
            }
            out.push_str(&format!("</{}>", el.tag));
        }
    }
}

/// Pretty-print nodes with two-space indentation.
///
/// Whitespace-only text is dropped. Elements with text children are kept on
/// one line so inline spacing survives.
pub fn pretty_print(nodes: &[MarkupNode]) -> String {
    let mut lines = Vec::new();
    for node in nodes {
        pretty_node(node, 0, &mut lines);
    }
    lines.join("\n")
}

fn has_text_child(el: &Element) -> bool {
    el.children.iter().any(|c| match c {
        MarkupNode::Text { value } => !value.trim().is_empty(),
        _ => false,
    })
}

fn pretty_node(node: &MarkupNode, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match node {
        MarkupNode::Text { value } => {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                lines.push(format!("{}{}", indent, escape_text(trimmed)));
            }
        }
        MarkupNode::Comment { value } => lines.push(format!("{}<!--{}-->", indent, value)),
        MarkupNode::Element(el) => {
            if is_void_element(&el.tag) {
                lines.push(format!("{}{}", indent, open_tag(el)));
            } else if el.children.is_empty()
                || has_text_child(el)
                || RAW_TEXT_ELEMENTS.contains(&el.tag.as_str())
            {
                lines.push(format!("{}{}", indent, to_html(std::slice::from_ref(node))));
            } else {
                lines.push(format!("{}{}", indent, open_tag(el)));
                for child in &el.children {
                    pretty_node(child, depth + 1, lines);
                }
                lines.push(format!("{}</{}>", indent, el.tag));
            }
        }
    }
}
