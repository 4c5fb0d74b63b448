//! Minimal document tree for chapter markup.
//!
//! Chapter files in a courseware archive are XHTML most of the time, but the
//! authoring tool occasionally emits content that is not well-formed XML. The
//! parser therefore runs in two modes:
//!
//! 1. A strict, namespace-aware pass ([`quick_xml::NsReader`]) used whenever
//!    the bytes are well-formed.
//! 2. A tolerant pass ([`quick_xml::Reader`] with relaxed end-tag checking)
//!    that auto-closes mismatched tags, understands HTML void elements, and
//!    never fails. Malformed markup is not an error, just a downgrade.
//!
//! Transformation passes build a new tree from an immutable input tree rather
//! than editing in place, so traversal never observes its own edits.

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{NsReader, Reader};

use crate::error::{Error, Result};

/// One node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element: lowercased local name, ordered attributes, ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Element {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by (lowercased) name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// HTML elements that never carry children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "param", "source", "track", "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Parse markup into a forest of top-level nodes.
///
/// Tries the strict namespace-aware parser first; if the content is not
/// well-formed XML, transparently falls back to the tolerant parser.
pub fn parse_document(text: &str) -> Vec<Node> {
    let text = strip_bom(text);
    match parse_strict(text) {
        Ok(nodes) => nodes,
        Err(_) => parse_tolerant(text),
    }
}

/// Strict namespace-aware parse. Any well-formedness violation is an error.
pub fn parse_strict(text: &str) -> Result<Vec<Node>> {
    let mut reader = NsReader::from_str(text);
    let mut stack: Vec<Element> = vec![Element::new("#root")];

    loop {
        match reader.read_resolved_event()? {
            (_, Event::Start(e)) => {
                stack.push(element_from_start(&e));
            }
            (_, Event::Empty(e)) => {
                let el = element_from_start(&e);
                push_child(&mut stack, Node::Element(el));
            }
            (_, Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(Error::InvalidMarkup("unbalanced end tag".into()));
                }
                let el = stack.pop().unwrap_or_else(|| Element::new("#root"));
                push_child(&mut stack, Node::Element(el));
            }
            (_, Event::Text(e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(e.as_ref()));
            }
            (_, Event::CData(e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(&e));
            }
            (_, Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity) {
                    push_text(&mut stack, &resolved);
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(Error::InvalidMarkup("unclosed element at end of input".into()));
    }
    Ok(stack.pop().map(|root| root.children).unwrap_or_default())
}

/// Tolerant parse. Never fails: mismatched end tags close intervening open
/// elements, stray end tags are dropped, void elements self-close, and a
/// hard reader error salvages whatever parsed before it.
pub fn parse_tolerant(text: &str) -> Vec<Node> {
    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut stack: Vec<Element> = vec![Element::new("#root")];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let el = element_from_start(&e);
                if is_void(&el.name) {
                    push_child(&mut stack, Node::Element(el));
                } else {
                    stack.push(el);
                }
            }
            Ok(Event::Empty(e)) => {
                let el = element_from_start(&e);
                push_child(&mut stack, Node::Element(el));
            }
            Ok(Event::End(e)) => {
                let name = lower_local(e.local_name().as_ref());
                // Only pop if this tag is actually open somewhere; stray end
                // tags are ignored.
                if stack.iter().skip(1).any(|el| el.name == name) {
                    while stack.len() > 1 {
                        let closed = stack.pop().unwrap_or_else(|| Element::new("#root"));
                        let matched = closed.name == name;
                        push_child(&mut stack, Node::Element(closed));
                        if matched {
                            break;
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::CData(e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(&e));
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity) {
                    push_text(&mut stack, &resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    // Flush anything left open at EOF.
    while stack.len() > 1 {
        let closed = stack.pop().unwrap_or_else(|| Element::new("#root"));
        push_child(&mut stack, Node::Element(closed));
    }
    stack.pop().map(|root| root.children).unwrap_or_default()
}

fn element_from_start(e: &BytesStart) -> Element {
    let name = lower_local(e.local_name().as_ref());
    let attrs = e
        .attributes()
        .flatten()
        .map(|attr| {
            let key = lower_local(attr.key.local_name().as_ref());
            (key, attr_value(&attr))
        })
        .collect();
    Element {
        name,
        attrs,
        children: Vec::new(),
    }
}

fn attr_value(attr: &Attribute) -> String {
    attr.unescape_value()
        .map(Cow::into_owned)
        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
}

fn lower_local(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_ascii_lowercase()
}

fn push_child(stack: &mut Vec<Element>, node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn push_text(stack: &mut Vec<Element>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        // Merge with a preceding text node so entity references do not
        // fragment prose into separate nodes.
        if let Some(Node::Text(existing)) = parent.children.last_mut() {
            existing.push_str(text);
        } else {
            parent.children.push(Node::Text(text.to_string()));
        }
    }
}

fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        "nbsp" => return Some("\u{a0}".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
        return None;
    }
    if let Some(dec) = entity.strip_prefix('#') {
        if let Ok(code) = dec.parse::<u32>()
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
        return None;
    }
    None
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Serialize a forest of nodes back to markup.
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => out.push_str(&escape(text.as_str())),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (key, value) in &el.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape(value.as_str()));
                out.push('"');
            }
            if el.children.is_empty() && is_void(&el.name) {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in &el.children {
                    write_node(out, child);
                }
                out.push_str("</");
                out.push_str(&el.name);
                out.push('>');
            }
        }
    }
}

/// Remove embedded line breaks from every text node that is not nested
/// inside a `<pre>` block. The downstream renderer treats a literal newline
/// as a block boundary, so multi-line prose must collapse to single-line
/// flow; preformatted text is left byte-identical.
pub fn strip_text_newlines(nodes: &[Node]) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Text(text) => Node::Text(text.replace('\n', "")),
            Node::Element(el) if el.name == "pre" => Node::Element(el.clone()),
            Node::Element(el) => Node::Element(Element {
                name: el.name.clone(),
                attrs: el.attrs.clone(),
                children: strip_text_newlines(&el.children),
            }),
        })
        .collect()
}

/// Replace newlines in every `alt` attribute value with a single space so
/// serialization cannot corrupt the attribute.
pub fn clean_alt_attrs(nodes: &[Node]) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Text(text) => Node::Text(text.clone()),
            Node::Element(el) => Node::Element(Element {
                name: el.name.clone(),
                attrs: el
                    .attrs
                    .iter()
                    .map(|(k, v)| {
                        if k == "alt" {
                            (k.clone(), v.replace('\n', " "))
                        } else {
                            (k.clone(), v.clone())
                        }
                    })
                    .collect(),
                children: clean_alt_attrs(&el.children),
            }),
        })
        .collect()
}

/// Depth-first search for the first element with the given name.
pub fn find_element<'a>(nodes: &'a [Node], name: &str) -> Option<&'a Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.name == name {
                return Some(el);
            }
            if let Some(found) = find_element(&el.children, name) {
                return Some(found);
            }
        }
    }
    None
}

/// Concatenated text content of an element's subtree.
pub fn inner_text(el: &Element) -> String {
    let mut out = String::new();
    collect_text(&el.children, &mut out);
    out
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}
