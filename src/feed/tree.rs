//! Owned element tree built from a single namespace-aware quick-xml pass.
//!
//! Only what the Atom extractor needs is kept: each element's resolved
//! namespace URI, its local name, the text preceding its first child, and
//! its child elements. Attributes are checked for well-formedness and then
//! dropped, as are comments and processing instructions.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use super::FeedError;

/// SEC-003: Maximum element nesting depth.
/// Blogger exports escape post markup as text, so real feeds stay shallow.
const MAX_DEPTH: usize = 256;

/// One XML element with its namespace already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Namespace URI bound to the element's prefix (or the default namespace).
    pub namespace: Option<String>,
    pub local_name: String,
    /// Text and CDATA before the first child element, unescaped and untrimmed.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn new(namespace: Option<String>, local_name: String) -> Self {
        Self {
            namespace,
            local_name,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Returns true when the element is `{namespace}local_name`.
    pub fn is_named(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name == local_name
    }

    /// Iterates direct children named `{namespace}local_name`, in document order.
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |child| child.is_named(namespace, local_name))
    }

    /// First direct child named `{namespace}local_name`.
    pub fn child(&self, namespace: &str, local_name: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|child| child.is_named(namespace, local_name))
    }

    /// Text of the first matching child.
    ///
    /// `None` means the element is absent. A present element without text
    /// yields `Some("")`, so callers can tell the two apart.
    pub fn child_text(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.child(namespace, local_name)
            .map(|child| child.text.as_str())
    }
}

/// Parses a complete XML document into its root [`Element`].
///
/// # Errors
///
/// Returns [`FeedError::MalformedSource`] for syntax errors, mismatched or
/// unclosed tags, invalid names, unquoted or duplicated attributes,
/// unbound namespace prefixes, unknown entity references, a missing root,
/// a second root, or stray text outside the root.
///
/// # Security
///
/// SEC-002: DTD entity declarations are never expanded, internal ones
/// included. A document that references a custom entity (`&name;`) is
/// rejected as malformed even when its DOCTYPE declares that entity.
/// Only the five predefined entities and character references resolve.
pub fn parse_document(content: &str) -> Result<Element, FeedError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = NsReader::from_str(content);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let (resolved, event) = match reader.read_resolved_event() {
            Ok(pair) => pair,
            Err(e) => return Err(FeedError::malformed(position, e.to_string())),
        };

        match event {
            Event::Start(e) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(FeedError::malformed(
                        position,
                        format!("nesting depth exceeds maximum of {} levels", MAX_DEPTH),
                    ));
                }
                check_start_tag(&e, position)?;
                let namespace = namespace_uri(resolved, position)?;
                let local_name = decode_name(e.local_name().as_ref(), position)?;
                stack.push(Element::new(namespace, local_name));
            }
            Event::Empty(e) => {
                check_start_tag(&e, position)?;
                let namespace = namespace_uri(resolved, position)?;
                let local_name = decode_name(e.local_name().as_ref(), position)?;
                attach(Element::new(namespace, local_name), &mut stack, &mut root, position)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    FeedError::malformed(position, "closing tag without an open element")
                })?;
                attach(element, &mut stack, &mut root, position)?;
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| FeedError::malformed(position, e.to_string()))?;
                push_text(&text, &mut stack, position)?;
            }
            Event::CData(e) => {
                let text = String::from_utf8(e.into_inner().into_owned()).map_err(|_| {
                    FeedError::malformed(position, "CDATA section is not valid UTF-8")
                })?;
                push_text(&text, &mut stack, position)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and DOCTYPE
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FeedError::malformed(
            reader.buffer_position() as u64,
            format!("document ended inside <{}>", open.local_name),
        ));
    }

    root.ok_or_else(|| FeedError::malformed(0, "no root element found"))
}

fn namespace_uri(resolved: ResolveResult<'_>, position: u64) -> Result<Option<String>, FeedError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(FeedError::malformed(
            position,
            format!(
                "unbound namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            ),
        )),
    }
}

/// Rejects what the namespace resolver lets through: invalid element or
/// attribute names, unquoted or duplicated attributes, and attribute
/// values with unknown entity references.
fn check_start_tag(e: &BytesStart<'_>, position: u64) -> Result<(), FeedError> {
    let name = decode_name(e.name().as_ref(), position)?;
    if !is_xml_name(&name) {
        return Err(FeedError::malformed(
            position,
            format!("invalid element name '{}'", name),
        ));
    }

    for attr in e.attributes().with_checks(true) {
        let attr = attr.map_err(|e| FeedError::malformed(position, e.to_string()))?;
        let key = decode_name(attr.key.as_ref(), position)?;
        if !is_xml_name(&key) {
            return Err(FeedError::malformed(
                position,
                format!("invalid attribute name '{}' on <{}>", key, name),
            ));
        }
        attr.unescape_value()
            .map_err(|e| FeedError::malformed(position, e.to_string()))?;
    }
    Ok(())
}

/// XML 1.0 `Name` production.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | '_' | 'A'..='Z' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

fn decode_name(name: &[u8], position: u64) -> Result<String, FeedError> {
    std::str::from_utf8(name)
        .map(str::to_string)
        .map_err(|_| FeedError::malformed(position, "element name is not valid UTF-8"))
}

/// Hands a finished element to its parent, or installs it as the root.
fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
    position: u64,
) -> Result<(), FeedError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(FeedError::malformed(
            position,
            format!("second root element <{}>", element.local_name),
        ));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(text: &str, stack: &mut [Element], position: u64) -> Result<(), FeedError> {
    match stack.last_mut() {
        // Only leading text counts, matching how the extractor reads fields
        Some(current) if current.children.is_empty() => current.text.push_str(text),
        Some(_) => {}
        None if text.trim().is_empty() => {}
        None => {
            return Err(FeedError::malformed(
                position,
                "text content outside the root element",
            ))
        }
    }
    Ok(())
}
