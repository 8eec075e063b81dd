//! Tree decomposition.
//!
//! Marker-flagged subtrees are detached from a view's markup and replaced by
//! placeholder elements. Each detached subtree becomes a child view that is
//! compiled on its own, so markers nested inside it are handled by the child.

use tracing::debug;

use crate::error::Result;
use crate::markup::{for_each_element_mut, remove_elements, Attribute, Element, MarkupNode};
use crate::naming::{derive_names, ViewNames};

/// Extraction marker, value is the child view label.
pub const EXTRACT_MARKER: &str = "af-el";
/// Socket marker, value is the socket name.
pub const SOCKET_MARKER: &str = "af-sock";
/// Removes the element and its subtree.
pub const IGNORE_MARKER: &str = "af-ignore";
/// Clears the element's content but keeps the element.
pub const EMPTY_MARKER: &str = "af-empty";
/// Placeholder tags are `af-{element_tag}`.
pub const PLACEHOLDER_PREFIX: &str = "af-";

/// A subtree detached from its parent's markup.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub label: String,
    pub names: ViewNames,
    /// The original element with extraction and socket markers removed.
    pub element: Element,
}

pub fn placeholder_tag(element_tag: &str) -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, element_tag)
}

/// Detach every outermost extraction-marked element, in document order.
///
/// Each one is swapped in place for a placeholder that carries over its socket
/// marker, so the placeholder itself can still be bound as a socket.
pub fn extract_children(nodes: &mut [MarkupNode]) -> Result<Vec<Extraction>> {
    let mut extracted = Vec::new();
    collect_extractions(nodes, &mut extracted)?;
    Ok(extracted)
}

fn collect_extractions(nodes: &mut [MarkupNode], extracted: &mut Vec<Extraction>) -> Result<()> {
    for node in nodes.iter_mut() {
        let MarkupNode::Element(el) = node else {
            continue;
        };
        let Some(label) = el.attr(EXTRACT_MARKER).map(str::to_string) else {
            collect_extractions(&mut el.children, extracted)?;
            continue;
        };

        let names = derive_names(&label)?;
        let mut element = std::mem::replace(el, Element::new(placeholder_tag(&names.element_tag)));
        element.remove_attr(EXTRACT_MARKER);
        if let Some(socket) = element.remove_attr(SOCKET_MARKER) {
            el.attributes.push(Attribute {
                name: SOCKET_MARKER.to_string(),
                value: socket,
            });
        }

        debug!(label = %label, tag = %names.element_tag, "extracted child view");
        extracted.push(Extraction {
            label,
            names,
            element,
        });
    }
    Ok(())
}

/// Apply the post-extraction cleanup rules: drop ignored elements, empty
/// `af-empty` elements and strip every inline script.
pub fn apply_cleanup(nodes: &mut Vec<MarkupNode>) {
    remove_elements(nodes, &|el| el.has_attr(IGNORE_MARKER));
    for_each_element_mut(nodes, &mut |el| {
        if el.remove_attr(EMPTY_MARKER).is_some() {
            el.children.clear();
        }
    });
    remove_elements(nodes, &|el| el.tag == "script");
}

/// Extract every child subtree, then clean up what remains.
pub fn decompose(nodes: &mut Vec<MarkupNode>) -> Result<Vec<Extraction>> {
    let extracted = extract_children(nodes)?;
    apply_cleanup(nodes);
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{parse_body, to_html};

    fn parse(html: &str) -> Vec<MarkupNode> {
        parse_body(html, "test").unwrap()
    }

    #[test]
    fn test_extracts_in_document_order() {
        let mut nodes = parse(
            r#"<div><header af-el="top bar">a</header><main><nav af-el="nav" af-sock="menu">b</nav></main></div>"#,
        );
        let extracted = decompose(&mut nodes).unwrap();

        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[0].label, "top bar");
        assert_eq!(extracted[0].names.class_name, "TopBarView");
        assert_eq!(extracted[1].label, "nav");
        assert_eq!(
            to_html(&nodes),
            r#"<div><af-top-bar></af-top-bar><main><af-nav af-sock="menu"></af-nav></main></div>"#
        );
    }

    #[test]
    fn test_markers_are_stripped_from_detached_subtree() {
        let mut nodes = parse(r#"<nav af-el="nav" af-sock="menu" id="n"><a>x</a></nav>"#);
        let extracted = decompose(&mut nodes).unwrap();
        let el = &extracted[0].element;
        assert_eq!(el.tag, "nav");
        assert!(!el.has_attr(EXTRACT_MARKER));
        assert!(!el.has_attr(SOCKET_MARKER));
        assert_eq!(el.attr("id"), Some("n"));
    }

    #[test]
    fn test_nested_markers_stay_with_outer_subtree() {
        let mut nodes = parse(r#"<div af-el="outer"><span af-el="inner">x</span></div>"#);
        let extracted = decompose(&mut nodes).unwrap();
        assert_eq!(extracted.len(), 1);
        let inner = extracted[0].element.children[0].as_element().unwrap();
        assert_eq!(inner.attr(EXTRACT_MARKER), Some("inner"));
    }

    #[test]
    fn test_cleanup_rules() {
        let mut nodes = parse(
            r#"<div><p af-ignore>gone</p><ul af-empty class="l"><li>x</li></ul><script>alert(1)</script><script src="x.js"></script></div>"#,
        );
        decompose(&mut nodes).unwrap();
        assert_eq!(to_html(&nodes), r#"<div><ul class="l"></ul></div>"#);
    }

    #[test]
    fn test_ignore_applies_after_extraction() {
        let mut nodes = parse(r#"<div af-el="card"><p af-ignore>x</p></div>"#);
        let extracted = decompose(&mut nodes).unwrap();
        // the ignored element travelled with the child and is the child's to drop
        assert!(extracted[0].element.children[0]
            .as_element()
            .unwrap()
            .has_attr(IGNORE_MARKER));
    }

    #[test]
    fn test_invalid_label_fails() {
        let mut nodes = parse(r#"<div af-el="--"></div>"#);
        assert!(decompose(&mut nodes).is_err());
    }
}
