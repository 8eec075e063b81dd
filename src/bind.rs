//! Socket Binding
//!
//! Turns the static JSX tree into a dynamic one in two passes:
//!
//! 1. Child binding: placeholders left by decomposition (`af-{element_tag}`)
//!    become references to the child view's controller.
//! 2. Socket binding: socket-tagged elements become guarded socket nodes whose
//!    content resolves through `proxies` at render time.
//!
//! Both passes match on tag identity, never on text, so attribute values and
//! text that happen to look like tags are left alone.

use std::collections::HashMap;

use tracing::debug;

use crate::decompose::placeholder_tag;
use crate::jsx::{ElementNode, SocketContent, SocketNode, TemplateNode, TextNode};
use crate::naming::ViewNames;
use crate::socket::{socket_tag, split_socket_tag};
use crate::visitor::{walk_node, TemplateVisitor};

/// `NavView` → `NavView.Controller`
pub fn controller_ref(class_name: &str) -> String {
    format!("{}.Controller", class_name)
}

/// Rewrites child placeholders into component references.
pub struct ChildBinder {
    /// placeholder tag → component class name
    placeholders: HashMap<String, String>,
    pub bound: usize,
}

impl ChildBinder {
    pub fn new<'a>(children: impl IntoIterator<Item = &'a ViewNames>) -> Self {
        let placeholders = children
            .into_iter()
            .map(|names| (placeholder_tag(&names.element_tag), names.class_name.clone()))
            .collect();
        Self {
            placeholders,
            bound: 0,
        }
    }

    fn component_tag(&self, tag: &str) -> Option<String> {
        let (base, socket) = match split_socket_tag(tag) {
            Some((base, socket)) => (base, Some(socket)),
            None => (tag, None),
        };
        let class_name = self.placeholders.get(base)?;
        let controller = controller_ref(class_name);
        Some(match socket {
            Some(socket) => socket_tag(&controller, socket),
            None => controller,
        })
    }
}

impl TemplateVisitor for ChildBinder {
    fn visit_node(&mut self, node: &mut TemplateNode) {
        if let TemplateNode::Element(el) = node {
            if let Some(tag) = self.component_tag(&el.tag) {
                el.tag = tag;
                let el = std::mem::replace(el, empty_element());
                *node = TemplateNode::Component(el);
                self.bound += 1;
            }
        }
        walk_node(self, node);
    }
}

/// Rewrites socket-tagged elements and components into socket nodes.
///
/// Runs post-order, so by the time a socket is bound every socket nested in
/// its content already is one; that decides between the fallback and the
/// scoped form.
#[derive(Debug, Default)]
pub struct SocketBinder {
    pub bound: Vec<String>,
}

impl TemplateVisitor for SocketBinder {
    fn visit_node(&mut self, node: &mut TemplateNode) {
        walk_node(self, node);

        let tagged = match node {
            TemplateNode::Element(el) | TemplateNode::Component(el) => split_socket_tag(&el.tag)
                .map(|(tag, name)| (tag.to_string(), name.to_string())),
            _ => None,
        };
        let Some((tag, name)) = tagged else {
            return;
        };

        let placeholder = TemplateNode::Text(TextNode {
            value: String::new(),
        });
        let (mut target, is_component) = match std::mem::replace(node, placeholder) {
            TemplateNode::Element(el) => (el, false),
            TemplateNode::Component(el) => (el, true),
            other => {
                *node = other;
                return;
            }
        };
        target.tag = tag;

        let children = std::mem::take(&mut target.children);
        let content = if children.is_empty() {
            SocketContent::Proxied
        } else if contains_socket(&children) {
            SocketContent::Scoped(children)
        } else {
            SocketContent::Fallback(children)
        };

        debug!(socket = %name, tag = %target.tag, "bound socket");
        self.bound.push(name.clone());
        *node = TemplateNode::Socket(SocketNode {
            name,
            target,
            is_component,
            content,
        });
    }
}

fn empty_element() -> ElementNode {
    ElementNode {
        tag: String::new(),
        attributes: Vec::new(),
        children: Vec::new(),
    }
}

/// Whether any node in the forest is a socket.
pub fn contains_socket(nodes: &[TemplateNode]) -> bool {
    nodes.iter().any(|node| {
        matches!(node, TemplateNode::Socket(_)) || contains_socket(node.children())
    })
}

/// Run child binding, then socket binding.
pub fn bind_template<'a>(
    nodes: &mut Vec<TemplateNode>,
    children: impl IntoIterator<Item = &'a ViewNames>,
) -> Vec<String> {
    let mut child_binder = ChildBinder::new(children);
    child_binder.visit_children(nodes);

    let mut socket_binder = SocketBinder::default();
    socket_binder.visit_children(nodes);

    debug!(
        components = child_binder.bound,
        sockets = socket_binder.bound.len(),
        "template bound"
    );
    socket_binder.bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsx::{print_template, JsxConverter, TemplateConverter};
    use crate::markup::parse_body;
    use crate::naming::derive_names;
    use crate::socket::tag_sockets;
    use crate::visitor::NodeCounter;

    fn bound(html: &str, children: &[&str]) -> (Vec<TemplateNode>, Vec<String>) {
        let mut markup = parse_body(html, "test").unwrap();
        tag_sockets(&mut markup);
        let mut nodes = JsxConverter.convert(&markup);
        let names: Vec<ViewNames> = children.iter().map(|c| derive_names(c).unwrap()).collect();
        let sockets = bind_template(&mut nodes, &names);
        (nodes, sockets)
    }

    #[test]
    fn test_fallback_form() {
        let (nodes, sockets) = bound(r#"<button af-sock="label" class="b">Click</button>"#, &[]);
        assert_eq!(sockets, vec!["label"]);
        assert_eq!(
            print_template(&nodes),
            "<React.Fragment>\n  {proxies['label'] && <button className=\"b\" {...proxies['label']}>{proxies['label'].children ? proxies['label'].children : <React.Fragment>Click</React.Fragment>}</button>}\n</React.Fragment>"
        );
    }

    #[test]
    fn test_proxied_form() {
        let (nodes, _) = bound(r#"<div><img af-sock="pic" src="a.png"></div>"#, &[]);
        assert_eq!(
            print_template(&nodes),
            "<div>\n  {proxies['pic'] && <img src=\"a.png\" {...proxies['pic']}>{proxies['pic'].children}</img>}\n</div>"
        );
    }

    #[test]
    fn test_scoped_form_binds_inner_first() {
        let (nodes, sockets) = bound(
            r#"<ul af-sock="list"><li af-sock="item">x</li></ul>"#,
            &[],
        );
        // post-order: inner socket is bound before its parent
        assert_eq!(sockets, vec!["item", "list"]);
        let TemplateNode::Socket(list) = &nodes[0] else {
            panic!("expected socket, got {:?}", nodes[0]);
        };
        assert!(matches!(list.content, SocketContent::Scoped(_)));
        let jsx = print_template(&nodes);
        assert!(jsx.contains(
            "{proxies['list'] && <ul {...proxies['list']}>{createScope(proxies['list'].children, (proxies) => <React.Fragment>"
        ));
        assert!(jsx.contains(
            "{proxies['item'] && <li {...proxies['item']}>{proxies['item'].children ? proxies['item'].children : <React.Fragment>x</React.Fragment>}</li>}"
        ));
        assert!(jsx.contains("</React.Fragment>)}</ul>}"));
    }

    #[test]
    fn test_child_placeholder_becomes_component() {
        let (nodes, _) = bound("<div><af-nav></af-nav><af-not-found></af-not-found></div>", &["nav", "404"]);
        assert_eq!(
            print_template(&nodes),
            "<div>\n  <NavView.Controller />\n  <NotFoundView.Controller />\n</div>"
        );
    }

    #[test]
    fn test_socketed_child_placeholder() {
        let (nodes, sockets) = bound(r#"<div><af-nav af-sock="menu"></af-nav></div>"#, &["nav"]);
        assert_eq!(sockets, vec!["menu"]);
        let TemplateNode::Element(div) = &nodes[0] else {
            panic!("expected element");
        };
        let TemplateNode::Socket(socket) = &div.children[0] else {
            panic!("expected socket");
        };
        assert!(socket.is_component);
        assert_eq!(socket.target.tag, "NavView.Controller");
        assert_eq!(
            print_template(&nodes),
            "<div>\n  {proxies['menu'] && <NavView.Controller {...proxies['menu']}>{proxies['menu'].children}</NavView.Controller>}\n</div>"
        );
    }

    #[test]
    fn test_unknown_placeholder_left_alone() {
        let (nodes, _) = bound("<div><af-other></af-other></div>", &["nav"]);
        let mut counter = NodeCounter::default();
        let mut nodes = nodes;
        counter.visit_children(&mut nodes);
        assert_eq!(counter.components, 0);
        assert_eq!(counter.elements, 2);
    }

    #[test]
    fn test_lookalike_text_untouched() {
        let (nodes, sockets) = bound(
            r#"<p title="button-af-sock-x">button-af-sock-y</p>"#,
            &[],
        );
        assert!(sockets.is_empty());
        assert!(!contains_socket(&nodes));
    }
}
