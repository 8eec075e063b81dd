use crate::jsx::{ElementNode, SocketContent, SocketNode, TemplateNode, TextNode};

/// The TemplateVisitor trait is the single traversal mechanism for template trees.
///
/// Rules:
/// 1. Traversal order is document order.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers call the `walk_*` functions to continue traversal unless pruning is intended.
/// 4. `visit_node` may replace the node it is given; the walk continues into the replacement.
pub trait TemplateVisitor {
    fn visit_children(&mut self, children: &mut Vec<TemplateNode>) {
        walk_children(self, children);
    }

    fn visit_node(&mut self, node: &mut TemplateNode) {
        walk_node(self, node);
    }

    fn visit_element(&mut self, element: &mut ElementNode) {
        walk_element(self, element);
    }

    fn visit_component(&mut self, component: &mut ElementNode) {
        walk_element(self, component);
    }

    fn visit_socket(&mut self, socket: &mut SocketNode) {
        walk_socket(self, socket);
    }

    fn visit_text(&mut self, _text: &mut TextNode) {}

    fn visit_comment(&mut self, _comment: &mut TextNode) {}
}

pub fn walk_children<V: TemplateVisitor + ?Sized>(
    visitor: &mut V,
    children: &mut Vec<TemplateNode>,
) {
    for node in children {
        visitor.visit_node(node);
    }
}

pub fn walk_node<V: TemplateVisitor + ?Sized>(visitor: &mut V, node: &mut TemplateNode) {
    match node {
        TemplateNode::Element(el) => visitor.visit_element(el),
        TemplateNode::Component(c) => visitor.visit_component(c),
        TemplateNode::Socket(s) => visitor.visit_socket(s),
        TemplateNode::Text(t) => visitor.visit_text(t),
        TemplateNode::Comment(c) => visitor.visit_comment(c),
    }
}

pub fn walk_element<V: TemplateVisitor + ?Sized>(visitor: &mut V, element: &mut ElementNode) {
    visitor.visit_children(&mut element.children);
}

pub fn walk_socket<V: TemplateVisitor + ?Sized>(visitor: &mut V, socket: &mut SocketNode) {
    match &mut socket.content {
        SocketContent::Proxied => {}
        SocketContent::Fallback(nodes) | SocketContent::Scoped(nodes) => {
            visitor.visit_children(nodes)
        }
    }
}

/// Counts nodes by kind. Used for diagnostics and tests.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NodeCounter {
    pub elements: usize,
    pub components: usize,
    pub sockets: usize,
    pub texts: usize,
}

impl TemplateVisitor for NodeCounter {
    fn visit_element(&mut self, element: &mut ElementNode) {
        self.elements += 1;
        walk_element(self, element);
    }

    fn visit_component(&mut self, component: &mut ElementNode) {
        self.components += 1;
        walk_element(self, component);
    }

    fn visit_socket(&mut self, socket: &mut SocketNode) {
        self.sockets += 1;
        walk_socket(self, socket);
    }

    fn visit_text(&mut self, _text: &mut TextNode) {
        self.texts += 1;
    }
}
