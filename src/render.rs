//! Static Renderer
//!
//! Reference interpreter for bound templates. It evaluates a view the way the
//! emitted module's `render()` does, with proxies standing in for the React
//! elements a controller passes down, and produces HTML. Used to check socket
//! semantics without a JavaScript runtime.

use std::collections::BTreeMap;

use crate::bind::controller_ref;
use crate::controller::ControllerLookup;
use crate::jsx::{style_property_name, AttributeIR, AttributeValue, ElementNode, SocketContent, TemplateNode};
use crate::markup::{escape_attribute, escape_text, is_void_element};
use crate::view::ComponentNode;

/// The props and children one socket receives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Proxy {
    pub props: BTreeMap<String, String>,
    /// `None` when the proxy was passed without children.
    pub children: Option<Vec<ProxyNode>>,
}

/// Content handed to a view, mirroring React children.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyNode {
    Text(String),
    /// An element whose type names the socket it feeds.
    Element { socket: String, proxy: Proxy },
}

pub type ProxySet = BTreeMap<String, Proxy>;

impl Proxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prop(mut self, name: &str, value: &str) -> Self {
        self.props.insert(name.to_string(), value.to_string());
        self
    }

    pub fn children(mut self, children: Vec<ProxyNode>) -> Self {
        self.children = Some(children);
        self
    }
}

impl ProxyNode {
    pub fn text(value: &str) -> Self {
        ProxyNode::Text(value.to_string())
    }

    pub fn element(socket: &str, proxy: Proxy) -> Self {
        ProxyNode::Element {
            socket: socket.to_string(),
            proxy,
        }
    }
}

/// Index children by socket name. Text is ignored and later elements win,
/// like the `transformProxies` runtime helper.
pub fn transform_proxies(children: &[ProxyNode]) -> ProxySet {
    children
        .iter()
        .filter_map(|child| match child {
            ProxyNode::Element { socket, proxy } => Some((socket.clone(), proxy.clone())),
            ProxyNode::Text(_) => None,
        })
        .collect()
}

/// Every socket the view declares, mapped to an empty proxy.
pub fn default_proxies(view: &ComponentNode) -> ProxySet {
    view.sockets()
        .iter()
        .map(|socket| (socket.clone(), Proxy::default()))
        .collect()
}

/// The proxy set `render()` works with: the supplied children under an
/// external controller, otherwise every socket with empty props.
pub fn select_proxies(
    lookup: &ControllerLookup,
    view: &ComponentNode,
    supplied: &[ProxyNode],
) -> ProxySet {
    if lookup.is_external() {
        transform_proxies(supplied)
    } else {
        default_proxies(view)
    }
}

/// Resolves the controller each child view renders under.
pub type ControllerFn<'a> = dyn Fn(&ComponentNode) -> ControllerLookup + 'a;

/// Render a view to HTML against a proxy set. Child views act as their own
/// controllers.
pub fn render_view(view: &ComponentNode, proxies: &ProxySet) -> String {
    render_view_with(view, proxies, &|_| ControllerLookup::NotFound)
}

/// Render a view with child controllers resolved by `controllers`.
pub fn render_view_with(view: &ComponentNode, proxies: &ProxySet, controllers: &ControllerFn) -> String {
    let renderer = Renderer { view, controllers };
    let mut out = String::new();
    renderer.nodes(view.template_nodes(), proxies, &mut out);
    out
}

struct Renderer<'a> {
    view: &'a ComponentNode,
    controllers: &'a ControllerFn<'a>,
}

impl Renderer<'_> {
    fn nodes(&self, nodes: &[TemplateNode], proxies: &ProxySet, out: &mut String) {
        for node in nodes {
            self.node(node, proxies, out);
        }
    }

    fn node(&self, node: &TemplateNode, proxies: &ProxySet, out: &mut String) {
        match node {
            TemplateNode::Text(text) => out.push_str(&escape_text(&text.value)),
            TemplateNode::Comment(_) => {}
            TemplateNode::Component(el) => self.component(el, &[], out),
            TemplateNode::Element(el) => {
                let inner_html = open_tag(el, &BTreeMap::new(), out);
                if is_void_element(&el.tag) {
                    return;
                }
                match inner_html {
                    Some(html) => out.push_str(&html),
                    None => self.nodes(&el.children, proxies, out),
                }
                out.push_str(&format!("</{}>", el.tag));
            }
            TemplateNode::Socket(socket) => {
                let Some(proxy) = proxies.get(&socket.name) else {
                    return;
                };
                if socket.is_component {
                    // the proxy's children become the child controller's children
                    self.component(&socket.target, proxy.children.as_deref().unwrap_or(&[]), out);
                    return;
                }

                let target = &socket.target;
                let inner_html = open_tag(target, &proxy.props, out);
                if is_void_element(&target.tag) {
                    return;
                }
                if let Some(html) = inner_html {
                    out.push_str(&html);
                } else {
                    match (&socket.content, &proxy.children) {
                        (SocketContent::Proxied, Some(children))
                        | (SocketContent::Fallback(_), Some(children)) => render_proxy_nodes(children, out),
                        (SocketContent::Proxied, None) => {}
                        (SocketContent::Fallback(nodes), None) => self.nodes(nodes, proxies, out),
                        (SocketContent::Scoped(nodes), children) => {
                            let scope = transform_proxies(children.as_deref().unwrap_or(&[]));
                            self.nodes(nodes, &scope, out);
                        }
                    }
                }
                out.push_str(&format!("</{}>", target.tag));
            }
        }
    }

    /// A child view renders under its own controller: `supplied` when that
    /// controller is external, its own defaults otherwise.
    fn component(&self, el: &ElementNode, supplied: &[ProxyNode], out: &mut String) {
        let Some(child) = self
            .view
            .children()
            .iter()
            .find(|child| controller_ref(child.class_name()) == el.tag)
        else {
            return;
        };
        let proxies = select_proxies(&(self.controllers)(child), child, supplied);
        out.push_str(&render_view_with(child, &proxies, self.controllers));
    }
}

fn render_proxy_nodes(nodes: &[ProxyNode], out: &mut String) {
    for node in nodes {
        match node {
            ProxyNode::Text(text) => out.push_str(&escape_text(text)),
            ProxyNode::Element { socket, proxy } => {
                out.push_str(&format!("<{}", socket));
                for (name, value) in &proxy.props {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
                }
                out.push('>');
                if let Some(children) = &proxy.children {
                    render_proxy_nodes(children, out);
                }
                out.push_str(&format!("</{}>", socket));
            }
        }
    }
}

/// React DOM spellings back to HTML attribute names.
fn html_attribute_name(name: &str) -> &str {
    match name {
        "className" => "class",
        "htmlFor" => "for",
        "defaultValue" => "value",
        "defaultChecked" => "checked",
        other => other,
    }
}

/// Write the opening tag with `props` spread over the element's own
/// attributes. Returns raw inner HTML when the element injects it.
fn open_tag(el: &ElementNode, props: &BTreeMap<String, String>, out: &mut String) -> Option<String> {
    let mut inner_html = None;
    out.push('<');
    out.push_str(&el.tag);

    for AttributeIR { name, value } in &el.attributes {
        if props.contains_key(name) {
            continue;
        }
        match value {
            AttributeValue::Static(v) => out.push_str(&format!(
                " {}=\"{}\"",
                html_attribute_name(name),
                escape_attribute(v)
            )),
            AttributeValue::Flag => out.push_str(&format!(" {}", html_attribute_name(name))),
            AttributeValue::Style(properties) => {
                let css: Vec<String> = properties
                    .iter()
                    .map(|p| format!("{}:{}", css_property_name(&p.property), p.value))
                    .collect();
                out.push_str(&format!(" style=\"{}\"", escape_attribute(&css.join(";"))));
            }
            AttributeValue::InnerHtml(html) => inner_html = Some(html.clone()),
        }
    }
    for (name, value) in props {
        out.push_str(&format!(
            " {}=\"{}\"",
            html_attribute_name(name),
            escape_attribute(value)
        ));
    }

    out.push('>');
    inner_html
}

/// Style properties round-trip through their React names, so `Background-Color`
/// renders as `background-color`.
fn css_property_name(property: &str) -> String {
    let react = style_property_name(property);
    if react.starts_with("--") {
        return react;
    }
    let mut out = String::with_capacity(react.len() + 4);
    for c in react.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    if out.starts_with("ms-") {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button_view() -> ComponentNode {
        ComponentNode::new("nav", r#"<button af-sock="label" class="b">Click</button>"#).unwrap()
    }

    #[test]
    fn test_no_proxy_renders_nothing() {
        assert_eq!(render_view(&button_view(), &ProxySet::new()), "");
    }

    #[test]
    fn test_proxy_without_children_renders_default() {
        let mut proxies = ProxySet::new();
        proxies.insert("label".to_string(), Proxy::new().prop("id", "go"));
        assert_eq!(
            render_view(&button_view(), &proxies),
            r#"<button class="__af-b" id="go">Click</button>"#
        );
    }

    #[test]
    fn test_proxy_children_replace_default() {
        let mut proxies = ProxySet::new();
        proxies.insert(
            "label".to_string(),
            Proxy::new().children(vec![ProxyNode::text("Go")]),
        );
        assert_eq!(
            render_view(&button_view(), &proxies),
            r#"<button class="__af-b">Go</button>"#
        );
    }

    #[test]
    fn test_proxy_props_override_attributes() {
        let mut proxies = ProxySet::new();
        proxies.insert("label".to_string(), Proxy::new().prop("className", "x"));
        assert_eq!(
            render_view(&button_view(), &proxies),
            r#"<button class="x">Click</button>"#
        );
    }

    #[test]
    fn test_select_proxies_follows_controller() {
        let view = button_view();
        let supplied = vec![ProxyNode::element("label", Proxy::new().prop("id", "a"))];

        let own = select_proxies(&ControllerLookup::NotFound, &view, &supplied);
        assert_eq!(own.get("label"), Some(&Proxy::default()));

        let external = select_proxies(
            &ControllerLookup::Found("c/NavController.js".into()),
            &view,
            &supplied,
        );
        assert_eq!(external.get("label").unwrap().props.get("id").unwrap(), "a");
    }

    #[test]
    fn test_style_and_inner_html() {
        let view = ComponentNode::new(
            "page",
            "<div style=\"background-color: red\"><style>.a{b:c}</style><br></div>",
        )
        .unwrap();
        assert_eq!(
            render_view(&view, &default_proxies(&view)),
            "<div style=\"background-color:red\"><style>.__af-a{b:c}</style><br></div>"
        );
    }

    #[test]
    fn test_child_component_renders_with_own_defaults() {
        let view = ComponentNode::new(
            "index",
            r#"<main><div af-el="nav"><button af-sock="label">Click</button></div></main>"#,
        )
        .unwrap();
        assert_eq!(
            render_view(&view, &default_proxies(&view)),
            "<main><div><button>Click</button></div></main>"
        );
    }

    #[test]
    fn test_socketed_child_receives_proxy_children() {
        let view = ComponentNode::new(
            "index",
            r#"<main><div af-el="nav" af-sock="menu"><a af-sock="link">Home</a></div></main>"#,
        )
        .unwrap();
        let mut proxies = ProxySet::new();
        proxies.insert(
            "menu".to_string(),
            Proxy::new().children(vec![ProxyNode::element(
                "link",
                Proxy::new().prop("href", "/").children(vec![ProxyNode::text("Start")]),
            )]),
        );

        // self-controlled child ignores what it is handed
        assert_eq!(
            render_view(&view, &proxies),
            "<main><div><a>Home</a></div></main>"
        );

        let external = |child: &ComponentNode| {
            if child.class_name() == "NavView" {
                ControllerLookup::Found("ctrl/NavController.js".into())
            } else {
                ControllerLookup::NotFound
            }
        };
        assert_eq!(
            render_view_with(&view, &proxies, &external),
            r#"<main><div><a href="/">Start</a></div></main>"#
        );

        // no proxy for the socket: the child is not rendered at all
        assert_eq!(
            render_view_with(&view, &ProxySet::new(), &external),
            "<main></main>"
        );
    }
}
