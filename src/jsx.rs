//! JSX Template Module
//!
//! Structural HTML → JSX conversion and printing. The converter knows nothing
//! about sockets: tagged names like `button-af-sock-label` are ordinary tags
//! here and are only interpreted by the binder.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::markup::{Attribute, Element, MarkupNode};

pub const FRAGMENT_TAG: &str = "React.Fragment";

lazy_static! {
    /// HTML attribute names that React spells differently.
    static ref REACT_ATTR_NAMES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("class", "className");
        m.insert("for", "htmlFor");
        m.insert("accept-charset", "acceptCharset");
        m.insert("accesskey", "accessKey");
        m.insert("allowfullscreen", "allowFullScreen");
        m.insert("autocomplete", "autoComplete");
        m.insert("autofocus", "autoFocus");
        m.insert("autoplay", "autoPlay");
        m.insert("cellpadding", "cellPadding");
        m.insert("cellspacing", "cellSpacing");
        m.insert("charset", "charSet");
        m.insert("colspan", "colSpan");
        m.insert("contenteditable", "contentEditable");
        m.insert("crossorigin", "crossOrigin");
        m.insert("datetime", "dateTime");
        m.insert("enctype", "encType");
        m.insert("formaction", "formAction");
        m.insert("frameborder", "frameBorder");
        m.insert("http-equiv", "httpEquiv");
        m.insert("inputmode", "inputMode");
        m.insert("maxlength", "maxLength");
        m.insert("minlength", "minLength");
        m.insert("marginheight", "marginHeight");
        m.insert("marginwidth", "marginWidth");
        m.insert("novalidate", "noValidate");
        m.insert("playsinline", "playsInline");
        m.insert("readonly", "readOnly");
        m.insert("referrerpolicy", "referrerPolicy");
        m.insert("rowspan", "rowSpan");
        m.insert("spellcheck", "spellCheck");
        m.insert("srcdoc", "srcDoc");
        m.insert("srcset", "srcSet");
        m.insert("tabindex", "tabIndex");
        m.insert("usemap", "useMap");
        m.insert("viewbox", "viewBox");
        m.insert("xlink:href", "xlinkHref");
        m.insert("xml:lang", "xmlLang");
        m.insert("xml:space", "xmlSpace");
        m.insert("clip-path", "clipPath");
        m.insert("clip-rule", "clipRule");
        m.insert("fill-opacity", "fillOpacity");
        m.insert("fill-rule", "fillRule");
        m.insert("font-family", "fontFamily");
        m.insert("font-size", "fontSize");
        m.insert("font-weight", "fontWeight");
        m.insert("stop-color", "stopColor");
        m.insert("stop-opacity", "stopOpacity");
        m.insert("stroke-dasharray", "strokeDasharray");
        m.insert("stroke-dashoffset", "strokeDashoffset");
        m.insert("stroke-linecap", "strokeLinecap");
        m.insert("stroke-linejoin", "strokeLinejoin");
        m.insert("stroke-miterlimit", "strokeMiterlimit");
        m.insert("stroke-opacity", "strokeOpacity");
        m.insert("stroke-width", "strokeWidth");
        m.insert("text-anchor", "textAnchor");
        m
    };

    /// Attributes React treats as booleans; an empty value means `true`.
    static ref BOOLEAN_ATTRS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("allowfullscreen");
        s.insert("async");
        s.insert("autofocus");
        s.insert("autoplay");
        s.insert("checked");
        s.insert("controls");
        s.insert("default");
        s.insert("defer");
        s.insert("disabled");
        s.insert("formnovalidate");
        s.insert("hidden");
        s.insert("loop");
        s.insert("multiple");
        s.insert("muted");
        s.insert("novalidate");
        s.insert("open");
        s.insert("playsinline");
        s.insert("readonly");
        s.insert("required");
        s.insert("reversed");
        s.insert("selected");
        s
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPLATE IR TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TemplateNode {
    Element(ElementNode),
    /// Reference to a child view; `tag` is the controller expression.
    Component(ElementNode),
    Text(TextNode),
    Comment(TextNode),
    Socket(SocketNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub tag: String,
    pub attributes: Vec<AttributeIR>,
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeIR {
    pub name: String,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum AttributeValue {
    Static(String),
    /// Boolean attribute written without a value.
    Flag,
    /// Parsed inline style, property names as authored.
    Style(Vec<StyleProperty>),
    /// Raw HTML injected through `dangerouslySetInnerHTML`.
    InnerHtml(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProperty {
    pub property: String,
    pub value: String,
}

/// A bound socket. The target keeps its attributes; its content lives in
/// `content` so the guarded render can be printed around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketNode {
    pub name: String,
    pub target: ElementNode,
    pub is_component: bool,
    pub content: SocketContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "nodes", rename_all = "kebab-case")]
pub enum SocketContent {
    /// No authored content: render whatever the proxy brings.
    Proxied,
    /// Authored content rendered when the proxy has no children.
    Fallback(Vec<TemplateNode>),
    /// Content with nested sockets, resolved against the proxy's children.
    Scoped(Vec<TemplateNode>),
}

impl TemplateNode {
    pub fn children(&self) -> &[TemplateNode] {
        match self {
            TemplateNode::Element(el) | TemplateNode::Component(el) => &el.children,
            TemplateNode::Socket(socket) => match &socket.content {
                SocketContent::Proxied => &[],
                SocketContent::Fallback(nodes) | SocketContent::Scoped(nodes) => nodes,
            },
            TemplateNode::Text(_) | TemplateNode::Comment(_) => &[],
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONVERSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Structural markup → template conversion.
///
/// Implementations must keep element nesting, attributes and text, and must
/// pass tag names through unchanged.
pub trait TemplateConverter: Send + Sync {
    fn convert(&self, markup: &[MarkupNode]) -> Vec<TemplateNode>;
}

/// HTML → JSX conversion with React's attribute conventions.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsxConverter;

impl TemplateConverter for JsxConverter {
    fn convert(&self, markup: &[MarkupNode]) -> Vec<TemplateNode> {
        markup.iter().filter_map(convert_node).collect()
    }
}

fn convert_node(node: &MarkupNode) -> Option<TemplateNode> {
    match node {
        MarkupNode::Text { value } => {
            if value.trim().is_empty() && value.contains('\n') {
                None
            } else {
                Some(TemplateNode::Text(TextNode {
                    value: value.clone(),
                }))
            }
        }
        MarkupNode::Comment { value } => Some(TemplateNode::Comment(TextNode {
            value: value.trim().to_string(),
        })),
        MarkupNode::Element(el) => Some(TemplateNode::Element(convert_element(el))),
    }
}

fn text_content(el: &Element) -> String {
    el.children
        .iter()
        .filter_map(|c| match c {
            MarkupNode::Text { value } => Some(value.as_str()),
            _ => None,
        })
        .collect()
}

fn convert_element(el: &Element) -> ElementNode {
    let base_tag = crate::socket::split_socket_tag(&el.tag)
        .map(|(tag, _)| tag)
        .unwrap_or(&el.tag);
    let mut attributes: Vec<AttributeIR> = el
        .attributes
        .iter()
        .map(|attr| convert_attribute(base_tag, attr))
        .collect();

    let children = match base_tag {
        "style" => {
            attributes.push(AttributeIR {
                name: "dangerouslySetInnerHTML".to_string(),
                value: AttributeValue::InnerHtml(text_content(el)),
            });
            Vec::new()
        }
        "textarea" => {
            let value = text_content(el);
            if !value.is_empty() {
                attributes.push(AttributeIR {
                    name: "defaultValue".to_string(),
                    value: AttributeValue::Static(value),
                });
            }
            Vec::new()
        }
        _ => el.children.iter().filter_map(convert_node).collect(),
    };

    ElementNode {
        tag: el.tag.clone(),
        attributes,
        children,
    }
}

fn convert_attribute(tag: &str, attr: &Attribute) -> AttributeIR {
    let lower = attr.name.to_ascii_lowercase();

    if lower == "style" {
        return AttributeIR {
            name: "style".to_string(),
            value: AttributeValue::Style(parse_style(&attr.value)),
        };
    }

    let name = match (tag, lower.as_str()) {
        ("input" | "select" | "textarea", "value") => "defaultValue".to_string(),
        ("input", "checked") => "defaultChecked".to_string(),
        _ => REACT_ATTR_NAMES
            .get(lower.as_str())
            .map(|n| n.to_string())
            .unwrap_or_else(|| attr.name.clone()),
    };

    let value = if attr.value.is_empty() && BOOLEAN_ATTRS.contains(lower.as_str()) {
        AttributeValue::Flag
    } else {
        AttributeValue::Static(attr.value.clone())
    };

    AttributeIR { name, value }
}

/// Split an inline style into declarations. Semicolons inside parentheses or
/// quotes (data URIs, fonts) don't end a declaration.
pub fn parse_style(style: &str) -> Vec<StyleProperty> {
    let mut declarations = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in style.chars() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                declarations.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    declarations.push(current);

    declarations
        .iter()
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            Some(StyleProperty {
                property: property.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// `background-color` → `backgroundColor`, `-webkit-x` → `WebkitX`, `-ms-x` → `msX`.
pub fn style_property_name(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let lower = property.to_ascii_lowercase();
    let trimmed = match lower.strip_prefix("-ms-") {
        Some(rest) => format!("ms-{}", rest),
        None => lower,
    };

    let mut out = String::with_capacity(trimmed.len());
    let mut upper_next = false;
    for (i, c) in trimmed.chars().enumerate() {
        if c == '-' {
            upper_next = i > 0 || out.is_empty();
            continue;
        }
        if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRINTING
// ═══════════════════════════════════════════════════════════════════════════════

/// Quote a string as a single-quoted JavaScript literal.
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

pub fn escape_jsx_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '{' => out.push_str("{'{'}"),
            '}' => out.push_str("{'}'}"),
            _ => out.push(c),
        }
    }
    out
}

fn style_value(value: &str) -> String {
    let numeric = value.starts_with(|c: char| c.is_ascii_digit())
        && value.chars().all(|c| c.is_ascii_digit() || c == '.');
    if numeric && value.parse::<f64>().is_ok() {
        value.to_string()
    } else {
        js_string(value)
    }
}

fn print_attribute(attr: &AttributeIR) -> String {
    match &attr.value {
        AttributeValue::Static(value) => {
            format!("{}=\"{}\"", attr.name, crate::markup::escape_attribute(value))
        }
        AttributeValue::Flag => attr.name.clone(),
        AttributeValue::Style(properties) => {
            let entries: Vec<String> = properties
                .iter()
                .map(|p| {
                    let key = style_property_name(&p.property);
                    let key = if key.starts_with("--") { js_string(&key) } else { key };
                    format!("{}: {}", key, style_value(&p.value))
                })
                .collect();
            if entries.is_empty() {
                format!("{}={{{{}}}}", attr.name)
            } else {
                format!("{}={{{{ {} }}}}", attr.name, entries.join(", "))
            }
        }
        AttributeValue::InnerHtml(html) => {
            format!("{}={{{{ __html: {} }}}}", attr.name, js_string(html))
        }
    }
}

fn print_attributes(attributes: &[AttributeIR]) -> String {
    attributes
        .iter()
        .map(|a| format!(" {}", print_attribute(a)))
        .collect()
}

/// `proxies['name']`
pub fn proxy_ref(socket: &str) -> String {
    format!("proxies[{}]", js_string(socket))
}

struct SocketParts {
    head: String,
    open: String,
    close: String,
    tail: String,
}

fn socket_parts(socket: &SocketNode) -> SocketParts {
    let proxy = proxy_ref(&socket.name);
    let tag = &socket.target.tag;
    let head = format!(
        "{{{} && <{}{} {{...{}}}>",
        proxy,
        tag,
        print_attributes(&socket.target.attributes),
        proxy
    );
    let tail = format!("</{}>}}", tag);
    let (open, close) = match &socket.content {
        SocketContent::Proxied => (format!("{{{}.children", proxy), "}".to_string()),
        SocketContent::Fallback(_) => (
            format!(
                "{{{}.children ? {}.children : <{}>",
                proxy, proxy, FRAGMENT_TAG
            ),
            format!("</{}>}}", FRAGMENT_TAG),
        ),
        SocketContent::Scoped(_) => (
            format!(
                "{{createScope({}.children, (proxies) => <{}>",
                proxy, FRAGMENT_TAG
            ),
            format!("</{}>)}}", FRAGMENT_TAG),
        ),
    };
    SocketParts {
        head,
        open,
        close,
        tail,
    }
}

fn has_text(nodes: &[TemplateNode]) -> bool {
    nodes.iter().any(|n| matches!(n, TemplateNode::Text(_)))
}

fn inline_node(node: &TemplateNode) -> String {
    match node {
        TemplateNode::Text(text) => escape_jsx_text(&text.value),
        TemplateNode::Comment(text) => format!("{{/* {} */}}", text.value.replace("*/", "* /")),
        TemplateNode::Element(el) | TemplateNode::Component(el) => {
            let attrs = print_attributes(&el.attributes);
            if el.children.is_empty() {
                format!("<{}{} />", el.tag, attrs)
            } else {
                let inner: String = el.children.iter().map(inline_node).collect();
                format!("<{}{}>{}</{}>", el.tag, attrs, inner, el.tag)
            }
        }
        TemplateNode::Socket(socket) => {
            let parts = socket_parts(socket);
            let inner: String = node.children().iter().map(inline_node).collect();
            format!(
                "{}{}{}{}{}",
                parts.head, parts.open, inner, parts.close, parts.tail
            )
        }
    }
}

fn block_list(nodes: &[TemplateNode], depth: usize, lines: &mut Vec<String>) {
    if has_text(nodes) {
        let inline: String = nodes.iter().map(inline_node).collect();
        lines.push(format!("{}{}", "  ".repeat(depth), inline.trim()));
    } else {
        for node in nodes {
            block_node(node, depth, lines);
        }
    }
}

fn block_node(node: &TemplateNode, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match node {
        TemplateNode::Element(el) | TemplateNode::Component(el)
            if !el.children.is_empty() && !has_text(&el.children) =>
        {
            lines.push(format!("{}<{}{}>", indent, el.tag, print_attributes(&el.attributes)));
            block_list(&el.children, depth + 1, lines);
            lines.push(format!("{}</{}>", indent, el.tag));
        }
        TemplateNode::Socket(socket)
            if !node.children().is_empty() && !has_text(node.children()) =>
        {
            let parts = socket_parts(socket);
            lines.push(format!("{}{}{}", indent, parts.head, parts.open));
            block_list(node.children(), depth + 1, lines);
            lines.push(format!("{}{}{}", indent, parts.close, parts.tail));
        }
        _ => lines.push(format!("{}{}", indent, inline_node(node))),
    }
}

/// Print a template tree as a single JSX expression.
///
/// A lone element is printed as is; anything else is wrapped in a fragment,
/// and an empty tree prints `null`.
pub fn print_template(nodes: &[TemplateNode]) -> String {
    let mut lines = Vec::new();
    match nodes {
        [] => return "null".to_string(),
        [TemplateNode::Element(_)] | [TemplateNode::Component(_)] => {
            block_node(&nodes[0], 0, &mut lines)
        }
        _ => {
            lines.push(format!("<{}>", FRAGMENT_TAG));
            block_list(nodes, 1, &mut lines);
            lines.push(format!("</{}>", FRAGMENT_TAG));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_body;

    fn convert(html: &str) -> Vec<TemplateNode> {
        JsxConverter.convert(&parse_body(html, "test").unwrap())
    }

    #[test]
    fn test_attribute_renames() {
        let jsx = print_template(&convert(
            r#"<label for="x" class="a" tabindex="1" data-w-id="9">Name</label>"#,
        ));
        assert_eq!(
            jsx,
            r#"<label htmlFor="x" className="a" tabIndex="1" data-w-id="9">Name</label>"#
        );
    }

    #[test]
    fn test_void_and_boolean_attributes() {
        let jsx = print_template(&convert(r#"<input type="checkbox" checked disabled value="a">"#));
        assert_eq!(
            jsx,
            r#"<input type="checkbox" defaultChecked disabled defaultValue="a" />"#
        );
    }

    #[test]
    fn test_style_object() {
        let jsx = print_template(&convert(
            r#"<div style="background-color: red; -webkit-transform: none; opacity: 0; background: url(data:image/png;base64,AAA)"></div>"#,
        ));
        assert_eq!(
            jsx,
            "<div style={{ backgroundColor: 'red', WebkitTransform: 'none', opacity: 0, background: 'url(data:image/png;base64,AAA)' }} />"
        );
    }

    #[test]
    fn test_style_element_becomes_inner_html() {
        let jsx = print_template(&convert("<div><style>.a{content:'x'}</style></div>"));
        assert_eq!(
            jsx,
            "<div>\n  <style dangerouslySetInnerHTML={{ __html: '.a{content:\\'x\\'}' }} />\n</div>"
        );
    }

    #[test]
    fn test_text_escaping_and_comments() {
        let jsx = print_template(&convert("<p>a {b} <i>c</i><!-- note --></p>"));
        assert_eq!(jsx, "<p>a {'{'}b{'}'} <i>c</i>{/* note */}</p>");
    }

    #[test]
    fn test_block_layout_and_fragment_wrapping() {
        let jsx = print_template(&convert("<div>\n  <span>a</span>\n</div>\n<p>b</p>"));
        assert_eq!(
            jsx,
            "<React.Fragment>\n  <div>\n    <span>a</span>\n  </div>\n  <p>b</p>\n</React.Fragment>"
        );
        assert_eq!(print_template(&[]), "null");
    }

    #[test]
    fn test_socket_suffix_passes_through() {
        let jsx = print_template(&convert("<button-af-sock-label class=\"b\">Click</button-af-sock-label>"));
        assert_eq!(
            jsx,
            "<button-af-sock-label className=\"b\">Click</button-af-sock-label>"
        );
    }

    #[test]
    fn test_style_property_names() {
        assert_eq!(style_property_name("background-color"), "backgroundColor");
        assert_eq!(style_property_name("-webkit-transform"), "WebkitTransform");
        assert_eq!(style_property_name("-ms-flex"), "msFlex");
        assert_eq!(style_property_name("--brand"), "--brand");
    }

    #[test]
    fn test_js_string() {
        assert_eq!(js_string("it's\n"), "'it\\'s\\n'");
    }
}
