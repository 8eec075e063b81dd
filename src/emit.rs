//! Emission
//!
//! Composes the CommonJS units written for a compiled view tree: one React
//! component module per view, an `index.js` re-exporting them and the
//! `utils.js` runtime the modules import.

use crate::jsx::js_string;
use crate::view::ComponentNode;

/// Runtime helpers shipped next to the generated views as `utils.js`.
pub const VIEW_UTILS: &str = include_str!("../runtime/view-utils.js");

pub const INDEX_FILE: &str = "index.js";
pub const UTILS_FILE: &str = "utils.js";

/// `NavView` → `NavView.js`
pub fn module_file_name(class_name: &str) -> String {
    format!("{}.js", class_name)
}

fn indent_block(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn compose_imports(view: &ComponentNode) -> String {
    let mut imports = vec!["const React = require('react')".to_string()];
    for child in view.children() {
        imports.push(format!(
            "const {} = require({})",
            child.class_name(),
            js_string(&format!("./{}", child.class_name()))
        ));
    }
    imports.push("const { createScope, transformProxies } = require('./utils')".to_string());
    imports.join("\n")
}

fn compose_default_proxies(view: &ComponentNode) -> String {
    if view.sockets().is_empty() {
        return "{}".to_string();
    }
    let entries: String = view
        .sockets()
        .iter()
        .map(|socket| format!("      {}: {{}},\n", js_string(socket)))
        .collect();
    format!("{{\n{}    }}", entries)
}

/// Compose the component module for one view.
///
/// `controllers_dir` is the controller directory as seen from the views
/// directory, e.g. `../controllers`.
pub fn compose_module(view: &ComponentNode, controllers_dir: &str) -> String {
    let class_name = view.class_name();
    let controller_path = format!(
        "{}/{}",
        controllers_dir.trim_end_matches('/'),
        view.controller_class_name()
    );
    let template = if view.template().is_empty() {
        "null".to_string()
    } else {
        view.template().to_string()
    };

    format!(
        r#"{imports}

let Controller

class {class_name} extends React.Component {{
  static get Controller() {{
    if (Controller) return Controller

    try {{
      Controller = require({controller_path})
      Controller = Controller.default || Controller

      return Controller
    }}
    catch (e) {{
      if (e.code == 'MODULE_NOT_FOUND') {{
        Controller = {class_name}

        return Controller
      }}

      throw e
    }}
  }}

  render() {{
    const proxies = {class_name}.Controller !== {class_name} ? transformProxies(this.props.children) : {default_proxies}

    return (
{template}
    )
  }}
}}

module.exports = {class_name}
"#,
        imports = compose_imports(view),
        class_name = class_name,
        controller_path = js_string(&controller_path),
        default_proxies = compose_default_proxies(view),
        template = indent_block(&template, 6),
    )
}

/// `index.js` re-exporting every unit by class name, in the given order.
pub fn compose_index<'a>(views: impl IntoIterator<Item = &'a ComponentNode>) -> String {
    let mut out = String::new();
    for view in views {
        out.push_str(&format!(
            "exports.{} = require({})\n",
            view.class_name(),
            js_string(&format!("./{}", view.class_name()))
        ));
    }
    out
}
