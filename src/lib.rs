//! # View Compiler
//!
//! Compiles designer-exported markup into a tree of React view modules.
//!
//! ## Markers
//!
//! 1. **`af-el="label"`**: the element becomes its own view. It is replaced
//!    in the parent by a reference to the child's `Controller`.
//! 2. **`af-sock="name"`**: the element becomes a socket. At render time it
//!    only appears when the controller passes a proxy for `name`, and the
//!    proxy's props and children override the authored ones.
//! 3. **`af-ignore`**: the element is dropped.
//! 4. **`af-empty`**: the element is kept without its content.
//!
//! ## Pipeline
//!
//! Per view: style scoping (`__af-` class namespace) → decomposition into
//! child views → socket tagging → HTML to JSX conversion → binding. Emission
//! turns each view into a CommonJS module whose `Controller` resolves to
//! `<controllers>/<Name>Controller` or, when that module is missing, to the
//! view itself.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod bind;
mod cache;
mod codegen;
mod config;
mod controller;
mod decompose;
mod discovery;
mod emit;
mod error;
mod jsx;
mod markup;
mod naming;
mod render;
mod socket;
mod style;
mod view;
mod visitor;
mod writer;


pub use bind::{bind_template, controller_ref, ChildBinder, SocketBinder};
pub use cache::IncrementalCache;
pub use codegen::{check_module, collect_requires, format_module};
pub use config::CompileOptions;
pub use controller::{ControllerLoader, ControllerLookup, ControllerResolver, FsControllerLoader};
pub use decompose::{
    decompose, Extraction, EMPTY_MARKER, EXTRACT_MARKER, IGNORE_MARKER, SOCKET_MARKER,
};
pub use discovery::{discover_pages, page_label, Page};
pub use emit::{compose_index, compose_module, VIEW_UTILS};
pub use error::{Result, ViewError};
pub use jsx::{
    print_template, JsxConverter, SocketContent, SocketNode, TemplateConverter, TemplateNode,
};
pub use markup::{parse_body, pretty_print, MarkupNode};
pub use naming::{derive_names, ViewNames};
pub use render::{
    default_proxies, render_view, render_view_with, select_proxies, ControllerFn, Proxy, ProxyNode,
    ProxySet,
};
pub use socket::tag_sockets;
pub use style::{scope_class_attribute, scope_stylesheet, CLASS_PREFIX};
pub use view::ComponentNode;
pub use visitor::TemplateVisitor;
pub use writer::{relative_controllers_dir, transpile, ViewWriter};

#[cfg(feature = "napi")]
fn to_napi_error(err: ViewError) -> napi::Error {
    napi::Error::from_reason(format!("[{}] {}", err.code(), err))
}

/// Compile one markup document and return the serialized view tree.
#[cfg(feature = "napi")]
#[napi]
pub fn compile_view_native(label: String, html: String) -> napi::Result<serde_json::Value> {
    let view = ComponentNode::new(&label, &html).map_err(to_napi_error)?;
    serde_json::to_value(&view).map_err(|e| napi::Error::from_reason(e.to_string()))
}

/// Compile every page under `input_dir` and return the written paths.
#[cfg(feature = "napi")]
#[napi]
pub fn transpile_native(input_dir: String, options_json: String) -> napi::Result<Vec<String>> {
    let options = CompileOptions::from_json(&options_json).map_err(to_napi_error)?;
    let paths = transpile(std::path::Path::new(&input_dir), &options).map_err(to_napi_error)?;
    Ok(paths
        .into_iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect())
}
