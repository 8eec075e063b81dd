//! View Module
//!
//! `ComponentNode` is one compiled view: its identifiers, its sanitized
//! markup, its bound template and the child views extracted from it. Every
//! markup assignment reruns the whole pipeline:
//!
//! scope styles → decompose → tag sockets → convert → bind
//!
//! Children are compiled from the subtrees that decomposition moved out of
//! this view, so each node owns its subtree exclusively.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::bind::bind_template;
use crate::decompose::{decompose, Extraction};
use crate::error::{Result, ViewError};
use crate::jsx::{print_template, JsxConverter, TemplateConverter, TemplateNode};
use crate::markup::{parse_body, pretty_print, MarkupNode};
use crate::naming::{derive_names, ViewNames};
use crate::socket::{find_duplicate, tag_sockets};
use crate::style::scope_markup;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    label: String,
    names: ViewNames,
    state: ViewState,
}

/// Everything derived from the current markup. Replaced wholesale on every
/// assignment, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewState {
    sanitized_markup: String,
    sockets: Vec<String>,
    template_nodes: Vec<TemplateNode>,
    template: String,
    children: Vec<ComponentNode>,
}

impl ComponentNode {
    /// Compile `markup` as a view named `label` with the JSX converter.
    pub fn new(label: &str, markup: &str) -> Result<Self> {
        Self::with_converter(label, markup, &JsxConverter)
    }

    pub fn with_converter(
        label: &str,
        markup: &str,
        converter: &dyn TemplateConverter,
    ) -> Result<Self> {
        let mut node = Self {
            label: label.to_string(),
            names: derive_names(label)?,
            state: ViewState::default(),
        };
        node.set_markup_with(markup, converter)?;
        Ok(node)
    }

    fn from_extraction(extraction: Extraction, converter: &dyn TemplateConverter) -> Result<Self> {
        let Extraction {
            label,
            names,
            element,
        } = extraction;
        let state = compile(&label, &names, vec![MarkupNode::Element(element)], converter)?;
        Ok(Self {
            label,
            names,
            state,
        })
    }

    pub fn set_markup(&mut self, markup: &str) -> Result<()> {
        self.set_markup_with(markup, &JsxConverter)
    }

    /// Replace the markup and recompute every derived field. Empty markup
    /// clears the view. On error the previous state is kept.
    pub fn set_markup_with(&mut self, markup: &str, converter: &dyn TemplateConverter) -> Result<()> {
        self.state = if markup.trim().is_empty() {
            ViewState::default()
        } else {
            let nodes = parse_body(markup, &self.label)?;
            compile(&self.label, &self.names, nodes, converter)?
        };
        Ok(())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn names(&self) -> &ViewNames {
        &self.names
    }

    pub fn controller_class_name(&self) -> &str {
        &self.names.controller_class_name
    }

    pub fn class_name(&self) -> &str {
        &self.names.class_name
    }

    pub fn element_tag(&self) -> &str {
        &self.names.element_tag
    }

    pub fn file_slug(&self) -> &str {
        &self.names.file_slug
    }

    pub fn sanitized_markup(&self) -> &str {
        &self.state.sanitized_markup
    }

    pub fn sockets(&self) -> &[String] {
        &self.state.sockets
    }

    pub fn template(&self) -> &str {
        &self.state.template
    }

    pub fn template_nodes(&self) -> &[TemplateNode] {
        &self.state.template_nodes
    }

    pub fn children(&self) -> &[ComponentNode] {
        &self.state.children
    }

    /// This node plus all of its descendants.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Self::node_count).sum::<usize>()
    }

    /// Pre-order walk: this node, then each child subtree in order.
    pub fn descendants(&self) -> Vec<&ComponentNode> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.descendants());
        }
        out
    }
}

fn compile(
    label: &str,
    names: &ViewNames,
    mut nodes: Vec<MarkupNode>,
    converter: &dyn TemplateConverter,
) -> Result<ViewState> {
    scope_markup(&mut nodes);

    let extracted = decompose(&mut nodes)?;
    // placeholders bind by tag, units are written and required by class name
    let mut tags = HashSet::new();
    let mut classes = HashSet::new();
    for ex in &extracted {
        let duplicate = if !tags.insert(ex.names.element_tag.as_str()) {
            Some(&ex.names.element_tag)
        } else if !classes.insert(ex.names.class_name.as_str()) {
            Some(&ex.names.class_name)
        } else {
            None
        };
        if let Some(name) = duplicate {
            return Err(ViewError::DuplicateChild {
                view: names.class_name.clone(),
                name: name.clone(),
            });
        }
    }
    let children = extracted
        .into_iter()
        .map(|ex| ComponentNode::from_extraction(ex, converter))
        .collect::<Result<Vec<_>>>()?;

    let sanitized_markup = pretty_print(&nodes);

    let sockets = tag_sockets(&mut nodes);
    if let Some(socket) = find_duplicate(&sockets) {
        return Err(ViewError::DuplicateSocket {
            view: names.class_name.clone(),
            socket: socket.to_string(),
        });
    }

    let mut template_nodes = converter.convert(&nodes);
    bind_template(&mut template_nodes, children.iter().map(ComponentNode::names));
    let template = print_template(&template_nodes);

    debug!(
        view = %label,
        class = %names.class_name,
        children = children.len(),
        sockets = sockets.len(),
        "compiled view"
    );

    Ok(ViewState {
        sanitized_markup,
        sockets,
        template_nodes,
        template,
        children,
    })
}
