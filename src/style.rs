//! Style scoping.
//!
//! Class selectors in embedded stylesheets and class tokens on elements are
//! moved into a private namespace so independently generated views can't
//! collide with each other or with the host page. Scoping is idempotent.

use lazy_static::lazy_static;
use regex::Regex;

use crate::markup::{for_each_element_mut, MarkupNode};

/// Private class namespace prefix.
pub const CLASS_PREFIX: &str = "__af-";

lazy_static! {
    static ref CLASS_TOKEN_RE: Regex = Regex::new(r"\S+").unwrap();
}

/// At-rules whose blocks contain nested rules rather than declarations.
const GROUPING_AT_RULES: &[&str] = &["media", "supports", "document", "layer", "container"];

/// Scope every stylesheet and class attribute in the tree.
pub fn scope_markup(nodes: &mut [MarkupNode]) {
    for_each_element_mut(nodes, &mut |el| {
        if el.tag == "style" {
            for child in el.children.iter_mut() {
                if let MarkupNode::Text { value } = child {
                    *value = scope_stylesheet(value);
                }
            }
        }
        if let Some(class) = el.attr("class") {
            let scoped = scope_class_attribute(class);
            el.set_attr("class", scoped);
        }
    });
}

/// Prefix every whitespace-delimited class token that isn't already scoped.
pub fn scope_class_attribute(value: &str) -> String {
    CLASS_TOKEN_RE
        .replace_all(value, |caps: &regex::Captures| scope_class_name(&caps[0]))
        .to_string()
}

fn scope_class_name(name: &str) -> String {
    if name.starts_with(CLASS_PREFIX) {
        name.to_string()
    } else {
        format!("{}{}", CLASS_PREFIX, name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Block {
    Rules,
    Declarations,
}

/// Scope the class selectors of a stylesheet.
///
/// Only rule preludes are rewritten. Declaration blocks, comments and strings
/// are copied through untouched, so `url(a.png)` or `content: ".x"` survive.
pub fn scope_stylesheet(css: &str) -> String {
    let chars: Vec<char> = css.chars().collect();
    let mut out = String::with_capacity(css.len() + 32);
    let mut stack: Vec<Block> = Vec::new();
    let mut prelude = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '/' && chars.get(i + 1) == Some(&'*') {
            let end = find_comment_end(&chars, i + 2);
            let comment: String = chars[i..end].iter().collect();
            if in_declarations(&stack) {
                out.push_str(&comment);
            } else {
                prelude.push_str(&comment);
            }
            i = end;
            continue;
        }

        if in_declarations(&stack) {
            match c {
                '"' | '\'' => {
                    let end = find_string_end(&chars, i);
                    out.extend(&chars[i..end]);
                    i = end;
                    continue;
                }
                '{' => stack.push(Block::Declarations),
                '}' => {
                    stack.pop();
                }
                _ => {}
            }
            out.push(c);
            i += 1;
            continue;
        }

        match c {
            '"' | '\'' => {
                let end = find_string_end(&chars, i);
                prelude.extend(&chars[i..end]);
                i = end;
                continue;
            }
            '{' => {
                let block = block_kind(&prelude);
                if block == Block::Declarations && !prelude.trim_start().starts_with('@') {
                    out.push_str(&scope_selector(&prelude));
                } else {
                    out.push_str(&prelude);
                }
                prelude.clear();
                stack.push(block);
                out.push(c);
            }
            ';' => {
                out.push_str(&prelude);
                prelude.clear();
                out.push(c);
            }
            '}' => {
                out.push_str(&prelude);
                prelude.clear();
                stack.pop();
                out.push(c);
            }
            _ => prelude.push(c),
        }
        i += 1;
    }

    out.push_str(&prelude);
    out
}

fn in_declarations(stack: &[Block]) -> bool {
    stack.last() == Some(&Block::Declarations)
}

fn block_kind(prelude: &str) -> Block {
    let trimmed = prelude.trim_start();
    match trimmed.strip_prefix('@') {
        Some(rest) => {
            let name: String = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
                .to_ascii_lowercase();
            // -webkit-keyframes etc.
            if GROUPING_AT_RULES.contains(&name.as_str()) || name.ends_with("keyframes") {
                Block::Rules
            } else {
                Block::Declarations
            }
        }
        None => Block::Declarations,
    }
}

fn find_comment_end(chars: &[char], from: usize) -> usize {
    let mut i = from;
    while i + 1 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '/' {
            return i + 2;
        }
        i += 1;
    }
    chars.len()
}

fn find_string_end(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

/// Prefix the class selectors of one selector list.
pub fn scope_selector(selector: &str) -> String {
    let chars: Vec<char> = selector.chars().collect();
    let mut out = String::with_capacity(selector.len() + 16);
    let mut bracket_depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '/' if chars.get(i + 1) == Some(&'*') => {
                let end = find_comment_end(&chars, i + 2);
                out.extend(&chars[i..end]);
                i = end;
                continue;
            }
            '"' | '\'' => {
                let end = find_string_end(&chars, i);
                out.extend(&chars[i..end]);
                i = end;
                continue;
            }
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            '.' if bracket_depth == 0 && chars.get(i + 1).copied().map_or(false, is_ident_start) => {
                let mut end = i + 1;
                while end < chars.len() {
                    if chars[end] == '\\' && end + 1 < chars.len() {
                        end += 2;
                    } else if is_ident_char(chars[end]) {
                        end += 1;
                    } else {
                        break;
                    }
                }
                let name: String = chars[i + 1..end].iter().collect();
                out.push('.');
                out.push_str(&scope_class_name(&name));
                i = end;
                continue;
            }
            _ => {}
        }
        out.push(c);
        i += 1;
    }

    out
}
