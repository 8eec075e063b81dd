//! Module Check & Formatting
//!
//! Every emitted unit goes through `oxc_parser` before it is written. A unit
//! that does not parse as JSX is a compiler bug and is reported as
//! `ViewError::InvalidModule` instead of being written to disk.

use oxc_allocator::Allocator;
use oxc_ast::ast::{Argument, CallExpression, Expression};
use oxc_ast_visit::Visit;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::error::{Result, ViewError};

fn source_type() -> SourceType {
    SourceType::default().with_jsx(true)
}

fn parse_errors<E: std::fmt::Display>(view: &str, errors: &[E]) -> ViewError {
    ViewError::InvalidModule {
        view: view.to_string(),
        errors: errors.iter().map(|e| e.to_string()).collect(),
    }
}

/// Fail if `code` is not syntactically valid JSX.
pub fn check_module(view: &str, code: &str) -> Result<()> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, source_type()).parse();
    if !ret.errors.is_empty() {
        return Err(parse_errors(view, &ret.errors));
    }
    Ok(())
}

/// Parse and re-print `code` with oxc's code generator.
pub fn format_module(view: &str, code: &str) -> Result<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, source_type()).parse();
    if !ret.errors.is_empty() {
        return Err(parse_errors(view, &ret.errors));
    }
    Ok(Codegen::new().build(&ret.program).code)
}

struct RequireCollector {
    specifiers: Vec<String>,
}

impl<'a> Visit<'a> for RequireCollector {
    fn visit_call_expression(&mut self, expr: &CallExpression<'a>) {
        if let Expression::Identifier(ident) = &expr.callee {
            if ident.name == "require" {
                if let Some(Argument::StringLiteral(lit)) = expr.arguments.first() {
                    self.specifiers.push(lit.value.to_string());
                }
            }
        }
        oxc_ast_visit::walk::walk_call_expression(self, expr);
    }
}

/// Literal `require()` specifiers of a module, in source order.
pub fn collect_requires(view: &str, code: &str) -> Result<Vec<String>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, source_type()).parse();
    if !ret.errors.is_empty() {
        return Err(parse_errors(view, &ret.errors));
    }
    let mut collector = RequireCollector {
        specifiers: Vec::new(),
    };
    collector.visit_program(&ret.program);
    Ok(collector.specifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_jsx_passes() {
        assert!(check_module("A", "const a = <div className=\"x\">{b && <b {...c} />}</div>").is_ok());
    }

    #[test]
    fn test_invalid_module_reports_errors() {
        let err = check_module("BrokenView", "const a = <div>").unwrap_err();
        match err {
            ViewError::InvalidModule { view, errors } => {
                assert_eq!(view, "BrokenView");
                assert!(!errors.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_collect_requires_in_order() {
        let code = "const React = require('react')\nconst X = require(\"./X\")\nfunction f() { return require('../c/Y') }\nrequire(dynamic)";
        assert_eq!(
            collect_requires("A", code).unwrap(),
            vec!["react", "./X", "../c/Y"]
        );
    }

    #[test]
    fn test_format_module_reprints() {
        let formatted = format_module("A", "const  a=1").unwrap();
        assert_eq!(formatted.trim(), "const a = 1;");
    }
}
