//! XML parser and XPath field extraction
//!
//! Profile documents are parsed with `sxd-document`; fields are pulled out
//! with `sxd-xpath` selectors. The parsed tree is confined to the calling
//! function and never crosses an `.await`.
//!
//! Compiled selectors are not `Send`, so each worker thread keeps its own
//! cache and compiles a given selector once.

use crate::crawler::{DocumentError, EngineError};
use std::cell::RefCell;
use std::collections::HashMap;
use sxd_document::{dom, parser, Package};
use sxd_xpath::{Context, Factory, Value, XPath};

thread_local! {
    static COMPILED: RefCell<HashMap<String, XPath>> = RefCell::new(HashMap::new());
}

/// Compiles an XPath selector
///
/// An empty expression is rejected as well as a malformed one.
///
/// # Example
///
/// ```
/// use coauthor_ripple::crawler::compile_selector;
///
/// assert!(compile_selector("/dblpperson/@pid").is_ok());
/// assert!(compile_selector("/dblpperson/@pid[").is_err());
/// ```
pub fn compile_selector(selector: &str) -> Result<XPath, EngineError> {
    let invalid = |message: String| EngineError::InvalidSelector {
        selector: selector.to_string(),
        message,
    };

    Factory::new()
        .build(selector)
        .map_err(|e| invalid(e.to_string()))?
        .ok_or_else(|| invalid("empty expression".to_string()))
}

/// Parses an XML document body
pub fn parse_document(body: &str) -> Result<Package, DocumentError> {
    parser::parse(body).map_err(|e| DocumentError::Xml(e.to_string()))
}

/// Evaluates `selector` and returns the string value of every match
///
/// Node-set results are returned in document order. Scalar results
/// (`count(...)`, `string(...)`) yield exactly one value.
pub fn extract(document: &dom::Document<'_>, selector: &str) -> Result<Vec<String>, DocumentError> {
    COMPILED.with(|compiled| {
        let mut compiled = compiled.borrow_mut();
        if !compiled.contains_key(selector) {
            let xpath = compile_selector(selector).map_err(|e| DocumentError::XPath {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;
            compiled.insert(selector.to_string(), xpath);
        }

        match compiled.get(selector) {
            Some(xpath) => evaluate(xpath, document, selector),
            None => Ok(Vec::new()),
        }
    })
}

fn evaluate(
    xpath: &XPath,
    document: &dom::Document<'_>,
    selector: &str,
) -> Result<Vec<String>, DocumentError> {
    let context = Context::new();
    let value = xpath
        .evaluate(&context, document.root())
        .map_err(|e| DocumentError::XPath {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;

    let values = match value {
        Value::Nodeset(nodes) => nodes
            .document_order()
            .iter()
            .map(|node| node.string_value())
            .collect(),
        Value::String(s) => vec![s],
        Value::Number(n) => vec![n.to_string()],
        Value::Boolean(b) => vec![b.to_string()],
    };

    Ok(values)
}
