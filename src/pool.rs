//! Thread-local parser pooling.
//!
//! Creating a tree-sitter parser and compiling the import query costs more
//! than parsing a typical Go file, so one [`GoParser`] is kept per thread and
//! reused for every file the walker visits.

use crate::go::{GoError, GoParser, GoSource};
use std::cell::RefCell;

thread_local! {
    static GO_PARSER: RefCell<Option<GoParser>> = const { RefCell::new(None) };
}

/// Execute function with the pooled parser instance.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use go_imports_rename::pool::with_parser;
///
/// let tree = with_parser(|parser| parser.parse_tree("package main\n"))??;
/// # let _ = tree;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, GoError>
where
    F: FnOnce(&mut GoParser) -> R,
{
    GO_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        let parser = match slot.take() {
            Some(parser) => parser,
            None => GoParser::new()?,
        };
        Ok(f(slot.insert(parser)))
    })
}

/// Parse a file's text with the pooled parser.
pub fn parse(text: String) -> Result<GoSource, GoError> {
    with_parser(|parser| parser.parse(text))?
}

/// Syntax-check source with the pooled parser.
pub fn check(source: &str) -> Result<(), GoError> {
    with_parser(|parser| parser.check(source))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pooled_parser_is_reused() {
        let first = parse("package a\n\nimport \"x\"\n".to_string()).unwrap();
        let second = parse("package b\n\nimport \"y\"\n".to_string()).unwrap();
        assert_eq!(first.imports()[0].path(), "x");
        assert_eq!(second.imports()[0].path(), "y");
    }

    #[test]
    fn check_reports_syntax_errors() {
        assert!(check("package ok\n\nfunc main() {}\n").is_ok());
        assert!(matches!(
            check("package bad\n\nfunc main( {\n"),
            Err(GoError::Syntax { .. })
        ));
    }
}
