use crate::go::errors::GoError;
use crate::go::quote::unquote;
use ast_grep_language::{LanguageExt, SupportLang};
use std::ops::Range;
use tree_sitter::{Node, Parser, Query, QueryCursor, StreamingIterator, Tree};

/// Captures every import spec, whether it sits in a single-line
/// `import "x"` declaration or inside an `import ( ... )` block.
const IMPORT_QUERY: &str = "(import_spec path: (_) @path) @spec";

/// Tree-sitter parser wrapper for Go source code.
///
/// Holds the compiled import query next to the parser so both can be reused
/// across files (see [`crate::pool`]).
pub struct GoParser {
    parser: Parser,
    imports: Query,
    spec_capture: u32,
    path_capture: u32,
}

impl GoParser {
    pub fn new() -> Result<Self, GoError> {
        let mut parser = Parser::new();
        let ts_lang = SupportLang::Go.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| GoError::LanguageSet)?;

        let imports = Query::new(&ts_lang, IMPORT_QUERY).map_err(|e| GoError::InvalidQuery {
            message: e.to_string(),
        })?;
        let spec_capture = capture_index(&imports, "spec")?;
        let path_capture = capture_index(&imports, "path")?;

        Ok(Self {
            parser,
            imports,
            spec_capture,
            path_capture,
        })
    }

    /// Parse source code into a tree-sitter Tree.
    pub fn parse_tree(&mut self, source: &str) -> Result<Tree, GoError> {
        self.parser.parse(source, None).ok_or(GoError::ParseFailed)
    }

    /// Check that source code parses without ERROR or MISSING nodes.
    pub fn check(&mut self, source: &str) -> Result<(), GoError> {
        let tree = self.parse_tree(source)?;
        syntax_errors(tree.root_node())
    }

    /// Parse a file's text and extract its import declarations.
    ///
    /// Any syntax error in the file fails the parse: a file that does not
    /// parse cleanly is never rewritten.
    pub fn parse(&mut self, text: String) -> Result<GoSource, GoError> {
        let tree = self.parse_tree(&text)?;
        let root = tree.root_node();
        syntax_errors(root)?;

        let mut imports = Vec::new();
        {
            let mut cursor = QueryCursor::new();
            let mut matches = cursor.matches(&self.imports, root, text.as_bytes());

            // tree-sitter 0.25+ uses StreamingIterator
            while let Some(m) = matches.next() {
                let spec = m
                    .captures
                    .iter()
                    .find(|c| c.index == self.spec_capture)
                    .map(|c| c.node);
                let path = m
                    .captures
                    .iter()
                    .find(|c| c.index == self.path_capture)
                    .map(|c| c.node);

                if let (Some(spec), Some(path)) = (spec, path) {
                    imports.push(ImportSpec::from_nodes(&text, spec, path)?);
                }
            }
        }

        imports.sort_by_key(|import| import.literal.start);

        Ok(GoSource { text, imports })
    }
}

fn capture_index(query: &Query, name: &str) -> Result<u32, GoError> {
    query
        .capture_index_for_name(name)
        .ok_or_else(|| GoError::InvalidQuery {
            message: format!("missing capture @{name}"),
        })
}

fn syntax_errors(root: Node<'_>) -> Result<(), GoError> {
    if !root.has_error() {
        return Ok(());
    }

    let mut errors = Vec::new();
    collect_error_nodes(root, &mut errors);

    match errors.first() {
        Some(first) => {
            let point = first.start_position();
            Err(GoError::Syntax {
                line: point.row + 1,
                column: point.column + 1,
                count: errors.len(),
            })
        }
        None => Err(GoError::Syntax {
            line: root.start_position().row + 1,
            column: root.start_position().column + 1,
            count: 1,
        }),
    }
}

fn collect_error_nodes<'t>(node: Node<'t>, errors: &mut Vec<Node<'t>>) {
    if node.is_error() || node.is_missing() {
        errors.push(node);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}

/// A parsed Go file: its text plus import declarations in declaration order.
///
/// The value is owned by whoever parsed it; spans refer to `text`, which is
/// never modified. Path updates live on the [`ImportSpec`] records until a
/// formatter serializes them.
#[derive(Debug, Clone)]
pub struct GoSource {
    text: String,
    imports: Vec<ImportSpec>,
}

impl GoSource {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn imports(&self) -> &[ImportSpec] {
        &self.imports
    }

    pub fn imports_mut(&mut self) -> &mut [ImportSpec] {
        &mut self.imports
    }

    pub fn is_dirty(&self) -> bool {
        self.imports.iter().any(ImportSpec::is_dirty)
    }
}

/// One import declaration (`import name "path"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    name: Option<String>,
    original_path: String,
    path: String,
    /// Byte range of the quoted path literal.
    literal: Range<usize>,
    /// Byte range of the whole spec, alias included.
    span: Range<usize>,
    line: usize,
    end_line: usize,
    /// Start byte of the enclosing `( ... )` list, if any.
    block: Option<usize>,
    dirty: bool,
}

impl ImportSpec {
    fn from_nodes(text: &str, spec: Node<'_>, path: Node<'_>) -> Result<Self, GoError> {
        let literal_text = &text[path.byte_range()];
        let value = unquote(literal_text).ok_or_else(|| GoError::BadLiteral {
            literal: literal_text.to_string(),
        })?;

        let name = spec
            .child_by_field_name("name")
            .map(|node| text[node.byte_range()].to_string());

        let block = spec
            .parent()
            .filter(|parent| parent.kind() == "import_spec_list")
            .map(|parent| parent.start_byte());

        Ok(Self {
            name,
            original_path: value.clone(),
            path: value,
            literal: path.byte_range(),
            span: spec.byte_range(),
            line: spec.start_position().row,
            end_line: spec.end_position().row,
            block,
            dirty: false,
        })
    }

    /// Unquoted import path, including any pending update.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path as it appears in the file on disk.
    pub fn original_path(&self) -> &str {
        &self.original_path
    }

    /// Replace the import path. The record is marked dirty even when the new
    /// value equals the old one.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Package alias (`foo`, `.` or `_`), if the spec declares one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn literal_span(&self) -> Range<usize> {
        self.literal.clone()
    }

    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Zero-based line the spec starts on.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn block(&self) -> Option<usize> {
        self.block
    }
}
