//! Adapter over the host parser.
//!
//! The transpiler consumes the standard Python-shaped AST produced by
//! `rustpython-parser`. This module wraps parsing and translates the
//! byte-offset ranges the parser attaches to every node into the
//! line/column spans the diagnostics need.

use rustpython_ast::Ranged;
use rustpython_parser::{parse, Mode};

use crate::error::{Error, Span};

pub use rustpython_ast as py;

/// Parse a module's source text into the host AST.
///
/// Parse failures are reported as [`Error`]s of kind `Syntax` with the
/// location the parser blamed.
pub fn parse_module(source: &str, path: &str) -> Result<py::ModModule, Error> {
    let parsed = parse(source, Mode::Module, path).map_err(|e| {
        let index = LineIndex::new(source);
        let span = index.locate(e.offset.to_usize());
        Error::syntax("invalid syntax", span)
    })?;

    match parsed {
        py::Mod::Module(module) => Ok(module),
        _ => Err(Error::internal("host parser returned a non-module tree", None)),
    }
}

/// Maps byte offsets in a source text to 1-based line and 0-based column.
///
/// Built once per module and shared by every phase that reports spans.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }

        Self { line_starts }
    }

    /// Line/column of a byte offset. Columns are byte offsets within the
    /// line, matching the host parser's `col_offset` convention.
    pub fn locate(&self, offset: usize) -> Span {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };

        Span {
            line: line + 1,
            column: offset - self.line_starts[line],
        }
    }

    /// Span of an AST node's first byte.
    pub fn span<N: Ranged>(&self, node: &N) -> Span {
        self.locate(node.range().start().to_usize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_first_line() {
        let index = LineIndex::new("abc\ndef\n");
        assert_eq!(index.locate(0), Span { line: 1, column: 0 });
        assert_eq!(index.locate(2), Span { line: 1, column: 2 });
    }

    #[test]
    fn test_line_index_second_line() {
        let index = LineIndex::new("abc\ndef\n");
        assert_eq!(index.locate(4), Span { line: 2, column: 0 });
        assert_eq!(index.locate(6), Span { line: 2, column: 2 });
    }

    #[test]
    fn test_parse_module_ok() {
        let module = parse_module("def foo():\n    pass\n", "<test>").unwrap();
        assert_eq!(module.body.len(), 1);
    }

    #[test]
    fn test_parse_module_syntax_error() {
        let err = parse_module("def foo(:\n", "<test>").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
    }
}
