//! Renders transpilation errors as pointer-with-caret diagnostics.
//!
//! The rendered shape is fixed and asserted byte-for-byte by the test
//! suites:
//!
//! ```text
//!   File "<path>", line <N>
//!     <source line, as read>
//!     <spaces>^
//! <Kind>: <message>
//! ```

use crate::error::Error;

/// Render an error against the module it was raised in.
///
/// The caret column equals the error node's start column. When the error
/// carries no span (internal errors raised outside any node), only the
/// final `<Kind>: <message>` line is produced.
pub fn render(error: &Error, path: &str, source: &str) -> String {
    let Some(span) = error.span else {
        return format!("{}: {}\n", error.kind.label(), error.message);
    };

    let line_text = source.lines().nth(span.line - 1).unwrap_or("");

    format!(
        "  File \"{}\", line {}\n    {}\n    {}^\n{}: {}\n",
        path,
        span.line,
        line_text,
        " ".repeat(span.column),
        error.kind.label(),
        error.message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Span;

    #[test]
    fn test_render_with_caret() {
        let err = Error::compile(
            "imports are only allowed on module level",
            Span { line: 2, column: 4 },
        );
        let source = "def main():\n    import foo\n";

        assert_eq!(
            render(&err, "<unknown>", source),
            "  File \"<unknown>\", line 2\n\
             \x20       import foo\n\
             \x20       ^\n\
             CompileError: imports are only allowed on module level\n"
        );
    }

    #[test]
    fn test_render_column_zero() {
        let err = Error::compile(
            "only 'from <module> import ...' is allowed",
            Span { line: 1, column: 0 },
        );

        assert_eq!(
            render(&err, "", "import foo\n"),
            "  File \"\", line 1\n\
             \x20   import foo\n\
             \x20   ^\n\
             CompileError: only 'from <module> import ...' is allowed\n"
        );
    }

    #[test]
    fn test_render_without_span() {
        let err = Error::internal("unhandled node", None);
        assert_eq!(render(&err, "", ""), "InternalError: unhandled node\n");
    }
}
