//! # Mys Core - Transpilation Engine
//!
//! Core transpilation engine for converting Mys source code (a
//! statically-typed, Python-syntax language) into C++ targeting the Mys
//! runtime.
//!
//! ## Overview
//!
//! This crate provides the multi-pass front-end: definition extraction,
//! import resolution, name and type analysis, and lowering to target
//! source text. The surface grammar parser is the host Python parser
//! (`rustpython-parser`); the target compiler, build driver and
//! filesystem I/O live outside this crate.
//!
//! ## Example
//!
//! ```rust
//! use mys_core::{transpile, Source};
//!
//! let sources = [Source::new(
//!     "def add(a: i32, b: i32) -> i32:\n    return a + b\n",
//! )];
//!
//! let outputs = transpile(&sources).unwrap();
//! assert!(outputs[0].source.contains("i32 add(i32 a, i32 b)"));
//! ```
//!
//! ## Architecture
//!
//! 1. **Parsing** ([`ast`]) - host parser adapter and source spans
//! 2. **Extraction** ([`definitions`]) - per-module symbol records
//! 3. **Resolution** ([`imports`]) - link imports to extracted records
//! 4. **Analysis** ([`context`], [`expr`]) - scopes and expression types
//! 5. **Lowering** ([`stmt`], [`patterns`], [`classes`]) - C++ statement text
//! 6. **Assembly** ([`module_gen`]) - header and source artifacts
//!
//! Extraction completes for every module before any module lowers; given
//! the same definitions table, lowering a module is deterministic.

pub mod ast;
pub mod classes;
pub mod context;
pub mod definitions;
pub mod diagnostics;
pub mod error;
pub mod expr;
pub mod imports;
pub mod module_gen;
pub mod patterns;
pub mod stmt;
pub mod types;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::ast::{parse_module, LineIndex};
use crate::definitions::extract_definitions;

pub use crate::definitions::ModuleDefinitions;
pub use crate::error::{Error as CoreError, ErrorKind, Span};
pub use crate::module_gen::ModuleOutput;
pub use crate::types::MysType;

/// A transpilation failure, rendered as the complete pointer-with-caret
/// diagnostic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TranspilerError(pub String);

/// One input module: source text, dotted module name and the path used
/// in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub contents: String,
    pub module: String,
    pub mys_path: String,
}

impl Source {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            module: "foo.lib".to_string(),
            mys_path: String::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.mys_path = path.into();
        self
    }
}

/// Options for a transpilation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranspileOptions {
    /// Drop `@test` functions instead of emitting them under `MYS_TEST`.
    pub skip_tests: bool,
}

/// Transpile a set of modules.
///
/// Definitions are extracted for every module first; only then does any
/// module lower, so forward references and import cycles at the
/// definition level resolve. The first error aborts the run.
pub fn transpile(sources: &[Source]) -> Result<Vec<ModuleOutput>, TranspilerError> {
    transpile_with_options(sources, TranspileOptions::default())
}

pub fn transpile_with_options(
    sources: &[Source],
    options: TranspileOptions,
) -> Result<Vec<ModuleOutput>, TranspilerError> {
    let mut parsed = Vec::new();

    for source in sources {
        let index = LineIndex::new(&source.contents);
        let module = parse_module(&source.contents, &source.mys_path)
            .map_err(|err| rendered(&err, source))?;
        parsed.push((module, index));
    }

    // Extraction barrier: all modules extract before any module lowers.
    let mut table = IndexMap::new();

    for (source, (module, index)) in sources.iter().zip(parsed.iter()) {
        debug!(module = %source.module, "extracting definitions");
        let defs = extract_definitions(module, index).map_err(|err| rendered(&err, source))?;
        table.insert(source.module.clone(), defs);
    }

    let mut outputs = Vec::new();

    for (source, (module, index)) in sources.iter().zip(parsed.iter()) {
        let output =
            module_gen::lower_module(&source.module, module, &table, index, options.skip_tests)
                .map_err(|err| rendered(&err, source))?;
        outputs.push(output);
    }

    Ok(outputs)
}

/// Transpile a single module and return its source artifact. A
/// convenience wrapper mirroring the common single-module case.
pub fn transpile_source(contents: &str) -> Result<String, TranspilerError> {
    let outputs = transpile(&[Source::new(contents)])?;

    Ok(outputs
        .into_iter()
        .next()
        .map(|output| output.source)
        .unwrap_or_default())
}

fn rendered(error: &CoreError, source: &Source) -> TranspilerError {
    TranspilerError(diagnostics::render(
        error,
        &source.mys_path,
        &source.contents,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpile_simple_function() {
        let output = transpile_source(
            "def add(a: i32, b: i32) -> i32:\n\
             \x20   return a + b\n",
        )
        .unwrap();

        assert!(output.starts_with("// This file was generated by mys. DO NOT EDIT!!!"));
        assert!(output.contains("i32 add(i32 a, i32 b)"));
        assert!(output.contains("return (a + b);"));
    }

    #[test]
    fn test_transpile_is_deterministic() {
        let source = "def add(a: i32, b: i32) -> i32:\n    return a + b\n";
        assert_eq!(
            transpile_source(source).unwrap(),
            transpile_source(source).unwrap()
        );
    }

    #[test]
    fn test_error_is_rendered_diagnostic() {
        let err = transpile_source("import foo\n").unwrap_err();

        assert_eq!(
            err.to_string(),
            "  File \"\", line 1\n\
             \x20   import foo\n\
             \x20   ^\n\
             CompileError: only 'from <module> import ...' is allowed\n"
        );
    }
}
