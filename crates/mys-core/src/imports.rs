//! Import resolution.
//!
//! Runs after definition extraction has completed for every module, so it
//! only ever reads already-extracted records. Cycles in the import graph
//! are therefore harmless here; a module's imports resolve against the
//! table regardless of what the imported module imports itself.

use indexmap::IndexMap;
use tracing::debug;

use crate::context::Context;
use crate::definitions::{FunctionDef, ImportDef, ModuleDefinitions};
use crate::error::{Error, Result};

/// Resolve every `from M import N [as A]` of a module into its context.
pub fn resolve_imports<'a>(
    importing_module: &str,
    imports: &[ImportDef],
    table: &'a IndexMap<String, ModuleDefinitions>,
    ctx: &mut Context<'a>,
) -> Result<()> {
    for import in imports {
        resolve_import(importing_module, import, table, ctx)?;
    }

    Ok(())
}

fn resolve_import<'a>(
    importing_module: &str,
    import: &ImportDef,
    table: &'a IndexMap<String, ModuleDefinitions>,
    ctx: &mut Context<'a>,
) -> Result<()> {
    let module = resolve_module_path(importing_module, import)?;
    let name = import.name.as_str();

    if name.starts_with('_') {
        return Err(Error::compile(
            format!("cannot import private definition '{name}'"),
            import.span,
        ));
    }

    let Some(imported) = table.get(&module) else {
        return Err(Error::compile(
            format!("imported module '{module}' does not exist"),
            import.span,
        ));
    };

    let asname = import.asname.as_deref().unwrap_or(name);
    let full_name = format!("{module}.{name}");

    debug!(%module, name, asname, "resolving import");

    if let Some(variable) = imported.variables.get(name) {
        ctx.define_global_variable(asname, full_name, variable.ty.clone());
    } else if let Some(overloads) = imported.functions.get(name) {
        for function in overloads {
            register_external_return_class(function, table, ctx);
        }

        ctx.define_function(asname, full_name, overloads);
    } else if let Some(class) = imported.classes.get(name) {
        for overloads in class.methods.values() {
            for method in overloads {
                register_external_return_class(method, table, ctx);
            }
        }

        ctx.define_class(asname, full_name, class);
    } else if let Some(trait_def) = imported.traits.get(name) {
        ctx.define_trait(asname, full_name, trait_def);
    } else {
        return Err(Error::compile(
            format!("imported module '{module}' does not contain '{name}'"),
            import.span,
        ));
    }

    Ok(())
}

/// When an imported function's return type is an external qualified name
/// `P.T`, register class `T` from module `P` so later type queries on the
/// returned value succeed without importing `T` explicitly.
fn register_external_return_class<'a>(
    function: &FunctionDef,
    table: &'a IndexMap<String, ModuleDefinitions>,
    ctx: &mut Context<'a>,
) {
    let Some(crate::types::MysType::Named(returns)) = &function.returns else {
        return;
    };

    let Some((module, class_name)) = returns.rsplit_once('.') else {
        return;
    };

    let Some(class) = table.get(module).and_then(|defs| defs.classes.get(class_name)) else {
        return;
    };

    ctx.define_class(returns, returns.clone(), class);
}

/// Compute the module path an import names.
///
/// Absolute imports address a package, which resolves to its `lib`
/// module (`from foo import bar` reads `foo.lib`). Relative imports pop
/// one dotted level per leading dot beyond the first and address sibling
/// modules directly; popping past the package root is an error.
fn resolve_module_path(importing_module: &str, import: &ImportDef) -> Result<String> {
    if import.level == 0 {
        let Some(module) = &import.module else {
            return Err(Error::compile("syntax error", import.span));
        };

        return Ok(format!("{module}.lib"));
    }

    let parts: Vec<&str> = importing_module.split('.').collect();

    if import.level >= parts.len() {
        return Err(Error::compile(
            "relative import is outside package",
            import.span,
        ));
    }

    let mut resolved: Vec<&str> = parts[..parts.len() - import.level].to_vec();

    if let Some(module) = &import.module {
        resolved.extend(module.split('.'));
    }

    Ok(resolved.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Span;

    fn import(module: Option<&str>, level: usize) -> ImportDef {
        ImportDef {
            module: module.map(str::to_string),
            level,
            name: "x".to_string(),
            asname: None,
            span: Span { line: 1, column: 0 },
        }
    }

    #[test]
    fn test_absolute_import_targets_lib_module() {
        let path = resolve_module_path("bar.lib", &import(Some("foo"), 0)).unwrap();
        assert_eq!(path, "foo.lib");
    }

    #[test]
    fn test_relative_import_targets_sibling() {
        let path = resolve_module_path("foo.lib", &import(Some("helper"), 1)).unwrap();
        assert_eq!(path, "foo.helper");
    }

    #[test]
    fn test_relative_import_outside_package() {
        let err = resolve_module_path("foo.lib", &import(None, 2)).unwrap_err();
        assert_eq!(err.message, "relative import is outside package");
    }
}
