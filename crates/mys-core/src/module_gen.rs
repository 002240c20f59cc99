//! Per-module artifact assembly.
//!
//! Lowering a module produces two text artifacts: a header declaring the
//! exported types, prototypes and class layouts, and a source emitting
//! definitions, synthesized specials, enum conversions and the
//! `package_main` trampoline when the module defines `main`. Both begin
//! with the generated-file banner and include the shared runtime header.

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::{py, LineIndex};
use crate::context::Binding;
use crate::definitions::{validate_trait_conformance, ClassDef, ModuleDefinitions, TraitDef};
use crate::error::{Error, Result};
use crate::imports::resolve_imports;
use crate::stmt::Lowerer;
use crate::types::{cpp_param_type, cpp_return_type, cpp_type};

pub const BANNER: &str = "// This file was generated by mys. DO NOT EDIT!!!";

const EMBEDDED_BEFORE_NAMESPACE: &str = "mys-embedded-c++-before-namespace";
const EMBEDDED: &str = "mys-embedded-c++";

/// The two generated artifacts of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutput {
    pub module: String,
    pub header: String,
    pub source: String,
}

impl ModuleOutput {
    /// Path of the module's header, relative to the output root.
    pub fn header_path(&self) -> String {
        format!("{}.mys.hpp", self.module.replace('.', "/"))
    }

    /// Path of the module's source, relative to the output root.
    pub fn source_path(&self) -> String {
        format!("{}.mys.cpp", self.module.replace('.', "/"))
    }
}

fn namespace_of(module: &str) -> String {
    format!("mys::{}", module.replace('.', "::"))
}

/// Lower one module against the complete definitions table. Extraction
/// must have finished for every module before this runs.
pub fn lower_module<'a>(
    module: &str,
    ast: &py::ModModule,
    table: &'a IndexMap<String, ModuleDefinitions>,
    index: &'a LineIndex,
    skip_tests: bool,
) -> Result<ModuleOutput> {
    debug!(module, "lowering module");

    let Some(defs) = table.get(module) else {
        return Err(Error::internal(
            format!("module '{module}' is missing from the definitions table"),
            None,
        ));
    };

    let mut lowerer = Lowerer::new(module, index, skip_tests);

    // The module's own definitions are visible before any body lowers;
    // forward references within the module need no declarations.
    for (name, overloads) in &defs.functions {
        let fqn = lowerer.ctx.make_full_name(name);
        lowerer.ctx.define_function(name, fqn, overloads);
    }

    for (name, trait_def) in &defs.traits {
        let fqn = lowerer.ctx.make_full_name(name);
        lowerer.ctx.define_trait(name, fqn, trait_def);
    }

    for (name, class) in &defs.classes {
        let fqn = lowerer.ctx.make_full_name(name);
        lowerer.ctx.define_class(name, fqn, class);
    }

    let mut enums = Vec::new();

    for (name, def) in &defs.enums {
        let fqn = lowerer.ctx.make_full_name(name);
        lowerer.ctx.define_enum(name, fqn, def);
        enums.extend(lowerer.lower_enum(def));
    }

    resolve_imports(module, &defs.imports, table, &mut lowerer.ctx)?;
    check_trait_conformance(defs, &lowerer)?;

    let mut constants = Vec::new();
    let mut body = Vec::new();

    for stmt in &ast.body {
        match stmt {
            py::Stmt::AnnAssign(assign) => {
                constants.extend(lower_module_variable(&mut lowerer, defs, assign)?);
            }
            py::Stmt::Expr(expr) => {
                body.extend(lower_module_expression(&mut lowerer, expr)?);
            }
            // Imports resolved above; functions and classes lower from
            // their extracted records below.
            _ => {}
        }
    }

    for class in defs.classes.values() {
        body.extend(lowerer.lower_class_definition(class)?);
    }

    for overloads in defs.functions.values() {
        for function in overloads {
            body.extend(lowerer.lower_function_defaults(function)?);
            body.extend(lowerer.lower_function_definition(function)?);
        }
    }

    let header = render_header(module, defs, &lowerer);
    let source = render_source(module, &lowerer, &enums, &constants, &body);

    Ok(ModuleOutput {
        module: module.to_string(),
        header,
        source,
    })
}

/// Classes implementing traits from other modules are checked once the
/// imports are resolved; local traits were checked during extraction.
fn check_trait_conformance(defs: &ModuleDefinitions, lowerer: &Lowerer<'_>) -> Result<()> {
    for class in defs.classes.values() {
        for trait_name in &class.implements {
            if defs.traits.contains_key(trait_name) {
                continue;
            }

            match lowerer.ctx.trait_def(trait_name) {
                Some(trait_def) => validate_trait_conformance(class, trait_def)?,
                None => {
                    return Err(Error::compile(
                        format!("undefined type '{trait_name}'"),
                        class.span,
                    ));
                }
            }
        }
    }

    Ok(())
}

fn lower_module_variable(
    lowerer: &mut Lowerer<'_>,
    defs: &ModuleDefinitions,
    assign: &py::StmtAnnAssign,
) -> Result<Vec<String>> {
    let py::Expr::Name(target) = assign.target.as_ref() else {
        return Err(Error::compile("syntax error", lowerer.index.span(assign)));
    };

    let Some(variable) = defs.variables.get(target.id.as_str()) else {
        return Err(Error::internal(
            format!("module variable '{}' was not extracted", target.id),
            Some(lowerer.index.span(assign)),
        ));
    };

    if !lowerer.ctx.is_type_defined(&variable.ty) {
        return Err(Error::compile(
            format!("undefined type '{}'", variable.ty),
            lowerer.index.span(assign.annotation.as_ref()),
        ));
    }

    let Some(value) = &assign.value else {
        return Err(Error::compile(
            "global variables must be initialized",
            lowerer.index.span(assign),
        ));
    };

    let fragment = lowerer.expr(value, Some(&variable.ty))?;
    lowerer.check_types(&variable.ty, &fragment, value.as_ref())?;

    let fqn = lowerer.ctx.make_full_name(&variable.name);
    lowerer
        .ctx
        .define_global_variable(&variable.name, fqn, variable.ty.clone());

    Ok(vec![format!(
        "{} {} = {};",
        cpp_type(&variable.ty, &lowerer.ctx),
        variable.name,
        fragment.code
    )])
}

/// A module-level bare constant is an embedded C++ block or nothing at
/// all; any other expression statement is a syntax error.
fn lower_module_expression(
    lowerer: &mut Lowerer<'_>,
    expr: &py::StmtExpr,
) -> Result<Vec<String>> {
    let py::Expr::Constant(py::ExprConstant {
        value: py::Constant::Str(text),
        ..
    }) = expr.value.as_ref()
    else {
        return Err(Error::compile("syntax error", lowerer.index.span(expr)));
    };

    if let Some(embedded) = text.strip_prefix(EMBEDDED_BEFORE_NAMESPACE) {
        lowerer
            .before_namespace
            .push(format!("/* {EMBEDDED_BEFORE_NAMESPACE} start */"));
        lowerer.before_namespace.push(dedent(embedded));
        lowerer
            .before_namespace
            .push(format!("/* {EMBEDDED_BEFORE_NAMESPACE} stop */"));

        return Ok(Vec::new());
    }

    if let Some(embedded) = text.strip_prefix(EMBEDDED) {
        return Ok(vec![
            format!("/* {EMBEDDED} start */"),
            String::new(),
            dedent(embedded),
            String::new(),
            format!("/* {EMBEDDED} stop */"),
        ]);
    }

    Err(Error::compile("syntax error", lowerer.index.span(expr)))
}

/// Strip the common leading whitespace of every non-empty line.
fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| {
            if line.len() >= indent {
                &line[indent..]
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn render_source(
    module: &str,
    lowerer: &Lowerer<'_>,
    enums: &[String],
    constants: &[String],
    body: &[String],
) -> String {
    let namespace = namespace_of(module);
    let module_hpp = format!("{}.mys.hpp", module.replace('.', "/"));

    let mut lines = vec![
        BANNER.to_string(),
        "#include \"mys.hpp\"".to_string(),
        format!("#include \"{module_hpp}\""),
    ];

    lines.extend(lowerer.before_namespace.iter().cloned());
    lines.push(format!("namespace {namespace}"));
    lines.push("{".to_string());
    lines.extend(lowerer.forward_declarations.iter().cloned());
    lines.extend(enums.iter().cloned());
    lines.extend(constants.iter().cloned());
    lines.extend(body.iter().cloned());
    lines.push("}".to_string());

    if lowerer.add_package_main {
        lines.push("void package_main(int argc, const char *argv[])".to_string());
        lines.push("{".to_string());
        lines.push(format!("    {namespace}::main(argc, argv);"));
        lines.push("}".to_string());
    }

    lines.push(String::new());

    lines.join("\n")
}

fn render_header(module: &str, defs: &ModuleDefinitions, lowerer: &Lowerer<'_>) -> String {
    let namespace = namespace_of(module);

    let mut lines = vec![
        BANNER.to_string(),
        "#pragma once".to_string(),
        "#include \"mys.hpp\"".to_string(),
        format!("namespace {namespace}"),
        "{".to_string(),
    ];

    // Opaque enum declarations plus the converter prototypes; the
    // definitions live in the source artifact.
    for def in defs.enums.values() {
        lines.push(format!("enum class {} : {};", def.name, def.ty));
        lines.push(format!(
            "{} enum_{}_from_value({} value);",
            def.ty, def.name, def.ty
        ));
    }

    for trait_def in defs.traits.values() {
        lines.extend(trait_declaration(trait_def, lowerer));
    }

    for class in defs.classes.values() {
        lines.extend(class_declaration(class, lowerer));
    }

    for variable in defs.variables.values() {
        lines.push(format!(
            "extern {} {};",
            cpp_type(&variable.ty, &lowerer.ctx),
            variable.name
        ));
    }

    lines.extend(lowerer.forward_declarations.iter().cloned());
    lines.push("}".to_string());
    lines.push(String::new());

    lines.join("\n")
}

fn trait_declaration(trait_def: &TraitDef, lowerer: &Lowerer<'_>) -> Vec<String> {
    let mut lines = vec![format!("class {} {{", trait_def.name), "public:".to_string()];

    lines.push(format!("    virtual ~{}() {{}}", trait_def.name));

    for overloads in trait_def.methods.values() {
        for method in overloads {
            lines.push(format!(
                "    virtual {} {}({}) = 0;",
                cpp_return_type(method.returns.as_ref(), &lowerer.ctx),
                method.name,
                lowerer.format_parameters(&method.params)
            ));
        }
    }

    lines.push("};".to_string());

    lines
}

fn class_declaration(class: &ClassDef, lowerer: &Lowerer<'_>) -> Vec<String> {
    let bases = if class.implements.is_empty() {
        String::new()
    } else {
        let rendered: Vec<String> = class
            .implements
            .iter()
            .map(|name| match lowerer.ctx.lookup(name) {
                Some(Binding::Trait { fqn, .. }) => {
                    format!("public {}", lowerer.code_name(fqn))
                }
                _ => format!("public {name}"),
            })
            .collect();

        format!(" : {}", rendered.join(", "))
    };

    let mut lines = vec![format!("class {}{bases} {{", class.name), "public:".to_string()];

    for member in class.members.values() {
        lines.push(format!(
            "    {} {};",
            cpp_type(&member.ty, &lowerer.ctx),
            member.name
        ));
    }

    let mut method_names = Vec::new();

    for overloads in class.methods.values() {
        for method in overloads {
            method_names.push(method.name.clone());

            let prototype = match method.name.as_str() {
                "__init__" => format!(
                    "    {}({});",
                    class.name,
                    lowerer.format_parameters(&method.params)
                ),
                "__del__" => format!("    virtual ~{}();", class.name),
                "__str__" => "    String __str__() const;".to_string(),
                name => format!(
                    "    {} {}({});",
                    cpp_return_type(method.returns.as_ref(), &lowerer.ctx),
                    name,
                    lowerer.format_parameters(&method.params)
                ),
            };

            lines.push(prototype);
        }
    }

    if !method_names.iter().any(|name| name == "__init__") {
        let params: Vec<String> = class
            .public_members()
            .map(|member| {
                format!(
                    "{} {}",
                    cpp_param_type(&member.ty, &lowerer.ctx),
                    member.name
                )
            })
            .collect();

        lines.push(format!("    {}({});", class.name, params.join(", ")));
    }

    if !method_names.iter().any(|name| name == "__del__") {
        lines.push(format!("    virtual ~{}();", class.name));
    }

    if !method_names.iter().any(|name| name == "__str__") {
        lines.push("    String __str__() const;".to_string());
    }

    lines.push("    void __format__(std::ostream& os) const;".to_string());
    lines.push("};".to_string());

    lines
}
