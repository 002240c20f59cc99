//! Definition extraction.
//!
//! The first phase of a run walks every module's top level and records its
//! variables, functions, classes, traits and enums. Extraction completes
//! for all modules before any module is lowered, so forward references and
//! import cycles at the definition level are harmless.
//!
//! Records are created here once and never mutated afterwards.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::ast::{py, LineIndex};
use crate::error::{Error, Result, Span};
use crate::types::MysType;

/// A declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: MysType,
}

/// A parameter together with its default-value expression, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamWithDefault {
    pub param: Param,
    pub default: Option<py::Expr>,
}

/// A function or method definition. Overloads sharing a name are kept in
/// declaration order; insertion order defines overload precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: SmallVec<[ParamWithDefault; 4]>,
    pub returns: Option<MysType>,
    pub node: py::StmtFunctionDef,
    pub is_test: bool,
    pub is_method: bool,
    pub span: Span,
}

impl FunctionDef {
    fn signature(&self) -> Vec<&MysType> {
        self.params.iter().map(|p| &p.param.ty).collect()
    }
}

/// A class member. Members whose names start with `_` are private: they
/// take a zero-value default in the synthesized constructor and never
/// appear as constructor parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub ty: MysType,
    pub node: py::StmtAnnAssign,
}

impl Member {
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub members: IndexMap<String, Member>,
    pub methods: IndexMap<String, Vec<FunctionDef>>,
    /// Names of implemented traits, in declaration order.
    pub implements: Vec<String>,
    pub span: Span,
}

impl ClassDef {
    /// The public members, in declaration order. These are exactly the
    /// parameters of the synthesized constructor.
    pub fn public_members(&self) -> impl Iterator<Item = &Member> {
        self.members.values().filter(|m| !m.is_private())
    }
}

/// A trait carries method signatures only; bodies must be `pass`.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitDef {
    pub name: String,
    pub methods: IndexMap<String, Vec<FunctionDef>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    /// Underlying integer type.
    pub ty: MysType,
    /// Members in declaration order; order defines the emitted switch layout.
    pub members: Vec<(String, i64)>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: MysType,
    pub node: py::StmtAnnAssign,
}

/// One `from M import N [as A]`, validated for form but not yet resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDef {
    pub module: Option<String>,
    pub level: usize,
    pub name: String,
    pub asname: Option<String>,
    pub span: Span,
}

/// Everything a module defines at its top level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleDefinitions {
    pub imports: Vec<ImportDef>,
    pub variables: IndexMap<String, Variable>,
    pub functions: IndexMap<String, Vec<FunctionDef>>,
    pub classes: IndexMap<String, ClassDef>,
    pub traits: IndexMap<String, TraitDef>,
    pub enums: IndexMap<String, EnumDef>,
}

impl ModuleDefinitions {
    fn check_not_defined(&self, name: &str, span: Span) -> Result<()> {
        if self.variables.contains_key(name)
            || self.classes.contains_key(name)
            || self.traits.contains_key(name)
            || self.enums.contains_key(name)
        {
            return Err(Error::compile(
                format!("there is already a definition named '{name}'"),
                span,
            ));
        }

        Ok(())
    }

    /// A JSON summary of the export surface, used by the driver's
    /// definitions dump. Private names are included; the import resolver
    /// is what keeps them out of other modules.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "variables": self.variables.keys().collect::<Vec<_>>(),
            "functions": self.functions.keys().collect::<Vec<_>>(),
            "classes": self.classes.keys().collect::<Vec<_>>(),
            "traits": self.traits.keys().collect::<Vec<_>>(),
            "enums": self.enums.keys().collect::<Vec<_>>(),
        })
    }
}

/// Extract a module's definitions from its top-level statement list.
pub fn extract_definitions(
    module: &py::ModModule,
    index: &LineIndex,
) -> Result<ModuleDefinitions> {
    let mut defs = ModuleDefinitions::default();
    let mut seen_non_import = false;

    for stmt in &module.body {
        match stmt {
            py::Stmt::ImportFrom(import) => {
                if seen_non_import {
                    return Err(Error::compile(
                        "imports must be at the beginning of the file",
                        index.span(import),
                    ));
                }

                defs.imports.push(extract_import(import, index)?);
            }
            py::Stmt::Import(import) => {
                return Err(Error::compile(
                    "only 'from <module> import ...' is allowed",
                    index.span(import),
                ));
            }
            py::Stmt::AnnAssign(assign) => {
                seen_non_import = true;
                let variable = extract_variable(assign, index)?;
                defs.check_not_defined(&variable.name, index.span(assign))?;
                if defs.functions.contains_key(&variable.name) {
                    return Err(Error::compile(
                        format!("there is already a definition named '{}'", variable.name),
                        index.span(assign),
                    ));
                }
                defs.variables.insert(variable.name.clone(), variable);
            }
            py::Stmt::FunctionDef(func) => {
                seen_non_import = true;
                let function = extract_function(func, index, false)?;
                defs.check_not_defined(&function.name, index.span(func))?;
                push_overload(&mut defs.functions, function, index.span(func))?;
            }
            py::Stmt::AsyncFunctionDef(func) => {
                return Err(Error::language(
                    "async functions are not supported",
                    index.span(func),
                ));
            }
            py::Stmt::ClassDef(class) => {
                seen_non_import = true;
                extract_class_like(class, index, &mut defs)?;
            }
            // Bare expressions at module level are either embedded C++
            // markers (handled during lowering) or a syntax error reported
            // there; both need the statement kept out of the way here.
            py::Stmt::Expr(_) => {
                seen_non_import = true;
            }
            other => {
                return Err(Error::compile("syntax error", index.span(other)));
            }
        }
    }

    validate_local_trait_conformance(&defs, index)?;

    Ok(defs)
}

fn extract_import(import: &py::StmtImportFrom, index: &LineIndex) -> Result<ImportDef> {
    if import.names.len() != 1 {
        return Err(Error::compile(
            format!("only one import is allowed, found {}", import.names.len()),
            index.span(import),
        ));
    }

    let alias = &import.names[0];

    Ok(ImportDef {
        module: import.module.as_ref().map(|m| m.to_string()),
        level: import.level.as_ref().map(|l| l.to_usize()).unwrap_or(0),
        name: alias.name.to_string(),
        asname: alias.asname.as_ref().map(|a| a.to_string()),
        span: index.span(import),
    })
}

fn extract_variable(assign: &py::StmtAnnAssign, index: &LineIndex) -> Result<Variable> {
    let py::Expr::Name(target) = assign.target.as_ref() else {
        return Err(Error::compile("syntax error", index.span(assign)));
    };

    if assign.value.is_none() {
        return Err(Error::compile(
            "global variables must be initialized",
            index.span(assign),
        ));
    }

    Ok(Variable {
        name: target.id.to_string(),
        ty: MysType::from_annotation(&assign.annotation, index)?,
        node: assign.clone(),
    })
}

fn extract_function(
    func: &py::StmtFunctionDef,
    index: &LineIndex,
    is_method: bool,
) -> Result<FunctionDef> {
    let mut is_test = false;

    for decorator in &func.decorator_list {
        match decorator {
            py::Expr::Name(name) if name.id.as_str() == "test" => is_test = true,
            _ => {
                return Err(Error::language(
                    "unsupported decorator",
                    index.span(decorator),
                ));
            }
        }
    }

    let params = extract_parameters(func, index, is_method)?;
    let returns = extract_return_type(func, index)?;
    check_function_body(&func.body, index)?;

    Ok(FunctionDef {
        name: func.name.to_string(),
        params,
        returns,
        node: func.clone(),
        is_test,
        is_method,
        span: index.span(func),
    })
}

fn extract_parameters(
    func: &py::StmtFunctionDef,
    index: &LineIndex,
    is_method: bool,
) -> Result<SmallVec<[ParamWithDefault; 4]>> {
    let mut params = SmallVec::new();

    for (i, arg) in func.args.args.iter().enumerate() {
        let name = arg.def.arg.to_string();

        if is_method && i == 0 {
            if name != "self" {
                return Err(Error::compile(
                    "methods must take 'self' as their first parameter",
                    index.span(&arg.def),
                ));
            }

            continue;
        }

        let Some(annotation) = &arg.def.annotation else {
            return Err(Error::compile(
                format!("parameter '{name}' must have a type"),
                index.span(&arg.def),
            ));
        };

        params.push(ParamWithDefault {
            param: Param {
                name,
                ty: MysType::from_annotation(annotation, index)?,
            },
            default: arg.default.as_deref().cloned(),
        });
    }

    if is_method && func.args.args.is_empty() {
        return Err(Error::compile(
            "methods must take 'self' as their first parameter",
            index.span(func),
        ));
    }

    Ok(params)
}

fn extract_return_type(func: &py::StmtFunctionDef, index: &LineIndex) -> Result<Option<MysType>> {
    match &func.returns {
        None => Ok(None),
        Some(returns) if MysType::annotation_is_none(returns) => Ok(None),
        Some(returns) => Ok(Some(MysType::from_annotation(returns, index)?)),
    }
}

fn push_overload(
    functions: &mut IndexMap<String, Vec<FunctionDef>>,
    function: FunctionDef,
    span: Span,
) -> Result<()> {
    let overloads = functions.entry(function.name.clone()).or_default();

    if overloads
        .iter()
        .any(|existing| existing.signature() == function.signature())
    {
        return Err(Error::compile(
            format!("ambiguous overload of '{}'", function.name),
            span,
        ));
    }

    overloads.push(function);

    Ok(())
}

/// Reject definitions that may only appear at module level inside a
/// function body. Walks nested blocks; `match` arms and handlers included.
fn check_function_body(body: &[py::Stmt], index: &LineIndex) -> Result<()> {
    for stmt in body {
        match stmt {
            py::Stmt::Import(import) => {
                return Err(Error::compile(
                    "imports are only allowed on module level",
                    index.span(import),
                ));
            }
            py::Stmt::ImportFrom(import) => {
                return Err(Error::compile(
                    "imports are only allowed on module level",
                    index.span(import),
                ));
            }
            py::Stmt::ClassDef(class) => {
                return Err(Error::compile(
                    "classes are only allowed on module level",
                    index.span(class),
                ));
            }
            py::Stmt::If(stmt) => {
                check_function_body(&stmt.body, index)?;
                check_function_body(&stmt.orelse, index)?;
            }
            py::Stmt::While(stmt) => {
                check_function_body(&stmt.body, index)?;
                check_function_body(&stmt.orelse, index)?;
            }
            py::Stmt::For(stmt) => {
                check_function_body(&stmt.body, index)?;
                check_function_body(&stmt.orelse, index)?;
            }
            py::Stmt::With(stmt) => {
                check_function_body(&stmt.body, index)?;
            }
            py::Stmt::Try(stmt) => {
                check_function_body(&stmt.body, index)?;
                for handler in &stmt.handlers {
                    let py::ExceptHandler::ExceptHandler(handler) = handler;
                    check_function_body(&handler.body, index)?;
                }
                check_function_body(&stmt.orelse, index)?;
                check_function_body(&stmt.finalbody, index)?;
            }
            py::Stmt::Match(stmt) => {
                for case in &stmt.cases {
                    check_function_body(&case.body, index)?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn extract_class_like(
    class: &py::StmtClassDef,
    index: &LineIndex,
    defs: &mut ModuleDefinitions,
) -> Result<()> {
    let span = index.span(class);

    match classify_decorators(class, index)? {
        ClassKind::Trait => {
            let def = extract_trait(class, index)?;
            defs.check_not_defined(&def.name, span)?;
            defs.traits.insert(def.name.clone(), def);
        }
        ClassKind::Enum(underlying) => {
            let def = extract_enum(class, underlying, index)?;
            defs.check_not_defined(&def.name, span)?;
            defs.enums.insert(def.name.clone(), def);
        }
        ClassKind::Class => {
            let def = extract_class(class, index)?;
            defs.check_not_defined(&def.name, span)?;
            defs.classes.insert(def.name.clone(), def);
        }
    }

    Ok(())
}

enum ClassKind {
    Class,
    Trait,
    Enum(MysType),
}

fn classify_decorators(class: &py::StmtClassDef, index: &LineIndex) -> Result<ClassKind> {
    let mut kind = ClassKind::Class;

    for decorator in &class.decorator_list {
        match decorator {
            py::Expr::Name(name) if name.id.as_str() == "trait" => kind = ClassKind::Trait,
            py::Expr::Name(name) if name.id.as_str() == "enum" => {
                kind = ClassKind::Enum(MysType::I64);
            }
            py::Expr::Call(call) => {
                let py::Expr::Name(name) = call.func.as_ref() else {
                    return Err(Error::language(
                        "unsupported decorator",
                        index.span(decorator),
                    ));
                };

                if name.id.as_str() != "enum" || call.args.len() != 1 {
                    return Err(Error::language(
                        "unsupported decorator",
                        index.span(decorator),
                    ));
                }

                let underlying = MysType::from_annotation(&call.args[0], index)?;

                if !underlying.is_integer() {
                    return Err(Error::compile(
                        format!("integer type expected, not '{underlying}'"),
                        index.span(&call.args[0]),
                    ));
                }

                kind = ClassKind::Enum(underlying);
            }
            _ => {
                return Err(Error::language(
                    "unsupported decorator",
                    index.span(decorator),
                ));
            }
        }
    }

    Ok(kind)
}

fn is_docstring(stmt: &py::Stmt) -> bool {
    matches!(
        stmt,
        py::Stmt::Expr(expr) if matches!(
            expr.value.as_ref(),
            py::Expr::Constant(py::ExprConstant {
                value: py::Constant::Str(_),
                ..
            })
        )
    )
}

fn extract_class(class: &py::StmtClassDef, index: &LineIndex) -> Result<ClassDef> {
    let name = class.name.to_string();
    let mut members = IndexMap::new();
    let mut methods: IndexMap<String, Vec<FunctionDef>> = IndexMap::new();

    let implements = class
        .bases
        .iter()
        .map(|base| match base {
            py::Expr::Name(base) => Ok(base.id.to_string()),
            _ => Err(Error::compile("syntax error", index.span(base))),
        })
        .collect::<Result<Vec<_>>>()?;

    for (i, stmt) in class.body.iter().enumerate() {
        if i == 0 && is_docstring(stmt) {
            continue;
        }

        match stmt {
            py::Stmt::Pass(_) => {}
            py::Stmt::AnnAssign(assign) => {
                let py::Expr::Name(target) = assign.target.as_ref() else {
                    return Err(Error::compile("syntax error", index.span(assign)));
                };

                let member = Member {
                    name: target.id.to_string(),
                    ty: MysType::from_annotation(&assign.annotation, index)?,
                    node: assign.clone(),
                };
                members.insert(member.name.clone(), member);
            }
            py::Stmt::FunctionDef(func) => {
                let method = extract_function(func, index, true)?;
                check_special_method(&method, &name, index)?;
                push_overload(&mut methods, method, index.span(func))?;
            }
            _ => {
                return Err(Error::compile("syntax error", index.span(stmt)));
            }
        }
    }

    Ok(ClassDef {
        name,
        members,
        methods,
        implements,
        span: index.span(class),
    })
}

const COMPARISON_SPECIALS: &[&str] = &["__eq__", "__ne__", "__lt__", "__le__", "__gt__", "__ge__"];

fn check_special_method(method: &FunctionDef, class_name: &str, index: &LineIndex) -> Result<()> {
    let span = index.span(&method.node);

    if COMPARISON_SPECIALS.contains(&method.name.as_str())
        && method.returns != Some(MysType::Bool)
    {
        return Err(Error::compile(
            format!("{}() must return 'bool'", method.name),
            span,
        ));
    }

    if matches!(method.name.as_str(), "__add__" | "__sub__")
        && method.returns != Some(MysType::Named(class_name.to_string()))
    {
        return Err(Error::compile(
            format!("{}() must return '{class_name}'", method.name),
            span,
        ));
    }

    Ok(())
}

fn extract_trait(class: &py::StmtClassDef, index: &LineIndex) -> Result<TraitDef> {
    let name = class.name.to_string();
    let mut methods: IndexMap<String, Vec<FunctionDef>> = IndexMap::new();

    for (i, stmt) in class.body.iter().enumerate() {
        if i == 0 && is_docstring(stmt) || matches!(stmt, py::Stmt::Pass(_)) {
            continue;
        }

        let py::Stmt::FunctionDef(func) = stmt else {
            return Err(Error::compile("syntax error", index.span(stmt)));
        };

        let body_is_pass = match func.body.as_slice() {
            [only] => matches!(only, py::Stmt::Pass(_)),
            [first, second] => is_docstring(first) && matches!(second, py::Stmt::Pass(_)),
            _ => false,
        };

        if !body_is_pass {
            return Err(Error::compile(
                "trait method bodies must be 'pass'",
                index.span(func),
            ));
        }

        let method = extract_function(func, index, true)?;
        push_overload(&mut methods, method, index.span(func))?;
    }

    Ok(TraitDef {
        name,
        methods,
        span: index.span(class),
    })
}

fn extract_enum(
    class: &py::StmtClassDef,
    underlying: MysType,
    index: &LineIndex,
) -> Result<EnumDef> {
    let name = class.name.to_string();
    let mut members = Vec::new();

    for (i, stmt) in class.body.iter().enumerate() {
        if i == 0 && is_docstring(stmt) || matches!(stmt, py::Stmt::Pass(_)) {
            continue;
        }

        let py::Stmt::Assign(assign) = stmt else {
            return Err(Error::compile(
                format!("invalid enum member in '{name}'"),
                index.span(stmt),
            ));
        };

        let [py::Expr::Name(target)] = assign.targets.as_slice() else {
            return Err(Error::compile(
                format!("invalid enum member in '{name}'"),
                index.span(assign),
            ));
        };

        let py::Expr::Constant(py::ExprConstant {
            value: py::Constant::Int(value),
            ..
        }) = assign.value.as_ref()
        else {
            return Err(Error::compile(
                "enum member value must be an integer",
                index.span(assign.value.as_ref()),
            ));
        };

        let value: i64 = value.try_into().map_err(|_| {
            Error::compile(
                "enum member value must be an integer",
                index.span(assign.value.as_ref()),
            )
        })?;

        members.push((target.id.to_string(), value));
    }

    Ok(EnumDef {
        name,
        ty: underlying,
        members,
        span: index.span(class),
    })
}

/// Check classes against traits defined in the same module. Conformance
/// against imported traits is checked after import resolution.
fn validate_local_trait_conformance(defs: &ModuleDefinitions, _index: &LineIndex) -> Result<()> {
    for class in defs.classes.values() {
        for trait_name in &class.implements {
            let Some(trait_def) = defs.traits.get(trait_name) else {
                continue;
            };

            validate_trait_conformance(class, trait_def)?;
        }
    }

    Ok(())
}

/// A class implementing a trait must provide every trait method with a
/// compatible signature.
pub fn validate_trait_conformance(class: &ClassDef, trait_def: &TraitDef) -> Result<()> {
    for (method_name, trait_overloads) in &trait_def.methods {
        let Some(class_overloads) = class.methods.get(method_name) else {
            return Err(Error::compile(
                format!(
                    "class '{}' does not implement method '{}' of trait '{}'",
                    class.name, method_name, trait_def.name
                ),
                class.span,
            ));
        };

        for trait_method in trait_overloads {
            let compatible = class_overloads.iter().any(|m| {
                m.signature() == trait_method.signature() && m.returns == trait_method.returns
            });

            if !compatible {
                return Err(Error::compile(
                    format!(
                        "class '{}' does not implement method '{}' of trait '{}'",
                        class.name, method_name, trait_def.name
                    ),
                    class.span,
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_module;

    fn extract(source: &str) -> Result<ModuleDefinitions> {
        let module = parse_module(source, "<test>").unwrap();
        let index = LineIndex::new(source);
        extract_definitions(&module, &index)
    }

    #[test]
    fn test_extract_variable() {
        let defs = extract("BAR: i32 = 1\n").unwrap();
        assert_eq!(defs.variables["BAR"].ty, MysType::I32);
    }

    #[test]
    fn test_extract_function_overloads_in_order() {
        let defs = extract(
            "def foo(a: i32):\n    pass\n\
             def foo(a: string):\n    pass\n",
        )
        .unwrap();
        let overloads = &defs.functions["foo"];
        assert_eq!(overloads.len(), 2);
        assert_eq!(overloads[0].params[0].param.ty, MysType::I32);
        assert_eq!(overloads[1].params[0].param.ty, MysType::String);
    }

    #[test]
    fn test_ambiguous_overload_rejected() {
        let err = extract(
            "def foo(a: i32):\n    pass\n\
             def foo(b: i32):\n    pass\n",
        )
        .unwrap_err();
        assert_eq!(err.message, "ambiguous overload of 'foo'");
    }

    #[test]
    fn test_bare_import_rejected() {
        let err = extract("import foo\n").unwrap_err();
        assert_eq!(err.message, "only 'from <module> import ...' is allowed");
    }

    #[test]
    fn test_multi_name_import_rejected() {
        let err = extract("from foo import bar, fie\n").unwrap_err();
        assert_eq!(err.message, "only one import is allowed, found 2");
    }

    #[test]
    fn test_import_after_definition_rejected() {
        let err = extract("V: bool = True\nfrom bar import fie\n").unwrap_err();
        assert_eq!(err.message, "imports must be at the beginning of the file");
        assert_eq!(err.span.unwrap().line, 2);
    }

    #[test]
    fn test_import_inside_function_rejected() {
        let err = extract("def main():\n    import foo\n").unwrap_err();
        assert_eq!(err.message, "imports are only allowed on module level");
        assert_eq!(err.span.unwrap(), Span { line: 2, column: 4 });
    }

    #[test]
    fn test_class_inside_function_rejected() {
        let err = extract("def main():\n    class Foo:\n        pass\n").unwrap_err();
        assert_eq!(err.message, "classes are only allowed on module level");
    }

    #[test]
    fn test_class_members_in_declaration_order() {
        let defs = extract(
            "class Foo:\n\
             \x20   a: i32\n\
             \x20   _b: string\n\
             \x20   c: bool\n",
        )
        .unwrap();
        let class = &defs.classes["Foo"];
        let names: Vec<_> = class.members.keys().collect();
        assert_eq!(names, ["a", "_b", "c"]);
        let public: Vec<_> = class.public_members().map(|m| m.name.as_str()).collect();
        assert_eq!(public, ["a", "c"]);
    }

    #[test]
    fn test_trait_method_body_must_be_pass() {
        let err = extract(
            "@trait\n\
             class Base:\n\
             \x20   def foo(self):\n\
             \x20       return 1\n",
        )
        .unwrap_err();
        assert_eq!(err.message, "trait method bodies must be 'pass'");
    }

    #[test]
    fn test_trait_conformance_missing_method() {
        let err = extract(
            "@trait\n\
             class Base:\n\
             \x20   def foo(self):\n\
             \x20       pass\n\
             class Impl(Base):\n\
             \x20   a: i32\n",
        )
        .unwrap_err();
        assert_eq!(
            err.message,
            "class 'Impl' does not implement method 'foo' of trait 'Base'"
        );
    }

    #[test]
    fn test_eq_must_return_bool() {
        let err = extract(
            "class Foo:\n\
             \x20   def __eq__(self, other: Foo) -> i32:\n\
             \x20       return 1\n",
        )
        .unwrap_err();
        assert_eq!(err.message, "__eq__() must return 'bool'");
    }

    #[test]
    fn test_add_must_return_class() {
        let err = extract(
            "class Foo:\n\
             \x20   def __add__(self, other: Foo) -> i32:\n\
             \x20       return 1\n",
        )
        .unwrap_err();
        assert_eq!(err.message, "__add__() must return 'Foo'");
    }

    #[test]
    fn test_enum_extraction() {
        let defs = extract(
            "@enum\n\
             class E:\n\
             \x20   A = 1\n\
             \x20   B = 2\n",
        )
        .unwrap();
        let def = &defs.enums["E"];
        assert_eq!(def.ty, MysType::I64);
        assert_eq!(def.members, [("A".to_string(), 1), ("B".to_string(), 2)]);
    }

    #[test]
    fn test_enum_with_underlying_type() {
        let defs = extract(
            "@enum(u8)\n\
             class E:\n\
             \x20   A = 1\n",
        )
        .unwrap();
        assert_eq!(defs.enums["E"].ty, MysType::U8);
    }

    #[test]
    fn test_enum_bad_member_value() {
        let err = extract(
            "@enum\n\
             class E:\n\
             \x20   A = \"x\"\n",
        )
        .unwrap_err();
        assert_eq!(err.message, "enum member value must be an integer");
    }

    #[test]
    fn test_async_function_rejected() {
        let err = extract("async def foo():\n    pass\n").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Language);
    }
}
