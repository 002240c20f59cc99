//! Statement lowering.
//!
//! [`Lowerer`] walks function and method bodies and emits C++ statement
//! text. Expression checking lives in `expr`, match lowering in
//! `patterns` and class emission in `classes`; all of them are `impl`
//! blocks on the same `Lowerer` so the scope state threads through one
//! explicit value.

use tracing::trace;

use crate::ast::{py, LineIndex};
use crate::context::{Binding, Context};
use crate::definitions::{FunctionDef, ParamWithDefault};
use crate::error::{Error, Result};
use crate::types::{cpp_param_type, cpp_return_type, cpp_type, MysType};

/// A lowered expression: rendered C++ text plus the inferred Mys type.
/// `ty` is `None` for expressions that produce no value (calls of
/// functions that return nothing).
#[derive(Debug, Clone, PartialEq)]
pub struct TypedFragment {
    pub code: String,
    pub ty: Option<MysType>,
}

impl TypedFragment {
    pub fn new(code: impl Into<String>, ty: MysType) -> Self {
        Self {
            code: code.into(),
            ty: Some(ty),
        }
    }

    pub fn valueless(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ty: None,
        }
    }

    pub fn type_name(&self) -> String {
        match &self.ty {
            Some(ty) => ty.to_string(),
            None => "None".to_string(),
        }
    }
}

/// Lowers one module's bodies. Holds the scope context, the module's
/// line index and the fragments hoisted out of bodies (forward
/// declarations, before-namespace blocks, the `package_main` flag).
pub struct Lowerer<'a> {
    pub ctx: Context<'a>,
    pub index: &'a LineIndex,
    pub module: String,
    pub skip_tests: bool,
    pub forward_declarations: Vec<String>,
    pub before_namespace: Vec<String>,
    pub add_package_main: bool,
    pub(crate) temp_counter: usize,
}

pub fn indent_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| {
            if line.is_empty() {
                line
            } else {
                format!("    {line}")
            }
        })
        .collect()
}

impl<'a> Lowerer<'a> {
    pub fn new(module: &str, index: &'a LineIndex, skip_tests: bool) -> Self {
        Self {
            ctx: Context::new(module),
            index,
            module: module.to_string(),
            skip_tests,
            forward_declarations: Vec::new(),
            before_namespace: Vec::new(),
            add_package_main: false,
            temp_counter: 0,
        }
    }

    pub(crate) fn fresh_temp(&mut self, stem: &str) -> String {
        self.temp_counter += 1;
        format!("mys_{stem}_{}", self.temp_counter)
    }

    pub(crate) fn compile_error<N: rustpython_ast::Ranged>(
        &self,
        message: impl Into<String>,
        node: &N,
    ) -> Error {
        Error::compile(message, self.index.span(node))
    }

    pub(crate) fn language_error<N: rustpython_ast::Ranged>(
        &self,
        message: impl Into<String>,
        node: &N,
    ) -> Error {
        Error::language(message, self.index.span(node))
    }

    /// Enforce that `actual` unifies with `expected`.
    pub(crate) fn check_types<N: rustpython_ast::Ranged>(
        &self,
        expected: &MysType,
        fragment: &TypedFragment,
        node: &N,
    ) -> Result<()> {
        if self.types_unify(expected, fragment.ty.as_ref()) {
            Ok(())
        } else {
            Err(self.compile_error(
                format!("types '{}' and '{}' differ", expected, fragment.type_name()),
                node,
            ))
        }
    }

    /// Numeric literals widen to the expected exact type; a class unifies
    /// with a trait it implements; everything else must match exactly.
    pub(crate) fn types_unify(&self, expected: &MysType, actual: Option<&MysType>) -> bool {
        let Some(actual) = actual else {
            return false;
        };

        if expected == actual {
            return true;
        }

        if expected.is_integer() && *actual == MysType::I64 {
            return true;
        }

        if expected.is_float() && *actual == MysType::F64 {
            return true;
        }

        if let (MysType::Named(want), MysType::Named(have)) = (expected, actual) {
            if self.ctx.trait_def(want).is_some() {
                if let Some(class) = self.ctx.class_def(have) {
                    return class.implements.iter().any(|t| t == want);
                }
            }
        }

        false
    }

    /// Lower a statement list, skipping a leading docstring.
    pub fn lower_body(&mut self, body: &[py::Stmt], skip_docstring: bool) -> Result<Vec<String>> {
        let mut lines = Vec::new();

        for (i, stmt) in body.iter().enumerate() {
            if i == 0 && skip_docstring && is_docstring(stmt) {
                continue;
            }

            lines.extend(self.stmt(stmt)?);
        }

        Ok(lines)
    }

    fn stmt(&mut self, stmt: &py::Stmt) -> Result<Vec<String>> {
        match stmt {
            py::Stmt::AnnAssign(node) => self.ann_assign(node),
            py::Stmt::Assign(node) => self.assign(node),
            py::Stmt::AugAssign(node) => self.aug_assign(node),
            py::Stmt::Return(node) => self.return_stmt(node),
            py::Stmt::If(node) => self.if_stmt(node),
            py::Stmt::While(node) => self.while_stmt(node),
            py::Stmt::For(node) => self.for_stmt(node),
            py::Stmt::Try(node) => self.try_stmt(node),
            py::Stmt::Match(node) => self.match_stmt(node),
            py::Stmt::Raise(node) => self.raise_stmt(node),
            py::Stmt::Assert(node) => self.assert_stmt(node),
            py::Stmt::Expr(node) => {
                let fragment = self.expr(&node.value, None)?;
                Ok(vec![format!("{};", fragment.code)])
            }
            py::Stmt::Pass(_) => Ok(Vec::new()),
            py::Stmt::Break(_) => Ok(vec!["break;".to_string()]),
            py::Stmt::Continue(_) => Ok(vec!["continue;".to_string()]),
            py::Stmt::FunctionDef(node) => {
                Err(self.language_error("nested functions are not supported", node))
            }
            py::Stmt::Global(_) | py::Stmt::Nonlocal(_) | py::Stmt::With(_) => {
                Err(self.language_error("unsupported statement", stmt))
            }
            other => Err(Error::internal("unhandled node", Some(self.index.span(other)))),
        }
    }

    fn ann_assign(&mut self, node: &py::StmtAnnAssign) -> Result<Vec<String>> {
        let py::Expr::Name(target) = node.target.as_ref() else {
            return Err(self.compile_error("syntax error", node));
        };

        let ty = MysType::from_annotation(&node.annotation, self.index)?;

        if !self.ctx.is_type_defined(&ty) {
            return Err(self.compile_error(
                format!("undefined type '{ty}'"),
                node.annotation.as_ref(),
            ));
        }

        let Some(value) = &node.value else {
            return Err(self.compile_error("variables must be initialized", node));
        };

        let fragment = self.expr(value, Some(&ty))?;
        self.check_types(&ty, &fragment, value.as_ref())?;

        let name = target.id.as_str();
        self.ctx
            .define_local(name, ty.clone(), self.index.span(target))?;

        Ok(vec![format!(
            "{} {} = {};",
            cpp_type(&ty, &self.ctx),
            name,
            fragment.code
        )])
    }

    fn assign(&mut self, node: &py::StmtAssign) -> Result<Vec<String>> {
        let [target] = node.targets.as_slice() else {
            return Err(self.language_error("multiple assignment targets are not supported", node));
        };

        match target {
            py::Expr::Name(name) => {
                let ty = match self.ctx.lookup(name.id.as_str()) {
                    Some(Binding::Variable { ty, .. }) => ty.clone(),
                    _ => {
                        return Err(self.compile_error(
                            format!("undefined variable '{}'", name.id),
                            name,
                        ));
                    }
                };

                let fragment = self.expr(&node.value, Some(&ty))?;
                self.check_types(&ty, &fragment, node.value.as_ref())?;

                Ok(vec![format!("{} = {};", name.id, fragment.code)])
            }
            py::Expr::Attribute(attr) => {
                let target_fragment = self.attribute(attr)?;
                let Some(ty) = target_fragment.ty.clone() else {
                    return Err(self.compile_error("syntax error", attr));
                };

                let fragment = self.expr(&node.value, Some(&ty))?;
                self.check_types(&ty, &fragment, node.value.as_ref())?;

                Ok(vec![format!("{} = {};", target_fragment.code, fragment.code)])
            }
            py::Expr::Subscript(subscript) => {
                let base = self.expr(&subscript.value, None)?;

                match base.ty.clone() {
                    Some(MysType::List(item)) => {
                        let index = self.expr(&subscript.slice, Some(&MysType::I64))?;
                        self.check_integer(&index, subscript.slice.as_ref())?;
                        let fragment = self.expr(&node.value, Some(&*item))?;
                        self.check_types(&item, &fragment, node.value.as_ref())?;

                        Ok(vec![format!(
                            "{}->set({}, {});",
                            base.code, index.code, fragment.code
                        )])
                    }
                    Some(MysType::Dict(key, value)) => {
                        let index = self.expr(&subscript.slice, Some(&*key))?;
                        self.check_types(&key, &index, subscript.slice.as_ref())?;
                        let fragment = self.expr(&node.value, Some(&*value))?;
                        self.check_types(&value, &fragment, node.value.as_ref())?;

                        Ok(vec![format!(
                            "{}->set({}, {});",
                            base.code, index.code, fragment.code
                        )])
                    }
                    _ => Err(self.compile_error(
                        format!("'{}' is not subscriptable", base.type_name()),
                        subscript,
                    )),
                }
            }
            _ => Err(self.compile_error("syntax error", target)),
        }
    }

    fn aug_assign(&mut self, node: &py::StmtAugAssign) -> Result<Vec<String>> {
        let py::Expr::Name(name) = node.target.as_ref() else {
            return Err(self.compile_error("syntax error", node));
        };

        let ty = match self.ctx.lookup(name.id.as_str()) {
            Some(Binding::Variable { ty, .. }) => ty.clone(),
            _ => {
                return Err(self.compile_error(format!("undefined variable '{}'", name.id), name));
            }
        };

        let op = self.binary_operator_symbol(&node.op, node)?;
        let fragment = self.expr(&node.value, Some(&ty))?;
        self.check_types(&ty, &fragment, node.value.as_ref())?;

        Ok(vec![format!("{} {}= {};", name.id, op, fragment.code)])
    }

    fn return_stmt(&mut self, node: &py::StmtReturn) -> Result<Vec<String>> {
        match (&node.value, self.ctx.return_type.clone()) {
            (None, None) => Ok(vec!["return;".to_string()]),
            (None, Some(ty)) => {
                Err(self.compile_error(format!("expected a '{ty}' return value"), node))
            }
            (Some(value), None) => {
                Err(self.compile_error("function does not return any value", value.as_ref()))
            }
            (Some(value), Some(ty)) => {
                let fragment = self.expr(value, Some(&ty))?;
                self.check_types(&ty, &fragment, value.as_ref())?;

                Ok(vec![format!("return {};", fragment.code)])
            }
        }
    }

    fn condition(&mut self, node: &py::Expr) -> Result<String> {
        let fragment = self.expr(node, Some(&MysType::Bool))?;
        self.check_types(&MysType::Bool, &fragment, node)?;

        Ok(fragment.code)
    }

    fn if_stmt(&mut self, node: &py::StmtIf) -> Result<Vec<String>> {
        let condition = self.condition(&node.test)?;

        self.ctx.push();
        let body = self.lower_body(&node.body, false)?;
        self.ctx.pop();

        let mut lines = vec![format!("if ({condition}) {{")];
        lines.extend(indent_lines(body));

        if node.orelse.is_empty() {
            lines.push("}".to_string());
        } else {
            lines.push("} else {".to_string());
            self.ctx.push();
            lines.extend(indent_lines(self.lower_body(&node.orelse, false)?));
            self.ctx.pop();
            lines.push("}".to_string());
        }

        Ok(lines)
    }

    fn while_stmt(&mut self, node: &py::StmtWhile) -> Result<Vec<String>> {
        if !node.orelse.is_empty() {
            return Err(self.language_error("'while else' is not supported", node));
        }

        let condition = self.condition(&node.test)?;

        self.ctx.push();
        let body = self.lower_body(&node.body, false)?;
        self.ctx.pop();

        let mut lines = vec![format!("while ({condition}) {{")];
        lines.extend(indent_lines(body));
        lines.push("}".to_string());

        Ok(lines)
    }

    pub(crate) fn check_integer(
        &self,
        fragment: &TypedFragment,
        node: &py::Expr,
    ) -> Result<()> {
        match &fragment.ty {
            Some(ty) if ty.is_integer() => Ok(()),
            _ => Err(self.compile_error(
                format!(
                    "parameter type must be an integer, not '{}'",
                    fragment.type_name()
                ),
                node,
            )),
        }
    }

    fn for_stmt(&mut self, node: &py::StmtFor) -> Result<Vec<String>> {
        if !node.orelse.is_empty() {
            return Err(self.language_error("'for else' is not supported", node));
        }

        if let py::Expr::Call(call) = node.iter.as_ref() {
            if let py::Expr::Name(func) = call.func.as_ref() {
                match func.id.as_str() {
                    "range" => return self.for_range(node, call),
                    "enumerate" => return self.for_enumerate(node, call),
                    _ => {}
                }
            }
        }

        let iterable = self.expr(&node.iter, None)?;

        let py::Expr::Name(target) = node.target.as_ref() else {
            return Err(self.compile_error("syntax error", node.target.as_ref()));
        };

        let item_ty = match iterable.ty.clone() {
            Some(MysType::List(item)) => *item,
            Some(MysType::Set(item)) => *item,
            Some(MysType::String) => MysType::Char,
            _ => {
                return Err(self.compile_error(
                    format!("cannot iterate over '{}'", iterable.type_name()),
                    node.iter.as_ref(),
                ));
            }
        };

        self.ctx.push();
        self.ctx
            .define_local(target.id.as_str(), item_ty, self.index.span(target))?;
        let body = self.lower_body(&node.body, false)?;
        self.ctx.pop();

        let deref = if matches!(iterable.ty, Some(MysType::String)) {
            iterable.code.clone()
        } else {
            format!("*{}", iterable.code)
        };

        let mut lines = vec![format!("for (const auto& {} : {}) {{", target.id, deref)];
        lines.extend(indent_lines(body));
        lines.push("}".to_string());

        Ok(lines)
    }

    /// Bounds of a `range(...)` call: (start, stop, step) as rendered C++.
    fn range_bounds(&mut self, call: &py::ExprCall) -> Result<(String, String, String)> {
        if call.args.is_empty() || call.args.len() > 3 {
            return Err(self.compile_error(
                format!("expected 1 to 3 parameters, got {}", call.args.len()),
                call,
            ));
        }

        let mut bounds = Vec::new();

        for arg in &call.args {
            let fragment = self.expr(arg, Some(&MysType::I64))?;
            self.check_integer(&fragment, arg)?;
            bounds.push(fragment.code);
        }

        Ok(match bounds.len() {
            1 => ("0".to_string(), bounds.remove(0), "1".to_string()),
            2 => (bounds.remove(0), bounds.remove(0), "1".to_string()),
            _ => (bounds.remove(0), bounds.remove(0), bounds.remove(0)),
        })
    }

    fn for_range(&mut self, node: &py::StmtFor, call: &py::ExprCall) -> Result<Vec<String>> {
        let py::Expr::Name(target) = node.target.as_ref() else {
            return Err(self.compile_error("syntax error", node.target.as_ref()));
        };

        let (start, stop, step) = self.range_bounds(call)?;

        self.ctx.push();
        self.ctx
            .define_local(target.id.as_str(), MysType::I64, self.index.span(target))?;
        let body = self.lower_body(&node.body, false)?;
        self.ctx.pop();

        let var = target.id.as_str();
        let mut lines = vec![format!(
            "for (i64 {var} = {start}; {var} < {stop}; {var} += {step}) {{"
        )];
        lines.extend(indent_lines(body));
        lines.push("}".to_string());

        Ok(lines)
    }

    fn for_enumerate(&mut self, node: &py::StmtFor, call: &py::ExprCall) -> Result<Vec<String>> {
        let py::Expr::Tuple(targets) = node.target.as_ref() else {
            return Err(self.compile_error("syntax error", node.target.as_ref()));
        };

        let [py::Expr::Name(index_target), py::Expr::Name(item_target)] = targets.elts.as_slice()
        else {
            return Err(self.compile_error("syntax error", targets));
        };

        if call.args.is_empty() || call.args.len() > 2 {
            return Err(self.compile_error(
                format!("expected 1 or 2 parameters, got {}", call.args.len()),
                call,
            ));
        }

        let start = if let Some(arg) = call.args.get(1) {
            let fragment = self.expr(arg, Some(&MysType::I64))?;

            match &fragment.ty {
                Some(ty) if ty.is_integer() => {}
                _ => {
                    return Err(self.compile_error(
                        format!(
                            "initial value must be an integer, not '{}'",
                            fragment.type_name()
                        ),
                        arg,
                    ));
                }
            }

            fragment.code
        } else {
            "0".to_string()
        };

        let index_var = index_target.id.as_str();
        let item_var = item_target.id.as_str();
        let mut lines = vec!["{".to_string()];
        let mut inner = vec![format!("i64 {index_var} = {start};")];

        self.ctx.push();
        self.ctx
            .define_local(index_var, MysType::I64, self.index.span(index_target))?;

        // enumerate over range(...) iterates the range directly; any
        // other iterable is walked element-wise.
        if let py::Expr::Call(inner_call) = &call.args[0] {
            if matches!(inner_call.func.as_ref(), py::Expr::Name(f) if f.id.as_str() == "range") {
                let (start, stop, step) = self.range_bounds(inner_call)?;
                self.ctx.define_local(
                    item_var,
                    MysType::I64,
                    self.index.span(item_target),
                )?;
                let mut body = self.lower_body(&node.body, false)?;
                body.push(format!("{index_var}++;"));
                self.ctx.pop();

                inner.push(format!(
                    "for (i64 {item_var} = {start}; {item_var} < {stop}; {item_var} += {step}) {{"
                ));
                inner.extend(indent_lines(body));
                inner.push("}".to_string());
                lines.extend(indent_lines(inner));
                lines.push("}".to_string());

                return Ok(lines);
            }
        }

        let iterable = self.expr(&call.args[0], None)?;

        let item_ty = match iterable.ty.clone() {
            Some(MysType::List(item)) => *item,
            Some(MysType::String) => MysType::Char,
            _ => {
                return Err(self.compile_error(
                    format!("cannot iterate over '{}'", iterable.type_name()),
                    &call.args[0],
                ));
            }
        };

        self.ctx
            .define_local(item_var, item_ty, self.index.span(item_target))?;
        let mut body = self.lower_body(&node.body, false)?;
        body.push(format!("{index_var}++;"));
        self.ctx.pop();

        inner.push(format!(
            "for (const auto& {item_var} : *{}) {{",
            iterable.code
        ));
        inner.extend(indent_lines(body));
        inner.push("}".to_string());
        lines.extend(indent_lines(inner));
        lines.push("}".to_string());

        Ok(lines)
    }

    fn try_stmt(&mut self, node: &py::StmtTry) -> Result<Vec<String>> {
        if !node.orelse.is_empty() {
            return Err(self.language_error("'try else' is not supported", node));
        }

        if !node.finalbody.is_empty() {
            return Err(self.language_error("'finally' is not supported", node));
        }

        self.ctx.push();
        let body = self.lower_body(&node.body, false)?;
        self.ctx.pop();

        let mut lines = vec!["try {".to_string()];
        lines.extend(indent_lines(body));

        for handler in &node.handlers {
            let py::ExceptHandler::ExceptHandler(handler) = handler;

            let exception = match &handler.type_ {
                Some(type_) => match type_.as_ref() {
                    py::Expr::Name(name) => name.id.to_string(),
                    _ => return Err(self.compile_error("syntax error", type_.as_ref())),
                },
                None => String::new(),
            };

            // The exception binding exists only within the handler body.
            self.ctx.push();

            let catch = if exception.is_empty() {
                "} catch (...) {".to_string()
            } else if let Some(name) = &handler.name {
                self.ctx.define_local(
                    name.as_str(),
                    MysType::Named(exception.clone()),
                    self.index.span(handler),
                )?;
                format!("}} catch (const {}& {}) {{", exception, name.as_str())
            } else {
                format!("}} catch (const {exception}&) {{")
            };

            lines.push(catch);
            lines.extend(indent_lines(self.lower_body(&handler.body, false)?));
            self.ctx.pop();
        }

        lines.push("}".to_string());

        Ok(lines)
    }

    fn raise_stmt(&mut self, node: &py::StmtRaise) -> Result<Vec<String>> {
        let Some(exc) = &node.exc else {
            return Ok(vec!["throw;".to_string()]);
        };

        let py::Expr::Call(call) = exc.as_ref() else {
            return Err(self.compile_error("syntax error", exc.as_ref()));
        };

        let py::Expr::Name(name) = call.func.as_ref() else {
            return Err(self.compile_error("syntax error", call.func.as_ref()));
        };

        let mut args = Vec::new();

        for arg in &call.args {
            args.push(self.expr(arg, Some(&MysType::String))?.code);
        }

        Ok(vec![format!("throw {}({});", name.id, args.join(", "))])
    }

    fn assert_stmt(&mut self, node: &py::StmtAssert) -> Result<Vec<String>> {
        let condition = self.condition(&node.test)?;

        Ok(vec![format!("ASSERT({condition});")])
    }

    /// Format a parameter list the way the runtime expects: scalars by
    /// value, everything else by const reference; `void` when empty.
    pub fn format_parameters(&self, params: &[ParamWithDefault]) -> String {
        if params.is_empty() {
            return "void".to_string();
        }

        params
            .iter()
            .map(|p| {
                format!(
                    "{} {}",
                    cpp_param_type(&p.param.ty, &self.ctx),
                    p.param.name
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Lower a free function definition. Forward declarations accumulate
    /// on the lowerer; `main` flips the `package_main` trampoline on.
    pub fn lower_function_definition(&mut self, function: &'a FunctionDef) -> Result<Vec<String>> {
        trace!(name = %function.name, "lowering function");

        let is_main = function.name == "main" && !function.is_method;
        let mut main_takes_argv = false;

        if is_main {
            self.add_package_main = true;

            if function.returns.is_some() {
                return Err(Error::compile(
                    "main() must not return any value",
                    function.span,
                ));
            }

            main_takes_argv = match function.params.as_slice() {
                [] => false,
                [only]
                    if only.param.name == "argv"
                        && only.param.ty == MysType::List(Box::new(MysType::String)) =>
                {
                    true
                }
                _ => {
                    return Err(Error::compile(
                        "main() takes 'argv: [string]' or no arguments",
                        function.span,
                    ));
                }
            };
        }

        // Every type named in the signature must be registered by now.
        for param in &function.params {
            if !self.ctx.is_type_defined(&param.param.ty) {
                return Err(Error::compile(
                    format!("undefined type '{}'", param.param.ty),
                    function.span,
                ));
            }
        }

        if let Some(returns) = &function.returns {
            if !self.ctx.is_type_defined(returns) {
                return Err(Error::compile(
                    format!("undefined type '{returns}'"),
                    function.span,
                ));
            }
        }

        self.ctx.push();

        for param in &function.params {
            self.ctx.define_local(
                &param.param.name,
                param.param.ty.clone(),
                function.span,
            )?;
        }

        self.ctx.return_type = function.returns.clone();

        let mut parameters = self.format_parameters(&function.params);
        let return_cpp_type = cpp_return_type(function.returns.as_ref(), &self.ctx);
        let mut body = indent_lines(self.lower_body(&function.node.body, true)?);

        if is_main {
            if main_takes_argv {
                body.insert(0, "    auto argv = create_args(__argc, __argv);".to_string());
            } else {
                body.insert(0, "    (void)__argc;".to_string());
                body.insert(1, "    (void)__argv;".to_string());
            }

            parameters = "int __argc, const char *__argv[]".to_string();
        }

        let prototype = format!("{} {}({})", return_cpp_type, function.name, parameters);

        let code = if function.is_test {
            if self.skip_tests {
                Vec::new()
            } else {
                let full_test_name = format!(
                    "{}::{}",
                    self.module.replace('.', "::"),
                    function.name
                );

                let mut code = vec![
                    "#if defined(MYS_TEST)".to_string(),
                    format!("static {prototype}"),
                    "{".to_string(),
                ];
                code.extend(body);
                code.push("}".to_string());
                code.push(format!(
                    "static Test mys_test_{}(\"{}\", {});",
                    function.name, full_test_name, function.name
                ));
                code.push("#endif".to_string());
                code
            }
        } else {
            self.forward_declarations.push(format!("{prototype};"));

            let mut code = vec![prototype, "{".to_string()];
            code.extend(body);
            code.push("}".to_string());
            code
        };

        self.ctx.pop();
        self.ctx.return_type = None;

        Ok(code)
    }
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
