//! Expression checking and lowering.
//!
//! Every expression lowers to a [`TypedFragment`]: the rendered C++ text
//! together with the inferred Mys type. Carrying the type alongside the
//! text keeps statement lowering a single rendering pass and makes the
//! compatibility checks explicit.

use crate::ast::py;
use crate::context::Binding;
use crate::definitions::{FunctionDef, ParamWithDefault};
use crate::error::{Error, Result};
use crate::stmt::{Lowerer, TypedFragment};
use crate::types::{cpp_name, cpp_type, MysType};

/// Methods callable on the built-in string type: name, parameter types,
/// result.
const STRING_METHODS: &[(&str, &[MysType], Option<MysType>)] = &[
    ("to_utf8", &[], Some(MysType::Bytes)),
    ("upper", &[], Some(MysType::String)),
    ("lower", &[], Some(MysType::String)),
    ("casefold", &[], Some(MysType::String)),
    ("strip", &[], Some(MysType::String)),
    ("starts_with", &[MysType::String], Some(MysType::Bool)),
    ("ends_with", &[MysType::String], Some(MysType::Bool)),
];

impl<'a> Lowerer<'a> {
    /// Check an expression and emit its C++ form. `expected` is the type
    /// the surrounding context requires, used to coerce numeric literals;
    /// the caller still enforces the final compatibility check.
    pub fn expr(&mut self, node: &py::Expr, expected: Option<&MysType>) -> Result<TypedFragment> {
        match node {
            py::Expr::Constant(constant) => self.constant(constant, expected),
            py::Expr::Name(name) => self.name(name),
            py::Expr::BinOp(binop) => self.binop(binop, expected),
            py::Expr::UnaryOp(unaryop) => self.unaryop(unaryop, expected),
            py::Expr::BoolOp(boolop) => self.boolop(boolop),
            py::Expr::Compare(compare) => self.compare(compare),
            py::Expr::Call(call) => self.call(call, expected),
            py::Expr::Attribute(attribute) => self.attribute(attribute),
            py::Expr::Subscript(subscript) => self.subscript(subscript),
            py::Expr::List(list) => self.list_literal(list, expected),
            py::Expr::Set(set) => self.set_literal(set, expected),
            py::Expr::Dict(dict) => self.dict_literal(dict, expected),
            py::Expr::Tuple(tuple) => self.tuple_literal(tuple, expected),
            py::Expr::JoinedStr(joined) => self.joined_str(joined),
            py::Expr::Lambda(lambda) => {
                Err(self.compile_error("lambda functions are not supported", lambda))
            }
            other => Err(Error::internal(
                "unhandled node",
                Some(self.index.span(other)),
            )),
        }
    }

    /// As [`expr`], but the expression must produce a value.
    pub(crate) fn expr_value(
        &mut self,
        node: &py::Expr,
        expected: Option<&MysType>,
    ) -> Result<(String, MysType)> {
        let fragment = self.expr(node, expected)?;

        match fragment.ty {
            Some(ty) => Ok((fragment.code, ty)),
            None => Err(self.compile_error("expression does not produce a value", node)),
        }
    }

    fn constant(
        &mut self,
        node: &py::ExprConstant,
        expected: Option<&MysType>,
    ) -> Result<TypedFragment> {
        match &node.value {
            py::Constant::Int(value) => {
                let ty = match expected {
                    Some(expected) if expected.is_numeric() => expected.clone(),
                    _ => MysType::I64,
                };

                Ok(TypedFragment::new(value.to_string(), ty))
            }
            py::Constant::Float(value) => {
                let ty = match expected {
                    Some(MysType::F32) => MysType::F32,
                    _ => MysType::F64,
                };

                let mut code = value.to_string();

                if !code.contains('.') && !code.contains('e') {
                    code.push_str(".0");
                }

                Ok(TypedFragment::new(code, ty))
            }
            py::Constant::Str(value) => {
                if expected == Some(&MysType::Char) && value.chars().count() == 1 {
                    return Ok(TypedFragment::new(
                        format!("Char('{}')", escape(value)),
                        MysType::Char,
                    ));
                }

                Ok(TypedFragment::new(
                    format!("String(\"{}\")", escape(value)),
                    MysType::String,
                ))
            }
            py::Constant::Bool(value) => Ok(TypedFragment::new(
                format!("Bool({value})"),
                MysType::Bool,
            )),
            py::Constant::None => match expected {
                Some(ty) if !ty.is_scalar() && *ty != MysType::String => {
                    Ok(TypedFragment::new("nullptr", ty.clone()))
                }
                _ => Err(self.compile_error("cannot infer type of 'None'", node)),
            },
            _ => Err(self.compile_error("syntax error", node)),
        }
    }

    fn name(&mut self, node: &py::ExprName) -> Result<TypedFragment> {
        let name = node.id.as_str();

        match self.ctx.lookup(name) {
            Some(Binding::Variable { ty, fqn }) => {
                let code = match fqn {
                    Some(fqn) => self.code_name(fqn),
                    None => name.to_string(),
                };

                Ok(TypedFragment::new(code, ty.clone()))
            }
            Some(_) => Err(self.compile_error(format!("'{name}' is not a value"), node)),
            None => Err(self.compile_error(format!("undefined variable '{name}'"), node)),
        }
    }

    /// Spell a fully qualified Mys name at this module's emission point:
    /// names from the own module stay plain, external ones are
    /// namespace-qualified.
    pub(crate) fn code_name(&self, fqn: &str) -> String {
        match fqn.strip_prefix(&format!("{}.", self.module)) {
            Some(rest) if !rest.contains('.') => rest.to_string(),
            _ => cpp_name(fqn),
        }
    }

    pub(crate) fn binary_operator_symbol<N: rustpython_ast::Ranged>(
        &self,
        op: &py::Operator,
        node: &N,
    ) -> Result<&'static str> {
        Ok(match op {
            py::Operator::Add => "+",
            py::Operator::Sub => "-",
            py::Operator::Mult => "*",
            py::Operator::Div | py::Operator::FloorDiv => "/",
            py::Operator::Mod => "%",
            py::Operator::BitAnd => "&",
            py::Operator::BitOr => "|",
            py::Operator::BitXor => "^",
            py::Operator::LShift => "<<",
            py::Operator::RShift => ">>",
            _ => return Err(self.language_error("unsupported operator", node)),
        })
    }

    fn binop(&mut self, node: &py::ExprBinOp, expected: Option<&MysType>) -> Result<TypedFragment> {
        if matches!(node.op, py::Operator::Pow) {
            let (left, left_ty) = self.expr_value(&node.left, expected)?;
            let right = self.expr(&node.right, Some(&left_ty))?;
            self.check_types(&left_ty, &right, node.right.as_ref())?;

            if !left_ty.is_numeric() {
                return Err(self.compile_error(
                    format!("types '{left_ty}' and '{left_ty}' cannot be exponentiated"),
                    node,
                ));
            }

            return Ok(TypedFragment::new(
                format!("std::pow({}, {})", left, right.code),
                left_ty,
            ));
        }

        let op = self.binary_operator_symbol(&node.op, node)?;
        let (left, left_ty) = self.expr_value(&node.left, expected)?;
        let right = self.expr(&node.right, Some(&left_ty))?;

        // User-defined classes implementing __add__/__sub__ take the
        // operator; the result is the class type.
        if let MysType::Named(class_name) = &left_ty {
            if matches!(node.op, py::Operator::Add | py::Operator::Sub) {
                if let Some(class) = self.ctx.class_def(class_name) {
                    let method = if matches!(node.op, py::Operator::Add) {
                        "__add__"
                    } else {
                        "__sub__"
                    };

                    if class.methods.contains_key(method) {
                        self.check_types(&left_ty, &right, node.right.as_ref())?;

                        return Ok(TypedFragment::new(
                            format!("{left}->{method}({})", right.code),
                            left_ty,
                        ));
                    }
                }
            }
        }

        let string_concat =
            left_ty == MysType::String && matches!(node.op, py::Operator::Add);
        let bitwise = matches!(
            node.op,
            py::Operator::BitAnd
                | py::Operator::BitOr
                | py::Operator::BitXor
                | py::Operator::LShift
                | py::Operator::RShift
        );

        if !string_concat && !left_ty.is_numeric() {
            return Err(self.compile_error(
                format!(
                    "types '{left_ty}' and '{}' differ",
                    right.type_name()
                ),
                node,
            ));
        }

        if bitwise && !left_ty.is_integer() {
            return Err(self.compile_error(
                format!("'{left_ty}' is not an integer type"),
                node,
            ));
        }

        self.check_types(&left_ty, &right, node.right.as_ref())?;

        Ok(TypedFragment::new(
            format!("({left} {op} {})", right.code),
            left_ty,
        ))
    }

    fn unaryop(
        &mut self,
        node: &py::ExprUnaryOp,
        expected: Option<&MysType>,
    ) -> Result<TypedFragment> {
        match node.op {
            py::UnaryOp::USub | py::UnaryOp::UAdd => {
                let symbol = if matches!(node.op, py::UnaryOp::USub) {
                    '-'
                } else {
                    '+'
                };

                let (code, ty) = self.expr_value(&node.operand, expected)?;

                if !ty.is_numeric() {
                    return Err(self.compile_error(
                        format!("unary '{symbol}' can only operate on numbers"),
                        node,
                    ));
                }

                Ok(TypedFragment::new(format!("{symbol}({code})"), ty))
            }
            py::UnaryOp::Not => {
                let fragment = self.expr(&node.operand, Some(&MysType::Bool))?;
                self.check_types(&MysType::Bool, &fragment, node.operand.as_ref())?;

                Ok(TypedFragment::new(
                    format!("!({})", fragment.code),
                    MysType::Bool,
                ))
            }
            py::UnaryOp::Invert => {
                let (code, ty) = self.expr_value(&node.operand, expected)?;

                if !ty.is_integer() {
                    return Err(self.compile_error(
                        format!("'{ty}' is not an integer type"),
                        node,
                    ));
                }

                Ok(TypedFragment::new(format!("~({code})"), ty))
            }
        }
    }

    fn boolop(&mut self, node: &py::ExprBoolOp) -> Result<TypedFragment> {
        let symbol = if matches!(node.op, py::BoolOp::And) {
            "&&"
        } else {
            "||"
        };

        let mut parts = Vec::new();

        for value in &node.values {
            let fragment = self.expr(value, Some(&MysType::Bool))?;
            self.check_types(&MysType::Bool, &fragment, value)?;
            parts.push(fragment.code);
        }

        Ok(TypedFragment::new(
            format!("({})", parts.join(&format!(" {symbol} "))),
            MysType::Bool,
        ))
    }

    fn compare(&mut self, node: &py::ExprCompare) -> Result<TypedFragment> {
        let ([op], [comparator]) = (node.ops.as_slice(), node.comparators.as_slice()) else {
            return Err(self.language_error("chained comparisons are not supported", node));
        };

        if matches!(op, py::CmpOp::In | py::CmpOp::NotIn) {
            return self.membership(node, op, comparator);
        }

        let symbol = match op {
            py::CmpOp::Eq => "==",
            py::CmpOp::NotEq => "!=",
            py::CmpOp::Lt => "<",
            py::CmpOp::LtE => "<=",
            py::CmpOp::Gt => ">",
            py::CmpOp::GtE => ">=",
            _ => return Err(self.language_error("unsupported comparison", node)),
        };

        let (left, left_ty) = self.expr_value(&node.left, None)?;
        let right = self.expr(comparator, Some(&left_ty))?;
        self.check_types(&left_ty, &right, comparator)?;

        Ok(TypedFragment::new(
            format!("Bool({left} {symbol} {})", right.code),
            MysType::Bool,
        ))
    }

    fn membership(
        &mut self,
        node: &py::ExprCompare,
        op: &py::CmpOp,
        comparator: &py::Expr,
    ) -> Result<TypedFragment> {
        let (container, container_ty) = self.expr_value(comparator, None)?;

        let item_ty = match &container_ty {
            MysType::List(item) | MysType::Set(item) => item.as_ref().clone(),
            MysType::Dict(key, _) => key.as_ref().clone(),
            _ => {
                return Err(self.compile_error(
                    format!("'{container_ty}' is not a container"),
                    comparator,
                ));
            }
        };

        let item = self.expr(&node.left, Some(&item_ty))?;
        self.check_types(&item_ty, &item, node.left.as_ref())?;

        let code = if matches!(op, py::CmpOp::In) {
            format!("Bool({container}->contains({}))", item.code)
        } else {
            format!("Bool(!{container}->contains({}))", item.code)
        };

        Ok(TypedFragment::new(code, MysType::Bool))
    }

    fn call(&mut self, node: &py::ExprCall, expected: Option<&MysType>) -> Result<TypedFragment> {
        match node.func.as_ref() {
            py::Expr::Name(func) => match func.id.as_str() {
                "print" => self.print_call(node),
                "len" => self.len_call(node),
                "str" => self.str_call(node),
                name => self.named_call(name, node, expected),
            },
            py::Expr::Attribute(attribute) => self.method_call(attribute, node),
            py::Expr::Lambda(lambda) => {
                Err(self.compile_error("lambda functions are not supported", lambda))
            }
            other => Err(self.compile_error("syntax error", other)),
        }
    }

    /// The printing built-in takes any positional values and keyword
    /// arguments only from the closed set `{end, flush}`.
    fn print_call(&mut self, node: &py::ExprCall) -> Result<TypedFragment> {
        let mut pieces = Vec::new();

        for (i, arg) in node.args.iter().enumerate() {
            let (code, _) = self.expr_value(arg, None)?;

            if i > 0 {
                pieces.push("\" \"".to_string());
            }

            pieces.push(code);
        }

        let mut end = "\"\\n\"".to_string();
        let mut flush = false;

        for keyword in &node.keywords {
            let Some(arg) = &keyword.arg else {
                return Err(self.compile_error("syntax error", keyword));
            };

            match arg.as_str() {
                "end" => {
                    let fragment = self.expr(&keyword.value, Some(&MysType::String))?;
                    self.check_types(&MysType::String, &fragment, &keyword.value)?;
                    end = fragment.code;
                }
                "flush" => {
                    let fragment = self.expr(&keyword.value, Some(&MysType::Bool))?;
                    self.check_types(&MysType::Bool, &fragment, &keyword.value)?;
                    flush = true;
                }
                name => {
                    return Err(self.compile_error(
                        format!(
                            "invalid keyword argument '{name}' to print(), only 'end' and \
                             'flush' are allowed"
                        ),
                        keyword,
                    ));
                }
            }
        }

        let mut code = "std::cout".to_string();

        for piece in &pieces {
            code.push_str(&format!(" << {piece}"));
        }

        code.push_str(&format!(" << {end}"));

        if flush {
            code.push_str(" << std::flush");
        }

        Ok(TypedFragment::valueless(code))
    }

    fn len_call(&mut self, node: &py::ExprCall) -> Result<TypedFragment> {
        let [arg] = node.args.as_slice() else {
            return Err(self.compile_error(
                format!("expected 1 parameters, got {}", node.args.len()),
                node,
            ));
        };

        let (code, ty) = self.expr_value(arg, None)?;

        match ty {
            MysType::String
            | MysType::Bytes
            | MysType::List(_)
            | MysType::Set(_)
            | MysType::Dict(_, _) => Ok(TypedFragment::new(format!("len({code})"), MysType::I64)),
            _ => Err(self.compile_error(format!("'{ty}' has no length"), arg)),
        }
    }

    fn str_call(&mut self, node: &py::ExprCall) -> Result<TypedFragment> {
        let [arg] = node.args.as_slice() else {
            return Err(self.compile_error(
                format!("expected 1 parameters, got {}", node.args.len()),
                node,
            ));
        };

        let (code, _) = self.expr_value(arg, None)?;

        Ok(TypedFragment::new(format!("str({code})"), MysType::String))
    }

    fn named_call(
        &mut self,
        name: &str,
        node: &py::ExprCall,
        _expected: Option<&MysType>,
    ) -> Result<TypedFragment> {
        enum Callee<'m> {
            Function(String, &'m [FunctionDef]),
            Class(String, &'m crate::definitions::ClassDef),
            NotCallable,
            Undefined,
        }

        let callee = match self.ctx.lookup(name) {
            Some(Binding::Function { fqn, overloads }) => {
                Callee::Function(fqn.clone(), *overloads)
            }
            Some(Binding::Class { fqn, def }) => Callee::Class(fqn.clone(), *def),
            Some(_) => Callee::NotCallable,
            None => Callee::Undefined,
        };

        match callee {
            Callee::Function(fqn, overloads) => {
                let (function, args) = self.resolve_call(name, overloads, node, &fqn, None)?;

                let code = format!("{}({})", self.code_name(&fqn), args.join(", "));

                Ok(TypedFragment {
                    code,
                    ty: function.returns.clone(),
                })
            }
            Callee::Class(fqn, def) => {
                let args = self.constructor_args(def, node)?;

                Ok(TypedFragment::new(
                    format!(
                        "std::make_shared<{}>({})",
                        self.code_name(&fqn),
                        args.join(", ")
                    ),
                    MysType::Named(name.to_string()),
                ))
            }
            Callee::NotCallable => {
                Err(self.compile_error(format!("'{name}' is not callable"), node))
            }
            Callee::Undefined => {
                Err(self.compile_error(format!("undefined variable '{name}'"), node))
            }
        }
    }

    /// Constructor arguments are the public members in declaration order.
    fn constructor_args(
        &mut self,
        class: &crate::definitions::ClassDef,
        node: &py::ExprCall,
    ) -> Result<Vec<String>> {
        let members: Vec<_> = class.public_members().collect();
        let got = node.args.len() + node.keywords.len();

        if got > members.len() {
            return Err(self.compile_error(
                format!("expected {} parameters, got {got}", members.len()),
                node,
            ));
        }

        let mut args: Vec<Option<String>> = vec![None; members.len()];

        for (i, arg) in node.args.iter().enumerate() {
            let ty = members[i].ty.clone();
            let fragment = self.expr(arg, Some(&ty))?;
            self.check_types(&ty, &fragment, arg)?;
            args[i] = Some(fragment.code);
        }

        for keyword in &node.keywords {
            let Some(arg_name) = &keyword.arg else {
                return Err(self.compile_error("syntax error", keyword));
            };

            let Some(position) = members.iter().position(|m| m.name == arg_name.as_str()) else {
                return Err(self.compile_error(
                    format!("invalid keyword argument '{arg_name}'"),
                    keyword,
                ));
            };

            let ty = members[position].ty.clone();
            let fragment = self.expr(&keyword.value, Some(&ty))?;
            self.check_types(&ty, &fragment, &keyword.value)?;
            args[position] = Some(fragment.code);
        }

        if args.iter().any(Option::is_none) {
            return Err(self.compile_error(
                format!("expected {} parameters, got {got}", members.len()),
                node,
            ));
        }

        Ok(args.into_iter().flatten().collect())
    }

    /// Select the overload whose parameters unify with the call's
    /// arguments and render the argument list, filling omitted defaulted
    /// parameters with calls to their hoisted defaulting functions.
    ///
    /// `method_owner` carries the owning class's qualified name for
    /// method calls; it shapes the defaulting function's name.
    fn resolve_call(
        &mut self,
        name: &str,
        overloads: &'a [FunctionDef],
        node: &py::ExprCall,
        fqn: &str,
        method_owner: Option<&str>,
    ) -> Result<(&'a FunctionDef, Vec<String>)> {
        debug_assert!(!overloads.is_empty(), "overload sets are never empty");

        if overloads.len() == 1 {
            let function = &overloads[0];
            let args = self.check_call_args(&function.params, node, fqn, method_owner, function)?;
            return Ok((function, args));
        }

        // Neutral evaluation picks the overload; declaration order is
        // precedence.
        let mut neutral = Vec::new();

        for arg in &node.args {
            neutral.push(self.expr(arg, None)?);
        }

        for function in overloads {
            if function.params.len() != node.args.len() + node.keywords.len() {
                continue;
            }

            let matches = neutral
                .iter()
                .zip(function.params.iter())
                .all(|(fragment, param)| self.types_unify(&param.param.ty, fragment.ty.as_ref()));

            if matches {
                let args =
                    self.check_call_args(&function.params, node, fqn, method_owner, function)?;
                return Ok((function, args));
            }
        }

        Err(self.compile_error(format!("no matching overload of '{name}'"), node))
    }

    fn check_call_args(
        &mut self,
        params: &[ParamWithDefault],
        node: &py::ExprCall,
        fqn: &str,
        method_owner: Option<&str>,
        function: &FunctionDef,
    ) -> Result<Vec<String>> {
        let got = node.args.len() + node.keywords.len();

        if got > params.len() {
            return Err(self.compile_error(
                format!("expected {} parameters, got {got}", params.len()),
                node,
            ));
        }

        let mut args: Vec<Option<String>> = vec![None; params.len()];

        for (i, arg) in node.args.iter().enumerate() {
            let ty = params[i].param.ty.clone();
            let fragment = self.expr(arg, Some(&ty))?;
            self.check_types(&ty, &fragment, arg)?;
            args[i] = Some(fragment.code);
        }

        for keyword in &node.keywords {
            let Some(arg_name) = &keyword.arg else {
                return Err(self.compile_error("syntax error", keyword));
            };

            let Some(position) = params
                .iter()
                .position(|p| p.param.name == arg_name.as_str())
            else {
                return Err(self.compile_error(
                    format!("invalid keyword argument '{arg_name}'"),
                    keyword,
                ));
            };

            let ty = params[position].param.ty.clone();
            let fragment = self.expr(&keyword.value, Some(&ty))?;
            self.check_types(&ty, &fragment, &keyword.value)?;
            args[position] = Some(fragment.code);
        }

        for (i, slot) in args.iter_mut().enumerate() {
            if slot.is_some() {
                continue;
            }

            if params[i].default.is_none() {
                return Err(self.compile_error(
                    format!("expected {} parameters, got {got}", params.len()),
                    node,
                ));
            }

            *slot = Some(self.default_call(fqn, method_owner, function, &params[i].param.name));
        }

        Ok(args.into_iter().flatten().collect())
    }

    /// The call invoking a hoisted default-argument function.
    fn default_call(
        &self,
        fqn: &str,
        method_owner: Option<&str>,
        function: &FunctionDef,
        param: &str,
    ) -> String {
        match method_owner {
            Some(owner_fqn) => {
                let (module, class_name) = owner_fqn
                    .rsplit_once('.')
                    .unwrap_or(("", owner_fqn));
                let method_name = if function.name == "__init__" {
                    class_name
                } else {
                    function.name.as_str()
                };
                let dotted =
                    format!("{module}.{class_name}_{method_name}_{param}_default");

                format!("{}()", self.code_name(&dotted))
            }
            None => {
                let dotted = format!("{fqn}_{param}_default");

                format!("{}()", self.code_name(&dotted))
            }
        }
    }

    fn method_call(
        &mut self,
        attribute: &py::ExprAttribute,
        node: &py::ExprCall,
    ) -> Result<TypedFragment> {
        let (receiver, receiver_ty) = self.expr_value(&attribute.value, None)?;
        let method = attribute.attr.as_str();

        match &receiver_ty {
            MysType::String => self.string_method_call(&receiver, method, node),
            MysType::List(item) => {
                self.list_method_call(&receiver, item.as_ref().clone(), method, node)
            }
            MysType::Named(type_name) => {
                let type_name = type_name.clone();

                if let Some(class) = self.ctx.class_def(&type_name) {
                    let Some(overloads) = class.methods.get(method) else {
                        return Err(self.compile_error(
                            format!("'{type_name}' has no member '{method}'"),
                            node,
                        ));
                    };

                    let owner_fqn = match self.ctx.lookup(&type_name) {
                        Some(Binding::Class { fqn, .. }) => fqn.clone(),
                        _ => self.ctx.make_full_name(&type_name),
                    };

                    let (function, args) =
                        self.resolve_call(method, overloads, node, &owner_fqn, Some(&owner_fqn))?;

                    return Ok(TypedFragment {
                        code: format!("{receiver}->{method}({})", args.join(", ")),
                        ty: function.returns.clone(),
                    });
                }

                if let Some(trait_def) = self.ctx.trait_def(&type_name) {
                    let Some(overloads) = trait_def.methods.get(method) else {
                        return Err(self.compile_error(
                            format!("'{type_name}' has no member '{method}'"),
                            node,
                        ));
                    };

                    let owner_fqn = match self.ctx.lookup(&type_name) {
                        Some(Binding::Trait { fqn, .. }) => fqn.clone(),
                        _ => self.ctx.make_full_name(&type_name),
                    };

                    let (function, args) =
                        self.resolve_call(method, overloads, node, &owner_fqn, Some(&owner_fqn))?;

                    return Ok(TypedFragment {
                        code: format!("{receiver}->{method}({})", args.join(", ")),
                        ty: function.returns.clone(),
                    });
                }

                Err(self.compile_error(
                    format!("'{type_name}' has no member '{method}'"),
                    node,
                ))
            }
            other => Err(self.compile_error(
                format!("'{other}' has no member '{method}'"),
                node,
            )),
        }
    }

    fn string_method_call(
        &mut self,
        receiver: &str,
        method: &str,
        node: &py::ExprCall,
    ) -> Result<TypedFragment> {
        let Some((_, param_types, returns)) = STRING_METHODS
            .iter()
            .find(|(name, _, _)| *name == method)
        else {
            return Err(self.compile_error("string method not implemented", node));
        };

        if node.args.len() != param_types.len() || !node.keywords.is_empty() {
            return Err(self.compile_error(
                format!(
                    "expected {} parameters, got {}",
                    param_types.len(),
                    node.args.len() + node.keywords.len()
                ),
                node,
            ));
        }

        let mut args = Vec::new();

        for (arg, ty) in node.args.iter().zip(param_types.iter()) {
            let fragment = self.expr(arg, Some(ty))?;
            self.check_types(ty, &fragment, arg)?;
            args.push(fragment.code);
        }

        Ok(TypedFragment {
            code: format!("{receiver}.{method}({})", args.join(", ")),
            ty: returns.clone(),
        })
    }

    fn list_method_call(
        &mut self,
        receiver: &str,
        item_ty: MysType,
        method: &str,
        node: &py::ExprCall,
    ) -> Result<TypedFragment> {
        match method {
            "append" => {
                let [arg] = node.args.as_slice() else {
                    return Err(self.compile_error(
                        format!("expected 1 parameters, got {}", node.args.len()),
                        node,
                    ));
                };

                let fragment = self.expr(arg, Some(&item_ty))?;
                self.check_types(&item_ty, &fragment, arg)?;

                Ok(TypedFragment::valueless(format!(
                    "{receiver}->append({})",
                    fragment.code
                )))
            }
            "pop" => {
                if !node.args.is_empty() {
                    return Err(self.compile_error(
                        format!("expected 0 parameters, got {}", node.args.len()),
                        node,
                    ));
                }

                Ok(TypedFragment::new(format!("{receiver}->pop()"), item_ty))
            }
            _ => Err(self.compile_error(
                format!("'[{item_ty}]' has no member '{method}'"),
                node,
            )),
        }
    }

    pub(crate) fn attribute(&mut self, node: &py::ExprAttribute) -> Result<TypedFragment> {
        let member = node.attr.as_str();

        // Enum member access spells the C++ scoped enumerator.
        if let py::Expr::Name(name) = node.value.as_ref() {
            if let Some(Binding::Enum { fqn, def }) = self.ctx.lookup(name.id.as_str()) {
                let fqn = fqn.clone();

                if !def.members.iter().any(|(m, _)| m == member) {
                    return Err(self.compile_error(
                        format!("'{}' has no member '{member}'", name.id),
                        node,
                    ));
                }

                return Ok(TypedFragment::new(
                    format!("{}::{member}", self.code_name(&fqn)),
                    MysType::Named(name.id.to_string()),
                ));
            }
        }

        let (receiver, receiver_ty) = self.expr_value(&node.value, None)?;

        match &receiver_ty {
            MysType::Named(type_name) => {
                if let Some(class) = self.ctx.class_def(type_name) {
                    if let Some(found) = class.members.get(member) {
                        return Ok(TypedFragment::new(
                            format!("{receiver}->{member}"),
                            found.ty.clone(),
                        ));
                    }
                }

                Err(self.compile_error(
                    format!("'{type_name}' has no member '{member}'"),
                    node,
                ))
            }
            other => Err(self.compile_error(
                format!("'{other}' has no member '{member}'"),
                node,
            )),
        }
    }

    fn subscript(&mut self, node: &py::ExprSubscript) -> Result<TypedFragment> {
        let (base, base_ty) = self.expr_value(&node.value, None)?;

        match base_ty {
            MysType::List(item) => {
                let index = self.expr(&node.slice, Some(&MysType::I64))?;
                self.check_integer(&index, node.slice.as_ref())?;

                Ok(TypedFragment::new(
                    format!("{base}->get({})", index.code),
                    *item,
                ))
            }
            MysType::Dict(key, value) => {
                let index = self.expr(&node.slice, Some(&*key))?;
                self.check_types(&key, &index, node.slice.as_ref())?;

                Ok(TypedFragment::new(
                    format!("{base}->get({})", index.code),
                    *value,
                ))
            }
            MysType::Tuple(items) => {
                let py::Expr::Constant(py::ExprConstant {
                    value: py::Constant::Int(position),
                    ..
                }) = node.slice.as_ref()
                else {
                    return Err(self.compile_error(
                        "tuple indexes must be integer literals",
                        node.slice.as_ref(),
                    ));
                };

                let position: usize = position.try_into().map_err(|_| {
                    self.compile_error("tuple index out of range", node.slice.as_ref())
                })?;

                let Some(item) = items.get(position) else {
                    return Err(
                        self.compile_error("tuple index out of range", node.slice.as_ref())
                    );
                };

                Ok(TypedFragment::new(
                    format!("std::get<{position}>(*{base})"),
                    item.clone(),
                ))
            }
            other => Err(self.compile_error(
                format!("'{other}' is not subscriptable"),
                node,
            )),
        }
    }

    fn list_literal(
        &mut self,
        node: &py::ExprList,
        expected: Option<&MysType>,
    ) -> Result<TypedFragment> {
        let item_ty = match expected {
            Some(MysType::List(item)) => Some(item.as_ref().clone()),
            _ => None,
        };

        let mut items = Vec::new();
        let mut inferred = item_ty.clone();

        for element in &node.elts {
            let fragment = self.expr(element, inferred.as_ref())?;

            match &inferred {
                Some(ty) => self.check_types(ty, &fragment, element)?,
                None => inferred = fragment.ty.clone(),
            }

            items.push(fragment.code);
        }

        let Some(item) = inferred else {
            return Err(self.compile_error("cannot infer type of empty list", node));
        };

        let cpp_item = cpp_type(&item, &self.ctx);

        Ok(TypedFragment::new(
            format!(
                "std::make_shared<List<{cpp_item}>>(std::initializer_list<{cpp_item}>{{{}}})",
                items.join(", ")
            ),
            MysType::List(Box::new(item)),
        ))
    }

    fn set_literal(
        &mut self,
        node: &py::ExprSet,
        expected: Option<&MysType>,
    ) -> Result<TypedFragment> {
        let mut inferred = match expected {
            Some(MysType::Set(item)) => Some(item.as_ref().clone()),
            _ => None,
        };

        let mut items = Vec::new();

        for element in &node.elts {
            let fragment = self.expr(element, inferred.as_ref())?;

            match &inferred {
                Some(ty) => self.check_types(ty, &fragment, element)?,
                None => inferred = fragment.ty.clone(),
            }

            items.push(fragment.code);
        }

        let Some(item) = inferred else {
            return Err(self.compile_error("cannot infer type of empty set", node));
        };

        let cpp_item = cpp_type(&item, &self.ctx);

        Ok(TypedFragment::new(
            format!(
                "std::make_shared<Set<{cpp_item}>>(std::initializer_list<{cpp_item}>{{{}}})",
                items.join(", ")
            ),
            MysType::Set(Box::new(item)),
        ))
    }

    fn dict_literal(
        &mut self,
        node: &py::ExprDict,
        expected: Option<&MysType>,
    ) -> Result<TypedFragment> {
        let (mut key_ty, mut value_ty) = match expected {
            Some(MysType::Dict(key, value)) => {
                (Some(key.as_ref().clone()), Some(value.as_ref().clone()))
            }
            _ => (None, None),
        };

        let mut items = Vec::new();

        for (key, value) in node.keys.iter().zip(node.values.iter()) {
            let Some(key) = key else {
                return Err(self.compile_error("syntax error", node));
            };

            let key_fragment = self.expr(key, key_ty.as_ref())?;

            match &key_ty {
                Some(ty) => self.check_types(ty, &key_fragment, key)?,
                None => key_ty = key_fragment.ty.clone(),
            }

            let value_fragment = self.expr(value, value_ty.as_ref())?;

            match &value_ty {
                Some(ty) => self.check_types(ty, &value_fragment, value)?,
                None => value_ty = value_fragment.ty.clone(),
            }

            items.push(format!("{{{}, {}}}", key_fragment.code, value_fragment.code));
        }

        let (Some(key), Some(value)) = (key_ty, value_ty) else {
            return Err(self.compile_error("cannot infer type of empty dict", node));
        };

        let cpp_key = cpp_type(&key, &self.ctx);
        let cpp_value = cpp_type(&value, &self.ctx);

        Ok(TypedFragment::new(
            format!(
                "std::make_shared<Dict<{cpp_key}, {cpp_value}>>({{{}}})",
                items.join(", ")
            ),
            MysType::Dict(Box::new(key), Box::new(value)),
        ))
    }

    fn tuple_literal(
        &mut self,
        node: &py::ExprTuple,
        expected: Option<&MysType>,
    ) -> Result<TypedFragment> {
        let expected_items = match expected {
            Some(MysType::Tuple(items)) if items.len() == node.elts.len() => Some(items.clone()),
            _ => None,
        };

        let mut items = Vec::new();
        let mut types = Vec::new();

        for (i, element) in node.elts.iter().enumerate() {
            let expected_item = expected_items.as_ref().map(|items| &items[i]);
            let fragment = self.expr(element, expected_item)?;

            if let Some(ty) = expected_item {
                self.check_types(ty, &fragment, element)?;
                types.push(ty.clone());
            } else {
                let Some(ty) = fragment.ty.clone() else {
                    return Err(self.compile_error("expression does not produce a value", element));
                };
                types.push(ty);
            }

            items.push(fragment.code);
        }

        let cpp_items = types
            .iter()
            .map(|ty| cpp_type(ty, &self.ctx))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(TypedFragment::new(
            format!(
                "std::make_shared<Tuple<{cpp_items}>>({})",
                items.join(", ")
            ),
            MysType::Tuple(types),
        ))
    }

    /// Format strings lower to runtime string concatenation; names inside
    /// placeholders resolve through the ordinary lookup and fail the same
    /// way.
    fn joined_str(&mut self, node: &py::ExprJoinedStr) -> Result<TypedFragment> {
        let mut pieces = Vec::new();

        for value in &node.values {
            match value {
                py::Expr::Constant(py::ExprConstant {
                    value: py::Constant::Str(text),
                    ..
                }) => {
                    pieces.push(format!("String(\"{}\")", escape(text)));
                }
                py::Expr::FormattedValue(formatted) => {
                    let (code, _) = self.expr_value(&formatted.value, None)?;
                    pieces.push(format!("str({code})"));
                }
                other => return Err(self.compile_error("syntax error", other)),
            }
        }

        if pieces.is_empty() {
            pieces.push("String(\"\")".to_string());
        }

        Ok(TypedFragment::new(pieces.join(" + "), MysType::String))
    }
}

/// Escape a literal for emission inside a C++ string or char literal.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(ch),
        }
    }

    escaped
}
