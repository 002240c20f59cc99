//! Class, trait and enum emission.
//!
//! After a class's methods are lowered, the specials it lacks are
//! synthesized: a constructor taking the public members in declaration
//! order, an empty destructor, a string conversion delegating to the
//! format method, and the format method itself (always emitted, it backs
//! diagnostic printing even when `__str__` is user-provided).

use tracing::trace;

use crate::definitions::{ClassDef, EnumDef, FunctionDef};
use crate::error::{Error, Result};
use crate::stmt::{indent_lines, Lowerer};
use crate::types::{cpp_param_type, cpp_return_type, cpp_type, default_value, MysType};

/// The synthesized constructor: public members become positional
/// parameters in declaration order; private members take their type's
/// zero value.
fn create_class_init(class_name: &str, members: &[(String, String, bool, &'static str)]) -> Vec<String> {
    let mut params = Vec::new();
    let mut body = Vec::new();

    for (name, param_type, is_private, zero) in members {
        if *is_private {
            body.push(format!("this->{name} = {zero};"));
        } else {
            params.push(format!("{param_type} {name}"));
            body.push(format!("this->{name} = {name};"));
        }
    }

    let mut code = vec![
        format!("{class_name}::{class_name}({})", params.join(", ")),
        "{".to_string(),
    ];
    code.extend(indent_lines(body));
    code.push("}".to_string());

    code
}

fn create_class_del(class_name: &str) -> Vec<String> {
    vec![
        format!("{class_name}::~{class_name}()"),
        "{".to_string(),
        "}".to_string(),
    ]
}

fn create_class_str(class_name: &str) -> Vec<String> {
    vec![
        format!("String {class_name}::__str__() const"),
        "{".to_string(),
        "    std::stringstream ss;".to_string(),
        "    __format__(ss);".to_string(),
        "    return String(ss.str().c_str());".to_string(),
        "}".to_string(),
    ]
}

fn create_class_format(class_name: &str, member_names: &[String]) -> Vec<String> {
    let mut code = vec![
        format!("void {class_name}::__format__(std::ostream& os) const"),
        "{".to_string(),
        format!("    os << \"{class_name}(\";"),
    ];

    for (i, name) in member_names.iter().enumerate() {
        if i + 1 < member_names.len() {
            code.push(format!("    os << \"{name}=\" << this->{name} << \", \";"));
        } else {
            code.push(format!("    os << \"{name}=\" << this->{name};"));
        }
    }

    code.push("    os << \")\";".to_string());
    code.push("}".to_string());

    code
}

impl<'a> Lowerer<'a> {
    /// Emit a scoped enumeration and its from-value conversion. The
    /// conversion raises the runtime's ValueError on unrecognized input.
    pub fn lower_enum(&self, def: &EnumDef) -> Vec<String> {
        let underlying = def.ty.to_string();
        let mut code = vec![format!("enum class {} : {underlying} {{", def.name)];

        for (name, value) in &def.members {
            code.push(format!("    {name} = {value},"));
        }

        code.push("};".to_string());
        code.push(format!(
            "{underlying} enum_{}_from_value({underlying} value)",
            def.name
        ));
        code.push("{".to_string());
        code.push("    switch (value) {".to_string());

        for (name, value) in &def.members {
            code.push(format!("    case {value}:"));
            code.push(format!("        return ({underlying}){}::{name};", def.name));
        }

        code.push("    default:".to_string());
        code.push("        throw ValueError(\"bad enum value\");".to_string());
        code.push("    }".to_string());
        code.push("}".to_string());

        code
    }

    /// Hoist a function's default-argument expressions into named
    /// nullary functions, one per defaulted parameter.
    pub fn lower_function_defaults(&mut self, function: &FunctionDef) -> Result<Vec<String>> {
        let mut code = Vec::new();

        for param in &function.params {
            let Some(default) = &param.default else {
                continue;
            };

            let ty = &param.param.ty;
            let fragment = self.expr(default, Some(ty))?;
            self.check_types(ty, &fragment, default)?;

            code.push(format!(
                "{} {}_{}_default()",
                cpp_type(ty, &self.ctx),
                function.name,
                param.param.name
            ));
            code.push("{".to_string());
            code.push(format!("    return {};", fragment.code));
            code.push("}".to_string());
        }

        Ok(code)
    }

    fn lower_method_defaults(
        &mut self,
        method: &FunctionDef,
        class_name: &str,
    ) -> Result<Vec<String>> {
        let mut code = Vec::new();

        for param in &method.params {
            let Some(default) = &param.default else {
                continue;
            };

            let ty = &param.param.ty;
            let fragment = self.expr(default, Some(ty))?;
            self.check_types(ty, &fragment, default)?;

            let method_name = if method.name == "__init__" {
                class_name
            } else {
                method.name.as_str()
            };

            code.push(format!(
                "{} {class_name}_{method_name}_{}_default()",
                cpp_type(ty, &self.ctx),
                param.param.name
            ));
            code.push("{".to_string());
            code.push(format!("    return {};", fragment.code));
            code.push("}".to_string());
        }

        Ok(code)
    }

    fn lower_method_definition(
        &mut self,
        class: &'a ClassDef,
        method: &'a FunctionDef,
    ) -> Result<Vec<String>> {
        let class_name = class.name.as_str();

        self.ctx.push();
        self.ctx.define_local(
            "self",
            MysType::Named(class_name.to_string()),
            method.span,
        )?;

        for param in &method.params {
            self.ctx
                .define_local(&param.param.name, param.param.ty.clone(), method.span)?;
        }

        self.ctx.return_type = method.returns.clone();

        let parameters = self.format_parameters(&method.params);
        let signature = match method.name.as_str() {
            "__init__" => format!("{class_name}::{class_name}({parameters})"),
            "__del__" => format!("{class_name}::~{class_name}()"),
            "__str__" => format!("String {class_name}::__str__() const"),
            name => format!(
                "{} {class_name}::{name}({parameters})",
                cpp_return_type(method.returns.as_ref(), &self.ctx)
            ),
        };

        let body = self.lower_body(&method.node.body, true)?;

        self.ctx.pop();
        self.ctx.return_type = None;

        let mut code = vec![signature, "{".to_string()];
        code.extend(indent_lines(body));
        code.push("}".to_string());

        Ok(code)
    }

    /// Lower a class: its methods, then the specials it lacks.
    pub fn lower_class_definition(&mut self, class: &'a ClassDef) -> Result<Vec<String>> {
        trace!(name = %class.name, "lowering class");

        let mut member_names = Vec::new();
        let mut init_members = Vec::new();

        for member in class.members.values() {
            if !self.ctx.is_type_defined(&member.ty) {
                return Err(Error::compile(
                    format!("undefined type '{}'", member.ty),
                    self.index.span(member.node.annotation.as_ref()),
                ));
            }

            member_names.push(member.name.clone());
            init_members.push((
                member.name.clone(),
                cpp_param_type(&member.ty, &self.ctx),
                member.is_private(),
                default_value(&member.ty),
            ));
        }

        let mut body = Vec::new();
        let mut method_names = Vec::new();

        for overloads in class.methods.values() {
            for method in overloads {
                body.extend(self.lower_method_defaults(method, &class.name)?);
                body.extend(self.lower_method_definition(class, method)?);
                method_names.push(method.name.clone());
            }
        }

        if !method_names.iter().any(|name| name == "__init__") {
            body.extend(create_class_init(&class.name, &init_members));
        }

        if !method_names.iter().any(|name| name == "__del__") {
            body.extend(create_class_del(&class.name));
        }

        if !method_names.iter().any(|name| name == "__str__") {
            body.extend(create_class_str(&class.name));
        }

        body.extend(create_class_format(&class.name, &member_names));

        Ok(body)
    }
}
