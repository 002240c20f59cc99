//! Match-statement lowering.
//!
//! A `match` lowers to a chain of conditionals nested by `else`, so an
//! earlier arm short-circuits the remainder. Literal patterns become
//! equality tests; class patterns under a trait-typed subject become
//! downcast attempts, with any `as` binding scoped to its arm.

use crate::ast::py;
use crate::error::Result;
use crate::stmt::{indent_lines, Lowerer};
use crate::types::MysType;

enum Arm<'n> {
    Literal(&'n py::Expr),
    Class {
        class_name: String,
        binding: Option<String>,
    },
    Capture(String),
    Wildcard,
}

impl<'a> Lowerer<'a> {
    pub(crate) fn match_stmt(&mut self, node: &py::StmtMatch) -> Result<Vec<String>> {
        let (subject_code, subject_ty) = self.expr_value(&node.subject, None)?;

        // The subject is evaluated exactly once; a non-name subject is
        // cached in a fresh temporary.
        let (subject, prologue) = if matches!(node.subject.as_ref(), py::Expr::Name(_)) {
            (subject_code, None)
        } else {
            let temp = self.fresh_temp("match_subject");
            let prologue = format!("auto {temp} = {subject_code};");
            (temp, Some(prologue))
        };

        let arms = self.lower_arms(&node.cases, &subject, &subject_ty)?;

        match prologue {
            Some(prologue) => {
                let mut lines = vec!["{".to_string(), format!("    {prologue}")];
                lines.extend(indent_lines(arms));
                lines.push("}".to_string());
                Ok(lines)
            }
            None => Ok(arms),
        }
    }

    /// Lower `cases[0]` and nest the remaining arms in its `else`.
    fn lower_arms(
        &mut self,
        cases: &[py::MatchCase],
        subject: &str,
        subject_ty: &MysType,
    ) -> Result<Vec<String>> {
        let [case, rest @ ..] = cases else {
            return Ok(Vec::new());
        };

        if case.guard.is_some() {
            return Err(self.language_error("match guards are not supported", &case.pattern));
        }

        let pattern_span = self.index.span(&case.pattern);
        let arm = self.classify_pattern(&case.pattern, subject_ty)?;

        match arm {
            Arm::Literal(value) => {
                let literal = self.expr(value, Some(subject_ty))?;
                self.check_types(subject_ty, &literal, value)?;

                self.ctx.push();
                let body = self.lower_body(&case.body, false)?;
                self.ctx.pop();

                let mut lines = vec![format!("if ({subject} == {}) {{", literal.code)];
                lines.extend(indent_lines(body));
                lines.extend(self.else_chain(rest, subject, subject_ty)?);

                Ok(lines)
            }
            Arm::Class {
                class_name,
                binding,
            } => {
                let var = binding
                    .clone()
                    .unwrap_or_else(|| self.fresh_temp("match"));
                let class_code = match self.ctx.lookup(&class_name) {
                    Some(crate::context::Binding::Class { fqn, .. }) => {
                        let fqn = fqn.clone();
                        self.code_name(&fqn)
                    }
                    _ => class_name.clone(),
                };

                self.ctx.push();

                if let Some(binding) = &binding {
                    self.ctx.define_local(
                        binding,
                        MysType::Named(class_name.clone()),
                        pattern_span,
                    )?;
                }

                let body = self.lower_body(&case.body, false)?;
                self.ctx.pop();

                let mut lines = vec![format!(
                    "auto {var} = std::dynamic_pointer_cast<{class_code}>({subject});"
                )];
                lines.push(format!("if ({var}) {{"));
                lines.extend(indent_lines(body));
                lines.extend(self.else_chain(rest, subject, subject_ty)?);

                Ok(lines)
            }
            Arm::Capture(name) => {
                self.ctx.push();
                self.ctx
                    .define_local(&name, subject_ty.clone(), pattern_span)?;
                let body = self.lower_body(&case.body, false)?;
                self.ctx.pop();

                let mut lines = vec![format!("auto {name} = {subject};")];
                lines.extend(body);

                Ok(lines)
            }
            Arm::Wildcard => {
                self.ctx.push();
                let body = self.lower_body(&case.body, false)?;
                self.ctx.pop();

                Ok(body)
            }
        }
    }

    /// Close the current arm's block and nest the remaining arms.
    fn else_chain(
        &mut self,
        rest: &[py::MatchCase],
        subject: &str,
        subject_ty: &MysType,
    ) -> Result<Vec<String>> {
        if rest.is_empty() {
            return Ok(vec!["}".to_string()]);
        }

        let mut lines = vec!["} else {".to_string()];
        lines.extend(indent_lines(self.lower_arms(rest, subject, subject_ty)?));
        lines.push("}".to_string());

        Ok(lines)
    }

    fn classify_pattern<'n>(
        &mut self,
        pattern: &'n py::Pattern,
        subject_ty: &MysType,
    ) -> Result<Arm<'n>> {
        match pattern {
            py::Pattern::MatchValue(value) => Ok(Arm::Literal(value.value.as_ref())),
            py::Pattern::MatchClass(class) => Ok(Arm::Class {
                class_name: self.match_class_name(class, subject_ty)?,
                binding: None,
            }),
            py::Pattern::MatchAs(as_pattern) => match (&as_pattern.pattern, &as_pattern.name) {
                (None, None) => Ok(Arm::Wildcard),
                (None, Some(name)) => Ok(Arm::Capture(name.to_string())),
                (Some(inner), Some(name)) => {
                    let py::Pattern::MatchClass(class) = inner.as_ref() else {
                        return Err(
                            self.language_error("unsupported match pattern", as_pattern)
                        );
                    };

                    Ok(Arm::Class {
                        class_name: self.match_class_name(class, subject_ty)?,
                        binding: Some(name.to_string()),
                    })
                }
                (Some(_), None) => {
                    Err(self.language_error("unsupported match pattern", as_pattern))
                }
            },
            other => Err(self.language_error("unsupported match pattern", other)),
        }
    }

    fn match_class_name(
        &mut self,
        class: &py::PatternMatchClass,
        subject_ty: &MysType,
    ) -> Result<String> {
        if !class.patterns.is_empty() || !class.kwd_patterns.is_empty() {
            return Err(self.language_error(
                "class patterns with arguments are not supported",
                class,
            ));
        }

        let py::Expr::Name(name) = class.cls.as_ref() else {
            return Err(self.compile_error("syntax error", class.cls.as_ref()));
        };

        if !matches!(subject_ty, MysType::Named(_)) {
            return Err(self.compile_error(
                format!("cannot match classes against '{subject_ty}'"),
                class,
            ));
        }

        if self.ctx.class_def(name.id.as_str()).is_none() {
            return Err(self.compile_error(
                format!("undefined type '{}'", name.id),
                class.cls.as_ref(),
            ));
        }

        Ok(name.id.to_string())
    }
}
