//! The Mys type model.
//!
//! Types are parsed from annotation expressions in the surface syntax
//! (`i32`, `string`, `[T]`, `{K: V}`, `{T}`, `(A, B)`, class names) and
//! mapped to the C++ runtime's spellings during lowering.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ast::{py, LineIndex};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MysType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Char,
    String,
    Bytes,
    List(Box<MysType>),
    Set(Box<MysType>),
    Dict(Box<MysType>, Box<MysType>),
    Tuple(Vec<MysType>),
    Optional(Box<MysType>),
    /// A class, trait or enum, by local alias or fully qualified dotted name.
    Named(String),
}

impl MysType {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Scalar types are passed by value in parameter position; everything
    /// else takes a const reference.
    pub fn is_scalar(&self) -> bool {
        self.is_numeric() || matches!(self, Self::Bool | Self::Char)
    }

    fn primitive_name(name: &str) -> Option<MysType> {
        Some(match name {
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "bool" => Self::Bool,
            "char" => Self::Char,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            _ => return None,
        })
    }

    /// Parse a type annotation expression.
    ///
    /// The surface forms are a name (`i32`, `Foo`), a dotted name
    /// (`foo.lib.Foo`), a one-element list (`[T]`), a one-entry dict
    /// (`{K: V}`), a one-element set (`{T}`) and a tuple (`(A, B)`).
    pub fn from_annotation(node: &py::Expr, index: &LineIndex) -> Result<MysType> {
        match node {
            py::Expr::Name(name) => Ok(Self::from_name(name.id.as_str())),
            py::Expr::Attribute(_) => Ok(Self::Named(dotted_name(node, index)?)),
            py::Expr::List(list) if list.elts.len() == 1 => Ok(Self::List(Box::new(
                Self::from_annotation(&list.elts[0], index)?,
            ))),
            py::Expr::Dict(dict) if dict.keys.len() == 1 => {
                let Some(key) = &dict.keys[0] else {
                    return Err(Error::compile("invalid type annotation", index.span(dict)));
                };
                Ok(Self::Dict(
                    Box::new(Self::from_annotation(key, index)?),
                    Box::new(Self::from_annotation(&dict.values[0], index)?),
                ))
            }
            py::Expr::Set(set) if set.elts.len() == 1 => Ok(Self::Set(Box::new(
                Self::from_annotation(&set.elts[0], index)?,
            ))),
            py::Expr::Tuple(tuple) => {
                let items = tuple
                    .elts
                    .iter()
                    .map(|item| Self::from_annotation(item, index))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Tuple(items))
            }
            _ => Err(Error::compile("invalid type annotation", index.span(node))),
        }
    }

    pub fn from_name(name: &str) -> MysType {
        Self::primitive_name(name).unwrap_or_else(|| Self::Named(name.to_string()))
    }

    /// `true` when a return annotation means "returns nothing".
    pub fn annotation_is_none(node: &py::Expr) -> bool {
        matches!(
            node,
            py::Expr::Constant(py::ExprConstant {
                value: py::Constant::None,
                ..
            })
        )
    }
}

impl fmt::Display for MysType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::Bool => write!(f, "bool"),
            Self::Char => write!(f, "char"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::List(item) => write!(f, "[{item}]"),
            Self::Set(item) => write!(f, "{{{item}}}"),
            Self::Dict(key, value) => write!(f, "{{{key}: {value}}}"),
            Self::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Self::Optional(inner) => write!(f, "optional {inner}"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Flatten a possibly dotted annotation (`a.b.C`) into its dotted text.
fn dotted_name(node: &py::Expr, index: &LineIndex) -> Result<String> {
    match node {
        py::Expr::Name(name) => Ok(name.id.to_string()),
        py::Expr::Attribute(attr) => Ok(format!(
            "{}.{}",
            dotted_name(&attr.value, index)?,
            attr.attr.as_str()
        )),
        _ => Err(Error::compile("invalid type annotation", index.span(node))),
    }
}

/// Spell a dotted Mys name in the generated C++ (`foo.lib.Foo` becomes
/// `mys::foo::lib::Foo`; plain names stay unqualified within their own
/// namespace).
pub fn cpp_name(name: &str) -> String {
    if name.contains('.') {
        format!("mys::{}", name.replace('.', "::"))
    } else {
        name.to_string()
    }
}

/// The C++ spelling of a Mys type. Classes and traits are shared;
/// enums are scalar enumerations.
pub fn cpp_type(ty: &MysType, ctx: &crate::context::Context<'_>) -> String {
    match ty {
        MysType::I8 => "i8".to_string(),
        MysType::I16 => "i16".to_string(),
        MysType::I32 => "i32".to_string(),
        MysType::I64 => "i64".to_string(),
        MysType::U8 => "u8".to_string(),
        MysType::U16 => "u16".to_string(),
        MysType::U32 => "u32".to_string(),
        MysType::U64 => "u64".to_string(),
        MysType::F32 => "f32".to_string(),
        MysType::F64 => "f64".to_string(),
        MysType::Bool => "Bool".to_string(),
        MysType::Char => "Char".to_string(),
        MysType::String => "String".to_string(),
        MysType::Bytes => "Bytes".to_string(),
        MysType::List(item) => format!("SharedList<{}>", cpp_type(item, ctx)),
        MysType::Set(item) => format!("SharedSet<{}>", cpp_type(item, ctx)),
        MysType::Dict(key, value) => {
            format!("SharedDict<{}, {}>", cpp_type(key, ctx), cpp_type(value, ctx))
        }
        MysType::Tuple(items) => format!(
            "SharedTuple<{}>",
            items
                .iter()
                .map(|item| cpp_type(item, ctx))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        MysType::Optional(inner) => cpp_type(inner, ctx),
        MysType::Named(name) => match ctx.type_kind(name) {
            Some(crate::context::TypeKind::Enum) => cpp_name(name),
            _ => format!("std::shared_ptr<{}>", cpp_name(name)),
        },
    }
}

/// The C++ spelling in parameter position: scalars and enums by value,
/// everything else by const reference.
pub fn cpp_param_type(ty: &MysType, ctx: &crate::context::Context<'_>) -> String {
    let base = cpp_type(ty, ctx);

    let by_value = ty.is_scalar()
        || matches!(
            ty,
            MysType::Named(name)
                if ctx.type_kind(name) == Some(crate::context::TypeKind::Enum)
        );

    if by_value {
        base
    } else {
        format!("const {base}&")
    }
}

/// The C++ return type; a missing return annotation is `void`.
pub fn cpp_return_type(ty: Option<&MysType>, ctx: &crate::context::Context<'_>) -> String {
    match ty {
        Some(ty) => cpp_type(ty, ctx),
        None => "void".to_string(),
    }
}

/// The zero value assigned to private members in synthesized
/// constructors.
pub fn default_value(ty: &MysType) -> &'static str {
    if ty.is_integer() {
        "0"
    } else if ty.is_float() {
        "0.0"
    } else {
        match ty {
            MysType::Bool => "Bool(false)",
            MysType::String => "String()",
            MysType::Char => "Char()",
            _ => "nullptr",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_module;

    fn annotation_of(source: &str) -> MysType {
        let module = parse_module(source, "<test>").unwrap();
        let index = LineIndex::new(source);
        let py::Stmt::AnnAssign(assign) = &module.body[0] else {
            panic!("expected an annotated assignment");
        };
        MysType::from_annotation(&assign.annotation, &index).unwrap()
    }

    #[test]
    fn test_primitive_annotations() {
        assert_eq!(annotation_of("x: i32 = 1"), MysType::I32);
        assert_eq!(annotation_of("x: string = ''"), MysType::String);
        assert_eq!(annotation_of("x: bool = True"), MysType::Bool);
    }

    #[test]
    fn test_composite_annotations() {
        assert_eq!(
            annotation_of("x: [string] = []"),
            MysType::List(Box::new(MysType::String))
        );
        assert_eq!(
            annotation_of("x: {i32: string} = {}"),
            MysType::Dict(Box::new(MysType::I32), Box::new(MysType::String))
        );
        assert_eq!(
            annotation_of("x: (i32, bool) = (1, True)"),
            MysType::Tuple(vec![MysType::I32, MysType::Bool])
        );
    }

    #[test]
    fn test_display_matches_surface_syntax() {
        assert_eq!(MysType::I32.to_string(), "i32");
        assert_eq!(
            MysType::List(Box::new(MysType::String)).to_string(),
            "[string]"
        );
        assert_eq!(
            MysType::Dict(Box::new(MysType::I32), Box::new(MysType::String)).to_string(),
            "{i32: string}"
        );
        assert_eq!(MysType::Named("Foo".into()).to_string(), "Foo");
    }

    #[test]
    fn test_cpp_name_qualification() {
        assert_eq!(cpp_name("Foo"), "Foo");
        assert_eq!(cpp_name("foo.lib.Foo"), "mys::foo::lib::Foo");
    }

    #[test]
    fn test_cpp_type_mapping() {
        let ctx = crate::context::Context::new("foo.lib");

        assert_eq!(cpp_type(&MysType::I32, &ctx), "i32");
        assert_eq!(cpp_type(&MysType::Bool, &ctx), "Bool");
        assert_eq!(cpp_type(&MysType::String, &ctx), "String");
        assert_eq!(
            cpp_type(&MysType::List(Box::new(MysType::String)), &ctx),
            "SharedList<String>"
        );
        assert_eq!(
            cpp_param_type(&MysType::List(Box::new(MysType::String)), &ctx),
            "const SharedList<String>&"
        );
        assert_eq!(cpp_param_type(&MysType::I32, &ctx), "i32");
        assert_eq!(cpp_return_type(None, &ctx), "void");
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(default_value(&MysType::I32), "0");
        assert_eq!(default_value(&MysType::F64), "0.0");
        assert_eq!(default_value(&MysType::Bool), "Bool(false)");
        assert_eq!(default_value(&MysType::String), "String()");
        assert_eq!(default_value(&MysType::Named("Foo".into())), "nullptr");
    }
}
