//! Lexical scope tracking during lowering.
//!
//! The context is a stack of scopes. The outermost frame holds module
//! globals and imported names; inner frames are opened at function, method
//! and block entry and closed at exit (strict stack discipline). Bindings
//! borrow from the read-only definitions table, which outlives every
//! module's lowering.

use indexmap::IndexMap;

use crate::definitions::{ClassDef, EnumDef, FunctionDef, TraitDef};
use crate::error::{Error, Result, Span};
use crate::types::MysType;

/// What a name resolves to. Module-level variables carry their fully
/// qualified name so references from other namespaces can be spelled.
#[derive(Debug, Clone)]
pub enum Binding<'a> {
    Variable { ty: MysType, fqn: Option<String> },
    Function { fqn: String, overloads: &'a [FunctionDef] },
    Class { fqn: String, def: &'a ClassDef },
    Trait { fqn: String, def: &'a TraitDef },
    Enum { fqn: String, def: &'a EnumDef },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Trait,
    Enum,
}

#[derive(Debug)]
pub struct Context<'a> {
    module: String,
    scopes: Vec<IndexMap<String, Binding<'a>>>,
    /// Every declared type name usable in annotations, by local alias and
    /// by fully qualified name.
    types: IndexMap<String, TypeKind>,
    /// Declared return type of the enclosing function, if any.
    pub return_type: Option<MysType>,
}

impl<'a> Context<'a> {
    pub fn new(module: &str) -> Self {
        Self {
            module: module.to_string(),
            scopes: vec![IndexMap::new()],
            types: IndexMap::new(),
            return_type: None,
        }
    }

    pub fn make_full_name(&self, name: &str) -> String {
        format!("{}.{}", self.module, name)
    }

    pub fn push(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    pub fn pop(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the module scope");
        self.scopes.pop();
    }

    fn innermost(&mut self) -> &mut IndexMap<String, Binding<'a>> {
        self.scopes
            .last_mut()
            .unwrap_or_else(|| unreachable!("the module scope always exists"))
    }

    /// Bind a local variable in the innermost scope. Shadowing an outer
    /// scope is permitted; redefinition in the same scope is an error.
    pub fn define_local(&mut self, name: &str, ty: MysType, span: Span) -> Result<()> {
        if self.innermost().contains_key(name) {
            return Err(Error::compile(
                format!("redefining variable '{name}'"),
                span,
            ));
        }

        self.innermost()
            .insert(name.to_string(), Binding::Variable { ty, fqn: None });

        Ok(())
    }

    /// Bind a module-level variable (own or imported) at module scope.
    pub fn define_global_variable(&mut self, name: &str, fqn: String, ty: MysType) {
        self.scopes[0].insert(
            name.to_string(),
            Binding::Variable { ty, fqn: Some(fqn) },
        );
    }

    pub fn define_function(&mut self, name: &str, fqn: String, overloads: &'a [FunctionDef]) {
        self.scopes[0]
            .insert(name.to_string(), Binding::Function { fqn, overloads });
    }

    pub fn define_class(&mut self, name: &str, fqn: String, def: &'a ClassDef) {
        self.types.insert(name.to_string(), TypeKind::Class);
        self.types.insert(fqn.clone(), TypeKind::Class);
        self.scopes[0].insert(name.to_string(), Binding::Class { fqn, def });
    }

    pub fn define_trait(&mut self, name: &str, fqn: String, def: &'a TraitDef) {
        self.types.insert(name.to_string(), TypeKind::Trait);
        self.types.insert(fqn.clone(), TypeKind::Trait);
        self.scopes[0].insert(name.to_string(), Binding::Trait { fqn, def });
    }

    pub fn define_enum(&mut self, name: &str, fqn: String, def: &'a EnumDef) {
        self.types.insert(name.to_string(), TypeKind::Enum);
        self.types.insert(fqn.clone(), TypeKind::Enum);
        self.scopes[0].insert(name.to_string(), Binding::Enum { fqn, def });
    }

    /// Resolve a name in the innermost scope that defines it.
    pub fn lookup(&self, name: &str) -> Option<&Binding<'a>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    pub fn class_def(&self, name: &str) -> Option<&'a ClassDef> {
        match self.lookup(name) {
            Some(Binding::Class { def, .. }) => Some(*def),
            _ => None,
        }
    }

    pub fn trait_def(&self, name: &str) -> Option<&'a TraitDef> {
        match self.lookup(name) {
            Some(Binding::Trait { def, .. }) => Some(*def),
            _ => None,
        }
    }

    pub fn enum_def(&self, name: &str) -> Option<&'a EnumDef> {
        match self.lookup(name) {
            Some(Binding::Enum { def, .. }) => Some(*def),
            _ => None,
        }
    }

    pub fn type_kind(&self, name: &str) -> Option<TypeKind> {
        self.types.get(name).copied()
    }

    /// Recursively validate that a type expression only names declared
    /// types.
    pub fn is_type_defined(&self, ty: &MysType) -> bool {
        match ty {
            MysType::List(item) | MysType::Set(item) | MysType::Optional(item) => {
                self.is_type_defined(item)
            }
            MysType::Dict(key, value) => self.is_type_defined(key) && self.is_type_defined(value),
            MysType::Tuple(items) => items.iter().all(|item| self.is_type_defined(item)),
            MysType::Named(name) => self.types.contains_key(name),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span { line: 1, column: 0 }
    }

    #[test]
    fn test_lookup_innermost_wins() {
        let mut ctx = Context::new("foo.lib");
        ctx.define_global_variable("x", "foo.lib.x".to_string(), MysType::I32);
        ctx.push();
        ctx.define_local("x", MysType::String, span()).unwrap();

        match ctx.lookup("x") {
            Some(Binding::Variable { ty, .. }) => assert_eq!(*ty, MysType::String),
            other => panic!("unexpected binding: {other:?}"),
        }

        ctx.pop();

        match ctx.lookup("x") {
            Some(Binding::Variable { ty, .. }) => assert_eq!(*ty, MysType::I32),
            other => panic!("unexpected binding: {other:?}"),
        }
    }

    #[test]
    fn test_same_scope_redefinition_rejected() {
        let mut ctx = Context::new("foo.lib");
        ctx.push();
        ctx.define_local("x", MysType::I32, span()).unwrap();
        let err = ctx.define_local("x", MysType::I32, span()).unwrap_err();
        assert_eq!(err.message, "redefining variable 'x'");
    }

    #[test]
    fn test_binding_dropped_after_pop() {
        let mut ctx = Context::new("foo.lib");
        ctx.push();
        ctx.define_local("e", MysType::String, span()).unwrap();
        ctx.pop();
        assert!(ctx.lookup("e").is_none());
    }

    #[test]
    fn test_is_type_defined_composites() {
        let ctx = Context::new("foo.lib");
        assert!(ctx.is_type_defined(&MysType::List(Box::new(MysType::I32))));
        assert!(!ctx.is_type_defined(&MysType::List(Box::new(MysType::Named("Foo".into())))));
    }

    #[test]
    fn test_make_full_name() {
        let ctx = Context::new("foo.lib");
        assert_eq!(ctx.make_full_name("bar"), "foo.lib.bar");
    }
}
