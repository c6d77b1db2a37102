//! Static type queries.
//!
//! Rules ask a [`TypeInfo`] for the type of an expression. Local bindings the
//! rule has already seen (receiver, parameters, results, earlier declarations)
//! are tracked in a [`Scope`] that the rule builds while walking a function.

use std::collections::HashMap;

use crate::ast::{CallExpr, Expr, FuncDecl, Import, SourceFile, TypeRef};

/// Identifier that discards a value and never binds.
pub const BLANK: &str = "_";

/// Answers static type questions about expressions of one package.
pub trait TypeInfo {
    /// Type of `expr`, or `None` when it cannot be resolved or is a tuple.
    fn type_of(&self, expr: &Expr, scope: &Scope<'_>) -> Option<TypeRef>;

    /// Result types of a call, in order.
    fn results_of(&self, call: &CallExpr, scope: &Scope<'_>) -> Option<Vec<TypeRef>>;
}

/// A type oracle that knows nothing beyond the local scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeOnly;

impl TypeInfo for ScopeOnly {
    fn type_of(&self, expr: &Expr, scope: &Scope<'_>) -> Option<TypeRef> {
        match expr {
            Expr::Ident(ident) => scope.lookup(&ident.name).cloned(),
            Expr::Paren(inner) => self.type_of(inner, scope),
            Expr::TypeAssert { ty, .. } => Some(ty.clone()),
            _ => None,
        }
    }

    fn results_of(&self, _call: &CallExpr, _scope: &Scope<'_>) -> Option<Vec<TypeRef>> {
        None
    }
}

/// Names bound in the function scope so far.
#[derive(Debug, Clone, Default)]
pub struct Scope<'a> {
    imports: &'a [Import],
    bindings: HashMap<String, Option<TypeRef>>,
}

impl<'a> Scope<'a> {
    /// Creates an empty scope that resolves package names through `imports`.
    #[must_use]
    pub fn new(imports: &'a [Import]) -> Self {
        Self {
            imports,
            bindings: HashMap::new(),
        }
    }

    /// Scope at the start of `func`'s body: receiver, parameters and results.
    #[must_use]
    pub fn for_function(file: &'a SourceFile, func: &FuncDecl) -> Self {
        let mut scope = Self::new(&file.imports);
        for field in func.signature_fields() {
            if let Some(name) = &field.name {
                scope.declare(name, Some(field.ty.clone()));
            }
        }
        scope
    }

    /// Binds `name`, shadowing any previous binding. Blank names are ignored.
    pub fn declare(&mut self, name: &str, ty: Option<TypeRef>) {
        if name != BLANK {
            self.bindings.insert(name.to_string(), ty);
        }
    }

    /// True if `name` is already bound in this scope.
    #[must_use]
    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Type of a bound name, if known.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&TypeRef> {
        self.bindings.get(name).and_then(Option::as_ref)
    }

    /// Import path of the package referenced as `name`, unless shadowed locally.
    #[must_use]
    pub fn import_path(&self, name: &str) -> Option<&'a str> {
        if self.is_bound(name) {
            return None;
        }
        self.imports
            .iter()
            .find(|import| import.local_name() == name)
            .map(|import| import.path.as_str())
    }
}
