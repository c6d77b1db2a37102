//! Facts extracted from a single function.
//!
//! Three independent predicates feed the rule:
//!
//! - [`returns_error`]: a declared result has type `error`
//! - [`has_top_level_error_variable`]: the body's top level declares `err` of
//!   type `error`
//! - [`has_deferred_error_log_call`]: somewhere in the body a `defer` calls
//!   `<recv>.log.<Error*|Debug*>(&err, ...)`

use errlog_core::ast::{
    Assignment, CallExpr, Expr, FuncDecl, SourceFile, Stmt, TypeRef, UnaryOp, VarSpec,
};
use errlog_core::visit::{walk_call, Visitor};
use errlog_core::{Scope, TypeInfo, BLANK};

/// Name of the captured error variable.
pub const ERR_VAR: &str = "err";

/// Field through which a receiver exposes its logger.
pub const LOGGER_FIELD: &str = "log";

/// Logger method prefixes that count as error logging.
pub const LOG_METHOD_PREFIXES: &[&str] = &["ErrorOr", "Error", "Debug"];

/// The three predicates for one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FunctionFacts {
    /// A declared result is of type `error`.
    pub returns_error: bool,
    /// The top level of the body declares an error-typed `err`.
    pub has_err_var: bool,
    /// A deferred logger call takes `&err` as its first argument.
    pub has_deferred_log: bool,
}

impl FunctionFacts {
    /// Computes all facts for `func`, whose receiver is named `receiver`.
    #[must_use]
    pub fn extract(
        file: &SourceFile,
        func: &FuncDecl,
        receiver: &str,
        types: &dyn TypeInfo,
    ) -> Self {
        Self {
            returns_error: returns_error(func),
            has_err_var: has_top_level_error_variable(file, func, types),
            has_deferred_log: has_deferred_error_log_call(func, receiver),
        }
    }
}

/// True if any declared result is written exactly as `error`.
#[must_use]
pub fn returns_error(func: &FuncDecl) -> bool {
    func.results.iter().any(|result| result.ty.is_error())
}

/// True if a top-level statement of the body declares `err` with type `error`.
///
/// Only `var` declarations and defining assignments directly in the body
/// count. Declarations nested in `if`, `for`, `switch` or blocks are ignored.
/// A defining assignment only declares `err` when the name is not already
/// bound in the function scope.
#[must_use]
pub fn has_top_level_error_variable(
    file: &SourceFile,
    func: &FuncDecl,
    types: &dyn TypeInfo,
) -> bool {
    let Some(body) = &func.body else {
        return false;
    };

    let mut scope = Scope::for_function(file, func);
    for stmt in &body.stmts {
        let found = match stmt {
            Stmt::Var(specs) => specs
                .iter()
                .any(|spec| declare_var_spec(spec, types, &mut scope)),
            Stmt::Define(assign) => declare_define(assign, types, &mut scope),
            _ => false,
        };
        if found {
            return true;
        }
    }
    false
}

/// Binds the names of a `var` spec; returns true if it declares an error `err`.
fn declare_var_spec(spec: &VarSpec, types: &dyn TypeInfo, scope: &mut Scope<'_>) -> bool {
    let mut found = false;
    let value_types: Vec<Option<TypeRef>> = spec
        .values
        .iter()
        .map(|value| types.type_of(value, scope))
        .collect();

    for (i, name) in spec.names.iter().enumerate() {
        // An explicit type wins; otherwise only an aligned initializer counts.
        let ty = match &spec.ty {
            Some(ty) => Some(ty.clone()),
            None => value_types.get(i).cloned().flatten(),
        };
        if name.is(ERR_VAR) && ty.as_ref().is_some_and(TypeRef::is_error) {
            found = true;
        }
        scope.declare(&name.name, ty);
    }
    found
}

/// Binds the new names of a `:=`; returns true if it newly defines an error `err`.
fn declare_define(assign: &Assignment, types: &dyn TypeInfo, scope: &mut Scope<'_>) -> bool {
    let rhs_types = define_types(assign, types, scope);
    let mut found = false;
    let mut fresh = Vec::new();

    for (i, lhs) in assign.lhs.iter().enumerate() {
        let Some(ident) = lhs.as_ident() else {
            continue;
        };
        if ident.is(BLANK) || scope.is_bound(&ident.name) {
            continue;
        }
        let ty = rhs_types.get(i).cloned().flatten();
        if ident.is(ERR_VAR) && ty.as_ref().is_some_and(TypeRef::is_error) {
            found = true;
        }
        fresh.push((ident.name.as_str(), ty));
    }

    for (name, ty) in fresh {
        scope.declare(name, ty);
    }
    found
}

/// Static types of the values a `:=` assigns, aligned with its left side.
fn define_types(
    assign: &Assignment,
    types: &dyn TypeInfo,
    scope: &Scope<'_>,
) -> Vec<Option<TypeRef>> {
    if assign.rhs.len() == assign.lhs.len() {
        return assign
            .rhs
            .iter()
            .map(|value| types.type_of(value, scope))
            .collect();
    }

    match assign.rhs.as_slice() {
        [Expr::Call(call)] => types
            .results_of(call, scope)
            .map(|results| results.into_iter().map(Some).collect())
            .unwrap_or_default(),
        [Expr::TypeAssert { ty, .. }] => vec![Some(ty.clone()), Some(TypeRef::new("bool"))],
        _ => Vec::new(),
    }
}

/// True if the body contains, at any depth, a deferred error-logging call
/// through `receiver` that takes `&err` first.
#[must_use]
pub fn has_deferred_error_log_call(func: &FuncDecl, receiver: &str) -> bool {
    let Some(body) = &func.body else {
        return false;
    };
    let mut finder = DeferredLogFinder {
        receiver,
        found: false,
    };
    finder.visit_block(body);
    finder.found
}

struct DeferredLogFinder<'r> {
    receiver: &'r str,
    found: bool,
}

impl<'ast> Visitor<'ast> for DeferredLogFinder<'_> {
    fn visit_defer(&mut self, call: &'ast CallExpr) {
        if is_error_log_call(call, self.receiver) {
            self.found = true;
        }
        walk_call(self, call);
    }
}

/// Matches `<receiver>.log.<method>(&err, ...)` where `method` starts with one
/// of [`LOG_METHOD_PREFIXES`].
#[must_use]
pub fn is_error_log_call(call: &CallExpr, receiver: &str) -> bool {
    let Expr::Selector {
        operand: logger,
        field: method,
    } = call.callee.as_ref()
    else {
        return false;
    };
    let Expr::Selector {
        operand: owner,
        field: logger_field,
    } = logger.as_ref()
    else {
        return false;
    };

    owner.is_ident(receiver)
        && logger_field.is(LOGGER_FIELD)
        && LOG_METHOD_PREFIXES
            .iter()
            .any(|prefix| method.name.starts_with(prefix))
        && call.args.first().is_some_and(is_err_address)
}

fn is_err_address(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Unary { op: UnaryOp::Addr, operand, .. } if operand.is_ident(ERR_VAR)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use errlog_core::LanguageFrontend;
    use errlog_go::GoFrontend;
    use std::path::Path;

    fn parse(body: &str) -> SourceFile {
        let src = format!(
            "package svc\n\nimport \"errors\"\n\ntype S struct{{ log *Logger }}\n\n\
                func load() (string, error) {{ return \"\", nil }}\n\n{body}\n"
        );
        GoFrontend::new()
            .parse(Path::new("/repo/svc.go"), &src)
            .expect("Failed to parse")
    }

    fn facts(body: &str) -> FunctionFacts {
        let file = parse(body);
        let frontend = GoFrontend::new();
        let types = frontend.resolve_types(std::slice::from_ref(&file));
        let func = file
            .functions
            .iter()
            .find(|f| f.name == "M")
            .expect("method M");
        FunctionFacts::extract(&file, func, func.receiver_name(), types.as_ref())
    }

    #[test]
    fn detects_error_result() {
        assert!(facts("func (s *S) M() (int, error) { return 0, nil }").returns_error);
        assert!(facts("func (s *S) M() (err error) { return }").returns_error);
        assert!(!facts("func (s *S) M() int { return 0 }").returns_error);
        assert!(!facts("func (s *S) M() {}").returns_error);
    }

    #[test]
    fn var_with_error_type() {
        assert!(facts("func (s *S) M() {\n\tvar err error\n\t_ = err\n}").has_err_var);
    }

    #[test]
    fn var_with_non_error_type_ignores_initializer() {
        assert!(!facts("func (s *S) M() {\n\tvar err MyErr = errors.New(\"x\")\n\t_ = err\n\
            }").has_err_var);
    }

    #[test]
    fn var_inferred_from_initializer() {
        assert!(facts("func (s *S) M() {\n\tvar err = errors.New(\"x\")\n\t_ = err\n\
            }").has_err_var);
    }

    #[test]
    fn var_tuple_initializer_is_not_detected() {
        assert!(!facts("func (s *S) M() {\n\tvar v, err = load()\n\t_, _ = v, err\n}").has_err_var);
    }

    #[test]
    fn define_from_multi_result_call() {
        assert!(facts("func (s *S) M() {\n\tv, err := load()\n\t_, _ = v, err\n}").has_err_var);
    }

    #[test]
    fn define_reusing_named_result_does_not_declare() {
        assert!(!facts("func (s *S) M() (err error) {\n\tv, err := load()\n\t_ = v\n\treturn\n\
            }").has_err_var);
    }

    #[test]
    fn define_reusing_parameter_does_not_declare() {
        assert!(!facts("func (s *S) M(err error) {\n\tv, err := load()\n\t_ = v\n}").has_err_var);
    }

    #[test]
    fn nested_declarations_are_ignored() {
        let nested = [
            "func (s *S) M() {\n\tif err := errors.New(\"x\"); err != nil {\n\t}\n}",
            "func (s *S) M() {\n\t{\n\t\tvar err error\n\t\t_ = err\n\t}\n}",
            "func (s *S) M() {\n\tfor i := 0; i < 1; i++ {\n\t\terr := errors.New(\"x\")\n\
                \t\t_ = err\n\t}\n}",
        ];
        for body in nested {
            assert!(!facts(body).has_err_var, "{body}");
        }
    }

    #[test]
    fn other_names_do_not_count() {
        assert!(!facts("func (s *S) M() {\n\tvar e error\n\t_ = e\n}").has_err_var);
    }

    #[test]
    fn deferred_log_with_err_address() {
        let f = facts("func (s *S) M() {\n\tvar err error\n\
            \tdefer s.log.ErrorOrDebug(&err, \"m\")\n}");
        assert!(f.has_deferred_log);

        let f = facts("func (s *S) M() {\n\tvar err error\n\tdefer s.log.Debugf(&err, \"m\")\n}");
        assert!(f.has_deferred_log);
    }

    #[test]
    fn deferred_log_inside_nested_closure() {
        let f = facts(
            "func (s *S) M() {\n\tvar err error\n\tgo func() {\n\t\tdefer s.log.Error(&err)\n\
                \t}()\n}",
        );
        assert!(f.has_deferred_log);
    }

    #[test]
    fn deferred_log_shapes_that_do_not_match() {
        let misses = [
            "func (s *S) M() {\n\tvar err error\n\tdefer s.log.ErrorOrDebug(nil, \"m\")\n}",
            "func (s *S) M() {\n\tvar err error\n\tdefer s.log.Info(&err)\n}",
            "func (s *S) M() {\n\tvar err error\n\tdefer s.logger.Error(&err)\n}",
            "func (s *S) M() {\n\tvar err error\n\tdefer other.log.Error(&err)\n}",
            "func (s *S) M() {\n\tvar err error\n\tdefer s.log.Error(err)\n}",
            "func (s *S) M() {\n\tvar e error\n\tdefer s.log.Error(&e)\n}",
            "func (s *S) M() {\n\tvar err error\n\ts.log.Error(&err)\n}",
        ];
        for body in misses {
            assert!(!facts(body).has_deferred_log, "{body}");
        }
    }
}
