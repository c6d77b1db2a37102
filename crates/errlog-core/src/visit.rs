//! Depth-first traversal over the syntax model.
//!
//! Mirrors the `syn::visit` convention: every `visit_*` method has a default
//! that calls the matching `walk_*` function, so an implementation overrides
//! only the nodes it cares about and calls `walk_*` to keep descending.
//! Function literal bodies are part of the walk.

use crate::ast::{Block, CallExpr, CaseClause, Expr, FuncLit, Stmt};

/// A syntax tree visitor.
pub trait Visitor<'ast> {
    /// Visits a block.
    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block);
    }

    /// Visits a statement.
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    /// Visits the call of a `defer` statement.
    fn visit_defer(&mut self, call: &'ast CallExpr) {
        walk_call(self, call);
    }

    /// Visits an expression.
    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    /// Visits a call expression.
    fn visit_call(&mut self, call: &'ast CallExpr) {
        walk_call(self, call);
    }

    /// Visits an anonymous function.
    fn visit_func_lit(&mut self, lit: &'ast FuncLit) {
        self.visit_block(&lit.body);
    }
}

/// Visits every statement of a block.
pub fn walk_block<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, block: &'ast Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

/// Visits the children of a statement.
pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, stmt: &'ast Stmt) {
    match stmt {
        Stmt::Var(specs) => {
            for spec in specs {
                walk_exprs(v, &spec.values);
            }
        }
        Stmt::Define(assign) | Stmt::Assign(assign) => {
            walk_exprs(v, &assign.lhs);
            walk_exprs(v, &assign.rhs);
        }
        Stmt::Defer(call) => v.visit_defer(call),
        Stmt::Go(call) => v.visit_call(call),
        Stmt::Return(exprs) | Stmt::Other(exprs) => walk_exprs(v, exprs),
        Stmt::Expr(expr) => v.visit_expr(expr),
        Stmt::Block(block) => v.visit_block(block),
        Stmt::If(if_stmt) => {
            if let Some(init) = &if_stmt.init {
                v.visit_stmt(init);
            }
            v.visit_expr(&if_stmt.cond);
            v.visit_block(&if_stmt.then);
            if let Some(els) = &if_stmt.els {
                v.visit_stmt(els);
            }
        }
        Stmt::For(for_stmt) => {
            if let Some(init) = &for_stmt.init {
                v.visit_stmt(init);
            }
            if let Some(cond) = &for_stmt.cond {
                v.visit_expr(cond);
            }
            if let Some(post) = &for_stmt.post {
                v.visit_stmt(post);
            }
            v.visit_block(&for_stmt.body);
        }
        Stmt::Switch(switch) => {
            if let Some(init) = &switch.init {
                v.visit_stmt(init);
            }
            if let Some(tag) = &switch.tag {
                v.visit_expr(tag);
            }
            for clause in &switch.clauses {
                walk_clause(v, clause);
            }
        }
        Stmt::Labeled(inner) => v.visit_stmt(inner),
    }
}

fn walk_clause<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, clause: &'ast CaseClause) {
    walk_exprs(v, &clause.exprs);
    if let Some(comm) = &clause.comm {
        v.visit_stmt(comm);
    }
    for stmt in &clause.body {
        v.visit_stmt(stmt);
    }
}

fn walk_exprs<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, exprs: &'ast [Expr]) {
    for expr in exprs {
        v.visit_expr(expr);
    }
}

/// Visits the children of an expression.
pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, expr: &'ast Expr) {
    match expr {
        Expr::Ident(_) | Expr::Nil(_) | Expr::Literal { .. } => {}
        Expr::Selector { operand, .. }
        | Expr::Unary { operand, .. }
        | Expr::TypeAssert { operand, .. } => v.visit_expr(operand),
        Expr::Paren(inner) => v.visit_expr(inner),
        Expr::Call(call) => v.visit_call(call),
        Expr::FuncLit(lit) => v.visit_func_lit(lit),
        Expr::Other { children, .. } => walk_exprs(v, children),
    }
}

/// Visits the callee and arguments of a call.
pub fn walk_call<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, call: &'ast CallExpr) {
    v.visit_expr(&call.callee);
    walk_exprs(v, &call.args);
}
