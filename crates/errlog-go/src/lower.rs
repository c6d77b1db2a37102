//! Lowering of tree-sitter Go syntax trees into the core syntax model.

use std::path::Path;

use errlog_core::ast::{
    Assignment, Block, CallExpr, CaseClause, Comment, Expr, Field, ForStmt, FuncDecl, FuncLit,
    Ident, IfStmt, Import, MethodSig, Position, SourceFile, Stmt, SwitchStmt, TypeDecl, TypeRef,
    UnaryOp, VarSpec,
};
use tree_sitter::Node;

/// Walks one parsed file and builds its [`SourceFile`].
pub(crate) struct Lowerer<'s> {
    src: &'s [u8],
}

impl<'s> Lowerer<'s> {
    pub(crate) fn new(src: &'s [u8]) -> Self {
        Self { src }
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.src).unwrap_or("")
    }

    fn pos(node: Node<'_>) -> Position {
        let point = node.start_position();
        Position::new(point.row + 1, point.column + 1, node.start_byte())
    }

    /// Lowers the `source_file` root node.
    pub(crate) fn file(&self, root: Node<'_>, path: &Path) -> SourceFile {
        let mut file = SourceFile::new(path);
        file.comments = self.comments(root);

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "package_clause" => {
                    let mut inner = node.walk();
                    let name = node
                        .named_children(&mut inner)
                        .find(|c| c.kind() == "package_identifier");
                    if let Some(name) = name {
                        file.package = self.text(name).to_string();
                    }
                }
                "import_declaration" => self.imports(node, &mut file.imports),
                "function_declaration" | "method_declaration" => {
                    let func = self.func_decl(node, &file.comments);
                    file.functions.push(func);
                }
                "var_declaration" => file.globals.extend(self.var_specs(node)),
                "type_declaration" => file.types.extend(self.type_decls(node)),
                _ => {}
            }
        }
        file
    }

    fn comments(&self, root: Node<'_>) -> Vec<Comment> {
        let mut comments = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == "comment" {
                comments.push(Comment {
                    text: self.text(node).to_string(),
                    pos: Self::pos(node),
                    end_line: node.end_position().row + 1,
                    own_line: self.starts_line(node),
                });
                continue;
            }
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        comments.sort_by_key(|c| c.pos.offset);
        comments
    }

    /// True if only whitespace precedes `node` on its line.
    fn starts_line(&self, node: Node<'_>) -> bool {
        self.src[..node.start_byte()]
            .iter()
            .rev()
            .take_while(|&&b| b != b'\n')
            .all(u8::is_ascii_whitespace)
    }

    fn imports(&self, node: Node<'_>, out: &mut Vec<Import>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => {
                    let alias = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string());
                    if let Some(path) = child.child_by_field_name("path") {
                        out.push(Import {
                            alias,
                            path: self.text(path).trim_matches(['"', '`']).to_string(),
                        });
                    }
                }
                "import_spec_list" => self.imports(child, out),
                _ => {}
            }
        }
    }

    fn func_decl(&self, node: Node<'_>, comments: &[Comment]) -> FuncDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|r| self.params(r).into_iter().next());
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.params(p))
            .unwrap_or_default();
        let results = self.results(node);
        let body_node = node.child_by_field_name("body");

        let start = node.start_byte();
        let end = body_node.map_or(node.end_byte(), |b| b.start_byte());
        let signature = std::str::from_utf8(&self.src[start..end]).unwrap_or("");

        let pos = Self::pos(node);
        FuncDecl {
            name,
            receiver,
            params,
            results,
            body: body_node.map(|b| self.block(b)),
            pos,
            signature_len: signature.trim_end().len(),
            doc: doc_comments(comments, pos.line),
        }
    }

    fn type_decls(&self, node: Node<'_>) -> Vec<TypeDecl> {
        let mut decls = Vec::new();
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if !matches!(spec.kind(), "type_spec" | "type_alias") {
                continue;
            }
            let Some(name) = spec.child_by_field_name("name") else {
                continue;
            };
            let mut decl = TypeDecl {
                name: self.text(name).to_string(),
                fields: Vec::new(),
                methods: Vec::new(),
                pos: Self::pos(name),
            };
            match spec.child_by_field_name("type") {
                Some(ty) if ty.kind() == "struct_type" => decl.fields = self.struct_fields(ty),
                Some(ty) if ty.kind() == "interface_type" => self.interface_elems(ty, &mut decl),
                _ => {}
            }
            decls.push(decl);
        }
        decls
    }

    fn struct_fields(&self, node: Node<'_>) -> Vec<Field> {
        let mut fields = Vec::new();
        let mut cursor = node.walk();
        for list in node.named_children(&mut cursor) {
            if list.kind() != "field_declaration_list" {
                continue;
            }
            let mut list_cursor = list.walk();
            for decl in list.named_children(&mut list_cursor) {
                if decl.kind() != "field_declaration" {
                    continue;
                }
                let Some(ty) = decl.child_by_field_name("type") else {
                    continue;
                };
                let ty = TypeRef::new(self.text(ty));

                let mut names_cursor = decl.walk();
                let names: Vec<String> = decl
                    .children_by_field_name("name", &mut names_cursor)
                    .map(|n| self.text(n).to_string())
                    .collect();
                if names.is_empty() {
                    fields.push(Field { name: None, ty });
                } else {
                    fields.extend(names.into_iter().map(|name| Field {
                        name: Some(name),
                        ty: ty.clone(),
                    }));
                }
            }
        }
        fields
    }

    /// Collects the method set and embedded interfaces of an interface type.
    fn interface_elems(&self, node: Node<'_>, decl: &mut TypeDecl) {
        let mut cursor = node.walk();
        for elem in node.named_children(&mut cursor) {
            match elem.kind() {
                "method_elem" | "method_spec" => {
                    if let Some(name) = elem.child_by_field_name("name") {
                        decl.methods.push(MethodSig {
                            name: self.text(name).to_string(),
                            results: self.results(elem),
                        });
                    }
                }
                "type_elem" | "constraint_elem" => {
                    // Unions (`A | B`) constrain type sets and embed nothing.
                    if elem.named_child_count() == 1 {
                        if let Some(ty) = elem.named_child(0) {
                            decl.fields.push(Field {
                                name: None,
                                ty: TypeRef::new(self.text(ty)),
                            });
                        }
                    }
                }
                "type_identifier" | "qualified_type" => decl.fields.push(Field {
                    name: None,
                    ty: TypeRef::new(self.text(elem)),
                }),
                _ => {}
            }
        }
    }

    fn results(&self, node: Node<'_>) -> Vec<Field> {
        match node.child_by_field_name("result") {
            Some(list) if list.kind() == "parameter_list" => self.params(list),
            Some(ty) => vec![Field {
                name: None,
                ty: TypeRef::new(self.text(ty)),
            }],
            None => Vec::new(),
        }
    }

    fn params(&self, list: Node<'_>) -> Vec<Field> {
        let mut fields = Vec::new();
        let mut cursor = list.walk();
        for decl in list.named_children(&mut cursor) {
            let variadic = match decl.kind() {
                "parameter_declaration" => false,
                "variadic_parameter_declaration" => true,
                _ => continue,
            };
            let ty_text = decl
                .child_by_field_name("type")
                .map_or("", |t| self.text(t));
            let ty = if variadic {
                TypeRef::new(&format!("...{ty_text}"))
            } else {
                TypeRef::new(ty_text)
            };

            let mut names_cursor = decl.walk();
            let names: Vec<String> = decl
                .children_by_field_name("name", &mut names_cursor)
                .map(|n| self.text(n).to_string())
                .collect();
            if names.is_empty() {
                fields.push(Field { name: None, ty });
            } else {
                fields.extend(names.into_iter().map(|name| Field {
                    name: Some(name),
                    ty: ty.clone(),
                }));
            }
        }
        fields
    }

    fn block(&self, node: Node<'_>) -> Block {
        let mut stmts = Vec::new();
        self.statements(node, &mut stmts);
        Block {
            stmts,
            pos: Self::pos(node),
        }
    }

    /// Lowers the statements directly under `node`, flattening statement lists.
    fn statements(&self, node: Node<'_>, out: &mut Vec<Stmt>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "statement_list" {
                self.statements(child, out);
            } else if let Some(stmt) = self.stmt(child) {
                out.push(stmt);
            }
        }
    }

    fn boxed_stmt(&self, node: Option<Node<'_>>) -> Option<Box<Stmt>> {
        node.and_then(|n| self.stmt(n)).map(Box::new)
    }

    fn stmt(&self, node: Node<'_>) -> Option<Stmt> {
        let stmt = match node.kind() {
            "comment" | "empty_statement" => return None,
            "var_declaration" => Stmt::Var(self.var_specs(node)),
            "short_var_declaration" => Stmt::Define(self.assignment(node)),
            "assignment_statement" => Stmt::Assign(self.assignment(node)),
            "receive_statement" => {
                let assign = self.assignment(node);
                if has_token(node, ":=") {
                    Stmt::Define(assign)
                } else if assign.lhs.is_empty() {
                    Stmt::Other(assign.rhs)
                } else {
                    Stmt::Assign(assign)
                }
            }
            "defer_statement" | "go_statement" => {
                let expr = first_named(node).map(|e| self.expr(e));
                match (node.kind(), expr) {
                    ("defer_statement", Some(Expr::Call(call))) => Stmt::Defer(call),
                    (_, Some(Expr::Call(call))) => Stmt::Go(call),
                    (_, other) => Stmt::Other(other.into_iter().collect()),
                }
            }
            "return_statement" => {
                Stmt::Return(first_named(node).map(|e| self.expr_list(e)).unwrap_or_default())
            }
            "expression_statement" => match first_named(node) {
                Some(e) => Stmt::Expr(self.expr(e)),
                None => Stmt::Other(Vec::new()),
            },
            "block" => Stmt::Block(self.block(node)),
            "if_statement" => Stmt::If(self.if_stmt(node)),
            "for_statement" => Stmt::For(self.for_stmt(node)),
            "expression_switch_statement" | "type_switch_statement" | "select_statement" => {
                Stmt::Switch(self.switch_stmt(node))
            }
            "labeled_statement" => {
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .find(|c| c.kind() != "label_name" && c.kind() != "comment");
                match inner.and_then(|i| self.stmt(i)) {
                    Some(stmt) => Stmt::Labeled(Box::new(stmt)),
                    None => Stmt::Other(Vec::new()),
                }
            }
            "const_declaration" | "type_declaration" | "break_statement"
            | "continue_statement" | "goto_statement" | "fallthrough_statement" => {
                Stmt::Other(Vec::new())
            }
            _ => Stmt::Other(self.named_exprs(node)),
        };
        Some(stmt)
    }

    fn if_stmt(&self, node: Node<'_>) -> IfStmt {
        let cond = node.child_by_field_name("condition").map_or_else(
            || Expr::Other {
                children: Vec::new(),
                pos: Self::pos(node),
            },
            |c| self.expr(c),
        );
        IfStmt {
            init: self.boxed_stmt(node.child_by_field_name("initializer")),
            cond,
            then: node
                .child_by_field_name("consequence")
                .map(|b| self.block(b))
                .unwrap_or_default(),
            els: self.boxed_stmt(node.child_by_field_name("alternative")),
        }
    }

    fn for_stmt(&self, node: Node<'_>) -> ForStmt {
        let mut for_stmt = ForStmt {
            init: None,
            cond: None,
            post: None,
            body: node
                .child_by_field_name("body")
                .map(|b| self.block(b))
                .unwrap_or_default(),
        };

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "for_clause" => {
                    for_stmt.init = self.boxed_stmt(child.child_by_field_name("initializer"));
                    for_stmt.cond = child.child_by_field_name("condition").map(|c| self.expr(c));
                    for_stmt.post = self.boxed_stmt(child.child_by_field_name("update"));
                }
                "range_clause" => {
                    let assign = self.assignment(child);
                    let stmt = if assign.lhs.is_empty() {
                        Stmt::Other(assign.rhs)
                    } else if has_token(child, ":=") {
                        Stmt::Define(assign)
                    } else {
                        Stmt::Assign(assign)
                    };
                    for_stmt.init = Some(Box::new(stmt));
                }
                "block" | "comment" => {}
                _ => for_stmt.cond = Some(self.expr(child)),
            }
        }
        for_stmt
    }

    fn switch_stmt(&self, node: Node<'_>) -> SwitchStmt {
        let mut cursor = node.walk();
        let clauses = node
            .named_children(&mut cursor)
            .filter(|c| {
                matches!(
                    c.kind(),
                    "expression_case" | "type_case" | "communication_case" | "default_case"
                )
            })
            .map(|c| self.clause(c))
            .collect();
        SwitchStmt {
            init: self.boxed_stmt(node.child_by_field_name("initializer")),
            tag: node.child_by_field_name("value").map(|v| self.expr(v)),
            clauses,
        }
    }

    fn clause(&self, node: Node<'_>) -> CaseClause {
        let mut clause = CaseClause::default();
        let mut cursor = node.walk();
        if !cursor.goto_first_child() {
            return clause;
        }
        loop {
            let child = cursor.node();
            if child.is_named() {
                match cursor.field_name() {
                    Some("value") => clause.exprs.extend(self.expr_list(child)),
                    Some("type") => {}
                    Some("communication") => clause.comm = self.stmt(child).map(Box::new),
                    _ if child.kind() == "statement_list" => {
                        self.statements(child, &mut clause.body);
                    }
                    _ => clause.body.extend(self.stmt(child)),
                }
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        clause
    }

    fn assignment(&self, node: Node<'_>) -> Assignment {
        Assignment {
            lhs: node
                .child_by_field_name("left")
                .map(|l| self.expr_list(l))
                .unwrap_or_default(),
            rhs: node
                .child_by_field_name("right")
                .map(|r| self.expr_list(r))
                .unwrap_or_default(),
            pos: Self::pos(node),
        }
    }

    fn var_specs(&self, node: Node<'_>) -> Vec<VarSpec> {
        let mut specs = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "var_spec" => specs.push(self.var_spec(child)),
                "var_spec_list" => specs.extend(self.var_specs(child)),
                _ => {}
            }
        }
        specs
    }

    fn var_spec(&self, node: Node<'_>) -> VarSpec {
        let mut cursor = node.walk();
        let names = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| Ident::new(self.text(n), Self::pos(n)))
            .collect();
        VarSpec {
            names,
            ty: node
                .child_by_field_name("type")
                .map(|t| TypeRef::new(self.text(t))),
            values: node
                .child_by_field_name("value")
                .map(|v| self.expr_list(v))
                .unwrap_or_default(),
        }
    }

    fn expr_list(&self, node: Node<'_>) -> Vec<Expr> {
        if node.kind() == "expression_list" {
            self.named_exprs(node)
        } else {
            vec![self.expr(node)]
        }
    }

    fn named_exprs(&self, node: Node<'_>) -> Vec<Expr> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|c| c.kind() != "comment")
            .map(|c| self.expr(c))
            .collect()
    }

    fn expr(&self, node: Node<'_>) -> Expr {
        let pos = Self::pos(node);
        match node.kind() {
            "identifier" | "field_identifier" | "package_identifier" | "type_identifier" => {
                Expr::Ident(Ident::new(self.text(node), pos))
            }
            "nil" => Expr::Nil(pos),
            "selector_expression" => {
                match (
                    node.child_by_field_name("operand"),
                    node.child_by_field_name("field"),
                ) {
                    (Some(operand), Some(field)) => Expr::Selector {
                        operand: Box::new(self.expr(operand)),
                        field: Ident::new(self.text(field), Self::pos(field)),
                    },
                    _ => self.other(node),
                }
            }
            "call_expression" => Expr::Call(self.call(node)),
            "unary_expression" => {
                let op = node
                    .child_by_field_name("operator")
                    .and_then(|o| UnaryOp::from_token(self.text(o)));
                match (op, node.child_by_field_name("operand")) {
                    (Some(op), Some(operand)) => Expr::Unary {
                        op,
                        operand: Box::new(self.expr(operand)),
                        pos,
                    },
                    _ => self.other(node),
                }
            }
            "parenthesized_expression" => match first_named(node) {
                Some(inner) => Expr::Paren(Box::new(self.expr(inner))),
                None => self.other(node),
            },
            "type_assertion_expression" => {
                match (
                    node.child_by_field_name("operand"),
                    node.child_by_field_name("type"),
                ) {
                    (Some(operand), Some(ty)) => Expr::TypeAssert {
                        operand: Box::new(self.expr(operand)),
                        ty: TypeRef::new(self.text(ty)),
                    },
                    _ => self.other(node),
                }
            }
            "func_literal" => Expr::FuncLit(Box::new(FuncLit {
                params: node
                    .child_by_field_name("parameters")
                    .map(|p| self.params(p))
                    .unwrap_or_default(),
                results: self.results(node),
                body: node
                    .child_by_field_name("body")
                    .map(|b| self.block(b))
                    .unwrap_or_default(),
                pos,
            })),
            "int_literal" | "float_literal" | "imaginary_literal" | "rune_literal"
            | "interpreted_string_literal" | "raw_string_literal" | "true" | "false" | "iota" => {
                Expr::Literal {
                    text: self.text(node).to_string(),
                    pos,
                }
            }
            _ => self.other(node),
        }
    }

    fn other(&self, node: Node<'_>) -> Expr {
        Expr::Other {
            children: self.named_exprs(node),
            pos: Self::pos(node),
        }
    }

    fn call(&self, node: Node<'_>) -> CallExpr {
        let callee = node
            .child_by_field_name("function")
            .map_or_else(|| self.other(node), |f| self.expr(f));
        CallExpr {
            callee: Box::new(callee),
            args: node
                .child_by_field_name("arguments")
                .map(|a| self.named_exprs(a))
                .unwrap_or_default(),
            pos: Self::pos(node),
        }
    }
}

/// The own-line comment group that ends on the line right above `decl_line`.
fn doc_comments(comments: &[Comment], decl_line: usize) -> Vec<Comment> {
    let mut doc = Vec::new();
    let mut expected = decl_line.saturating_sub(1);
    for comment in comments.iter().rev() {
        if comment.pos.line >= decl_line {
            continue;
        }
        if !comment.own_line || comment.end_line != expected {
            break;
        }
        doc.push(comment.clone());
        expected = comment.pos.line.saturating_sub(1);
    }
    doc.reverse();
    doc
}

fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    found
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| !c.is_named() && c.kind() == token);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_group_stops_at_blank_line() {
        let comment = |line: usize, own_line: bool| Comment {
            text: format!("// c{line}"),
            pos: Position::new(line, 1, line * 10),
            end_line: line,
            own_line,
        };
        let comments = vec![
            comment(1, true),
            comment(3, true),
            comment(4, true),
            comment(5, false),
        ];

        let doc = doc_comments(&comments, 5);
        let lines: Vec<usize> = doc.iter().map(|c| c.pos.line).collect();
        assert_eq!(lines, vec![3, 4]);

        assert!(doc_comments(&comments, 7).is_empty());
    }
}
