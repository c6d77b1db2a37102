//! Package-level type resolution for Go.
//!
//! Builds lookup tables from every file of one package (function results,
//! method results keyed by receiver type, interface method sets, struct field
//! types, package variables) and combines them with a table of well-known
//! standard library signatures. The resolver is
//! syntactic: it answers what a declaration states and does not attempt
//! inference beyond calls, conversions and type assertions.

use std::collections::HashMap;

use errlog_core::ast::{CallExpr, Expr, Field, SourceFile, TypeDecl, TypeRef, UnaryOp};
use errlog_core::{Scope, TypeInfo};

/// Results of standard library functions, keyed by import path and name.
const STDLIB_FUNCS: &[(&str, &str, &[&str])] = &[
    ("errors", "New", &["error"]),
    ("errors", "Join", &["error"]),
    ("errors", "Unwrap", &["error"]),
    ("fmt", "Errorf", &["error"]),
    ("fmt", "Printf", &["int", "error"]),
    ("fmt", "Println", &["int", "error"]),
    ("fmt", "Fprintf", &["int", "error"]),
    ("fmt", "Sscanf", &["int", "error"]),
    ("os", "Open", &["*os.File", "error"]),
    ("os", "Create", &["*os.File", "error"]),
    ("os", "ReadFile", &["[]byte", "error"]),
    ("os", "WriteFile", &["error"]),
    ("os", "Remove", &["error"]),
    ("os", "RemoveAll", &["error"]),
    ("os", "Mkdir", &["error"]),
    ("os", "MkdirAll", &["error"]),
    ("os", "Stat", &["os.FileInfo", "error"]),
    ("os", "Getwd", &["string", "error"]),
    ("os", "Chdir", &["error"]),
    ("os", "Setenv", &["error"]),
    ("io", "ReadAll", &["[]byte", "error"]),
    ("io", "Copy", &["int64", "error"]),
    ("io", "WriteString", &["int", "error"]),
    ("encoding/json", "Marshal", &["[]byte", "error"]),
    ("encoding/json", "MarshalIndent", &["[]byte", "error"]),
    ("encoding/json", "Unmarshal", &["error"]),
    ("strconv", "Atoi", &["int", "error"]),
    ("strconv", "ParseInt", &["int64", "error"]),
    ("strconv", "ParseUint", &["uint64", "error"]),
    ("strconv", "ParseBool", &["bool", "error"]),
    ("strconv", "ParseFloat", &["float64", "error"]),
    ("net/http", "Get", &["*http.Response", "error"]),
    ("net/http", "Post", &["*http.Response", "error"]),
    ("net/http", "NewRequest", &["*http.Request", "error"]),
    ("net/http", "ListenAndServe", &["error"]),
    ("net", "Dial", &["net.Conn", "error"]),
    ("net", "Listen", &["net.Listener", "error"]),
    ("database/sql", "Open", &["*sql.DB", "error"]),
    ("path/filepath", "Abs", &["string", "error"]),
    ("path/filepath", "Rel", &["string", "error"]),
    ("path/filepath", "Glob", &["[]string", "error"]),
    ("path/filepath", "Walk", &["error"]),
    ("path/filepath", "WalkDir", &["error"]),
    ("time", "Parse", &["time.Time", "error"]),
    ("time", "ParseDuration", &["time.Duration", "error"]),
    ("time", "LoadLocation", &["*time.Location", "error"]),
    ("context", "Cause", &["error"]),
];

/// Standard library package variables of type `error`.
const STDLIB_ERRORS: &[(&str, &str)] = &[
    ("io", "EOF"),
    ("io", "ErrUnexpectedEOF"),
    ("io/fs", "ErrNotExist"),
    ("io/fs", "ErrExist"),
    ("io/fs", "ErrPermission"),
    ("os", "ErrNotExist"),
    ("os", "ErrExist"),
    ("os", "ErrPermission"),
    ("context", "Canceled"),
    ("context", "DeadlineExceeded"),
    ("database/sql", "ErrNoRows"),
    ("net/http", "ErrServerClosed"),
    ("errors", "ErrUnsupported"),
];

/// How many levels of embedded types are searched for promoted fields and
/// methods.
const EMBED_DEPTH: usize = 4;

fn field_types(fields: &[Field]) -> Vec<TypeRef> {
    fields.iter().map(|f| f.ty.clone()).collect()
}

/// Import path of `operand` when it names an imported package.
fn package_path<'a>(operand: &Expr, scope: &Scope<'a>) -> Option<&'a str> {
    operand
        .as_ident()
        .and_then(|pkg| scope.import_path(&pkg.name))
}

/// Type tables for one Go package.
#[derive(Debug, Clone, Default)]
pub struct PackageTypes {
    functions: HashMap<String, Vec<TypeRef>>,
    methods: HashMap<(String, String), Vec<TypeRef>>,
    fields: HashMap<(String, String), TypeRef>,
    embedded: HashMap<String, Vec<TypeRef>>,
    globals: HashMap<String, TypeRef>,
}

impl PackageTypes {
    /// Collects declarations from all files of a package.
    #[must_use]
    pub fn new(files: &[SourceFile]) -> Self {
        let mut types = Self::default();

        for file in files {
            for func in &file.functions {
                let results = field_types(&func.results);
                match &func.receiver {
                    Some(recv) => {
                        let key = (recv.ty.base_name().to_string(), func.name.clone());
                        types.methods.insert(key, results);
                    }
                    None => {
                        types.functions.insert(func.name.clone(), results);
                    }
                }
            }
            for decl in &file.types {
                types.add_type(decl);
            }
            for spec in &file.globals {
                if let Some(ty) = &spec.ty {
                    for name in &spec.names {
                        types.globals.insert(name.name.clone(), ty.clone());
                    }
                }
            }
        }

        types.infer_globals(files);
        types
    }

    fn add_type(&mut self, decl: &TypeDecl) {
        for field in &decl.fields {
            if let Some(name) = &field.name {
                self.fields
                    .insert((decl.name.clone(), name.clone()), field.ty.clone());
            }
        }
        for method in &decl.methods {
            self.methods.insert(
                (decl.name.clone(), method.name.clone()),
                field_types(&method.results),
            );
        }
        let embedded: Vec<TypeRef> = decl.embedded().cloned().collect();
        if !embedded.is_empty() {
            self.embedded.insert(decl.name.clone(), embedded);
        }
    }

    /// Type of `owner.field`, following embedded types for promoted fields.
    fn field_type(&self, owner: &str, field: &str, depth: usize) -> Option<TypeRef> {
        if let Some(ty) = self.fields.get(&(owner.to_string(), field.to_string())) {
            return Some(ty.clone());
        }
        let embedded = self.embedded.get(owner)?;
        // An embedded type is also a field named after the type.
        if let Some(ty) = embedded.iter().find(|ty| ty.base_name() == field) {
            return Some(ty.clone());
        }
        if depth == 0 {
            return None;
        }
        embedded
            .iter()
            .find_map(|ty| self.field_type(ty.base_name(), field, depth - 1))
    }

    /// Results of method `name` on `owner`, including promoted methods.
    fn method_results(&self, owner: &str, name: &str, depth: usize) -> Option<Vec<TypeRef>> {
        if let Some(results) = self.methods.get(&(owner.to_string(), name.to_string())) {
            return Some(results.clone());
        }
        if depth == 0 {
            return None;
        }
        self.embedded
            .get(owner)?
            .iter()
            .find_map(|ty| self.method_results(ty.base_name(), name, depth - 1))
    }

    /// Resolves untyped package variables from their initializers. Repeats
    /// until no new type is learned, so declaration order does not matter.
    fn infer_globals(&mut self, files: &[SourceFile]) {
        loop {
            let mut learned = Vec::new();
            for file in files {
                let scope = Scope::new(&file.imports);
                for spec in file.globals.iter().filter(|s| s.ty.is_none()) {
                    for (name, value) in spec.names.iter().zip(&spec.values) {
                        if self.globals.contains_key(&name.name) {
                            continue;
                        }
                        if let Some(ty) = self.type_of(value, &scope) {
                            learned.push((name.name.clone(), ty));
                        }
                    }
                }
            }
            if learned.is_empty() {
                break;
            }
            self.globals.extend(learned);
        }
    }

    fn stdlib_results(path: &str, name: &str) -> Option<Vec<TypeRef>> {
        STDLIB_FUNCS
            .iter()
            .find(|(p, n, _)| *p == path && *n == name)
            .map(|(_, _, results)| results.iter().map(|r| TypeRef::new(r)).collect())
    }

    fn stdlib_var(path: &str, name: &str) -> Option<TypeRef> {
        STDLIB_ERRORS
            .iter()
            .any(|(p, n)| *p == path && *n == name)
            .then(TypeRef::error)
    }
}

impl TypeInfo for PackageTypes {
    fn type_of(&self, expr: &Expr, scope: &Scope<'_>) -> Option<TypeRef> {
        match expr {
            Expr::Ident(ident) => {
                if scope.is_bound(&ident.name) {
                    scope.lookup(&ident.name).cloned()
                } else {
                    self.globals.get(&ident.name).cloned()
                }
            }
            Expr::Paren(inner) => self.type_of(inner, scope),
            Expr::Call(call) => match self.results_of(call, scope)?.as_slice() {
                [single] => Some(single.clone()),
                _ => None,
            },
            Expr::TypeAssert { ty, .. } => Some(ty.clone()),
            Expr::Unary {
                op: UnaryOp::Addr,
                operand,
                ..
            } => self
                .type_of(operand, scope)
                .map(|ty| TypeRef::new(&format!("*{ty}"))),
            Expr::Selector { operand, field } => {
                if let Some(path) = package_path(operand, scope) {
                    return Self::stdlib_var(path, &field.name);
                }
                let owner = self.type_of(operand, scope)?;
                self.field_type(owner.base_name(), &field.name, EMBED_DEPTH)
            }
            _ => None,
        }
    }

    fn results_of(&self, call: &CallExpr, scope: &Scope<'_>) -> Option<Vec<TypeRef>> {
        match call.callee.as_ref() {
            Expr::Ident(ident) if !scope.is_bound(&ident.name) => {
                if ident.is("error") {
                    return Some(vec![TypeRef::error()]);
                }
                self.functions.get(&ident.name).cloned()
            }
            Expr::Selector { operand, field } => {
                if let Some(path) = package_path(operand, scope) {
                    return Self::stdlib_results(path, &field.name);
                }
                let recv = self.type_of(operand, scope)?;
                self.method_results(recv.base_name(), &field.name, EMBED_DEPTH)
            }
            Expr::Paren(inner) => self.results_of(
                &CallExpr {
                    callee: inner.clone(),
                    args: Vec::new(),
                    pos: call.pos,
                },
                scope,
            ),
            Expr::FuncLit(lit) => Some(field_types(&lit.results)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GoFrontend;
    use errlog_core::ast::Stmt;
    use errlog_core::LanguageFrontend;
    use std::path::Path;

    const SRC: &str = r#"package store

import (
	"errors"
	stdfmt "fmt"
	"io"
)

var ErrClosed = errors.New("closed")
var errAlias = ErrClosed
var limit int

type Store struct{}

func (s *Store) load() (string, error) { return "", nil }
func (s Store) check() error { return nil }
func open() error { return nil }
func pair() (int, error) { return 0, nil }

func (s *Store) Run() {
	a := errors.New("x")
	b := stdfmt.Errorf("y")
	c := s.check()
	d := open()
	e := pair()
	f := io.EOF
	g := ErrClosed
	h := errAlias
	i := limit
}
"#;

    fn resolve() -> (SourceFile, PackageTypes) {
        let file = GoFrontend::new()
            .parse(Path::new("/pkg/store.go"), SRC)
            .expect("parse");
        let types = PackageTypes::new(std::slice::from_ref(&file));
        (file, types)
    }

    fn define_types(file: &SourceFile, types: &PackageTypes) -> Vec<Option<String>> {
        let run = file.functions.iter().find(|f| f.name == "Run").expect("Run");
        let scope = Scope::for_function(file, run);
        run.body
            .as_ref()
            .expect("body")
            .stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Define(assign) => Some(
                    types
                        .type_of(&assign.rhs[0], &scope)
                        .map(|t| t.as_str().to_string()),
                ),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn resolves_common_shapes() {
        let (file, types) = resolve();
        let resolved = define_types(&file, &types);
        let error = Some("error".to_string());
        assert_eq!(
            resolved,
            vec![
                error.clone(),
                error.clone(),
                error.clone(),
                error.clone(),
                None,
                error.clone(),
                error.clone(),
                error,
                Some("int".to_string()),
            ]
        );
    }

    #[test]
    fn method_results_are_keyed_by_receiver_base_type() {
        let (_, types) = resolve();
        assert_eq!(
            types
                .methods
                .get(&("Store".to_string(), "load".to_string()))
                .map(Vec::len),
            Some(2)
        );
    }

    #[test]
    fn shadowed_import_is_not_resolved() {
        let (file, types) = resolve();
        let mut scope = Scope::new(&file.imports);
        scope.declare("errors", None);
        let call = match &file.globals[0].values[0] {
            Expr::Call(call) => call.clone(),
            other => panic!("unexpected initializer {other:?}"),
        };
        assert_eq!(types.results_of(&call, &scope), None);
    }

    const DEPS: &str = r#"package svc

type Store struct{}

func (s *Store) Flush() error { return nil }

type Repo interface {
	Save() error
	Load(id string) (string, error)
}

type Cache interface {
	Repo
}

type Base struct {
	*Store
	name string
}

type Svc struct {
	Base
	store *Store
	repo  Repo
	cache Cache
}

func (s *Svc) Run() {
	a := s.store.Flush()
	b := s.repo.Save()
	c := s.Flush()
	d := s.cache.Save()
	e := s.name
	f := s.Store
	g := s.missing.Save()
}
"#;

    #[test]
    fn resolves_through_fields_and_interfaces() {
        let file = GoFrontend::new()
            .parse(Path::new("/pkg/svc.go"), DEPS)
            .expect("parse");
        let types = PackageTypes::new(std::slice::from_ref(&file));
        let resolved = define_types(&file, &types);
        let error = Some("error".to_string());
        assert_eq!(
            resolved,
            vec![
                error.clone(),
                error.clone(),
                error.clone(),
                error,
                Some("string".to_string()),
                Some("Store".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn interface_methods_join_the_method_table() {
        let file = GoFrontend::new()
            .parse(Path::new("/pkg/svc.go"), DEPS)
            .expect("parse");
        let types = PackageTypes::new(std::slice::from_ref(&file));
        assert_eq!(
            types
                .method_results("Repo", "Load", EMBED_DEPTH)
                .map(|r| r.len()),
            Some(2)
        );
        assert_eq!(
            types
                .field_type("Svc", "repo", EMBED_DEPTH)
                .map(|t| t.as_str().to_string()),
            Some("Repo".to_string())
        );
    }
}
