//! Language-neutral syntax model.
//!
//! Frontends lower their concrete syntax trees into these types so that rules
//! never depend on a particular parser. The model keeps only what the rules
//! inspect: function signatures, statements in source order, the expression
//! shapes that matter for matching (identifiers, selectors, calls, unary
//! operators), and every comment with its line.
//!
//! Anything a rule never looks at is lowered into [`Stmt::Other`] or
//! [`Expr::Other`], which still carry their child expressions so that
//! full-depth traversal does not miss nested function literals.

use std::path::PathBuf;

/// A position in a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number in bytes (1-indexed).
    pub column: usize,
    /// Byte offset from the start of the file.
    pub offset: usize,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// Textual type expression as written in source, whitespace-normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef(String);

/// Name of the built-in error interface type.
pub const ERROR_TYPE: &str = "error";

impl TypeRef {
    /// Creates a type reference, collapsing runs of whitespace.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// The built-in error interface.
    #[must_use]
    pub fn error() -> Self {
        Self(ERROR_TYPE.to_string())
    }

    /// Returns the type text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this names the error interface exactly.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.0 == ERROR_TYPE
    }

    /// Named type with pointer indirection and type arguments stripped.
    ///
    /// `*Stack[T]` becomes `Stack`.
    #[must_use]
    pub fn base_name(&self) -> &str {
        let name = self.0.trim_start_matches('*').trim();
        name.split('[').next().unwrap_or(name).trim()
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// Identifier text.
    pub name: String,
    /// Where it appears.
    pub pos: Position,
}

impl Ident {
    /// Creates an identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, pos: Position) -> Self {
        Self {
            name: name.into(),
            pos,
        }
    }

    /// True if this identifier is literally `name`.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

/// A source comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Raw comment text including its markers (`//` or `/* */`).
    pub text: String,
    /// Start of the comment.
    pub pos: Position,
    /// Line on which the comment ends (differs from `pos.line` for block comments).
    pub end_line: usize,
    /// True if only whitespace precedes the comment on its first line.
    pub own_line: bool,
}

/// An import of another package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Explicit local name, if any.
    pub alias: Option<String>,
    /// Import path without quotes.
    pub path: String,
}

impl Import {
    /// Name under which the package is referenced in the importing file.
    ///
    /// Falls back to the last path element, skipping a major-version suffix
    /// such as `/v2`.
    #[must_use]
    pub fn local_name(&self) -> &str {
        if let Some(alias) = &self.alias {
            return alias;
        }
        let mut segments = self.path.rsplit('/');
        let last = segments.next().unwrap_or(&self.path);
        let is_version = last.len() > 1
            && last.starts_with('v')
            && last[1..].chars().all(|c| c.is_ascii_digit());
        if is_version {
            segments.next().unwrap_or(last)
        } else {
            last
        }
    }
}

/// A named or anonymous parameter, result or receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Bound name, `None` when the declaration is type-only.
    pub name: Option<String>,
    /// Declared type.
    pub ty: TypeRef,
}

/// A method in an interface's method set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    /// Method name.
    pub name: String,
    /// Declared results.
    pub results: Vec<Field>,
}

/// A package-level named type.
///
/// Struct fields and interface methods are kept; embedded types appear as
/// fields without a name. Any other underlying type leaves both lists empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Declared type name.
    pub name: String,
    /// Struct fields in declaration order, one entry per bound name.
    pub fields: Vec<Field>,
    /// Interface methods.
    pub methods: Vec<MethodSig>,
    /// Position of the type name.
    pub pos: Position,
}

impl TypeDecl {
    /// Types embedded in the struct or interface.
    pub fn embedded(&self) -> impl Iterator<Item = &TypeRef> {
        self.fields
            .iter()
            .filter(|f| f.name.is_none())
            .map(|f| &f.ty)
    }
}

/// A function or method declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    /// Function name.
    pub name: String,
    /// Receiver binding for methods.
    pub receiver: Option<Field>,
    /// Parameters in declaration order, one entry per bound name.
    pub params: Vec<Field>,
    /// Declared results, one entry per bound name.
    pub results: Vec<Field>,
    /// Body, absent for forward declarations.
    pub body: Option<Block>,
    /// Position of the declaration keyword.
    pub pos: Position,
    /// Length in bytes of the signature (declaration keyword up to the body).
    pub signature_len: usize,
    /// Documentation comments immediately preceding the declaration.
    pub doc: Vec<Comment>,
}

impl FuncDecl {
    /// Receiver name, or the empty string for functions and unnamed receivers.
    #[must_use]
    pub fn receiver_name(&self) -> &str {
        self.receiver
            .as_ref()
            .and_then(|r| r.name.as_deref())
            .unwrap_or("")
    }

    /// Every field bound in the function scope: receiver, params and results.
    pub fn signature_fields(&self) -> impl Iterator<Item = &Field> {
        self.receiver
            .iter()
            .chain(self.params.iter())
            .chain(self.results.iter())
    }
}

/// A braced statement list.
#[derive(Debug, Clone, Default)]
pub struct Block {
    /// Statements in source order.
    pub stmts: Vec<Stmt>,
    /// Position of the opening brace.
    pub pos: Position,
}

/// One `name, ... [type] [= values]` clause of a variable declaration.
#[derive(Debug, Clone)]
pub struct VarSpec {
    /// Declared names.
    pub names: Vec<Ident>,
    /// Explicit type annotation.
    pub ty: Option<TypeRef>,
    /// Initializer expressions, aligned with `names` when present.
    pub values: Vec<Expr>,
}

/// `lhs = rhs`, `lhs op= rhs` or `lhs := rhs`.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Left-hand side expressions.
    pub lhs: Vec<Expr>,
    /// Right-hand side expressions.
    pub rhs: Vec<Expr>,
    /// Position of the statement.
    pub pos: Position,
}

/// `if [init;] cond { ... } [else ...]`.
#[derive(Debug, Clone)]
pub struct IfStmt {
    /// Initializer statement.
    pub init: Option<Box<Stmt>>,
    /// Condition expression.
    pub cond: Expr,
    /// Consequence block.
    pub then: Block,
    /// `else` branch: a block or another `if`.
    pub els: Option<Box<Stmt>>,
}

/// Any `for` loop. Range clauses are lowered into `init`.
#[derive(Debug, Clone)]
pub struct ForStmt {
    /// Initializer, or the range assignment for `for k, v := range x`.
    pub init: Option<Box<Stmt>>,
    /// Loop condition.
    pub cond: Option<Expr>,
    /// Post statement.
    pub post: Option<Box<Stmt>>,
    /// Loop body.
    pub body: Block,
}

/// Expression, type and select switches.
#[derive(Debug, Clone)]
pub struct SwitchStmt {
    /// Initializer statement.
    pub init: Option<Box<Stmt>>,
    /// Switch tag, or the operand of a type switch.
    pub tag: Option<Expr>,
    /// Case clauses in source order.
    pub clauses: Vec<CaseClause>,
}

/// A single `case`/`default` clause.
#[derive(Debug, Clone, Default)]
pub struct CaseClause {
    /// Case expressions (empty for `default` and type cases).
    pub exprs: Vec<Expr>,
    /// Communication statement of a `select` case.
    pub comm: Option<Box<Stmt>>,
    /// Clause body.
    pub body: Vec<Stmt>,
}

/// Statement kinds.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `var ...` declaration.
    Var(Vec<VarSpec>),
    /// Defining assignment (`:=`), which may introduce new bindings.
    Define(Assignment),
    /// Plain or compound assignment.
    Assign(Assignment),
    /// `defer call(...)`.
    Defer(CallExpr),
    /// `go call(...)`.
    Go(CallExpr),
    /// `return ...`.
    Return(Vec<Expr>),
    /// Expression statement.
    Expr(Expr),
    /// Nested block.
    Block(Block),
    /// `if` statement.
    If(IfStmt),
    /// `for` statement.
    For(ForStmt),
    /// `switch` or `select` statement.
    Switch(SwitchStmt),
    /// Labeled statement.
    Labeled(Box<Stmt>),
    /// Anything else, with its nested expressions.
    Other(Vec<Expr>),
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `&x`
    Addr,
    /// `*x`
    Deref,
    /// `-x`
    Neg,
    /// `+x`
    Plus,
    /// `!x`
    Not,
    /// `^x`
    BitNot,
    /// `<-x`
    Recv,
}

impl UnaryOp {
    /// Parses an operator token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "&" => Some(Self::Addr),
            "*" => Some(Self::Deref),
            "-" => Some(Self::Neg),
            "+" => Some(Self::Plus),
            "!" => Some(Self::Not),
            "^" => Some(Self::BitNot),
            "<-" => Some(Self::Recv),
            _ => None,
        }
    }
}

/// A call expression.
#[derive(Debug, Clone)]
pub struct CallExpr {
    /// Called expression.
    pub callee: Box<Expr>,
    /// Arguments in order.
    pub args: Vec<Expr>,
    /// Position of the call.
    pub pos: Position,
}

/// An anonymous function.
#[derive(Debug, Clone)]
pub struct FuncLit {
    /// Parameters.
    pub params: Vec<Field>,
    /// Declared results.
    pub results: Vec<Field>,
    /// Body.
    pub body: Block,
    /// Position of the `func` keyword.
    pub pos: Position,
}

/// Expression kinds.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Identifier.
    Ident(Ident),
    /// The `nil` literal.
    Nil(Position),
    /// `operand.field`.
    Selector {
        /// Selected-from expression.
        operand: Box<Expr>,
        /// Selected member.
        field: Ident,
    },
    /// Function or method call.
    Call(CallExpr),
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
        /// Position of the operator.
        pos: Position,
    },
    /// `(inner)`.
    Paren(Box<Expr>),
    /// `operand.(Type)`.
    TypeAssert {
        /// Asserted expression.
        operand: Box<Expr>,
        /// Asserted type.
        ty: TypeRef,
    },
    /// Anonymous function.
    FuncLit(Box<FuncLit>),
    /// Basic literal.
    Literal {
        /// Literal text.
        text: String,
        /// Position.
        pos: Position,
    },
    /// Any other expression, with its nested expressions.
    Other {
        /// Child expressions.
        children: Vec<Expr>,
        /// Position.
        pos: Position,
    },
}

impl Expr {
    /// Returns the identifier if this is a bare identifier.
    #[must_use]
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Self::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    /// True if this is the bare identifier `name`.
    #[must_use]
    pub fn is_ident(&self, name: &str) -> bool {
        self.as_ident().is_some_and(|i| i.is(name))
    }

    /// Start position of the expression.
    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            Self::Ident(ident) => ident.pos,
            Self::Nil(pos)
            | Self::Unary { pos, .. }
            | Self::Literal { pos, .. }
            | Self::Other { pos, .. } => *pos,
            Self::Selector { operand, .. } | Self::TypeAssert { operand, .. } => operand.pos(),
            Self::Call(call) => call.pos,
            Self::Paren(inner) => inner.pos(),
            Self::FuncLit(lit) => lit.pos,
        }
    }
}

/// One parsed source file.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Declared package name.
    pub package: String,
    /// Imports.
    pub imports: Vec<Import>,
    /// Function and method declarations in source order.
    pub functions: Vec<FuncDecl>,
    /// Package-level variable declarations.
    pub globals: Vec<VarSpec>,
    /// Package-level type declarations.
    pub types: Vec<TypeDecl>,
    /// Every comment in the file, in source order.
    pub comments: Vec<Comment>,
}

impl SourceFile {
    /// Creates an empty file model for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}
