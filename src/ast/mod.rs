//! @acp:module "Syntax Tree"
//! @acp:summary "Parsed representation of one Go source file"
//! @acp:domain analysis
//! @acp:layer model
//!
//! Only the parts of a file needed for build tag analysis are kept:
//! package name, every comment (grouped as Go groups them) and the
//! top-level declarations. A tree is immutable once produced by a
//! [`SourceParser`].

pub mod go;

pub use go::{GoParser, SourceParser};

use std::fmt;

/// @acp:summary "One parsed source file"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    /// Path the file was read from
    pub path: String,
    /// Name from the package clause
    pub package: Option<String>,
    /// Comment groups in source order
    pub comments: Vec<CommentGroup>,
    /// Top-level declarations in source order
    pub decls: Vec<Decl>,
}

impl SyntaxTree {
    /// Iterate every comment of the file in source order
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().flat_map(|group| group.list.iter())
    }
}

/// A single `//` or `/* */` comment, text kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    /// 1-based line of the comment start
    pub line: usize,
}

/// Adjacent comments with no blank line between them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentGroup {
    pub list: Vec<Comment>,
}

/// Top-level declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    /// `func Name(...)` or `func (r Recv) Name(...)`
    Func {
        name: String,
        receiver: Option<TypeExpr>,
    },
    /// `import`, `const`, `var` or `type` declaration
    Gen { kind: GenKind, specs: Vec<Spec> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenKind {
    Import,
    Const,
    Var,
    Type,
}

/// One spec inside a general declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spec {
    Import { path: String },
    Type { name: String },
    /// Constant or variable spec; `const a, b = 1, 2` lists both names
    Value { names: Vec<String> },
}

/// @acp:summary "Type expression as written in a method receiver"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Ident(String),
    Pointer(Box<TypeExpr>),
    Qualified { package: String, name: String },
    Generic { base: Box<TypeExpr>, args: Vec<TypeExpr> },
    Paren(Box<TypeExpr>),
    /// Expression shape this crate does not render; holds the node kind
    Unsupported(String),
}

impl TypeExpr {
    /// @acp:summary "Render the expression the way gofmt prints it"
    /// Returns `None` if any part of the expression is unsupported.
    pub fn render(&self) -> Option<String> {
        match self {
            TypeExpr::Ident(name) => Some(name.clone()),
            TypeExpr::Pointer(inner) => Some(format!("*{}", inner.render()?)),
            TypeExpr::Qualified { package, name } => Some(format!("{}.{}", package, name)),
            TypeExpr::Generic { base, args } => {
                let args = args
                    .iter()
                    .map(TypeExpr::render)
                    .collect::<Option<Vec<_>>>()?;
                Some(format!("{}[{}]", base.render()?, args.join(", ")))
            }
            TypeExpr::Paren(inner) => Some(format!("({})", inner.render()?)),
            TypeExpr::Unsupported(_) => None,
        }
    }
}

/// @acp:summary "Lookup key of a declared identifier"
/// Methods are qualified by their rendered receiver type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclarationKey {
    pub receiver: Option<String>,
    pub name: String,
}

impl DeclarationKey {
    pub fn bare<S: Into<String>>(name: S) -> Self {
        Self {
            receiver: None,
            name: name.into(),
        }
    }

    pub fn method<R: Into<String>, S: Into<String>>(receiver: R, name: S) -> Self {
        Self {
            receiver: Some(receiver.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for DeclarationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(receiver) => write!(f, "{}.{}", receiver, self.name),
            None => f.write_str(&self.name),
        }
    }
}
