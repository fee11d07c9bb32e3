//! Events delivered by the frontend, in source order.

use crate::span::{FileId, Position};

/// Kind of a declared entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DeclKind {
    /// Local or global variable.
    Variable,
    Parameter,
    Function,
    /// Member of a struct or union.
    Field,
    /// Struct or union tag.
    Record,
    Typedef,
    /// Enumeration tag.
    Enum,
    EnumConstant,
}

/// How a declaration is referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RefKind {
    /// Plain identifier expression.
    #[default]
    DeclRef,
    /// `x.member` or `p->member`.
    Member,
    /// `.member = ...` in a designated initializer.
    Designator,
}

/// Naming behaviour of a new lexical region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ScopeKind {
    /// Counting restarts at zero.
    Fresh,
    /// Counting continues from the enclosing scope.
    Inherited,
}

/// A declaration of an entity, seen at its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<I> {
    pub identity: I,
    pub file: FileId,
    /// Offset of the declared name.
    pub position: Position,
    /// Name as spelled at the declaration.
    pub name: String,
    pub kind: DeclKind,
    /// Inclusive end of the body, for function definitions and record definitions.
    pub body_end: Option<Position>,
}

/// A use of a previously declared entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<I> {
    pub target: I,
    pub file: FileId,
    pub position: Position,
    /// The target's declared name, which is what is spelled at `position`.
    pub name: String,
    pub kind: RefKind,
}

/// Entry into a lexical region that ends at `end` (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeBoundary {
    pub kind: ScopeKind,
    pub file: FileId,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<I> {
    Declaration(Declaration<I>),
    Reference(Reference<I>),
    ScopeBoundary(ScopeBoundary),
}

impl<I> Event<I> {
    /// File the event was spelled in.
    pub fn file(&self) -> FileId {
        match self {
            Event::Declaration(decl) => decl.file,
            Event::Reference(reference) => reference.file,
            Event::ScopeBoundary(boundary) => boundary.file,
        }
    }
}

impl<I> From<Declaration<I>> for Event<I> {
    fn from(decl: Declaration<I>) -> Self {
        Event::Declaration(decl)
    }
}

impl<I> From<Reference<I>> for Event<I> {
    fn from(reference: Reference<I>) -> Self {
        Event::Reference(reference)
    }
}

impl<I> From<ScopeBoundary> for Event<I> {
    fn from(boundary: ScopeBoundary) -> Self {
        Event::ScopeBoundary(boundary)
    }
}
