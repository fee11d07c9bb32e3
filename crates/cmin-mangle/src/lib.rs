//! cmin-mangle: scope-aware identifier shortening for C
//!
//! The engine never looks at source text. A frontend that has already parsed the
//! file and resolved every identifier walks it in source order and reports what
//! it sees as [`Event`]s; the engine answers with [`Edit`]s.
//!
//! # Design
//!
//! 1. **Allocator** ([`SymbolAllocator`])
//!    - Pure map from an integer to a short name: `0 → a`, `51 → Z`, `52 → aa`
//!    - Reserved words (C keywords by default) are skipped
//!
//! 2. **Scope tracker** ([`ScopeTracker`])
//!    - Stack of open scopes, each closed once an event arrives past its end
//!    - Each scope owns only a counter; names live in one identity → index map
//!
//! 3. **Policy** ([`Minifier`])
//!    - Ignores events spelled outside the file under transformation
//!    - Renames variables, parameters, fields and functions (except the entry point)
//!    - Short names never spell a kept identifier (typedefs, enum constants, ...)
//!    - Function bodies and blocks continue the enclosing numbering,
//!      record members start from zero
//!
//! # Example
//!
//! ```
//! use cmin_mangle::{mangle, DeclKind, Declaration, Event, FileId, MangleOptions};
//!
//! let source = "int counter;";
//! let events = vec![Event::Declaration(Declaration {
//!     identity: "c:@counter",
//!     file: FileId(0),
//!     position: 4,
//!     name: "counter".to_string(),
//!     kind: DeclKind::Variable,
//!     body_end: None,
//! })];
//! let (edits, _stats) = mangle(&events, &MangleOptions::default(), FileId(0), source.len() as u32);
//! assert_eq!(edits[0].text, "a");
//! ```

mod edit;
mod event;
mod policy;
mod scope;
mod span;
mod symbol;

pub use edit::{Edit, EditSink};
pub use event::{DeclKind, Declaration, Event, RefKind, Reference, ScopeBoundary, ScopeKind};
pub use policy::{mangle, MangleOptions, MangleStats, Minifier};
pub use scope::{ScopePolicy, ScopeTracker};
pub use span::{FileId, LineIndex, Position, Span};
pub use symbol::{render, SymbolAllocator, C_KEYWORDS};
