//! Lexical scope tracking.
//!
//! The tracker is a stack of open scopes, each closed implicitly once an event
//! arrives past its end boundary. Scopes only own a counter; the names that were
//! handed out live in one flat map keyed by declaration identity, so a name can
//! be recalled long after the scope that produced it has closed.

use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::span::Position;
use crate::symbol::SymbolAllocator;

/// Where a nested function body or block starts counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopePolicy {
    /// Continue from the enclosing scope's counter, so inner names never shadow
    /// outer ones.
    #[default]
    InheritFromEnclosing,
    /// Start again from zero, skipping any index still held by a declaration of an
    /// enclosing open scope.
    RestartPerScope,
}

#[derive(Debug)]
struct Scope {
    /// Inclusive: the scope is current up to and including this position.
    end: Position,
    next_index: usize,
    /// Opens a separate name space (the file itself, or the members of a record).
    fresh: bool,
    /// Rendered indices of the declarations registered directly in this scope.
    held: FxHashSet<usize>,
}

impl Scope {
    fn new(end: Position, next_index: usize, fresh: bool) -> Self {
        Self {
            end,
            next_index,
            fresh,
            held: FxHashSet::default(),
        }
    }
}

/// Assigns short names to declarations as they are encountered in source order.
///
/// `I` is the frontend's canonical declaration identity. The tracker assumes
/// nothing about it beyond equality and hashing.
#[derive(Debug)]
pub struct ScopeTracker<I> {
    allocator: SymbolAllocator,
    policy: ScopePolicy,
    /// Never empty: the bottom scope spans the whole file.
    scopes: Vec<Scope>,
    /// Identity -> index passed to the allocator when the identity was registered.
    declarations: FxHashMap<I, usize>,
    last_declaration: Position,
}

impl<I: Eq + Hash> ScopeTracker<I> {
    /// Create a tracker whose file-level scope ends at `file_end`.
    pub fn new(allocator: SymbolAllocator, file_end: Position) -> Self {
        Self {
            allocator,
            policy: ScopePolicy::default(),
            scopes: vec![Scope::new(file_end, 0, true)],
            declarations: FxHashMap::default(),
            last_declaration: 0,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ScopePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn allocator(&self) -> &SymbolAllocator {
        &self.allocator
    }

    /// Close every scope that ends before `position`. The file scope is never closed.
    pub fn advance_to(&mut self, position: Position) {
        while self.scopes.len() > 1 {
            if self.top().end >= position {
                break;
            }
            self.scopes.pop();
        }
    }

    /// Assign a short name to the declaration at `position` and return it.
    ///
    /// The first registration of an identity is authoritative: registering it again
    /// (a prototype followed by its definition, say) returns the same name and
    /// consumes no index.
    pub fn register(&mut self, identity: I, position: Position) -> String {
        debug_assert!(
            position >= self.last_declaration,
            "declaration at {position} delivered after one at {}",
            self.last_declaration
        );
        self.last_declaration = position;
        self.advance_to(position);

        if let Some(&index) = self.declarations.get(&identity) {
            return self.allocator.allocate(index).1;
        }

        let (index, next, name) = self.claim();
        let top = self.top_mut();
        top.next_index = next;
        top.held.insert(next - 1);
        self.declarations.insert(identity, index);
        name
    }

    /// Short name of `identity`, or `original` if it was never registered.
    pub fn lookup(&self, identity: &I, original: &str) -> String {
        match self.declarations.get(identity) {
            Some(&index) => self.allocator.allocate(index).1,
            None => original.to_string(),
        }
    }

    /// Index stored for `identity`, if registered.
    pub fn index_of(&self, identity: &I) -> Option<usize> {
        self.declarations.get(identity).copied()
    }

    /// Open a scope ending at `end` whose names start again from zero.
    pub fn push_fresh(&mut self, end: Position) {
        self.advance_to(end);
        self.push(Scope::new(end, 0, true));
    }

    /// Open a scope ending at `end` that continues the current scope's numbering
    /// (or restarts it, under [`ScopePolicy::RestartPerScope`]).
    pub fn push_inherited(&mut self, end: Position) {
        self.advance_to(end);
        let next_index = match self.policy {
            ScopePolicy::InheritFromEnclosing => self.top().next_index,
            ScopePolicy::RestartPerScope => 0,
        };
        self.push(Scope::new(end, next_index, false));
    }

    /// Number of open scopes, including the file scope.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Next index the current scope would hand out.
    pub fn current_next_index(&self) -> usize {
        self.top().next_index
    }

    pub fn registered_count(&self) -> usize {
        self.declarations.len()
    }

    fn push(&mut self, scope: Scope) {
        debug_assert!(
            self.scopes.len() == 1 || scope.end <= self.top().end,
            "scope ending at {} nested in one ending at {}",
            scope.end,
            self.top().end
        );
        self.scopes.push(scope);
    }

    /// Pick the index for a new declaration in the current scope.
    ///
    /// Returns `(stored index, next free index, name)`.
    fn claim(&self) -> (usize, usize, String) {
        let mut candidate = self.top().next_index;
        loop {
            let (next, name) = self.allocator.allocate(candidate);
            if self.policy == ScopePolicy::InheritFromEnclosing || !self.held_outside(next - 1) {
                return (candidate, next, name);
            }
            candidate = next;
        }
    }

    /// Whether an enclosing open scope, up to the nearest fresh one, holds `rendered`.
    fn held_outside(&self, rendered: usize) -> bool {
        let (top, enclosing) = self.scopes.split_last().expect("file scope is never popped");
        if top.fresh {
            return false;
        }
        for scope in enclosing.iter().rev() {
            if scope.held.contains(&rendered) {
                return true;
            }
            if scope.fresh {
                break;
            }
        }
        false
    }

    fn top(&self) -> &Scope {
        self.scopes.last().expect("file scope is never popped")
    }

    fn top_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("file scope is never popped")
    }
}
