//! Renaming decisions: which events touch the scope tracker and which edits
//! come out of them.

use std::hash::Hash;

use crate::edit::{Edit, EditSink};
use crate::event::{DeclKind, Declaration, Event, Reference, ScopeBoundary, ScopeKind};
use crate::scope::{ScopePolicy, ScopeTracker};
use crate::span::{FileId, Position, Span};
use crate::symbol::{SymbolAllocator, C_KEYWORDS};

/// Options for name mangling.
#[derive(Debug, Clone)]
pub struct MangleOptions {
    /// Function name that must keep its spelling.
    pub entry_point: String,
    /// Words never produced as short names.
    pub reserved: Vec<String>,
    pub scope_policy: ScopePolicy,
}

impl Default for MangleOptions {
    fn default() -> Self {
        Self {
            entry_point: "main".to_string(),
            reserved: C_KEYWORDS.iter().map(|kw| (*kw).to_string()).collect(),
            scope_policy: ScopePolicy::default(),
        }
    }
}

impl MangleOptions {
    /// Add words to the reserved set on top of the current ones.
    #[must_use]
    pub fn with_reserved<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(words.into_iter().map(Into::into));
        self
    }

    /// Reserve the spellings of identifiers in `events` that keep their names.
    ///
    /// Typedef names, enum constants, the entry point and declarations outside
    /// `file` live in the same namespace as the names being shortened, so a short
    /// name must never spell one of them. Record and enum tags have their own
    /// namespace and are left out.
    #[must_use]
    pub fn with_kept_names<I>(self, events: &[Event<I>], file: FileId) -> Self {
        let entry_point = self.entry_point.clone();
        let kept: Vec<String> = events
            .iter()
            .filter_map(|event| match event {
                Event::Declaration(decl)
                    if decl.file != file || keeps_spelling(decl, &entry_point) =>
                {
                    Some(decl.name.clone())
                }
                _ => None,
            })
            .collect();
        self.with_reserved(kept).with_reserved([entry_point])
    }

    pub fn allocator(&self) -> SymbolAllocator {
        SymbolAllocator::with_reserved(self.reserved.iter().cloned())
    }
}

/// Counters for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MangleStats {
    /// Declaration sites given a short name.
    pub declarations: usize,
    /// Reference sites rewritten.
    pub references: usize,
    /// Declarations in the file that keep their name.
    pub kept: usize,
    /// Events spelled in other files.
    pub external: usize,
    /// Bytes removed by the emitted edits.
    pub bytes_saved: i64,
}

/// Drives a [`ScopeTracker`] from frontend events for one file and forwards the
/// resulting edits to a sink.
#[derive(Debug)]
pub struct Minifier<I, S> {
    tracker: ScopeTracker<I>,
    entry_point: String,
    file: FileId,
    sink: S,
    stats: MangleStats,
}

impl<I, S> Minifier<I, S>
where
    I: Eq + Hash + Clone,
    S: EditSink,
{
    /// `file` is the file under transformation and `file_end` its length in bytes.
    ///
    /// A streaming minifier cannot see names declared later; callers holding the
    /// whole event list should build `options` with
    /// [`MangleOptions::with_kept_names`].
    pub fn new(options: &MangleOptions, file: FileId, file_end: Position, sink: S) -> Self {
        Self {
            tracker: ScopeTracker::new(options.allocator(), file_end)
                .with_policy(options.scope_policy),
            entry_point: options.entry_point.clone(),
            file,
            sink,
            stats: MangleStats::default(),
        }
    }

    /// Handle one event. Returns the replacement text if an edit was emitted.
    pub fn handle(&mut self, event: &Event<I>) -> Option<String> {
        if event.file() != self.file {
            self.stats.external += 1;
            return None;
        }
        match event {
            Event::Declaration(decl) => self.declare(decl),
            Event::Reference(reference) => self.reference(reference),
            Event::ScopeBoundary(boundary) => {
                self.enter(boundary);
                None
            }
        }
    }

    /// Whether a declaration in the file gets a short name.
    pub fn is_eligible(&self, decl: &Declaration<I>) -> bool {
        match decl.kind {
            DeclKind::Variable | DeclKind::Parameter | DeclKind::Field => true,
            DeclKind::Function => decl.name != self.entry_point,
            DeclKind::Record | DeclKind::Typedef | DeclKind::Enum | DeclKind::EnumConstant => {
                false
            }
        }
    }

    pub fn finish(self) -> (S, MangleStats) {
        (self.sink, self.stats)
    }

    fn declare(&mut self, decl: &Declaration<I>) -> Option<String> {
        // The name goes into the enclosing scope before the body opens, so the
        // function is visible to what follows it.
        let renamed = if self.is_eligible(decl) {
            let name = self.tracker.register(decl.identity.clone(), decl.position);
            self.stats.declarations += 1;
            self.emit(decl.position, &decl.name, name)
        } else {
            self.stats.kept += 1;
            None
        };

        match (decl.kind, decl.body_end) {
            (DeclKind::Function, Some(end)) => self.tracker.push_inherited(end),
            (DeclKind::Record, Some(end)) => self.tracker.push_fresh(end),
            _ => {}
        }
        renamed
    }

    fn reference(&mut self, reference: &Reference<I>) -> Option<String> {
        let name = self.tracker.lookup(&reference.target, &reference.name);
        let renamed = self.emit(reference.position, &reference.name, name);
        if renamed.is_some() {
            self.stats.references += 1;
        }
        renamed
    }

    fn enter(&mut self, boundary: &ScopeBoundary) {
        match boundary.kind {
            ScopeKind::Fresh => self.tracker.push_fresh(boundary.end),
            ScopeKind::Inherited => self.tracker.push_inherited(boundary.end),
        }
    }

    fn emit(&mut self, position: Position, original: &str, name: String) -> Option<String> {
        if name == original {
            return None;
        }
        let edit = Edit::new(Span::at(position, original.len() as u32), name.clone());
        self.stats.bytes_saved += edit.saved();
        self.sink.replace(edit);
        Some(name)
    }
}

/// In-file declarations that keep a spelling visible to renamed identifiers.
fn keeps_spelling<I>(decl: &Declaration<I>, entry_point: &str) -> bool {
    match decl.kind {
        DeclKind::Typedef | DeclKind::EnumConstant => true,
        DeclKind::Function => decl.name == entry_point,
        DeclKind::Variable
        | DeclKind::Parameter
        | DeclKind::Field
        | DeclKind::Record
        | DeclKind::Enum => false,
    }
}

/// Run every event through a fresh [`Minifier`] and collect the edits.
///
/// Kept spellings are reserved first (see [`MangleOptions::with_kept_names`]).
pub fn mangle<I>(
    events: &[Event<I>],
    options: &MangleOptions,
    file: FileId,
    file_end: Position,
) -> (Vec<Edit>, MangleStats)
where
    I: Eq + Hash + Clone,
{
    let options = options.clone().with_kept_names(events, file);
    let mut minifier = Minifier::new(&options, file, file_end, Vec::new());
    for event in events {
        minifier.handle(event);
    }
    minifier.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RefKind;

    const MAIN: FileId = FileId(0);
    const HEADER: FileId = FileId(1);

    /// Builds events for `source` by locating spellings in it.
    struct Trace<'s> {
        source: &'s str,
        events: Vec<Event<&'static str>>,
    }

    impl<'s> Trace<'s> {
        fn new(source: &'s str) -> Self {
            Self {
                source,
                events: Vec::new(),
            }
        }

        /// Offset of the `nth` occurrence of `needle`.
        fn at(&self, needle: &str, nth: usize) -> Position {
            self.source
                .match_indices(needle)
                .nth(nth)
                .map(|(i, _)| i as Position)
                .unwrap_or_else(|| panic!("`{needle}` #{nth} not in source"))
        }

        fn decl(&mut self, id: &'static str, name: &str, nth: usize, kind: DeclKind) -> &mut Self {
            self.declare(id, name, nth, kind, None)
        }

        fn body(
            &mut self,
            id: &'static str,
            name: &str,
            nth: usize,
            kind: DeclKind,
            close: usize,
        ) -> &mut Self {
            let end = self.at("}", close);
            self.declare(id, name, nth, kind, Some(end))
        }

        fn declare(
            &mut self,
            id: &'static str,
            name: &str,
            nth: usize,
            kind: DeclKind,
            body_end: Option<Position>,
        ) -> &mut Self {
            let position = self.at(name, nth);
            self.events.push(Event::Declaration(Declaration {
                identity: id,
                file: MAIN,
                position,
                name: name.to_string(),
                kind,
                body_end,
            }));
            self
        }

        fn block(&mut self, close: usize) -> &mut Self {
            self.scope(ScopeKind::Inherited, close)
        }

        fn scope(&mut self, kind: ScopeKind, close: usize) -> &mut Self {
            let end = self.at("}", close);
            self.events.push(Event::ScopeBoundary(ScopeBoundary {
                kind,
                file: MAIN,
                end,
            }));
            self
        }

        fn refer(&mut self, id: &'static str, name: &str, nth: usize, kind: RefKind) -> &mut Self {
            let position = self.at(name, nth);
            self.events.push(Event::Reference(Reference {
                target: id,
                file: MAIN,
                position,
                name: name.to_string(),
                kind,
            }));
            self
        }

        fn run(&self, options: &MangleOptions) -> (String, MangleStats) {
            let (mut edits, stats) =
                mangle(&self.events, options, MAIN, self.source.len() as Position);
            edits.sort_by_key(|edit| edit.span.start);
            let mut out = String::new();
            let mut cursor = 0;
            for edit in &edits {
                out.push_str(&self.source[cursor..edit.span.start as usize]);
                out.push_str(&edit.text);
                cursor = edit.span.end as usize;
            }
            out.push_str(&self.source[cursor..]);
            (out, stats)
        }
    }

    #[test]
    fn test_sibling_locals_in_entry_point() {
        let source = "int main(void) {\n    int alpha = 1;\n    int beta = alpha + 1;\n    return beta;\n}\n";
        let mut trace = Trace::new(source);
        trace
            .body("main", "main", 0, DeclKind::Function, 0)
            .block(0)
            .decl("alpha", "alpha", 0, DeclKind::Variable)
            .decl("beta", "beta", 0, DeclKind::Variable)
            .refer("alpha", "alpha", 1, RefKind::DeclRef)
            .refer("beta", "beta", 1, RefKind::DeclRef);

        let (out, stats) = trace.run(&MangleOptions::default());
        assert_eq!(
            out,
            "int main(void) {\n    int a = 1;\n    int b = a + 1;\n    return b;\n}\n"
        );
        assert_eq!(stats.declarations, 2);
        assert_eq!(stats.references, 2);
        assert_eq!(stats.kept, 1);
        assert_eq!(stats.bytes_saved, 4 + 3 + 4 + 3);
    }

    #[test]
    fn test_record_members_start_fresh() {
        let source = "int total;\nstruct box { int width; int height; };\n\
                      int area(struct box bx) { return bx.width * bx.height + total; }\n";
        let mut trace = Trace::new(source);
        trace
            .decl("total", "total", 0, DeclKind::Variable)
            .body("box", "box", 0, DeclKind::Record, 0)
            .decl("width", "width", 0, DeclKind::Field)
            .decl("height", "height", 0, DeclKind::Field)
            .body("area", "area", 0, DeclKind::Function, 1)
            .decl("bx", "bx", 0, DeclKind::Parameter)
            .block(1)
            .refer("bx", "bx", 1, RefKind::DeclRef)
            .refer("width", "width", 1, RefKind::Member)
            .refer("bx", "bx", 2, RefKind::DeclRef)
            .refer("height", "height", 1, RefKind::Member)
            .refer("total", "total", 1, RefKind::DeclRef);

        let (out, _) = trace.run(&MangleOptions::default());
        assert_eq!(
            out,
            "int a;\nstruct box { int a; int b; };\n\
             int b(struct box c) { return c.a * c.b + a; }\n"
        );
    }

    #[test]
    fn test_out_of_file_declarations_untouched() {
        let source = "int count;\nint main(void) { printf(\"%d\", count); return 0; }\n";
        let mut trace = Trace::new(source);
        trace.events.push(Event::Declaration(Declaration {
            identity: "printf",
            file: HEADER,
            position: 310,
            name: "printf".to_string(),
            kind: DeclKind::Function,
            body_end: None,
        }));
        trace
            .decl("count", "count", 0, DeclKind::Variable)
            .body("main", "main", 0, DeclKind::Function, 0)
            .block(0)
            .refer("printf", "printf", 0, RefKind::DeclRef)
            .refer("count", "count", 1, RefKind::DeclRef);

        let (out, stats) = trace.run(&MangleOptions::default());
        assert_eq!(out, "int a;\nint main(void) { printf(\"%d\", a); return 0; }\n");
        assert_eq!(stats.external, 1);
        assert_eq!(stats.references, 1);
    }

    #[test]
    fn test_prototype_and_definition_share_a_name() {
        let source = "static int helper(int value);\n\
                      int main(void) { return helper(3); }\n\
                      static int helper(int value) { return value * 2; }\n";
        let mut trace = Trace::new(source);
        trace
            .decl("helper", "helper", 0, DeclKind::Function)
            .decl("value#proto", "value", 0, DeclKind::Parameter)
            .body("main", "main", 0, DeclKind::Function, 0)
            .block(0)
            .refer("helper", "helper", 1, RefKind::DeclRef)
            .body("helper", "helper", 2, DeclKind::Function, 1)
            .decl("value", "value", 1, DeclKind::Parameter)
            .block(1)
            .refer("value", "value", 2, RefKind::DeclRef);

        let (out, _) = trace.run(&MangleOptions::default());
        assert_eq!(
            out,
            "static int a(int b);\n\
             int main(void) { return a(3); }\n\
             static int a(int c) { return c * 2; }\n"
        );
    }

    #[test]
    fn test_designated_initializer_and_tags_kept() {
        let source = "typedef struct point { int lat; int lon; } point_t;\n\
                      enum color { RED };\n\
                      point_t origin = { .lat = 0, .lon = RED };\n";
        let mut trace = Trace::new(source);
        trace
            .body("point", "point", 0, DeclKind::Record, 0)
            .decl("lat", "lat", 0, DeclKind::Field)
            .decl("lon", "lon", 0, DeclKind::Field)
            .decl("point_t", "point_t", 0, DeclKind::Typedef)
            .body("color", "color", 0, DeclKind::Enum, 1)
            .decl("RED", "RED", 0, DeclKind::EnumConstant)
            .decl("origin", "origin", 0, DeclKind::Variable)
            .refer("lat", "lat", 1, RefKind::Designator)
            .refer("lon", "lon", 1, RefKind::Designator)
            .refer("RED", "RED", 1, RefKind::DeclRef);

        let (out, stats) = trace.run(&MangleOptions::default());
        assert_eq!(
            out,
            "typedef struct point { int a; int b; } point_t;\n\
             enum color { RED };\n\
             point_t a = { .a = 0, .b = RED };\n"
        );
        assert_eq!(stats.kept, 4);
    }

    #[test]
    fn test_custom_entry_point_and_reserved_words() {
        let source = "void start(void) { int first; int second; }\n";
        let mut trace = Trace::new(source);
        trace
            .body("start", "start", 0, DeclKind::Function, 0)
            .block(0)
            .decl("first", "first", 0, DeclKind::Variable)
            .decl("second", "second", 0, DeclKind::Variable);

        let options = MangleOptions {
            entry_point: "start".to_string(),
            ..MangleOptions::default()
        }
        .with_reserved(["a"]);
        let (out, _) = trace.run(&options);
        assert_eq!(out, "void start(void) { int b; int c; }\n");
    }

    #[test]
    fn test_unchanged_names_emit_no_edit() {
        let source = "int a;\nint b = a;\n";
        let mut trace = Trace::new(source);
        trace
            .decl("a", "a", 0, DeclKind::Variable)
            .decl("b", "b", 0, DeclKind::Variable)
            .refer("a", "a", 1, RefKind::DeclRef);

        let (edits, stats) = mangle(&trace.events, &MangleOptions::default(), MAIN, 20);
        assert!(edits.is_empty());
        assert_eq!(stats.declarations, 2);
        assert_eq!(stats.references, 0);
    }

    #[test]
    fn test_fresh_boundary_restarts_then_resumes() {
        let source = "int first;\nint second;\n\
                      struct pair { int left; int right; };\n\
                      int third;\n";
        let mut trace = Trace::new(source);
        trace
            .decl("first", "first", 0, DeclKind::Variable)
            .decl("second", "second", 0, DeclKind::Variable)
            .decl("pair", "pair", 0, DeclKind::Record)
            .scope(ScopeKind::Fresh, 0)
            .decl("left", "left", 0, DeclKind::Field)
            .decl("right", "right", 0, DeclKind::Field)
            .decl("third", "third", 0, DeclKind::Variable);

        let (out, _) = trace.run(&MangleOptions::default());
        assert_eq!(
            out,
            "int a;\nint b;\nstruct pair { int a; int b; };\nint c;\n"
        );
    }

    #[test]
    fn test_short_names_avoid_kept_enum_constants() {
        let source = "enum { b };\nint first;\nint second = b;\n";
        let mut trace = Trace::new(source);
        trace
            .decl("b", "b", 0, DeclKind::EnumConstant)
            .decl("first", "first", 0, DeclKind::Variable)
            .decl("second", "second", 0, DeclKind::Variable)
            .refer("b", "b", 1, RefKind::DeclRef);

        let (out, stats) = trace.run(&MangleOptions::default());
        assert_eq!(out, "enum { b };\nint a;\nint c = b;\n");
        assert_eq!(stats.kept, 1);
    }

    #[test]
    fn test_short_names_avoid_typedefs_and_external_names() {
        let source = "typedef int a;\nint main(void) { a count = 0; int total = c(count); return total; }\n";
        let mut trace = Trace::new(source);
        trace
            .decl("a", "a", 0, DeclKind::Typedef)
            .body("main", "main", 0, DeclKind::Function, 0)
            .block(0);
        trace.events.push(Event::Declaration(Declaration {
            identity: "c",
            file: HEADER,
            position: 12,
            name: "c".to_string(),
            kind: DeclKind::Function,
            body_end: None,
        }));
        trace
            .decl("count", "count", 0, DeclKind::Variable)
            .decl("total", "total", 0, DeclKind::Variable)
            .refer("count", "count", 1, RefKind::DeclRef)
            .refer("total", "total", 1, RefKind::DeclRef);

        let (out, _) = trace.run(&MangleOptions::default());
        assert_eq!(
            out,
            "typedef int a;\nint main(void) { a b = 0; int d = c(b); return d; }\n"
        );
    }

    #[test]
    fn test_kept_names_exclude_tags_and_renamed_kinds() {
        let source = "struct b { int d; };\nint main(void) { return 0; }\n";
        let mut trace = Trace::new(source);
        trace
            .body("b", "b", 0, DeclKind::Record, 0)
            .decl("d", "d", 0, DeclKind::Field)
            .body("main", "main", 0, DeclKind::Function, 1);

        let alloc = MangleOptions::default()
            .with_kept_names(&trace.events, MAIN)
            .allocator();
        assert!(alloc.is_reserved("main"));
        assert!(!alloc.is_reserved("b"));
        assert!(!alloc.is_reserved("d"));
    }
}
