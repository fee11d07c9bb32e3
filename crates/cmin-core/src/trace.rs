//! JSON event traces.
//!
//! A frontend that does not link against the engine writes the events of one
//! translation unit to a trace file instead:
//!
//! ```json
//! {
//!   "file": "main.c",
//!   "events": [
//!     { "event": "declaration", "id": "c:@F@area", "offset": 4, "name": "area",
//!       "kind": "function", "body_end": 80 },
//!     { "event": "scope", "scope": "inherited", "end": 80 },
//!     { "event": "reference", "target": "c:@F@area", "offset": 120, "name": "area" }
//!   ]
//! }
//! ```
//!
//! Events without a `file` belong to the trace's `file`. Resolution validates the
//! trace against the source so that bad input surfaces as an [`Error`], not as an
//! engine assertion.

use std::collections::HashMap;
use std::path::Path;

use cmin_mangle::{
    DeclKind, Declaration, Event, FileId, LineIndex, Position, RefKind, Reference, ScopeBoundary,
    ScopeKind,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::version::TRACE_SCHEMA_VERSION;

/// Id given to the file under transformation when a trace is resolved.
pub const MAIN_FILE: FileId = FileId(0);

fn default_version() -> u32 {
    TRACE_SCHEMA_VERSION
}

/// Events for one file under transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trace {
    #[serde(default = "default_version")]
    pub version: u32,
    /// File under transformation, as the frontend spells it.
    pub file: String,
    pub events: Vec<TraceEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    Declaration {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
        offset: Position,
        name: String,
        kind: DeclKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body_end: Option<Position>,
    },
    Reference {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
        offset: Position,
        name: String,
        #[serde(default)]
        kind: RefKind,
    },
    Scope {
        scope: ScopeKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
        end: Position,
    },
}

/// Interns file names; the file under transformation is always [`MAIN_FILE`].
struct FileTable<'t> {
    main: &'t str,
    ids: HashMap<&'t str, FileId>,
}

impl<'t> FileTable<'t> {
    fn new(main: &'t str) -> Self {
        let mut ids = HashMap::new();
        ids.insert(main, MAIN_FILE);
        Self { main, ids }
    }

    fn id(&mut self, file: Option<&'t str>) -> FileId {
        let file = file.unwrap_or(self.main);
        let next = FileId(self.ids.len() as u32);
        *self.ids.entry(file).or_insert(next)
    }
}

impl Trace {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read and parse a trace file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::TraceRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| Error::TraceParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the trace against `source` and turn it into engine events.
    ///
    /// In-file names must be spelled at their offsets, body and scope ends must lie
    /// inside the source, and declarations must arrive in source order.
    pub fn resolve(&self, source: &str) -> Result<Vec<Event<String>>> {
        if self.version != TRACE_SCHEMA_VERSION {
            return Err(Error::other(format!(
                "unsupported event trace version {} (expected {TRACE_SCHEMA_VERSION})",
                self.version
            )));
        }

        let check = Checker {
            source,
            lines: LineIndex::new(source),
        };
        let mut files = FileTable::new(&self.file);
        let mut last_declaration: Option<(Position, &str)> = None;
        let mut events = Vec::with_capacity(self.events.len());

        for event in &self.events {
            let event = match event {
                TraceEvent::Declaration {
                    id,
                    file,
                    offset,
                    name,
                    kind,
                    body_end,
                } => {
                    let file = files.id(file.as_deref());
                    if file == MAIN_FILE {
                        check.spelling(*offset, name)?;
                        if let Some((previous, previous_name)) = last_declaration {
                            if *offset < previous {
                                return Err(check.invalid(
                                    *offset,
                                    format!(
                                        "declaration of `{name}` comes after the declaration of \
                                         `{previous_name}` at byte {previous}"
                                    ),
                                ));
                            }
                        }
                        last_declaration = Some((*offset, name.as_str()));
                        if let Some(end) = body_end {
                            check.end(*offset, *end)?;
                        }
                    }
                    Event::Declaration(Declaration {
                        identity: id.clone(),
                        file,
                        position: *offset,
                        name: name.clone(),
                        kind: *kind,
                        body_end: *body_end,
                    })
                }
                TraceEvent::Reference {
                    target,
                    file,
                    offset,
                    name,
                    kind,
                } => {
                    let file = files.id(file.as_deref());
                    if file == MAIN_FILE {
                        check.spelling(*offset, name)?;
                    }
                    Event::Reference(Reference {
                        target: target.clone(),
                        file,
                        position: *offset,
                        name: name.clone(),
                        kind: *kind,
                    })
                }
                TraceEvent::Scope { scope, file, end } => {
                    let file = files.id(file.as_deref());
                    if file == MAIN_FILE {
                        check.end(*end, *end)?;
                    }
                    Event::ScopeBoundary(ScopeBoundary {
                        kind: *scope,
                        file,
                        end: *end,
                    })
                }
            };
            events.push(event);
        }

        Ok(events)
    }
}

struct Checker<'s> {
    source: &'s str,
    lines: LineIndex,
}

impl Checker<'_> {
    fn invalid(&self, offset: Position, message: String) -> Error {
        let (line, column) = self.lines.line_col(offset.min(self.source.len() as Position));
        Error::InvalidTrace {
            line,
            column,
            message,
        }
    }

    /// `name` must be spelled at `offset`.
    fn spelling(&self, offset: Position, name: &str) -> Result<()> {
        let start = offset as usize;
        match self.source.get(start..start + name.len()) {
            Some(found) if found == name => Ok(()),
            Some(found) => Err(self.invalid(
                offset,
                format!("expected `{name}` at byte {offset}, found `{found}`"),
            )),
            None => Err(self.invalid(
                offset,
                format!("`{name}` at byte {offset} is not inside the source"),
            )),
        }
    }

    /// A region opened at `start` must end inside the source and not before `start`.
    fn end(&self, start: Position, end: Position) -> Result<()> {
        if end as usize >= self.source.len() {
            return Err(self.invalid(
                end,
                format!(
                    "scope end at byte {end} is past the end of the source ({} bytes)",
                    self.source.len()
                ),
            ));
        }
        if end < start {
            return Err(self.invalid(start, format!("scope ends at byte {end}, before it starts")));
        }
        Ok(())
    }
}
