//! Applying edits to source text.
//!
//! Edits arrive in whatever order the engine produced them. They are sorted, exact
//! duplicates (one spelling location reported twice, e.g. through a macro) are
//! dropped, and anything else that overlaps is an error.

use cmin_mangle::{Edit, EditSink};
use tracing::warn;

use crate::error::{Error, Result};

/// Collects edits for one source and splices them in on [`SourceRewriter::finish`].
#[derive(Debug)]
pub struct SourceRewriter<'s> {
    source: &'s str,
    edits: Vec<Edit>,
}

impl<'s> SourceRewriter<'s> {
    #[must_use]
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    /// Number of edits collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Produce the rewritten source.
    pub fn finish(self) -> Result<String> {
        apply_edits(self.source, self.edits)
    }
}

impl EditSink for SourceRewriter<'_> {
    fn replace(&mut self, edit: Edit) {
        self.edits.push(edit);
    }
}

/// Splice `edits` into `source`.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> Result<String> {
    edits.sort_by_key(|edit| (edit.span.start, edit.span.end));
    let before = edits.len();
    edits.dedup();
    if edits.len() < before {
        warn!(duplicates = before - edits.len(), "dropped duplicate edits");
    }

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut previous: Option<&Edit> = None;
    for edit in &edits {
        let start = edit.span.start as usize;
        let end = edit.span.end as usize;
        if start > end
            || end > source.len()
            || !source.is_char_boundary(start)
            || !source.is_char_boundary(end)
        {
            return Err(Error::EditOutOfBounds {
                start: edit.span.start,
                end: edit.span.end,
                len: source.len(),
            });
        }
        if let Some(prev) = previous {
            if prev.span.overlaps(edit.span) {
                return Err(Error::OverlappingEdits {
                    first_start: prev.span.start,
                    first_end: prev.span.end,
                    second_start: edit.span.start,
                    second_end: edit.span.end,
                });
            }
        }
        out.push_str(&source[cursor..start]);
        out.push_str(&edit.text);
        cursor = end;
        previous = Some(edit);
    }
    out.push_str(&source[cursor..]);
    Ok(out)
}
