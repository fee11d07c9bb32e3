//! Replacement instructions handed to the rewriting collaborator.

use crate::span::Span;

/// Replace the bytes of `span` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub text: String,
}

impl Edit {
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }

    /// Bytes saved by applying this edit (negative if the text grows).
    pub fn saved(&self) -> i64 {
        i64::from(self.span.len()) - self.text.len() as i64
    }
}

/// Receives edits as the engine produces them.
///
/// Implementations may assume edits never overlap unless the frontend delivered
/// the same spelling location twice, in which case the edits are identical.
pub trait EditSink {
    fn replace(&mut self, edit: Edit);
}

impl EditSink for Vec<Edit> {
    fn replace(&mut self, edit: Edit) {
        self.push(edit);
    }
}

impl<S: EditSink + ?Sized> EditSink for &mut S {
    fn replace(&mut self, edit: Edit) {
        (**self).replace(edit);
    }
}
