//! Short identifier allocation.
//!
//! Indices map to names through a bijective base-52 numeral system whose digits
//! are `a..z` (0-25) followed by `A..Z` (26-51): `0 → a`, `51 → Z`, `52 → aa`,
//! `53 → ab`, ... Every name is produced by exactly one index, and names come
//! out shortest first.

use rustc_hash::FxHashSet;

/// C99 keywords. None of them may ever be produced as a short name.
pub const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Bool", "_Complex", "_Imaginary",
];

/// Digit alphabet, in digit order (not code-point order).
const DIGITS: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: usize = DIGITS.len();

/// Render an index as a name, ignoring reserved words.
pub fn render(index: usize) -> String {
    let mut digits = Vec::with_capacity(4);
    let mut k = index;
    loop {
        digits.push(DIGITS[k % BASE]);
        if k < BASE {
            break;
        }
        k = k / BASE - 1;
    }
    digits.iter().rev().map(|&b| b as char).collect()
}

/// Maps symbol indices to identifiers, skipping reserved words.
///
/// The allocator holds no counter of its own: [`SymbolAllocator::allocate`] is a
/// pure function of its argument, so a name can always be re-derived from the
/// index it was allocated at.
#[derive(Debug, Clone)]
pub struct SymbolAllocator {
    reserved: FxHashSet<String>,
}

impl Default for SymbolAllocator {
    fn default() -> Self {
        Self::with_reserved(C_KEYWORDS.iter().copied())
    }
}

impl SymbolAllocator {
    /// Allocator reserving exactly `words`.
    pub fn with_reserved<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a word that must never be produced.
    pub fn reserve(&mut self, word: impl Into<String>) {
        self.reserved.insert(word.into());
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Returns `(next_free, name)` for the first non-reserved name at or after `index`.
    ///
    /// `next_free` is one past the index actually used, so callers must not assume it
    /// is `index + 1`.
    pub fn allocate(&self, index: usize) -> (usize, String) {
        let mut candidate = index;
        loop {
            let name = render(candidate);
            candidate += 1;
            if !self.is_reserved(&name) {
                return (candidate, name);
            }
        }
    }
}
