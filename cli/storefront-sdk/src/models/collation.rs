//! Locale-aware text ordering.
//!
//! Text is compared with the Unicode Collation Algorithm using the CLDR root
//! order, the same order a browser applies for `localeCompare` without a
//! locale: letters compare by their base form first (`ø` next to `o`, `ß` as
//! `ss`), accents only break ties between otherwise equal strings, and case
//! breaks the remaining ties with lowercase first. Punctuation and symbols
//! are not ignored and sort before digits and letters. Raw bytes decide last,
//! so the order is total.

use std::cmp::Ordering;

use feruca::{Collator, Locale, Tailoring};

/// Compares strings in CLDR root order.
///
/// Keeps scratch buffers between comparisons, so reuse one collator for a
/// whole sort.
#[derive(Debug, Clone)]
pub struct LocaleCollator(Collator);

impl LocaleCollator {
    pub fn new() -> Self {
        // non-ignorable punctuation, byte order tiebreak
        Self(Collator::new(Tailoring::Cldr(Locale::Root), false, true))
    }

    pub fn compare(&mut self, a: &str, b: &str) -> Ordering {
        self.0.collate(a, b)
    }
}

impl Default for LocaleCollator {
    fn default() -> Self {
        Self::new()
    }
}
