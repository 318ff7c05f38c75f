//! Text substitution against dictionary names.

pub mod direct;
pub mod fuzzy;

pub use direct::{replace_known, whole_word_pattern, DirectReplacement};
pub use fuzzy::{replace_fuzzy, replace_fuzzy_excluding, shift_ranges, FuzzyReplacement};
