use std::collections::BTreeSet;

use crate::schedule::WordEntry;

/// Words of the lesson whose lowercase form appears as a substring of the
/// lowercase essay text. Deliberately no tokenization or word-boundary
/// check: a match inside a longer word counts as used.
pub fn check_usage(words: &[WordEntry], text: &str) -> BTreeSet<String> {
    let haystack = text.to_lowercase();
    words
        .iter()
        .filter(|entry| haystack.contains(&entry.word.to_lowercase()))
        .map(|entry| entry.word.clone())
        .collect()
}

/// Complement of `check_usage`: lesson words not found in the text.
pub fn missed_words(words: &[WordEntry], used: &BTreeSet<String>) -> BTreeSet<String> {
    words
        .iter()
        .map(|entry| entry.word.clone())
        .filter(|word| !used.contains(word))
        .collect()
}
