//! Text search over buffer contents.
//!
//! All inputs and outputs are **codepoint offsets**; matches come back as forward [`Region`]s. Both
//! plain substring search (escaped into a regex) and regex search are supported, optionally
//! restricted to whole words. Empty matches are never reported.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::region::Region;

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, matches only whole words (alphanumeric and `_`).
    pub whole_word: bool,
    /// If `true`, treats the query as a regex pattern.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

impl SearchOptions {
    /// Options for a case-sensitive regex search.
    pub fn regex() -> Self {
        Self {
            regex: true,
            ..Self::default()
        }
    }
}

/// Search errors.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid regex: {0}")]
    /// The provided regex pattern failed to compile.
    InvalidRegex(#[from] regex::Error),
}

/// Byte/codepoint offset table for one text snapshot.
struct CharIndex {
    char_to_byte: Vec<usize>,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self { char_to_byte }
    }

    fn char_count(&self) -> usize {
        self.char_to_byte.len() - 1
    }

    fn char_to_byte(&self, char_offset: usize) -> usize {
        self.char_to_byte[char_offset.min(self.char_count())]
    }

    fn byte_to_char(&self, byte_offset: usize) -> usize {
        match self.char_to_byte.binary_search(&byte_offset) {
            Ok(idx) | Err(idx) => idx,
        }
    }
}

/// A compiled query bound to one text snapshot.
struct Matcher<'t> {
    re: Regex,
    text: &'t str,
    index: CharIndex,
    whole_word: bool,
}

impl<'t> Matcher<'t> {
    fn new(text: &'t str, query: &str, options: SearchOptions) -> Result<Self, SearchError> {
        let pattern = if options.regex {
            query.to_string()
        } else {
            regex::escape(query)
        };
        let re = RegexBuilder::new(&pattern)
            .case_insensitive(!options.case_sensitive)
            .multi_line(true)
            .build()?;
        Ok(Self {
            re,
            text,
            index: CharIndex::new(text),
            whole_word: options.whole_word,
        })
    }

    /// Every acceptable match starting at or after `from_byte` and ending at or before `limit_byte`.
    fn matches(&self, from_byte: usize, limit_byte: usize) -> impl Iterator<Item = Region> + '_ {
        let haystack = &self.text[..limit_byte];
        let mut at = Some(from_byte);
        std::iter::from_fn(move || {
            loop {
                let m = self.re.find_at(haystack, at?)?;
                let found = Region::new(
                    self.index.byte_to_char(m.start()),
                    self.index.byte_to_char(m.end()),
                );
                if m.is_empty() {
                    // Step over one codepoint so the scan always advances.
                    at = haystack[m.end()..]
                        .chars()
                        .next()
                        .map(|ch| m.end() + ch.len_utf8());
                    continue;
                }
                at = Some(m.end());
                if !self.whole_word || self.is_whole_word(found) {
                    return Some(found);
                }
            }
        })
    }

    fn is_whole_word(&self, r: Region) -> bool {
        let before = self.text[..self.index.char_to_byte(r.begin())].chars().next_back();
        let after = self.text[self.index.char_to_byte(r.end())..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    }
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// Find all non-overlapping occurrences of `query` in `text`.
///
/// Returns an empty list if `query` is empty.
pub fn find_all(text: &str, query: &str, options: SearchOptions) -> Result<Vec<Region>, SearchError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let matcher = Matcher::new(text, query, options)?;
    Ok(matcher.matches(0, text.len()).collect())
}

/// Find the first occurrence of `query` starting at or after codepoint `from`.
pub fn find_next(
    text: &str,
    query: &str,
    options: SearchOptions,
    from: usize,
) -> Result<Option<Region>, SearchError> {
    if query.is_empty() {
        return Ok(None);
    }
    let matcher = Matcher::new(text, query, options)?;
    let from_byte = matcher.index.char_to_byte(from);
    Ok(matcher.matches(from_byte, text.len()).next())
}

/// Find the last occurrence of `query` that ends at or before codepoint `before`.
pub fn find_prev(
    text: &str,
    query: &str,
    options: SearchOptions,
    before: usize,
) -> Result<Option<Region>, SearchError> {
    if query.is_empty() {
        return Ok(None);
    }
    let matcher = Matcher::new(text, query, options)?;
    let limit_byte = matcher.index.char_to_byte(before);
    Ok(matcher.matches(0, limit_byte).last())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_search_escapes_metacharacters() {
        let hits = find_all("a.b a+b a.b", "a.b", SearchOptions::default()).unwrap();
        assert_eq!(hits, vec![Region::new(0, 3), Region::new(8, 11)]);
    }

    #[test]
    fn test_offsets_are_codepoints() {
        let hits = find_all("åäö åäö", "äö", SearchOptions::default()).unwrap();
        assert_eq!(hits, vec![Region::new(1, 3), Region::new(5, 7)]);
    }

    #[test]
    fn test_case_insensitive() {
        let options = SearchOptions {
            case_sensitive: false,
            ..SearchOptions::default()
        };
        let hits = find_all("Hello HELLO hello", "hello", options).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_whole_word() {
        let options = SearchOptions {
            whole_word: true,
            ..SearchOptions::default()
        };
        let hits = find_all("cat concat cat_ cat.", "cat", options).unwrap();
        assert_eq!(hits, vec![Region::new(0, 3), Region::new(16, 19)]);
    }

    #[test]
    fn test_regex_skips_empty_matches() {
        let hits = find_all("ab12cd345", r"\d*", SearchOptions::regex()).unwrap();
        assert_eq!(hits, vec![Region::new(2, 4), Region::new(6, 9)]);
    }

    #[test]
    fn test_invalid_regex() {
        let err = find_all("text", "(", SearchOptions::regex()).unwrap_err();
        assert!(matches!(err, SearchError::InvalidRegex(_)));
        assert!(err.to_string().starts_with("invalid regex"));
    }

    #[test]
    fn test_empty_query() {
        assert!(find_all("abc", "", SearchOptions::default()).unwrap().is_empty());
        assert_eq!(find_next("abc", "", SearchOptions::default(), 0).unwrap(), None);
    }

    #[test]
    fn test_next_and_prev() {
        let text = "one two one two";
        let options = SearchOptions::default();
        assert_eq!(find_next(text, "two", options, 0).unwrap(), Some(Region::new(4, 7)));
        assert_eq!(find_next(text, "two", options, 5).unwrap(), Some(Region::new(12, 15)));
        assert_eq!(find_next(text, "two", options, 13).unwrap(), None);
        assert_eq!(find_prev(text, "one", options, 15).unwrap(), Some(Region::new(8, 11)));
        assert_eq!(find_prev(text, "one", options, 10).unwrap(), Some(Region::new(0, 3)));
        assert_eq!(find_prev(text, "one", options, 2).unwrap(), None);
    }
}
