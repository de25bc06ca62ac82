//! Word list for word-scoped redaction

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::error::{PolicyError, Result};
use crate::tokenizer::Chunk;

/// Lines containing this marker are comments
const COMMENT_MARKER: &str = "//";

/// Words never treated as redaction targets
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn parse(content: &str) -> Self {
        Self {
            words: content
                .lines()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match read_list(path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring stop-word list");
                Self::default()
            }
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// A word-list hit spanning chunks `start..end`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordMatch {
    pub word: String,
    pub start: usize,
    pub end: usize,
}

/// Ordered lowercase redaction targets
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: Vec<String>,
    /// Same words, longest first, for the spanning scan
    by_length: Vec<String>,
}

impl WordList {
    /// Build from newline-delimited `content`. Comment lines, blank lines
    /// and stop words are dropped; entries are case-folded and every
    /// multi-word phrase is also listed with its spaces removed.
    pub fn parse(content: &str, stop_words: &StopWords) -> Self {
        let base: Vec<String> = content
            .lines()
            .filter(|l| !l.contains(COMMENT_MARKER))
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty() && !stop_words.contains(l))
            .collect();

        let mut seen = HashSet::new();
        let mut words = Vec::with_capacity(base.len() * 2);
        let joined: Vec<String> = base.iter().map(|w| w.replace(' ', "")).collect();
        for word in base.into_iter().chain(joined) {
            if seen.insert(word.clone()) {
                words.push(word);
            }
        }
        Self::from_words(words)
    }

    pub fn from_words(words: Vec<String>) -> Self {
        let mut by_length = words.clone();
        by_length.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        Self { words, by_length }
    }

    pub fn load(path: impl AsRef<Path>, stop_words: &StopWords) -> Result<Self> {
        let path = path.as_ref();
        let list = Self::parse(&read_list(path)?, stop_words);
        debug!(path = %path.display(), words = list.len(), "loaded word list");
        Ok(list)
    }

    /// Like [`WordList::load`], but an unreadable file yields an empty list
    pub fn load_or_default(path: impl AsRef<Path>, stop_words: &StopWords) -> Self {
        let path = path.as_ref();
        match Self::load(path, stop_words) {
            Ok(list) => list,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring word list");
                Self::default()
            }
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Find a target starting at chunk `pos`.
    ///
    /// Longest words are tried first, each gathering whole chunks until it
    /// has at least as many glyphs as the word has characters; the gathered
    /// text matches when it begins with the word, so suffixed forms such as
    /// possessives are covered too. Failing that, a single chunk whose trimmed text equals a word matches.
    pub fn match_at(&self, chunks: &[Chunk], pos: usize) -> Option<WordMatch> {
        if pos >= chunks.len() {
            return None;
        }

        for word in &self.by_length {
            let (spanned, end) = span_text(chunks, pos, word.chars().count());
            trace!(word = %word, spanned = %spanned, "testing word match");
            if spanned.starts_with(word.as_str()) {
                return Some(WordMatch {
                    word: word.clone(),
                    start: pos,
                    end,
                });
            }
        }

        let single = chunks[pos].text().trim().to_lowercase();
        self.words.iter().find(|w| **w == single).map(|word| WordMatch {
            word: word.clone(),
            start: pos,
            end: pos + 1,
        })
    }
}

/// Lowercase text of consecutive chunks from `pos` until `length` glyphs
/// are covered, and the index after the last chunk taken.
fn span_text(chunks: &[Chunk], pos: usize, length: usize) -> (String, usize) {
    let mut text = String::new();
    let mut glyphs = 0;
    let mut end = pos;
    while glyphs < length && end < chunks.len() {
        text.push_str(&chunks[end].text());
        glyphs += chunks[end].len();
        end += 1;
    }
    (text.to_lowercase(), end)
}

fn read_list(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| {
        PolicyError::Read {
            path: path.display().to_string(),
            source,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::TableFont;
    use crate::tokenizer::{SeparatorSplit, Tokenizer};
    use crate::types::{FontRef, Matrix, WritingMode};
    use crate::stream::Text;
    use std::sync::Arc;

    fn chunks(s: &str) -> Vec<Chunk> {
        let font: FontRef = Arc::new(TableFont::new("W").with_chars("abcdefghijklmnopqrstuvwxyzJS ,.'", |_| 0.5));
        let mut text = Text::new();
        text.show_string(&font, Matrix::scale(10.0, 10.0), s, WritingMode::Horizontal);
        Tokenizer::new(Box::new(SeparatorSplit)).tokenize(text.glyphs())
    }

    #[test]
    fn test_parse_filters_comments_stop_words_and_folds_case() {
        let stop = StopWords::parse("the\nand\n");
        let list = WordList::parse("// names\nJohn Smith\nthe\n\nACME\n", &stop);
        assert_eq!(list.words(), &["john smith", "acme", "johnsmith"]);
    }

    #[test]
    fn test_multi_chunk_phrase_matches() {
        let list = WordList::from_words(vec!["john smith".into()]);
        let chunks = chunks("hi John Smith, bye");
        assert_eq!(list.match_at(&chunks, 0), None);
        let hit = list.match_at(&chunks, 1).unwrap();
        assert_eq!(hit.word, "john smith");
        assert_eq!((hit.start, hit.end), (1, 3));
    }

    #[test]
    fn test_suffixed_forms_match() {
        let list = WordList::from_words(vec!["john".into(), "smith".into()]);
        let possessive = chunks("John's car");
        let hit = list.match_at(&possessive, 0).unwrap();
        assert_eq!(hit.word, "john");
        assert_eq!((hit.start, hit.end), (0, 1));
        assert_eq!(list.match_at(&possessive, 1), None);

        let longer = chunks("Johnson met Smithers");
        assert!(list.match_at(&longer, 0).is_some());
        assert_eq!(list.match_at(&longer, 1), None);
        assert_eq!(list.match_at(&longer, 2).map(|m| m.word), Some("smith".to_string()));
    }

    #[test]
    fn test_longest_word_wins() {
        let list = WordList::from_words(vec!["john".into(), "john smith".into()]);
        let hit = list.match_at(&chunks("John Smith"), 0).unwrap();
        assert_eq!(hit.word, "john smith");
        assert_eq!(hit.end, 2);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let list = WordList::load_or_default("/nonexistent/words.txt", &StopWords::default());
        assert!(list.is_empty());
    }
}
