//! Character whitelist

use std::collections::HashSet;

/// Punctuation kept by default
pub const DEFAULT_CHAR_WHITELIST: &str = " !\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Characters that are never replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharWhitelist {
    chars: HashSet<char>,
}

impl CharWhitelist {
    pub fn new(chars: &str) -> Self {
        Self {
            chars: chars.chars().collect(),
        }
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Default for CharWhitelist {
    fn default() -> Self {
        Self::new(DEFAULT_CHAR_WHITELIST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keeps_ascii_punctuation_only() {
        let whitelist = CharWhitelist::default();
        for c in " .,;:!?\\\"'()[]{}".chars() {
            assert!(whitelist.contains(c), "{:?} should be whitelisted", c);
        }
        assert!(!whitelist.contains('a'));
        assert!(!whitelist.contains('7'));
        assert!(!whitelist.contains('é'));
    }
}
