// Tokenizer — splits raw text into word and separator runs.
//
// Word tokens are the censorship candidates; separator runs pass through the
// pipeline verbatim. The word alphabet includes the glyph characters from the
// normalization rule table, because obfuscated words smuggle symbols like /
// or | inside the "word" and whitespace-only splitting would lose them. A
// plain period or comma still splits, so trailing punctuation never merges
// into a word.

use std::collections::HashSet;

use crate::normalize::NormalizationRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Separator,
}

/// A contiguous span of the input, with its byte offsets preserved so the
/// censored output can be reassembled span by span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

pub struct Tokenizer {
    symbols: HashSet<char>,
}

impl Tokenizer {
    /// Build a tokenizer whose word alphabet tracks the given rule table.
    pub fn new(rules: &NormalizationRules) -> Self {
        Self {
            symbols: rules.word_symbols(),
        }
    }

    fn is_word_char(&self, c: char) -> bool {
        c.is_alphanumeric() || c == '_' || c == '-' || self.symbols.contains(&c)
    }

    /// Split text into maximal same-kind runs. Deterministic and total; the
    /// concatenation of all token texts reproduces the input exactly.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut run_start = 0usize;
        let mut run_kind: Option<TokenKind> = None;

        for (offset, c) in text.char_indices() {
            let kind = if self.is_word_char(c) {
                TokenKind::Word
            } else {
                TokenKind::Separator
            };
            match run_kind {
                None => {
                    run_kind = Some(kind);
                    run_start = offset;
                }
                Some(current) if current == kind => {}
                Some(current) => {
                    tokens.push(Token {
                        text: &text[run_start..offset],
                        start: run_start,
                        end: offset,
                        kind: current,
                    });
                    run_start = offset;
                    run_kind = Some(kind);
                }
            }
        }

        if let Some(current) = run_kind {
            tokens.push(Token {
                text: &text[run_start..],
                start: run_start,
                end: text.len(),
                kind: current,
            });
        }

        tokens
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(&NormalizationRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<&str> {
        Tokenizer::default()
            .tokenize(text)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Word)
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_simple_split() {
        assert_eq!(words("hello friend"), vec!["hello", "friend"]);
    }

    #[test]
    fn test_glyphs_stay_inside_words() {
        assert_eq!(words("f@ck you"), vec!["f@ck", "you"]);
        assert_eq!(words("sh1t a$$ /\\/ope"), vec!["sh1t", "a$$", "/\\/ope"]);
        assert_eq!(words("f_u_c_k"), vec!["f_u_c_k"]);
    }

    #[test]
    fn test_punctuation_splits() {
        assert_eq!(words("fuck. you,"), vec!["fuck", "you"]);
        assert_eq!(words("what?"), vec!["what"]);
    }

    #[test]
    fn test_spans_cover_input() {
        let tokenizer = Tokenizer::default();
        let text = "You are a f@ck1ng idiot.";
        let tokens = tokenizer.tokenize(text);
        // Concatenating spans reproduces the input
        let rebuilt: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(rebuilt, text);
        // Spans line up with offsets
        for token in &tokens {
            assert_eq!(&text[token.start..token.end], token.text);
        }
    }

    #[test]
    fn test_alternating_kinds() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize("a  b");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::Word);
        assert_eq!(tokens[1].kind, TokenKind::Separator);
        assert_eq!(tokens[1].text, "  ");
        assert_eq!(tokens[2].kind, TokenKind::Word);
    }

    #[test]
    fn test_empty_input() {
        assert!(Tokenizer::default().tokenize("").is_empty());
    }

    #[test]
    fn test_multibyte_offsets() {
        let tokenizer = Tokenizer::default();
        let text = "héllo 💩 wörld";
        let tokens = tokenizer.tokenize(text);
        let rebuilt: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(rebuilt, text);
        // The emoji is not alphanumeric and not a rule glyph, so it separates
        assert_eq!(words(text), vec!["héllo", "wörld"]);
    }

    #[test]
    fn test_alphabet_follows_custom_rules() {
        use crate::normalize::{NormalizationRules, SubstitutionRule};
        let rules = NormalizationRules::new(
            vec![SubstitutionRule {
                pattern: "€".into(),
                replacement: "e".into(),
            }],
            Default::default(),
        );
        let tokenizer = Tokenizer::new(&rules);
        let tokens = tokenizer.tokenize("h€llo @you");
        assert_eq!(tokens[0].text, "h€llo");
        // @ is not in this custom table, so it separates
        let word_texts: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Word)
            .map(|t| t.text)
            .collect();
        assert_eq!(word_texts, vec!["h€llo", "you"]);
    }
}
