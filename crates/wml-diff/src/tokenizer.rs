//! Tokenization of text into a word alphabet (spec.md §4.3).
//!
//! Every maximal run of word characters becomes one token; every maximal run
//! of whitespace becomes one token; every other character (punctuation,
//! symbols, emoji) becomes its own single-character token. This mirrors the
//! teacher's (`quarto-ast-reconcile`) approach of hashing structural units
//! into a stable alphabet rather than diffing raw characters, at word
//! granularity instead of AST-node granularity.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Whitespace,
    Other,
}

/// A token: a borrowed slice of the source text plus its byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokenize `text` into a sequence of [`Token`]s covering it exactly (the
/// concatenation of all token texts, in order, equals `text`).
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if is_word_char(c) {
            let mut end = start + c.len_utf8();
            chars.next();
            while let Some(&(idx, c)) = chars.peek() {
                if is_word_char(c) {
                    end = idx + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token { text: &text[start..end], start, end });
        } else if c.is_whitespace() {
            let mut end = start + c.len_utf8();
            chars.next();
            while let Some(&(idx, c)) = chars.peek() {
                if c.is_whitespace() {
                    end = idx + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token { text: &text[start..end], start, end });
        } else {
            let end = start + c.len_utf8();
            chars.next();
            tokens.push(Token { text: &text[start..end], start, end });
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(tokens: &[Token<'_>]) -> String {
        tokens.iter().map(|t| t.text).collect()
    }

    #[test]
    fn tokenizes_words_and_whitespace() {
        let tokens = tokenize("The quick brown fox");
        assert_eq!(reconstruct(&tokens), "The quick brown fox");
        assert_eq!(tokens[0].text, "The");
        assert_eq!(tokens[1].text, " ");
        assert_eq!(tokens[1].start, 3);
    }

    #[test]
    fn punctuation_is_its_own_token() {
        let tokens = tokenize("Hi, there!");
        let kinds: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(kinds, vec!["Hi", ",", " ", "there", "!"]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn round_trips_any_text() {
        for s in ["", "a", "  ", "a b\tc\n", "éàü word", "!!!"] {
            assert_eq!(reconstruct(&tokenize(s)), s);
        }
    }
}
