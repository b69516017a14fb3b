//! Word tokens shared by alignment, estimation and chunking.

use crate::config::CLOSING_CHARS;

/// A whitespace-separated piece of narration together with its comparable tokens.
///
/// Pieces that carry no tokens on their own (a lone dash, an ellipsis) are
/// attached to a neighbour, so every display word has at least one token.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayWord {
    pub text: String,
    pub tokens: Vec<String>,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '\u{02BC}')
}

/// Case-fold and strip punctuation. Apostrophes are dropped in place
/// ("don't" -> "dont"); any other non-word character separates tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut cur = String::new();
    for c in text.chars() {
        if is_word_char(c) {
            cur.extend(c.to_lowercase());
        } else if is_apostrophe(c) {
            continue;
        } else if !cur.is_empty() {
            tokens.push(std::mem::take(&mut cur));
        }
    }
    if !cur.is_empty() {
        tokens.push(cur);
    }
    tokens
}

/// Normalize one recognizer word: lowercase with every non-word character removed.
pub fn normalize_recognized(word: &str) -> String {
    word.chars()
        .filter(|&c| is_word_char(c))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn display_words(text: &str) -> Vec<DisplayWord> {
    let mut words: Vec<DisplayWord> = Vec::new();
    let mut pending_prefix = String::new();

    for piece in text.split_whitespace() {
        let tokens = tokenize(piece);
        if tokens.is_empty() {
            if let Some(prev) = words.last_mut() {
                prev.text.push(' ');
                prev.text.push_str(piece);
            } else {
                if !pending_prefix.is_empty() {
                    pending_prefix.push(' ');
                }
                pending_prefix.push_str(piece);
            }
            continue;
        }

        let text = if pending_prefix.is_empty() {
            piece.to_string()
        } else {
            let joined = format!("{pending_prefix} {piece}");
            pending_prefix.clear();
            joined
        };
        words.push(DisplayWord { text, tokens });
    }

    debug_assert_eq!(
        words.iter().flat_map(|w| w.tokens.iter().cloned()).collect::<Vec<_>>(),
        tokenize(text),
        "display word tokens diverged from tokenize()"
    );
    words
}

/// Whether a display word closes a sentence (`.`, `!` or `?` before closing quotes/brackets).
pub fn ends_sentence(word: &str) -> bool {
    matches!(
        word.trim_end_matches(|c: char| CLOSING_CHARS.contains(&c))
            .chars()
            .next_back(),
        Some('.') | Some('!') | Some('?') | Some('…')
    )
}

/// Group display words into sentences, keeping their order.
pub fn split_sentences(words: Vec<DisplayWord>) -> Vec<Vec<DisplayWord>> {
    let mut sentences = Vec::new();
    let mut current = Vec::new();
    for word in words {
        let closes = ends_sentence(&word.text);
        current.push(word);
        if closes {
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ... -- !!").is_empty());
        assert!(display_words("  -- ").is_empty());
    }

    #[test]
    fn tokenize_lowercases_and_strips_punctuation() {
        assert_eq!(tokenize("Hello, World!"), ["hello", "world"]);
    }

    #[test]
    fn apostrophes_join_instead_of_split() {
        assert_eq!(tokenize("Don't stop"), ["dont", "stop"]);
        assert_eq!(tokenize("it\u{2019}s"), ["its"]);
    }

    #[test]
    fn hyphen_separates_tokens() {
        assert_eq!(tokenize("state-of-the-art"), ["state", "of", "the", "art"]);
    }

    #[test]
    fn non_ascii_letters_are_word_characters() {
        assert_eq!(tokenize("Çok güzel, değil mi?"), ["çok", "güzel", "değil", "mi"]);
    }

    #[test]
    fn normalize_recognized_drops_everything_but_word_chars() {
        assert_eq!(normalize_recognized(" Hello,"), "hello");
        assert_eq!(normalize_recognized("don't"), "dont");
        assert_eq!(normalize_recognized("..."), "");
        assert_eq!(normalize_recognized("e-mail"), "email");
    }

    #[test]
    fn display_words_keep_punctuation() {
        let words = display_words("Hello, world!");
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Hello,");
        assert_eq!(words[0].tokens, ["hello"]);
        assert_eq!(words[1].text, "world!");
    }

    #[test]
    fn tokenless_pieces_attach_to_neighbours() {
        let words = display_words("-- Wait — what?");
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "-- Wait —");
        assert_eq!(words[1].text, "what?");
    }

    #[test]
    fn display_word_may_carry_several_tokens() {
        let words = display_words("well-known fact");
        assert_eq!(words[0].tokens, ["well", "known"]);
        assert_eq!(words[1].tokens, ["fact"]);
    }

    #[test]
    fn sentences_split_on_terminal_punctuation() {
        let sentences = split_sentences(display_words("One two. Three? \"Four!\" five"));
        let texts: Vec<Vec<&str>> = sentences
            .iter()
            .map(|s| s.iter().map(|w| w.text.as_str()).collect())
            .collect();
        assert_eq!(
            texts,
            vec![vec!["One", "two."], vec!["Three?"], vec!["\"Four!\""], vec!["five"]]
        );
    }
}
