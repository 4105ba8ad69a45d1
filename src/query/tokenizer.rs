//! Query tokenizer
//!
//! Splits a PubMed query into parentheses, operators, and words. Quoted
//! phrases (`"breast cancer"`) and field tags (`[MeSH Terms]`) are read as
//! part of the surrounding word, so whitespace and parentheses inside them
//! do not split it.

use super::ast::Operator;
use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Open,
    Close,
    Operator(Operator),
    Word(String),
}

/// A token with the character offset it starts at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Tokenize a raw query
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];

        if ch.is_whitespace() {
            pos += 1;
            continue;
        }

        if ch == '(' || ch == ')' {
            let kind = if ch == '(' {
                TokenKind::Open
            } else {
                TokenKind::Close
            };
            tokens.push(Token {
                kind,
                position: pos,
            });
            pos += 1;
            continue;
        }

        let start = pos;
        let mut word = String::new();
        while pos < chars.len() {
            let ch = chars[pos];
            if ch.is_whitespace() || ch == '(' || ch == ')' {
                break;
            }
            match ch {
                '"' | '[' => {
                    let closing = if ch == '"' { '"' } else { ']' };
                    let end = chars[pos + 1..]
                        .iter()
                        .position(|&c| c == closing)
                        .map(|offset| pos + 1 + offset)
                        .ok_or(ParseError::Unterminated {
                            delimiter: ch,
                            position: pos,
                        })?;
                    word.extend(&chars[pos..=end]);
                    pos = end + 1;
                }
                _ => {
                    word.push(ch);
                    pos += 1;
                }
            }
        }

        let kind = match Operator::from_word(&word) {
            Some(op) => TokenKind::Operator(op),
            None => TokenKind::Word(word),
        };
        tokens.push(Token {
            kind,
            position: start,
        });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn word(text: &str) -> TokenKind {
        TokenKind::Word(text.to_string())
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("(a OR b) AND c"),
            vec![
                TokenKind::Open,
                word("a"),
                TokenKind::Operator(Operator::Or),
                word("b"),
                TokenKind::Close,
                TokenKind::Operator(Operator::And),
                word("c"),
            ]
        );
    }

    #[test]
    fn test_positions_are_char_offsets() {
        let tokens = tokenize("ä OR b").unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 2, 5]);
    }

    #[test]
    fn test_lowercase_operators_are_words() {
        assert_eq!(kinds("salt and pepper"), vec![word("salt"), word("and"), word("pepper")]);
    }

    #[test]
    fn test_quoted_phrase_and_field_tag() {
        assert_eq!(
            kinds(r#""breast cancer"[MeSH Terms] OR tumor[tiab]"#),
            vec![
                word(r#""breast cancer"[MeSH Terms]"#),
                TokenKind::Operator(Operator::Or),
                word("tumor[tiab]"),
            ]
        );
    }

    #[test]
    fn test_parentheses_inside_quotes() {
        assert_eq!(kinds(r#""a (b)""#), vec![word(r#""a (b)""#)]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(
            tokenize(r#"a OR "open phrase"#),
            Err(ParseError::Unterminated {
                delimiter: '"',
                position: 5
            })
        );
        assert_eq!(
            tokenize("cancer[tiab"),
            Err(ParseError::Unterminated {
                delimiter: '[',
                position: 6
            })
        );
    }
}
