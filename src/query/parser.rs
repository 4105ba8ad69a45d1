//! Recursive-descent parser for PubMed boolean queries
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or      := and ("OR" and)*
//! and     := primary (("AND" | "NOT") primary)*
//! primary := "(" or ")" | word+
//! ```
//!
//! Adjacent words with no operator between them form a single keyword.
//! Parenthesized groups may nest at most [`MAX_DEPTH`] levels deep.

use super::ast::{Group, Operator, QueryNode};
use super::tokenizer::{tokenize, Token, TokenKind};
use crate::error::ParseError;

/// Deepest parenthesis nesting accepted
pub const MAX_DEPTH: usize = 256;

/// Parse a raw query string into a query tree
pub fn parse(input: &str) -> Result<QueryNode, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let root = parser.parse_or()?;

    match parser.peek() {
        None => Ok(root),
        Some(Token {
            kind: TokenKind::Close,
            position,
        }) => Err(ParseError::UnmatchedClose {
            position: *position,
        }),
        Some(token) => Err(ParseError::MissingOperator {
            position: token.position,
        }),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Open parentheses enclosing the current position
    depth: usize,
}

impl Parser {
    fn parse_or(&mut self) -> Result<QueryNode, ParseError> {
        let mut children = vec![self.parse_and()?];

        while let Some((op, position)) = self.eat_operator(|op| op == Operator::Or) {
            self.expect_operand(op, position)?;
            children.push(self.parse_and()?);
        }

        Ok(join(Operator::Or, children))
    }

    fn parse_and(&mut self) -> Result<QueryNode, ParseError> {
        let mut operator = None;
        let mut children = vec![self.parse_primary()?];

        while let Some((op, position)) = self.eat_operator(|op| op != Operator::Or) {
            self.expect_operand(op, position)?;
            let operand = self.parse_primary()?;

            match operator {
                // AND and NOT associate left: close the run so far
                Some(current) if current != op => {
                    let left = join(current, std::mem::take(&mut children));
                    children = vec![left, operand];
                }
                _ => children.push(operand),
            }
            operator = Some(op);
        }

        Ok(match operator {
            Some(op) => join(op, children),
            None => join(Operator::And, children),
        })
    }

    fn parse_primary(&mut self) -> Result<QueryNode, ParseError> {
        let Some(token) = self.next() else {
            return Err(ParseError::Empty);
        };

        match token.kind {
            TokenKind::Open => {
                if let Some(Token {
                    kind: TokenKind::Close,
                    ..
                }) = self.peek()
                {
                    return Err(ParseError::EmptyGroup {
                        position: token.position,
                    });
                }

                if self.depth >= MAX_DEPTH {
                    return Err(ParseError::TooDeep {
                        position: token.position,
                    });
                }

                self.depth += 1;
                let node = self.parse_or()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token {
                        kind: TokenKind::Close,
                        ..
                    }) => Ok(node),
                    Some(other) => Err(ParseError::MissingOperator {
                        position: other.position,
                    }),
                    None => Err(ParseError::UnmatchedOpen {
                        position: token.position,
                    }),
                }
            }
            TokenKind::Word(first) => {
                let mut words = vec![first];
                while let Some(Token {
                    kind: TokenKind::Word(word),
                    ..
                }) = self.peek()
                {
                    words.push(word.clone());
                    self.pos += 1;
                }
                Ok(QueryNode::keyword(words.join(" ")))
            }
            TokenKind::Operator(operator) => Err(ParseError::MissingOperand {
                operator,
                position: token.position,
            }),
            TokenKind::Close => Err(ParseError::UnmatchedClose {
                position: token.position,
            }),
        }
    }

    /// Consume the next token if it is an operator accepted by `accept`
    fn eat_operator(&mut self, accept: impl Fn(Operator) -> bool) -> Option<(Operator, usize)> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Operator(op),
                position,
            }) if accept(*op) => {
                let found = (*op, *position);
                self.pos += 1;
                Some(found)
            }
            _ => None,
        }
    }

    /// The token after an operator must start an operand
    fn expect_operand(&self, operator: Operator, position: usize) -> Result<(), ParseError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Word(_) | TokenKind::Open,
                ..
            }) => Ok(()),
            _ => Err(ParseError::MissingOperand { operator, position }),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }
}

/// Join parsed operands, collapsing a single operand to itself
fn join(operator: Operator, mut children: Vec<QueryNode>) -> QueryNode {
    if children.len() == 1 {
        children.remove(0)
    } else {
        QueryNode::Group(Group::new(operator, children))
    }
}
