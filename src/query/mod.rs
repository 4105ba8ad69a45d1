//! Query parsing module
//!
//! Turns a PubMed boolean query into a tree of AND/OR/NOT groups, finds the
//! flat OR groups eligible for pruning, and renders trees back into query
//! strings.

mod ast;
mod groups;
mod parser;
mod render;
mod tokenizer;

pub use ast::{Group, Keyword, Operator, QueryNode};
pub use groups::{find_minimal_groups, GroupPath, MinimalGroup};
pub use parser::{parse, MAX_DEPTH};
pub use render::render;
pub use tokenizer::{tokenize, Token, TokenKind};
