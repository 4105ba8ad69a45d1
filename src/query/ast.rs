//! Query tree types
//!
//! A parsed query is a tree of [`Group`]s joined by one [`Operator`] each,
//! with [`Keyword`] leaves. Trees are never edited in place: pruning a
//! keyword rebuilds the path down to the affected group and clones the
//! rest, so a rejected trial can be dropped without touching the tree it
//! was derived from.

use serde::{Deserialize, Serialize};

/// Boolean operator joining the children of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    /// The keyword PubMed expects for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }

    /// Recognize an operator word. PubMed only honours upper-case operators.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A literal search term, kept exactly as written (quotes and field tags included)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keyword(String);

impl Keyword {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operator group with at least two children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    operator: Operator,
    children: Vec<QueryNode>,
}

impl Group {
    /// Callers guarantee at least two children; see [`QueryNode::group`].
    pub(crate) fn new(operator: Operator, children: Vec<QueryNode>) -> Self {
        debug_assert!(children.len() >= 2);
        Self { operator, children }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn children(&self) -> &[QueryNode] {
        &self.children
    }

    /// True when every child is a keyword
    pub fn is_flat(&self) -> bool {
        self.children.iter().all(QueryNode::is_keyword)
    }

    /// Keywords of a flat group, in order. Nested groups are skipped.
    pub fn keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.children.iter().filter_map(QueryNode::as_keyword)
    }
}

/// A node of the query tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryNode {
    Keyword(Keyword),
    Group(Group),
}

impl QueryNode {
    pub fn keyword(text: impl Into<String>) -> Self {
        Self::Keyword(Keyword::new(text))
    }

    /// Build a group node, collapsing to the only child when there is just one.
    ///
    /// Returns `None` for an empty child list.
    pub fn group(operator: Operator, mut children: Vec<QueryNode>) -> Option<Self> {
        match children.len() {
            0 => None,
            1 => children.pop(),
            _ => Some(Self::Group(Group::new(operator, children))),
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, Self::Keyword(_))
    }

    pub fn as_keyword(&self) -> Option<&Keyword> {
        match self {
            Self::Keyword(keyword) => Some(keyword),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(group) => Some(group),
            Self::Keyword(_) => None,
        }
    }

    /// Total number of keyword leaves
    pub fn keyword_count(&self) -> usize {
        match self {
            Self::Keyword(_) => 1,
            Self::Group(group) => group.children.iter().map(QueryNode::keyword_count).sum(),
        }
    }

    /// All keyword leaves, depth-first, left to right
    pub fn keywords(&self) -> Vec<&Keyword> {
        let mut out = Vec::new();
        self.collect_keywords(&mut out);
        out
    }

    fn collect_keywords<'a>(&'a self, out: &mut Vec<&'a Keyword>) {
        match self {
            Self::Keyword(keyword) => out.push(keyword),
            Self::Group(group) => {
                for child in &group.children {
                    child.collect_keywords(out);
                }
            }
        }
    }

    /// Follow a path of child indices from this node
    pub fn node_at(&self, path: &[usize]) -> Option<&QueryNode> {
        let mut node = self;
        for &index in path {
            node = node.as_group()?.children.get(index)?;
        }
        Some(node)
    }

    /// Rebuild the tree with child `index` of the group at `path` removed.
    ///
    /// A group left with one child collapses into it. Returns `None` when the
    /// path does not lead to a group, the index is out of range, or the group
    /// would be emptied.
    pub fn without_child(&self, path: &[usize], index: usize) -> Option<QueryNode> {
        let group = self.as_group()?;
        match path.split_first() {
            None => {
                if index >= group.children.len() || group.children.len() < 2 {
                    return None;
                }
                let children = group
                    .children
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != index)
                    .map(|(_, child)| child.clone())
                    .collect();
                QueryNode::group(group.operator, children)
            }
            Some((&head, rest)) => {
                let rebuilt = group.children.get(head)?.without_child(rest, index)?;
                let mut children = group.children.clone();
                children[head] = rebuilt;
                Some(Self::Group(Group::new(group.operator, children)))
            }
        }
    }
}
