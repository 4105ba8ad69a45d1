//! Minimal OR-group identification

use super::ast::{Operator, QueryNode};
use serde::{Deserialize, Serialize};

/// Child indices leading from the root to a node
pub type GroupPath = Vec<usize>;

/// A flat OR group of keywords, the unit the optimizer prunes.
///
/// This is a snapshot: the path is only meaningful for the tree it was
/// computed from, until that tree is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalGroup {
    pub path: GroupPath,
    pub keywords: Vec<String>,
}

impl MinimalGroup {
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Find every OR group whose children are all keywords, depth-first, left to right
pub fn find_minimal_groups(tree: &QueryNode) -> Vec<MinimalGroup> {
    let mut groups = Vec::new();
    let mut path = Vec::new();
    visit(tree, &mut path, &mut groups);
    groups
}

fn visit(node: &QueryNode, path: &mut GroupPath, out: &mut Vec<MinimalGroup>) {
    let Some(group) = node.as_group() else {
        return;
    };

    if group.operator() == Operator::Or && group.is_flat() {
        out.push(MinimalGroup {
            path: path.clone(),
            keywords: group.keywords().map(|k| k.as_str().to_string()).collect(),
        });
        return;
    }

    for (index, child) in group.children().iter().enumerate() {
        path.push(index);
        visit(child, path, out);
        path.pop();
    }
}
