//! Query reconstruction
//!
//! Every keyword is wrapped in parentheses and every nested group is
//! parenthesized, so the output never relies on operator precedence.

use super::ast::{Group, QueryNode};

/// Render a query tree back into a PubMed query string
pub fn render(tree: &QueryNode) -> String {
    match tree {
        QueryNode::Keyword(_) => render_node(tree),
        QueryNode::Group(group) => render_children(group),
    }
}

fn render_node(node: &QueryNode) -> String {
    match node {
        // verbatim: quoting a phrase would switch off PubMed term mapping
        QueryNode::Keyword(keyword) => format!("({})", keyword),
        QueryNode::Group(group) => format!("({})", render_children(group)),
    }
}

fn render_children(group: &Group) -> String {
    let separator = format!(" {} ", group.operator());
    group
        .children()
        .iter()
        .map(render_node)
        .collect::<Vec<_>>()
        .join(&separator)
}
