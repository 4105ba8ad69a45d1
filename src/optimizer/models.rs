//! Optimization report models

use crate::metrics::MetricsSnapshot;
use crate::query::GroupPath;
use serde::{Deserialize, Serialize};

/// How optimization of one minimal OR group ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupOutcome {
    /// At least one keyword was removed and every remaining one was checked
    Optimized,
    /// Every keyword changed the count when removed
    Unchanged,
    /// A trial search failed; the remaining keywords were not all checked
    Abandoned { reason: String },
}

impl GroupOutcome {
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned { .. })
    }
}

/// Result of optimizing one minimal OR group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    /// Location of the group in the tree it was found in
    pub path: GroupPath,
    /// Keywords when the group was entered
    pub keywords: Vec<String>,
    /// Keywords removed, in removal order
    pub removed: Vec<String>,
    /// Keywords left in the group
    pub kept: Vec<String>,
    /// Result count every trial had to match
    pub baseline: u64,
    pub outcome: GroupOutcome,
}

/// Summary of a full optimization run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Query as given
    pub original_query: String,
    /// The parsed query rendered back, before any pruning
    pub normalized_query: String,
    /// The pruned query
    pub optimized_query: String,
    /// Result count of the query; `None` when nothing needed a search
    pub result_count: Option<u64>,
    /// Every removed keyword, in removal order
    pub excluded_keywords: Vec<String>,
    pub groups: Vec<GroupReport>,
    /// Searches requested by the optimizer, cache hits included
    pub searches: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsSnapshot>,
}

impl OptimizationReport {
    /// Link to the optimized query on the PubMed website
    pub fn pubmed_url(&self) -> String {
        format!(
            "https://pubmed.ncbi.nlm.nih.gov/?term={}",
            urlencoding::encode(&self.optimized_query)
        )
    }

    pub fn abandoned_groups(&self) -> impl Iterator<Item = &GroupReport> {
        self.groups.iter().filter(|g| g.outcome.is_abandoned())
    }

    pub fn is_complete(&self) -> bool {
        self.abandoned_groups().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(optimized: &str) -> OptimizationReport {
        OptimizationReport {
            original_query: optimized.to_string(),
            normalized_query: optimized.to_string(),
            optimized_query: optimized.to_string(),
            result_count: None,
            excluded_keywords: vec![],
            groups: vec![],
            searches: 0,
            metrics: None,
        }
    }

    #[test]
    fn test_pubmed_url_is_encoded() {
        let report = report("(cancer) AND (therapy)");
        assert_eq!(
            report.pubmed_url(),
            "https://pubmed.ncbi.nlm.nih.gov/?term=%28cancer%29%20AND%20%28therapy%29"
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&GroupOutcome::Abandoned {
            reason: "request timed out".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"abandoned","reason":"request timed out"}"#);

        let mut report = report("(a)");
        assert!(report.is_complete());
        report.groups.push(GroupReport {
            path: vec![],
            keywords: vec!["a".into(), "b".into()],
            removed: vec![],
            kept: vec!["a".into(), "b".into()],
            baseline: 1,
            outcome: GroupOutcome::Abandoned {
                reason: "x".into(),
            },
        });
        assert!(!report.is_complete());
    }
}
