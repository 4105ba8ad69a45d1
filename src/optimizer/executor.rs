//! The pruning loop
//!
//! Each minimal OR group is entered with a fresh baseline count for the
//! whole query. Keywords are then tried for removal left to right; the first
//! removal that keeps the count identical is accepted and the pass restarts
//! over the group's remaining keywords. A group is done when a full pass
//! removes nothing or only one keyword is left.

use super::models::{GroupOutcome, GroupReport, OptimizationReport};
use crate::error::{OptimizationError, SearchError};
use crate::metrics::Metrics;
use crate::query::{find_minimal_groups, parse, render, GroupPath, MinimalGroup, QueryNode};
use crate::search::SearchCapability;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Baseline search failure, before it is tied to a query string
struct BaselineFailure {
    group: String,
    source: SearchError,
}

impl BaselineFailure {
    fn into_error(self, query: &str) -> OptimizationError {
        OptimizationError::Baseline {
            query: query.to_string(),
            group: self.group,
            source: self.source,
        }
    }
}

/// Bookkeeping for one run
#[derive(Default)]
struct RunLog {
    result_count: Option<u64>,
    groups: Vec<GroupReport>,
    searches: u64,
}

/// Removes redundant keywords from minimal OR groups using live result counts
pub struct Optimizer<'a> {
    search: &'a dyn SearchCapability,
    metrics: Option<Arc<Metrics>>,
}

impl<'a> Optimizer<'a> {
    pub fn new(search: &'a dyn SearchCapability) -> Self {
        Self {
            search,
            metrics: None,
        }
    }

    /// Attach the metrics collector the search capability reports into
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Parse, optimize, and report on a raw query
    pub async fn run(&self, query: &str) -> Result<OptimizationReport, OptimizationError> {
        let tree = parse(query).map_err(|source| OptimizationError::Parse {
            query: query.to_string(),
            source,
        })?;
        let normalized_query = render(&tree);

        info!(
            "Optimizing query with {} keywords using {}",
            tree.keyword_count(),
            self.search.name()
        );

        let mut log = RunLog::default();
        let optimized = self
            .optimize_tree(tree, &mut log)
            .await
            .map_err(|failure| failure.into_error(query))?;

        let excluded_keywords = log
            .groups
            .iter()
            .flat_map(|g| g.removed.iter().cloned())
            .collect::<Vec<_>>();

        info!(
            "Removed {} keywords in {} searches",
            excluded_keywords.len(),
            log.searches
        );

        Ok(OptimizationReport {
            original_query: query.to_string(),
            normalized_query,
            optimized_query: render(&optimized),
            result_count: log.result_count,
            excluded_keywords,
            groups: log.groups,
            searches: log.searches,
            metrics: self.metrics.as_ref().map(|m| m.snapshot()),
        })
    }

    /// Optimize an already parsed tree and return the pruned tree
    pub async fn optimize(&self, tree: QueryNode) -> Result<QueryNode, OptimizationError> {
        let query = render(&tree);
        let mut log = RunLog::default();
        self.optimize_tree(tree, &mut log)
            .await
            .map_err(|failure| failure.into_error(&query))
    }

    async fn optimize_tree(
        &self,
        mut tree: QueryNode,
        log: &mut RunLog,
    ) -> Result<QueryNode, BaselineFailure> {
        // Pruning can turn a parent into a minimal group, so the groups are
        // recomputed after every one that finishes.
        let mut done: HashSet<GroupPath> = HashSet::new();

        loop {
            let next = find_minimal_groups(&tree)
                .into_iter()
                .find(|group| !done.contains(&group.path));
            let Some(group) = next else {
                break;
            };

            done.insert(group.path.clone());
            tree = self.optimize_group(tree, group, log).await?;
        }

        Ok(tree)
    }

    async fn optimize_group(
        &self,
        mut tree: QueryNode,
        group: MinimalGroup,
        log: &mut RunLog,
    ) -> Result<QueryNode, BaselineFailure> {
        let label = tree.node_at(&group.path).map(render).unwrap_or_default();
        info!("Optimizing group {} ({} keywords)", label, group.len());

        let baseline = match self.count(&render(&tree), log).await {
            Ok(count) => count,
            Err(source) => {
                error!("Baseline search for group {} failed: {}", label, source);
                return Err(BaselineFailure {
                    group: label,
                    source,
                });
            }
        };
        log.result_count.get_or_insert(baseline);
        debug!("Baseline for group {}: {}", label, baseline);

        let mut removed = Vec::new();
        let mut abandoned = None;

        'passes: loop {
            // A group reduced to one keyword has collapsed into it
            let Some(current) = tree.node_at(&group.path).and_then(QueryNode::as_group) else {
                break;
            };
            let keywords: Vec<String> = current.keywords().map(|k| k.as_str().to_string()).collect();

            let mut accepted = false;
            for (index, keyword) in keywords.iter().enumerate() {
                let Some(trial) = tree.without_child(&group.path, index) else {
                    continue;
                };

                match self.count(&render(&trial), log).await {
                    Ok(count) if count == baseline => {
                        debug!("Removing {:?} keeps {} results: accepted", keyword, count);
                        removed.push(keyword.clone());
                        tree = trial;
                        accepted = true;
                        break;
                    }
                    Ok(count) => {
                        debug!(
                            "Removing {:?} changes results {} -> {}: rejected",
                            keyword, baseline, count
                        );
                    }
                    Err(e) => {
                        warn!(
                            "Abandoning group {}: search failed while trying to remove {:?}: {}",
                            label, keyword, e
                        );
                        abandoned = Some(e.to_string());
                        break 'passes;
                    }
                }
            }

            if !accepted {
                break;
            }
        }

        let kept = match tree.node_at(&group.path) {
            Some(node) => node.keywords().iter().map(|k| k.as_str().to_string()).collect(),
            None => Vec::new(),
        };

        let outcome = match abandoned {
            Some(reason) => GroupOutcome::Abandoned { reason },
            None if removed.is_empty() => {
                info!("Group {} unchanged", label);
                GroupOutcome::Unchanged
            }
            None => {
                info!("Group {} optimized: removed {:?}", label, removed);
                GroupOutcome::Optimized
            }
        };

        log.groups.push(GroupReport {
            path: group.path,
            keywords: group.keywords,
            removed,
            kept,
            baseline,
            outcome,
        });

        Ok(tree)
    }

    async fn count(&self, query: &str, log: &mut RunLog) -> Result<u64, SearchError> {
        log.searches += 1;
        self.search.execute_search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Deterministic stand-in for PubMed: counts come from a table
    struct StubSearch {
        counts: HashMap<String, u64>,
        default: Option<u64>,
        failing: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSearch {
        fn new(counts: &[(&str, u64)]) -> Self {
            Self {
                counts: counts.iter().map(|(q, c)| (q.to_string(), *c)).collect(),
                default: None,
                failing: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Count returned for queries missing from the table
        fn otherwise(mut self, count: u64) -> Self {
            self.default = Some(count);
            self
        }

        fn failing_on(mut self, query: &str) -> Self {
            self.failing.push(query.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchCapability for StubSearch {
        fn name(&self) -> &str {
            "stub"
        }

        async fn execute_search(&self, query: &str) -> Result<u64, SearchError> {
            self.calls.lock().unwrap().push(query.to_string());
            if self.failing.iter().any(|q| q == query) {
                return Err(SearchError::Timeout);
            }
            self.counts
                .get(query)
                .copied()
                .or(self.default)
                .ok_or_else(|| SearchError::ResultCount(format!("unexpected query {query}")))
        }
    }

    #[tokio::test]
    async fn test_prunes_redundant_synonym() {
        let stub = StubSearch::new(&[
            ("((cancer) OR (neoplasm)) AND (therapy)", 500),
            ("(neoplasm) AND (therapy)", 450),
            ("(cancer) AND (therapy)", 500),
        ]);

        let report = Optimizer::new(&stub)
            .run("(cancer OR neoplasm) AND therapy")
            .await
            .unwrap();

        assert_eq!(report.optimized_query, "(cancer) AND (therapy)");
        assert_eq!(report.excluded_keywords, vec!["neoplasm"]);
        assert_eq!(report.result_count, Some(500));
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].outcome, GroupOutcome::Optimized);
        assert_eq!(report.groups[0].kept, vec!["cancer"]);
        // baseline + two trials, nothing tried once one keyword is left
        assert_eq!(report.searches, 3);
        assert_eq!(stub.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_greedy_pass_restarts_after_acceptance() {
        let stub = StubSearch::new(&[
            ("(fever) OR (cough) OR (cold)", 1000),
            ("(cough) OR (cold)", 800),
            ("(fever) OR (cold)", 1000),
            ("(cold)", 700),
            ("(fever)", 900),
        ]);

        let report = Optimizer::new(&stub)
            .run("fever OR cough OR cold")
            .await
            .unwrap();

        assert_eq!(report.optimized_query, "(fever) OR (cold)");
        assert_eq!(report.excluded_keywords, vec!["cough"]);
        assert_eq!(
            stub.calls(),
            vec![
                "(fever) OR (cough) OR (cold)",
                "(cough) OR (cold)",
                "(fever) OR (cold)",
                "(cold)",
                "(fever)",
            ]
        );
    }

    #[tokio::test]
    async fn test_no_op_when_every_keyword_matters() {
        let stub = StubSearch::new(&[("(a) OR (b) OR (c)", 30)]).otherwise(20);
        let tree = parse("a OR b OR c").unwrap();

        let optimized = Optimizer::new(&stub).optimize(tree.clone()).await.unwrap();
        assert_eq!(optimized, tree);
    }

    #[tokio::test]
    async fn test_never_prunes_below_one_keyword() {
        // every removal keeps the count, yet one keyword must remain
        let stub = StubSearch::new(&[]).otherwise(42);
        let report = Optimizer::new(&stub).run("a OR b OR c OR d").await.unwrap();

        assert_eq!(report.optimized_query, "(d)");
        assert_eq!(report.excluded_keywords, vec!["a", "b", "c"]);
        assert_eq!(report.groups[0].kept, vec!["d"]);
    }

    #[tokio::test]
    async fn test_single_keyword_is_not_searched() {
        let stub = StubSearch::new(&[]);
        let report = Optimizer::new(&stub).run("cancer").await.unwrap();

        assert_eq!(report.optimized_query, "(cancer)");
        assert_eq!(report.result_count, None);
        assert!(report.groups.is_empty());
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_trial_failure_abandons_only_that_group() {
        let stub = StubSearch::new(&[("((a) OR (b)) AND ((c) OR (d))", 10)])
            .otherwise(5)
            .failing_on("(b) AND ((c) OR (d))");

        let report = Optimizer::new(&stub)
            .run("(a OR b) AND (c OR d)")
            .await
            .unwrap();

        assert!(report.groups[0].outcome.is_abandoned());
        assert!(report.groups[0].removed.is_empty());
        assert!(!report.groups[1].outcome.is_abandoned());
        assert!(!report.is_complete());
        assert_eq!(report.optimized_query, "((a) OR (b)) AND ((c) OR (d))");
    }

    #[tokio::test]
    async fn test_failure_after_accepted_removal_keeps_it() {
        let stub = StubSearch::new(&[
            ("(a) OR (b) OR (c)", 60),
            ("(b) OR (c)", 60),
            ("(a) OR (c)", 40),
        ])
        .failing_on("(c)");

        let report = Optimizer::new(&stub).run("a OR b OR c").await.unwrap();

        assert_eq!(report.optimized_query, "(b) OR (c)");
        assert_eq!(report.excluded_keywords, vec!["a"]);
        assert_eq!(report.groups[0].removed, vec!["a"]);
        assert_eq!(report.groups[0].kept, vec!["b", "c"]);
        assert!(report.groups[0].outcome.is_abandoned());
        assert_eq!(report.result_count, Some(60));
    }

    #[tokio::test]
    async fn test_baseline_failure_is_fatal() {
        let stub = StubSearch::new(&[]).failing_on("(a) OR (b)");
        let err = Optimizer::new(&stub).run("a OR b").await.unwrap_err();

        match err {
            OptimizationError::Baseline {
                query,
                group,
                source,
            } => {
                assert_eq!(query, "a OR b");
                assert_eq!(group, "(a) OR (b)");
                assert_eq!(source, SearchError::Timeout);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_parse_error_is_reported_with_query() {
        let stub = StubSearch::new(&[]);
        let err = Optimizer::new(&stub).run("(a AND OR b)").await.unwrap_err();

        assert!(matches!(err, OptimizationError::Parse { .. }));
        assert_eq!(err.query(), "(a AND OR b)");
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_parent_becomes_minimal_after_child_collapses() {
        let stub = StubSearch::new(&[
            ("((a) OR (b)) OR (c)", 100),
            ("(b) OR (c)", 90),
            ("(a) OR (c)", 100),
            ("(c)", 60),
            ("(a)", 70),
        ]);

        let report = Optimizer::new(&stub).run("(a OR b) OR c").await.unwrap();

        assert_eq!(report.optimized_query, "(a) OR (c)");
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].path, vec![0]);
        assert_eq!(report.groups[1].path, Vec::<usize>::new());
        assert_eq!(report.groups[1].outcome, GroupOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_runs_are_deterministic() {
        let query = "(heart attack OR myocardial infarction OR MI) AND (aspirin OR ASA)";
        let counts = [
            (
                "((heart attack) OR (myocardial infarction) OR (MI)) AND ((aspirin) OR (ASA))",
                321,
            ),
            (
                "((heart attack) OR (myocardial infarction)) AND ((aspirin) OR (ASA))",
                321,
            ),
            ("((heart attack) OR (myocardial infarction)) AND (aspirin)", 321),
        ];

        let first = Optimizer::new(&StubSearch::new(&counts).otherwise(1))
            .run(query)
            .await
            .unwrap();
        let second = Optimizer::new(&StubSearch::new(&counts).otherwise(1))
            .run(query)
            .await
            .unwrap();

        assert_eq!(first.optimized_query, second.optimized_query);
        assert_eq!(
            first.optimized_query,
            "((heart attack) OR (myocardial infarction)) AND (aspirin)"
        );
        assert_eq!(first.excluded_keywords, vec!["MI", "ASA"]);
    }

    #[tokio::test]
    async fn test_removed_keywords_restore_baseline() {
        let stub = StubSearch::new(&[
            ("((x) OR (y) OR (z)) AND (w)", 50),
            ("((x) OR (z)) AND (w)", 50),
        ])
        .otherwise(10);

        let report = Optimizer::new(&stub).run("(x OR y OR z) AND w").await.unwrap();
        assert_eq!(report.excluded_keywords, vec!["y"]);

        // putting the removed keyword back gives the normalized query and its count
        let restored = parse("(x OR y OR z) AND w").unwrap();
        assert_eq!(render(&restored), report.normalized_query);
        assert_eq!(stub.execute_search(&report.normalized_query).await, Ok(50));
        assert!(
            parse(&report.optimized_query).unwrap().keyword_count()
                < restored.keyword_count()
        );
    }
}
