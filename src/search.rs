use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::models::SearchResponse;
use crate::sources::{
    OffshoreLeaks, Ofac, RiskSource, SourceKind, SourceSelector, WorldBank, build_http_client,
};

/// Runs a search across the configured risk lists and merges the hits.
///
/// Sources are queried one after another in registration order. A source
/// that fails contributes nothing but is still reported as searched.
#[derive(Clone)]
pub struct Aggregator {
    sources: Vec<Arc<dyn RiskSource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn RiskSource>>) -> Self {
        Self { sources }
    }

    /// The three public lists, sharing one HTTP client
    pub fn with_default_sources(timeout: std::time::Duration) -> anyhow::Result<Self> {
        let client = build_http_client(timeout)?;
        Ok(Self::new(vec![
            Arc::new(OffshoreLeaks::new(client.clone())),
            Arc::new(WorldBank::new(client.clone())),
            Arc::new(Ofac::new(client)),
        ]))
    }

    fn source_for(&self, kind: SourceKind) -> Option<&Arc<dyn RiskSource>> {
        self.sources.iter().find(|source| source.kind() == kind)
    }

    pub async fn search(&self, entity_name: &str, selector: SourceSelector) -> SearchResponse {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut sources_searched = Vec::new();

        for kind in selector.kinds() {
            let Some(source) = self.source_for(kind) else {
                continue;
            };
            results.extend(source.search(entity_name).await);
            sources_searched.push(kind.label().to_string());
        }

        let search_time = start.elapsed().as_secs_f64();
        info!(
            "Search for '{}' finished with {} hits from {} sources in {:.2}s",
            entity_name,
            results.len(),
            sources_searched.len(),
            search_time
        );

        SearchResponse::new(
            entity_name.to_string(),
            search_time,
            sources_searched,
            results,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityResult;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned source with a fixed number of hits
    struct StubSource {
        kind: SourceKind,
        hits: usize,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn hits(kind: SourceKind, hits: usize) -> Arc<Self> {
            Arc::new(Self {
                kind,
                hits,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(kind: SourceKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                hits: 0,
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RiskSource for StubSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn fetch(&self, entity_name: &str) -> Result<Vec<EntityResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("connection reset"));
            }
            Ok((0..self.hits)
                .map(|i| EntityResult::new(format!("{} #{}", entity_name, i), self.kind))
                .collect())
        }
    }

    fn labels(kinds: &[SourceKind]) -> Vec<String> {
        kinds.iter().map(|k| k.label().to_string()).collect()
    }

    #[tokio::test]
    async fn test_all_queries_every_source_in_order() {
        let aggregator = Aggregator::new(vec![
            StubSource::hits(SourceKind::OffshoreLeaks, 1),
            StubSource::hits(SourceKind::WorldBank, 2),
            StubSource::hits(SourceKind::Ofac, 0),
        ]);

        let response = aggregator.search("Acme", SourceSelector::All).await;

        assert_eq!(response.sources_searched, labels(&SourceKind::ALL));
        assert_eq!(response.total_hits, 3);
        assert_eq!(response.total_hits, response.results.len());
        let sources: Vec<_> = response.results.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(
            sources,
            vec![
                "Offshore Leaks Database",
                "World Bank Debarred Firms",
                "World Bank Debarred Firms"
            ]
        );
    }

    #[tokio::test]
    async fn test_all_reports_sources_even_without_hits() {
        let aggregator = Aggregator::new(vec![
            StubSource::hits(SourceKind::OffshoreLeaks, 0),
            StubSource::hits(SourceKind::WorldBank, 0),
            StubSource::hits(SourceKind::Ofac, 0),
        ]);

        let response = aggregator.search("Nobody", SourceSelector::All).await;
        assert_eq!(response.total_hits, 0);
        assert!(response.results.is_empty());
        assert_eq!(response.sources_searched, labels(&SourceKind::ALL));
    }

    #[tokio::test]
    async fn test_single_source_runs_only_that_lookup() {
        let offshore = StubSource::hits(SourceKind::OffshoreLeaks, 4);
        let world_bank = StubSource::hits(SourceKind::WorldBank, 4);
        let ofac = StubSource::hits(SourceKind::Ofac, 2);
        let aggregator = Aggregator::new(vec![offshore.clone(), world_bank.clone(), ofac.clone()]);

        let response = aggregator
            .search("Acme", SourceSelector::Only(SourceKind::Ofac))
            .await;

        assert_eq!(response.sources_searched, vec!["OFAC Sanctions".to_string()]);
        assert_eq!(response.total_hits, 2);
        assert_eq!(offshore.calls.load(Ordering::SeqCst), 0);
        assert_eq!(world_bank.calls.load(Ordering::SeqCst), 0);
        assert_eq!(ofac.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_source_contributes_nothing() {
        let aggregator = Aggregator::new(vec![
            StubSource::failing(SourceKind::OffshoreLeaks),
            StubSource::hits(SourceKind::WorldBank, 2),
            StubSource::hits(SourceKind::Ofac, 3),
        ]);

        let response = aggregator.search("Acme", SourceSelector::All).await;

        assert_eq!(response.total_hits, 5);
        assert_eq!(response.sources_searched, labels(&SourceKind::ALL));
        assert!(
            response
                .results
                .iter()
                .all(|r| r.source != "Offshore Leaks Database")
        );
    }

    #[tokio::test]
    async fn test_all_sources_failing_yields_empty_response() {
        let aggregator = Aggregator::new(vec![
            StubSource::failing(SourceKind::OffshoreLeaks),
            StubSource::failing(SourceKind::WorldBank),
            StubSource::failing(SourceKind::Ofac),
        ]);

        let response = aggregator.search("Acme", SourceSelector::All).await;
        assert_eq!(response.entity_name, "Acme");
        assert_eq!(response.total_hits, 0);
        assert!(response.search_time >= 0.0);
    }
}
