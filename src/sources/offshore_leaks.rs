use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::{RiskSource, SourceKind, fetch_page, field_text, with_query};
use crate::models::EntityResult;

pub const SEARCH_URL: &str = "https://offshoreleaks.icij.org/search";

static RESULT_BLOCK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.search-result").expect("valid selector"));
static NAME: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3.entity-name").expect("valid selector"));
static JURISDICTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.jurisdiction").expect("valid selector"));
static LINKED_TO: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.linked-to").expect("valid selector"));
static DATA_FROM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.data-from").expect("valid selector"));

/// ICIJ Offshore Leaks Database, entity category
#[derive(Debug, Clone)]
pub struct OffshoreLeaks {
    client: reqwest::Client,
    search_url: String,
}

impl OffshoreLeaks {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_search_url(client, SEARCH_URL)
    }

    pub fn with_search_url(client: reqwest::Client, search_url: impl Into<String>) -> Self {
        Self {
            client,
            search_url: search_url.into(),
        }
    }
}

#[async_trait]
impl RiskSource for OffshoreLeaks {
    fn kind(&self) -> SourceKind {
        SourceKind::OffshoreLeaks
    }

    async fn fetch(&self, entity_name: &str) -> Result<Vec<EntityResult>> {
        // cat=1 restricts the search to entities; first page of 20 only
        let url = with_query(
            &self.search_url,
            &[("q", entity_name), ("cat", "1"), ("from", "0"), ("size", "20")],
        );
        let body = fetch_page(&self.client, &url).await?;
        Ok(parse_results(&body, &self.search_url))
    }
}

fn parse_results(html: &str, search_url: &str) -> Vec<EntityResult> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT_BLOCK)
        .map(|block| EntityResult {
            jurisdiction: field_text(block, &JURISDICTION),
            linked_to: field_text(block, &LINKED_TO),
            data_from: field_text(block, &DATA_FROM),
            url: Some(search_url.to_string()),
            ..EntityResult::new(
                field_text(block, &NAME).unwrap_or_else(|| "N/A".to_string()),
                SourceKind::OffshoreLeaks,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
        <html><body>
          <div class="search-result">
            <h3 class="entity-name"> Acme Offshore Ltd. </h3>
            <span class="jurisdiction">British Virgin Islands</span>
            <span class="linked-to">Mossack Fonseca</span>
            <span class="data-from">Panama Papers</span>
          </div>
          <div class="search-result">
            <span class="jurisdiction">Bahamas</span>
          </div>
          <div class="unrelated"><h3 class="entity-name">Ignored</h3></div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results() {
        let results = parse_results(PAGE, SEARCH_URL);
        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.name, "Acme Offshore Ltd.");
        assert_eq!(first.source, "Offshore Leaks Database");
        assert_eq!(first.jurisdiction.as_deref(), Some("British Virgin Islands"));
        assert_eq!(first.linked_to.as_deref(), Some("Mossack Fonseca"));
        assert_eq!(first.data_from.as_deref(), Some("Panama Papers"));
        assert_eq!(first.url.as_deref(), Some(SEARCH_URL));
        assert_eq!(first.country, None);

        let second = &results[1];
        assert_eq!(second.name, "N/A");
        assert_eq!(second.jurisdiction.as_deref(), Some("Bahamas"));
        assert_eq!(second.linked_to, None);
    }

    #[test]
    fn test_parse_results_empty_page() {
        assert!(parse_results("<html><body>No results</body></html>", SEARCH_URL).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_sends_entity_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Acme Offshore"))
            .and(query_param("cat", "1"))
            .and(query_param("size", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let search_url = format!("{}/search", server.uri());
        let source = OffshoreLeaks::with_search_url(reqwest::Client::new(), search_url.clone());
        let results = source.search("Acme Offshore").await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url.as_deref(), Some(search_url.as_str()));
    }

    #[tokio::test]
    async fn test_search_swallows_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source =
            OffshoreLeaks::with_search_url(reqwest::Client::new(), format!("{}/search", server.uri()));
        assert!(source.fetch("Acme").await.is_err());
        assert!(source.search("Acme").await.is_empty());
    }
}
