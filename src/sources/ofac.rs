use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::{RiskSource, SourceKind, fetch_page, field_text, with_query};
use crate::models::EntityResult;

pub const SEARCH_URL: &str = "https://sanctionssearch.ofac.treas.gov";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static RESULT_BLOCK: Lazy<Selector> = Lazy::new(|| selector("div.sanctioned-entity"));
static NAME: Lazy<Selector> = Lazy::new(|| selector("span.entity-name"));
static ADDRESS: Lazy<Selector> = Lazy::new(|| selector("span.address"));
static ENTITY_TYPE: Lazy<Selector> = Lazy::new(|| selector("span.entity-type"));
static PROGRAMS: Lazy<Selector> = Lazy::new(|| selector("span.programs"));
static LIST_NAME: Lazy<Selector> = Lazy::new(|| selector("span.list-name"));
static SCORE: Lazy<Selector> = Lazy::new(|| selector("span.score"));

/// OFAC sanctions list search
#[derive(Debug, Clone)]
pub struct Ofac {
    client: reqwest::Client,
    search_url: String,
}

impl Ofac {
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
impl RiskSource for Ofac {
    fn kind(&self) -> SourceKind {
        SourceKind::Ofac
    }

    async fn fetch(&self, entity_name: &str) -> Result<Vec<EntityResult>> {
        let url = with_query(&self.search_url, &[("name", entity_name)]);
        let body = fetch_page(&self.client, &url).await?;
        Ok(parse_results(&body, &self.search_url))
    }
}

fn parse_results(html: &str, search_url: &str) -> Vec<EntityResult> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT_BLOCK)
        .map(|block| EntityResult {
            address: field_text(block, &ADDRESS),
            entity_type: field_text(block, &ENTITY_TYPE),
            programs: field_text(block, &PROGRAMS),
            list_name: field_text(block, &LIST_NAME),
            score: field_text(block, &SCORE),
            url: Some(search_url.to_string()),
            ..EntityResult::new(
                field_text(block, &NAME).unwrap_or_else(|| "N/A".to_string()),
                SourceKind::Ofac,
            )
        })
        .collect()
}
