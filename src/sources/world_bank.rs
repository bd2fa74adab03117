use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::{RiskSource, SourceKind, element_text, fetch_page, with_query};
use crate::models::EntityResult;

pub const SEARCH_URL: &str =
    "https://projects.worldbank.org/en/projects-operations/procurement/debarred-firms";

/// Rows with fewer cells than this are not firm entries
const MIN_CELLS: usize = 4;

static ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr.debarred-firm").expect("valid selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));

/// World Bank listing of debarred and cross-debarred firms
#[derive(Debug, Clone)]
pub struct WorldBank {
    client: reqwest::Client,
    search_url: String,
}

impl WorldBank {
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
impl RiskSource for WorldBank {
    fn kind(&self) -> SourceKind {
        SourceKind::WorldBank
    }

    async fn fetch(&self, entity_name: &str) -> Result<Vec<EntityResult>> {
        let url = with_query(&self.search_url, &[("search", entity_name)]);
        let body = fetch_page(&self.client, &url).await?;
        Ok(parse_results(&body, &self.search_url))
    }
}

/// Columns: firm name, address, country, from date, to date, grounds
fn parse_results(html: &str, search_url: &str) -> Vec<EntityResult> {
    let document = Html::parse_document(html);

    document
        .select(&ROW)
        .filter_map(|row| {
            let cells: Vec<Option<String>> = row.select(&CELL).map(element_text).collect();
            if cells.len() < MIN_CELLS {
                return None;
            }
            let cell = |i: usize| cells.get(i).cloned().flatten();

            Some(EntityResult {
                address: cell(1),
                country: cell(2),
                from_date: cell(3),
                to_date: cell(4),
                grounds: cell(5),
                url: Some(search_url.to_string()),
                ..EntityResult::new(
                    cell(0).unwrap_or_else(|| "N/A".to_string()),
                    SourceKind::WorldBank,
                )
            })
        })
        .collect()
}
