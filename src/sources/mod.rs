pub mod offshore_leaks;
pub mod ofac;
pub mod world_bank;

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::FutureExt;
use scraper::{ElementRef, Selector};
use tracing::{error, info};

use crate::error::panic_message;
use crate::models::EntityResult;

pub use offshore_leaks::OffshoreLeaks;
pub use ofac::Ofac;
pub use world_bank::WorldBank;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// The external risk lists this service knows how to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    OffshoreLeaks,
    WorldBank,
    Ofac,
}

impl SourceKind {
    /// Every source, in the order an `all` search queries them
    pub const ALL: [SourceKind; 3] = [
        SourceKind::OffshoreLeaks,
        SourceKind::WorldBank,
        SourceKind::Ofac,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SourceKind::OffshoreLeaks => "offshore_leaks",
            SourceKind::WorldBank => "world_bank",
            SourceKind::Ofac => "ofac",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::OffshoreLeaks => "Offshore Leaks Database",
            SourceKind::WorldBank => "World Bank Debarred Firms",
            SourceKind::Ofac => "OFAC Sanctions",
        }
    }

    /// Public landing page of the list, as shown in the source catalog
    pub fn url(self) -> &'static str {
        match self {
            SourceKind::OffshoreLeaks => "https://offshoreleaks.icij.org",
            SourceKind::WorldBank => world_bank::SEARCH_URL,
            SourceKind::Ofac => ofac::SEARCH_URL,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SourceKind::OffshoreLeaks => "Database of offshore entities and their jurisdictions",
            SourceKind::WorldBank => "Firms ineligible to be awarded World Bank-financed contracts",
            SourceKind::Ofac => "Sanctions lists of the US Office of Foreign Assets Control",
        }
    }

    pub fn attributes(self) -> &'static [&'static str] {
        match self {
            SourceKind::OffshoreLeaks => &["Entity", "Jurisdiction", "Linked To", "Data From"],
            SourceKind::WorldBank => &[
                "Firm Name",
                "Address",
                "Country",
                "From Date",
                "To Date",
                "Grounds",
            ],
            SourceKind::Ofac => &["Name", "Address", "Type", "Program(s)", "List", "Score"],
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Which sources a search request covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSelector {
    All,
    Only(SourceKind),
}

impl SourceSelector {
    pub const VALID_VALUES: [&'static str; 4] = ["all", "offshore_leaks", "world_bank", "ofac"];

    pub fn kinds(self) -> Vec<SourceKind> {
        match self {
            SourceSelector::All => SourceKind::ALL.to_vec(),
            SourceSelector::Only(kind) => vec![kind],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid source '{0}'. Valid sources: {}", SourceSelector::VALID_VALUES.join(", "))]
pub struct UnknownSource(pub String);

impl FromStr for SourceSelector {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SourceSelector::All),
            "offshore_leaks" => Ok(SourceSelector::Only(SourceKind::OffshoreLeaks)),
            "world_bank" => Ok(SourceSelector::Only(SourceKind::WorldBank)),
            "ofac" => Ok(SourceSelector::Only(SourceKind::Ofac)),
            other => Err(UnknownSource(other.to_string())),
        }
    }
}

/// One searchable risk list.
///
/// Implementors only provide `fetch`; `search` wraps it so that a failing
/// or panicking source is logged and contributes no hits instead of failing
/// the request.
#[async_trait]
pub trait RiskSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Query the source and map its result page into records
    async fn fetch(&self, entity_name: &str) -> Result<Vec<EntityResult>>;

    async fn search(&self, entity_name: &str) -> Vec<EntityResult> {
        let kind = self.kind();
        info!("Searching '{}' in {}", entity_name, kind.label());

        match AssertUnwindSafe(self.fetch(entity_name)).catch_unwind().await {
            Ok(Ok(results)) => {
                info!("Found {} results in {}", results.len(), kind.label());
                results
            }
            Ok(Err(e)) => {
                error!("Search in {} failed: {:#}", kind.label(), e);
                Vec::new()
            }
            Err(panic) => {
                error!(
                    "Search in {} panicked: {}",
                    kind.label(),
                    panic_message(panic.as_ref())
                );
                Vec::new()
            }
        }
    }
}

/// Build the HTTP client shared by every source
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` and return the body, treating non-2xx statuses as errors
pub(crate) async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Unexpected status from {}", url))?;

    response
        .text()
        .await
        .with_context(|| format!("Failed to read body from {}", url))
}

/// Encode query pairs onto a base URL
pub(crate) fn with_query(base: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", base, query)
}

/// Visible text of an element, whitespace-normalized; `None` when empty
pub(crate) fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    (!text.is_empty()).then_some(text)
}

/// Text of the first descendant matching `selector`
pub(crate) fn field_text(block: ElementRef<'_>, selector: &Selector) -> Option<String> {
    block.select(selector).next().and_then(element_text)
}
