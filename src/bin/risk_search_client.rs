// risk_search_client.rs – walks through the Risk Lists Search API against a
// running server: health, source catalog, a few searches, the error paths and
// optionally the rate limit.
//
// RISK_API_URL (default http://localhost:8000) and API_TOKEN select the
// server and credentials. Pass `--rate-limit` to hammer /search until 429.

use anyhow::{Result, anyhow};
use reqwest::StatusCode;
use risk_lists_svc::auth::DEFAULT_API_TOKEN;
use risk_lists_svc::models::SearchResponse;
use serde_json::{Value, json};
use std::time::Duration;

struct RiskListsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RiskListsClient {
    fn new(base_url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn search(&self, entity_name: &str, source: &str) -> Result<SearchResponse> {
        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({ "entity_name": entity_name, "source": source }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body["message"].as_str().unwrap_or("no message");
        match status {
            StatusCode::UNAUTHORIZED => Err(anyhow!("Invalid authentication token: {}", message)),
            StatusCode::TOO_MANY_REQUESTS => Err(anyhow!(
                "Rate limit exceeded, retry after {}s",
                body["retry_after"].as_u64().unwrap_or(60)
            )),
            _ => Err(anyhow!("HTTP {}: {}", status.as_u16(), message)),
        }
    }
}

fn print_search(result: Result<SearchResponse>) {
    match result {
        Ok(response) => {
            println!("   ✅ Found {} results", response.total_hits);
            println!("   ⏱️  Search time: {:.2}s", response.search_time);
            println!("   📍 Sources: {}", response.sources_searched.join(", "));
            for (i, entity) in response.results.iter().enumerate().take(3) {
                println!("   {}. {} - {}", i + 1, entity.name, entity.source);
            }
        }
        Err(e) => println!("   ❌ Error: {}", e),
    }
}

async fn exercise_rate_limit(client: &RiskListsClient) {
    println!("\n🧪 Testing rate limiting...");
    for i in 1..=25 {
        println!("   Request {}/25...", i);
        match client.search("Test Entity", "all").await {
            Ok(_) => {}
            Err(e) if e.to_string().contains("Rate limit") => {
                println!("   ✅ Rate limiting works: {}", e);
                return;
            }
            Err(e) => {
                println!("   ❌ Unexpected error: {}", e);
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    println!("   ⚠️  25 requests went through without hitting the limit");
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("🔍 Risk Lists Search API - Usage Examples");
    println!("{}", "=".repeat(60));

    let base_url =
        std::env::var("RISK_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let token = std::env::var("API_TOKEN").unwrap_or_else(|_| DEFAULT_API_TOKEN.to_string());
    let client = RiskListsClient::new(&base_url, &token)?;

    println!("\n1. Checking API health...");
    match client.get_json("/health").await {
        Ok(health) => {
            println!("✅ API is up");
            println!("   Status: {}", health["status"].as_str().unwrap_or("N/A"));
            println!("   Version: {}", health["version"].as_str().unwrap_or("N/A"));
        }
        Err(e) => {
            println!("❌ Error: {}", e);
            println!("Make sure the API is running at {}", base_url);
            return Ok(());
        }
    }

    println!("\n2. Fetching available sources...");
    match client.get_json("/sources").await {
        Ok(catalog) => {
            println!("📊 Available sources:");
            for source in catalog["sources"].as_array().into_iter().flatten() {
                println!(
                    "   • {} ({})",
                    source["name"].as_str().unwrap_or("?"),
                    source["id"].as_str().unwrap_or("?")
                );
                println!("     {}", source["description"].as_str().unwrap_or(""));
            }
        }
        Err(e) => println!("❌ Error: {}", e),
    }

    println!("\n3. Sample searches...");
    for (name, source) in [("John Doe", "all"), ("Vladimir Putin", "ofac"), ("Apple Inc", "all")] {
        println!("\n   🔍 Searching '{}' in {}...", name, source);
        print_search(client.search(name, source).await);
    }

    println!("\n4. Error handling...");
    println!("\n   🚫 Empty name...");
    print_search(client.search("", "all").await);
    println!("\n   🚫 Invalid source...");
    print_search(client.search("John Doe", "invalid_source").await);

    if std::env::args().any(|arg| arg == "--rate-limit") {
        exercise_rate_limit(&client).await;
    }

    println!("\n{}", "=".repeat(60));
    println!("🏁 Examples completed!");

    Ok(())
}
