use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{TeamSeasonRecord, TeamStore};

/// Statistics store backed by a Supabase (PostgREST) table.
///
/// Rows are addressed by exact-match equality filters on the TEAM and YEAR
/// columns; the table is assumed to hold at most one row per pair.
pub struct SupabaseStore {
    http: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(SupabaseStore {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        })
    }

    /// Run a `select=*` query against the table with the given extra filters
    /// (already URL-encoded, each beginning with `&`).
    async fn select(&self, filters: &str) -> Result<Vec<Value>> {
        let url = format!(
            "{}/rest/v1/{}?select=*{}",
            self.base_url, self.table, filters
        );
        debug!("Querying store: {}", url);

        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .context("Store request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Store error {}: {}", status, body);
        }

        let rows: Vec<Value> = resp
            .json()
            .await
            .context("Failed to parse store response")?;
        Ok(rows)
    }
}

#[async_trait]
impl TeamStore for SupabaseStore {
    fn name(&self) -> &str {
        "Supabase"
    }

    async fn fetch_team_season(&self, team: &str, year: i32) -> Result<Option<TeamSeasonRecord>> {
        let filters = format!("&TEAM=eq.{}&YEAR=eq.{}", urlencoding::encode(team), year);
        let rows = self.select(&filters).await?;
        match rows.first() {
            Some(row) => Ok(Some(TeamSeasonRecord::from_row(row)?)),
            None => Ok(None),
        }
    }

    async fn preview(&self, limit: usize) -> Result<Vec<Value>> {
        self.select(&format!("&limit={}", limit)).await
    }
}

// Expose a simple URL encoding without pulling in another dep
mod urlencoding {
    pub fn encode(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => out.push(c),
                ' ' => out.push('+'),
                c => {
                    let bytes = c.to_string();
                    for b in bytes.as_bytes() {
                        out.push_str(&format!("%{:02X}", b));
                    }
                }
            }
        }
        out
    }

}
