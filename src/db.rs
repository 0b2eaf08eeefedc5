use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::fetcher::MacroSnapshot;

const TABLE: &str = "macro_data";

/// One persisted snapshot of the three tracked indicators.
///
/// Rows are append-only: written once by the update cycle, read back for
/// display and evaluation, never mutated or deleted. `id` is assigned by
/// the store and absent until the row has been inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub gdp_growth: f64,
    pub inflation: f64,
    pub real_rate: f64,
    pub created_at: DateTime<Utc>,
}

impl From<&MacroSnapshot> for MacroReading {
    fn from(snapshot: &MacroSnapshot) -> Self {
        Self {
            id: None,
            gdp_growth: snapshot.gdp_growth,
            inflation: snapshot.inflation,
            real_rate: snapshot.real_rate,
            created_at: snapshot.fetched_at,
        }
    }
}

/// Client for the remote `macro_data` table, reached over Supabase's
/// PostgREST interface. Single writer, no transactions.
pub struct Database {
    http: Client,
    base_url: String,
    api_key: String,
}

impl Database {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    /// Append one reading and return it with the store-assigned id.
    pub async fn insert(&self, reading: &MacroReading) -> Result<MacroReading> {
        let response = self
            .http
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(reading)
            .send()
            .await
            .context("Database insert request failed")?
            .error_for_status()
            .context("Database rejected the insert")?;

        let rows: Vec<MacroReading> = response
            .json()
            .await
            .context("Malformed insert response")?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert returned no rows"))
    }

    /// Most recent reading, or `None` while the table is empty.
    pub async fn get_latest(&self) -> Result<Option<MacroReading>> {
        let mut rows = self.select_recent(1).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    /// The `limit` most recent readings, newest first.
    pub async fn get_history(&self, limit: u32) -> Result<Vec<MacroReading>> {
        self.select_recent(limit).await
    }

    async fn select_recent(&self, limit: u32) -> Result<Vec<MacroReading>> {
        let response = self
            .http
            .get(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .context("Database select request failed")?
            .error_for_status()
            .context("Database rejected the select")?;

        response.json().await.context("Malformed select response")
    }
}

// Table definition (run once in the Supabase SQL editor):
//
//   CREATE TABLE macro_data (
//       id BIGSERIAL PRIMARY KEY,
//       gdp_growth DECIMAL(10, 2),
//       inflation DECIMAL(10, 2),
//       real_rate DECIMAL(10, 2),
//       created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
//   );
//   CREATE INDEX idx_macro_data_created_at ON macro_data(created_at DESC);
