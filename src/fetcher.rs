// FRED client for the tracked indicator series.
// Latest-observation reads, year-over-year inflation, and per-series history.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

// Tracked series. The first three feed the persisted reading; the rest are
// dashboard/summary context only.
pub const SERIES_GDP_GROWTH: &str = "A191RL1Q225SBEA";
pub const SERIES_CPI: &str = "CPIAUCSL";
pub const SERIES_REAL_RATE: &str = "DFII10";
pub const SERIES_UNEMPLOYMENT: &str = "UNRATE";
pub const SERIES_MANUFACTURING: &str = "MANEMP";
pub const SERIES_YIELD_SPREAD: &str = "T10Y2Y";
pub const SERIES_FED_FUNDS: &str = "FEDFUNDS";

/// Neutral-rate estimate: neutral real rate (~0.5%) plus the 2% inflation target.
pub const NEUTRAL_RATE: f64 = 2.5;

/// One observation of a series.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}

/// The full indicator set fetched in one update cycle.
///
/// The persisted `MacroReading` is the projection of this onto the three
/// core indicators; everything else is display and summary context.
#[derive(Debug, Clone, Serialize)]
pub struct MacroSnapshot {
    pub gdp_growth: f64,
    pub inflation: f64,
    pub real_rate: f64,
    pub unemployment: f64,
    pub manufacturing_index: f64,
    pub yield_spread: f64,
    pub fed_funds: f64,
    pub neutral_rate: f64,
    pub fed_stance: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Last-year history for every dashboard series.
#[derive(Debug, Default, Serialize)]
pub struct HistoryBundle {
    pub gdp_growth: Vec<SeriesPoint>,
    pub inflation: Vec<SeriesPoint>,
    pub unemployment: Vec<SeriesPoint>,
    pub manufacturing_index: Vec<SeriesPoint>,
    pub real_rate: Vec<SeriesPoint>,
    pub yield_spread: Vec<SeriesPoint>,
    pub fed_funds: Vec<SeriesPoint>,
    pub fed_stance: Vec<SeriesPoint>,
}

// FRED wire format: observation values arrive as strings, with "." marking
// a missing value.
#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

pub struct FredClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl FredClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(FRED_BASE_URL.to_string(), api_key)
    }

    /// Point at a different observations endpoint (used by the tests and
    /// the setup checker).
    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key,
        }
    }

    /// Most recent observation for a series.
    pub async fn fetch_latest(&self, series_id: &str) -> Result<SeriesPoint> {
        let observations = self.fetch_recent(series_id, 1).await?;
        observations
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No observations for series {}", series_id))
    }

    /// Year-over-year CPI inflation from the last 13 monthly observations.
    pub async fn fetch_inflation_yoy(&self) -> Result<f64> {
        let observations = self.fetch_recent(SERIES_CPI, 13).await?;
        inflation_yoy(&observations)
    }

    /// Observations for roughly the last `days` days, oldest first.
    /// Missing (".") and unparsable values are skipped.
    pub async fn fetch_series_history(&self, series_id: &str, days: i64) -> Result<Vec<SeriesPoint>> {
        let end = Utc::now();
        let start = end - Duration::days(days);
        let params = [
            ("series_id", series_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
            ("sort_order", "asc".to_string()),
            ("observation_start", start.format("%Y-%m-%d").to_string()),
            ("observation_end", end.format("%Y-%m-%d").to_string()),
        ];
        let data = self.get_observations(&params).await?;
        Ok(lenient_points(data.observations))
    }

    /// Monthly year-over-year inflation, oldest first, capped at the most
    /// recent 24 points. Needs 13+ months of CPI beyond the window, so the
    /// request reaches further back than `days`.
    pub async fn fetch_inflation_yoy_history(&self, days: i64) -> Result<Vec<SeriesPoint>> {
        let end = Utc::now();
        let start = end - Duration::days(days + 400);
        let params = [
            ("series_id", SERIES_CPI.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
            ("sort_order", "asc".to_string()),
            ("observation_start", start.format("%Y-%m-%d").to_string()),
            ("observation_end", end.format("%Y-%m-%d").to_string()),
        ];
        let data = self.get_observations(&params).await?;
        Ok(inflation_yoy_history(data.observations))
    }

    /// Fetch every tracked indicator. Any failing series fails the whole
    /// snapshot, so callers see a single data-unavailable error.
    pub async fn fetch_snapshot(&self) -> Result<MacroSnapshot> {
        let gdp_growth = self.fetch_latest(SERIES_GDP_GROWTH).await?.value;
        let inflation = self.fetch_inflation_yoy().await?;
        let real_rate = self.fetch_latest(SERIES_REAL_RATE).await?.value;
        let unemployment = self.fetch_latest(SERIES_UNEMPLOYMENT).await?.value;
        let manufacturing_index = self.fetch_latest(SERIES_MANUFACTURING).await?.value;
        let yield_spread = self.fetch_latest(SERIES_YIELD_SPREAD).await?.value;
        let fed_funds = self.fetch_latest(SERIES_FED_FUNDS).await?.value;

        Ok(MacroSnapshot {
            gdp_growth,
            inflation,
            real_rate,
            unemployment,
            manufacturing_index,
            yield_spread,
            fed_funds,
            neutral_rate: NEUTRAL_RATE,
            fed_stance: fed_funds - NEUTRAL_RATE,
            fetched_at: Utc::now(),
        })
    }

    /// Last-year history for every dashboard series.
    pub async fn fetch_all_history(&self, days: i64) -> Result<HistoryBundle> {
        let fed_funds = self.fetch_series_history(SERIES_FED_FUNDS, days).await?;
        let fed_stance = fed_funds
            .iter()
            .map(|p| SeriesPoint {
                date: p.date.clone(),
                value: p.value - NEUTRAL_RATE,
            })
            .collect();

        Ok(HistoryBundle {
            gdp_growth: self.fetch_series_history(SERIES_GDP_GROWTH, days).await?,
            inflation: self.fetch_inflation_yoy_history(days).await?,
            unemployment: self.fetch_series_history(SERIES_UNEMPLOYMENT, days).await?,
            manufacturing_index: self.fetch_series_history(SERIES_MANUFACTURING, days).await?,
            real_rate: self.fetch_series_history(SERIES_REAL_RATE, days).await?,
            yield_spread: self.fetch_series_history(SERIES_YIELD_SPREAD, days).await?,
            fed_funds,
            fed_stance,
        })
    }

    /// The `limit` most recent observations, newest first. Unlike the
    /// history reads this parses strictly: a missing value in the latest
    /// observations means the indicator is not usable right now.
    async fn fetch_recent(&self, series_id: &str, limit: u32) -> Result<Vec<SeriesPoint>> {
        let params = [
            ("series_id", series_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
            ("sort_order", "desc".to_string()),
            ("limit", limit.to_string()),
        ];
        let data = self.get_observations(&params).await?;
        data.observations
            .into_iter()
            .map(|obs| parse_observation(series_id, obs))
            .collect()
    }

    async fn get_observations(&self, params: &[(&str, String)]) -> Result<ObservationsResponse> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .context("FRED request failed")?
            .error_for_status()
            .context("FRED returned an error status")?;

        response
            .json::<ObservationsResponse>()
            .await
            .context("Malformed FRED response")
    }
}

/// Percent change of `current` against `prior`.
pub fn percent_change(current: f64, prior: f64) -> f64 {
    ((current - prior) / prior) * 100.0
}

/// Year-over-year inflation from CPI observations sorted newest first:
/// the latest level against the level 12 months before it.
pub fn inflation_yoy(observations: &[SeriesPoint]) -> Result<f64> {
    if observations.len() < 13 {
        bail!(
            "Need 13 monthly CPI observations for year-over-year inflation, got {}",
            observations.len()
        );
    }
    Ok(percent_change(observations[0].value, observations[12].value))
}

fn parse_observation(series_id: &str, obs: Observation) -> Result<SeriesPoint> {
    let value = obs.value.parse::<f64>().with_context(|| {
        format!(
            "Unusable value '{}' for series {} at {}",
            obs.value, series_id, obs.date
        )
    })?;
    Ok(SeriesPoint {
        date: obs.date,
        value,
    })
}

fn lenient_points(observations: Vec<Observation>) -> Vec<SeriesPoint> {
    observations
        .into_iter()
        .filter_map(|obs| {
            obs.value.parse::<f64>().ok().map(|value| SeriesPoint {
                date: obs.date,
                value,
            })
        })
        .collect()
}

// Observations arrive oldest first; each month is compared against the one
// 12 positions earlier. Pairs with a missing side are skipped.
fn inflation_yoy_history(observations: Vec<Observation>) -> Vec<SeriesPoint> {
    let mut out = Vec::new();
    for i in 12..observations.len() {
        let (Ok(current), Ok(year_ago)) = (
            observations[i].value.parse::<f64>(),
            observations[i - 12].value.parse::<f64>(),
        ) else {
            continue;
        };
        out.push(SeriesPoint {
            date: observations[i].date.clone(),
            value: percent_change(current, year_ago),
        });
    }
    if out.len() > 24 {
        out.split_off(out.len() - 24)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, value: &str) -> Observation {
        Observation {
            date: date.to_string(),
            value: value.to_string(),
        }
    }

    fn point(date: &str, value: f64) -> SeriesPoint {
        SeriesPoint {
            date: date.to_string(),
            value,
        }
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(103.0, 100.0), 3.0);
        assert_eq!(percent_change(95.0, 100.0), -5.0);
    }

    #[test]
    fn test_inflation_yoy_from_13_observations() {
        // Newest first: 307.5 now vs 300.0 a year ago -> 2.5%
        let mut observations = vec![point("2025-06-01", 307.5)];
        for month in 0..11 {
            observations.push(point(&format!("m{}", month), 305.0));
        }
        observations.push(point("2024-06-01", 300.0));

        let yoy = inflation_yoy(&observations).unwrap();
        assert!((yoy - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_inflation_yoy_needs_13_observations() {
        let observations = vec![point("2025-06-01", 307.5); 12];
        assert!(inflation_yoy(&observations).is_err());
    }

    #[test]
    fn test_lenient_points_skip_missing_values() {
        let points = lenient_points(vec![
            obs("2025-01-01", "1.5"),
            obs("2025-01-02", "."),
            obs("2025-01-03", "1.7"),
        ]);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2025-01-01");
        assert_eq!(points[1].value, 1.7);
    }

    #[test]
    fn test_inflation_history_skips_missing_pairs() {
        // 14 months ascending; month index 1 is missing, so the YoY point
        // 12 months later cannot be computed.
        let mut observations = Vec::new();
        for month in 0..14 {
            let value = if month == 1 {
                ".".to_string()
            } else {
                format!("{}", 300.0 + month as f64)
            };
            observations.push(obs(&format!("2024-{:02}-01", month + 1), &value));
        }

        let history = inflation_yoy_history(observations);
        // Months 12 and 13 are eligible; month 13 pairs with the missing month 1.
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, "2024-13-01");
        assert!((history[0].value - percent_change(312.0, 300.0)).abs() < 1e-9);
    }

    #[test]
    fn test_inflation_history_caps_at_24_points() {
        let observations: Vec<Observation> = (0..60)
            .map(|month| obs(&format!("m{}", month), &format!("{}", 300.0 + month as f64)))
            .collect();

        let history = inflation_yoy_history(observations);
        assert_eq!(history.len(), 24);
        // Cap keeps the most recent points
        assert_eq!(history.last().unwrap().date, "m59");
    }

    #[test]
    fn test_observation_wire_format() {
        let payload = r#"{
            "realtime_start": "2025-06-01",
            "count": 2,
            "observations": [
                {"realtime_start": "2025-06-01", "date": "2025-05-01", "value": "2.4"},
                {"realtime_start": "2025-06-01", "date": "2025-04-01", "value": "."}
            ]
        }"#;

        let parsed: ObservationsResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.observations.len(), 2);
        assert_eq!(parsed.observations[0].value, "2.4");
        assert!(parse_observation("TEST", obs("2025-04-01", ".")).is_err());
    }
}
