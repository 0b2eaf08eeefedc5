// AI trading summaries via the Gemini generateContent endpoint.
// Optional component: without an API key it reports itself unconfigured.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::{json, Value};

use crate::fetcher::MacroSnapshot;

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

pub struct Analyzer {
    http: Client,
    api_key: Option<String>,
}

impl Analyzer {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a short trading summary from the current snapshot.
    pub async fn trading_summary(&self, snapshot: &MacroSnapshot) -> Result<String> {
        let Some(api_key) = &self.api_key else {
            return Ok("AI summary not configured: set GEMINI_API_KEY.".to_string());
        };

        let payload = json!({
            "contents": [{
                "parts": [{
                    "text": build_prompt(snapshot)
                }]
            }]
        });

        let response = self
            .http
            .post(GEMINI_URL)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .context("Gemini request failed")?
            .error_for_status()
            .context("Gemini returned an error status")?;

        let body: Value = response.json().await.context("Malformed Gemini response")?;
        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow!("Gemini response contained no candidates"))?;

        Ok(text.trim().to_string())
    }
}

fn build_prompt(snapshot: &MacroSnapshot) -> String {
    let fed_stance_desc = if snapshot.fed_stance > 0.0 {
        "restrictive"
    } else {
        "accommodative"
    };
    let yield_curve = if snapshot.yield_spread < 0.0 {
        "inverted"
    } else {
        "normal"
    };

    format!(
        "You are a quantitative macro analyst. Analyze these economic indicators and \
         provide a concise trading summary (3-4 sentences max).\n\n\
         CURRENT MACRO DATA:\n\
         - GDP Growth: {:.2}% YoY\n\
         - Inflation (CPI): {:.2}% YoY\n\
         - Unemployment: {:.2}%\n\
         - Manufacturing Index: {:.2}\n\
         - 10Y Real Rate (TIPS): {:.2}%\n\
         - 2Y-10Y Yield Spread: {:.2}% ({})\n\
         - Fed Funds Rate: {:.2}%\n\
         - Fed Stance vs Neutral: {:.2}% ({})\n\n\
         Provide:\n\
         1. Overall economic regime (expansion/slowdown/recession)\n\
         2. Asset class positioning (equities/bonds/commodities - bullish/neutral/bearish)\n\
         3. Key risks to watch\n\
         4. Specific actionable insight\n\n\
         Be direct and actionable. No disclaimers about not being financial advice.",
        snapshot.gdp_growth,
        snapshot.inflation,
        snapshot.unemployment,
        snapshot.manufacturing_index,
        snapshot.real_rate,
        snapshot.yield_spread,
        yield_curve,
        snapshot.fed_funds,
        snapshot.fed_stance,
        fed_stance_desc,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(yield_spread: f64, fed_stance: f64) -> MacroSnapshot {
        MacroSnapshot {
            gdp_growth: 4.4,
            inflation: 2.65,
            real_rate: 1.92,
            unemployment: 4.1,
            manufacturing_index: 10.0,
            yield_spread,
            fed_funds: fed_stance + 2.5,
            neutral_rate: 2.5,
            fed_stance,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_embeds_indicator_values() {
        let prompt = build_prompt(&snapshot(0.15, 2.0));
        assert!(prompt.contains("GDP Growth: 4.40% YoY"));
        assert!(prompt.contains("Inflation (CPI): 2.65% YoY"));
        assert!(prompt.contains("(normal)"));
        assert!(prompt.contains("(restrictive)"));
    }

    #[test]
    fn test_prompt_describes_inverted_curve_and_easy_policy() {
        let prompt = build_prompt(&snapshot(-0.4, -1.0));
        assert!(prompt.contains("(inverted)"));
        assert!(prompt.contains("(accommodative)"));
    }

    #[tokio::test]
    async fn test_summary_without_key_short_circuits() {
        let analyzer = Analyzer::new(None);
        assert!(!analyzer.is_configured());

        let summary = analyzer.trading_summary(&snapshot(0.15, 2.0)).await.unwrap();
        assert!(summary.contains("GEMINI_API_KEY"));
    }
}
