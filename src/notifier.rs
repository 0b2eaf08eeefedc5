// Push notifications over an ntfy.sh topic.
// One POST per message; delivery failures are logged, never retried.

use anyhow::{Context, Result};
use reqwest::Client;

use crate::db::MacroReading;
use crate::signal::{Action, Signal};

const NTFY_BASE_URL: &str = "https://ntfy.sh";

pub struct Notifier {
    http: Client,
    base_url: String,
    topic: String,
}

impl Notifier {
    pub fn new(topic: String) -> Self {
        Self::with_base_url(NTFY_BASE_URL.to_string(), topic)
    }

    /// Point at a different relay host (used by the tests).
    pub fn with_base_url(base_url: String, topic: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            topic,
        }
    }

    /// The subscribe URL for this topic.
    pub fn topic_url(&self) -> String {
        format!("{}/{}", self.base_url, self.topic)
    }

    /// Send one notification. Priority is one of ntfy's levels
    /// (min/low/default/high/urgent); tags become emoji on the client.
    pub async fn send(&self, title: &str, message: &str, priority: &str, tags: &[&str]) -> Result<()> {
        let mut request = self
            .http
            .post(self.topic_url())
            .header("Title", title)
            .header("Priority", priority);

        if !tags.is_empty() {
            request = request.header("Tags", tags.join(","));
        }

        request
            .body(message.to_string())
            .send()
            .await
            .context("Notification request failed")?
            .error_for_status()
            .context("Notification relay rejected the message")?;

        log::info!("Notification sent: {}", title);
        Ok(())
    }

    /// High-priority BUY/SELL push with the three core indicators in the
    /// body. HOLD sends nothing.
    pub async fn send_signal(&self, signal: &Signal, reading: &MacroReading) -> Result<()> {
        let (emoji, tags): (&str, &[&str]) = match signal.action {
            Action::Buy => ("📈", &["chart_with_upwards_trend", "moneybag"]),
            Action::Sell => ("📉", &["chart_with_downwards_trend", "warning"]),
            Action::Hold => return Ok(()),
        };

        let message = format!(
            "{} {} Signal Generated\n\nGDP Growth: {:.2}%\nInflation: {:.2}%\nReal Rate: {:.2}%",
            emoji, signal.action, reading.gdp_growth, reading.inflation, reading.real_rate
        );

        self.send(
            &format!("Trading Signal: {}", signal.action),
            &message,
            "high",
            tags,
        )
        .await
    }

    /// Low-priority smoke test for the relay path.
    pub async fn send_test(&self) -> Result<()> {
        self.send(
            "Test Notification",
            "Your macro tracker is set up correctly! 🎉",
            "low",
            &["white_check_mark"],
        )
        .await
    }
}
