// Trading signal rules - thresholds as a fixed decision table.
// Pure functions over a reading; no state, no side effects.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::MacroReading;
use crate::fetcher::MacroSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub action: Action,
    pub reason: String,
}

/// Classify a reading.
///
/// SELL is checked before BUY. All comparisons are strict: a value sitting
/// exactly on a threshold fires neither rule and the reading evaluates HOLD.
pub fn evaluate(reading: &MacroReading) -> Signal {
    if reading.gdp_growth < 0.0 || reading.inflation > 4.0 {
        return Signal {
            action: Action::Sell,
            reason: "Negative growth or high inflation".to_string(),
        };
    }

    if reading.gdp_growth > 2.0 && reading.inflation < 3.0 && reading.real_rate < 1.0 {
        return Signal {
            action: Action::Buy,
            reason: "Strong growth, low inflation, low real rates".to_string(),
        };
    }

    Signal {
        action: Action::Hold,
        reason: "Indicators within neutral ranges".to_string(),
    }
}

/// Weighted 0-100 composite of the macro regime, rounded to one decimal.
pub fn regime_score(snapshot: &MacroSnapshot) -> f64 {
    // Growth: 2-4% is the sweet spot, 6%+ saturates
    let growth_score = ((snapshot.gdp_growth / 6.0) * 100.0).clamp(0.0, 100.0);

    // Inflation: distance from the 2% target
    let inflation_score = (100.0 - (snapshot.inflation - 2.0).abs() * 30.0).max(0.0);

    // Employment: 3.5-4.5% unemployment is healthy; below is overheating
    let employment_score = if (3.5..=4.5).contains(&snapshot.unemployment) {
        100.0
    } else if snapshot.unemployment < 3.5 {
        80.0
    } else {
        (100.0 - (snapshot.unemployment - 4.5) * 20.0).max(0.0)
    };

    // Manufacturing: above zero is expansion
    let manufacturing_score = (50.0 + snapshot.manufacturing_index * 2.0).clamp(0.0, 100.0);

    // Yield curve: positive slope is healthy
    let curve_score = (50.0 + snapshot.yield_spread * 0.5).clamp(0.0, 100.0);

    // Fed policy: closer to neutral scores higher
    let fed_score = (100.0 - snapshot.fed_stance.abs() * 40.0).max(0.0);

    let score = growth_score * 0.25
        + inflation_score * 0.20
        + employment_score * 0.15
        + manufacturing_score * 0.15
        + curve_score * 0.15
        + fed_score * 0.10;

    (score * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reading(gdp_growth: f64, inflation: f64, real_rate: f64) -> MacroReading {
        MacroReading {
            id: None,
            gdp_growth,
            inflation,
            real_rate,
            created_at: Utc::now(),
        }
    }

    fn snapshot(
        gdp_growth: f64,
        inflation: f64,
        unemployment: f64,
        manufacturing_index: f64,
        yield_spread: f64,
        fed_stance: f64,
    ) -> MacroSnapshot {
        MacroSnapshot {
            gdp_growth,
            inflation,
            real_rate: 1.0,
            unemployment,
            manufacturing_index,
            yield_spread,
            fed_funds: fed_stance + 2.5,
            neutral_rate: 2.5,
            fed_stance,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_negative_growth_sells() {
        let signal = evaluate(&reading(-1.0, 2.0, 0.5));
        assert_eq!(signal.action, Action::Sell);
        assert_eq!(signal.reason, "Negative growth or high inflation");
    }

    #[test]
    fn test_strong_growth_low_inflation_buys() {
        let signal = evaluate(&reading(3.0, 2.0, 0.5));
        assert_eq!(signal.action, Action::Buy);
        assert_eq!(signal.reason, "Strong growth, low inflation, low real rates");
    }

    #[test]
    fn test_sluggish_growth_holds() {
        let signal = evaluate(&reading(1.0, 2.0, 0.5));
        assert_eq!(signal.action, Action::Hold);
    }

    #[test]
    fn test_high_inflation_dominates_positive_growth() {
        // SELL is checked first, so high inflation wins even when the
        // growth side of the BUY rule would match.
        assert_eq!(evaluate(&reading(0.0, 5.0, 0.5)).action, Action::Sell);
        assert_eq!(evaluate(&reading(3.0, 5.0, 0.5)).action, Action::Sell);
    }

    #[test]
    fn test_threshold_boundaries_hold() {
        // Strict comparisons: values exactly on a threshold fire no rule.
        assert_eq!(evaluate(&reading(2.0, 2.0, 0.5)).action, Action::Hold);
        assert_eq!(evaluate(&reading(0.0, 4.0, 0.5)).action, Action::Hold);
        assert_eq!(evaluate(&reading(3.0, 3.0, 0.5)).action, Action::Hold);
        assert_eq!(evaluate(&reading(3.0, 2.0, 1.0)).action, Action::Hold);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let input = reading(2.5, 2.5, 0.8);
        let first = evaluate(&input);
        let second = evaluate(&input);
        assert_eq!(first.action, second.action);
        assert_eq!(first.reason, second.reason);
    }

    #[test]
    fn test_action_wire_format() {
        assert_eq!(serde_json::to_string(&Action::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Action::Sell).unwrap(), "\"SELL\"");
        assert_eq!(Action::Hold.to_string(), "HOLD");
    }

    #[test]
    fn test_regime_score_composite() {
        // growth 3 -> 50, inflation 2 -> 100, unemployment 4 -> 100,
        // manufacturing 5 -> 60, spread 1 -> 50.5, stance 0.5 -> 80
        // 12.5 + 20 + 15 + 9 + 7.575 + 8 = 72.075 -> 72.1
        let score = regime_score(&snapshot(3.0, 2.0, 4.0, 5.0, 1.0, 0.5));
        assert_eq!(score, 72.1);
    }

    #[test]
    fn test_regime_score_is_bounded() {
        let depression = snapshot(-10.0, 15.0, 25.0, -60.0, -5.0, 8.0);
        let boom = snapshot(12.0, 2.0, 4.0, 40.0, 3.0, 0.0);

        let low = regime_score(&depression);
        let high = regime_score(&boom);
        assert!((0.0..=100.0).contains(&low));
        assert!((0.0..=100.0).contains(&high));
        assert!(high > low);
    }

    #[test]
    fn test_tight_labor_market_scores_below_healthy_band() {
        let healthy = regime_score(&snapshot(3.0, 2.0, 4.0, 5.0, 1.0, 0.0));
        let overheated = regime_score(&snapshot(3.0, 2.0, 3.0, 5.0, 1.0, 0.0));
        assert!(overheated < healthy);
    }
}
