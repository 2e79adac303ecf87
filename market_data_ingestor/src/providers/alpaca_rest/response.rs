use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::models::bar::Bar;

#[derive(Deserialize, Debug)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: Option<f64>,
    #[serde(rename = "v")]
    pub volume: f64,
    #[serde(rename = "n", default)]
    pub trade_count: Option<u64>,
    #[serde(rename = "vw", default)]
    pub vwap: Option<f64>,
}

impl From<AlpacaBar> for Bar {
    fn from(ab: AlpacaBar) -> Self {
        Bar {
            timestamp: ab.timestamp,
            open: ab.open,
            high: ab.high,
            low: ab.low,
            close: ab.close.unwrap_or(f64::NAN),
            volume: ab.volume,
            trade_count: ab.trade_count,
            vwap: ab.vwap,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct AlpacaResponse {
    /// `null` when no symbol had data in the range.
    #[serde(default)]
    pub bars: Option<IndexMap<String, Vec<AlpacaBar>>>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_page_with_token() {
        let body = r#"{
            "bars": {
                "AAPL": [
                    {"t":"2024-01-02T05:00:00Z","o":187.15,"h":188.44,"l":183.89,"c":185.64,"v":82488674,"n":1009074,"vw":185.9465}
                ],
                "MSFT": [
                    {"t":"2024-01-02T05:00:00Z","o":373.86,"h":375.9,"l":366.77,"c":370.87,"v":25258581}
                ]
            },
            "next_page_token": "QUFQTHxEfDIwMjQ"
        }"#;
        let resp: AlpacaResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.next_page_token.as_deref(), Some("QUFQTHxEfDIwMjQ"));
        let mut bars = resp.bars.unwrap();
        assert_eq!(bars.keys().collect::<Vec<_>>(), ["AAPL", "MSFT"]);

        let msft: Vec<Bar> = bars
            .shift_remove("MSFT")
            .unwrap()
            .into_iter()
            .map(Bar::from)
            .collect();
        assert_eq!(msft[0].close, 370.87);
        assert_eq!(msft[0].trade_count, None);
    }

    #[test]
    fn null_bars_means_no_data() {
        let resp: AlpacaResponse =
            serde_json::from_str(r#"{"bars": null, "next_page_token": null}"#).unwrap();
        assert!(resp.bars.is_none());
        assert!(resp.next_page_token.is_none());
    }

    #[test]
    fn missing_close_becomes_nan() {
        let raw: AlpacaBar = serde_json::from_str(
            r#"{"t":"2024-01-02T05:00:00Z","o":1.0,"h":1.0,"l":1.0,"c":null,"v":0}"#,
        )
        .unwrap();
        let bar = Bar::from(raw);
        assert!(!bar.has_close());
    }
}
