//! Type definitions for Yahoo Finance chart API responses.

use serde::Deserialize;

/// Envelope of `/v8/finance/chart/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chart {
    /// One entry per requested symbol; `null` when the request failed
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// Error payload returned for unknown symbols or bad parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(default)]
    pub currency: Option<String>,
    /// Last traded price
    #[serde(default)]
    pub regular_market_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBars>,
}

/// OHLC series; missing bars are `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteBars {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResult {
    /// Non-null closes, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.indicators
            .quote
            .first()
            .map(|bars| bars.close.iter().flatten().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_with_null_bars() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"symbol": "AAPL", "currency": "USD", "regularMarketPrice": 191.5},
                    "timestamp": [1, 2, 3],
                    "indicators": {"quote": [{"close": [189.0, null, 191.5]}]}
                }],
                "error": null
            }
        }"#;

        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let result = &response.chart.result.unwrap()[0];
        assert_eq!(result.meta.regular_market_price, Some(191.5));
        assert_eq!(result.closes(), vec![189.0, 191.5]);
    }

    #[test]
    fn test_parse_chart_error() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;

        let response: ChartResponse = serde_json::from_str(body).unwrap();
        assert!(response.chart.result.is_none());
        assert_eq!(response.chart.error.unwrap().code, "Not Found");
    }
}
