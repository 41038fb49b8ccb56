//! Stock market tool using the Yahoo Finance chart and search APIs.

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tool::{unknown_function, FunctionSpec, Tool, ToolArgs};

const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "get_stock_quote",
        description: "Get the current quote for a stock or index symbol",
        params: "symbol (string, required): ticker symbol or well-known company name",
    },
    FunctionSpec {
        name: "get_company_info",
        description: "Get basic company information for a ticker symbol",
        params: "symbol (string, required): ticker symbol or well-known company name",
    },
    FunctionSpec {
        name: "get_historical_data",
        description: "Get historical closing prices for a symbol over a period",
        params: "symbol (string, required), period (string, optional, default 1month): one of 1day, 1week, 1month, 1year, 5year",
    },
    FunctionSpec {
        name: "get_market_summary",
        description: "Get quotes for the major market indices",
        params: "none",
    },
];

/// Well-known company names mapped to their ticker symbols.
const COMPANY_SYMBOLS: &[(&str, &str)] = &[
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("amazon", "AMZN"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("meta", "META"),
    ("facebook", "META"),
    ("tesla", "TSLA"),
    ("nvidia", "NVDA"),
    ("netflix", "NFLX"),
    ("disney", "DIS"),
    ("walmart", "WMT"),
    ("intel", "INTC"),
    ("amd", "AMD"),
    ("ibm", "IBM"),
    ("visa", "V"),
    ("mastercard", "MA"),
];

/// Major indices reported by `get_market_summary`.
const MARKET_INDICES: &[(&str, &str)] = &[
    ("^GSPC", "S&P 500"),
    ("^DJI", "Dow Jones Industrial Average"),
    ("^IXIC", "NASDAQ Composite"),
    ("^FTSE", "FTSE 100"),
    ("^N225", "Nikkei 225"),
    ("^GDAXI", "DAX"),
];

/// Supported history periods mapped to Yahoo (interval, range) pairs.
const PERIODS: &[(&str, &str, &str)] = &[
    ("1day", "5m", "1d"),
    ("1week", "30m", "5d"),
    ("1month", "1d", "1mo"),
    ("1year", "1d", "1y"),
    ("5year", "1wk", "5y"),
];

/// Stock market tool backed by the keyless Yahoo Finance endpoints.
///
/// Quotes and history come from the v8 chart API; company lookups use the
/// public search endpoint. Both serve JSON without an API key but expect a
/// browser-like user agent.
pub struct Stocks {
    client: reqwest::Client,
}

impl Stocks {
    /// Create a new stocks tool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Map a user-supplied symbol or company name to a ticker symbol.
    fn resolve_symbol(input: &str) -> String {
        let lowered = input.trim().to_lowercase();
        for (name, symbol) in COMPANY_SYMBOLS {
            if *name == lowered {
                return symbol.to_string();
            }
        }
        input.trim().to_uppercase()
    }

    /// Look up the (interval, range) pair for a history period.
    fn period_params(period: &str) -> Result<(&'static str, &'static str), ToolError> {
        PERIODS
            .iter()
            .find(|(name, _, _)| *name == period)
            .map(|(_, interval, range)| (*interval, *range))
            .ok_or_else(|| ToolError::InvalidParameter {
                name: "period".to_string(),
                reason: format!(
                    "expected one of {}",
                    PERIODS
                        .iter()
                        .map(|(name, _, _)| *name)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }

    /// Fetch the chart payload for a symbol and return its first result.
    async fn fetch_chart(
        &self,
        symbol: &str,
        interval: &str,
        range: &str,
    ) -> Result<Value, ToolError> {
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?interval={}&range={}",
            url::form_urlencoded::byte_serialize(symbol.as_bytes()).collect::<String>(),
            interval,
            range
        );

        debug!("Fetching chart data from: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "No market data for symbol: {}",
                symbol
            )));
        }

        let data: Value = response.json().await?;
        data.pointer("/chart/result/0")
            .cloned()
            .ok_or_else(|| ToolError::ExecutionFailed(format!("No market data for symbol: {}", symbol)))
    }

    /// Build a quote object from a chart result's meta block.
    fn quote_from_meta(symbol: &str, result: &Value) -> Result<Value, ToolError> {
        let meta = result
            .get("meta")
            .ok_or_else(|| ToolError::ExecutionFailed(format!("Malformed quote for: {}", symbol)))?;

        let price = meta
            .get("regularMarketPrice")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| ToolError::ExecutionFailed(format!("No price for symbol: {}", symbol)))?;
        let previous_close = meta
            .get("chartPreviousClose")
            .or_else(|| meta.get("previousClose"))
            .and_then(|v| v.as_f64())
            .unwrap_or(price);
        let change = price - previous_close;

        Ok(json!({
            "symbol": meta.get("symbol").cloned().unwrap_or_else(|| json!(symbol)),
            "price": price,
            "previous_close": previous_close,
            "change": change,
            "change_percent": change_percent(price, previous_close),
            "day_high": meta.get("regularMarketDayHigh").cloned().unwrap_or(Value::Null),
            "day_low": meta.get("regularMarketDayLow").cloned().unwrap_or(Value::Null),
            "volume": meta.get("regularMarketVolume").cloned().unwrap_or(Value::Null),
            "currency": meta.get("currency").cloned().unwrap_or(Value::Null),
            "exchange": meta.get("exchangeName").cloned().unwrap_or(Value::Null),
        }))
    }

    async fn get_stock_quote(&self, symbol: &str) -> Result<Value, ToolError> {
        let ticker = Self::resolve_symbol(symbol);
        let result = self.fetch_chart(&ticker, "1d", "1d").await?;
        Self::quote_from_meta(&ticker, &result)
    }

    async fn get_company_info(&self, symbol: &str) -> Result<Value, ToolError> {
        let ticker = Self::resolve_symbol(symbol);
        let url = format!(
            "https://query2.finance.yahoo.com/v1/finance/search?q={}&quotesCount=1&newsCount=0",
            url::form_urlencoded::byte_serialize(ticker.as_bytes()).collect::<String>()
        );

        debug!("Searching company info: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Company lookup failed for: {}",
                ticker
            )));
        }

        let data: Value = response.json().await?;
        let hit = data
            .pointer("/quotes/0")
            .cloned()
            .ok_or_else(|| ToolError::ExecutionFailed(format!("Company not found: {}", ticker)))?;

        Ok(json!({
            "symbol": hit.get("symbol").cloned().unwrap_or_else(|| json!(ticker)),
            "name": hit
                .get("longname")
                .or_else(|| hit.get("shortname"))
                .cloned()
                .unwrap_or(Value::Null),
            "exchange": hit.get("exchange").cloned().unwrap_or(Value::Null),
            "type": hit.get("quoteType").cloned().unwrap_or(Value::Null),
            "sector": hit.get("sector").cloned().unwrap_or(Value::Null),
            "industry": hit.get("industry").cloned().unwrap_or(Value::Null),
        }))
    }

    async fn get_historical_data(&self, symbol: &str, period: &str) -> Result<Value, ToolError> {
        let ticker = Self::resolve_symbol(symbol);
        let (interval, range) = Self::period_params(period)?;
        let result = self.fetch_chart(&ticker, interval, range).await?;

        let timestamps = result
            .get("timestamp")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let closes = result
            .pointer("/indicators/quote/0/close")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut series = Vec::new();
        for (i, ts) in timestamps.iter().enumerate() {
            let close = closes.get(i).and_then(|v| v.as_f64());
            let (Some(ts), Some(close)) = (ts.as_i64(), close) else {
                continue; // market holidays report null closes
            };
            let date = DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            series.push(json!({ "date": date, "close": close }));
        }

        if series.is_empty() {
            return Err(ToolError::ExecutionFailed(format!(
                "No historical data for {} over {}",
                ticker, period
            )));
        }

        let first = series[0]["close"].as_f64().unwrap_or(0.0);
        let last = series[series.len() - 1]["close"].as_f64().unwrap_or(0.0);

        Ok(json!({
            "symbol": ticker,
            "period": period,
            "points": series.len(),
            "start_price": first,
            "end_price": last,
            "change": last - first,
            "change_percent": change_percent(last, first),
            "series": series,
        }))
    }

    async fn get_market_summary(&self) -> Result<Value, ToolError> {
        let mut indices = Vec::new();

        for (symbol, name) in MARKET_INDICES {
            match self.fetch_chart(symbol, "1d", "1d").await {
                Ok(result) => match Self::quote_from_meta(symbol, &result) {
                    Ok(mut quote) => {
                        if let Some(obj) = quote.as_object_mut() {
                            obj.insert("name".to_string(), json!(name));
                        }
                        indices.push(quote);
                    }
                    Err(e) => warn!("Skipping index {}: {}", symbol, e),
                },
                Err(e) => warn!("Skipping index {}: {}", symbol, e),
            }
        }

        if indices.is_empty() {
            return Err(ToolError::ExecutionFailed(
                "No index data available".to_string(),
            ));
        }

        Ok(json!({ "indices": indices }))
    }
}

/// Percentage change from `base` to `value`, zero when `base` is zero.
fn change_percent(value: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        (value - base) / base * 100.0
    }
}

impl Default for Stocks {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for Stocks {
    fn name(&self) -> &str {
        "stocks"
    }

    fn description(&self) -> &str {
        "Gets stock quotes, company info, price history, and market indices from Yahoo Finance."
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "get_stock_quote" => {
                let symbol = args.get_string("symbol")?;
                self.get_stock_quote(&symbol).await
            }
            "get_company_info" => {
                let symbol = args.get_string("symbol")?;
                self.get_company_info(&symbol).await
            }
            "get_historical_data" => {
                let symbol = args.get_string("symbol")?;
                let period = args
                    .get_string_opt("period")
                    .unwrap_or_else(|| "1month".to_string());
                self.get_historical_data(&symbol, &period).await
            }
            "get_market_summary" => self.get_market_summary().await,
            other => Err(unknown_function(self.name(), other)),
        }
    }
}
