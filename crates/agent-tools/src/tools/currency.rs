//! Currency conversion tool using the exchangerate.host API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{unknown_function, FunctionSpec, Tool, ToolArgs};

const FUNCTIONS: &[FunctionSpec] = &[FunctionSpec {
    name: "convert_currency",
    description: "Convert an amount between two fiat currencies",
    params: "amount (number, required), from (string, required), to (string, required)",
}];

/// Response from exchangerate.host API.
#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    success: bool,
    result: Option<f64>,
    info: Option<ExchangeRateInfo>,
    error: Option<ExchangeRateError>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRateInfo {
    rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRateError {
    info: Option<String>,
}

/// Currency converter using exchangerate.host. Free API, no key required.
pub struct Currency {
    client: reqwest::Client,
}

impl Currency {
    /// Create a new currency tool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("llmflow/0.1")
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<Value, ToolError> {
        let from = from.to_uppercase();
        let to = to.to_uppercase();
        let url = format!(
            "https://api.exchangerate.host/convert?from={}&to={}&amount={}",
            from, to, amount
        );

        debug!("Fetching exchange rate from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Exchange rate API returned status {}",
                response.status()
            )));
        }

        let data: ExchangeRateResponse = response.json().await?;

        if !data.success {
            let error_msg = data
                .error
                .and_then(|e| e.info)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(ToolError::ExecutionFailed(format!(
                "Currency conversion failed: {}",
                error_msg
            )));
        }

        let converted = data.result.ok_or_else(|| {
            ToolError::ExecutionFailed("No conversion result returned".to_string())
        })?;

        Ok(json!({
            "amount": amount,
            "from": from,
            "to": to,
            "converted": converted,
            "rate": data.info.and_then(|i| i.rate),
        }))
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for Currency {
    fn name(&self) -> &str {
        "currency"
    }

    fn description(&self) -> &str {
        "Converts amounts between fiat currencies using live exchange rates."
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "convert_currency" => {
                let amount = args.get_f64("amount")?;
                let from = args.get_string("from")?;
                let to = args.get_string("to")?;
                self.convert(amount, &from, &to).await
            }
            other => Err(unknown_function(self.name(), other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[tokio::test]
    async fn test_missing_amount() {
        let currency = Currency::new();
        let mut params = Map::new();
        params.insert("from".to_string(), json!("USD"));
        params.insert("to".to_string(), json!("EUR"));

        let result = currency
            .call("convert_currency", ToolArgs::new(params))
            .await;
        assert!(matches!(result, Err(ToolError::MissingParameter(_))));
    }

    #[tokio::test]
    async fn test_non_numeric_amount() {
        let currency = Currency::new();
        let mut params = Map::new();
        params.insert("amount".to_string(), json!("a lot"));
        params.insert("from".to_string(), json!("USD"));
        params.insert("to".to_string(), json!("EUR"));

        let result = currency
            .call("convert_currency", ToolArgs::new(params))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidParameter { .. })));
    }

    #[tokio::test]
    #[ignore]
    async fn test_convert_live() {
        let currency = Currency::new();
        let mut params = Map::new();
        params.insert("amount".to_string(), json!(100));
        params.insert("from".to_string(), json!("USD"));
        params.insert("to".to_string(), json!("EUR"));

        let result = currency
            .call("convert_currency", ToolArgs::new(params))
            .await
            .unwrap();
        assert!(result["converted"].as_f64().unwrap() > 0.0);
    }
}
