//! Client for the remote analytics oracle (a hosted edge function).
//!
//! The contract is opaque: post the business figures and the kind of
//! analysis wanted, get back whatever JSON the model produced.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    config::Config,
    error::{AppError, AppResult},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest<'a> {
    pub business_data: &'a Value,
    pub analysis_type: &'a str,
    pub external_models: &'a [String],
}

#[derive(Clone)]
pub struct InferenceClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl InferenceClient {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url: config.inference_url.clone(),
            api_key: config.inference_api_key.clone(),
        })
    }

    #[instrument(name = "inference_analyze", skip(self, request), fields(analysis_type = request.analysis_type))]
    pub async fn analyze(&self, request: &AnalysisRequest<'_>) -> AppResult<Value> {
        if self.url.is_empty() {
            return Err(AppError::validation("Analytics endpoint is not configured"));
        }

        let mut builder = self.client.post(&self.url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("inference returned {status}: {text}")));
        }

        let body: Value = resp.json().await?;
        debug!("Analysis received");

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_camel_case_keys() {
        let data = json!({ "invoice_total": 1200.0 });
        let models = vec!["gpt-4o".to_string()];
        let request = AnalysisRequest {
            business_data: &data,
            analysis_type: "forecasting",
            external_models: &models,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "businessData": { "invoice_total": 1200.0 },
                "analysisType": "forecasting",
                "externalModels": ["gpt-4o"],
            })
        );
    }
}
