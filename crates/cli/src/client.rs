//! API client for communicating with the energy prediction server

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use energy_core::{ChartData, EnergyEstimate, FieldSpec, HealthResponse, RawParameters};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the prediction server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let (status, body) = self.get_with_status(path).await?;
        if !status.is_success() {
            anyhow::bail!("API error ({})", status);
        }
        Ok(body)
    }

    /// Make a GET request, decoding the body whatever the status
    ///
    /// Health endpoints answer 503 with a meaningful body.
    pub async fn get_with_status<T: DeserializeOwned>(&self, path: &str) -> Result<(StatusCode, T)> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response.json().await.context("Failed to parse response")?;
        Ok((status, body))
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response.json().await.context("Failed to parse response")
    }

    pub async fn predict(&self, params: &RawParameters) -> Result<PredictionResponse> {
        self.post("api/v1/predict", params).await
    }

    pub async fn parameters(&self) -> Result<Vec<FieldSpecView>> {
        self.get("api/v1/parameters").await
    }

    pub async fn health(&self) -> Result<(StatusCode, HealthResponse)> {
        self.get_with_status("healthz").await
    }
}

/// Turn a non-2xx response into an error, preferring the server's message
async fn api_error(response: Response) -> anyhow::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => match err.code {
            Some(code) => anyhow::anyhow!("{} [{}]", err.error, code),
            None => anyhow::anyhow!("{}", err.error),
        },
        Err(_) => anyhow::anyhow!("API error ({}): {}", status, body),
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub estimate: EnergyEstimate,
    pub chart: ChartData,
    pub generated_at: DateTime<Utc>,
}

/// Owned counterpart of [`FieldSpec`] for decoding server responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpecView {
    pub name: String,
    pub label: String,
    pub kind: String,
    pub range: RangeView,
    pub default: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RangeView {
    pub min: f64,
    pub max: f64,
}

impl From<&FieldSpec> for FieldSpecView {
    fn from(spec: &FieldSpec) -> Self {
        Self {
            name: spec.name.to_string(),
            label: spec.label.to_string(),
            kind: spec.kind.as_str().to_string(),
            range: RangeView {
                min: spec.range.min,
                max: spec.range.max,
            },
            default: spec.default,
            unit: spec.unit.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_predict_error_uses_server_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/predict")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error":"invalid orientation: 7 is out of range, expected [2, 5]","code":"validation_error","field":"orientation"}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.predict(&RawParameters::default()).await.unwrap_err();

        mock.assert_async().await;
        let message = err.to_string();
        assert!(message.contains("invalid orientation"));
        assert!(message.contains("validation_error"));
    }

    #[tokio::test]
    async fn test_health_decodes_unavailable_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"unhealthy","components":{"model":{"status":"unhealthy","message":"missing","last_check_timestamp":0}}}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let (status, health) = client.health().await.unwrap();

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(health.components["model"].message.as_deref(), Some("missing"));
    }

    #[tokio::test]
    async fn test_parameters_decodes_field_table() {
        let body = serde_json::to_string(&energy_core::FIELD_SPECS).unwrap();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/parameters")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let fields = client.parameters().await.unwrap();

        assert_eq!(fields.len(), 8);
        assert_eq!(fields[5].name, "orientation");
        assert_eq!(fields[5].kind, "integer");
        assert_eq!(fields[0].range.min, 0.62);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
