// client.rs — JSON-RPC client for the reference data service.
//
// One POST per category:
//
//   {"id":7,"method":"RefData.getIdentifiersForEnumType","params":{"enumType":"foo"}}
//
// The service answers with `{"id":7,"result":<any JSON>}` or
// `{"id":7,"error":{...}}`. No retries here; the lifecycle owns the retry
// policy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use rds_fetcher::{FetchError, RefDataClient};

use crate::config::ClientConfig;

/// Remote method returning the identifiers of one enum type.
pub const GET_IDENTIFIERS_METHOD: &str = "RefData.getIdentifiersForEnumType";

#[derive(Serialize)]
struct RpcRequest<'a> {
    id: u64,
    method: &'static str,
    params: RpcParams<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RpcParams<'a> {
    enum_type: &'a str,
}

/// Reference data client over HTTP.
///
/// Holds one `reqwest::Client` for connection pooling.
pub struct HttpRefDataClient {
    http: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
    next_id: AtomicU64,
}

impl HttpRefDataClient {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RefDataClient for HttpRefDataClient {
    async fn get_identifiers(&self, category: &str) -> Result<Value, FetchError> {
        let request = RpcRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: GET_IDENTIFIERS_METHOD,
            params: RpcParams {
                enum_type: category,
            },
        };

        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| FetchError::Transport {
            category: category.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            category: category.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(
            category,
            id = request.id,
            status = status.as_u16(),
            bytes = body.len(),
            "reference data response"
        );

        decode_response(category, status, &body)
    }
}

/// Turn an HTTP response into the call's result.
fn decode_response(category: &str, status: StatusCode, body: &[u8]) -> Result<Value, FetchError> {
    if !status.is_success() {
        return Err(FetchError::Rejected {
            category: category.to_string(),
            message: format!("HTTP {}", status),
        });
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| FetchError::Malformed {
        category: category.to_string(),
        message: e.to_string(),
    })?;
    let Value::Object(mut response) = value else {
        return Err(FetchError::Malformed {
            category: category.to_string(),
            message: "response is not a JSON object".to_string(),
        });
    };

    match response.remove("error") {
        Some(Value::Null) | None => {}
        Some(error) => {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(FetchError::Rejected {
                category: category.to_string(),
                message,
            });
        }
    }

    response.remove("result").ok_or_else(|| FetchError::Malformed {
        category: category.to_string(),
        message: "response has neither result nor error".to_string(),
    })
}
