use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

pub const NEURALSPACE_NER_URL: &str = "https://platform.neuralspace.ai/api/ner/v1/entity";

/// What came back from one call to the NER endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Status 200 with a JSON body.
    Body(serde_json::Value),
    /// Any other status. Treated as an empty result.
    Rejected { status: u16 },
    /// Connection failure or timeout. There is no response at all.
    Unavailable,
}

#[derive(Clone)]
pub struct NeuralSpaceClient {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct NerRequest<'a> {
    text: &'a str,
    language: &'a str,
}

impl Default for NeuralSpaceClient {
    fn default() -> Self {
        Self::new(NEURALSPACE_NER_URL.to_string())
    }
}

impl NeuralSpaceClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `text` to the NER endpoint.
    ///
    /// Non-200 statuses and transport failures are logged and reported through
    /// [`FetchOutcome`]; only unexpected client errors and non-JSON bodies are `Err`.
    pub async fn fetch_entities(
        &self,
        text: &str,
        language: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<FetchOutcome> {
        // Form body, raw token in the authorization header
        let request = NerRequest { text, language };

        let sent = self
            .client
            .post(&self.endpoint)
            .header("authorization", token)
            .form(&request)
            .timeout(timeout)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) if is_transport_failure(&e) => return Ok(self.unavailable(&e)),
            Err(e) => return Err(e).context("Failed to send request to NeuralSpace"),
        };

        // Anything but 200 counts as an empty result
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                body = %body,
                "Failed to get a proper response from NeuralSpace"
            );
            return Ok(FetchOutcome::Rejected {
                status: status.as_u16(),
            });
        }

        // The timeout also covers reading the body
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) if is_transport_failure(&e) => return Ok(self.unavailable(&e)),
            Err(e) => return Err(e).context("Failed to read NeuralSpace response"),
        };

        // Parse JSON
        let body: serde_json::Value =
            serde_json::from_slice(&bytes).context("NeuralSpace returned a non-JSON body")?;

        debug!(endpoint = %self.endpoint, bytes = bytes.len(), "NeuralSpace response received");

        Ok(FetchOutcome::Body(body))
    }

    fn unavailable(&self, e: &reqwest::Error) -> FetchOutcome {
        let cause = if e.is_timeout() { "timeout" } else { "connect" };
        error!(
            endpoint = %self.endpoint,
            cause,
            error = %e,
            "Failed to connect to NeuralSpace endpoint, make sure it is reachable and the access token is valid"
        );
        FetchOutcome::Unavailable
    }
}

fn is_transport_failure(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect()
}
