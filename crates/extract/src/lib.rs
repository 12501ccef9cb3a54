pub mod client;
pub mod config;
pub mod filter;
pub mod message;
pub mod schema;
pub mod translate;

pub use client::{FetchOutcome, NEURALSPACE_NER_URL, NeuralSpaceClient};
pub use config::{ACCESS_TOKEN_ENV, ExtractorConfig};
pub use filter::{add_extractor_name, filter_by_dimensions};
pub use message::{Message, PipelineMessage};
pub use schema::{Entity, RawMatch, ServiceResponse};
pub use translate::{extract_value, translate};

use anyhow::Result;
use tracing::{debug, warn};

/// Name stamped on every entity this extractor produces.
pub const EXTRACTOR_NAME: &str = "NeuralSpaceEntityExtractor";

#[derive(Clone)]
pub struct NeuralSpaceEntityExtractor {
    config: ExtractorConfig,
    client: NeuralSpaceClient,
    env_token: Option<String>,
}

impl NeuralSpaceEntityExtractor {
    /// Build against the public endpoint, reading `NEURALSPACE_ACCESS_TOKEN` once.
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        Self::with_client(config, NeuralSpaceClient::default(), config::env_access_token())
    }

    pub fn with_client(
        config: ExtractorConfig,
        client: NeuralSpaceClient,
        env_token: Option<String>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client,
            env_token,
        })
    }

    /// Hosts that pass the raw component option map; defaults fill the gaps.
    pub fn from_component_config(
        overrides: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self> {
        Self::new(ExtractorConfig::from_overrides(overrides)?)
    }

    /// Hosts that pass an already merged configuration.
    pub fn create(config: ExtractorConfig) -> Result<Self> {
        Self::new(config)
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn access_token(&self) -> Option<String> {
        self.config.resolve_access_token(self.env_token.as_deref())
    }

    /// Annotate a single message.
    pub async fn process_message<M: PipelineMessage>(&self, message: &mut M) -> Result<()> {
        let Some(token) = self.access_token() else {
            warn_missing_token();
            return Ok(());
        };

        self.annotate(message, &token).await
    }

    /// Annotate a batch in place, one message after another.
    ///
    /// On error the messages stay with the caller; those before the failing one keep
    /// their new entities.
    pub async fn process<M: PipelineMessage>(&self, messages: &mut [M]) -> Result<()> {
        let Some(token) = self.access_token() else {
            warn_missing_token();
            return Ok(());
        };

        for message in messages.iter_mut() {
            self.annotate(message, &token).await?;
        }

        Ok(())
    }

    /// Fetch, translate, filter and stamp the entities found in `text`.
    ///
    /// Rejected requests and transport failures give an empty list.
    pub async fn extract(&self, text: &str, token: &str) -> Result<Vec<Entity>> {
        // Single request, no retries
        let outcome = self
            .client
            .fetch_entities(text, &self.config.language, token, self.config.timeout())
            .await?;

        // Rejected and unreachable both mean nothing was found
        let all_extracted = match outcome {
            FetchOutcome::Body(body) => translate::translate_with(&body, self.config.normalize_values)?,
            FetchOutcome::Rejected { .. } | FetchOutcome::Unavailable => Vec::new(),
        };

        // Keep configured dimensions, then stamp our name
        let extracted = filter_by_dimensions(all_extracted, self.config.dimensions.as_ref());
        Ok(add_extractor_name(extracted, EXTRACTOR_NAME))
    }

    async fn annotate<M: PipelineMessage>(&self, message: &mut M, token: &str) -> Result<()> {
        let Some(text) = message.text() else {
            debug!("Message has no text, nothing to extract");
            return Ok(());
        };

        let extracted = self.extract(text, token).await?;
        debug!(entities = extracted.len(), "NeuralSpace entities extracted");

        // Append after entities set by earlier components
        let mut entities = message.entities().to_vec();
        entities.extend(extracted);
        message.set_entities(entities, true);

        Ok(())
    }
}

fn warn_missing_token() {
    warn!(
        env = ACCESS_TOKEN_ENV,
        "NeuralSpace Entity Extractor component in pipeline, but no `access_token` in the \
         configuration nor is the access token set as an environment variable. \
         No entities will be extracted!"
    );
}
