#![allow(dead_code)]
use std::fmt::Write;
use std::sync::{Arc, Mutex};

use extract::{ExtractorConfig, NeuralSpaceClient, NeuralSpaceEntityExtractor};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

pub const NER_PATH: &str = "/api/ner/v1/entity";

/// Records events emitted by this crate so tests can count warnings and errors.
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<(Level, String)>>>);

impl CapturedEvents {
    pub fn at(&self, level: Level) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, fields)| fields.clone())
            .collect()
    }
}

struct FieldWriter(String);

impl Visit for FieldWriter {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let _ = write!(self.0, "{}={:?} ", field.name(), value);
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("extract") {
            return;
        }
        let mut fields = FieldWriter(String::new());
        event.record(&mut fields);
        self.0
            .lock()
            .unwrap()
            .push((*event.metadata().level(), fields.0));
    }
}

/// Capture events on the current thread until the guard is dropped.
pub fn capture() -> (CapturedEvents, tracing::subscriber::DefaultGuard) {
    let events = CapturedEvents::default();
    let guard = tracing::subscriber::set_default(Registry::default().with(events.clone()));
    (events, guard)
}

pub fn config_with_token(token: &str) -> ExtractorConfig {
    ExtractorConfig {
        access_token: Some(token.to_string()),
        ..ExtractorConfig::default()
    }
}

/// Extractor pointed at `base_url`, ignoring the process environment.
pub fn extractor(base_url: &str, config: ExtractorConfig) -> NeuralSpaceEntityExtractor {
    let client = NeuralSpaceClient::new(format!("{}{}", base_url, NER_PATH));
    NeuralSpaceEntityExtractor::with_client(config, client, None).unwrap()
}
