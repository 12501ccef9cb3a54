use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::schema::Entity;

pub const ENTITIES: &str = "entities";

/// The part of a host message the extractor touches.
pub trait PipelineMessage {
    fn text(&self) -> Option<&str>;

    fn entities(&self) -> &[Entity];

    /// Replace the entity list. `add_to_output` marks it for the host's final output.
    fn set_entities(&mut self, entities: Vec<Entity>, add_to_output: bool);
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Fields the host should include in its output.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub output_properties: BTreeSet<String>,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

impl PipelineMessage for Message {
    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn set_entities(&mut self, entities: Vec<Entity>, add_to_output: bool) {
        self.entities = entities;
        if add_to_output {
            self.output_properties.insert(ENTITIES.to_string());
        }
    }
}
