use std::collections::HashSet;

use crate::schema::Entity;

/// Keep only entities whose type is in `allowed`. No set (or an empty one) keeps all.
pub fn filter_by_dimensions(entities: Vec<Entity>, allowed: Option<&HashSet<String>>) -> Vec<Entity> {
    match allowed {
        Some(dimensions) if !dimensions.is_empty() => entities
            .into_iter()
            .filter(|e| dimensions.contains(&e.entity))
            .collect(),
        _ => entities,
    }
}

/// Stamp each entity with the name of the extractor that produced it.
pub fn add_extractor_name(entities: Vec<Entity>, name: &str) -> Vec<Entity> {
    entities
        .into_iter()
        .map(|mut e| {
            e.extractor = Some(name.to_string());
            e
        })
        .collect()
}
