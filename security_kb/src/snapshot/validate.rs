//! Payload validation. Raw JSON never leaves this module.

use serde_json::{Map, Value};

use super::{Category, RelationshipKind, SubjectRelations};
use crate::error::{KnowledgeError, Result};

pub(super) fn validate_payload(payload: &Value) -> Result<(Vec<Category>, Vec<RelationshipKind>)> {
    let doc = payload
        .as_object()
        .ok_or_else(|| malformed("payload is not an object"))?;

    let entities = required_object(doc, "entities")?;
    let relationships = required_object(doc, "relationships")?;

    let categories = entities
        .iter()
        .map(|(name, list)| {
            let path = format!("entities.{}", name);
            Ok(Category {
                name: name.clone(),
                entities: string_list(list, &path)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let kinds = relationships
        .iter()
        .map(|(kind, subjects)| {
            let path = format!("relationships.{}", kind);
            let subjects = subjects
                .as_object()
                .ok_or_else(|| malformed(format!("{} is not an object", path)))?;
            let entries = subjects
                .iter()
                .map(|(subject, related)| {
                    Ok(SubjectRelations {
                        subject: subject.clone(),
                        related: string_list(related, &format!("{}.{}", path, subject))?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(RelationshipKind::new(kind.clone(), entries))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((categories, kinds))
}

fn required_object<'a>(doc: &'a Map<String, Value>, key: &str) -> Result<&'a Map<String, Value>> {
    match doc.get(key) {
        None => Err(malformed(format!("missing top-level key '{}'", key))),
        Some(value) => value
            .as_object()
            .ok_or_else(|| malformed(format!("{} is not an object", key))),
    }
}

fn string_list(value: &Value, path: &str) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| malformed(format!("{} is not an array", path)))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed(format!("{}[{}] is not a string", path, i)))
        })
        .collect()
}

fn malformed(reason: impl Into<String>) -> KnowledgeError {
    KnowledgeError::MalformedSnapshot(reason.into())
}
