//! Entities and snapshots.
//!
//! An [`Entity`] is one top-level unit of parser output: a run of free text
//! or a JSON value, in discovery order. A [`Snapshot`] is the observer-facing
//! view of every entity found so far, including at most one in-progress JSON
//! entity.

use std::sync::Arc;

use crate::value::Value;

/// The payload of an [`Entity`]: either raw free text or a JSON value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum EntityValue {
    /// A run of free text between structural values.
    Text(String),
    /// A JSON value, possibly still under construction.
    Json(Value),
}

/// One top-level unit of output.
///
/// Text entities are always finished and never carry an id. JSON entities
/// receive sequence ids in creation order, counted independently of any text
/// entities; an unfinished JSON entity appears only in snapshots, never in
/// the finished ledger.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Whether this entity is complete. Snapshots may contain exactly one
    /// unfinished entity, always in the last position.
    pub finished: bool,
    /// Sequence id, assigned only to JSON entities.
    pub id: Option<u64>,
    /// The entity payload.
    pub value: EntityValue,
}

impl Entity {
    pub(crate) fn text(text: String) -> Self {
        Self {
            finished: true,
            id: None,
            value: EntityValue::Text(text),
        }
    }

    pub(crate) fn json(id: Option<u64>, finished: bool, value: Value) -> Self {
        Self {
            finished,
            id,
            value: EntityValue::Json(value),
        }
    }

    /// Returns the text payload, if this is a text entity.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            EntityValue::Text(s) => Some(s),
            EntityValue::Json(_) => None,
        }
    }

    /// Returns the JSON payload, if this is a JSON entity.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match &self.value {
            EntityValue::Json(v) => Some(v),
            EntityValue::Text(_) => None,
        }
    }
}

/// A consistent view of all entities discovered so far.
///
/// Finished entities are shared with the parser's ledger (`Arc`), not
/// copied; the in-progress entity, if any, is a point-in-time copy that
/// later parsing will not mutate.
///
/// # Examples
///
/// ```
/// use jsonweave::{ParserOptions, StreamingParser};
///
/// let mut parser = StreamingParser::new(ParserOptions::default());
/// parser.append(r#"hi {"a":1}"#);
/// let snapshot = parser.finish();
/// assert!(snapshot.complete);
/// assert_eq!(snapshot.entities.len(), 2);
/// assert_eq!(snapshot.entities[0].as_text(), Some("hi "));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// True only after end-of-stream finalization has run.
    pub complete: bool,
    /// All entities in discovery order.
    pub entities: Vec<Arc<Entity>>,
}

impl Snapshot {
    /// Returns the JSON value of the entity with the given sequence id.
    #[must_use]
    pub fn json_by_id(&self, id: u64) -> Option<&Value> {
        self.entities
            .iter()
            .find(|e| e.id == Some(id))
            .and_then(|e| e.as_json())
    }
}
