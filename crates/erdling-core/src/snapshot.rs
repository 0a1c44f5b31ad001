//! Project persistence.
//!
//! A snapshot captures the full model including every derived and
//! user-adjusted coordinate, so loading reconstructs the diagram exactly as
//! it looked when saved. Loading never re-runs automatic layout.

use crate::error::{ModelError, Result};
use crate::geometry::{Point, Size};
use crate::ids::{AttributeId, EntityId, MonotonicIdAllocator, RelationshipId};
use crate::model::{Attribute, Cardinality, Entity, Model, Relationship};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub version: u32,
    /// Original schema text the model was imported from.
    #[serde(default)]
    pub source: String,
    /// Id allocation watermark; restored so new objects never collide with
    /// ids that existed (or were deleted) before the save.
    pub next_id: u64,
    pub entities: Vec<EntitySnapshot>,
    pub attributes: Vec<AttributeSnapshot>,
    pub relationships: Vec<RelationshipSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub position: Point,
    pub size: Size,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSnapshot {
    pub id: AttributeId,
    pub entity_id: EntityId,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub data_type: String,
    pub is_pk: bool,
    pub is_fk: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    pub position: Point,
    pub rx: f64,
    pub ry: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipSnapshot {
    pub id: RelationshipId,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub from: EntityId,
    pub to: EntityId,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub from_attr: Option<String>,
    #[serde(default)]
    pub to_attr: Option<String>,
    pub position: Point,
    pub size: Size,
}

impl Model {
    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            version: SNAPSHOT_VERSION,
            source: self.source().to_string(),
            next_id: self.allocator().watermark(),
            entities: self
                .entities()
                .map(|e| EntitySnapshot {
                    id: e.id,
                    name: e.name.clone(),
                    display_name: e.display_name.clone(),
                    comment: e.comment.clone(),
                    position: e.position,
                    size: e.size,
                })
                .collect(),
            attributes: self
                .attributes()
                .map(|a| AttributeSnapshot {
                    id: a.id,
                    entity_id: a.entity_id,
                    name: a.name.clone(),
                    display_name: a.display_name.clone(),
                    comment: a.comment.clone(),
                    data_type: a.data_type.clone(),
                    is_pk: a.is_pk,
                    is_fk: a.is_fk,
                    nullable: a.nullable,
                    default_value: a.default_value.clone(),
                    position: a.position,
                    rx: a.rx,
                    ry: a.ry,
                })
                .collect(),
            relationships: self
                .relationships()
                .map(|r| RelationshipSnapshot {
                    id: r.id,
                    name: r.name.clone(),
                    display_name: r.display_name.clone(),
                    comment: r.comment.clone(),
                    from: r.from,
                    to: r.to,
                    cardinality: r.cardinality,
                    from_attr: r.from_attr.clone(),
                    to_attr: r.to_attr.clone(),
                    position: r.position,
                    size: r.size,
                })
                .collect(),
        }
    }

    /// Rebuilds a model with geometry taken verbatim from the snapshot.
    /// Referential integrity is validated up front so a half-loaded model is
    /// never observable.
    pub fn from_snapshot(snapshot: &ProjectSnapshot) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ModelError::InvalidSnapshot {
                message: format!("unsupported snapshot version {}", snapshot.version),
            });
        }

        let mut entities: IndexMap<EntityId, Entity> = IndexMap::new();
        let mut max_id = 0u64;
        for e in &snapshot.entities {
            if entities
                .insert(
                    e.id,
                    Entity {
                        id: e.id,
                        name: e.name.clone(),
                        display_name: e.display_name.clone(),
                        comment: e.comment.clone(),
                        position: e.position,
                        size: e.size,
                    },
                )
                .is_some()
            {
                return Err(ModelError::InvalidSnapshot {
                    message: format!("duplicate entity id {}", e.id),
                });
            }
            max_id = max_id.max(e.id.0);
        }

        let mut attributes: IndexMap<AttributeId, Attribute> = IndexMap::new();
        for a in &snapshot.attributes {
            if !entities.contains_key(&a.entity_id) {
                return Err(ModelError::InvalidSnapshot {
                    message: format!("attribute {} references missing {}", a.id, a.entity_id),
                });
            }
            if attributes
                .insert(
                    a.id,
                    Attribute {
                        id: a.id,
                        entity_id: a.entity_id,
                        name: a.name.clone(),
                        display_name: a.display_name.clone(),
                        comment: a.comment.clone(),
                        data_type: a.data_type.clone(),
                        is_pk: a.is_pk,
                        is_fk: a.is_fk,
                        nullable: a.nullable,
                        default_value: a.default_value.clone(),
                        position: a.position,
                        rx: a.rx,
                        ry: a.ry,
                    },
                )
                .is_some()
            {
                return Err(ModelError::InvalidSnapshot {
                    message: format!("duplicate attribute id {}", a.id),
                });
            }
            max_id = max_id.max(a.id.0);
        }

        let mut relationships: IndexMap<RelationshipId, Relationship> = IndexMap::new();
        for r in &snapshot.relationships {
            for end in [r.from, r.to] {
                if !entities.contains_key(&end) {
                    return Err(ModelError::InvalidSnapshot {
                        message: format!("relationship {} references missing {}", r.id, end),
                    });
                }
            }
            if relationships
                .insert(
                    r.id,
                    Relationship {
                        id: r.id,
                        name: r.name.clone(),
                        display_name: r.display_name.clone(),
                        comment: r.comment.clone(),
                        from: r.from,
                        to: r.to,
                        cardinality: r.cardinality,
                        from_attr: r.from_attr.clone(),
                        to_attr: r.to_attr.clone(),
                        position: r.position,
                        size: r.size,
                    },
                )
                .is_some()
            {
                return Err(ModelError::InvalidSnapshot {
                    message: format!("duplicate relationship id {}", r.id),
                });
            }
            max_id = max_id.max(r.id.0);
        }

        // Saved watermark wins, but never fall below ids actually present.
        let next = snapshot.next_id.max(max_id + 1);
        Ok(Model::restore(
            MonotonicIdAllocator::starting_at(next),
            entities,
            attributes,
            relationships,
            snapshot.source.clone(),
        ))
    }
}
