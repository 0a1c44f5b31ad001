#![forbid(unsafe_code)]

//! `erdling-core` holds the headless ER diagram data model: entities,
//! attributes and relationships, the geometry derived from their display
//! names, and the persistence snapshot that reconstructs a diagram exactly
//! (including user-adjusted positions) without re-running layout.
//!
//! Rendering surfaces never talk to this crate directly; the editing session
//! in `erdling` is the only writer.

pub mod config;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod model;
pub mod snapshot;
pub mod text;

pub use config::EngineConfig;
pub use error::{ModelError, Result, ServiceError, ServiceErrorKind};
pub use geometry::{Bounds, Point, Rect, Size};
pub use ids::{AttributeId, EntityId, IdAllocator, MonotonicIdAllocator, RelationshipId};
pub use model::{
    Attribute, AttributeRecord, Cardinality, Entity, EntityRecord, Model, Relationship,
    RelationshipRecord, SchemaInput,
};
pub use snapshot::ProjectSnapshot;
pub use text::{DeterministicTextMeasurer, FontMetricsTextMeasurer, TextMeasurer, TextStyle};
