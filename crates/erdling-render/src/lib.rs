#![forbid(unsafe_code)]

//! Retained scene graph and SVG rendering for ER diagrams.
//!
//! The scene graph mirrors the model with stable node identities, carries the
//! interaction state that is rendering's business (z-order, highlight,
//! relationship visibility), and is what every output path consumes: the SVG
//! here, and the raster encoders in the `erdling` facade on top of it.

pub mod bounds;
pub mod scene;
pub mod svg;

pub use bounds::{BoundsMode, content_bounds, export_bounds};
pub use scene::{
    AttributeConnector, AttributeNode, ConnectorEnd, DiamondNode, EntityNode,
    RelationshipConnector, SceneGraph, SceneId,
};
pub use svg::{SvgOptions, render_svg};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("scene contains nothing to render")]
    EmptyScene,
}
