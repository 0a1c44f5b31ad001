#![forbid(unsafe_code)]

//! Interactive entity-relationship diagram engine.
//!
//! `erdling` takes a structured schema description and turns it into a live,
//! editable diagram: automatic two-phase layout, a retained scene graph,
//! drag/zoom/edit interaction, exact save/restore, and export to SVG, PNG and
//! JPEG. The engine is headless; an embedding UI feeds it pointer and key
//! events and paints from the scene graph or the SVG output.
//!
//! ```no_run
//! use erdling::{Session, SchemaInput};
//! use erdling::render::BoundsMode;
//!
//! # fn main() -> erdling::Result<()> {
//! let input: SchemaInput = serde_json::from_str(r#"{
//!     "entities": [
//!         {"name": "Department", "attributes": [{"name": "dept_id", "isPK": true}]},
//!         {"name": "Employee", "attributes": [{"name": "emp_id", "isPK": true}]}
//!     ],
//!     "relationships": [
//!         {"name": "belongs_to", "from": "Employee", "to": "Department", "type": "1:N"}
//!     ]
//! }"#).unwrap();
//!
//! let mut session = Session::with_defaults();
//! session.import_schema(&input)?;
//! let svg = session.export_svg(BoundsMode::WholeDiagram, None)?;
//! # let _ = svg;
//! # Ok(())
//! # }
//! ```

pub mod interact;
#[cfg(feature = "raster")]
pub mod raster;
pub mod session;
pub mod viewport;

pub use erdling_core as core;
pub use erdling_layout as layout;
pub use erdling_render as render;

pub use erdling_core::{
    EngineConfig, Model, ProjectSnapshot, SchemaInput, ServiceError, ServiceErrorKind,
};
pub use erdling_render::{BoundsMode, SceneGraph, SceneId};
pub use interact::{DragState, EditorState, Key, PointerEvent};
pub use session::Session;
pub use viewport::{Viewport, ViewportAnimation, ViewportTransform};

pub type Result<T> = std::result::Result<T, EngineError>;

/// Umbrella error for everything a session operation can fail with.
/// Collaborator failures (schema parsing service, persistence backend)
/// funnel through `Service`, so a controller can match on the kind while
/// treating the mutation as not having happened.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Model(#[from] erdling_core::ModelError),
    #[error(transparent)]
    Layout(#[from] erdling_layout::LayoutError),
    #[error(transparent)]
    Render(#[from] erdling_render::RenderError),
    #[cfg(feature = "raster")]
    #[error(transparent)]
    Raster(#[from] raster::RasterError),
    #[error(transparent)]
    Service(#[from] erdling_core::ServiceError),
}
