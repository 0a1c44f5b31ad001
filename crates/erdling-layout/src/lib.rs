#![forbid(unsafe_code)]

//! Automatic layout for ER diagrams, in two phases:
//!
//! 1. entities are placed on a layered grid (cycle removal, longest-path
//!    ranking, barycenter crossing reduction, rank positioning), with each
//!    node inflated to the extent of its future attribute ring;
//! 2. attributes are placed radially around their entity, and relationship
//!    diamonds at the midpoint between their endpoints.
//!
//! Layout only writes positions. Sizes are derived from text when the model
//! is built and never touched here.

mod acyclic;
mod components;
pub mod graph;
mod order;
mod position;
pub mod ring;
pub mod route;
mod rank;

use erdling_core::{EngineConfig, EntityId, Model, Point, RelationshipId, Size};
use graph::EntityGraph;
use rustc_hash::{FxHashMap, FxHashSet};

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error(transparent)]
    Model(#[from] erdling_core::ModelError),
}

/// Runs the full pipeline, overwriting every position in the model.
/// Deterministic: the same model and config always produce the same layout.
pub fn auto_layout(model: &mut Model, cfg: &EngineConfig) -> Result<()> {
    if model.is_empty() {
        return Ok(());
    }
    let spacing = &cfg.layout;

    let mut extents: FxHashMap<EntityId, Size> = FxHashMap::default();
    for entity in model.entities() {
        let attrs: Vec<_> = model.attributes_of(entity.id).collect();
        let extent = if attrs.is_empty() {
            entity.size
        } else {
            let max_rx = attrs.iter().map(|a| a.rx).fold(0.0_f64, f64::max);
            let ry = attrs.iter().map(|a| a.ry).fold(0.0_f64, f64::max);
            let needed = ring::label_perimeter(attrs.iter().copied(), cfg.attribute.padding);
            ring::inflated_extent(entity.size, max_rx, ry, needed, spacing)
        };
        extents.insert(entity.id, extent);
    }

    let mut graph = EntityGraph::new();
    for entity in model.entities() {
        graph.add_node(entity.id);
    }
    for rel in model.relationships() {
        graph.add_edge(rel.from, rel.to);
    }

    // Each weakly-connected component is laid out on its own and the results
    // are packed left to right.
    let mut centers: FxHashMap<EntityId, Point> = FxHashMap::default();
    let mut cursor_x = 0.0;
    for component in components::split(&graph) {
        let members: FxHashSet<EntityId> = component.iter().copied().collect();
        let mut sub = EntityGraph::new();
        for &node in &component {
            sub.add_node(node);
        }
        for (from, to) in graph.edges() {
            if members.contains(&from) && members.contains(&to) {
                sub.add_edge(from, to);
            }
        }

        acyclic::remove_cycles(&mut sub);
        let ranks = rank::longest_path(&sub);
        let mut layers = rank::by_rank(&sub, &ranks);
        order::order_ranks(&sub, &mut layers);
        let local = position::assign_centers(&layers, &extents, spacing.node_sep, spacing.rank_sep);

        let (mut min_x, mut min_y, mut max_x) = (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for (id, c) in &local {
            let ext = extents[id];
            min_x = min_x.min(c.x - ext.width / 2.0);
            min_y = min_y.min(c.y - ext.height / 2.0);
            max_x = max_x.max(c.x + ext.width / 2.0);
        }
        for (id, c) in local {
            centers.insert(id, c.translated(cursor_x - min_x, -min_y));
        }
        cursor_x += (max_x - min_x) + spacing.component_gap;
    }

    tracing::debug!(
        entities = model.entity_count(),
        relationships = model.relationship_count(),
        "placing entities"
    );
    let sizes: Vec<(EntityId, Size)> = model.entities().map(|e| (e.id, e.size)).collect();
    for (id, size) in sizes {
        let c = centers[&id];
        model.set_entity_position(
            id,
            Point::new(c.x - size.width / 2.0, c.y - size.height / 2.0),
        )?;
    }

    ring::place_rings(model, cfg)?;
    place_diamonds(model, cfg)?;
    Ok(())
}

/// Positions each relationship diamond at the midpoint of its endpoints.
/// Also used on its own after a drag, when entity positions change but the
/// layered arrangement should not be recomputed.
pub fn place_diamonds(model: &mut Model, cfg: &EngineConfig) -> Result<()> {
    let mut placements: Vec<(RelationshipId, Point)> = Vec::new();
    for rel in model.relationships() {
        let (Some(a), Some(b)) = (model.entity(rel.from), model.entity(rel.to)) else {
            continue;
        };
        placements.push((
            rel.id,
            route::diamond_center(a.center(), b.center(), cfg.layout.diamond_nudge),
        ));
    }
    for (id, pos) in placements {
        model.set_relationship_position(id, pos)?;
    }
    Ok(())
}
