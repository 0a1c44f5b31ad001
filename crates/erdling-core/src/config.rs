use serde::{Deserialize, Serialize};

/// Runtime-adjustable engine configuration.
///
/// Box and ellipse sizes are derived from font metrics, so changing any font
/// value must force a full re-measurement and scene rebuild, not just a style
/// swap. The editing session owns that invalidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fonts: FontConfig,
    pub entity: EntityMetrics,
    pub attribute: AttributeMetrics,
    pub relationship: RelationshipMetrics,
    pub layout: LayoutSpacing,
    pub viewport: ViewportConfig,
    pub export: ExportConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fonts: FontConfig::default(),
            entity: EntityMetrics::default(),
            attribute: AttributeMetrics::default(),
            relationship: RelationshipMetrics::default(),
            layout: LayoutSpacing::default(),
            viewport: ViewportConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    pub entity_size: f64,
    pub attribute_size: f64,
    pub relationship_size: f64,
    /// Cardinality glyphs at connector midpoints.
    pub label_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Arial, sans-serif".to_string(),
            entity_size: 16.0,
            attribute_size: 13.0,
            relationship_size: 14.0,
            label_size: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityMetrics {
    pub min_width: f64,
    pub max_width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for EntityMetrics {
    fn default() -> Self {
        Self {
            min_width: 120.0,
            max_width: 300.0,
            height: 60.0,
            padding: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeMetrics {
    pub min_rx: f64,
    pub max_rx: f64,
    pub ry: f64,
    pub padding: f64,
}

impl Default for AttributeMetrics {
    fn default() -> Self {
        Self {
            min_rx: 40.0,
            max_rx: 110.0,
            ry: 22.0,
            padding: 24.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipMetrics {
    pub min_width: f64,
    pub max_width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for RelationshipMetrics {
    fn default() -> Self {
        Self {
            min_width: 100.0,
            max_width: 240.0,
            height: 64.0,
            padding: 36.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSpacing {
    /// Horizontal separation between entity boxes in the same rank.
    pub node_sep: f64,
    /// Vertical separation between ranks.
    pub rank_sep: f64,
    /// Gap between independently laid-out disconnected components.
    pub component_gap: f64,
    /// Base distance between an entity border and its attribute ring.
    pub ring_offset: f64,
    /// Neighbor-entity distance below which the attribute ring is adjusted.
    pub ring_proximity: f64,
    /// Upper clip for proximity-driven ring growth, relative to the
    /// unadjusted radius.
    pub ring_growth_max: f64,
    /// Offset applied to a relationship diamond when its entities are nearly
    /// co-located on one axis.
    pub diamond_nudge: f64,
}

impl Default for LayoutSpacing {
    fn default() -> Self {
        Self {
            node_sep: 140.0,
            rank_sep: 160.0,
            component_gap: 120.0,
            ring_offset: 60.0,
            ring_proximity: 280.0,
            ring_growth_max: 1.5,
            diamond_nudge: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Fraction of the viewport that fit-to-content fills.
    pub fit_margin: f64,
    /// Scale applied when focusing a primitive from the side list.
    pub focus_zoom: f64,
    pub animation_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.2,
            max_scale: 4.0,
            fit_margin: 0.9,
            focus_zoom: 1.5,
            animation_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Padding added around whole-diagram export bounds.
    pub padding: f64,
    /// Minimum export bounds, enforced to avoid degenerate outputs.
    pub min_width: f64,
    pub min_height: f64,
    /// Raster supersampling multiplier.
    pub raster_scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            padding: 40.0,
            min_width: 200.0,
            min_height: 150.0,
            raster_scale: 2.0,
        }
    }
}
