//! Retained scene graph. The scene is rebuilt when the model's structure
//! changes and merely re-synced when only geometry moves, so interaction
//! state (highlight, z-order, visibility) survives drags and edits.

use erdling_core::{AttributeId, EntityId, Model, Point, Rect, RelationshipId, Size};
use erdling_layout::route;

/// Stable identity of a scene node, derived from model ids so the same
/// primitive keeps the same scene identity across syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneId {
    Entity(EntityId),
    Attribute(AttributeId),
    Relationship(RelationshipId),
}

/// Which end of a relationship a connector belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorEnd {
    From,
    To,
}

#[derive(Debug, Clone)]
pub struct AttributeConnector {
    pub attribute: AttributeId,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone)]
pub struct RelationshipConnector {
    pub relationship: RelationshipId,
    pub end: ConnectorEnd,
    pub from: Point,
    pub to: Point,
    /// Where the cardinality symbol is drawn.
    pub label_pos: Point,
    pub label: &'static str,
}

#[derive(Debug, Clone)]
pub struct EntityNode {
    pub id: EntityId,
    pub rect: Rect,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct AttributeNode {
    pub id: AttributeId,
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    pub label: String,
    pub is_pk: bool,
    pub is_fk: bool,
}

#[derive(Debug, Clone)]
pub struct DiamondNode {
    pub id: RelationshipId,
    pub center: Point,
    pub size: Size,
    pub label: String,
}

/// Paint order is fixed by category: attribute connectors, then relationship
/// connectors, diamonds, entity boxes, attribute ellipses. Within entities
/// and attributes, later vector entries paint on top; `raise_to_top` exploits
/// that.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    pub(crate) attribute_connectors: Vec<AttributeConnector>,
    pub(crate) relationship_connectors: Vec<RelationshipConnector>,
    pub(crate) diamonds: Vec<DiamondNode>,
    pub(crate) entities: Vec<EntityNode>,
    pub(crate) attributes: Vec<AttributeNode>,
    relationships_visible: bool,
    highlight: Option<SceneId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            relationships_visible: true,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.attributes.is_empty() && self.diamonds.is_empty()
    }

    pub fn relationships_visible(&self) -> bool {
        self.relationships_visible
    }

    /// Hiding relationships suppresses diamonds and their connectors from
    /// painting and bounds, but their geometry is retained so toggling back
    /// needs no recomputation.
    pub fn set_relationships_visible(&mut self, visible: bool) {
        self.relationships_visible = visible;
    }

    pub fn highlight(&self) -> Option<SceneId> {
        self.highlight
    }

    /// At most one node is highlighted at a time; highlighting a new node
    /// clears the previous one.
    pub fn set_highlight(&mut self, id: Option<SceneId>) {
        self.highlight = id;
    }

    pub fn is_highlighted(&self, id: SceneId) -> bool {
        self.highlight == Some(id)
    }

    /// Moves a node to the end of its category so it paints above its peers.
    /// Connectors stay put; only boxes, ellipses and diamonds restack.
    pub fn raise_to_top(&mut self, id: SceneId) {
        match id {
            SceneId::Entity(e) => raise(&mut self.entities, |n| n.id == e),
            SceneId::Attribute(a) => raise(&mut self.attributes, |n| n.id == a),
            SceneId::Relationship(r) => raise(&mut self.diamonds, |n| n.id == r),
        }
    }

    /// Full reconstruction from the model. Resets z-order to model order but
    /// keeps highlight and visibility, dropping the highlight if its node no
    /// longer exists.
    pub fn rebuild(&mut self, model: &Model) {
        tracing::trace!(
            entities = model.entity_count(),
            attributes = model.attribute_count(),
            "rebuilding scene"
        );
        self.entities = model
            .entities()
            .map(|e| EntityNode {
                id: e.id,
                rect: e.rect(),
                label: e.display_name.clone(),
            })
            .collect();
        self.attributes = model
            .attributes()
            .map(|a| AttributeNode {
                id: a.id,
                center: a.position,
                rx: a.rx,
                ry: a.ry,
                label: a.display_name.clone(),
                is_pk: a.is_pk,
                is_fk: a.is_fk,
            })
            .collect();
        self.diamonds = model
            .relationships()
            .map(|r| DiamondNode {
                id: r.id,
                center: r.position,
                size: r.size,
                label: r.display_name.clone(),
            })
            .collect();
        self.rebuild_connectors(model);

        if let Some(h) = self.highlight
            && !self.contains(h)
        {
            self.highlight = None;
        }
    }

    /// Updates positions and extents of existing nodes in place, preserving
    /// z-order. The node sets must match the model; structural changes need
    /// `rebuild`.
    pub fn sync_geometry(&mut self, model: &Model) {
        for node in &mut self.entities {
            if let Some(e) = model.entity(node.id) {
                node.rect = e.rect();
                node.label = e.display_name.clone();
            }
        }
        for node in &mut self.attributes {
            if let Some(a) = model.attribute(node.id) {
                node.center = a.position;
                node.rx = a.rx;
                node.ry = a.ry;
                node.label = a.display_name.clone();
            }
        }
        for node in &mut self.diamonds {
            if let Some(r) = model.relationship(node.id) {
                node.center = r.position;
                node.size = r.size;
                node.label = r.display_name.clone();
            }
        }
        self.rebuild_connectors(model);
    }

    fn rebuild_connectors(&mut self, model: &Model) {
        self.attribute_connectors = model
            .attributes()
            .filter_map(|a| {
                let entity = model.entity(a.entity_id)?;
                let (from, to) =
                    route::entity_attribute_connector(entity.rect(), a.position, a.rx, a.ry);
                Some(AttributeConnector {
                    attribute: a.id,
                    from,
                    to,
                })
            })
            .collect();

        self.relationship_connectors = model
            .relationships()
            .flat_map(|r| {
                let (from_sym, to_sym) = r.cardinality.symbols();
                let ends = [
                    (r.from, ConnectorEnd::From, from_sym),
                    (r.to, ConnectorEnd::To, to_sym),
                ];
                ends.into_iter().filter_map(move |(entity_id, end, sym)| {
                    let entity = model.entity(entity_id)?;
                    let (start, stop, mid) =
                        route::entity_diamond_connector(entity.rect(), r.position, r.size);
                    Some(RelationshipConnector {
                        relationship: r.id,
                        end,
                        from: start,
                        to: stop,
                        label_pos: mid,
                        label: sym,
                    })
                })
            })
            .collect();
    }

    fn contains(&self, id: SceneId) -> bool {
        match id {
            SceneId::Entity(e) => self.entities.iter().any(|n| n.id == e),
            SceneId::Attribute(a) => self.attributes.iter().any(|n| n.id == a),
            SceneId::Relationship(r) => self.diamonds.iter().any(|n| n.id == r),
        }
    }

    // --- read access for renderers and hit testing ------------------------

    pub fn entities(&self) -> &[EntityNode] {
        &self.entities
    }

    pub fn attributes(&self) -> &[AttributeNode] {
        &self.attributes
    }

    pub fn diamonds(&self) -> &[DiamondNode] {
        &self.diamonds
    }

    pub fn attribute_connectors(&self) -> &[AttributeConnector] {
        &self.attribute_connectors
    }

    pub fn relationship_connectors(&self) -> &[RelationshipConnector] {
        &self.relationship_connectors
    }

    /// Topmost entity whose box contains the point, honoring z-order.
    pub fn entity_at(&self, p: Point) -> Option<EntityId> {
        self.entities
            .iter()
            .rev()
            .find(|n| n.rect.contains(p))
            .map(|n| n.id)
    }

    /// Topmost node under the point, searching categories from the top of
    /// the paint order down: attributes, then entities, then diamonds (only
    /// while relationships are visible).
    pub fn node_at(&self, p: Point) -> Option<SceneId> {
        let attr = self.attributes.iter().rev().find(|n| {
            ((p.x - n.center.x) / n.rx).powi(2) + ((p.y - n.center.y) / n.ry).powi(2) <= 1.0
        });
        if let Some(a) = attr {
            return Some(SceneId::Attribute(a.id));
        }
        if let Some(e) = self.entity_at(p) {
            return Some(SceneId::Entity(e));
        }
        if self.relationships_visible {
            let diamond = self.diamonds.iter().rev().find(|n| {
                let w = n.size.width / 2.0;
                let h = n.size.height / 2.0;
                ((p.x - n.center.x) / w).abs() + ((p.y - n.center.y) / h).abs() <= 1.0
            });
            if let Some(d) = diamond {
                return Some(SceneId::Relationship(d.id));
            }
        }
        None
    }

    /// Refreshes one attribute's ellipse and connector after it moved.
    /// Cheaper than a full sync when nothing else changed.
    pub fn update_attribute(&mut self, model: &Model, id: AttributeId) {
        let Some(attr) = model.attribute(id) else {
            return;
        };
        if let Some(node) = self.attributes.iter_mut().find(|n| n.id == id) {
            node.center = attr.position;
            node.rx = attr.rx;
            node.ry = attr.ry;
        }
        if let Some(entity) = model.entity(attr.entity_id)
            && let Some(conn) = self
                .attribute_connectors
                .iter_mut()
                .find(|c| c.attribute == id)
        {
            let (from, to) =
                route::entity_attribute_connector(entity.rect(), attr.position, attr.rx, attr.ry);
            conn.from = from;
            conn.to = to;
        }
    }

    /// Refreshes one relationship's diamond and both connectors.
    pub fn update_relationship(&mut self, model: &Model, id: RelationshipId) {
        let Some(rel) = model.relationship(id) else {
            return;
        };
        if let Some(node) = self.diamonds.iter_mut().find(|n| n.id == id) {
            node.center = rel.position;
            node.size = rel.size;
        }
        for conn in self
            .relationship_connectors
            .iter_mut()
            .filter(|c| c.relationship == id)
        {
            let entity_id = match conn.end {
                ConnectorEnd::From => rel.from,
                ConnectorEnd::To => rel.to,
            };
            if let Some(entity) = model.entity(entity_id) {
                let (start, stop, mid) =
                    route::entity_diamond_connector(entity.rect(), rel.position, rel.size);
                conn.from = start;
                conn.to = stop;
                conn.label_pos = mid;
            }
        }
    }
}

fn raise<T>(nodes: &mut Vec<T>, pred: impl Fn(&T) -> bool) {
    if let Some(pos) = nodes.iter().position(pred)
        && pos + 1 != nodes.len()
    {
        let node = nodes.remove(pos);
        nodes.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erdling_core::{DeterministicTextMeasurer, EngineConfig, SchemaInput};

    fn scene_and_model() -> (SceneGraph, Model) {
        let input: SchemaInput = serde_json::from_str(
            r#"{
              "entities": [
                {"name": "Department", "attributes": [{"name": "dept_id", "isPK": true}]},
                {"name": "Employee", "attributes": [
                  {"name": "emp_id", "isPK": true}, {"name": "dept_id", "isFK": true}
                ]}
              ],
              "relationships": [
                {"name": "belongs_to", "from": "Employee", "to": "Department", "type": "1:N"}
              ]
            }"#,
        )
        .unwrap();
        let mut model = Model::from_schema(
            &input,
            &EngineConfig::default(),
            &DeterministicTextMeasurer::default(),
        )
        .unwrap();
        erdling_layout::auto_layout(&mut model, &EngineConfig::default()).unwrap();
        let mut scene = SceneGraph::new();
        scene.rebuild(&model);
        (scene, model)
    }

    #[test]
    fn rebuild_mirrors_the_model() {
        let (scene, model) = scene_and_model();
        assert_eq!(scene.entities().len(), model.entity_count());
        assert_eq!(scene.attributes().len(), model.attribute_count());
        assert_eq!(scene.diamonds().len(), 1);
        assert_eq!(scene.attribute_connectors().len(), 3);
        assert_eq!(scene.relationship_connectors().len(), 2);
    }

    #[test]
    fn cardinality_labels_follow_the_many_side() {
        let (scene, model) = scene_and_model();
        let rel = model.relationships().next().unwrap();
        let from_conn = scene
            .relationship_connectors()
            .iter()
            .find(|c| c.end == ConnectorEnd::From)
            .unwrap();
        assert_eq!(from_conn.label, "N");
        assert_eq!(model.entity(rel.from).unwrap().name, "Employee");
    }

    #[test]
    fn highlight_is_exclusive() {
        let (mut scene, model) = scene_and_model();
        let a = model.entities().next().unwrap().id;
        let b = model.entities().nth(1).unwrap().id;
        scene.set_highlight(Some(SceneId::Entity(a)));
        scene.set_highlight(Some(SceneId::Entity(b)));
        assert!(!scene.is_highlighted(SceneId::Entity(a)));
        assert!(scene.is_highlighted(SceneId::Entity(b)));
    }

    #[test]
    fn sync_preserves_z_order_and_highlight() {
        let (mut scene, mut model) = scene_and_model();
        let first = scene.entities()[0].id;
        scene.raise_to_top(SceneId::Entity(first));
        scene.set_highlight(Some(SceneId::Entity(first)));

        model.translate_entity(first, 50.0, 50.0).unwrap();
        scene.sync_geometry(&model);

        assert_eq!(scene.entities().last().unwrap().id, first);
        assert!(scene.is_highlighted(SceneId::Entity(first)));
        assert_eq!(
            scene.entities().last().unwrap().rect,
            model.entity(first).unwrap().rect()
        );
    }

    #[test]
    fn connectors_touch_the_entity_border() {
        let (scene, model) = scene_and_model();
        for conn in scene.attribute_connectors() {
            let attr = model.attribute(conn.attribute).unwrap();
            let rect = model.entity(attr.entity_id).unwrap().rect();
            let p = conn.from;
            let border_dist = (p.x - rect.x)
                .abs()
                .min((p.x - (rect.x + rect.width)).abs())
                .min((p.y - rect.y).abs())
                .min((p.y - (rect.y + rect.height)).abs());
            let expanded = Rect::new(
                rect.x - 1e-9,
                rect.y - 1e-9,
                rect.width + 2e-9,
                rect.height + 2e-9,
            );
            assert!(
                border_dist < 1e-9 && expanded.contains(p),
                "{p:?} not on border of {rect:?}"
            );
        }
    }

    #[test]
    fn hidden_relationships_keep_their_geometry() {
        let (mut scene, _) = scene_and_model();
        let before = scene.diamonds()[0].center;
        scene.set_relationships_visible(false);
        assert!(!scene.relationships_visible());
        assert_eq!(scene.diamonds()[0].center, before);
        scene.set_relationships_visible(true);
        assert_eq!(scene.diamonds()[0].center, before);
    }

    #[test]
    fn node_hit_testing_prefers_topmost_categories() {
        let (mut scene, _) = scene_and_model();
        let attr = scene.attributes()[0].clone();
        assert_eq!(scene.node_at(attr.center), Some(SceneId::Attribute(attr.id)));

        let diamond = scene.diamonds()[0].clone();
        assert_eq!(
            scene.node_at(diamond.center),
            Some(SceneId::Relationship(diamond.id))
        );
        scene.set_relationships_visible(false);
        assert_eq!(scene.node_at(diamond.center), None);
    }

    #[test]
    fn targeted_attribute_update_moves_its_connector() {
        let (mut scene, mut model) = scene_and_model();
        let id = model.attributes().next().unwrap().id;
        let before = scene
            .attribute_connectors()
            .iter()
            .find(|c| c.attribute == id)
            .unwrap()
            .to;

        let pos = model.attribute(id).unwrap().position.translated(40.0, 25.0);
        model.set_attribute_position(id, pos).unwrap();
        scene.update_attribute(&model, id);

        let conn = scene
            .attribute_connectors()
            .iter()
            .find(|c| c.attribute == id)
            .unwrap();
        assert_ne!(conn.to, before);
        let node = scene.attributes().iter().find(|n| n.id == id).unwrap();
        assert_eq!(node.center, pos);
    }

    #[test]
    fn entity_hit_testing_respects_z_order() {
        let (mut scene, mut model) = scene_and_model();
        let a = scene.entities()[0].id;
        let b = scene.entities()[1].id;
        // Stack b exactly on a.
        let target = model.entity(a).unwrap().position;
        let source = model.entity(b).unwrap().position;
        model
            .translate_entity(b, target.x - source.x, target.y - source.y)
            .unwrap();
        scene.sync_geometry(&model);

        let p = model.entity(a).unwrap().center();
        assert_eq!(scene.entity_at(p), Some(b));
        scene.raise_to_top(SceneId::Entity(a));
        assert_eq!(scene.entity_at(p), Some(a));
    }
}
