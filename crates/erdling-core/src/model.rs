use crate::config::EngineConfig;
use crate::error::{ModelError, Result};
use crate::geometry::{self, Point, Size};
use crate::ids::{AttributeId, EntityId, IdAllocator, MonotonicIdAllocator, RelationshipId};
use crate::text::TextMeasurer;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Cardinality of a relationship between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl Cardinality {
    /// Parses the `1:1` / `1:N` / `M:N` notation. Unrecognized input falls
    /// back to one-to-many.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "1:1" => Self::OneToOne,
            "M:N" | "N:M" => Self::ManyToMany,
            _ => Self::OneToMany,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "1:1",
            Self::OneToMany => "1:N",
            Self::ManyToMany => "M:N",
        }
    }

    /// Symbols drawn at the `from` and `to` connector midpoints. The `from`
    /// entity is the many side of a one-to-many relationship.
    pub fn symbols(&self) -> (&'static str, &'static str) {
        match self {
            Self::OneToOne => ("1", "1"),
            Self::OneToMany => ("N", "1"),
            Self::ManyToMany => ("M", "N"),
        }
    }
}

/// Rectangular primitive representing a table/concept. `position` is the box
/// top-left corner in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub display_name: String,
    pub comment: Option<String>,
    pub position: Point,
    pub size: Size,
}

impl Entity {
    pub fn center(&self) -> Point {
        Point {
            x: self.position.x + self.size.width / 2.0,
            y: self.position.y + self.size.height / 2.0,
        }
    }

    pub fn rect(&self) -> crate::geometry::Rect {
        crate::geometry::Rect {
            x: self.position.x,
            y: self.position.y,
            width: self.size.width,
            height: self.size.height,
        }
    }
}

/// Elliptical primitive representing a column/field. `position` is the
/// ellipse center.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: AttributeId,
    pub entity_id: EntityId,
    pub name: String,
    pub display_name: String,
    pub comment: Option<String>,
    pub data_type: String,
    pub is_pk: bool,
    pub is_fk: bool,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub position: Point,
    pub rx: f64,
    pub ry: f64,
}

/// Diamond primitive associating two entities. `position` is the diamond
/// center; `size` holds the full diamond extents.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: RelationshipId,
    pub name: String,
    pub display_name: String,
    pub comment: Option<String>,
    pub from: EntityId,
    pub to: EntityId,
    pub cardinality: Cardinality,
    /// Join-condition attribute names, display-only.
    pub from_attr: Option<String>,
    pub to_attr: Option<String>,
    pub position: Point,
    pub size: Size,
}

/// Structured schema input produced by the (out-of-scope) parsing
/// collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaInput {
    /// Original schema text, carried through to the persistence snapshot.
    #[serde(default)]
    pub source: String,
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub name: String,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(default, rename = "type")]
    pub data_type: Option<String>,
    #[serde(default, rename = "isPK")]
    pub is_pk: bool,
    #[serde(default, rename = "isFK")]
    pub is_fk: bool,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(default, rename = "type")]
    pub cardinality: Option<String>,
    #[serde(default, rename = "fromAttr")]
    pub from_attr: Option<String>,
    #[serde(default, rename = "toAttr")]
    pub to_attr: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// The single source of truth for one editing session.
///
/// Invariants enforced here:
/// - every attribute's `entity_id` resolves to a live entity;
/// - derived sizes always reflect the latest display name;
/// - ids are unique and never reused within the session.
#[derive(Debug, Clone, Default)]
pub struct Model {
    ids: MonotonicIdAllocator,
    entities: IndexMap<EntityId, Entity>,
    attributes: IndexMap<AttributeId, Attribute>,
    relationships: IndexMap<RelationshipId, Relationship>,
    source: String,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from structured schema input. All-or-nothing: any
    /// validation failure leaves the caller's current model untouched because
    /// the new model is only returned on success.
    ///
    /// Relationship endpoints are resolved against entity names by exact
    /// match; unresolved references are dropped, not fatal.
    pub fn from_schema(
        input: &SchemaInput,
        cfg: &EngineConfig,
        measurer: &dyn TextMeasurer,
    ) -> Result<Self> {
        if input.entities.is_empty() {
            return Err(ModelError::EmptySchema);
        }

        let mut model = Model {
            source: input.source.clone(),
            ..Default::default()
        };
        let mut by_name: IndexMap<String, EntityId> = IndexMap::new();

        for record in &input.entities {
            if by_name.contains_key(&record.name) {
                return Err(ModelError::DuplicateEntity {
                    name: record.name.clone(),
                });
            }
            let display = record
                .comment
                .clone()
                .or_else(|| record.display_name.clone())
                .unwrap_or_else(|| record.name.clone());
            let id = model.insert_entity(&record.name, &display, record.comment.clone(), cfg, measurer);
            by_name.insert(record.name.clone(), id);

            for attr in &record.attributes {
                model.insert_attribute(id, attr, cfg, measurer);
            }
        }

        for record in &input.relationships {
            let (Some(&from), Some(&to)) = (by_name.get(&record.from), by_name.get(&record.to))
            else {
                tracing::debug!(
                    from = %record.from,
                    to = %record.to,
                    "dropping relationship with unresolved endpoint"
                );
                continue;
            };
            let name = record
                .name
                .clone()
                .unwrap_or_else(|| format!("{}_to_{}", record.from, record.to));
            let display = record
                .comment
                .clone()
                .or_else(|| record.display_name.clone())
                .unwrap_or_else(|| name.clone());
            let cardinality = Cardinality::parse(record.cardinality.as_deref().unwrap_or(""));
            let id = model.ids.next_relationship();
            model.relationships.insert(
                id,
                Relationship {
                    id,
                    name,
                    display_name: display.clone(),
                    comment: record.comment.clone(),
                    from,
                    to,
                    cardinality,
                    from_attr: record.from_attr.clone(),
                    to_attr: record.to_attr.clone(),
                    position: Point::default(),
                    size: geometry::relationship_size(&display, cfg, measurer),
                },
            );
        }

        Ok(model)
    }

    fn insert_entity(
        &mut self,
        name: &str,
        display: &str,
        comment: Option<String>,
        cfg: &EngineConfig,
        measurer: &dyn TextMeasurer,
    ) -> EntityId {
        let id = self.ids.next_entity();
        self.entities.insert(
            id,
            Entity {
                id,
                name: name.to_string(),
                display_name: display.to_string(),
                comment,
                position: Point::default(),
                size: geometry::entity_size(display, cfg, measurer),
            },
        );
        id
    }

    fn insert_attribute(
        &mut self,
        entity_id: EntityId,
        record: &AttributeRecord,
        cfg: &EngineConfig,
        measurer: &dyn TextMeasurer,
    ) -> AttributeId {
        let display = record
            .comment
            .clone()
            .or_else(|| record.display_name.clone())
            .unwrap_or_else(|| record.name.clone());
        let (rx, ry) = geometry::attribute_radii(&display, cfg, measurer);
        let id = self.ids.next_attribute();
        self.attributes.insert(
            id,
            Attribute {
                id,
                entity_id,
                name: record.name.clone(),
                display_name: display,
                comment: record.comment.clone(),
                data_type: record.data_type.clone().unwrap_or_else(|| "UNKNOWN".into()),
                is_pk: record.is_pk,
                is_fk: record.is_fk,
                nullable: record.nullable,
                default_value: record.default.clone(),
                position: Point::default(),
                rx,
                ry,
            },
        );
        id
    }

    // --- read access -----------------------------------------------------

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.attributes.get(&id)
    }

    pub fn relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships.get(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn attributes_of(&self, entity: EntityId) -> impl Iterator<Item = &Attribute> {
        self.attributes.values().filter(move |a| a.entity_id == entity)
    }

    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.values().find(|e| e.name == name)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // --- mutation --------------------------------------------------------

    pub fn add_entity(
        &mut self,
        name: &str,
        cfg: &EngineConfig,
        measurer: &dyn TextMeasurer,
    ) -> EntityId {
        self.insert_entity(name, name, None, cfg, measurer)
    }

    pub fn add_attribute(
        &mut self,
        entity_id: EntityId,
        record: &AttributeRecord,
        cfg: &EngineConfig,
        measurer: &dyn TextMeasurer,
    ) -> Result<AttributeId> {
        if !self.entities.contains_key(&entity_id) {
            return Err(ModelError::UnknownEntity(entity_id));
        }
        Ok(self.insert_attribute(entity_id, record, cfg, measurer))
    }

    pub fn add_relationship(
        &mut self,
        from: EntityId,
        to: EntityId,
        name: &str,
        cardinality: Cardinality,
        cfg: &EngineConfig,
        measurer: &dyn TextMeasurer,
    ) -> Result<RelationshipId> {
        for id in [from, to] {
            if !self.entities.contains_key(&id) {
                return Err(ModelError::UnknownEntity(id));
            }
        }
        let id = self.ids.next_relationship();
        self.relationships.insert(
            id,
            Relationship {
                id,
                name: name.to_string(),
                display_name: name.to_string(),
                comment: None,
                from,
                to,
                cardinality,
                from_attr: None,
                to_attr: None,
                position: Point::default(),
                size: geometry::relationship_size(name, cfg, measurer),
            },
        );
        Ok(id)
    }

    /// Renames an entity's display name. The derived width is recomputed
    /// synchronously so geometry is never stale for the next render.
    pub fn rename_entity(
        &mut self,
        id: EntityId,
        display_name: &str,
        cfg: &EngineConfig,
        measurer: &dyn TextMeasurer,
    ) -> Result<()> {
        if display_name.trim().is_empty() {
            return Err(ModelError::InvalidName);
        }
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(ModelError::UnknownEntity(id))?;
        entity.display_name = display_name.to_string();
        entity.size = geometry::entity_size(display_name, cfg, measurer);
        Ok(())
    }

    pub fn rename_attribute(
        &mut self,
        id: AttributeId,
        display_name: &str,
        cfg: &EngineConfig,
        measurer: &dyn TextMeasurer,
    ) -> Result<()> {
        if display_name.trim().is_empty() {
            return Err(ModelError::InvalidName);
        }
        let attr = self
            .attributes
            .get_mut(&id)
            .ok_or(ModelError::UnknownAttribute(id))?;
        attr.display_name = display_name.to_string();
        let (rx, ry) = geometry::attribute_radii(display_name, cfg, measurer);
        attr.rx = rx;
        attr.ry = ry;
        Ok(())
    }

    pub fn rename_relationship(
        &mut self,
        id: RelationshipId,
        display_name: &str,
        cfg: &EngineConfig,
        measurer: &dyn TextMeasurer,
    ) -> Result<()> {
        if display_name.trim().is_empty() {
            return Err(ModelError::InvalidName);
        }
        let rel = self
            .relationships
            .get_mut(&id)
            .ok_or(ModelError::UnknownRelationship(id))?;
        rel.display_name = display_name.to_string();
        rel.size = geometry::relationship_size(display_name, cfg, measurer);
        Ok(())
    }

    /// Translates an entity and every attribute it owns by the same delta,
    /// preserving relative offsets. Attributes of other entities are
    /// untouched.
    pub fn translate_entity(&mut self, id: EntityId, dx: f64, dy: f64) -> Result<()> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(ModelError::UnknownEntity(id))?;
        entity.position = entity.position.translated(dx, dy);
        for attr in self.attributes.values_mut() {
            if attr.entity_id == id {
                attr.position = attr.position.translated(dx, dy);
            }
        }
        Ok(())
    }

    pub fn set_entity_position(&mut self, id: EntityId, position: Point) -> Result<()> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(ModelError::UnknownEntity(id))?;
        entity.position = position;
        Ok(())
    }

    pub fn set_attribute_position(&mut self, id: AttributeId, position: Point) -> Result<()> {
        let attr = self
            .attributes
            .get_mut(&id)
            .ok_or(ModelError::UnknownAttribute(id))?;
        attr.position = position;
        Ok(())
    }

    pub fn set_relationship_position(&mut self, id: RelationshipId, position: Point) -> Result<()> {
        let rel = self
            .relationships
            .get_mut(&id)
            .ok_or(ModelError::UnknownRelationship(id))?;
        rel.position = position;
        Ok(())
    }

    /// Deletes an entity, cascading to its owned attributes and removing
    /// every relationship that references it at either end. Removal (rather
    /// than orphaning) keeps the no-dangling-reference invariant.
    pub fn delete_entity(&mut self, id: EntityId) -> Result<()> {
        if self.entities.shift_remove(&id).is_none() {
            return Err(ModelError::UnknownEntity(id));
        }
        self.attributes.retain(|_, a| a.entity_id != id);
        self.relationships.retain(|_, r| r.from != id && r.to != id);
        Ok(())
    }

    pub fn delete_attribute(&mut self, id: AttributeId) -> Result<()> {
        self.attributes
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(ModelError::UnknownAttribute(id))
    }

    pub fn delete_relationship(&mut self, id: RelationshipId) -> Result<()> {
        self.relationships
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(ModelError::UnknownRelationship(id))
    }

    pub fn clear(&mut self) {
        // The allocator is kept so ids are not reused within the session.
        self.entities.clear();
        self.attributes.clear();
        self.relationships.clear();
        self.source.clear();
    }

    /// Re-derives every size from current display names. Called when the
    /// font configuration changes.
    pub fn remeasure(&mut self, cfg: &EngineConfig, measurer: &dyn TextMeasurer) {
        for entity in self.entities.values_mut() {
            entity.size = geometry::entity_size(&entity.display_name, cfg, measurer);
        }
        for attr in self.attributes.values_mut() {
            let (rx, ry) = geometry::attribute_radii(&attr.display_name, cfg, measurer);
            attr.rx = rx;
            attr.ry = ry;
        }
        for rel in self.relationships.values_mut() {
            rel.size = geometry::relationship_size(&rel.display_name, cfg, measurer);
        }
    }

    // --- snapshot support (see snapshot.rs) -------------------------------

    pub(crate) fn allocator(&self) -> &MonotonicIdAllocator {
        &self.ids
    }

    pub(crate) fn restore(
        ids: MonotonicIdAllocator,
        entities: IndexMap<EntityId, Entity>,
        attributes: IndexMap<AttributeId, Attribute>,
        relationships: IndexMap<RelationshipId, Relationship>,
        source: String,
    ) -> Self {
        Self {
            ids,
            entities,
            attributes,
            relationships,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::DeterministicTextMeasurer;

    fn dept_employee_schema() -> SchemaInput {
        serde_json::from_str(
            r#"{
              "entities": [
                {"name": "Department", "attributes": [{"name": "dept_id", "isPK": true}]},
                {"name": "Employee", "attributes": [
                  {"name": "emp_id", "isPK": true},
                  {"name": "dept_id", "isFK": true}
                ]}
              ],
              "relationships": [
                {"name": "belongs_to", "from": "Employee", "to": "Department", "type": "1:N"}
              ]
            }"#,
        )
        .unwrap()
    }

    fn build(input: &SchemaInput) -> Model {
        Model::from_schema(input, &EngineConfig::default(), &DeterministicTextMeasurer::default())
            .unwrap()
    }

    #[test]
    fn import_scenario_counts_and_cardinality() {
        let model = build(&dept_employee_schema());
        assert_eq!(model.entity_count(), 2);
        assert_eq!(model.attribute_count(), 3);
        assert_eq!(model.relationship_count(), 1);

        let rel = model.relationships().next().unwrap();
        assert_eq!(rel.cardinality, Cardinality::OneToMany);
        // Employee is the `from` end, i.e. the many side.
        assert_eq!(model.entity(rel.from).unwrap().name, "Employee");
        assert_eq!(rel.cardinality.symbols(), ("N", "1"));
    }

    #[test]
    fn empty_schema_is_a_validation_error() {
        let input = SchemaInput::default();
        let err = Model::from_schema(
            &input,
            &EngineConfig::default(),
            &DeterministicTextMeasurer::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::EmptySchema));
    }

    #[test]
    fn unresolved_relationship_endpoint_is_dropped() {
        let mut input = dept_employee_schema();
        input.relationships.push(RelationshipRecord {
            name: Some("ghost".into()),
            display_name: None,
            from: "Employee".into(),
            to: "DoesNotExist".into(),
            cardinality: None,
            from_attr: None,
            to_attr: None,
            comment: None,
        });
        let model = build(&input);
        assert_eq!(model.relationship_count(), 1);
    }

    #[test]
    fn unrecognized_cardinality_defaults_to_one_to_many() {
        assert_eq!(Cardinality::parse("weird"), Cardinality::OneToMany);
        assert_eq!(Cardinality::parse("1:1"), Cardinality::OneToOne);
        assert_eq!(Cardinality::parse("M:N"), Cardinality::ManyToMany);
    }

    #[test]
    fn rename_entity_updates_size_synchronously() {
        let cfg = EngineConfig::default();
        let m = DeterministicTextMeasurer::default();
        let mut model = build(&dept_employee_schema());
        let id = model.entity_by_name("Employee").unwrap().id;

        model
            .rename_entity(id, "Staff_Member_With_A_Very_Long_Name", &cfg, &m)
            .unwrap();
        assert_eq!(model.entity(id).unwrap().size.width, cfg.entity.max_width);
    }

    #[test]
    fn blank_rename_is_rejected() {
        let cfg = EngineConfig::default();
        let m = DeterministicTextMeasurer::default();
        let mut model = build(&dept_employee_schema());
        let id = model.entity_by_name("Employee").unwrap().id;
        assert!(matches!(
            model.rename_entity(id, "   ", &cfg, &m),
            Err(ModelError::InvalidName)
        ));
        assert_eq!(model.entity(id).unwrap().display_name, "Employee");
    }

    #[test]
    fn delete_entity_cascades_attributes_and_relationships() {
        let mut model = build(&dept_employee_schema());
        let dept = model.entity_by_name("Department").unwrap().id;

        model.delete_entity(dept).unwrap();
        assert_eq!(model.entity_count(), 1);
        assert!(model.attributes().all(|a| a.entity_id != dept));
        assert_eq!(model.attribute_count(), 2);
        // The belongs_to relationship referenced Department and must be gone.
        assert_eq!(model.relationship_count(), 0);
    }

    #[test]
    fn translate_entity_moves_owned_attributes_only() {
        let mut model = build(&dept_employee_schema());
        let employee = model.entity_by_name("Employee").unwrap().id;
        let before: Vec<(AttributeId, Point)> =
            model.attributes().map(|a| (a.id, a.position)).collect();

        model.translate_entity(employee, 13.0, -7.5).unwrap();

        for (id, old) in before {
            let attr = model.attribute(id).unwrap();
            if attr.entity_id == employee {
                assert_eq!(attr.position, old.translated(13.0, -7.5));
            } else {
                assert_eq!(attr.position, old);
            }
        }
    }

    #[test]
    fn comment_preferred_display_names() {
        let input: SchemaInput = serde_json::from_str(
            r#"{"entities":[{"name":"users","comment":"用户",
                "attributes":[{"name":"id","isPK":true,"comment":"编号"}]}]}"#,
        )
        .unwrap();
        let model = build(&input);
        assert_eq!(model.entities().next().unwrap().display_name, "用户");
        assert_eq!(model.attributes().next().unwrap().display_name, "编号");
    }
}
