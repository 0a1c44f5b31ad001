//! The editing session: single owner of the model, scene graph, viewport and
//! interaction state. Every mutation funnels through here so the scene and
//! connectors can never go stale relative to the model.

use std::sync::Arc;

use erdling_core::{
    EngineConfig, EntityId, Model, Point, ProjectSnapshot, SchemaInput, Size, TextMeasurer,
};
use erdling_render::{
    BoundsMode, SceneGraph, SceneId, SvgOptions, content_bounds, render_svg,
};

use crate::interact::{DragState, EditorState, Key, PointerEvent};
use crate::viewport::{Viewport, ViewportAnimation};
use crate::Result;

pub struct Session {
    cfg: EngineConfig,
    measurer: Arc<dyn TextMeasurer + Send + Sync>,
    model: Model,
    scene: SceneGraph,
    viewport: Viewport,
    drag: DragState,
    editor: EditorState,
    animation: Option<ViewportAnimation>,
}

impl Session {
    pub fn new(cfg: EngineConfig, measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        Self {
            cfg,
            measurer,
            model: Model::new(),
            scene: SceneGraph::new(),
            viewport: Viewport::default(),
            drag: DragState::Idle,
            editor: EditorState::Viewing,
            animation: None,
        }
    }

    /// A session with the default config and the built-in font metrics.
    pub fn with_defaults() -> Self {
        Self::new(
            EngineConfig::default(),
            Arc::new(erdling_core::FontMetricsTextMeasurer),
        )
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn editor_state(&self) -> &EditorState {
        &self.editor
    }

    // --- lifecycle ---------------------------------------------------------

    /// Imports a schema, replacing the whole session content. All-or-nothing:
    /// on error the previous model, scene and viewport stay untouched.
    pub fn import_schema(&mut self, input: &SchemaInput) -> Result<()> {
        let mut model = Model::from_schema(input, &self.cfg, &*self.measurer)?;
        erdling_layout::auto_layout(&mut model, &self.cfg)?;
        tracing::info!(
            entities = model.entity_count(),
            relationships = model.relationship_count(),
            "imported schema"
        );
        self.replace_model(model);
        Ok(())
    }

    /// Restores a saved project exactly; no automatic layout runs.
    pub fn load_snapshot(&mut self, snapshot: &ProjectSnapshot) -> Result<()> {
        let model = Model::from_snapshot(snapshot)?;
        self.replace_model(model);
        Ok(())
    }

    pub fn snapshot(&self) -> ProjectSnapshot {
        self.model.snapshot()
    }

    fn replace_model(&mut self, model: Model) {
        self.model = model;
        self.scene = SceneGraph::new();
        self.scene.rebuild(&self.model);
        self.drag = DragState::Idle;
        self.editor = EditorState::Viewing;
        self.animation = None;
        self.fit_view();
    }

    /// Swapping the config re-derives every text-dependent size and refreshes
    /// the scene in place, keeping positions and interaction state.
    pub fn set_config(&mut self, cfg: EngineConfig) -> Result<()> {
        self.cfg = cfg;
        self.model.remeasure(&self.cfg, &*self.measurer);
        erdling_layout::place_diamonds(&mut self.model, &self.cfg)?;
        self.scene.sync_geometry(&self.model);
        Ok(())
    }

    // --- viewport ------------------------------------------------------------

    pub fn set_view_size(&mut self, size: Size) {
        self.viewport.set_view_size(size);
    }

    /// Fits the whole visible diagram into the view.
    pub fn fit_view(&mut self) {
        if let Some(bounds) = content_bounds(&self.scene) {
            self.viewport.fit_to(bounds, &self.cfg.viewport);
        }
    }

    /// Highlights a primitive and starts an animated pan/zoom to it. Used by
    /// the navigation list, where the target may be far outside the view.
    pub fn focus(&mut self, id: SceneId) -> Result<()> {
        let center = match id {
            SceneId::Entity(e) => self
                .model
                .entity(e)
                .ok_or(erdling_core::ModelError::UnknownEntity(e))?
                .center(),
            SceneId::Attribute(a) => self
                .model
                .attribute(a)
                .ok_or(erdling_core::ModelError::UnknownAttribute(a))?
                .position,
            SceneId::Relationship(r) => self
                .model
                .relationship(r)
                .ok_or(erdling_core::ModelError::UnknownRelationship(r))?
                .position,
        };
        self.scene.set_highlight(Some(id));
        self.scene.raise_to_top(id);
        let target = self.viewport.focus_transform(center, &self.cfg.viewport);
        self.animation = Some(ViewportAnimation::new(
            self.viewport.transform(),
            target,
            self.cfg.viewport.animation_ms,
        ));
        Ok(())
    }

    pub fn has_animation(&self) -> bool {
        self.animation.is_some()
    }

    /// Advances the running viewport animation by `dt_ms` of wall time.
    pub fn advance_animation(&mut self, dt_ms: u64) {
        if let Some(anim) = &mut self.animation {
            let t = anim.advance(dt_ms);
            self.viewport.apply(t);
            if anim.is_finished() {
                self.animation = None;
            }
        }
    }

    // --- pointer and keyboard ---------------------------------------------

    pub fn pointer(&mut self, event: PointerEvent) -> Result<()> {
        match event {
            PointerEvent::Down(p) => {
                // Clicking away saves a pending label edit.
                self.commit_edit()?;
                let world = self.viewport.screen_to_world(p);
                if let Some(target) = self.scene.node_at(world) {
                    self.drag = DragState::Dragging {
                        target,
                        last_world: world,
                    };
                    self.scene.raise_to_top(target);
                    self.scene.set_highlight(Some(target));
                } else {
                    self.scene.set_highlight(None);
                }
            }
            PointerEvent::Move(p) => {
                if let DragState::Dragging { target, last_world } = self.drag {
                    let world = self.viewport.screen_to_world(p);
                    let (dx, dy) = (world.x - last_world.x, world.y - last_world.y);
                    self.drag_by(target, dx, dy)?;
                    self.drag = DragState::Dragging {
                        target,
                        last_world: world,
                    };
                }
            }
            PointerEvent::Up(_) => {
                self.drag = DragState::Idle;
            }
            PointerEvent::DoubleClick(p) => {
                // A double-click elsewhere saves the pending edit first, then
                // opens the editor on whatever label was hit.
                self.commit_edit()?;
                self.drag = DragState::Idle;
                let world = self.viewport.screen_to_world(p);
                if let Some(target) = self.scene.node_at(world) {
                    self.begin_edit(target)?;
                }
            }
        }
        Ok(())
    }

    /// Applies one drag delta. Entity drags carry owned attributes and
    /// re-center every diamond; attribute and diamond drags only refresh the
    /// connectors touching the moved node.
    fn drag_by(&mut self, target: SceneId, dx: f64, dy: f64) -> Result<()> {
        match target {
            SceneId::Entity(id) => {
                self.model.translate_entity(id, dx, dy)?;
                erdling_layout::place_diamonds(&mut self.model, &self.cfg)?;
                self.scene.sync_geometry(&self.model);
            }
            SceneId::Attribute(id) => {
                let pos = self
                    .model
                    .attribute(id)
                    .ok_or(erdling_core::ModelError::UnknownAttribute(id))?
                    .position
                    .translated(dx, dy);
                self.model.set_attribute_position(id, pos)?;
                self.scene.update_attribute(&self.model, id);
            }
            SceneId::Relationship(id) => {
                let pos = self
                    .model
                    .relationship(id)
                    .ok_or(erdling_core::ModelError::UnknownRelationship(id))?
                    .position
                    .translated(dx, dy);
                self.model.set_relationship_position(id, pos)?;
                self.scene.update_relationship(&self.model, id);
            }
        }
        Ok(())
    }

    pub fn key(&mut self, key: Key) -> Result<()> {
        match key {
            Key::Enter => self.commit_edit()?,
            Key::Escape => {
                if self.editor.is_editing() {
                    self.cancel_edit();
                } else if self.drag.is_dragging() {
                    self.drag = DragState::Idle;
                } else {
                    self.scene.set_highlight(None);
                }
            }
        }
        Ok(())
    }

    // --- label editing -------------------------------------------------------

    /// Starts editing a label, implicitly cancelling any edit in progress.
    pub fn begin_edit(&mut self, target: SceneId) -> Result<()> {
        let original = match target {
            SceneId::Entity(e) => self
                .model
                .entity(e)
                .ok_or(erdling_core::ModelError::UnknownEntity(e))?
                .display_name
                .clone(),
            SceneId::Attribute(a) => self
                .model
                .attribute(a)
                .ok_or(erdling_core::ModelError::UnknownAttribute(a))?
                .display_name
                .clone(),
            SceneId::Relationship(r) => self
                .model
                .relationship(r)
                .ok_or(erdling_core::ModelError::UnknownRelationship(r))?
                .display_name
                .clone(),
        };
        self.editor = EditorState::Editing {
            target,
            buffer: original.clone(),
            original,
        };
        Ok(())
    }

    pub fn set_edit_buffer(&mut self, text: impl Into<String>) {
        if let EditorState::Editing { buffer, .. } = &mut self.editor {
            *buffer = text.into();
        }
    }

    /// Applies the buffered rename. A whitespace-only or unchanged buffer is
    /// a no-op cancel. Renaming re-derives the target's size, so the scene is
    /// re-synced and connectors land on the new outline.
    pub fn commit_edit(&mut self) -> Result<()> {
        let EditorState::Editing {
            target,
            buffer,
            original,
        } = std::mem::replace(&mut self.editor, EditorState::Viewing)
        else {
            return Ok(());
        };
        let trimmed = buffer.trim();
        if trimmed.is_empty() || trimmed == original {
            return Ok(());
        }
        match target {
            SceneId::Entity(e) => {
                self.model
                    .rename_entity(e, trimmed, &self.cfg, &*self.measurer)?
            }
            SceneId::Attribute(a) => {
                self.model
                    .rename_attribute(a, trimmed, &self.cfg, &*self.measurer)?
            }
            SceneId::Relationship(r) => {
                self.model
                    .rename_relationship(r, trimmed, &self.cfg, &*self.measurer)?
            }
        }
        erdling_layout::place_diamonds(&mut self.model, &self.cfg)?;
        self.scene.sync_geometry(&self.model);
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editor = EditorState::Viewing;
    }

    // --- structure edits -------------------------------------------------------

    /// Adds an empty entity centered in the current view.
    pub fn add_entity(&mut self, name: &str) -> EntityId {
        let id = self.model.add_entity(name, &self.cfg, &*self.measurer);
        let center = self.viewport.world_rect().center();
        let size = self.model.entity(id).map(|e| e.size).unwrap_or_default();
        // The id was just allocated, so the position update cannot fail.
        let _ = self.model.set_entity_position(
            id,
            Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0),
        );
        self.scene.rebuild(&self.model);
        id
    }

    /// Deletes an entity with its attributes and incident relationships.
    pub fn delete_entity(&mut self, id: EntityId) -> Result<()> {
        self.model.delete_entity(id)?;
        // The drag target (or its owner) may be gone now.
        if let DragState::Dragging { target, .. } = self.drag {
            let alive = match target {
                SceneId::Entity(e) => self.model.entity(e).is_some(),
                SceneId::Attribute(a) => self.model.attribute(a).is_some(),
                SceneId::Relationship(r) => self.model.relationship(r).is_some(),
            };
            if !alive {
                self.drag = DragState::Idle;
            }
        }
        self.scene.rebuild(&self.model);
        Ok(())
    }

    /// Toggles relationship visibility and returns the new state.
    pub fn toggle_relationships(&mut self) -> bool {
        let visible = !self.scene.relationships_visible();
        self.scene.set_relationships_visible(visible);
        visible
    }

    pub fn set_highlight(&mut self, id: Option<SceneId>) {
        self.scene.set_highlight(id);
    }

    // --- export ---------------------------------------------------------------

    pub fn export_svg(&self, mode: BoundsMode, background: Option<String>) -> Result<String> {
        let svg = render_svg(&self.scene, &self.cfg, &SvgOptions { mode, background })?;
        Ok(svg)
    }

    #[cfg(feature = "raster")]
    pub fn export_png(&self, mode: BoundsMode, background: Option<String>) -> Result<Vec<u8>> {
        let svg = self.export_svg(mode, background)?;
        let bytes = crate::raster::svg_to_png(
            &svg,
            &crate::raster::RasterOptions {
                scale: self.cfg.export.raster_scale,
                background: None,
                jpeg_quality: 90,
            },
        )?;
        Ok(bytes)
    }

    #[cfg(feature = "raster")]
    pub fn export_jpeg(&self, mode: BoundsMode, background: Option<String>) -> Result<Vec<u8>> {
        let svg = self.export_svg(mode, background.clone())?;
        let bytes = crate::raster::svg_to_jpeg(
            &svg,
            &crate::raster::RasterOptions {
                scale: self.cfg.export.raster_scale,
                background,
                jpeg_quality: 90,
            },
        )?;
        Ok(bytes)
    }

    /// The world rect currently visible, for `BoundsMode::CurrentView`.
    pub fn current_view_rect(&self) -> erdling_core::Rect {
        self.viewport.world_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erdling_core::DeterministicTextMeasurer;

    fn session() -> Session {
        let mut s = Session::new(
            EngineConfig::default(),
            Arc::new(DeterministicTextMeasurer::default()),
        );
        let input: SchemaInput = serde_json::from_str(
            r#"{
              "entities": [
                {"name": "Department", "attributes": [{"name": "dept_id", "isPK": true}]},
                {"name": "Employee", "attributes": [{"name": "emp_id", "isPK": true}]}
              ],
              "relationships": [
                {"name": "belongs_to", "from": "Employee", "to": "Department", "type": "1:N"}
              ]
            }"#,
        )
        .unwrap();
        s.import_schema(&input).unwrap();
        s
    }

    fn screen_of(s: &Session, world: Point) -> Point {
        s.viewport().world_to_screen(world)
    }

    #[test]
    fn drag_follows_the_pointer_exactly() {
        let mut s = session();
        let id = s.model().entity_by_name("Employee").unwrap().id;
        let start_world = s.model().entity(id).unwrap().center();
        let start = screen_of(&s, start_world);

        s.pointer(PointerEvent::Down(start)).unwrap();
        assert!(s.drag_state().is_dragging());
        s.pointer(PointerEvent::Move(start.translated(60.0, 45.0)))
            .unwrap();
        s.pointer(PointerEvent::Up(start.translated(60.0, 45.0)))
            .unwrap();
        assert!(!s.drag_state().is_dragging());

        let scale = s.viewport().scale();
        let moved = s.model().entity(id).unwrap().center();
        assert!((moved.x - (start_world.x + 60.0 / scale)).abs() < 1e-9);
        assert!((moved.y - (start_world.y + 45.0 / scale)).abs() < 1e-9);
    }

    #[test]
    fn attribute_drag_moves_only_that_attribute() {
        let mut s = session();
        let attr = s.model().attributes().next().unwrap().clone();
        let entity_pos = s.model().entity(attr.entity_id).unwrap().position;
        let start = screen_of(&s, attr.position);

        s.pointer(PointerEvent::Down(start)).unwrap();
        match s.drag_state() {
            DragState::Dragging { target, last_world } => {
                assert_eq!(*target, SceneId::Attribute(attr.id));
                assert!(last_world.distance_to(attr.position) < 1e-9);
            }
            DragState::Idle => panic!("pointer down on an attribute must start a drag"),
        }
        s.pointer(PointerEvent::Move(start.translated(25.0, -10.0)))
            .unwrap();
        s.pointer(PointerEvent::Up(start.translated(25.0, -10.0)))
            .unwrap();

        let scale = s.viewport().scale();
        let moved = s.model().attribute(attr.id).unwrap().position;
        assert!((moved.x - (attr.position.x + 25.0 / scale)).abs() < 1e-9);
        assert!((moved.y - (attr.position.y - 10.0 / scale)).abs() < 1e-9);
        // The owning entity stayed put.
        assert_eq!(s.model().entity(attr.entity_id).unwrap().position, entity_pos);
    }

    #[test]
    fn diamond_drag_repositions_the_relationship() {
        let mut s = session();
        let rel = s.model().relationships().next().unwrap().clone();
        let start = screen_of(&s, rel.position);

        s.pointer(PointerEvent::Down(start)).unwrap();
        s.pointer(PointerEvent::Move(start.translated(0.0, 30.0)))
            .unwrap();
        s.pointer(PointerEvent::Up(start.translated(0.0, 30.0)))
            .unwrap();

        let scale = s.viewport().scale();
        let moved = s.model().relationship(rel.id).unwrap().position;
        assert!((moved.y - (rel.position.y + 30.0 / scale)).abs() < 1e-9);
        // Connectors follow the diamond.
        for conn in s.scene().relationship_connectors() {
            let anchor_dist = conn.to.distance_to(moved);
            assert!(anchor_dist <= rel.size.width.max(rel.size.height));
        }
    }

    #[test]
    fn pointer_down_on_empty_space_clears_highlight() {
        let mut s = session();
        let id = s.model().entity_by_name("Employee").unwrap().id;
        s.focus(SceneId::Entity(id)).unwrap();
        assert!(s.scene().is_highlighted(SceneId::Entity(id)));

        s.pointer(PointerEvent::Down(Point::new(-10_000.0, -10_000.0)))
            .unwrap();
        assert_eq!(s.scene().highlight(), None);
    }

    #[test]
    fn editor_commit_renames_and_resizes() {
        let mut s = session();
        let id = s.model().entity_by_name("Department").unwrap().id;
        s.begin_edit(SceneId::Entity(id)).unwrap();
        s.set_edit_buffer("  Org_Unit_With_A_Considerably_Longer_Title  ");
        s.key(Key::Enter).unwrap();

        let e = s.model().entity(id).unwrap();
        assert_eq!(e.display_name, "Org_Unit_With_A_Considerably_Longer_Title");
        assert_eq!(e.size.width, s.config().entity.max_width);
        assert!(!s.editor_state().is_editing());
    }

    #[test]
    fn editor_blank_or_unchanged_commit_is_a_noop() {
        let mut s = session();
        let id = s.model().entity_by_name("Department").unwrap().id;

        s.begin_edit(SceneId::Entity(id)).unwrap();
        s.set_edit_buffer("   ");
        s.commit_edit().unwrap();
        assert_eq!(s.model().entity(id).unwrap().display_name, "Department");

        s.begin_edit(SceneId::Entity(id)).unwrap();
        s.set_edit_buffer("Department");
        s.commit_edit().unwrap();
        assert_eq!(s.model().entity(id).unwrap().display_name, "Department");
    }

    #[test]
    fn double_click_opens_the_editor_on_the_hit_label() {
        let mut s = session();
        let id = s.model().entity_by_name("Employee").unwrap().id;
        let p = screen_of(&s, s.model().entity(id).unwrap().center());
        s.pointer(PointerEvent::DoubleClick(p)).unwrap();
        assert_eq!(
            *s.editor_state(),
            EditorState::Editing {
                target: SceneId::Entity(id),
                buffer: "Employee".into(),
                original: "Employee".into(),
            }
        );
    }

    #[test]
    fn escape_cancels_the_edit() {
        let mut s = session();
        let id = s.model().entity_by_name("Department").unwrap().id;
        s.begin_edit(SceneId::Entity(id)).unwrap();
        s.set_edit_buffer("Renamed");
        s.key(Key::Escape).unwrap();
        assert_eq!(s.model().entity(id).unwrap().display_name, "Department");
        assert!(!s.editor_state().is_editing());
    }

    #[test]
    fn focus_starts_an_animation_toward_the_target() {
        let mut s = session();
        let id = s.model().entity_by_name("Employee").unwrap().id;
        s.focus(SceneId::Entity(id)).unwrap();
        assert!(s.has_animation());

        s.advance_animation(1_000);
        assert!(!s.has_animation());
        assert_eq!(s.viewport().scale(), s.config().viewport.focus_zoom);
        // The focused entity ends up at the view center.
        let view = s.viewport().view_size();
        let on_screen = s
            .viewport()
            .world_to_screen(s.model().entity(id).unwrap().center());
        assert!((on_screen.x - view.width / 2.0).abs() < 1e-6);
        assert!((on_screen.y - view.height / 2.0).abs() < 1e-6);
    }

    #[test]
    fn deleting_a_dragged_entity_resets_the_drag() {
        let mut s = session();
        let id = s.model().entity_by_name("Employee").unwrap().id;
        let start = screen_of(&s, s.model().entity(id).unwrap().center());
        s.pointer(PointerEvent::Down(start)).unwrap();
        s.delete_entity(id).unwrap();
        assert!(!s.drag_state().is_dragging());
        assert_eq!(s.model().entity_count(), 1);
    }

    #[test]
    fn failed_import_keeps_the_previous_session() {
        let mut s = session();
        let bad: SchemaInput = serde_json::from_str(r#"{"entities": []}"#).unwrap();
        assert!(s.import_schema(&bad).is_err());
        assert_eq!(s.model().entity_count(), 2);
        assert_eq!(s.scene().entities().len(), 2);
    }
}
