use eframe::egui;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{self, Result};
use crate::group::{GraphElement, GroupContainer, UndoRecorder};
use crate::model::{self, GroupId, GroupRecord, NodeId, NodeRecord};

use super::{GraphApp, settings};

const GROUP_PADDING: f32 = 24.0;
pub(super) const GROUP_HEADER: f32 = 32.0;
pub(super) const RESIZE_HANDLE: f32 = 12.0;
const MIN_GROUP_SIZE: f32 = 48.0;
pub(super) const MOVE_NODES: &str = "Move Nodes";
const MOVE_NODES_TO_GROUP: &str = "Move Nodes To Group";

pub(super) fn read_graph(path: &Path) -> Result<model::Graph> {
    let json = error::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

pub(super) fn write_graph(path: &Path, graph: &model::Graph) -> Result<()> {
    let json = serde_json::to_string_pretty(graph)?;
    error::write(path, json)
}

pub(super) fn header_rect(rect: model::Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(rect.x, rect.y),
        egui::vec2(rect.width, GROUP_HEADER.min(rect.height)),
    )
}

pub(super) fn resize_handle_rect(rect: model::Rect) -> egui::Rect {
    let r = rect.to_rect();
    egui::Rect::from_min_max(r.max - egui::vec2(RESIZE_HANDLE, RESIZE_HANDLE), r.max)
}

fn node_elements<'a>(ids: impl IntoIterator<Item = &'a NodeId>) -> Vec<GraphElement> {
    ids.into_iter().cloned().map(GraphElement::Node).collect()
}

impl GraphApp {
    /// Tears down every container and builds fresh ones from the graph.
    pub(super) fn rebuild_containers(&mut self) {
        for container in &mut self.containers {
            container.detach();
        }
        let _reload = self.session.flags.reloading();
        let ids: Vec<GroupId> = self.session.graph.groups.iter().map(|g| g.id).collect();
        self.containers = ids
            .into_iter()
            .filter_map(|id| GroupContainer::initialize(id, &mut self.session))
            .map(|mut container| {
                container.attach();
                container
            })
            .collect();
        let graph = &self.session.graph;
        self.selected.retain(|id| graph.node(id).is_some());
        if self
            .selected_group
            .is_some_and(|g| graph.group(g).is_none())
        {
            self.selected_group = None;
        }
    }

    pub(super) fn container_index(&self, group: GroupId) -> Option<usize> {
        self.containers.iter().position(|c| c.group() == group)
    }

    pub(super) fn container_of_node(&self, id: &NodeId) -> Option<usize> {
        self.containers.iter().position(|c| c.contains_child(id))
    }

    fn snap(&self, v: f32) -> f32 {
        if !self.settings.snap_to_grid || self.settings.grid_size <= 0.0 {
            return v;
        }
        (v / self.settings.grid_size).round() * self.settings.grid_size
    }

    pub(super) fn clear_selection(&mut self) {
        self.selected.clear();
        self.selected_group = None;
    }

    pub(super) fn add_node_at(&mut self, world: egui::Pos2) {
        self.session.push_undo("Add Node");
        let id = self.session.graph.next_node_id();
        let (w, h) = (self.settings.node_width, self.settings.node_height);
        let rect = model::Rect::new(self.snap(world.x - w * 0.5), self.snap(world.y - h * 0.5), w, h);
        self.session.graph.nodes.push(NodeRecord {
            id: id.clone(),
            title: id.to_string(),
            rect,
        });
        self.session.mark_graph_dirty();
        self.clear_selection();
        self.selected.insert(id);
    }

    pub(super) fn delete_selected(&mut self) {
        if self.selected.is_empty() {
            if let Some(group) = self.selected_group {
                self.ungroup(group);
            }
            return;
        }
        self.session.push_undo("Delete Nodes");
        let elements = node_elements(&self.selected);
        {
            let _grouping = self.session.flags.grouping();
            for container in &mut self.containers {
                container.on_elements_removed(&elements, &mut self.session);
            }
        }
        let selected = &self.selected;
        self.session.graph.nodes.retain(|n| !selected.contains(&n.id));
        self.session.mark_graph_dirty();
        self.selected.clear();
    }

    pub(super) fn group_selected(&mut self) {
        let members: Vec<&NodeRecord> = self
            .session
            .graph
            .nodes
            .iter()
            .filter(|n| self.selected.contains(&n.id))
            .collect();
        let Some(bounds) = model::Rect::bounding(members.iter().map(|n| n.rect), GROUP_PADDING)
        else {
            self.status = Some("Select nodes to group".to_string());
            return;
        };
        let elements = node_elements(members.iter().map(|n| &n.id));
        let position = model::Rect::new(
            bounds.x,
            bounds.y - GROUP_HEADER,
            bounds.width,
            bounds.height + GROUP_HEADER,
        );

        self.session.push_undo("Group Selected Nodes");
        let _grouping = self.session.flags.grouping();
        for container in &mut self.containers {
            container.on_elements_removed(&elements, &mut self.session);
        }
        let id = self.session.graph.next_group_id();
        self.session.graph.groups.push(GroupRecord::new(
            id,
            self.settings.default_group_title.clone(),
            self.settings.default_group_color,
            position,
        ));
        let Some(mut container) = GroupContainer::initialize(id, &mut self.session) else {
            return;
        };
        container.attach();
        container.on_elements_added(&elements, &mut self.session);
        self.containers.push(container);
        self.session.mark_graph_dirty();
        self.selected.clear();
        self.selected_group = Some(id);
        info!(group = id, members = elements.len(), "grouped selection");
    }

    pub(super) fn ungroup(&mut self, group: GroupId) {
        let Some(idx) = self.container_index(group) else {
            return;
        };
        self.session.push_undo("Ungroup");
        {
            let _grouping = self.session.flags.grouping();
            let mut container = self.containers.remove(idx);
            let elements = node_elements(container.children());
            container.on_elements_removed(&elements, &mut self.session);
            container.detach();
        }
        self.session.graph.groups.retain(|g| g.id != group);
        self.session.mark_graph_dirty();
        if self.selected_group == Some(group) {
            self.selected_group = None;
        }
        info!(group, "ungrouped");
    }

    pub(super) fn translate_selected(&mut self, delta: egui::Vec2) {
        for node in &mut self.session.graph.nodes {
            if self.selected.contains(&node.id) {
                node.rect = node.rect.translated(delta.x, delta.y);
            }
        }
    }

    /// Delivers add/remove events for dragged nodes whose covering group
    /// changed. A node belongs to the topmost group under its center.
    ///
    /// Runs after the drag's own "Move Nodes" step was recorded; membership
    /// changes join that step, which is relabeled.
    pub(super) fn finish_node_drag(&mut self) {
        let snap = self.settings.snap_to_grid;
        let grid = self.settings.grid_size;
        let mut moved = Vec::new();
        for node in &mut self.session.graph.nodes {
            if !self.selected.contains(&node.id) {
                continue;
            }
            if snap && grid > 0.0 {
                node.rect.x = (node.rect.x / grid).round() * grid;
                node.rect.y = (node.rect.y / grid).round() * grid;
            }
            moved.push((node.id.clone(), node.rect.center()));
        }

        let mut removals: BTreeMap<usize, Vec<GraphElement>> = BTreeMap::new();
        let mut additions: BTreeMap<usize, Vec<GraphElement>> = BTreeMap::new();
        for (id, center) in moved {
            let target = self.containers.iter().rposition(|c| c.rect().contains(center));
            let current = self.container_of_node(&id);
            if target == current {
                continue;
            }
            if let Some(i) = current {
                removals
                    .entry(i)
                    .or_default()
                    .push(GraphElement::Node(id.clone()));
            }
            if let Some(j) = target {
                additions.entry(j).or_default().push(GraphElement::Node(id));
            }
        }
        if removals.is_empty() && additions.is_empty() {
            return;
        }
        {
            let _grouping = self.session.flags.grouping();
            for (i, elements) in removals {
                self.containers[i].on_elements_removed(&elements, &mut self.session);
            }
            for (j, elements) in additions {
                self.containers[j].on_elements_added(&elements, &mut self.session);
            }
        }
        self.session.set_undo_group_name(MOVE_NODES_TO_GROUP);
        self.session.mark_graph_dirty();
    }

    /// Moves the group and its members as one unit.
    pub(super) fn move_group(&mut self, group: GroupId, delta: egui::Vec2) {
        let Some(idx) = self.container_index(group) else {
            return;
        };
        let rect = self.containers[idx].rect().translated(delta.x, delta.y);
        self.containers[idx].set_position(rect, &mut self.session);
        for id in self.containers[idx].children() {
            if let Some(node) = self.session.graph.node_mut(id) {
                node.rect = node.rect.translated(delta.x, delta.y);
            }
        }
    }

    pub(super) fn resize_group(&mut self, group: GroupId, rect: model::Rect) {
        let Some(idx) = self.container_index(group) else {
            return;
        };
        let rect = model::Rect {
            width: rect.width.max(MIN_GROUP_SIZE),
            height: rect.height.max(MIN_GROUP_SIZE),
            ..rect
        };
        self.containers[idx].set_position(rect, &mut self.session);
    }

    pub(super) fn set_group_color(&mut self, group: GroupId, color: model::Rgba) {
        if let Some(idx) = self.container_index(group) {
            self.containers[idx].on_color_changed(color, &mut self.session);
        }
    }

    pub(super) fn commit_group_title(&mut self, group: GroupId) {
        if let Some(idx) = self.container_index(group) {
            self.containers[idx].commit_title(&mut self.session);
        }
    }

    pub(super) fn undo(&mut self) {
        if let Some(label) = self.session.undo() {
            self.rebuild_containers();
            self.status = Some(format!("Undo: {label}"));
        }
    }

    pub(super) fn redo(&mut self) {
        if let Some(label) = self.session.redo() {
            self.rebuild_containers();
            self.status = Some(format!("Redo: {label}"));
        }
    }

    pub(super) fn node_at(&self, world: egui::Pos2) -> Option<NodeId> {
        self.session
            .graph
            .nodes
            .iter()
            .rev()
            .find(|n| n.rect.to_rect().contains(world))
            .map(|n| n.id.clone())
    }

    pub(super) fn group_header_at(&self, world: egui::Pos2) -> Option<GroupId> {
        self.containers
            .iter()
            .rev()
            .find(|c| header_rect(c.rect()).contains(world))
            .map(GroupContainer::group)
    }

    pub(super) fn group_body_at(&self, world: egui::Pos2) -> Option<GroupId> {
        self.containers
            .iter()
            .rev()
            .find(|c| c.rect().to_rect().contains(world))
            .map(GroupContainer::group)
    }

    pub(super) fn resize_handle_at(&self, world: egui::Pos2) -> Option<GroupId> {
        let group = self.selected_group?;
        let container = &self.containers[self.container_index(group)?];
        resize_handle_rect(container.rect())
            .expand(2.0)
            .contains(world)
            .then_some(group)
    }

    pub(super) fn select_in_box(&mut self, a: egui::Pos2, b: egui::Pos2) {
        let area = egui::Rect::from_two_pos(a, b);
        for node in &self.session.graph.nodes {
            if area.intersects(node.rect.to_rect()) {
                self.selected.insert(node.id.clone());
            }
        }
    }

    pub(super) fn save_to_path(&mut self) {
        match write_graph(Path::new(&self.file_path), &self.session.graph) {
            Ok(()) => {
                self.session.dirty = false;
                info!(path = %self.file_path, "graph saved");
                self.status = Some(format!("Saved {}", self.file_path));
            }
            Err(e) => self.status = Some(format!("Save failed: {e}")),
        }
    }

    pub(super) fn save_json_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(&self.file_path)
            .add_filter("JSON", &["json"])
            .save_file()
        {
            self.file_path = path.display().to_string();
            self.save_to_path();
            self.persist_settings();
        }
    }

    pub(super) fn open_json_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            self.file_path = path.display().to_string();
            self.load_from_path();
            self.persist_settings();
        }
    }

    /// Replaces the session graph with the file's and rebuilds the view.
    pub(super) fn load_from_path(&mut self) {
        match read_graph(Path::new(&self.file_path)) {
            Ok(mut graph) => {
                for (old, new) in graph.assign_unique_group_ids() {
                    warn!(old, new, "duplicate group id, giving the group a fresh one");
                }
                self.session.replace_graph(graph);
                self.clear_selection();
                self.rebuild_containers();
                info!(
                    path = %self.file_path,
                    nodes = self.session.graph.nodes.len(),
                    groups = self.containers.len(),
                    "graph loaded"
                );
                self.status = Some(format!("Loaded {}", self.file_path));
            }
            Err(e) => self.status = Some(format!("Load failed: {e}")),
        }
    }

    pub(super) fn persist_settings(&mut self) {
        self.settings.file_path.clone_from(&self.file_path);
        if let Err(e) = settings::save_settings(&self.settings_path, &self.settings) {
            self.status = Some(format!("Settings save failed: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;
    use std::path::PathBuf;

    fn app_with_nodes(nodes: &[(&str, f32, f32)]) -> GraphApp {
        let mut app = GraphApp::with_settings(
            settings::AppSettings {
                snap_to_grid: false,
                ..settings::AppSettings::default()
            },
            PathBuf::from("unused-settings.toml"),
        );
        for (id, x, y) in nodes {
            app.session.graph.nodes.push(NodeRecord {
                id: (*id).into(),
                title: id.to_string(),
                rect: Rect::new(*x, *y, 40.0, 20.0),
            });
        }
        app
    }

    fn select(app: &mut GraphApp, ids: &[&str]) {
        app.selected = ids.iter().map(|id| NodeId::from(*id)).collect();
    }

    fn grouped() -> (GraphApp, GroupId) {
        let mut app = app_with_nodes(&[("a", 0.0, 0.0), ("b", 100.0, 0.0), ("c", 400.0, 400.0)]);
        select(&mut app, &["a", "b"]);
        app.group_selected();
        let id = app.selected_group.unwrap();
        (app, id)
    }

    #[test]
    fn grouping_is_one_undo_step() {
        let (app, id) = grouped();
        let record = app.session.graph.group(id).unwrap();
        assert_eq!(record.member_ids, vec![NodeId::from("a"), NodeId::from("b")]);
        assert_eq!(app.session.undo_label(), Some("Group Selected Nodes"));
        assert!(app.session.dirty);
        assert!(!app.session.flags.state().is_grouping);
        assert!(app.containers[0].is_attached());
        assert!(record.position.contains(model::Point { x: 20.0, y: 10.0 }));
    }

    #[test]
    fn undoing_a_grouping_drops_the_container() {
        let (mut app, _) = grouped();
        app.undo();
        assert!(app.session.graph.groups.is_empty());
        assert!(app.containers.is_empty());
        assert_eq!(app.selected_group, None);
        assert!(!app.session.flags.state().is_reloading);
    }

    fn drag(app: &mut GraphApp, ids: &[&str], delta: egui::Vec2) {
        select(app, ids);
        app.session.push_undo(MOVE_NODES);
        app.translate_selected(delta);
        app.finish_node_drag();
    }

    #[test]
    fn dragging_a_node_into_a_group_adds_it() {
        let (mut app, id) = grouped();
        drag(&mut app, &["c"], egui::vec2(-380.0, -390.0));
        let record = app.session.graph.group(id).unwrap();
        assert!(record.contains_member(&"c".into()));
        assert_eq!(app.session.undo_label(), Some(MOVE_NODES_TO_GROUP));
        assert!(!app.session.flags.state().is_grouping);
    }

    #[test]
    fn dragging_a_node_out_removes_it() {
        let (mut app, id) = grouped();
        drag(&mut app, &["a"], egui::vec2(900.0, 900.0));
        let record = app.session.graph.group(id).unwrap();
        assert_eq!(record.member_ids, vec![NodeId::from("b")]);
        assert_eq!(app.session.undo_label(), Some(MOVE_NODES_TO_GROUP));
    }

    #[test]
    fn drag_within_the_same_group_keeps_the_move_label() {
        let (mut app, id) = grouped();
        drag(&mut app, &["a"], egui::vec2(4.0, 0.0));
        assert_eq!(app.session.graph.group(id).unwrap().member_ids.len(), 2);
        assert_eq!(app.session.undo_label(), Some(MOVE_NODES));
    }

    #[test]
    fn moving_a_node_between_groups_undoes_in_one_step() {
        let (mut app, first) = grouped();
        select(&mut app, &["c"]);
        app.group_selected();
        let second = app.selected_group.unwrap();
        let history_before = app.session.undo_label().map(str::to_string);

        drag(&mut app, &["a"], egui::vec2(400.0, 400.0));
        assert_eq!(app.session.graph.group(first).unwrap().member_ids, vec![NodeId::from("b")]);
        assert!(app.session.graph.group(second).unwrap().contains_member(&"a".into()));

        app.undo();
        assert_eq!(app.session.undo_label().map(str::to_string), history_before);
        assert!(app.session.graph.group(first).unwrap().contains_member(&"a".into()));
        assert!(!app.session.graph.group(second).unwrap().contains_member(&"a".into()));
        assert_eq!(app.session.graph.node(&"a".into()).unwrap().rect.x, 0.0);
    }

    #[test]
    fn deleting_a_member_is_a_single_step() {
        let (mut app, id) = grouped();
        app.session.push_undo("baseline");
        select(&mut app, &["a"]);
        app.delete_selected();
        assert_eq!(app.session.undo_label(), Some("Delete Nodes"));
        assert_eq!(
            app.session.graph.group(id).unwrap().member_ids,
            vec![NodeId::from("b")]
        );
        app.undo();
        assert_eq!(app.session.undo_label(), Some("baseline"));
        assert_eq!(app.session.graph.group(id).unwrap().member_ids.len(), 2);
    }

    #[test]
    fn ungroup_removes_the_record_and_keeps_nodes() {
        let (mut app, id) = grouped();
        app.ungroup(id);
        assert!(app.session.graph.group(id).is_none());
        assert!(app.containers.is_empty());
        assert_eq!(app.session.graph.nodes.len(), 3);
        assert_eq!(app.session.undo_label(), Some("Ungroup"));
    }

    #[test]
    fn moving_a_group_carries_members_and_persists_rect() {
        let (mut app, id) = grouped();
        let before = app.session.graph.group(id).unwrap().position;
        app.move_group(id, egui::vec2(10.0, 5.0));
        assert_eq!(
            app.session.graph.group(id).unwrap().position,
            before.translated(10.0, 5.0)
        );
        assert_eq!(app.session.graph.node(&"a".into()).unwrap().rect.x, 10.0);
        assert_eq!(app.session.graph.node(&"c".into()).unwrap().rect.x, 400.0);
    }

    #[test]
    fn resize_keeps_a_minimum_size() {
        let (mut app, id) = grouped();
        app.resize_group(id, Rect::new(0.0, 0.0, 1.0, 1.0));
        let rect = app.session.graph.group(id).unwrap().position;
        assert_eq!((rect.width, rect.height), (MIN_GROUP_SIZE, MIN_GROUP_SIZE));
    }

    #[test]
    fn color_and_title_edits_are_undoable() {
        let (mut app, id) = grouped();
        app.set_group_color(id, model::Rgba::BLUE);
        assert_eq!(app.session.undo_label(), Some("Change Group Color"));
        let idx = app.container_index(id).unwrap();
        *app.containers[idx].title_field_mut().draft_mut() = "Inputs".to_string();
        app.commit_group_title(id);
        assert_eq!(app.session.graph.group(id).unwrap().title, "Inputs");
        app.undo();
        assert_eq!(app.session.graph.group(id).unwrap().title, "New Group");
        assert_eq!(app.containers[0].title_field().value(), "New Group");
        assert_eq!(app.containers[0].background(), model::Rgba::BLUE);
    }

    #[test]
    fn loading_prunes_dangling_members_without_dirtying() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let mut group = GroupRecord::new(7, "G", model::Rgba::RED, Rect::new(0.0, 0.0, 200.0, 200.0));
        group.member_ids = vec!["a".into(), "ghost".into()];
        let graph = model::Graph {
            nodes: vec![NodeRecord {
                id: "a".into(),
                title: "a".to_string(),
                rect: Rect::new(10.0, 40.0, 40.0, 20.0),
            }],
            groups: vec![group],
        };
        write_graph(&path, &graph).unwrap();

        let mut app = app_with_nodes(&[]);
        app.file_path = path.display().to_string();
        app.load_from_path();
        assert_eq!(app.containers.len(), 1);
        assert_eq!(app.containers[0].children(), &[NodeId::from("a")]);
        assert_eq!(
            app.session.graph.group(7).unwrap().member_ids,
            vec![NodeId::from("a")]
        );
        assert!(!app.session.dirty);
        assert!(!app.session.has_undo());
    }

    #[test]
    fn loading_duplicate_group_ids_binds_each_record_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let mut first = GroupRecord::new(1, "First", model::Rgba::RED, Rect::new(0.0, 0.0, 100.0, 100.0));
        first.member_ids = vec!["a".into()];
        let mut second = GroupRecord::new(1, "Second", model::Rgba::BLUE, Rect::new(300.0, 0.0, 100.0, 100.0));
        second.member_ids = vec!["b".into()];
        let graph = model::Graph {
            nodes: vec![
                NodeRecord {
                    id: "a".into(),
                    title: "a".to_string(),
                    rect: Rect::new(10.0, 40.0, 40.0, 20.0),
                },
                NodeRecord {
                    id: "b".into(),
                    title: "b".to_string(),
                    rect: Rect::new(310.0, 40.0, 40.0, 20.0),
                },
            ],
            groups: vec![first, second],
        };
        write_graph(&path, &graph).unwrap();

        let mut app = app_with_nodes(&[]);
        app.file_path = path.display().to_string();
        app.load_from_path();

        let titles: Vec<&str> = app
            .containers
            .iter()
            .map(|c| c.title_field().value())
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_ne!(app.containers[0].group(), app.containers[1].group());
        assert_eq!(app.containers[1].children(), &[NodeId::from("b")]);

        app.set_group_color(app.containers[1].group(), model::Rgba::RED);
        assert_eq!(app.session.graph.groups[0].title, "First");
        assert_eq!(app.session.graph.groups[1].color, model::Rgba::RED);
        assert_eq!(app.session.graph.groups[0].member_ids, vec![NodeId::from("a")]);
    }

    #[test]
    fn load_failure_reports_in_status() {
        let mut app = app_with_nodes(&[]);
        app.file_path = "/definitely/not/here.json".to_string();
        app.load_from_path();
        assert!(app.status.as_deref().unwrap().starts_with("Load failed"));
    }
}
