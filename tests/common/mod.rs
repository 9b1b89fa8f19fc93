#![allow(dead_code)]

use nodegroup::group::{GroupContainer, HeadlessView, UndoRecorder};
use nodegroup::model::{Graph, GroupId, GroupRecord, NodeId, NodeRecord, Rect, Rgba};

/// Undo hooks that only count what the group code asked for.
#[derive(Debug, Default)]
pub struct RecordingUndo {
    pub transactions: Vec<String>,
    pub group_names: Vec<String>,
    pub dirty_marks: usize,
}

impl UndoRecorder for RecordingUndo {
    fn begin_undoable_change(&mut self, label: &str) {
        self.transactions.push(label.to_string());
    }

    fn set_undo_group_name(&mut self, label: &str) {
        self.group_names.push(label.to_string());
    }

    fn mark_graph_dirty(&mut self) {
        self.dirty_marks += 1;
    }
}

pub type View = HeadlessView<RecordingUndo>;

pub const GROUP: GroupId = 1;

pub fn node(id: &str, x: f32, y: f32) -> NodeRecord {
    NodeRecord {
        id: id.into(),
        title: id.to_string(),
        rect: Rect::new(x, y, 40.0, 20.0),
    }
}

pub fn ids(ids: &[&str]) -> Vec<NodeId> {
    ids.iter().map(|id| NodeId::from(*id)).collect()
}

/// A graph with the given nodes and one group listing `members`.
pub fn view(nodes: &[&str], members: &[&str]) -> View {
    let mut group = GroupRecord::new(GROUP, "Group A", Rgba::RED, Rect::new(0.0, 0.0, 100.0, 100.0));
    group.member_ids = ids(members);
    let graph = Graph {
        nodes: nodes.iter().map(|id| node(id, 10.0, 10.0)).collect(),
        groups: vec![group],
    };
    HeadlessView::new(graph, RecordingUndo::default())
}

/// Initializes and attaches the group's container the way an editor does
/// when it opens a graph.
pub fn open(view: &mut View) -> GroupContainer {
    let _reload = view.flags.reloading();
    let mut container = GroupContainer::initialize(GROUP, view).expect("group record exists");
    container.attach();
    container
}

pub fn members(view: &View) -> Vec<NodeId> {
    view.graph.group(GROUP).expect("group record exists").member_ids.clone()
}
