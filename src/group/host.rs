use crate::model::{Graph, GroupId, GroupRecord, NodeId, NodeRecord};

use super::guard::{GuardFlags, GuardState};

/// Id-to-node lookup against the graph's node table.
pub trait NodeLookup {
    fn resolve_node(&self, id: &NodeId) -> Option<&NodeRecord>;
}

impl NodeLookup for Graph {
    fn resolve_node(&self, id: &NodeId) -> Option<&NodeRecord> {
        self.node(id)
    }
}

/// Undo-stack and persistence hooks of the owning editor.
pub trait UndoRecorder {
    /// Records the graph's current state so the mutation that follows can be
    /// undone as a step named `label`.
    fn begin_undoable_change(&mut self, label: &str);
    fn set_undo_group_name(&mut self, label: &str);
    fn mark_graph_dirty(&mut self);
}

impl UndoRecorder for () {
    fn begin_undoable_change(&mut self, _label: &str) {}
    fn set_undo_group_name(&mut self, _label: &str) {}
    fn mark_graph_dirty(&mut self) {}
}

/// The graph view a group container belongs to.
pub trait GraphContext: NodeLookup + UndoRecorder {
    fn guard(&self) -> GuardState;
    fn group_record(&self, id: GroupId) -> Option<&GroupRecord>;
    fn group_record_mut(&mut self, id: GroupId) -> Option<&mut GroupRecord>;
}

/// A [`GraphContext`] over an owned graph, without any widget toolkit.
#[derive(Debug, Default)]
pub struct HeadlessView<U = ()> {
    pub graph: Graph,
    pub flags: GuardFlags,
    pub undo: U,
}

impl<U: UndoRecorder> HeadlessView<U> {
    pub fn new(graph: Graph, undo: U) -> Self {
        Self {
            graph,
            flags: GuardFlags::new(),
            undo,
        }
    }
}

impl<U> NodeLookup for HeadlessView<U> {
    fn resolve_node(&self, id: &NodeId) -> Option<&NodeRecord> {
        self.graph.node(id)
    }
}

impl<U: UndoRecorder> UndoRecorder for HeadlessView<U> {
    fn begin_undoable_change(&mut self, label: &str) {
        self.undo.begin_undoable_change(label);
    }

    fn set_undo_group_name(&mut self, label: &str) {
        self.undo.set_undo_group_name(label);
    }

    fn mark_graph_dirty(&mut self) {
        self.undo.mark_graph_dirty();
    }
}

impl<U: UndoRecorder> GraphContext for HeadlessView<U> {
    fn guard(&self) -> GuardState {
        self.flags.state()
    }

    fn group_record(&self, id: GroupId) -> Option<&GroupRecord> {
        self.graph.group(id)
    }

    fn group_record_mut(&mut self, id: GroupId) -> Option<&mut GroupRecord> {
        self.graph.group_mut(id)
    }
}
