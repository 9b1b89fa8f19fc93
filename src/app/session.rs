use tracing::debug;

use crate::group::{GraphContext, GuardFlags, GuardState, NodeLookup, UndoRecorder};
use crate::model::{Graph, GroupId, GroupRecord, NodeId, NodeRecord};

const LIMIT: usize = 200;

#[derive(Clone, Debug)]
pub(super) struct Snapshot {
    pub label: String,
    pub graph: Graph,
}

/// The graph asset plus the editor state that outlives any one group view:
/// guard flags, snapshot undo stack and the dirty bit.
pub(super) struct EditorSession {
    pub graph: Graph,
    pub flags: GuardFlags,
    pub dirty: bool,
    history: Vec<Snapshot>,
    future: Vec<Snapshot>,
}

impl EditorSession {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            flags: GuardFlags::new(),
            dirty: false,
            history: Vec::new(),
            future: Vec::new(),
        }
    }

    pub fn push_undo(&mut self, label: &str) {
        self.history.push(Snapshot {
            label: label.to_string(),
            graph: self.graph.clone(),
        });
        if self.history.len() > LIMIT {
            let overflow = self.history.len() - LIMIT;
            self.history.drain(0..overflow);
        }
        self.future.clear();
    }

    pub fn has_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn has_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.history.last().map(|s| s.label.as_str())
    }

    /// Restores the newest snapshot and returns its label.
    pub fn undo(&mut self) -> Option<String> {
        let prev = self.history.pop()?;
        self.future.push(Snapshot {
            label: prev.label.clone(),
            graph: std::mem::replace(&mut self.graph, prev.graph),
        });
        self.dirty = true;
        Some(prev.label)
    }

    pub fn redo(&mut self) -> Option<String> {
        let next = self.future.pop()?;
        self.history.push(Snapshot {
            label: next.label.clone(),
            graph: std::mem::replace(&mut self.graph, next.graph),
        });
        self.dirty = true;
        Some(next.label)
    }

    pub fn replace_graph(&mut self, graph: Graph) {
        self.graph = graph;
        self.history.clear();
        self.future.clear();
        self.dirty = false;
    }
}

impl NodeLookup for EditorSession {
    fn resolve_node(&self, id: &NodeId) -> Option<&NodeRecord> {
        self.graph.node(id)
    }
}

impl UndoRecorder for EditorSession {
    fn begin_undoable_change(&mut self, label: &str) {
        debug!(label, "undoable change");
        self.push_undo(label);
    }

    fn set_undo_group_name(&mut self, label: &str) {
        if let Some(top) = self.history.last_mut() {
            top.label = label.to_string();
        }
    }

    fn mark_graph_dirty(&mut self) {
        self.dirty = true;
    }
}

impl GraphContext for EditorSession {
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
