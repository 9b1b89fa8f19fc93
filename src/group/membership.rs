//! Reconciles a group's visual children against its record's member ids.
//!
//! Everything here is a pure function of the current member ids, the event
//! payload and the guard state. The container applies the returned
//! [`Effects`] around the write.

use tracing::{debug, warn};

use crate::model::NodeId;

use super::guard::{Effects, GuardState};
use super::host::NodeLookup;

pub const ADD_TO_GROUP: &str = "Add To Group";
pub const REMOVE_FROM_GROUP: &str = "Remove From Group";

/// A child element delivered by the host's add/remove events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphElement {
    Node(NodeId),
    /// Anything that is not a node (notes, badges, nested decorations).
    Decoration,
}

impl GraphElement {
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            GraphElement::Node(id) => Some(id),
            GraphElement::Decoration => None,
        }
    }
}

impl From<NodeId> for GraphElement {
    fn from(id: NodeId) -> Self {
        GraphElement::Node(id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MembershipUpdate {
    pub member_ids: Vec<NodeId>,
    /// Ids appended or removed by this event, in event order.
    pub changed: Vec<NodeId>,
    pub effects: Effects,
}

impl MembershipUpdate {
    fn unchanged(member_ids: &[NodeId]) -> Self {
        Self {
            member_ids: member_ids.to_vec(),
            changed: Vec::new(),
            effects: Effects::NONE,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.changed.is_empty()
    }
}

pub fn elements_added(
    member_ids: &[NodeId],
    elements: &[GraphElement],
    guard: GuardState,
) -> MembershipUpdate {
    let mut ids = member_ids.to_vec();
    let mut added = Vec::new();
    for id in elements.iter().filter_map(GraphElement::node_id) {
        if ids.contains(id) {
            continue;
        }
        ids.push(id.clone());
        added.push(id.clone());
    }
    if added.is_empty() {
        return MembershipUpdate::unchanged(member_ids);
    }
    debug!(added = ?added, ?guard, "nodes added to group");
    MembershipUpdate {
        member_ids: ids,
        changed: added,
        effects: guard.user_edit(ADD_TO_GROUP),
    }
}

/// Removals only count while the group is attached to the live view and the
/// view is not reloading; otherwise the container is being torn down or
/// rebuilt and the record must stay as it is.
pub fn elements_removed(
    member_ids: &[NodeId],
    elements: &[GraphElement],
    guard: GuardState,
    attached: bool,
) -> MembershipUpdate {
    if !attached || guard.is_reloading {
        return MembershipUpdate::unchanged(member_ids);
    }
    let mut ids = member_ids.to_vec();
    let mut removed = Vec::new();
    for id in elements.iter().filter_map(GraphElement::node_id) {
        if let Some(pos) = ids.iter().position(|m| m == id) {
            ids.remove(pos);
            removed.push(id.clone());
        }
    }
    if removed.is_empty() {
        return MembershipUpdate::unchanged(member_ids);
    }
    debug!(removed = ?removed, ?guard, "nodes removed from group");
    MembershipUpdate {
        member_ids: ids,
        changed: removed,
        effects: guard.user_edit(REMOVE_FROM_GROUP),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Population {
    /// Surviving member ids, each of which resolves to a node.
    pub member_ids: Vec<NodeId>,
    pub pruned: Vec<NodeId>,
}

/// Resolves every member id, dropping the ones that point nowhere and
/// repeated ones.
pub fn populate<L: NodeLookup + ?Sized>(member_ids: &[NodeId], nodes: &L) -> Population {
    let mut kept: Vec<NodeId> = Vec::with_capacity(member_ids.len());
    let mut pruned = Vec::new();
    for id in member_ids {
        if kept.contains(id) {
            warn!(node = %id, "duplicate group member id, dropping it");
            pruned.push(id.clone());
            continue;
        }
        if nodes.resolve_node(id).is_none() {
            warn!(node = %id, "node not found, removing it from group");
            pruned.push(id.clone());
            continue;
        }
        kept.push(id.clone());
    }
    Population {
        member_ids: kept,
        pruned,
    }
}
