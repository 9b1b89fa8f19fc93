use tracing::{debug, warn};

use crate::model::{GroupId, GroupRecord, NodeId, Rect, Rgba};

use super::guard::Effects;
use super::host::GraphContext;
use super::membership::{self, GraphElement, MembershipUpdate};
use super::property::{self, DelayedTextField, GroupViewState};

/// Live view of one group record for one editor session.
///
/// The record itself stays in the graph; the container only holds its id and
/// reaches it through the owning [`GraphContext`] on every call.
#[derive(Clone, Debug)]
pub struct GroupContainer {
    group: GroupId,
    title: DelayedTextField,
    color: Rgba,
    background: Rgba,
    rect: Rect,
    children: Vec<NodeId>,
    attached: bool,
}

impl GroupContainer {
    /// Binds a container to `group` and pulls title, color, rect and
    /// children from the record. The container starts detached.
    pub fn initialize<C: GraphContext + ?Sized>(group: GroupId, owner: &mut C) -> Option<Self> {
        let Some(view) = owner.group_record(group).map(property::render) else {
            warn!(group, "cannot bind a container to a missing group record");
            return None;
        };
        let mut container = Self {
            group,
            title: DelayedTextField::new(view.title),
            color: view.color,
            background: view.background,
            rect: view.rect,
            children: Vec::new(),
            attached: false,
        };
        container.set_position(view.rect, owner);
        container.update_color(view.color);
        container.populate_from_record(owner);
        Some(container)
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn record<'a, C: GraphContext + ?Sized>(&self, owner: &'a C) -> Option<&'a GroupRecord> {
        owner.group_record(self.group)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn contains_child(&self, id: &NodeId) -> bool {
        self.children.contains(id)
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn title_field(&self) -> &DelayedTextField {
        &self.title
    }

    pub fn title_field_mut(&mut self) -> &mut DelayedTextField {
        &mut self.title
    }

    pub fn view_state(&self) -> GroupViewState {
        GroupViewState {
            title: self.title.value().to_string(),
            color: self.color,
            background: self.background,
            rect: self.rect,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Adds every resolvable member as a visual child and prunes the rest
    /// from the record. Returns the pruned ids.
    pub fn populate_from_record<C: GraphContext + ?Sized>(&mut self, owner: &mut C) -> Vec<NodeId> {
        let Some(snapshot) = owner.group_record(self.group).map(|r| r.member_ids.clone()) else {
            return Vec::new();
        };
        let population = membership::populate(&snapshot, &*owner);
        if !population.pruned.is_empty() {
            if let Some(record) = owner.group_record_mut(self.group) {
                record.member_ids.clone_from(&population.member_ids);
            }
        }
        for id in population.member_ids {
            if !self.children.contains(&id) {
                self.children.push(id);
            }
        }
        population.pruned
    }

    /// Rebuilds the whole view from the record. Hosts run this inside a
    /// reload scope.
    pub fn reload<C: GraphContext + ?Sized>(&mut self, owner: &mut C) -> Vec<NodeId> {
        let Some(view) = owner.group_record(self.group).map(property::render) else {
            return Vec::new();
        };
        self.title.set_value_without_notify(view.title);
        self.update_color(view.color);
        self.set_position(view.rect, owner);
        self.children.clear();
        self.populate_from_record(owner)
    }

    pub fn on_elements_added<C: GraphContext + ?Sized>(
        &mut self,
        elements: &[GraphElement],
        owner: &mut C,
    ) {
        for id in elements.iter().filter_map(GraphElement::node_id) {
            if !self.children.contains(id) {
                self.children.push(id.clone());
            }
        }
        let Some(record) = owner.group_record(self.group) else {
            return;
        };
        let update = membership::elements_added(&record.member_ids, elements, owner.guard());
        self.apply_membership(update, owner);
    }

    pub fn on_elements_removed<C: GraphContext + ?Sized>(
        &mut self,
        elements: &[GraphElement],
        owner: &mut C,
    ) {
        self.children
            .retain(|child| !elements.iter().any(|e| e.node_id() == Some(child)));
        let Some(record) = owner.group_record(self.group) else {
            return;
        };
        let update = membership::elements_removed(
            &record.member_ids,
            elements,
            owner.guard(),
            self.attached,
        );
        self.apply_membership(update, owner);
    }

    /// User picked a new color.
    pub fn on_color_changed<C: GraphContext + ?Sized>(&mut self, color: Rgba, owner: &mut C) {
        let effects = property::color_edit(owner.guard());
        self.write_record(owner, effects, |record| record.color = color);
        self.update_color(color);
    }

    /// Syncs the color field and background, leaving the record alone.
    pub fn update_color(&mut self, color: Rgba) {
        self.color = color;
        self.background = color;
    }

    /// Commits the title field's draft. Returns whether the title changed.
    pub fn commit_title<C: GraphContext + ?Sized>(&mut self, owner: &mut C) -> bool {
        let Some(title) = self.title.commit() else {
            return false;
        };
        let effects = property::title_edit(owner.guard());
        debug!(group = self.group, %title, "group title committed");
        self.write_record(owner, effects, |record| record.title = title);
        true
    }

    pub fn set_position<C: GraphContext + ?Sized>(&mut self, rect: Rect, owner: &mut C) {
        self.rect = rect;
        if !property::writes_position(owner.guard()) {
            return;
        }
        if let Some(record) = owner.group_record_mut(self.group) {
            record.position = rect;
        }
    }

    fn apply_membership<C: GraphContext + ?Sized>(&self, update: MembershipUpdate, owner: &mut C) {
        if update.is_unchanged() {
            return;
        }
        let MembershipUpdate {
            member_ids,
            effects,
            ..
        } = update;
        self.write_record(owner, effects, |record| record.member_ids = member_ids);
    }

    fn write_record<C: GraphContext + ?Sized>(
        &self,
        owner: &mut C,
        effects: Effects,
        write: impl FnOnce(&mut GroupRecord),
    ) {
        if owner.group_record(self.group).is_none() {
            warn!(group = self.group, "group record vanished, edit dropped");
            return;
        }
        if let Some(label) = effects.transaction {
            owner.begin_undoable_change(label);
            owner.set_undo_group_name(label);
        }
        if let Some(record) = owner.group_record_mut(self.group) {
            write(record);
        }
        if effects.mark_dirty {
            owner.mark_graph_dirty();
        }
    }
}
