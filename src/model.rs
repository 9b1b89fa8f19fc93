use eframe::egui;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_rect(r: egui::Rect) -> Self {
        Self::new(r.min.x, r.min.y, r.width(), r.height())
    }

    pub fn to_rect(self) -> egui::Rect {
        egui::Rect::from_min_size(
            egui::pos2(self.x, self.y),
            egui::vec2(self.width, self.height),
        )
    }

    pub fn center(self) -> Point {
        Point {
            x: self.x + self.width * 0.5,
            y: self.y + self.height * 0.5,
        }
    }

    pub fn contains(self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Smallest rect covering every input, grown by `padding` on each side.
    pub fn bounding(rects: impl IntoIterator<Item = Rect>, padding: f32) -> Option<Self> {
        let bounds = rects
            .into_iter()
            .map(Rect::to_rect)
            .reduce(|a, b| a.union(b))?;
        Some(Self::from_rect(bounds.expand(padding)))
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const RED: Rgba = Rgba::rgb(200, 40, 40);
    pub const BLUE: Rgba = Rgba::rgb(40, 90, 200);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }

    pub fn from_color32(c: egui::Color32) -> Self {
        let [r, g, b, a] = c.to_srgba_unmultiplied();
        Self { r, g, b, a }
    }
}

/// Identifier of a node in the graph's node table. Groups hold these, never
/// the nodes themselves.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type GroupId = u64;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    pub rect: Rect,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GroupRecord {
    pub id: GroupId,
    #[serde(default)]
    pub title: String,
    pub color: Rgba,
    pub position: Rect,
    #[serde(default)]
    pub member_ids: Vec<NodeId>,
}

impl GroupRecord {
    pub fn new(id: GroupId, title: impl Into<String>, color: Rgba, position: Rect) -> Self {
        Self {
            id,
            title: title.into(),
            color,
            position,
            member_ids: Vec::new(),
        }
    }

    pub fn contains_member(&self, id: &NodeId) -> bool {
        self.member_ids.contains(id)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

impl Graph {
    pub fn node(&self, id: &NodeId) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut NodeRecord> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&GroupRecord> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut GroupRecord> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// One past the largest group id, or the lowest free id once that
    /// would overflow.
    pub fn next_group_id(&self) -> GroupId {
        let max = self.groups.iter().map(|g| g.id).max().unwrap_or(0);
        max.checked_add(1)
            .or_else(|| (1..=GroupId::MAX).find(|id| self.group(*id).is_none()))
            .unwrap_or(0)
    }

    pub fn next_node_id(&self) -> NodeId {
        let numbered = || {
            self.nodes
                .iter()
                .filter_map(|n| n.id.as_str().strip_prefix("node-"))
                .filter_map(|n| n.parse::<u64>().ok())
        };
        let next = numbered()
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .or_else(|| (1..=u64::MAX).find(|n| numbered().all(|used| used != *n)))
            .unwrap_or(0);
        NodeId(format!("node-{next}"))
    }

    /// Gives every group after the first one sharing an id a fresh id.
    /// Returns `(old, new)` for each reassignment.
    pub fn assign_unique_group_ids(&mut self) -> Vec<(GroupId, GroupId)> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for (idx, group) in self.groups.iter().enumerate() {
            if !seen.insert(group.id) {
                duplicates.push(idx);
            }
        }
        let mut reassigned = Vec::new();
        for idx in duplicates {
            let fresh = self.next_group_id();
            let group = &mut self.groups[idx];
            reassigned.push((group.id, fresh));
            group.id = fresh;
        }
        reassigned
    }
}
