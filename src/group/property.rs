use crate::model::{GroupRecord, Rect, Rgba};

use super::guard::{Effects, GuardState};

pub const CHANGE_GROUP_COLOR: &str = "Change Group Color";
pub const CHANGE_GROUP_TITLE: &str = "Change Group Title";

/// Text field that only reports a change on commit (focus lost or enter),
/// never per keystroke.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DelayedTextField {
    value: String,
    draft: String,
}

impl DelayedTextField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            draft: value.clone(),
            value,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Buffer the widget edits in place.
    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    /// Replaces both value and draft without reporting a change.
    pub fn set_value_without_notify(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.draft.clone_from(&self.value);
    }

    /// Returns the new value if the draft differs from the committed one.
    pub fn commit(&mut self) -> Option<String> {
        if self.draft == self.value {
            return None;
        }
        self.value.clone_from(&self.draft);
        Some(self.value.clone())
    }

    pub fn revert(&mut self) {
        self.draft.clone_from(&self.value);
    }
}

/// What the container shows for a record.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupViewState {
    pub title: String,
    pub color: Rgba,
    pub background: Rgba,
    pub rect: Rect,
}

pub fn render(record: &GroupRecord) -> GroupViewState {
    GroupViewState {
        title: record.title.clone(),
        color: record.color,
        background: record.color,
        rect: record.position,
    }
}

pub fn color_edit(guard: GuardState) -> Effects {
    guard.user_edit(CHANGE_GROUP_COLOR)
}

pub fn title_edit(guard: GuardState) -> Effects {
    guard.user_edit(CHANGE_GROUP_TITLE)
}

/// Move/resize is persisted unless the rect is being driven from the record.
/// It never opens a transaction here; the host's move handling owns undo.
pub fn writes_position(guard: GuardState) -> bool {
    !guard.is_reloading
}
