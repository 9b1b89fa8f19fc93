use std::cell::Cell;
use std::rc::Rc;

/// Snapshot of the session's re-entrancy flags, handed to every synchronizer
/// call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GuardState {
    /// The view is being rebuilt from the persisted graph.
    pub is_reloading: bool,
    /// A scripted group/ungroup command owns the outer undo transaction.
    pub is_grouping: bool,
}

impl GuardState {
    pub const IDLE: GuardState = GuardState {
        is_reloading: false,
        is_grouping: false,
    };

    pub fn is_programmatic(self) -> bool {
        self.is_reloading || self.is_grouping
    }

    /// Side effects owed for a mutation labeled `label`. Programmatic
    /// mutations owe none.
    pub fn user_edit(self, label: &'static str) -> Effects {
        if self.is_programmatic() {
            Effects::NONE
        } else {
            Effects {
                transaction: Some(label),
                mark_dirty: true,
            }
        }
    }
}

/// What the host must do around a record mutation: open the named undo
/// transaction before writing, mark the graph dirty after.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    pub transaction: Option<&'static str>,
    pub mark_dirty: bool,
}

impl Effects {
    pub const NONE: Effects = Effects {
        transaction: None,
        mark_dirty: false,
    };

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flag {
    Reloading,
    Grouping,
}

/// Session-wide flag cell. Cloning shares the same flags.
#[derive(Clone, Debug, Default)]
pub struct GuardFlags(Rc<Cell<GuardState>>);

impl GuardFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GuardState {
        self.0.get()
    }

    /// Sets `is_reloading` until the returned scope is dropped.
    #[must_use = "the flag is cleared as soon as the scope is dropped"]
    pub fn reloading(&self) -> FlagScope {
        self.enter(Flag::Reloading)
    }

    /// Sets `is_grouping` until the returned scope is dropped.
    #[must_use = "the flag is cleared as soon as the scope is dropped"]
    pub fn grouping(&self) -> FlagScope {
        self.enter(Flag::Grouping)
    }

    fn enter(&self, flag: Flag) -> FlagScope {
        let previous = self.swap(flag, true);
        tracing::trace!(?flag, "guard scope entered");
        FlagScope {
            flags: self.clone(),
            flag,
            previous,
        }
    }

    fn swap(&self, flag: Flag, value: bool) -> bool {
        let mut state = self.0.get();
        let slot = match flag {
            Flag::Reloading => &mut state.is_reloading,
            Flag::Grouping => &mut state.is_grouping,
        };
        let previous = std::mem::replace(slot, value);
        self.0.set(state);
        previous
    }
}

/// Restores its flag on drop, including on early return and unwinding.
#[derive(Debug)]
pub struct FlagScope {
    flags: GuardFlags,
    flag: Flag,
    previous: bool,
}

impl Drop for FlagScope {
    fn drop(&mut self) {
        self.flags.swap(self.flag, self.previous);
        tracing::trace!(flag = ?self.flag, "guard scope left");
    }
}
