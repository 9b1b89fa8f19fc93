//! Visual groups: a titled, colored rectangle holding a subset of the graph's
//! nodes, kept in sync with its persisted [`GroupRecord`](crate::model::GroupRecord).

mod container;
pub mod guard;
mod host;
pub mod membership;
pub mod property;

pub use container::GroupContainer;
pub use guard::{Effects, FlagScope, GuardFlags, GuardState};
pub use host::{GraphContext, HeadlessView, NodeLookup, UndoRecorder};
pub use membership::{GraphElement, MembershipUpdate, Population};
pub use property::{DelayedTextField, GroupViewState};
