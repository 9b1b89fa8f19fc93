mod common;

use common::*;
use nodegroup::group::membership::{ADD_TO_GROUP, REMOVE_FROM_GROUP};
use nodegroup::group::property::{CHANGE_GROUP_COLOR, CHANGE_GROUP_TITLE};
use nodegroup::group::{GraphElement, GroupContainer};
use nodegroup::model::{Rect, Rgba};
use rstest::rstest;
use tracing_test::traced_test;

fn nodes(list: &[&str]) -> Vec<GraphElement> {
    ids(list).into_iter().map(GraphElement::Node).collect()
}

#[test]
fn loading_twice_yields_the_same_view() {
    let mut view = view(&["a", "b"], &["a", "b"]);
    let mut container = open(&mut view);
    let first = (container.children().to_vec(), members(&view));
    {
        let _reload = view.flags.reloading();
        container.reload(&mut view);
    }
    assert_eq!((container.children().to_vec(), members(&view)), first);
    assert!(view.undo.transactions.is_empty());
    assert_eq!(view.undo.dirty_marks, 0);
}

#[traced_test]
#[test]
fn dangling_members_are_pruned_in_order() {
    let mut view = view(&["a", "c"], &["a", "b", "c"]);
    let container = open(&mut view);
    assert_eq!(members(&view), ids(&["a", "c"]));
    assert_eq!(container.children(), ids(&["a", "c"]).as_slice());
    assert!(view.undo.transactions.is_empty());
    assert!(logs_contain("node not found"));
}

#[test]
fn adding_then_re_adding_is_one_undo_step() {
    let mut view = view(&["a", "b"], &["a"]);
    let mut container = open(&mut view);
    container.on_elements_added(&nodes(&["b"]), &mut view);
    assert_eq!(members(&view), ids(&["a", "b"]));
    assert_eq!(view.undo.transactions, vec![ADD_TO_GROUP]);
    assert_eq!(view.undo.dirty_marks, 1);

    container.on_elements_added(&nodes(&["b"]), &mut view);
    assert_eq!(members(&view), ids(&["a", "b"]));
    assert_eq!(view.undo.transactions.len(), 1);
    assert_eq!(view.undo.dirty_marks, 1);
}

#[test]
fn removal_while_grouping_leaves_history_alone() {
    let mut view = view(&["a", "b"], &["a", "b"]);
    let mut container = open(&mut view);
    {
        let _grouping = view.flags.grouping();
        container.on_elements_removed(&nodes(&["a"]), &mut view);
    }
    assert_eq!(members(&view), ids(&["b"]));
    assert!(view.undo.transactions.is_empty());
    assert_eq!(view.undo.dirty_marks, 0);

    container.on_elements_removed(&nodes(&["b"]), &mut view);
    assert!(members(&view).is_empty());
    assert_eq!(view.undo.transactions, vec![REMOVE_FROM_GROUP]);
    assert_eq!(view.undo.group_names, vec![REMOVE_FROM_GROUP]);
}

#[test]
fn detached_container_ignores_removals() {
    let mut view = view(&["a", "b"], &["a", "b"]);
    let mut container = open(&mut view);
    container.detach();
    container.on_elements_removed(&nodes(&["a", "b"]), &mut view);
    assert_eq!(members(&view), ids(&["a", "b"]));
    assert!(view.undo.transactions.is_empty());
}

#[test]
fn position_is_not_written_back_while_reloading() {
    let mut view = view(&["a"], &["a"]);
    let mut container = open(&mut view);
    let moved = Rect::new(50.0, 50.0, 100.0, 100.0);
    {
        let _reload = view.flags.reloading();
        container.set_position(moved, &mut view);
    }
    assert_eq!(container.rect(), moved);
    assert_eq!(view.graph.group(GROUP).unwrap().position, Rect::new(0.0, 0.0, 100.0, 100.0));

    container.set_position(moved, &mut view);
    assert_eq!(view.graph.group(GROUP).unwrap().position, moved);
    assert!(view.undo.transactions.is_empty());
    assert_eq!(view.undo.dirty_marks, 0);
}

fn guarded<T>(
    view: &mut View,
    is_reloading: bool,
    is_grouping: bool,
    edit: impl FnOnce(&mut View) -> T,
) -> T {
    let _reload = is_reloading.then(|| view.flags.reloading());
    let _grouping = is_grouping.then(|| view.flags.grouping());
    edit(view)
}

#[rstest]
#[case(false, false, Some(CHANGE_GROUP_TITLE), 1)]
#[case(true, false, None, 0)]
#[case(false, true, None, 0)]
#[case(true, true, None, 0)]
fn title_commit_under_each_guard(
    #[case] is_reloading: bool,
    #[case] is_grouping: bool,
    #[case] transaction: Option<&str>,
    #[case] dirty_marks: usize,
) {
    let mut view = view(&["a"], &["a"]);
    let mut container = open(&mut view);
    *container.title_field_mut().draft_mut() = "Inputs".to_string();

    let committed = guarded(&mut view, is_reloading, is_grouping, |view| {
        container.commit_title(view)
    });

    assert!(committed);
    assert_eq!(container.record(&view).unwrap().title, "Inputs");
    assert_eq!(container.title_field().value(), "Inputs");
    assert_eq!(view.undo.transactions, transaction.into_iter().collect::<Vec<_>>());
    assert_eq!(view.undo.dirty_marks, dirty_marks);
}

#[rstest]
#[case(false, false, Some(CHANGE_GROUP_COLOR), 1)]
#[case(true, false, None, 0)]
#[case(false, true, None, 0)]
#[case(true, true, None, 0)]
fn color_change_under_each_guard(
    #[case] is_reloading: bool,
    #[case] is_grouping: bool,
    #[case] transaction: Option<&str>,
    #[case] dirty_marks: usize,
) {
    let mut view = view(&["a"], &["a"]);
    let mut container = open(&mut view);

    guarded(&mut view, is_reloading, is_grouping, |view| {
        container.on_color_changed(Rgba::BLUE, view)
    });

    assert_eq!(container.record(&view).unwrap().color, Rgba::BLUE);
    assert_eq!(container.background(), Rgba::BLUE);
    assert_eq!(view.undo.transactions, transaction.into_iter().collect::<Vec<_>>());
    assert_eq!(view.undo.dirty_marks, dirty_marks);
    assert!(!view.flags.state().is_programmatic());
}

#[test]
fn container_for_missing_record_is_not_created() {
    let mut view = view(&[], &[]);
    assert!(GroupContainer::initialize(GROUP + 1, &mut view).is_none());
}

#[traced_test]
#[test]
fn open_edit_and_recolor_a_group() {
    let mut view = view(&["n1", "n3"], &["n1", "n2"]);
    let mut container = open(&mut view);

    assert_eq!(container.title_field().value(), "Group A");
    assert_eq!(container.color(), Rgba::RED);
    assert_eq!(container.rect(), Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(container.children(), ids(&["n1"]).as_slice());
    assert_eq!(members(&view), ids(&["n1"]));
    logs_assert(|lines: &[&str]| {
        match lines.iter().filter(|l| l.contains("node not found")).count() {
            1 => Ok(()),
            n => Err(format!("expected one missing-node warning, saw {n}")),
        }
    });

    container.on_elements_added(&nodes(&["n3"]), &mut view);
    assert_eq!(members(&view), ids(&["n1", "n3"]));
    assert_eq!(view.undo.transactions, vec![ADD_TO_GROUP]);
    assert_eq!(view.undo.dirty_marks, 1);

    container.on_color_changed(Rgba::BLUE, &mut view);
    assert_eq!(view.graph.group(GROUP).unwrap().color, Rgba::BLUE);
    assert_eq!(container.background(), Rgba::BLUE);
    assert_eq!(view.undo.transactions, vec![ADD_TO_GROUP, CHANGE_GROUP_COLOR]);
    assert_eq!(view.undo.dirty_marks, 2);
}
