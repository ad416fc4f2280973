//! Group task rollup
//!
//! Summary tasks take their date range from their children. The pass is
//! post-order: a parent is only computed after every child below it, and it
//! only looks at its direct children.

use super::fields::format_span;
use super::task::TaskRecord;

/// Recalculates every tree in a forest
pub fn recalculate_forest(forest: &mut [TaskRecord]) {
    for root in forest.iter_mut() {
        recalculate(root);
    }
}

/// Recalculates a node and its subtree
///
/// Leaves are left untouched. A parent whose children carry no dates keeps
/// the dates it already had.
pub fn recalculate(node: &mut TaskRecord) {
    if node.children.is_empty() {
        return;
    }

    for child in node.children.iter_mut() {
        recalculate(child);
    }

    node.is_group = true;

    let start = node.children.iter().filter_map(|c| c.start_date).min();
    let finish = node.children.iter().filter_map(|c| c.finish_date).max();

    if let Some(start) = start {
        node.start_date = Some(start);
    }
    if let Some(finish) = finish {
        node.finish_date = Some(finish);
    }

    if let (Some(start), Some(finish)) = (node.start_date, node.finish_date) {
        if finish < start {
            node.finish_date = Some(start);
        }
        node.duration_display = format_span(start, node.finish_date.unwrap_or(start));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IdGenerator;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(n: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, n)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn task(ids: &mut IdGenerator, name: &str) -> TaskRecord {
        TaskRecord::new(ids.next_id(name), name)
    }

    #[test]
    fn parent_spans_its_children() {
        let mut ids = IdGenerator::new();
        let mut parent = task(&mut ids, "Parent");
        parent.children.push(task(&mut ids, "A").scheduled(day(1), day(3)));
        parent.children.push(task(&mut ids, "B").scheduled(day(2), day(5)));

        recalculate(&mut parent);

        assert_eq!(parent.start_date, Some(day(1)));
        assert_eq!(parent.finish_date, Some(day(5)));
        assert_eq!(parent.duration_display, "4 days");
        assert!(parent.is_group);
    }

    #[test]
    fn nested_groups_roll_up_from_the_bottom() {
        let mut ids = IdGenerator::new();
        let mut inner = task(&mut ids, "Inner");
        inner.children.push(task(&mut ids, "Deep").scheduled(day(10), day(20)));

        let mut outer = task(&mut ids, "Outer").scheduled(day(1), day(2));
        outer.children.push(inner);
        outer.children.push(task(&mut ids, "Sibling").scheduled(day(4), day(6)));

        let mut forest = vec![outer];
        recalculate_forest(&mut forest);

        let outer = &forest[0];
        assert_eq!(outer.children[0].start_date, Some(day(10)));
        assert_eq!(outer.start_date, Some(day(4)));
        assert_eq!(outer.finish_date, Some(day(20)));
    }

    #[test]
    fn children_without_dates_keep_parent_dates() {
        let mut ids = IdGenerator::new();
        let mut parent = task(&mut ids, "Parent").scheduled(day(7), day(9));
        parent.duration_display = "3 days".to_string();
        parent.children.push(task(&mut ids, "Undated"));

        recalculate(&mut parent);

        assert_eq!(parent.start_date, Some(day(7)));
        assert_eq!(parent.finish_date, Some(day(9)));
        assert!(parent.is_group);
    }

    #[test]
    fn undated_children_are_ignored_in_the_range() {
        let mut ids = IdGenerator::new();
        let mut parent = task(&mut ids, "Parent");
        parent.children.push(task(&mut ids, "Undated"));
        parent.children.push(task(&mut ids, "Dated").scheduled(day(3), day(4)));

        recalculate(&mut parent);

        assert_eq!(parent.span(), Some((day(3), day(4))));
    }

    #[test]
    fn leaves_are_untouched() {
        let mut ids = IdGenerator::new();
        let mut leaf = task(&mut ids, "Leaf").scheduled(day(1), day(2));
        leaf.duration_display = "1 days".to_string();
        let before = leaf.clone();

        recalculate(&mut leaf);

        assert_eq!(leaf, before);
    }
}
