//! Property tests for building and flattening outlines

use outline_cli::domain::{hierarchy, IdGenerator, TaskRecord};
use proptest::prelude::*;

fn records(levels: &[u32]) -> Vec<TaskRecord> {
    let mut ids = IdGenerator::new();
    levels
        .iter()
        .enumerate()
        .map(|(i, &level)| {
            let name = format!("task {}", i);
            TaskRecord::new(ids.next_id(&name), name).at(level, i as u64)
        })
        .collect()
}

/// Level sequences where each step goes at most one level deeper
fn well_formed_levels() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..4, 0..40).prop_map(|steps| {
        let mut levels = Vec::with_capacity(steps.len());
        let mut previous: Option<u32> = None;
        for step in steps {
            let level = match previous {
                None => 0,
                Some(p) => step.min(p + 1),
            };
            levels.push(level);
            previous = Some(level);
        }
        levels
    })
}

fn names(rows: &[TaskRecord]) -> Vec<String> {
    rows.iter().map(|r| r.name.clone()).collect()
}

fn levels(rows: &[TaskRecord]) -> Vec<u32> {
    rows.iter().map(|r| r.indent_level).collect()
}

proptest! {
    #[test]
    fn build_then_flatten_round_trips(levels_in in well_formed_levels()) {
        let input = records(&levels_in);
        let forest = hierarchy::build(input.clone());

        let rows = hierarchy::flatten(&forest, 0);
        prop_assert_eq!(names(&rows), names(&input));
        prop_assert_eq!(levels(&rows), levels_in.clone());

        let flat = hierarchy::to_flat_list(forest);
        prop_assert_eq!(levels(&flat), levels_in);
        let order: Vec<u64> = flat.iter().map(|r| r.order_index).collect();
        let expected: Vec<u64> = (0..input.len() as u64).collect();
        prop_assert_eq!(order, expected);
    }

    #[test]
    fn arbitrary_levels_keep_every_task_in_order(levels_in in prop::collection::vec(0u32..6, 0..40)) {
        let input = records(&levels_in);
        let forest = hierarchy::build(input.clone());

        prop_assert_eq!(hierarchy::node_count(&forest), input.len());
        prop_assert_eq!(names(&hierarchy::flatten(&forest, 0)), names(&input));
    }

    #[test]
    fn group_flag_matches_children(levels_in in well_formed_levels()) {
        let forest = hierarchy::build(records(&levels_in));

        let mut consistent = true;
        hierarchy::visit(&forest, &mut |node: &TaskRecord| {
            consistent &= node.is_group == !node.children.is_empty();
        });
        prop_assert!(consistent);
    }

    #[test]
    fn collapse_then_expand_is_invertible(
        levels_in in well_formed_levels(),
        mask in prop::collection::vec(any::<bool>(), 40),
    ) {
        let mut forest = hierarchy::build(records(&levels_in));
        let before = hierarchy::flatten(&forest, 0);

        let mut index = 0;
        hierarchy::visit_mut(&mut forest, &mut |node| {
            if mask[index % mask.len()] {
                node.is_expanded = false;
            }
            index += 1;
        });

        let collapsed = hierarchy::flatten(&forest, 0);
        prop_assert!(collapsed.len() <= before.len());

        hierarchy::visit_mut(&mut forest, &mut |node| node.is_expanded = true);
        let after = hierarchy::flatten(&forest, 0);

        prop_assert_eq!(after, before);
    }

    #[test]
    fn collapsing_hides_exactly_the_descendants(levels_in in well_formed_levels(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!levels_in.is_empty());
        let mut forest = hierarchy::build(records(&levels_in));

        let mut nodes = Vec::new();
        hierarchy::visit(&forest, &mut |node: &TaskRecord| nodes.push((node.id.clone(), hierarchy::descendant_count(node))));
        let (target, hidden) = nodes[pick.index(nodes.len())].clone();

        hierarchy::visit_mut(&mut forest, &mut |node| {
            if node.id == target {
                node.is_expanded = false;
            }
        });

        prop_assert_eq!(hierarchy::flatten(&forest, 0).len(), levels_in.len() - hidden);
    }
}
