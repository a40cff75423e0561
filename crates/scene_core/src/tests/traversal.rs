//! Visitor dispatch through the category tree

use crate::nodes::{Draw, Group, Leaf, MatrixTransform, Node, QuadGroup, StateGroup};
use crate::object::{Object, RefPtr};
use crate::visit::{visit, ConstVisitor, Visitor};

fn group_with_two_leaves() -> (RefPtr<Group>, RefPtr<dyn Node>, RefPtr<dyn Node>) {
    let a = RefPtr::new(Leaf::new()).into_node();
    let b = RefPtr::new(Leaf::new()).into_node();
    let group = RefPtr::new(Group::new().with_child(a.clone()).with_child(b.clone()));
    (group, a, b)
}

fn address(object: &dyn Object) -> usize {
    std::ptr::from_ref(object).cast::<u8>() as usize
}

/// Overrides only the most generic overload and always descends
#[derive(Default)]
struct RecordVisits {
    visited: Vec<usize>,
}

impl Visitor for RecordVisits {
    fn apply_object(&mut self, object: &dyn Object) {
        self.visited.push(address(object));
        object.traverse(self);
    }
}

/// Stops at groups without descending
#[derive(Default)]
struct PruneGroups {
    visited: Vec<usize>,
}

impl Visitor for PruneGroups {
    fn apply_object(&mut self, object: &dyn Object) {
        self.visited.push(address(object));
        object.traverse(self);
    }

    fn apply_group(&mut self, group: &Group) {
        self.visited.push(address(group));
    }
}

#[test]
fn test_generic_visitor_reaches_every_node_in_order() {
    let (group, a, b) = group_with_two_leaves();

    let mut visitor = RecordVisits::default();
    group.accept(&mut visitor);

    assert_eq!(
        visitor.visited,
        vec![address(&*group), address(a.as_object()), address(b.as_object())]
    );
}

#[test]
fn test_group_override_without_traverse_prunes() {
    let (group, _a, _b) = group_with_two_leaves();

    let mut visitor = PruneGroups::default();
    group.accept(&mut visitor);

    assert_eq!(visitor.visited, vec![address(&*group)]);
}

#[test]
fn test_pruning_applies_only_below_the_group() {
    let (group, a, b) = group_with_two_leaves();
    let transform = RefPtr::new(MatrixTransform::default().with_child(group.clone().into_node()));

    let mut visitor = PruneGroups::default();
    transform.accept(&mut visitor);

    assert_eq!(visitor.visited, vec![address(&*transform), address(&*group)]);
    assert!(!visitor.visited.contains(&address(a.as_object())));
    assert!(!visitor.visited.contains(&address(b.as_object())));
}

#[derive(Default)]
struct CategoryNames {
    names: Vec<&'static str>,
}

impl ConstVisitor for CategoryNames {
    fn apply_object(&mut self, object: &dyn Object) {
        self.names.push(object.class_name());
        object.traverse_const(self);
    }

    fn apply_transform(&mut self, transform: &dyn crate::nodes::Transform) {
        self.names.push("transform");
        transform.traverse_const(self);
    }

    fn apply_command(&mut self, _command: &dyn crate::nodes::Command) {
        self.names.push("command");
    }
}

#[test]
fn test_defaults_forward_to_nearest_override() {
    let quad = QuadGroup::new().with_child(2, RefPtr::new(Leaf::new()).into_node());
    let state = StateGroup::new().with_child(RefPtr::new(Draw::new(3)).into_node());
    let root = RefPtr::new(
        MatrixTransform::default()
            .with_child(RefPtr::new(quad).into_node())
            .with_child(RefPtr::new(state).into_node()),
    );

    let names = visit::<CategoryNames, _>(&*root).names;
    assert_eq!(names, vec!["transform", "QuadGroup", "Leaf", "StateGroup", "command"]);
}

#[test]
fn test_independent_const_visitors_share_a_graph() {
    let (group, _a, _b) = group_with_two_leaves();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let group = group.clone();
            std::thread::spawn(move || visit::<CategoryNames, _>(&*group).names)
        })
        .collect();

    for handle in handles {
        let names = handle.join().expect("visitor thread panicked");
        assert_eq!(names, vec!["Group", "Leaf", "Leaf"]);
    }
}
