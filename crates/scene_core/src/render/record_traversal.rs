//! Traversal recording a scene graph into a command buffer
//!
//! Unlike the visitor traits, the record traversal is a concrete type: its
//! overloads are inherent methods, so each leaf's `accept_record` calls the
//! exact method for that leaf without any virtual call on the traversal.
//!
//! ```text
//! Transform   ──► push model matrix, record children, pop
//! StateGroup  ──► push state commands, record children, pop
//! CullNode    ──► skip the child if its bound is outside the frustum
//! Switch      ──► enter children whose mask passes traversal/override masks
//! Command     ──► flush pending state and matrix, then record the command
//! ```
//!
//! State and matrix changes are recorded lazily, right before the next
//! command, so subgraphs without commands record nothing.

use crate::data::Data;
use crate::foundation::math::Mat4;
use crate::nodes::{
    BindState, Command, Commands, CullNode, Draw, Group, Leaf, MatrixTransform, Node, QuadGroup,
    StateGroup, Switch, Transform,
};
use crate::object::{Object, RefPtr, ValueObject};
use crate::render::{CommandBuffer, Frustum};
use crate::visit::{traverse_children, Mask};

/// Counters gathered during one record pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordStats {
    /// Commands recorded, state commands included
    pub commands: usize,
    /// Subgraphs skipped by frustum culling
    pub culled: usize,
}

/// Records a subgraph into a [`CommandBuffer`]
pub struct RecordTraversal<'a> {
    command_buffer: &'a mut dyn CommandBuffer,
    /// Bits a child's mask is tested against
    pub traversal_mask: Mask,
    /// Bits treated as set on every child
    pub override_mask: Mask,
    frustum: Option<Frustum>,
    matrix_stack: Vec<Mat4>,
    matrix_dirty: bool,
    state_stack: Vec<RefPtr<dyn Command>>,
    state_dirty: bool,
    stats: RecordStats,
}

impl<'a> RecordTraversal<'a> {
    /// Record into `command_buffer` with no culling
    pub fn new(command_buffer: &'a mut dyn CommandBuffer) -> Self {
        Self {
            command_buffer,
            traversal_mask: Mask::ALL,
            override_mask: Mask::empty(),
            frustum: None,
            matrix_stack: vec![Mat4::identity()],
            matrix_dirty: false,
            state_stack: Vec::new(),
            state_dirty: false,
            stats: RecordStats::default(),
        }
    }

    /// Cull against the frustum of `view_projection`
    pub fn with_view_projection(mut self, view_projection: &Mat4) -> Self {
        self.frustum = Some(Frustum::from_matrix(view_projection));
        self
    }

    /// Set the traversal mask
    pub fn with_traversal_mask(mut self, mask: Mask) -> Self {
        self.traversal_mask = mask;
        self
    }

    /// Set the override mask
    pub fn with_override_mask(mut self, mask: Mask) -> Self {
        self.override_mask = mask;
        self
    }

    /// Counters for the pass so far
    pub fn stats(&self) -> RecordStats {
        self.stats
    }

    /// Accumulated model matrix
    pub fn model_matrix(&self) -> &Mat4 {
        // The stack starts with the identity and pops are paired with pushes.
        &self.matrix_stack[self.matrix_stack.len() - 1]
    }

    /// Record `object` and everything reachable from it
    pub fn record(&mut self, object: &dyn Object) {
        object.accept_record(self);
    }

    fn record_command(&mut self, command: &dyn Command) {
        if self.state_dirty {
            for state in &self.state_stack {
                state.record(&mut *self.command_buffer);
                self.stats.commands += 1;
            }
            self.state_dirty = false;
        }

        if self.matrix_dirty {
            let matrix = *self.model_matrix();
            self.command_buffer.set_model_matrix(&matrix);
            self.matrix_dirty = false;
        }

        command.record(&mut *self.command_buffer);
        self.stats.commands += 1;
    }

    /// Most generic overload: record the children
    pub fn apply_object(&mut self, object: &dyn Object) {
        object.traverse_record(self);
    }

    /// Values carry nothing to record
    pub fn apply_value(&mut self, _value: &dyn ValueObject) {}

    /// Data is consumed by commands, not recorded directly
    pub fn apply_data(&mut self, _data: &dyn Data) {}

    /// Any node: record the children
    pub fn apply_node(&mut self, node: &dyn Node) {
        node.traverse_record(self);
    }

    /// Nothing below a leaf
    pub fn apply_leaf(&mut self, _leaf: &Leaf) {}

    /// Record every child
    pub fn apply_group(&mut self, group: &Group) {
        group.t_traverse(self);
    }

    /// Record every occupied slot
    pub fn apply_quad_group(&mut self, group: &QuadGroup) {
        group.t_traverse(self);
    }

    /// Record children whose mask passes
    pub fn apply_switch(&mut self, switch: &Switch) {
        switch.t_traverse(self);
    }

    /// Record the child unless its bound is outside the frustum
    pub fn apply_cull_node(&mut self, node: &CullNode) {
        if let Some(frustum) = &self.frustum {
            if node.bound.is_valid() {
                let bound = node.bound.transformed(self.model_matrix());
                if !frustum.intersects_sphere(&bound) {
                    self.stats.culled += 1;
                    log::trace!("Culled subgraph with bound {:?}", bound);
                    return;
                }
            }
        }
        node.t_traverse(self);
    }

    /// Record the children in the transform's coordinate frame
    pub fn apply_transform(&mut self, transform: &dyn Transform) {
        let matrix = transform.transform(self.model_matrix());
        self.matrix_stack.push(matrix);
        self.matrix_dirty = true;

        transform.traverse_record(self);

        self.matrix_stack.pop();
        self.matrix_dirty = true;
    }

    /// See [`RecordTraversal::apply_transform`]
    pub fn apply_matrix_transform(&mut self, transform: &MatrixTransform) {
        self.apply_transform(transform);
    }

    /// Record the children with the group's state pushed
    pub fn apply_state_group(&mut self, group: &StateGroup) {
        let depth = self.state_stack.len();
        self.state_stack.extend(group.state_commands.iter().cloned());
        self.state_dirty = true;

        traverse_children(&group.children, self);

        self.state_stack.truncate(depth);
        self.state_dirty = true;
    }

    /// Record every command in order
    pub fn apply_commands(&mut self, commands: &Commands) {
        commands.t_traverse(self);
    }

    /// Record a command
    pub fn apply_command(&mut self, command: &dyn Command) {
        self.record_command(command);
    }

    /// Record a draw
    pub fn apply_draw(&mut self, draw: &Draw) {
        self.record_command(draw);
    }

    /// Record a bind outside any state group
    pub fn apply_bind_state(&mut self, bind: &BindState) {
        self.record_command(bind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Sphere, Vec3};
    use crate::render::{CommandList, CompileContext, RecordedCommand, ResourceId};
    use nalgebra::Perspective3;

    fn draw(vertex_count: u32) -> RefPtr<dyn Node> {
        RefPtr::new(Draw::new(vertex_count)).into_node()
    }

    fn compiled_bind(slot: u32, context: &mut CompileContext) -> RefPtr<dyn Command> {
        let bind = BindState::new(slot, format!("state{slot}"));
        bind.compile(context).expect("compiles");
        RefPtr::new(bind).into_command()
    }

    fn draws(list: &CommandList) -> Vec<u32> {
        list.commands
            .iter()
            .filter_map(|command| match command {
                RecordedCommand::Draw { vertex_count, .. } => Some(*vertex_count),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_group_records_children_in_order() {
        let root = RefPtr::new(Group::new().with_child(draw(3)).with_child(draw(6)));

        let mut list = CommandList::new();
        let mut traversal = RecordTraversal::new(&mut list);
        traversal.record(&*root);
        assert_eq!(traversal.stats().commands, 2);

        assert_eq!(draws(&list), vec![3, 6]);
    }

    #[test]
    fn test_state_recorded_lazily_and_restored() {
        let mut context = CompileContext::new();
        let shared = compiled_bind(0, &mut context);
        let nested = compiled_bind(1, &mut context);

        let inner = StateGroup::new().with_state(nested).with_child(draw(2));
        let outer = StateGroup::new()
            .with_state(shared)
            .with_child(RefPtr::new(inner).into_node())
            .with_child(draw(4));
        let root = RefPtr::new(outer);

        let mut list = CommandList::new();
        RecordTraversal::new(&mut list).record(&*root);

        let binds = |slot: u32| RecordedCommand::BindState {
            slot,
            resource: ResourceId(u64::from(slot)),
        };
        assert_eq!(list.commands.len(), 5);
        assert_eq!(list.commands[0], binds(0));
        assert_eq!(list.commands[1], binds(1));
        assert!(matches!(list.commands[2], RecordedCommand::Draw { vertex_count: 2, .. }));
        // Leaving the inner group re-establishes the outer state only.
        assert_eq!(list.commands[3], binds(0));
        assert!(matches!(list.commands[4], RecordedCommand::Draw { vertex_count: 4, .. }));
    }

    #[test]
    fn test_transform_sets_model_matrix_before_draw() {
        let offset = Mat4::new_translation(&Vec3::new(0.0, 2.0, 0.0));
        let root = RefPtr::new(
            Group::new()
                .with_child(RefPtr::new(MatrixTransform::new(offset).with_child(draw(3))).into_node())
                .with_child(draw(9)),
        );

        let mut list = CommandList::new();
        RecordTraversal::new(&mut list).record(&*root);

        assert_eq!(
            list.commands,
            vec![
                RecordedCommand::SetModelMatrix(offset),
                RecordedCommand::Draw {
                    vertex_count: 3,
                    instance_count: 1,
                    first_vertex: 0,
                    first_instance: 0,
                },
                RecordedCommand::SetModelMatrix(Mat4::identity()),
                RecordedCommand::Draw {
                    vertex_count: 9,
                    instance_count: 1,
                    first_vertex: 0,
                    first_instance: 0,
                },
            ]
        );
    }

    #[test]
    fn test_cull_node_outside_frustum_is_skipped() {
        let projection = Perspective3::new(1.0, std::f32::consts::FRAC_PI_2, 0.1, 100.0).to_homogeneous();
        let visible = CullNode::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0), draw(1));
        let behind = CullNode::new(Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0), draw(2));
        // Moved into view by its parent transform.
        let moved = MatrixTransform::new(Mat4::new_translation(&Vec3::new(0.0, 0.0, -20.0))).with_child(
            RefPtr::new(CullNode::new(Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0), draw(3))).into_node(),
        );

        let root = RefPtr::new(
            Group::new()
                .with_child(RefPtr::new(visible).into_node())
                .with_child(RefPtr::new(behind).into_node())
                .with_child(RefPtr::new(moved).into_node()),
        );

        let mut list = CommandList::new();
        let mut traversal = RecordTraversal::new(&mut list).with_view_projection(&projection);
        traversal.record(&*root);
        assert_eq!(traversal.stats().culled, 1);

        assert_eq!(draws(&list), vec![1, 3]);
    }

    #[test]
    fn test_switch_masks() {
        let mut switch = Switch::new();
        switch.add_masked_child(Mask::bit(0), draw(1));
        switch.add_masked_child(Mask::bit(1), draw(2));
        let root = RefPtr::new(switch);

        let mut list = CommandList::new();
        RecordTraversal::new(&mut list)
            .with_traversal_mask(Mask::bit(1))
            .record(&*root);
        assert_eq!(draws(&list), vec![2]);

        let mut list = CommandList::new();
        RecordTraversal::new(&mut list)
            .with_traversal_mask(Mask::bit(1))
            .with_override_mask(Mask::ALL)
            .record(&*root);
        assert_eq!(draws(&list), vec![1, 2]);
    }
}
