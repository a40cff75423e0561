//! Traversal creating the resources commands need before recording

use std::collections::HashSet;

use thiserror::Error;

use crate::nodes::Command;
use crate::object::Object;
use crate::render::ResourceId;
use crate::visit::{Mask, Visitor};

/// Errors raised by [`Command::compile`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A resource could not be created
    #[error("Failed to create resource for {class}: {reason}")]
    ResourceCreation {
        /// Class of the command being compiled
        class: String,
        /// What went wrong
        reason: String,
    },
}

/// Resource factory handed to [`Command::compile`]
///
/// Stands in for the device-side resource creation of a graphics backend:
/// it hands out sequential ids and enforces an optional resource budget.
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    resources: Vec<String>,
    resource_limit: Option<usize>,
}

impl CompileContext {
    /// Create a context without a resource budget
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail resource creation once `limit` resources exist
    pub fn with_resource_limit(mut self, limit: usize) -> Self {
        self.resource_limit = Some(limit);
        self
    }

    /// Create a resource named `name` on behalf of a `class` command
    pub fn create_resource(&mut self, class: &str, name: &str) -> Result<ResourceId, CompileError> {
        if name.is_empty() {
            return Err(CompileError::ResourceCreation {
                class: class.to_string(),
                reason: "resource name is empty".to_string(),
            });
        }
        if let Some(limit) = self.resource_limit {
            if self.resources.len() >= limit {
                return Err(CompileError::ResourceCreation {
                    class: class.to_string(),
                    reason: format!("resource limit of {limit} reached creating '{name}'"),
                });
            }
        }

        let id = ResourceId(self.resources.len() as u64);
        self.resources.push(name.to_string());
        log::debug!("Created resource {:?} '{}' for {}", id, name, class);
        Ok(id)
    }

    /// Number of resources created
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Name of a created resource
    pub fn resource_name(&self, id: ResourceId) -> Option<&str> {
        usize::try_from(id.0)
            .ok()
            .and_then(|index| self.resources.get(index))
            .map(String::as_str)
    }
}

/// Compiles every command reachable from the visited objects
///
/// Each command is compiled at most once per traversal even when it is
/// shared by several parents. Failures are logged and collected rather than
/// aborting the pass, so one bad command does not block the rest.
#[derive(Debug, Default)]
pub struct CompileTraversal {
    /// Context passed to every `compile` call
    pub context: CompileContext,
    compiled: usize,
    errors: Vec<CompileError>,
    visited: HashSet<usize>,
}

impl CompileTraversal {
    /// Compile into `context`
    pub fn new(context: CompileContext) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }

    /// Compile `object` and everything reachable from it
    pub fn compile(&mut self, object: &dyn Object) {
        object.accept(self);
    }

    /// Commands compiled successfully
    pub fn compiled_count(&self) -> usize {
        self.compiled
    }

    /// Errors collected so far
    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    /// Whether every command compiled
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Visitor for CompileTraversal {
    /// Every switch branch may be entered by a later record pass.
    fn override_mask(&self) -> Mask {
        Mask::ALL
    }

    fn apply_object(&mut self, object: &dyn Object) {
        object.traverse(self);
    }

    fn apply_command(&mut self, command: &dyn Command) {
        let address = std::ptr::from_ref(command).cast::<u8>() as usize;
        if self.visited.insert(address) {
            match command.compile(&mut self.context) {
                Ok(()) => self.compiled += 1,
                Err(error) => {
                    log::warn!("Compile of {} failed: {}", command.class_name(), error);
                    self.errors.push(error);
                }
            }
        }
        command.traverse(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{BindState, Commands, Draw, Group, StateGroup, Switch};
    use crate::object::RefPtr;
    use crate::render::{CommandList, RecordTraversal, RecordedCommand};

    #[test]
    fn test_shared_commands_compile_once() {
        let bind = RefPtr::new(BindState::new(0, "pipeline"));
        let first = StateGroup::new()
            .with_state(bind.clone().into_command())
            .with_child(RefPtr::new(Draw::new(3)).into_node());
        let second = StateGroup::new()
            .with_state(bind.clone().into_command())
            .with_child(RefPtr::new(Commands::new().with_child(RefPtr::new(Draw::new(6)).into_command())).into_node());
        let root = RefPtr::new(
            Group::new()
                .with_child(RefPtr::new(first).into_node())
                .with_child(RefPtr::new(second).into_node()),
        );

        let mut traversal = CompileTraversal::default();
        traversal.compile(&*root);

        assert!(traversal.succeeded());
        // One bind plus two draws.
        assert_eq!(traversal.compiled_count(), 3);
        assert_eq!(traversal.context.resource_count(), 1);
        let resource = bind.resource().expect("compiled");
        assert_eq!(traversal.context.resource_name(resource), Some("pipeline"));
    }

    #[test]
    fn test_failures_are_collected() {
        let root = RefPtr::new(
            StateGroup::new()
                .with_state(RefPtr::new(BindState::new(0, "a")).into_command())
                .with_state(RefPtr::new(BindState::new(1, "b")).into_command())
                .with_state(RefPtr::new(BindState::new(2, "")).into_command()),
        );

        let mut traversal = CompileTraversal::new(CompileContext::new().with_resource_limit(1));
        traversal.compile(&*root);

        assert_eq!(traversal.compiled_count(), 1);
        assert_eq!(traversal.errors().len(), 2);
        assert!(matches!(
            &traversal.errors()[1],
            CompileError::ResourceCreation { reason, .. } if reason.contains("empty")
        ));
    }

    #[test]
    fn test_disabled_switch_branches_are_compiled() {
        let bind = RefPtr::new(BindState::new(2, "shadow"));
        let mut switch = Switch::new();
        switch.add_child(false, bind.clone().into_node());
        let mut root = RefPtr::new(switch);

        let mut traversal = CompileTraversal::default();
        traversal.compile(&*root);
        assert_eq!(traversal.compiled_count(), 1);
        let resource = bind.resource().expect("compiled while switched off");

        RefPtr::get_mut(&mut root).expect("unique handle").set_all_children(true);
        let mut list = CommandList::new();
        RecordTraversal::new(&mut list).record(&*root);
        assert!(matches!(
            list.commands.as_slice(),
            [RecordedCommand::BindState { slot: 2, resource: recorded }] if *recorded == resource
        ));
    }
}
