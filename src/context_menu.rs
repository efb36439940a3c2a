//! Context menu registration for rendered overlays

use std::cell::RefCell;

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextMenuType {
    TextHighlight,
    AreaHighlight,
    Pagemark,
}

/// Associates rendered nodes with the menu shown on right-click
pub trait ContextMenu {
    fn register(&self, node: NodeId, menu_type: ContextMenuType);
}

/// Context menu collaborator that records every association
#[derive(Debug, Default)]
pub struct ContextMenuRegistry {
    entries: RefCell<Vec<(NodeId, ContextMenuType)>>,
}

impl ContextMenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn menu_for(&self, node: NodeId) -> Option<ContextMenuType> {
        self.entries
            .borrow()
            .iter()
            .rev()
            .find(|(n, _)| *n == node)
            .map(|(_, t)| *t)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl ContextMenu for ContextMenuRegistry {
    fn register(&self, node: NodeId, menu_type: ContextMenuType) {
        self.entries.borrow_mut().push((node, menu_type));
    }
}
