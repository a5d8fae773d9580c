use crate::arena::Arena;
use crate::interner::StringTable;
use crate::source::{SourceManager, SourceRange};

use super::node::{Node, NodeId, NodeValue};

/// Bundles everything a parse needs: the source manager, the interner, and
/// the node arena. Construction allocates nothing external; dropping the
/// context releases all nodes and interned strings at once.
pub struct ASTContext {
    pub sm: SourceManager,
    pub string_table: StringTable,
    nodes: Arena<Node>,
}

impl ASTContext {
    pub fn new() -> ASTContext {
        ASTContext {
            sm: SourceManager::new(),
            string_table: StringTable::new(),
            nodes: Arena::new(),
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(id.0)
    }

    pub fn alloc_node(&mut self, value: NodeValue, range: SourceRange) -> NodeId {
        NodeId(self.nodes.alloc(Node::new(value, range)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for ASTContext {
    fn default() -> ASTContext {
        ASTContext::new()
    }
}
