//! Side tables filled in by the semantic phases
//!
//! The resolver writes `declarations`, the type checker writes `types`.
//! Every entry is written once; a second write for the same node is
//! refused and the caller treats it as an internal error.

use std::collections::HashMap;

use crate::frontend::ast::NodeId;
use crate::stdlib::StdId;
use crate::types::Type;

/// What an identifier or operator occurrence refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// A `const` declaration in the program, by declaration id
    Const(NodeId),
    /// A `var` declaration in the program, by declaration id
    Var(NodeId),
    /// A declaration of the standard environment
    Standard(StdId),
}

/// Per-node results of resolution and type checking
#[derive(Debug, Default)]
pub struct Annotations {
    declarations: HashMap<NodeId, Binding>,
    types: HashMap<NodeId, Type>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link a use site to its declaration. Returns `false` if the node
    /// was already linked.
    #[must_use]
    pub fn bind(&mut self, node: NodeId, binding: Binding) -> bool {
        if self.declarations.contains_key(&node) {
            return false;
        }
        self.declarations.insert(node, binding);
        true
    }

    pub fn binding(&self, node: NodeId) -> Option<Binding> {
        self.declarations.get(&node).copied()
    }

    /// Record the static type of a node. Returns `false` if it already
    /// had one.
    #[must_use]
    pub fn set_type(&mut self, node: NodeId, ty: Type) -> bool {
        if self.types.contains_key(&node) {
            return false;
        }
        self.types.insert(node, ty);
        true
    }

    pub fn type_of(&self, node: NodeId) -> Option<Type> {
        self.types.get(&node).copied()
    }

    /// Number of linked use sites
    pub fn binding_count(&self) -> usize {
        self.declarations.len()
    }

    /// Number of typed nodes
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_are_write_once() {
        let mut annotations = Annotations::new();
        assert!(annotations.bind(NodeId(1), Binding::Var(NodeId(0))));
        assert!(!annotations.bind(NodeId(1), Binding::Const(NodeId(0))));
        assert_eq!(annotations.binding(NodeId(1)), Some(Binding::Var(NodeId(0))));
    }

    #[test]
    fn test_types_are_write_once() {
        let mut annotations = Annotations::new();
        assert!(annotations.set_type(NodeId(3), Type::Integer));
        assert!(!annotations.set_type(NodeId(3), Type::Char));
        assert_eq!(annotations.type_of(NodeId(3)), Some(Type::Integer));
        assert_eq!(annotations.type_of(NodeId(4)), None);
    }
}
