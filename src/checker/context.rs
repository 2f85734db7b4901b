//! Scope stack and node→scope index
//!
//! [`Context`] owns every scope created during a check run in an arena; the
//! stack holds arena indices with the global scope fixed at the bottom.
//! Popped scopes stay in the arena so later passes can re-enter them through
//! the node→scope index (keyed by the parser-assigned [`NodeId`]).

use rustc_hash::FxHashMap;

use super::scope::Scope;
use crate::parser::ast::NodeId;

#[derive(Debug)]
pub struct Context {
    scopes: Vec<Scope>,
    stack: Vec<usize>,
    node_scopes: FxHashMap<NodeId, usize>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            stack: vec![0],
            node_scopes: FxHashMap::default(),
        }
    }

    /// Drops every scope except a fresh global one.
    pub fn reset(&mut self) {
        self.scopes.clear();
        self.scopes.push(Scope::default());
        self.stack.clear();
        self.stack.push(0);
        self.node_scopes.clear();
    }

    /// Allocates a fresh scope, pushes it, and records it as opened by
    /// `node`.
    pub fn push_scope(&mut self, node: NodeId) -> &mut Scope {
        let index = self.scopes.len();
        self.scopes.push(Scope::default());
        self.stack.push(index);
        self.node_scopes.insert(node, index);
        &mut self.scopes[index]
    }

    /// Pops the top scope. Panics when asked to pop the global scope; that
    /// is a traversal bug.
    pub fn pop_scope(&mut self) {
        if self.stack.len() == 1 {
            panic!("not allowed to pop the global scope");
        }
        self.stack.pop();
    }

    pub fn peek_scope(&mut self) -> &mut Scope {
        let index = *self.stack.last().unwrap_or(&0);
        &mut self.scopes[index]
    }

    pub fn global_scope(&mut self) -> &mut Scope {
        &mut self.scopes[0]
    }

    /// Walks the stack from the innermost scope outward; inherited symbols
    /// of intermediate scopes count as visible.
    pub fn has_symbol(&self, name: &str) -> bool {
        self.stack
            .iter()
            .rev()
            .any(|&index| self.scopes[index].has_symbol(name))
    }

    /// Increments the reference count of `name` in the nearest scope that
    /// declares it locally; no-op when no scope on the stack does.
    pub fn increase_reference(&mut self, name: &str) {
        let found = self
            .stack
            .iter()
            .rev()
            .copied()
            .find(|&index| self.scopes[index].has_local_symbol(name));
        if let Some(index) = found {
            self.scopes[index].increase_reference(name);
        }
    }

    /// Re-enters the scope opened by `node` in an earlier pass. Panics for
    /// nodes that never opened a scope.
    pub fn get_scope_by_node(&mut self, node: NodeId) -> &mut Scope {
        match self.node_scopes.get(&node) {
            Some(&index) => &mut self.scopes[index],
            None => panic!("no scope recorded for node {}", node),
        }
    }

    /// Current stack depth; 1 when only the global scope is live.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
