//! Translation cache for shared AST nodes.
//!
//! Only shared nodes are cached: an unshared node is translated exactly
//! once, so caching it buys nothing. The cache key pairs the node's
//! identity with a snapshot of the current bindings restricted to the
//! node's free variables -- a node with no free variables caches globally,
//! one with free variables caches per ground binding.

use rustc_hash::FxHashMap;

use crate::ast::visitor::{Node, NodeId};
use crate::bool::{BoolValue, BooleanMatrix, Int};

use super::annotated::AnnotatedNode;
use super::environment::Environment;

/// A cached translation result.
#[derive(Clone)]
pub enum Cached {
    /// A formula's circuit value.
    Formula(BoolValue),
    /// An expression's matrix.
    Expression(BooleanMatrix),
    /// An integer expression's bit vector.
    Int(Int),
}

type Key = (NodeId, Vec<(crate::ast::Variable, usize)>);

/// Cache from (shared node, free-variable binding) to translation.
pub struct TranslationCache {
    map: FxHashMap<Key, Cached>,
}

impl TranslationCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    fn key(annotated: &AnnotatedNode, node: &Node, env: &Environment) -> Option<Key> {
        let free = annotated.free_variables(node)?;
        Some((node.id(), env.snapshot_of(free)))
    }

    /// The cached translation of `node` under `env`, if any.
    pub fn lookup(
        &self,
        annotated: &AnnotatedNode,
        node: &Node,
        env: &Environment,
    ) -> Option<Cached> {
        let key = Self::key(annotated, node, env)?;
        self.map.get(&key).cloned()
    }

    /// Caches the translation of a shared `node` under `env`; does nothing
    /// for unshared nodes.
    pub fn record(
        &mut self,
        annotated: &AnnotatedNode,
        node: &Node,
        env: &Environment,
        value: Cached,
    ) {
        if let Some(key) = Self::key(annotated, node, env) {
            self.map.insert(key, value);
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new()
    }
}
