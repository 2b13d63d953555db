/// Resource node graph - name-indexed arena of scene nodes.
///
/// Nodes live in a `SlotMap` so ids stay stable while other nodes come and
/// go. A name index gives O(1) lookup, and a separate id list preserves
/// insertion order (views with equal order, units of a view and the Update
/// phase all depend on it).

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::error::{Error, Result};
use crate::graph::{
    DrawUnitNode, Node, NodeKind, RenderTargetNode, TextureNode, VertexBufferNode, ViewNode,
};

new_key_type! {
    /// Stable key of a node in the graph
    pub struct NodeId;
}

pub struct NodeGraph {
    nodes: SlotMap<NodeId, Node>,
    by_name: FxHashMap<String, NodeId>,
    order: Vec<NodeId>,
}

/// Generate the immutable and mutable typed accessors for one node kind
macro_rules! typed_accessors {
    ($get:ident, $get_mut:ident, $variant:ident, $ty:ty) => {
        pub fn $get(&self, name: &str) -> Result<&$ty> {
            match self.node(name)? {
                Node::$variant(payload) => Ok(payload),
                other => Err(mismatch(name, NodeKind::$variant, other.kind())),
            }
        }

        pub fn $get_mut(&mut self, name: &str) -> Result<&mut $ty> {
            match self.node_mut(name)? {
                Node::$variant(payload) => Ok(payload),
                other => {
                    let found = other.kind();
                    Err(mismatch(name, NodeKind::$variant, found))
                }
            }
        }
    };
}

fn mismatch(name: &str, expected: NodeKind, found: NodeKind) -> Error {
    Error::NodeKindMismatch {
        name: name.to_string(),
        expected: expected.as_str(),
        found: found.as_str(),
    }
}

impl NodeGraph {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            by_name: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Insert a node, or replace the node with the same name in place
    ///
    /// A replaced node keeps its id and its insertion position; the previous
    /// node is returned.
    pub fn insert(&mut self, node: Node) -> (NodeId, Option<Node>) {
        if let Some(&id) = self.by_name.get(node.name()) {
            if let Some(slot) = self.nodes.get_mut(id) {
                let previous = std::mem::replace(slot, node);
                return (id, Some(previous));
            }
        }
        let name = node.name().to_string();
        let id = self.nodes.insert(node);
        self.by_name.insert(name, id);
        self.order.push(id);
        (id, None)
    }

    /// Remove a node by name
    pub fn remove(&mut self, name: &str) -> Option<(NodeId, Node)> {
        let id = self.by_name.remove(name)?;
        self.order.retain(|&other| other != id);
        self.nodes.remove(id).map(|node| (id, node))
    }

    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by name
    pub fn node(&self, name: &str) -> Result<&Node> {
        self.id(name)
            .and_then(|id| self.nodes.get(id))
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))
    }

    /// Mutable node by name
    pub fn node_mut(&mut self, name: &str) -> Result<&mut Node> {
        match self.by_name.get(name) {
            Some(&id) => self
                .nodes
                .get_mut(id)
                .ok_or_else(|| Error::NodeNotFound(name.to_string())),
            None => Err(Error::NodeNotFound(name.to_string())),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    typed_accessors!(render_target, render_target_mut, RenderTarget, RenderTargetNode);
    typed_accessors!(texture, texture_mut, Texture, TextureNode);
    typed_accessors!(vertex_buffer, vertex_buffer_mut, VertexBuffer, VertexBufferNode);
    typed_accessors!(draw_unit, draw_unit_mut, DrawUnit, DrawUnitNode);
    typed_accessors!(view, view_mut, View, ViewNode);

    /// Node ids in insertion order
    pub fn ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Node names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(_, node)| node.name())
    }

    /// (id, node) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.nodes.get(id).map(|node| (id, node)))
    }

    /// View nodes in insertion order
    pub fn views(&self) -> Vec<(NodeId, &ViewNode)> {
        self.iter()
            .filter_map(|(id, node)| match node {
                Node::View(view) => Some((id, view)),
                _ => None,
            })
            .collect()
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "node_graph_tests.rs"]
mod tests;
