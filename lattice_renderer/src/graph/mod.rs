/// Resource node graph module - named, typed scene resources and their GPU backings

pub mod node;
pub mod node_graph;
pub mod backing;

pub use node::{
    Node, NodeKind, NodeState, RenderTargetNode, TextureNode, VertexBufferNode,
    DrawUnitNode, ViewNode, DEFAULT_CLEAR_COLOR,
};
pub use node_graph::{NodeGraph, NodeId};
pub use backing::{Backing, TextureBacking, RenderTargetBacking, VertexBufferBacking};
